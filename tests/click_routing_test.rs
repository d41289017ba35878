use std::cell::RefCell;
use std::rc::Rc;

use blitz_traits::events::{
    BlitzMouseButtonEvent, DomEventData, MouseEventButton, MouseEventButtons,
};
use dombridge::bridge::EventSlot;
use dombridge::{BridgeConfig, ClickDetail, DomBridge, Handle, RoutingPolicy};
use keyboard_types::Modifiers;

const PAGE: &str = "<!DOCTYPE html><html><body><main id=\"app\"></main><aside id=\"side\"></aside></body></html>";

/// R > X (interactive) > Y, mounted at `#app`.
fn nested(config: BridgeConfig) -> (DomBridge, Handle, Handle, Handle) {
    let mut bridge = DomBridge::new(PAGE, config);
    let root = bridge.create_div(false).unwrap();
    let outer = bridge.create_button(true).unwrap();
    let inner = bridge.create_span(false).unwrap();
    bridge.append_child(root, outer).unwrap();
    bridge.append_child(outer, inner).unwrap();
    bridge.mount(root, "#app").unwrap();
    (bridge, root, outer, inner)
}

fn recorder() -> (Rc<RefCell<Vec<Handle>>>, impl FnMut(&mut DomBridge, Handle)) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, move |_: &mut DomBridge, handle: Handle| sink.borrow_mut().push(handle))
}

#[test]
fn click_on_descendant_notifies_interactive_ancestor() {
    let (mut bridge, _root, outer, inner) = nested(BridgeConfig::default());
    let (seen, mut listener) = recorder();

    let target = bridge.resolve(inner).unwrap();
    let delivered = bridge.dispatch_click(target, ClickDetail::at(1.0, 2.0), &mut listener);

    assert_eq!(delivered, 1);
    assert_eq!(*seen.borrow(), vec![outer]);
}

#[test]
fn click_on_non_interactive_tree_is_silent() {
    let (mut bridge, root, _outer, _inner) = nested(BridgeConfig::default());
    let (seen, mut listener) = recorder();
    let delivered = bridge
        .click_handle(root, ClickDetail::default(), &mut listener)
        .unwrap();
    assert_eq!(delivered, 0);
    assert!(seen.borrow().is_empty());
}

#[test]
fn first_match_stops_at_innermost_interactive_node() {
    let (mut bridge, _root, outer, inner) = nested(BridgeConfig::default());
    let button = bridge.create_button(true).unwrap();
    bridge.append_child(inner, button).unwrap();
    let (seen, mut listener) = recorder();

    bridge
        .click_handle(button, ClickDetail::default(), &mut listener)
        .unwrap();
    assert_eq!(*seen.borrow(), vec![button]);
    assert!(!seen.borrow().contains(&outer));
}

#[test]
fn all_ancestors_notifies_innermost_first() {
    let config = BridgeConfig {
        routing: RoutingPolicy::AllAncestors,
        ..BridgeConfig::default()
    };
    let (mut bridge, _root, outer, inner) = nested(config);
    let button = bridge.create_button(true).unwrap();
    bridge.append_child(inner, button).unwrap();
    let (seen, mut listener) = recorder();

    let delivered = bridge
        .click_handle(button, ClickDetail::default(), &mut listener)
        .unwrap();
    assert_eq!(delivered, 2);
    assert_eq!(*seen.borrow(), vec![button, outer]);
}

#[test]
fn clones_of_interactive_nodes_are_not_routed() {
    let (mut bridge, root, _outer, _inner) = nested(BridgeConfig::default());
    let lone = bridge.create_a(true).unwrap();
    let copy = bridge.clone_node(lone).unwrap();
    bridge.append_child(root, copy).unwrap();
    let (seen, mut listener) = recorder();

    bridge
        .click_handle(copy, ClickDetail::default(), &mut listener)
        .unwrap();
    assert!(seen.borrow().is_empty());
}

#[test]
fn clicks_outside_every_mount_are_ignored() {
    let (mut bridge, _root, _outer, _inner) = nested(BridgeConfig::default());
    let stray = bridge.create_button(true).unwrap();
    let (seen, mut listener) = recorder();

    // Not attached anywhere.
    bridge
        .click_handle(stray, ClickDetail::default(), &mut listener)
        .unwrap();
    // Attached, but under a node nobody mounted at.
    let aside = dombridge::bridge::host::query_selector(bridge.document(), "#side").unwrap();
    let stray_id = bridge.resolve(stray).unwrap();
    dombridge::bridge::host::append_child(bridge.document_mut(), aside, stray_id);
    bridge
        .click_handle(stray, ClickDetail::default(), &mut listener)
        .unwrap();

    assert!(seen.borrow().is_empty());
}

#[test]
fn event_slot_holds_detail_during_callback() {
    let (mut bridge, _root, _outer, inner) = nested(BridgeConfig::default());
    let slot: EventSlot = bridge.event_slot();
    let observed = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&observed);
    let mut listener = move |_: &mut DomBridge, _: Handle| {
        *sink.borrow_mut() = slot.current();
    };

    let detail = ClickDetail {
        button: 2,
        ..ClickDetail::at(5.0, 6.0).with_modifiers(Modifiers::CONTROL)
    };
    bridge
        .click_handle(inner, detail.clone(), &mut listener)
        .unwrap();

    assert_eq!(observed.borrow().as_ref(), Some(&detail));
    let json: serde_json::Value =
        serde_json::from_str(&bridge.event_slot().to_json().unwrap()).unwrap();
    assert_eq!(json["ctrlKey"], true);
    assert_eq!(json["button"], 2);
}

#[test]
fn listener_may_mutate_the_tree_it_was_called_from() {
    let (mut bridge, root, outer, inner) = nested(BridgeConfig::default());
    let mut listener = |bridge: &mut DomBridge, handle: Handle| {
        bridge.set_text_content(handle, "clicked").unwrap();
        let note = bridge.create_span(false).unwrap();
        bridge.append_child(root, note).unwrap();
    };

    let delivered = bridge
        .click_handle(inner, ClickDetail::default(), &mut listener)
        .unwrap();
    assert_eq!(delivered, 1);
    assert_eq!(bridge.text_content(outer).unwrap(), "clicked");
    assert_eq!(bridge.child_nodes(root).unwrap().len(), 2);
}

#[test]
fn handles_disposed_mid_walk_are_skipped() {
    let config = BridgeConfig {
        routing: RoutingPolicy::AllAncestors,
        ..BridgeConfig::default()
    };
    let (mut bridge, _root, outer, inner) = nested(config);
    let button = bridge.create_button(true).unwrap();
    bridge.append_child(inner, button).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut listener = move |bridge: &mut DomBridge, handle: Handle| {
        sink.borrow_mut().push(handle);
        if handle == button {
            bridge.dispose_node(outer).unwrap();
        }
    };

    let delivered = bridge
        .click_handle(button, ClickDetail::default(), &mut listener)
        .unwrap();
    assert_eq!(delivered, 1);
    assert_eq!(*seen.borrow(), vec![button]);
}

#[test]
fn mounting_twice_installs_two_listeners() {
    let mut bridge = DomBridge::new(PAGE, BridgeConfig::default());
    let first = bridge.create_div(false).unwrap();
    let second = bridge.create_div(false).unwrap();
    let button = bridge.create_button(true).unwrap();
    bridge.append_child(second, button).unwrap();
    bridge.mount(first, "#app").unwrap();
    bridge.mount(second, "#app").unwrap();
    let (seen, mut listener) = recorder();

    let delivered = bridge
        .click_handle(button, ClickDetail::default(), &mut listener)
        .unwrap();
    assert_eq!(delivered, 2);
    assert_eq!(*seen.borrow(), vec![button, button]);
}

#[test]
fn default_mount_uses_configured_selector() {
    let config = BridgeConfig {
        default_mount: "#side".to_string(),
        ..BridgeConfig::default()
    };
    let mut bridge = DomBridge::new(PAGE, config);
    let root = bridge.create_div(false).unwrap();
    bridge.mount_default(root).unwrap();
    assert_eq!(bridge.mounts()[0].selector, "#side");
    assert_eq!(bridge.mounts()[0].root, root);
}

#[test]
fn blitz_click_events_route_through_the_event_handler() {
    let (mut bridge, _root, outer, inner) = nested(BridgeConfig::default());
    let slot = bridge.event_slot();
    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    let mut listener = move |_: &mut DomBridge, handle: Handle| {
        sink.borrow_mut().push((handle, slot.current()));
    };

    let target = bridge.resolve(inner).unwrap();
    let delivered = bridge.handle_dom_event(
        target,
        DomEventData::Click(BlitzMouseButtonEvent {
            x: 12.0,
            y: 34.0,
            button: MouseEventButton::Secondary,
            buttons: MouseEventButtons::Secondary,
            mods: Modifiers::ALT,
        }),
        &mut listener,
    );

    assert_eq!(delivered, 1);
    let received = received.borrow();
    let (handle, detail) = &received[0];
    assert_eq!(*handle, outer);
    let detail = detail.as_ref().expect("detail during callback");
    assert_eq!((detail.client_x, detail.client_y), (12.0, 34.0));
    assert_eq!(detail.button, 2);
    assert_eq!(detail.buttons, u32::from(MouseEventButtons::Secondary.bits()));
    assert!(detail.alt_key && !detail.ctrl_key && !detail.shift_key && !detail.meta_key);
}

#[test]
fn blitz_non_click_events_are_not_routed() {
    let (mut bridge, _root, _outer, inner) = nested(BridgeConfig::default());
    let (seen, mut listener) = recorder();
    let target = bridge.resolve(inner).unwrap();
    let delivered = bridge.handle_dom_event(
        target,
        DomEventData::MouseDown(BlitzMouseButtonEvent {
            x: 0.0,
            y: 0.0,
            button: MouseEventButton::Main,
            buttons: MouseEventButtons::Primary,
            mods: Modifiers::default(),
        }),
        &mut listener,
    );
    assert_eq!(delivered, 0);
    assert!(seen.borrow().is_empty());
}
