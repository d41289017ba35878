//! Click delegation from the host document back to the guest.
//!
//! Each mount installs one listener at its mount point. A click anywhere
//! below it walks from the physical target towards the mount point and
//! notifies the guest with the handle of the interactive node(s) found on
//! the way. Event details travel through a shared [`EventSlot`] rather than
//! as call arguments.

use std::cell::RefCell;
use std::rc::Rc;

use blitz_dom::{DocumentMutator, EventDriver, EventHandler};
use blitz_traits::events::{
    BlitzMouseButtonEvent, DomEvent, DomEventData, EventState, MouseEventButton, UiEvent,
};
use keyboard_types::Modifiers;
use serde::Serialize;
use tracing::{debug, info, trace};

use super::error::{BridgeError, BridgeResult};
use super::handles::{Handle, HandleTable};
use super::host;
use super::DomBridge;
use crate::config::RoutingPolicy;

/// The guest's click entry point.
pub trait ClickListener {
    fn call_click_listener(&mut self, bridge: &mut DomBridge, handle: Handle);
}

impl<F> ClickListener for F
where
    F: FnMut(&mut DomBridge, Handle),
{
    fn call_click_listener(&mut self, bridge: &mut DomBridge, handle: Handle) {
        self(bridge, handle)
    }
}

/// Details of a click, readable by the guest while its listener runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickDetail {
    pub client_x: f32,
    pub client_y: f32,
    pub button: i32,
    pub buttons: u32,
    pub alt_key: bool,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub shift_key: bool,
}

impl ClickDetail {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            client_x: x,
            client_y: y,
            ..Self::default()
        }
    }

    pub fn with_modifiers(mut self, mods: Modifiers) -> Self {
        self.alt_key = mods.alt();
        self.ctrl_key = mods.ctrl();
        self.meta_key = mods.meta();
        self.shift_key = mods.shift();
        self
    }

    pub fn from_mouse(event: &BlitzMouseButtonEvent) -> Self {
        Self {
            client_x: event.x,
            client_y: event.y,
            button: mouse_button_code(event.button),
            buttons: u32::from(event.buttons.bits()),
            ..Self::default()
        }
        .with_modifiers(event.mods)
    }
}

fn mouse_button_code(button: MouseEventButton) -> i32 {
    match button {
        MouseEventButton::Main => 0,
        MouseEventButton::Auxiliary => 1,
        MouseEventButton::Secondary => 2,
        MouseEventButton::Fourth => 3,
        MouseEventButton::Fifth => 4,
    }
}

/// Single shared slot overwritten with each delivered click.
#[derive(Debug, Clone, Default)]
pub struct EventSlot(Rc<RefCell<Option<ClickDetail>>>);

impl EventSlot {
    pub fn set(&self, detail: ClickDetail) {
        *self.0.borrow_mut() = Some(detail);
    }

    pub fn current(&self) -> Option<ClickDetail> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().take();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&*self.0.borrow())
    }
}

/// A listener installed by [`DomBridge::mount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    pub node: usize,
    pub root: Handle,
    pub selector: String,
}

/// Handles to notify for a click whose target-to-root chain is `chain`.
///
/// Every mount whose mount point lies on the chain contributes the
/// interactive nodes strictly below it, innermost first.
pub fn route(
    handles: &HandleTable,
    mounts: &[MountPoint],
    policy: RoutingPolicy,
    chain: &[usize],
) -> Vec<Handle> {
    let mut notified = Vec::new();
    for mount in mounts {
        let Some(depth) = chain.iter().position(|node| *node == mount.node) else {
            continue;
        };
        for node in &chain[..depth] {
            let Some(handle) = handles.reverse_resolve(*node) else {
                continue;
            };
            notified.push(handle);
            if policy == RoutingPolicy::FirstMatch {
                break;
            }
        }
    }
    notified
}

/// [`EventHandler`] that records clicks for delivery once the host's event
/// driver has finished with the document.
pub struct ClickRouter<'a> {
    handles: &'a HandleTable,
    mounts: &'a [MountPoint],
    policy: RoutingPolicy,
    pending: &'a mut Vec<(Handle, ClickDetail)>,
}

impl<'a> ClickRouter<'a> {
    pub fn new(
        handles: &'a HandleTable,
        mounts: &'a [MountPoint],
        policy: RoutingPolicy,
        pending: &'a mut Vec<(Handle, ClickDetail)>,
    ) -> Self {
        Self {
            handles,
            mounts,
            policy,
            pending,
        }
    }
}

impl EventHandler for ClickRouter<'_> {
    fn handle_event(
        &mut self,
        chain: &[usize],
        event: &mut DomEvent,
        _mutr: &mut DocumentMutator<'_>,
        event_state: &mut EventState,
    ) {
        let DomEventData::Click(mouse) = &event.data else {
            return;
        };
        let detail = ClickDetail::from_mouse(mouse);
        let targets = route(self.handles, self.mounts, self.policy, chain);
        if targets.is_empty() {
            return;
        }
        self.pending
            .extend(targets.into_iter().map(|handle| (handle, detail.clone())));
        event_state.request_redraw();
    }
}

impl DomBridge {
    /// Appends `root` under the node matching `selector` and installs a
    /// click listener there. Mounting twice installs two listeners.
    pub fn mount(&mut self, root: Handle, selector: &str) -> BridgeResult<()> {
        let root_id = self.handles.resolve(root)?;
        let mount_node = host::query_selector(&self.document, selector)
            .ok_or_else(|| BridgeError::MountPointNotFound(selector.to_string()))?;
        host::append_child(&mut self.document, mount_node, root_id);
        self.mounts.push(MountPoint {
            node: mount_node,
            root,
            selector: selector.to_string(),
        });
        info!(target = "bridge", handle = %root, selector, node = mount_node, "mounted");
        Ok(())
    }

    /// Mounts at the configured default selector.
    pub fn mount_default(&mut self, root: Handle) -> BridgeResult<()> {
        let selector = self.config.default_mount.clone();
        self.mount(root, &selector)
    }

    /// Routes a click whose physical target is `target` and returns how
    /// many notifications were delivered.
    pub fn dispatch_click(
        &mut self,
        target: usize,
        detail: ClickDetail,
        listener: &mut dyn ClickListener,
    ) -> usize {
        let chain = host::ancestors(&self.document, target);
        let targets = route(&self.handles, &self.mounts, self.config.routing, &chain);
        trace!(target = "bridge", node = target, matches = targets.len(), "click");
        self.deliver(targets.into_iter().map(|handle| (handle, detail.clone())), listener)
    }

    /// Clicks the node behind `handle`.
    pub fn click_handle(
        &mut self,
        handle: Handle,
        detail: ClickDetail,
        listener: &mut dyn ClickListener,
    ) -> BridgeResult<usize> {
        let node = self.handles.resolve(handle)?;
        Ok(self.dispatch_click(node, detail, listener))
    }

    /// Routes an already targeted blitz event through [`ClickRouter`], the
    /// handler the event driver uses. Non-click events deliver nothing.
    pub fn handle_dom_event(
        &mut self,
        target: usize,
        data: DomEventData,
        listener: &mut dyn ClickListener,
    ) -> usize {
        let chain = self.document.node_chain(target);
        let mut event = DomEvent::new(target, data);
        let mut event_state = EventState::default();
        let mut pending = Vec::new();
        {
            let mut router = ClickRouter::new(
                &self.handles,
                &self.mounts,
                self.config.routing,
                &mut pending,
            );
            let mut mutator = self.document.mutate();
            router.handle_event(&chain, &mut event, &mut mutator, &mut event_state);
        }
        self.deliver(pending, listener)
    }

    /// Runs a native UI event through blitz's event driver and delivers
    /// any clicks it produced.
    ///
    /// Pointer events are hit-tested against layout, so the document must
    /// have a viewport and resolved layout (`document_mut().resolve(..)`)
    /// before mouse events can find a target.
    pub fn handle_ui_event(&mut self, event: UiEvent, listener: &mut dyn ClickListener) -> usize {
        let mut pending = Vec::new();
        {
            let router = ClickRouter::new(
                &self.handles,
                &self.mounts,
                self.config.routing,
                &mut pending,
            );
            let mutator = self.document.mutate();
            let mut driver = EventDriver::new(mutator, router);
            driver.handle_ui_event(event);
        }
        self.deliver(pending, listener)
    }

    fn deliver(
        &mut self,
        targets: impl IntoIterator<Item = (Handle, ClickDetail)>,
        listener: &mut dyn ClickListener,
    ) -> usize {
        let mut delivered = 0;
        for (handle, detail) in targets {
            // An earlier callback in the same walk may have disposed it.
            if !self.handles.contains(handle) {
                debug!(target = "bridge", handle = %handle, "skipping click for disposed handle");
                continue;
            }
            self.event_slot.set(detail);
            listener.call_click_listener(self, handle);
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;

    const PAGE: &str = "<!DOCTYPE html><html><body><main id=\"app\"></main></body></html>";

    #[test]
    fn route_respects_policy_and_mount_boundary() {
        let mut table = HandleTable::default();
        let outer = table.register(10, true).unwrap();
        let inner = table.register(12, true).unwrap();
        // chain: 13 (target) -> 12 -> 11 -> 10 -> 2 (mount) -> 1 -> 0
        let chain = [13, 12, 11, 10, 2, 1, 0];
        let mounts = [MountPoint {
            node: 2,
            root: outer,
            selector: "#app".to_string(),
        }];

        assert_eq!(
            route(&table, &mounts, RoutingPolicy::FirstMatch, &chain),
            vec![inner]
        );
        assert_eq!(
            route(&table, &mounts, RoutingPolicy::AllAncestors, &chain),
            vec![inner, outer]
        );

        let above_mount = table.register(1, true).unwrap();
        assert!(!route(&table, &mounts, RoutingPolicy::AllAncestors, &chain).contains(&above_mount));
    }

    #[test]
    fn click_outside_mount_notifies_nobody() {
        let mut table = HandleTable::default();
        table.register(5, true).unwrap();
        let mounts = [MountPoint {
            node: 2,
            root: Handle::new(1).unwrap(),
            selector: "#app".to_string(),
        }];
        assert!(route(&table, &mounts, RoutingPolicy::FirstMatch, &[5, 1, 0]).is_empty());
    }

    #[test]
    fn detail_serializes_like_a_dom_event() {
        let slot = EventSlot::default();
        assert_eq!(slot.to_json().unwrap(), "null");

        slot.set(ClickDetail::at(3.0, 4.0).with_modifiers(Modifiers::SHIFT));
        let json: serde_json::Value = serde_json::from_str(&slot.to_json().unwrap()).unwrap();
        assert_eq!(json["clientX"], 3.0);
        assert_eq!(json["shiftKey"], true);
        assert_eq!(json["ctrlKey"], false);

        slot.clear();
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn mount_requires_a_matching_selector() {
        let mut bridge = DomBridge::new(PAGE, BridgeConfig::default());
        let root = bridge.create_div(false).unwrap();
        assert_eq!(
            bridge.mount(root, "#missing"),
            Err(BridgeError::MountPointNotFound("#missing".to_string()))
        );
        bridge.mount(root, "#app").unwrap();
        assert_eq!(bridge.mounts().len(), 1);
        assert!(bridge.parent_node(root).unwrap().is_some());
    }
}
