//! Primitive node operations issued by the guest.
//!
//! Every operation resolves its handles first and fails with
//! [`BridgeError::UnknownHandle`] before touching the document. The one
//! exception is [`DomBridge::remove_node`].

use tracing::{debug, trace};

use super::error::{BridgeError, BridgeResult};
use super::handles::Handle;
use super::host;
use super::properties::{self, PropertyTarget};
use super::DomBridge;

impl DomBridge {
    pub fn create_element(&mut self, tag: &str, interactive: bool) -> BridgeResult<Handle> {
        let node = host::create_element(&mut self.document, tag, None);
        let handle = self.handles.register(node, interactive)?;
        trace!(target = "bridge", handle = %handle, tag, interactive, "create_element");
        Ok(handle)
    }

    pub fn create_element_ns(
        &mut self,
        tag: &str,
        namespace: &str,
        interactive: bool,
    ) -> BridgeResult<Handle> {
        let node = host::create_element(&mut self.document, tag, Some(namespace));
        let handle = self.handles.register(node, interactive)?;
        trace!(target = "bridge", handle = %handle, tag, namespace, "create_element_ns");
        Ok(handle)
    }

    pub fn create_text_node(&mut self, text: &str) -> BridgeResult<Handle> {
        let node = host::create_text_node(&mut self.document, text);
        self.handles.register(node, false)
    }

    pub fn create_td(&mut self, interactive: bool) -> BridgeResult<Handle> {
        self.create_element("td", interactive)
    }

    pub fn create_tr(&mut self, interactive: bool) -> BridgeResult<Handle> {
        self.create_element("tr", interactive)
    }

    pub fn create_span(&mut self, interactive: bool) -> BridgeResult<Handle> {
        self.create_element("span", interactive)
    }

    pub fn create_a(&mut self, interactive: bool) -> BridgeResult<Handle> {
        self.create_element("a", interactive)
    }

    pub fn create_div(&mut self, interactive: bool) -> BridgeResult<Handle> {
        self.create_element("div", interactive)
    }

    pub fn create_table(&mut self, interactive: bool) -> BridgeResult<Handle> {
        self.create_element("table", interactive)
    }

    pub fn create_tbody(&mut self, interactive: bool) -> BridgeResult<Handle> {
        self.create_element("tbody", interactive)
    }

    pub fn create_h1(&mut self, interactive: bool) -> BridgeResult<Handle> {
        self.create_element("h1", interactive)
    }

    pub fn create_button(&mut self, interactive: bool) -> BridgeResult<Handle> {
        self.create_element("button", interactive)
    }

    pub fn append_child(&mut self, parent: Handle, child: Handle) -> BridgeResult<()> {
        let parent_id = self.handles.resolve(parent)?;
        let child_id = self.handles.resolve(child)?;
        host::append_child(&mut self.document, parent_id, child_id);
        Ok(())
    }

    /// Generic property assignment (`node[name] = value`).
    pub fn set_str(&mut self, handle: Handle, name: &str, value: &str) -> BridgeResult<()> {
        let node = self.handles.resolve(handle)?;
        match properties::classify(name) {
            PropertyTarget::Attribute(attr) => {
                host::set_attribute(&mut self.document, node, &attr, value)
            }
            PropertyTarget::TextContent => return self.set_text_content(handle, value),
            PropertyTarget::InnerHtml => host::set_inner_html(&mut self.document, node, value),
            PropertyTarget::CharacterData => return self.set_data(handle, value),
        }
        Ok(())
    }

    pub fn set_class(&mut self, handle: Handle, class: &str) -> BridgeResult<()> {
        let node = self.handles.resolve(handle)?;
        host::set_attribute(&mut self.document, node, "class", class);
        Ok(())
    }

    /// Boolean property: present as an empty attribute when set, absent
    /// otherwise.
    pub fn set_bool(&mut self, handle: Handle, name: &str, value: bool) -> BridgeResult<()> {
        let node = self.handles.resolve(handle)?;
        let attr = properties::attribute_name(name);
        if attr == "aria-hidden" {
            return self.set_aria_hidden(handle, value);
        }
        if value {
            host::set_attribute(&mut self.document, node, &attr, "");
        } else {
            host::remove_attribute(&mut self.document, node, &attr);
        }
        Ok(())
    }

    pub fn set_aria_hidden(&mut self, handle: Handle, hidden: bool) -> BridgeResult<()> {
        let node = self.handles.resolve(handle)?;
        let value = if hidden { "true" } else { "false" };
        host::set_attribute(&mut self.document, node, "aria-hidden", value);
        Ok(())
    }

    /// Replaces the character data of a text node in place.
    pub fn set_data(&mut self, handle: Handle, text: &str) -> BridgeResult<()> {
        let node = self.handles.resolve(handle)?;
        if !host::is_text(&self.document, node) {
            return Err(BridgeError::NotText(handle.get()));
        }
        host::set_text(&mut self.document, node, text);
        Ok(())
    }

    pub fn set_text_content(&mut self, handle: Handle, text: &str) -> BridgeResult<()> {
        let node = self.handles.resolve(handle)?;
        if host::is_text(&self.document, node) {
            return self.set_data(handle, text);
        }
        host::set_element_text(&mut self.document, node, text);
        Ok(())
    }

    pub fn remove_attribute(&mut self, handle: Handle, name: &str) -> BridgeResult<()> {
        let node = self.handles.resolve(handle)?;
        host::remove_attribute(&mut self.document, node, name);
        Ok(())
    }

    /// Puts `new` where `old` is and retires `old`'s handle.
    pub fn replace_with(&mut self, old: Handle, new: Handle) -> BridgeResult<()> {
        let old_id = self.handles.resolve(old)?;
        let new_id = self.handles.resolve(new)?;
        if !host::replace(&mut self.document, old_id, new_id) {
            debug!(target = "bridge", handle = %old, "replace_with on a detached node");
        }
        self.handles.dispose(old)?;
        Ok(())
    }

    /// Detaches a node. Unknown handles are tolerated: a node can already be
    /// gone through an ancestor's removal or an earlier disposal.
    pub fn remove_node(&mut self, handle: Handle) {
        let Ok(node) = self.handles.resolve(handle) else {
            debug!(target = "bridge", handle = %handle, "remove_node on unknown handle ignored");
            return;
        };
        if !host::detach(&mut self.document, node) {
            trace!(target = "bridge", handle = %handle, "remove_node on detached node");
        }
    }

    /// Forgets a handle. The node is not detached.
    pub fn dispose_node(&mut self, handle: Handle) -> BridgeResult<()> {
        self.handles.dispose(handle).map(|_| ())
    }

    /// Deep clone under a fresh handle. Clones are never interactive.
    pub fn clone_node(&mut self, handle: Handle) -> BridgeResult<Handle> {
        let node = self.handles.resolve(handle)?;
        let clone = host::deep_clone(&mut self.document, node);
        self.handles.register(clone, false)
    }

    /// Keyed reconciliation step: bring `moving` to `target_index` under
    /// `parent`.
    ///
    /// The incumbent at `target_index` is displaced into the slot `moving`
    /// vacated unless it is the last child or the caller expects the next
    /// key to match it anyway.
    pub fn move_before(
        &mut self,
        parent: Handle,
        next_key_match: bool,
        target_index: usize,
        moving: Handle,
    ) -> BridgeResult<()> {
        let moving_id = self.handles.resolve(moving)?;
        let parent_id = self.handles.resolve(parent)?;
        let current = host::child_at(&self.document, parent_id, target_index);
        if current == Some(moving_id) {
            return Ok(());
        }

        let old_next = host::next_sibling(&self.document, moving_id);
        host::insert_before(&mut self.document, parent_id, moving_id, current);

        let Some(current_id) = current else {
            return Ok(());
        };
        if host::last_child(&self.document, parent_id) != Some(current_id) && !next_key_match {
            host::insert_before(&mut self.document, parent_id, current_id, old_next);
        }
        Ok(())
    }
}
