//! The boundary between a sandboxed guest module and a blitz document.
//!
//! A [`DomBridge`] owns one document and the handle table over it. The guest
//! drives it through the typed operations in [`dispatcher`] or through raw
//! [`imports::HostCall`]s, and receives clicks through [`router`].

pub mod dispatcher;
pub mod error;
pub mod handles;
pub mod host;
pub mod imports;
pub mod memory;
pub mod properties;
pub mod router;
pub mod serialize;

use blitz_dom::{BaseDocument, DocumentConfig};
use blitz_html::HtmlDocument;

use crate::config::BridgeConfig;

pub use error::{BridgeError, BridgeResult};
pub use handles::{EntropySource, Handle, HandleSource, HandleTable};
pub use host::NodeKind;
pub use imports::HostCall;
pub use memory::GuestMemory;
pub use router::{ClickDetail, ClickListener, ClickRouter, EventSlot, MountPoint};

/// One bridge session: a host document, the handles the guest holds into
/// it, and the mount points listening for clicks.
pub struct DomBridge {
    document: HtmlDocument,
    handles: HandleTable,
    mounts: Vec<MountPoint>,
    event_slot: EventSlot,
    config: BridgeConfig,
}

impl DomBridge {
    pub fn new(html: &str, config: BridgeConfig) -> Self {
        let handles = HandleTable::new(config.handle_space);
        Self::with_handles(html, config, handles)
    }

    /// Builds a session whose handles come from `source` instead of OS
    /// entropy.
    pub fn with_handle_source(
        html: &str,
        config: BridgeConfig,
        source: Box<dyn HandleSource>,
    ) -> Self {
        Self::with_handles(html, config, HandleTable::with_source(source))
    }

    fn with_handles(html: &str, config: BridgeConfig, handles: HandleTable) -> Self {
        Self {
            document: HtmlDocument::from_html(html, DocumentConfig::default()),
            handles,
            mounts: Vec::new(),
            event_slot: EventSlot::default(),
            config,
        }
    }

    pub fn document(&self) -> &BaseDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut BaseDocument {
        &mut self.document
    }

    pub fn handles(&self) -> &HandleTable {
        &self.handles
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn mounts(&self) -> &[MountPoint] {
        &self.mounts
    }

    /// Shared slot holding the click currently being delivered. Hand a clone
    /// to the guest so it can read event details during its callback.
    pub fn event_slot(&self) -> EventSlot {
        self.event_slot.clone()
    }

    pub fn resolve(&self, handle: Handle) -> BridgeResult<usize> {
        self.handles.resolve(handle)
    }

    pub fn node_kind(&self, handle: Handle) -> BridgeResult<NodeKind> {
        let node = self.handles.resolve(handle)?;
        Ok(host::kind(&self.document, node))
    }

    pub fn parent_node(&self, handle: Handle) -> BridgeResult<Option<usize>> {
        let node = self.handles.resolve(handle)?;
        Ok(host::parent(&self.document, node))
    }

    pub fn child_nodes(&self, handle: Handle) -> BridgeResult<Vec<usize>> {
        let node = self.handles.resolve(handle)?;
        Ok(host::children(&self.document, node))
    }

    pub fn attribute(&self, handle: Handle, name: &str) -> BridgeResult<Option<String>> {
        let node = self.handles.resolve(handle)?;
        Ok(host::attribute(&self.document, node, name))
    }

    pub fn text_content(&self, handle: Handle) -> BridgeResult<String> {
        let node = self.handles.resolve(handle)?;
        Ok(host::text_content(&self.document, node))
    }
}
