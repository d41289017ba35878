//! Opaque handles for host nodes.
//!
//! The guest module never sees blitz node ids. Every node it creates is
//! registered here under a random handle, and the small subset created as
//! interactive is also indexed by node so clicks can be mapped back.

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::error::{BridgeError, BridgeResult};

/// Upper bound (inclusive) of the default handle space.
pub const DEFAULT_HANDLE_SPACE: u32 = 2_000_000_000;

/// Opaque identity of a host node as seen by the guest module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(NonZeroU32);

impl Handle {
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Handle {
    type Error = BridgeError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Handle::new(raw).ok_or(BridgeError::InvalidHandle(raw))
    }
}

/// Produces candidate handle values. Candidates may repeat; the table
/// retries until it finds one that is not live.
pub trait HandleSource {
    fn next_candidate(&mut self) -> BridgeResult<u32>;
}

/// Draws candidates uniformly from `1..=space` using OS entropy.
#[derive(Debug, Clone)]
pub struct EntropySource {
    space: u32,
}

impl EntropySource {
    pub fn new(space: u32) -> Self {
        Self {
            space: space.max(1),
        }
    }
}

impl Default for EntropySource {
    fn default() -> Self {
        Self::new(DEFAULT_HANDLE_SPACE)
    }
}

impl HandleSource for EntropySource {
    fn next_candidate(&mut self) -> BridgeResult<u32> {
        let mut buf = [0u8; 4];
        getrandom::getrandom(&mut buf).map_err(|err| BridgeError::Entropy(err.to_string()))?;
        Ok(u32::from_le_bytes(buf) % self.space + 1)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    node: usize,
    interactive: bool,
}

/// Handle -> node for every registered node, node -> handle for interactive
/// nodes only. Both indices are updated together.
pub struct HandleTable {
    source: Box<dyn HandleSource>,
    capacity: usize,
    nodes: HashMap<Handle, Entry>,
    interactive: HashMap<usize, Handle>,
}

impl HandleTable {
    pub fn new(space: u32) -> Self {
        let source = EntropySource::new(space);
        Self {
            capacity: source.space as usize,
            ..Self::with_source(Box::new(source))
        }
    }

    /// Table fed by `source`. The source alone decides when handles run
    /// out, by returning an error.
    pub fn with_source(source: Box<dyn HandleSource>) -> Self {
        Self {
            source,
            capacity: usize::MAX,
            nodes: HashMap::new(),
            interactive: HashMap::new(),
        }
    }

    pub fn generate_handle(&mut self) -> BridgeResult<Handle> {
        if self.nodes.len() >= self.capacity {
            return Err(BridgeError::HandleSpaceExhausted(self.nodes.len()));
        }
        loop {
            let raw = self.source.next_candidate()?;
            let Some(handle) = Handle::new(raw) else {
                continue;
            };
            if self.nodes.contains_key(&handle) {
                trace!(target = "bridge", handle = %handle, "handle collision, redrawing");
                continue;
            }
            return Ok(handle);
        }
    }

    pub fn register(&mut self, node: usize, interactive: bool) -> BridgeResult<Handle> {
        let handle = self.generate_handle()?;
        self.nodes.insert(handle, Entry { node, interactive });
        if interactive {
            self.interactive.insert(node, handle);
        }
        trace!(target = "bridge", handle = %handle, node, interactive, "registered node");
        Ok(handle)
    }

    pub fn resolve(&self, handle: Handle) -> BridgeResult<usize> {
        self.nodes
            .get(&handle)
            .map(|entry| entry.node)
            .ok_or(BridgeError::UnknownHandle(handle.get()))
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.nodes.contains_key(&handle)
    }

    pub fn dispose(&mut self, handle: Handle) -> BridgeResult<usize> {
        let entry = self
            .nodes
            .remove(&handle)
            .ok_or(BridgeError::UnknownHandle(handle.get()))?;
        if entry.interactive {
            self.interactive.remove(&entry.node);
        }
        trace!(target = "bridge", handle = %handle, node = entry.node, "disposed handle");
        Ok(entry.node)
    }

    pub fn reverse_resolve(&self, node: usize) -> Option<Handle> {
        self.interactive.get(&node).copied()
    }

    pub fn is_interactive(&self, handle: Handle) -> bool {
        self.nodes
            .get(&handle)
            .map(|entry| entry.interactive)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn interactive_len(&self) -> usize {
        self.interactive.len()
    }

    /// Snapshot of every live handle, sorted.
    pub fn handles(&self) -> Vec<Handle> {
        let mut handles: Vec<Handle> = self.nodes.keys().copied().collect();
        handles.sort_unstable();
        handles
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new(DEFAULT_HANDLE_SPACE)
    }
}
