//! The raw import surface seen by the guest: integers only. Strings arrive
//! as `(addr, len)` spans into guest memory, handles as plain `u32`s, and
//! flags as integers where zero is false.

use serde::{Deserialize, Serialize};

use super::error::BridgeResult;
use super::handles::Handle;
use super::memory::GuestMemory;
use super::DomBridge;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostCall {
    CreateElement { addr: u32, len: u32, clicks: u32 },
    CreateTd { clicks: u32 },
    CreateTr { clicks: u32 },
    CreateSpan { clicks: u32 },
    CreateA { clicks: u32 },
    CreateDiv { clicks: u32 },
    CreateTable { clicks: u32 },
    CreateTbody { clicks: u32 },
    CreateH1 { clicks: u32 },
    CreateButton { clicks: u32 },
    CreateElementNs {
        addr: u32,
        len: u32,
        ns_addr: u32,
        ns_len: u32,
        clicks: u32,
    },
    CreateTextNode { addr: u32, len: u32 },
    AppendChild { parent: u32, child: u32 },
    SetStr {
        node: u32,
        addr: u32,
        len: u32,
        value_addr: u32,
        value_len: u32,
    },
    SetClass { node: u32, addr: u32, len: u32 },
    SetData { node: u32, addr: u32, len: u32 },
    SetTextContent { node: u32, addr: u32, len: u32 },
    SetAriaHidden { node: u32, flag: u32 },
    SetBool {
        node: u32,
        addr: u32,
        len: u32,
        flag: u32,
    },
    ReplaceWith { old: u32, new: u32 },
    RemoveAttribute { node: u32, addr: u32, len: u32 },
    RemoveNode { node: u32 },
    DisposeNode { node: u32 },
    CloneNode { node: u32 },
    MoveBefore {
        parent: u32,
        next_key_match: u32,
        index: u32,
        moving: u32,
    },
    Mount { node: u32, addr: u32, len: u32 },
}

fn handle(raw: u32) -> BridgeResult<Handle> {
    Handle::try_from(raw)
}

fn flag(raw: u32) -> bool {
    raw != 0
}

impl DomBridge {
    /// Executes one raw call. Creation and clone calls return the new
    /// handle's value; everything else returns `None`.
    pub fn invoke<M>(&mut self, memory: &M, call: HostCall) -> BridgeResult<Option<u32>>
    where
        M: GuestMemory + ?Sized,
    {
        let created = match call {
            HostCall::CreateElement { addr, len, clicks } => {
                let tag = memory.read_str(addr, len)?;
                Some(self.create_element(&tag, flag(clicks))?)
            }
            HostCall::CreateTd { clicks } => Some(self.create_td(flag(clicks))?),
            HostCall::CreateTr { clicks } => Some(self.create_tr(flag(clicks))?),
            HostCall::CreateSpan { clicks } => Some(self.create_span(flag(clicks))?),
            HostCall::CreateA { clicks } => Some(self.create_a(flag(clicks))?),
            HostCall::CreateDiv { clicks } => Some(self.create_div(flag(clicks))?),
            HostCall::CreateTable { clicks } => Some(self.create_table(flag(clicks))?),
            HostCall::CreateTbody { clicks } => Some(self.create_tbody(flag(clicks))?),
            HostCall::CreateH1 { clicks } => Some(self.create_h1(flag(clicks))?),
            HostCall::CreateButton { clicks } => Some(self.create_button(flag(clicks))?),
            HostCall::CreateElementNs {
                addr,
                len,
                ns_addr,
                ns_len,
                clicks,
            } => {
                let tag = memory.read_str(addr, len)?;
                let namespace = memory.read_str(ns_addr, ns_len)?;
                Some(self.create_element_ns(&tag, &namespace, flag(clicks))?)
            }
            HostCall::CreateTextNode { addr, len } => {
                let text = memory.read_str(addr, len)?;
                Some(self.create_text_node(&text)?)
            }
            HostCall::AppendChild { parent, child } => {
                self.append_child(handle(parent)?, handle(child)?)?;
                None
            }
            HostCall::SetStr {
                node,
                addr,
                len,
                value_addr,
                value_len,
            } => {
                let name = memory.read_str(addr, len)?;
                let value = memory.read_str(value_addr, value_len)?;
                self.set_str(handle(node)?, &name, &value)?;
                None
            }
            HostCall::SetClass { node, addr, len } => {
                self.set_class(handle(node)?, &memory.read_str(addr, len)?)?;
                None
            }
            HostCall::SetData { node, addr, len } => {
                self.set_data(handle(node)?, &memory.read_str(addr, len)?)?;
                None
            }
            HostCall::SetTextContent { node, addr, len } => {
                self.set_text_content(handle(node)?, &memory.read_str(addr, len)?)?;
                None
            }
            HostCall::SetAriaHidden { node, flag: hidden } => {
                self.set_aria_hidden(handle(node)?, flag(hidden))?;
                None
            }
            HostCall::SetBool {
                node,
                addr,
                len,
                flag: value,
            } => {
                let name = memory.read_str(addr, len)?;
                self.set_bool(handle(node)?, &name, flag(value))?;
                None
            }
            HostCall::ReplaceWith { old, new } => {
                self.replace_with(handle(old)?, handle(new)?)?;
                None
            }
            HostCall::RemoveAttribute { node, addr, len } => {
                self.remove_attribute(handle(node)?, &memory.read_str(addr, len)?)?;
                None
            }
            HostCall::RemoveNode { node } => {
                // Zero can never have been issued, so it is as unknown as
                // any stale handle.
                if let Ok(node) = handle(node) {
                    self.remove_node(node);
                }
                None
            }
            HostCall::DisposeNode { node } => {
                self.dispose_node(handle(node)?)?;
                None
            }
            HostCall::CloneNode { node } => Some(self.clone_node(handle(node)?)?),
            HostCall::MoveBefore {
                parent,
                next_key_match,
                index,
                moving,
            } => {
                self.move_before(
                    handle(parent)?,
                    flag(next_key_match),
                    index as usize,
                    handle(moving)?,
                )?;
                None
            }
            HostCall::Mount { node, addr, len } => {
                let selector = memory.read_str(addr, len)?;
                self.mount(handle(node)?, &selector)?;
                None
            }
        };
        Ok(created.map(Handle::get))
    }
}
