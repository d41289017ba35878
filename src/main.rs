use anyhow::{Context, Result};
use dombridge::bridge::EventSlot;
use dombridge::{BridgeConfig, ClickDetail, DomBridge, Handle, HostCall};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const PAGE: &str = "<!DOCTYPE html><html><head><title>dombridge</title></head>\
<body><main id=\"app\"></main></body></html>";

/// Linear guest memory the demo writes its strings into.
#[derive(Default)]
struct ScratchMemory {
    bytes: Vec<u8>,
}

impl ScratchMemory {
    fn push(&mut self, text: &str) -> (u32, u32) {
        let addr = self.bytes.len() as u32;
        self.bytes.extend_from_slice(text.as_bytes());
        (addr, text.len() as u32)
    }
}

fn call(bridge: &mut DomBridge, memory: &ScratchMemory, host_call: HostCall) -> Result<Option<u32>> {
    bridge
        .invoke(&memory.bytes, host_call)
        .with_context(|| format!("host call {host_call:?} failed"))
}

fn create(bridge: &mut DomBridge, memory: &ScratchMemory, host_call: HostCall) -> Result<u32> {
    call(bridge, memory, host_call)?.context("creation call returned no handle")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .ok();

    let config = BridgeConfig::from_env().context("failed to load bridge configuration")?;
    info!(routing = ?config.routing, handle_space = config.handle_space, "starting demo guest");
    let mut bridge = DomBridge::new(PAGE, config);
    let mut memory = ScratchMemory::default();

    let (ul_addr, ul_len) = memory.push("ul");
    let (li_addr, li_len) = memory.push("li");
    let (mount_addr, mount_len) = memory.push("#app");
    let (class_addr, class_len) = memory.push("keyed");
    let labels: Vec<(u32, u32)> = ["alpha", "beta", "gamma"]
        .iter()
        .map(|label| memory.push(label))
        .collect();
    let (count_addr, count_len) = memory.push("clicks: 0");

    let list = create(
        &mut bridge,
        &memory,
        HostCall::CreateElement { addr: ul_addr, len: ul_len, clicks: 0 },
    )?;
    call(
        &mut bridge,
        &memory,
        HostCall::SetClass { node: list, addr: class_addr, len: class_len },
    )?;

    let mut items = Vec::with_capacity(labels.len());
    for (addr, len) in &labels {
        let item = create(
            &mut bridge,
            &memory,
            HostCall::CreateElement { addr: li_addr, len: li_len, clicks: 0 },
        )?;
        let text = create(
            &mut bridge,
            &memory,
            HostCall::CreateTextNode { addr: *addr, len: *len },
        )?;
        call(&mut bridge, &memory, HostCall::AppendChild { parent: item, child: text })?;
        call(&mut bridge, &memory, HostCall::AppendChild { parent: list, child: item })?;
        items.push(item);
    }

    // Keyed reorder: gamma moves to the front, beta stays put.
    call(
        &mut bridge,
        &memory,
        HostCall::MoveBefore { parent: list, next_key_match: 1, index: 0, moving: items[2] },
    )?;

    let button = create(&mut bridge, &memory, HostCall::CreateButton { clicks: 1 })?;
    let counter = create(
        &mut bridge,
        &memory,
        HostCall::CreateTextNode { addr: count_addr, len: count_len },
    )?;
    call(&mut bridge, &memory, HostCall::AppendChild { parent: button, child: counter })?;

    let root = create(&mut bridge, &memory, HostCall::CreateDiv { clicks: 0 })?;
    call(&mut bridge, &memory, HostCall::AppendChild { parent: root, child: list })?;
    call(&mut bridge, &memory, HostCall::AppendChild { parent: root, child: button })?;
    call(
        &mut bridge,
        &memory,
        HostCall::Mount { node: root, addr: mount_addr, len: mount_len },
    )?;

    let button = Handle::new(button).context("button handle is zero")?;
    let counter = Handle::new(counter).context("counter handle is zero")?;
    let slot: EventSlot = bridge.event_slot();
    let mut clicks = 0u32;
    let mut on_click = |bridge: &mut DomBridge, handle: Handle| {
        if handle != button {
            return;
        }
        clicks += 1;
        let detail = slot.current().unwrap_or_default();
        info!(handle = %handle, x = detail.client_x, y = detail.client_y, "guest saw click");
        if let Err(err) = bridge.set_data(counter, &format!("clicks: {clicks}")) {
            warn!(error = %err, "guest failed to update counter");
        }
    };

    for step in 0..2u8 {
        let detail = ClickDetail::at(10.0 + f32::from(step), 20.0);
        let delivered = bridge
            .click_handle(button, detail, &mut on_click)
            .context("click on button failed")?;
        info!(delivered, "click delivered");
    }

    println!("{}", bridge.document_html());
    Ok(())
}
