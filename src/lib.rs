// Library exports for the demo binary and tests

pub mod bridge;
pub mod config;

pub use bridge::{
    BridgeError, BridgeResult, ClickDetail, ClickListener, DomBridge, GuestMemory, Handle,
    HostCall,
};
pub use config::{BridgeConfig, ConfigError, RoutingPolicy};
