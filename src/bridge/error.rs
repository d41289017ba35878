use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("unknown handle {0}")]
    UnknownHandle(u32),
    #[error("{0} is not a valid handle")]
    InvalidHandle(u32),
    #[error("node behind handle {0} is not a text node")]
    NotText(u32),
    #[error("no mount point matches selector '{0}'")]
    MountPointNotFound(String),
    #[error("span {addr}+{len} is outside guest memory of {size} bytes")]
    OutOfBounds { addr: u32, len: u32, size: usize },
    #[error("all handles are in use ({0} live)")]
    HandleSpaceExhausted(usize),
    #[error("failed to draw a handle: {0}")]
    Entropy(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
