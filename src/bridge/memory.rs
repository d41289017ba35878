//! Access to the guest module's linear memory.

use super::error::{BridgeError, BridgeResult};

/// Read-only view of the guest's linear memory.
pub trait GuestMemory {
    fn bytes(&self) -> &[u8];

    fn span(&self, addr: u32, len: u32) -> BridgeResult<&[u8]> {
        let bytes = self.bytes();
        let start = addr as usize;
        let end = start.checked_add(len as usize);
        match end {
            Some(end) if end <= bytes.len() => Ok(&bytes[start..end]),
            _ => Err(BridgeError::OutOfBounds {
                addr,
                len,
                size: bytes.len(),
            }),
        }
    }

    /// Decodes a UTF-8 span, replacing invalid sequences with U+FFFD.
    fn read_str(&self, addr: u32, len: u32) -> BridgeResult<String> {
        Ok(String::from_utf8_lossy(self.span(addr, len)?).into_owned())
    }
}

impl GuestMemory for [u8] {
    fn bytes(&self) -> &[u8] {
        self
    }
}

impl GuestMemory for Vec<u8> {
    fn bytes(&self) -> &[u8] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_spans() {
        let memory = b"tdhello".to_vec();
        assert_eq!(memory.read_str(0, 2).unwrap(), "td");
        assert_eq!(memory.read_str(2, 5).unwrap(), "hello");
        assert_eq!(memory.read_str(7, 0).unwrap(), "");
    }

    #[test]
    fn rejects_out_of_range_spans() {
        let memory = vec![0u8; 4];
        assert_eq!(
            memory.read_str(2, 3),
            Err(BridgeError::OutOfBounds {
                addr: 2,
                len: 3,
                size: 4
            })
        );
        assert!(memory.span(u32::MAX, u32::MAX).is_err());
    }

    #[test]
    fn replaces_invalid_utf8() {
        let memory = vec![b'a', 0xff, b'b'];
        assert_eq!(memory.read_str(0, 3).unwrap(), "a\u{fffd}b");
    }
}
