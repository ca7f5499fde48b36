//! Identifier types
//!
//! - PageId: identifies one page (one document store instance) in the Ledger

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a Ledger page
///
/// 16 bytes, UUID-backed. Displayed as 32 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(Uuid);

impl PageId {
    /// Create a new random PageId
    pub fn new() -> Self {
        PageId(Uuid::new_v4())
    }

    /// Create PageId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        PageId(Uuid::from_bytes(bytes))
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_unique() {
        assert_ne!(PageId::new(), PageId::new());
    }

    #[test]
    fn test_page_id_bytes_round_trip() {
        let id = PageId::new();
        assert_eq!(PageId::from_bytes(*id.as_bytes()), id);
    }

    #[test]
    fn test_page_id_display_is_hex() {
        let id = PageId::from_bytes([0xab; 16]);
        assert_eq!(id.to_string(), "ab".repeat(16));
    }
}
