//! Size limits for docids, property names and values
//!
//! Enforced by the transaction before anything is dispatched to the Store.
//! Violations return `InvalidArgument`.

use crate::error::{DocStoreError, Result};

/// Size limits for keys and values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum docid length in bytes (default: 1024)
    pub max_docid_bytes: usize,

    /// Maximum property name length in bytes (default: 1024)
    pub max_property_bytes: usize,

    /// Maximum encoded value size in bytes (default: 16MB)
    pub max_value_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_docid_bytes: 1024,
            max_property_bytes: 1024,
            max_value_bytes: 16 * 1024 * 1024, // 16MB
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_docid_bytes: 16,
            max_property_bytes: 16,
            max_value_bytes: 64,
        }
    }

    /// Reject limits that would make every write fail
    pub fn validate(&self) -> Result<()> {
        if self.max_docid_bytes == 0 || self.max_property_bytes == 0 || self.max_value_bytes == 0
        {
            return Err(DocStoreError::invalid_argument(
                "limits must all be greater than zero",
            ));
        }
        Ok(())
    }

    /// Validate an encoded value length
    pub fn validate_value_len(&self, property: &str, len: usize) -> Result<()> {
        if len > self.max_value_bytes {
            return Err(DocStoreError::invalid_argument(format!(
                "value of property '{}' is {} bytes, exceeds maximum {}",
                property, len, self.max_value_bytes
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Limits::default().validate().is_ok());
        assert!(Limits::with_small_limits().validate().is_ok());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let limits = Limits {
            max_value_bytes: 0,
            ..Limits::default()
        };
        assert!(limits.validate().is_err());
    }

    #[test]
    fn test_value_len_at_and_over_max() {
        let limits = Limits::with_small_limits();
        assert!(limits.validate_value_len("p", 64).is_ok());
        assert!(limits.validate_value_len("p", 65).is_err());
    }
}
