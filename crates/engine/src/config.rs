//! Store configuration via `docstore.toml`
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use docstore_core::{DocStoreError, Limits, Result};
use docstore_storage::DEFAULT_PAGE_SIZE;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "docstore.toml";

/// Document store configuration loaded from `docstore.toml`.
///
/// # Example
///
/// ```toml
/// page_size = 256
/// max_docid_bytes = 1024
/// max_property_bytes = 1024
/// max_value_bytes = 16777216
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocStoreConfig {
    /// Maximum entries per range-read response of the in-memory Ledger
    ///
    /// Only used by `DocumentStore::open_in_memory`. A store opened over an
    /// existing Ledger page reads with that page's own page size.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Maximum docid length in bytes
    #[serde(default = "default_max_docid_bytes")]
    pub max_docid_bytes: usize,
    /// Maximum property name length in bytes
    #[serde(default = "default_max_property_bytes")]
    pub max_property_bytes: usize,
    /// Maximum encoded value size in bytes
    #[serde(default = "default_max_value_bytes")]
    pub max_value_bytes: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_docid_bytes() -> usize {
    Limits::default().max_docid_bytes
}

fn default_max_property_bytes() -> usize {
    Limits::default().max_property_bytes
}

fn default_max_value_bytes() -> usize {
    Limits::default().max_value_bytes
}

impl Default for DocStoreConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_docid_bytes: default_max_docid_bytes(),
            max_property_bytes: default_max_property_bytes(),
            max_value_bytes: default_max_value_bytes(),
        }
    }
}

impl DocStoreConfig {
    /// Size limits enforced on writes
    pub fn limits(&self) -> Limits {
        Limits {
            max_docid_bytes: self.max_docid_bytes,
            max_property_bytes: self.max_property_bytes,
            max_value_bytes: self.max_value_bytes,
        }
    }

    /// Reject values that would make the store unusable
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a zero page size or a zero limit.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(DocStoreError::invalid_argument(
                "page_size must be greater than zero",
            ));
        }
        self.limits().validate()
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DocStoreConfig = toml::from_str(content).map_err(|e| {
            DocStoreError::invalid_argument(format!("Failed to parse config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DocStoreError::internal(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            DocStoreError::InvalidArgument(msg) => DocStoreError::invalid_argument(format!(
                "{} (in '{}')",
                msg,
                path.display()
            )),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                DocStoreError::internal(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Document store configuration

# Maximum entries returned per range read by the in-memory Ledger (default: 256)
page_size = 256

# Maximum docid length in bytes (default: 1024)
max_docid_bytes = 1024

# Maximum property name length in bytes (default: 1024)
max_property_bytes = 1024

# Maximum encoded value size in bytes (default: 16MB)
max_value_bytes = 16777216
"#
    }
}
