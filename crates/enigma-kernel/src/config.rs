//! Driver configuration.
//!
//! Loaded from TOML. Every key is optional; an empty document yields the
//! defaults the driver was built around:
//!
//! ```toml
//! name = "enigma"
//! magic = 0x19920342
//! block_size = 4096
//! block_size_bits = 12
//! # Optional per-instance allocation budgets
//! max_nodes = 16
//! max_entries = 16
//! ```
//!
//! Nothing here changes which paths exist after mount; the budgets only bound
//! how many nodes and entries one instance may allocate.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::constants::{DEFAULT_BLOCK_SIZE, DEFAULT_BLOCK_SIZE_BITS, ENIGMA_MAGIC, FS_NAME};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Per-instance allocation budgets. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub max_nodes: Option<usize>,
    pub max_entries: Option<usize>,
}

/// Driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnigmaConfig {
    /// Filesystem type name registered with the host.
    pub name: String,
    /// Superblock magic number.
    pub magic: u32,
    /// Block size reported to the host.
    pub block_size: u32,
    /// log2 of `block_size`.
    pub block_size_bits: u8,
    /// Node budget per instance.
    pub max_nodes: Option<usize>,
    /// Directory entry budget per instance.
    pub max_entries: Option<usize>,
}

impl Default for EnigmaConfig {
    fn default() -> Self {
        Self {
            name: FS_NAME.to_string(),
            magic: ENIGMA_MAGIC,
            block_size: DEFAULT_BLOCK_SIZE,
            block_size_bits: DEFAULT_BLOCK_SIZE_BITS,
            max_nodes: None,
            max_entries: None,
        }
    }
}

impl EnigmaConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loaded enigma config");
        Self::from_toml_str(&text)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".into()));
        }
        let expected = 1u64.checked_shl(u32::from(self.block_size_bits));
        if expected != Some(u64::from(self.block_size)) {
            return Err(ConfigError::Invalid(format!(
                "block_size {} does not match block_size_bits {}",
                self.block_size, self.block_size_bits
            )));
        }
        Ok(())
    }

    /// Set the allocation budgets.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.max_nodes = limits.max_nodes;
        self.max_entries = limits.max_entries;
        self
    }

    /// The allocation budgets.
    pub fn limits(&self) -> Limits {
        Limits {
            max_nodes: self.max_nodes,
            max_entries: self.max_entries,
        }
    }
}
