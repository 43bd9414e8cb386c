//! Error types shared across the testbench crates
//!
//! Domain rejections (a full table, a cancel that misses) are not errors: they
//! travel as ordinary response statuses. The types here cover malformed input
//! only.

use thiserror::Error;

/// Checked price parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("Malformed price: {0:?}")]
    Malformed(String),

    #[error("Reserved sentinel price: {0}")]
    Reserved(String),
}

/// Undecodable values on the DUT signal boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("Unknown opcode code: {0}")]
    UnknownOpcode(u8),

    #[error("Unknown status code: {0}")]
    UnknownStatus(u8),
}

/// Invalid configuration values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("Failed to read config {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
