//! Engine configuration
//!
//! Table depths must mirror the parameters the device under test was built
//! with, otherwise capacity rejections diverge.

use serde::{Deserialize, Serialize};
use types::errors::ConfigError;

/// Capacity of each order collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Limit bid table depth
    pub bid_depth: usize,
    /// Limit ask table depth
    pub ask_depth: usize,
    /// Market bid queue depth
    pub market_bid_depth: usize,
    /// Market ask queue depth
    pub market_ask_depth: usize,
    /// Pending conditional order capacity
    pub conditional_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bid_depth: 16,
            ask_depth: 16,
            market_bid_depth: 16,
            market_ask_depth: 16,
            conditional_depth: 16,
        }
    }
}

impl EngineConfig {
    /// Every collection needs room for at least one entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let depths = [
            ("bid_depth", self.bid_depth),
            ("ask_depth", self.ask_depth),
            ("market_bid_depth", self.market_bid_depth),
            ("market_ask_depth", self.market_ask_depth),
            ("conditional_depth", self.conditional_depth),
        ];
        for (field, depth) in depths {
            if depth == 0 {
                return Err(ConfigError::invalid(field, "must be non-zero"));
            }
        }
        Ok(())
    }
}
