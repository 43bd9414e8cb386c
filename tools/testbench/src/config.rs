//! Testbench configuration
//!
//! JSON files deserialize into these structs; any missing field takes its
//! default, so `{}` is a valid configuration.

use std::path::Path;

use matching_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use types::errors::ConfigError;

/// Behaviour of the reference device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceDutConfig {
    /// Seed for latency jitter, response reordering and stalls
    pub seed: u64,
    /// Minimum cycles between accepting a command and presenting a response
    pub latency: u64,
    /// Extra random cycles added to `latency`, inclusive
    pub max_jitter: u64,
    /// Probability of raising `cmd_full` on any cycle
    pub stall_probability: f64,
}

impl Default for ReferenceDutConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            latency: 2,
            max_jitter: 4,
            stall_probability: 0.05,
        }
    }
}

impl ReferenceDutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.stall_probability) {
            return Err(ConfigError::invalid(
                "stall_probability",
                format!("must be in [0, 1), got {}", self.stall_probability),
            ));
        }
        Ok(())
    }
}

/// Reconciliation loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestbenchConfig {
    /// Table depths shared by the oracle and the reference device
    pub engine: EngineConfig,
    pub dut: ReferenceDutConfig,
    /// Cycles in the reset sequence; reset is held in the middle
    pub reset_cycles: u64,
    /// Quiet cycles sampled after all work is done
    pub drain_cycles: u64,
    /// Cycle budget; reaching it with work outstanding fails the run
    pub max_cycles: Option<u64>,
}

impl Default for TestbenchConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            dut: ReferenceDutConfig::default(),
            reset_cycles: 20,
            drain_cycles: 20,
            max_cycles: None,
        }
    }
}

impl TestbenchConfig {
    /// Read and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.dut.validate()?;
        if self.drain_cycles == 0 {
            return Err(ConfigError::invalid("drain_cycles", "must be non-zero"));
        }
        if self.max_cycles == Some(0) {
            return Err(ConfigError::invalid("max_cycles", "must be non-zero when set"));
        }
        Ok(())
    }

    /// Reset is asserted for the middle of the reset sequence
    pub fn reset_asserted(&self, cycle: u64) -> bool {
        cycle > 5 && cycle + 5 < self.reset_cycles
    }
}
