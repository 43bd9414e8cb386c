//! Run failures
//!
//! Every variant ends the run. Domain rejections from the device are not
//! failures; they are predicted like any other response.

use thiserror::Error;
use types::command::Command;
use types::errors::{ConfigError, WireError};
use types::ids::Uid;
use types::response::Response;

#[derive(Error, Debug)]
pub enum TestbenchError {
    #[error("Response mismatch at cycle {cycle}: expected {expected}, actual {actual}, command {context}")]
    Mismatch {
        cycle: u64,
        context: Command,
        expected: Response,
        actual: Response,
    },

    #[error("Unexpected response at cycle {cycle}: {actual}")]
    UnexpectedResponse { cycle: u64, actual: Response },

    #[error("Maturation of unknown conditional order {uid} at cycle {cycle}")]
    UnknownMaturation { cycle: u64, uid: Uid },

    #[error("{remaining} responses outstanding at cycle {cycle}, first: {first}")]
    Outstanding {
        cycle: u64,
        remaining: usize,
        first: String,
    },

    #[error("Undecodable response at cycle {cycle}: {source}")]
    Wire {
        cycle: u64,
        #[source]
        source: WireError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TestbenchError {
    /// Cycle the failure was detected at, when it happened during a run
    pub fn cycle(&self) -> Option<u64> {
        match self {
            TestbenchError::Mismatch { cycle, .. }
            | TestbenchError::UnexpectedResponse { cycle, .. }
            | TestbenchError::UnknownMaturation { cycle, .. }
            | TestbenchError::Outstanding { cycle, .. }
            | TestbenchError::Wire { cycle, .. } => Some(*cycle),
            TestbenchError::Config(_) => None,
        }
    }
}
