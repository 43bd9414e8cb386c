//! Command identifiers
//!
//! Every command carries a caller-assigned 32-bit uid. Responses echo the uid
//! of the order they concern, which lets the testbench correlate a pipelined,
//! out-of-order response stream back to the commands that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a command (and of the order it creates)
///
/// The all-ones value is reserved on the wire to tag trade events and is
/// never assigned to a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(u32);

impl Uid {
    /// Uid value the DUT drives on the response bus for trade events
    pub const TRADE_SENTINEL: Uid = Uid(u32::MAX);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }

    /// True for the reserved trade-event sentinel
    pub const fn is_sentinel(&self) -> bool {
        self.0 == u32::MAX
    }

    /// The uid following this one, used by sequential stimulus
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl From<u32> for Uid {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
