//! Key/value list rendering for log lines and failure reports
//!
//! Renders as `'{key:value, key:value}'`, the format the testbench uses for
//! every command and response it prints.

use std::fmt;

/// Ordered list of rendered fields
#[derive(Debug, Clone, Default)]
pub struct KvList {
    fields: Vec<(&'static str, String)>,
}

impl KvList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field; insertion order is render order
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }
}

impl fmt::Display for KvList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{{")?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", key, value)?;
        }
        write!(f, "}}")
    }
}
