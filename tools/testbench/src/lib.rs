//! Order Book Testbench
//!
//! Cycle-level harness that drives commands into a device under test,
//! predicts every response with the golden model and checks what the device
//! answers, tolerating pipelined out-of-order delivery.
//!
//! # Modules
//! - `signals`: DUT port structs and the `Dut` trait
//! - `wire`: Command/response encoding on the signal boundary
//! - `expectations`: Predicted responses keyed by uid, plus the trade FIFO
//! - `bench`: Reconciliation loop and run session
//! - `dut`: Behavioural reference device
//! - `stimulus`: Weighted random command generation
//! - `config`: Testbench and reference device configuration
//! - `errors`: Run failures

pub mod bench;
pub mod config;
pub mod dut;
pub mod errors;
pub mod expectations;
pub mod signals;
pub mod stimulus;
pub mod wire;

pub use bench::{RunSummary, Session, Testbench};
pub use config::{ReferenceDutConfig, TestbenchConfig};
pub use dut::ReferenceDut;
pub use errors::TestbenchError;
pub use signals::{Dut, PortsIn, PortsOut};
pub use stimulus::{Bag, Mix, StimulusConfig, StimulusGenerator};

/// Crate version constant
pub const VERSION: &str = "1.0.0";
