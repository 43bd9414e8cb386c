//! Order book golden model
//!
//! Software reference for the hardware order book: two bounded price-time
//! limit tables, two bounded FIFO market queues and a conditional order
//! controller. Used as the oracle of the testbench and as the core of the
//! reference device.
//!
//! **Key Invariants:**
//! - Price-time priority strictly enforced
//! - Deterministic matching (same inputs → same outputs)
//! - Conservation of quantity
//! - A uid lives in at most one collection

pub mod book;
pub mod conditional;
pub mod config;
pub mod engine;
pub mod matching;

pub use conditional::ConditionalController;
pub use config::EngineConfig;
pub use engine::{BookSnapshot, MatchingEngine};
