//! Types library for the order book testbench
//!
//! Wire-level vocabulary shared by the golden model and the testbench: the
//! BCD price codec, command and response variants, and their renderers.
//!
//! # Modules
//! - `ids`: Command identifiers (`Uid`)
//! - `price`: Fixed-point BCD price codec
//! - `command`: Opcodes and command operands
//! - `response`: Statuses, payloads and trade events
//! - `render`: Key/value rendering for logs and reports
//! - `errors`: Error taxonomy

pub mod ids;
pub mod price;
pub mod command;
pub mod response;
pub mod render;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::price::*;
    pub use crate::command::*;
    pub use crate::response::*;
    pub use crate::errors::*;
}
