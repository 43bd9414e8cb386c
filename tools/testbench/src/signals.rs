//! DUT signal boundary
//!
//! Port values are plain integers as they appear on the device pins. Prices
//! are carried packed (20-bit BCD), uids as raw 32-bit values. The harness
//! toggles `clk` itself, one `eval` per half-cycle.

use serde::Serialize;

/// Inputs driven into the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PortsIn {
    pub clk: bool,
    pub rst: bool,
    /// Harness accepts the presented response
    pub rsp_accept: bool,
    pub cmd_vld: bool,
    pub cmd_opcode: u8,
    pub cmd_uid: u32,
    pub cmd_quantity: u32,
    pub cmd_price: u32,
    /// Secondary price (stop trigger)
    pub cmd_price1: u32,
    /// Secondary uid (cancel target)
    pub cmd_uid1: u32,
}

/// Outputs sampled from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PortsOut {
    /// Command queue full; the harness holds its next command
    pub cmd_full: bool,
    pub rsp_vld: bool,
    pub rsp_uid: u32,
    pub rsp_status: u8,
    pub rsp_trade_bid_uid: u32,
    pub rsp_trade_ask_uid: u32,
    pub rsp_trade_quantity: u32,
    pub rsp_bid: u32,
    pub rsp_ask: u32,
    pub rsp_pop_price: u32,
    pub rsp_pop_quantity: u32,
    pub rsp_pop_uid: u32,
    pub rsp_accum: u64,
    /// One-cycle pulse: a conditional order matured
    pub cn_mature_vld: bool,
    pub cn_mature_uid: u32,
}

/// A clocked device under test
pub trait Dut {
    /// Drive input ports; takes effect on the next `eval`
    fn poke(&mut self, inputs: &PortsIn);

    /// Current output ports
    fn peek(&self) -> PortsOut;

    /// Settle the device after an input change
    fn eval(&mut self);
}

impl<D: Dut + ?Sized> Dut for Box<D> {
    fn poke(&mut self, inputs: &PortsIn) {
        (**self).poke(inputs)
    }

    fn peek(&self) -> PortsOut {
        (**self).peek()
    }

    fn eval(&mut self) {
        (**self).eval()
    }
}
