//! Behavioural reference device
//!
//! A cycle-level stand-in for the hardware order book, built around its own
//! copy of the golden model. It reproduces the timing behaviours the harness
//! has to tolerate: responses delayed by a latency plus random jitter,
//! responses for different uids delivered out of order, command-queue stalls
//! and conditional orders maturing on their own.
//!
//! Per uid (and among trades) responses leave in the order they were
//! produced.

use matching_engine::{EngineConfig, MatchingEngine};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{trace, warn};
use types::command::Side;
use types::ids::Uid;
use types::response::Response;

use crate::config::ReferenceDutConfig;
use crate::signals::{Dut, PortsIn, PortsOut};
use crate::wire;

/// Ordering domain of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseKey {
    Uid(Uid),
    Trade,
}

impl ResponseKey {
    fn of(response: &Response) -> Self {
        match response {
            Response::Ack { uid, .. } => ResponseKey::Uid(*uid),
            Response::Trade(_) => ResponseKey::Trade,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingResponse {
    key: ResponseKey,
    response: Response,
    ready_at: u64,
}

/// Reference implementation of the `Dut` contract
pub struct ReferenceDut {
    engine: MatchingEngine,
    config: ReferenceDutConfig,
    rng: ChaCha8Rng,
    inputs: PortsIn,
    outputs: PortsOut,
    last_clk: bool,
    cycle: u64,
    /// Produced but not yet presented, oldest first
    pending: Vec<PendingResponse>,
    presenting: bool,
}

impl ReferenceDut {
    pub fn new(engine: EngineConfig, config: ReferenceDutConfig) -> Self {
        Self {
            engine: MatchingEngine::new(engine),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            inputs: PortsIn::default(),
            outputs: PortsOut::default(),
            last_clk: false,
            cycle: 0,
            pending: Vec::new(),
            presenting: false,
        }
    }

    /// The device's internal book
    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    /// Responses produced and not yet accepted
    pub fn in_flight(&self) -> usize {
        self.pending.len() + usize::from(self.presenting)
    }

    fn rising_edge(&mut self) {
        self.cycle += 1;

        if self.inputs.rst {
            self.engine.reset();
            self.pending.clear();
            self.presenting = false;
            self.outputs = PortsOut::default();
            return;
        }

        if self.presenting && self.inputs.rsp_accept {
            self.presenting = false;
            wire::clear_response(&mut self.outputs);
        }
        self.outputs.cn_mature_vld = false;

        if self.inputs.cmd_vld && !self.outputs.cmd_full {
            match wire::decode_command(&self.inputs) {
                Ok(cmd) => {
                    let responses = self.engine.apply(&cmd);
                    self.enqueue(responses);
                }
                Err(e) => warn!(error = %e, uid = self.inputs.cmd_uid, "Dropping malformed command"),
            }
        }

        if let Some(uid) = self.next_triggered() {
            if let Some(responses) = self.engine.mature(uid) {
                trace!(%uid, cycle = self.cycle, "Conditional order matured");
                self.enqueue(responses);
                self.outputs.cn_mature_vld = true;
                self.outputs.cn_mature_uid = uid.value();
            }
        }

        let stall = self.rng.gen_bool(self.config.stall_probability);
        self.outputs.cmd_full = self.next_triggered().is_some() || stall;

        if !self.presenting {
            self.present();
        }
    }

    fn enqueue(&mut self, responses: Vec<Response>) {
        for response in responses {
            let jitter = self.rng.gen_range(0..=self.config.max_jitter);
            self.pending.push(PendingResponse {
                key: ResponseKey::of(&response),
                response,
                ready_at: self.cycle + self.config.latency + jitter,
            });
        }
    }

    /// Present one ready response whose key has nothing older pending
    fn present(&mut self) {
        let eligible: Vec<usize> = (0..self.pending.len())
            .filter(|&i| {
                let entry = &self.pending[i];
                entry.ready_at <= self.cycle
                    && !self.pending[..i].iter().any(|older| older.key == entry.key)
            })
            .collect();
        if eligible.is_empty() {
            return;
        }

        let pick = eligible[self.rng.gen_range(0..eligible.len())];
        let entry = self.pending.remove(pick);
        wire::present_response(&mut self.outputs, &entry.response);
        self.presenting = true;
    }

    /// First pending conditional order whose trigger condition holds
    ///
    /// A buy stop triggers once the best ask has risen to its trigger price,
    /// a sell stop once the best bid has fallen to it.
    fn next_triggered(&self) -> Option<Uid> {
        let best_bid = self.engine.best_bid();
        let best_ask = self.engine.best_ask();
        self.engine
            .pending_conditionals()
            .iter()
            .find(|cmd| match cmd.kind.trigger() {
                Some((Side::Bid, trigger)) => best_ask.is_some_and(|ask| ask >= trigger),
                Some((Side::Ask, trigger)) => best_bid.is_some_and(|bid| bid <= trigger),
                None => false,
            })
            .map(|cmd| cmd.uid)
    }
}

impl Dut for ReferenceDut {
    fn poke(&mut self, inputs: &PortsIn) {
        self.inputs = *inputs;
    }

    fn peek(&self) -> PortsOut {
        self.outputs
    }

    fn eval(&mut self) {
        if self.inputs.clk && !self.last_clk {
            self.rising_edge();
        }
        self.last_clk = self.inputs.clk;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::command::{Command, CommandKind};
    use types::price::Price;
    use types::response::Status;

    fn quiet() -> ReferenceDutConfig {
        ReferenceDutConfig {
            seed: 7,
            latency: 1,
            max_jitter: 0,
            stall_probability: 0.0,
        }
    }

    fn clock(dut: &mut ReferenceDut, inputs: &mut PortsIn) {
        inputs.clk = false;
        dut.poke(inputs);
        dut.eval();
        inputs.clk = true;
        dut.poke(inputs);
        dut.eval();
    }

    fn issue(dut: &mut ReferenceDut, inputs: &mut PortsIn, cmd: &Command) {
        wire::drive_command(inputs, cmd);
        clock(dut, inputs);
        wire::idle(inputs);
    }

    #[test]
    fn test_acknowledges_after_latency() {
        let mut dut = ReferenceDut::new(EngineConfig::default(), quiet());
        let mut inputs = PortsIn { rsp_accept: true, ..PortsIn::default() };

        issue(&mut dut, &mut inputs, &Command::new(5, CommandKind::Nop));
        assert!(!dut.peek().rsp_vld);
        clock(&mut dut, &mut inputs);

        let out = dut.peek();
        assert!(out.rsp_vld);
        assert_eq!(out.rsp_uid, 5);
        assert_eq!(out.rsp_status, Status::Okay.code());

        clock(&mut dut, &mut inputs);
        assert!(!dut.peek().rsp_vld);
        assert_eq!(dut.in_flight(), 0);
    }

    #[test]
    fn test_response_held_until_accepted() {
        let mut dut = ReferenceDut::new(EngineConfig::default(), quiet());
        let mut inputs = PortsIn::default();

        issue(&mut dut, &mut inputs, &Command::new(1, CommandKind::Nop));
        for _ in 0..4 {
            clock(&mut dut, &mut inputs);
            assert_eq!(dut.peek().rsp_uid, 1);
        }
        inputs.rsp_accept = true;
        clock(&mut dut, &mut inputs);
        assert!(!dut.peek().rsp_vld);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut dut = ReferenceDut::new(EngineConfig::default(), quiet());
        let mut inputs = PortsIn::default();
        issue(
            &mut dut,
            &mut inputs,
            &Command::new(1, CommandKind::BuyLimit { quantity: 1, price: Price::parse("1.00") }),
        );

        inputs.rst = true;
        clock(&mut dut, &mut inputs);

        assert_eq!(dut.in_flight(), 0);
        assert!(dut.engine().book().is_empty());
        assert_eq!(dut.peek(), PortsOut::default());
    }

    #[test]
    fn test_buy_stop_matures_when_ask_reaches_trigger() {
        let mut dut = ReferenceDut::new(EngineConfig::default(), quiet());
        let mut inputs = PortsIn { rsp_accept: true, ..PortsIn::default() };

        let stop = Command::new(
            0,
            CommandKind::BuyStopLoss { quantity: 10, trigger: Price::parse("100.00") },
        );
        issue(&mut dut, &mut inputs, &stop);
        assert!(!dut.peek().cn_mature_vld);

        let ask = Command::new(1, CommandKind::SellLimit { quantity: 10, price: Price::parse("101.00") });
        issue(&mut dut, &mut inputs, &ask);

        let out = dut.peek();
        assert!(out.cn_mature_vld);
        assert_eq!(out.cn_mature_uid, 0);
        assert!(dut.engine().pending_conditionals().is_empty());
        assert!(dut.engine().book().asks.is_empty());

        clock(&mut dut, &mut inputs);
        assert!(!dut.peek().cn_mature_vld);
    }

    #[test]
    fn test_stall_blocks_command() {
        let config = ReferenceDutConfig {
            stall_probability: 1.0,
            ..quiet()
        };
        let mut dut = ReferenceDut::new(EngineConfig::default(), config);
        let mut inputs = PortsIn::default();

        clock(&mut dut, &mut inputs);
        assert!(dut.peek().cmd_full);

        issue(&mut dut, &mut inputs, &Command::new(1, CommandKind::Nop));
        assert_eq!(dut.in_flight(), 0);
    }

    #[test]
    fn test_per_uid_order_preserved() {
        let config = ReferenceDutConfig {
            latency: 0,
            max_jitter: 8,
            ..quiet()
        };
        let mut dut = ReferenceDut::new(EngineConfig { bid_depth: 1, ..EngineConfig::default() }, config);
        let mut inputs = PortsIn::default();

        // uid 0 is acknowledged then evicted by uid 1
        issue(
            &mut dut,
            &mut inputs,
            &Command::new(0, CommandKind::BuyLimit { quantity: 1, price: Price::parse("1.00") }),
        );
        issue(
            &mut dut,
            &mut inputs,
            &Command::new(1, CommandKind::BuyLimit { quantity: 1, price: Price::parse("2.00") }),
        );

        inputs.rsp_accept = true;
        let mut seen = Vec::new();
        for _ in 0..32 {
            let out = dut.peek();
            if out.rsp_vld {
                seen.push((out.rsp_uid, out.rsp_status));
            }
            clock(&mut dut, &mut inputs);
        }

        let uid0: Vec<u8> = seen.iter().filter(|(uid, _)| *uid == 0).map(|(_, s)| *s).collect();
        assert_eq!(uid0, vec![Status::Okay.code(), Status::Reject.code()]);
        assert_eq!(seen.len(), 3);
    }
}
