//! Reconciliation loop
//!
//! Drives stimulus into the device one command per cycle, mirrors every
//! accepted command into the oracle and checks each observed response
//! against the oracle's prediction. Responses may come back in any order
//! across uids; per uid, and among trades, they must come back in the order
//! predicted.
//!
//! Each cycle, in order:
//! 1. sample the device outputs
//! 2. apply an observed maturation to the oracle
//! 3. check an observed response
//! 4. unless the device reports its command queue full, drive the next
//!    command and apply it to the oracle
//! 5. advance the clock one cycle (two half-cycles)
//!
//! Applying maturations before the next command keeps the oracle's order of
//! state changes identical to the device's.

use std::collections::VecDeque;

use matching_engine::MatchingEngine;
use serde::Serialize;
use tracing::{debug, info};
use types::command::{Command, Opcode};
use types::ids::Uid;

use crate::config::TestbenchConfig;
use crate::errors::TestbenchError;
use crate::expectations::ExpectationTable;
use crate::signals::{Dut, PortsIn, PortsOut};
use crate::wire;

/// Time units per half-cycle
const HALF_CYCLE: u64 = 5;

/// Counters reported at the end of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub cycles: u64,
    pub commands_issued: u64,
    pub acks_checked: u64,
    pub trades_checked: u64,
    pub maturations: u64,
    pub stall_cycles: u64,
}

/// Mutable state of one run, threaded through every step
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub cycle: u64,
    pub time: u64,
    pub expectations: ExpectationTable,
    pub summary: RunSummary,
}

/// Harness pairing a device with the oracle
pub struct Testbench<D: Dut> {
    dut: D,
    oracle: MatchingEngine,
    config: TestbenchConfig,
    stimulus: VecDeque<Command>,
    ports: PortsIn,
    session: Session,
}

impl<D: Dut> Testbench<D> {
    pub fn new(dut: D, config: TestbenchConfig) -> Self {
        Self {
            dut,
            oracle: MatchingEngine::new(config.engine.clone()),
            config,
            stimulus: VecDeque::new(),
            ports: PortsIn::default(),
            session: Session::default(),
        }
    }

    /// Queue a command for issue
    pub fn push_back(&mut self, cmd: Command) {
        self.stimulus.push_back(cmd);
    }

    pub fn extend(&mut self, cmds: impl IntoIterator<Item = Command>) {
        self.stimulus.extend(cmds);
    }

    pub fn dut(&self) -> &D {
        &self.dut
    }

    pub fn oracle(&self) -> &MatchingEngine {
        &self.oracle
    }

    /// State of the last (or current) run
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Reset the device, then run until all stimulus is issued and every
    /// prediction observed
    pub fn run(&mut self) -> Result<RunSummary, TestbenchError> {
        self.config.validate()?;
        self.oracle.reset();
        let mut session = Session::default();
        info!(commands = self.stimulus.len(), "Testbench run started");

        let result = self.run_session(&mut session);
        session.summary.cycles = session.cycle;
        self.session = session;

        let summary = result.map(|()| self.session.summary.clone())?;
        info!(
            cycles = summary.cycles,
            commands = summary.commands_issued,
            acks = summary.acks_checked,
            trades = summary.trades_checked,
            maturations = summary.maturations,
            "Testbench run passed"
        );
        Ok(summary)
    }

    fn run_session(&mut self, session: &mut Session) -> Result<(), TestbenchError> {
        self.reset(session);
        self.ports.rsp_accept = true;
        wire::idle(&mut self.ports);

        let mut quiet = 0;
        loop {
            let work_left = !self.stimulus.is_empty() || !session.expectations.is_empty();
            if let Some(max) = self.config.max_cycles {
                if session.cycle >= max {
                    if work_left {
                        return Err(self.outstanding(session));
                    }
                    return Ok(());
                }
            }

            let active = self.tick(session)?;
            if !self.stimulus.is_empty() || !session.expectations.is_empty() || active {
                quiet = 0;
            } else {
                quiet += 1;
                if quiet >= self.config.drain_cycles {
                    return Ok(());
                }
            }
        }
    }

    fn reset(&mut self, session: &mut Session) {
        wire::idle(&mut self.ports);
        for i in 0..self.config.reset_cycles {
            self.ports.rst = self.config.reset_asserted(i);
            self.step(session);
        }
        self.ports.rst = false;
        debug!(cycle = session.cycle, "Reset complete");
    }

    /// One cycle; true if the device showed any activity
    fn tick(&mut self, session: &mut Session) -> Result<bool, TestbenchError> {
        let out = self.dut.peek();

        if out.cn_mature_vld {
            self.mature(session, Uid::new(out.cn_mature_uid))?;
        }
        if out.rsp_vld {
            self.check_response(session, &out)?;
        }

        if out.cmd_full {
            session.summary.stall_cycles += 1;
            wire::idle(&mut self.ports);
        } else if let Some(cmd) = self.stimulus.pop_front() {
            self.issue(session, cmd);
        } else {
            wire::idle(&mut self.ports);
        }

        self.step(session);
        Ok(out.cn_mature_vld || out.rsp_vld)
    }

    fn issue(&mut self, session: &mut Session, cmd: Command) {
        debug!(cycle = session.cycle, command = %cmd, "Issue command");
        wire::drive_command(&mut self.ports, &cmd);
        let responses = self.oracle.apply(&cmd);
        session.expectations.push(cmd, responses);
        session.summary.commands_issued += 1;
    }

    fn mature(&mut self, session: &mut Session, uid: Uid) -> Result<(), TestbenchError> {
        let context = self
            .oracle
            .pending_conditionals()
            .get(uid)
            .and_then(Command::matured);
        let (Some(context), Some(responses)) = (context, self.oracle.mature(uid)) else {
            return Err(TestbenchError::UnknownMaturation {
                cycle: session.cycle,
                uid,
            });
        };
        debug!(cycle = session.cycle, command = %context, "Conditional order matured");
        session.expectations.push(context, responses);
        session.summary.maturations += 1;
        Ok(())
    }

    fn check_response(&mut self, session: &mut Session, out: &PortsOut) -> Result<(), TestbenchError> {
        let cycle = session.cycle;
        let uid = Uid::new(out.rsp_uid);

        let (actual, expectation) = if uid.is_sentinel() {
            let actual = wire::decode_trade(out);
            (actual, session.expectations.pop_trade())
        } else {
            let Some(context) = session.expectations.front_ack(uid).map(|e| e.context.opcode()) else {
                let actual = wire::decode_ack(out, Opcode::Nop)
                    .map_err(|source| TestbenchError::Wire { cycle, source })?;
                return Err(TestbenchError::UnexpectedResponse { cycle, actual });
            };
            let actual = wire::decode_ack(out, context)
                .map_err(|source| TestbenchError::Wire { cycle, source })?;
            (actual, session.expectations.pop_ack(uid))
        };
        debug!(cycle, response = %actual, "Response received");

        let Some(expectation) = expectation else {
            return Err(TestbenchError::UnexpectedResponse { cycle, actual });
        };
        if actual != expectation.response {
            return Err(TestbenchError::Mismatch {
                cycle,
                context: expectation.context,
                expected: expectation.response,
                actual,
            });
        }

        if actual.is_trade() {
            session.summary.trades_checked += 1;
        } else {
            session.summary.acks_checked += 1;
        }
        Ok(())
    }

    fn outstanding(&self, session: &Session) -> TestbenchError {
        let first = match session.expectations.first_outstanding() {
            Some(e) => format!("{} for command {}", e.response, e.context),
            None => match self.stimulus.front() {
                Some(cmd) => format!("unissued command {cmd}"),
                None => String::from("none"),
            },
        };
        TestbenchError::Outstanding {
            cycle: session.cycle,
            remaining: session.expectations.len() + self.stimulus.len(),
            first,
        }
    }

    /// Advance one clock cycle
    fn step(&mut self, session: &mut Session) {
        self.ports.clk = false;
        self.dut.poke(&self.ports);
        self.dut.eval();
        session.time += HALF_CYCLE;

        self.ports.clk = true;
        self.dut.poke(&self.ports);
        self.dut.eval();
        session.time += HALF_CYCLE;
        session.cycle += 1;
    }
}
