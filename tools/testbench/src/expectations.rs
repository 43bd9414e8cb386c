//! Predicted responses awaiting observation
//!
//! Acknowledgements are queued per uid and consumed in the order the model
//! produced them for that uid. Trades are not addressed to any command and
//! are consumed from one global FIFO. Each prediction keeps the command that
//! provoked it, which is what gives opaque payload fields their meaning.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;
use types::command::Command;
use types::ids::Uid;
use types::response::Response;

/// A predicted response and the command that provoked it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expectation {
    pub context: Command,
    pub response: Response,
}

/// In-flight predictions
#[derive(Debug, Clone, Default)]
pub struct ExpectationTable {
    acks: BTreeMap<Uid, VecDeque<Expectation>>,
    trades: VecDeque<Expectation>,
    len: usize,
}

impl ExpectationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every response the model produced for `context`
    pub fn push(&mut self, context: Command, responses: impl IntoIterator<Item = Response>) {
        for response in responses {
            let expectation = Expectation { context, response };
            match response {
                Response::Trade(_) => self.trades.push_back(expectation),
                Response::Ack { uid, .. } => self.acks.entry(uid).or_default().push_back(expectation),
            }
            self.len += 1;
        }
    }

    /// Oldest outstanding acknowledgement for `uid`
    pub fn front_ack(&self, uid: Uid) -> Option<&Expectation> {
        self.acks.get(&uid).and_then(VecDeque::front)
    }

    pub fn pop_ack(&mut self, uid: Uid) -> Option<Expectation> {
        let queue = self.acks.get_mut(&uid)?;
        let expectation = queue.pop_front();
        if queue.is_empty() {
            self.acks.remove(&uid);
        }
        if expectation.is_some() {
            self.len -= 1;
        }
        expectation
    }

    pub fn pop_trade(&mut self) -> Option<Expectation> {
        let expectation = self.trades.pop_front();
        if expectation.is_some() {
            self.len -= 1;
        }
        expectation
    }

    /// First outstanding prediction, trades before acknowledgements, lowest uid first
    pub fn first_outstanding(&self) -> Option<&Expectation> {
        self.trades
            .front()
            .or_else(|| self.acks.values().find_map(VecDeque::front))
    }

    pub fn pending_trades(&self) -> usize {
        self.trades.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
