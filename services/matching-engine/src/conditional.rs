//! Conditional order controller
//!
//! Holds stop-loss and stop-limit commands verbatim until something outside
//! the engine (the device's trigger signal) reports that one has matured.
//! Maturation removes the order here and hands back the live command it
//! converts into; from that point its uid belongs to the live tables.
//!
//! Pending orders are kept in a BTreeMap so iteration order is deterministic.

use std::collections::BTreeMap;
use types::command::Command;
use types::ids::Uid;

/// Bounded set of pending conditional orders, keyed by uid
#[derive(Debug, Clone)]
pub struct ConditionalController {
    pending: BTreeMap<Uid, Command>,
    capacity: usize,
}

impl ConditionalController {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: BTreeMap::new(),
            capacity,
        }
    }

    /// Store a conditional command
    ///
    /// Refused when the command is not a stop order, the uid is already
    /// pending, or the controller is full.
    pub fn insert(&mut self, cmd: Command) -> bool {
        if !cmd.opcode().is_conditional()
            || self.pending.contains_key(&cmd.uid)
            || self.pending.len() >= self.capacity
        {
            return false;
        }
        self.pending.insert(cmd.uid, cmd);
        true
    }

    /// Drop a pending order; true if it was present
    pub fn cancel(&mut self, uid: Uid) -> bool {
        self.pending.remove(&uid).is_some()
    }

    /// Remove a pending order and return the live command it becomes
    pub fn mature(&mut self, uid: Uid) -> Option<Command> {
        self.pending.remove(&uid).and_then(|cmd| cmd.matured())
    }

    pub fn get(&self, uid: Uid) -> Option<&Command> {
        self.pending.get(&uid)
    }

    pub fn contains(&self, uid: Uid) -> bool {
        self.pending.contains_key(&uid)
    }

    /// Pending commands in uid order
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.pending.values()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
