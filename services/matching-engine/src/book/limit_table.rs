//! Bounded limit order table
//!
//! Entries are kept in priority order, best first: bids by price descending,
//! asks by price ascending, ties by arrival. Insertion lands after every entry
//! of equal or better price, which is what a stable sort after push would
//! produce. The table may transiently hold one entry more than its depth;
//! the engine evicts the tail once matching has settled.

use serde::Serialize;
use types::command::{Quantity, Side};
use types::ids::Uid;
use types::price::Price;

use super::{Head, Order};

/// Resting limit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitEntry {
    pub price: Price,
    pub order: Order,
}

impl LimitEntry {
    pub(crate) fn as_head(&mut self) -> Head<'_> {
        Head {
            price: Some(self.price),
            order: &mut self.order,
        }
    }
}

/// Price-time ordered table for one side of the book
#[derive(Debug, Clone)]
pub struct LimitTable {
    side: Side,
    depth: usize,
    entries: Vec<LimitEntry>,
}

impl LimitTable {
    pub fn new(side: Side, depth: usize) -> Self {
        Self {
            side,
            depth,
            entries: Vec::with_capacity(depth + 1),
        }
    }

    /// True when `a` has strictly higher priority than `b`
    fn outranks(&self, a: Price, b: Price) -> bool {
        match self.side {
            Side::Bid => a > b,
            Side::Ask => a < b,
        }
    }

    /// Insert behind all entries of equal or better price
    pub fn insert(&mut self, price: Price, order: Order) {
        let position = self
            .entries
            .iter()
            .position(|entry| self.outranks(price, entry.price))
            .unwrap_or(self.entries.len());
        self.entries.insert(position, LimitEntry { price, order });
    }

    /// Best entry
    pub fn head(&self) -> Option<&LimitEntry> {
        self.entries.first()
    }

    pub(crate) fn head_mut(&mut self) -> Option<&mut LimitEntry> {
        self.entries.first_mut()
    }

    pub fn best_price(&self) -> Option<Price> {
        self.head().map(|entry| entry.price)
    }

    /// Remove and return the best entry
    pub fn pop_head(&mut self) -> Option<LimitEntry> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    /// Remove the entry with `uid`, wherever it sits
    pub fn remove(&mut self, uid: Uid) -> Option<LimitEntry> {
        let position = self.entries.iter().position(|entry| entry.order.uid == uid)?;
        Some(self.entries.remove(position))
    }

    /// Drop the lowest-priority entry if the table is over depth
    pub fn evict_overflow(&mut self) -> Option<LimitEntry> {
        if self.entries.len() > self.depth {
            self.entries.pop()
        } else {
            None
        }
    }

    /// Summed quantity of entries priced at `price` or better
    ///
    /// Better means higher for bids, lower for asks.
    pub fn accumulate(&self, price: Price) -> u64 {
        self.entries
            .iter()
            .filter(|entry| !self.outranks(price, entry.price))
            .map(|entry| u64::from(entry.order.quantity))
            .sum()
    }

    pub fn total_quantity(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.order.quantity))
            .sum()
    }

    /// Quantity resting under `uid`, if present
    pub fn quantity_of(&self, uid: Uid) -> Option<Quantity> {
        self.entries
            .iter()
            .find(|entry| entry.order.uid == uid)
            .map(|entry| entry.order.quantity)
    }

    pub fn entries(&self) -> &[LimitEntry] {
        &self.entries
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
