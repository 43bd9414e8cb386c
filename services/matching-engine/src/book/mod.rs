//! Order book storage
//!
//! Four collections: limit bids, limit asks, market bids, market asks. A uid
//! lives in at most one of them.

pub mod limit_table;
pub mod market_queue;

pub use limit_table::{LimitEntry, LimitTable};
pub use market_queue::MarketQueue;

use serde::Serialize;
use types::command::{Quantity, Side};
use types::ids::Uid;
use types::price::Price;

use crate::config::EngineConfig;

/// A resting order; its price, if any, is held by the table it rests in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Order {
    pub uid: Uid,
    pub quantity: Quantity,
}

impl Order {
    pub fn new(uid: Uid, quantity: Quantity) -> Self {
        Self { uid, quantity }
    }

    pub fn is_filled(&self) -> bool {
        self.quantity == 0
    }
}

/// Mutable view of the head of a collection during matching
///
/// `price` is `None` for market orders.
pub(crate) struct Head<'a> {
    pub price: Option<Price>,
    pub order: &'a mut Order,
}

/// The four order collections of a single-instrument book
#[derive(Debug, Clone)]
pub struct OrderBook {
    pub bids: LimitTable,
    pub asks: LimitTable,
    pub market_bids: MarketQueue,
    pub market_asks: MarketQueue,
}

impl OrderBook {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            bids: LimitTable::new(Side::Bid, config.bid_depth),
            asks: LimitTable::new(Side::Ask, config.ask_depth),
            market_bids: MarketQueue::new(config.market_bid_depth),
            market_asks: MarketQueue::new(config.market_ask_depth),
        }
    }

    pub fn limit_table_mut(&mut self, side: Side) -> &mut LimitTable {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    pub fn market_queue_mut(&mut self, side: Side) -> &mut MarketQueue {
        match side {
            Side::Bid => &mut self.market_bids,
            Side::Ask => &mut self.market_asks,
        }
    }

    /// Remove `uid` from the first collection holding it
    ///
    /// Search order: limit bids, market bids, limit asks, market asks.
    pub fn remove(&mut self, uid: Uid) -> bool {
        self.bids.remove(uid).is_some()
            || self.market_bids.remove(uid).is_some()
            || self.asks.remove(uid).is_some()
            || self.market_asks.remove(uid).is_some()
    }

    /// Pop the head of one collection if its quantity reached zero
    pub(crate) fn retire_filled_head(&mut self, side: Side, market: bool) {
        if market {
            let queue = self.market_queue_mut(side);
            if queue.front().is_some_and(Order::is_filled) {
                queue.pop_front();
            }
        } else {
            let table = self.limit_table_mut(side);
            if table.head().is_some_and(|entry| entry.order.is_filled()) {
                table.pop_head();
            }
        }
    }

    /// Quantity resting across all four collections
    pub fn resting_quantity(&self) -> u64 {
        self.bids.total_quantity()
            + self.asks.total_quantity()
            + self.market_bids.total_quantity()
            + self.market_asks.total_quantity()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
            && self.asks.is_empty()
            && self.market_bids.is_empty()
            && self.market_asks.is_empty()
    }

    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.market_bids.clear();
        self.market_asks.clear();
    }
}
