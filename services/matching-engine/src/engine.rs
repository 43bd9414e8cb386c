//! Matching engine core
//!
//! Main coordinator for the order book, trade matching and the conditional
//! order controller. `apply` is a synchronous state transition returning the
//! responses a command provokes, in the order the device emits them per uid.

use serde::Serialize;
use tracing::{debug, trace};
use types::command::{Command, CommandKind, Quantity, Side};
use types::ids::Uid;
use types::price::Price;
use types::response::{Payload, Response, Status};

use crate::book::{LimitEntry, Order, OrderBook};
use crate::conditional::ConditionalController;
use crate::config::EngineConfig;
use crate::matching;

/// Golden model of the order book
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    config: EngineConfig,
    book: OrderBook,
    conditional: ConditionalController,
}

impl MatchingEngine {
    /// Create an empty engine sized by `config`
    pub fn new(config: EngineConfig) -> Self {
        Self {
            book: OrderBook::new(&config),
            conditional: ConditionalController::new(config.conditional_depth),
            config,
        }
    }

    /// Apply a command and return the responses it provokes
    ///
    /// This is the main entry point. Trade events are interleaved in the
    /// order they fire; a capacity eviction is reported last.
    pub fn apply(&mut self, cmd: &Command) -> Vec<Response> {
        let uid = cmd.uid;
        let mut responses = Vec::new();

        match cmd.kind {
            CommandKind::Nop => responses.push(Response::status(uid, Status::Okay)),
            CommandKind::QueryBidAsk => {
                let response = match (self.book.bids.best_price(), self.book.asks.best_price()) {
                    (Some(bid), Some(ask)) => Response::okay(uid, Payload::BookTop { bid, ask }),
                    _ => Response::status(uid, Status::Bad),
                };
                responses.push(response);
            }
            CommandKind::BuyLimit { quantity, price } => {
                self.insert_limit(Side::Bid, uid, quantity, price, &mut responses)
            }
            CommandKind::SellLimit { quantity, price } => {
                self.insert_limit(Side::Ask, uid, quantity, price, &mut responses)
            }
            CommandKind::BuyMarket { quantity } => {
                self.insert_market(Side::Bid, uid, quantity, &mut responses)
            }
            CommandKind::SellMarket { quantity } => {
                self.insert_market(Side::Ask, uid, quantity, &mut responses)
            }
            CommandKind::PopTopBid => responses.push(Self::pop_top(uid, self.book.bids.pop_head())),
            CommandKind::PopTopAsk => responses.push(Self::pop_top(uid, self.book.asks.pop_head())),
            CommandKind::Cancel { target } => {
                let status = if self.cancel(target) {
                    Status::CancelHit
                } else {
                    Status::CancelMiss
                };
                responses.push(Response::status(uid, status));
            }
            CommandKind::QueryAsksAtOrBelow { price } => {
                let quantity =
                    self.book.asks.accumulate(price) + self.book.market_asks.total_quantity();
                responses.push(Response::okay(uid, Payload::Accumulator { quantity }));
            }
            CommandKind::QueryBidsAtOrAbove { price } => {
                let quantity =
                    self.book.bids.accumulate(price) + self.book.market_bids.total_quantity();
                responses.push(Response::okay(uid, Payload::Accumulator { quantity }));
            }
            CommandKind::BuyStopLoss { .. }
            | CommandKind::SellStopLoss { .. }
            | CommandKind::BuyStopLimit { .. }
            | CommandKind::SellStopLimit { .. } => {
                let status = if self.conditional.insert(*cmd) {
                    Status::Okay
                } else {
                    Status::Reject
                };
                responses.push(Response::status(uid, status));
            }
        }

        trace!(command = %cmd, responses = responses.len(), "Command applied");
        responses
    }

    /// Mature a pending conditional order and apply the live order it becomes
    ///
    /// Returns `None` if `uid` is not pending.
    pub fn mature(&mut self, uid: Uid) -> Option<Vec<Response>> {
        let matured = self.conditional.mature(uid)?;
        debug!(command = %matured, "Conditional order matured");
        Some(self.apply(&matured))
    }

    fn insert_limit(
        &mut self,
        side: Side,
        uid: Uid,
        quantity: Quantity,
        price: Price,
        responses: &mut Vec<Response>,
    ) {
        responses.push(Response::status(uid, Status::Okay));
        self.book
            .limit_table_mut(side)
            .insert(price, Order::new(uid, quantity));
        self.match_book(responses);

        if let Some(evicted) = self.book.limit_table_mut(side).evict_overflow() {
            debug!(uid = %evicted.order.uid, ?side, "Limit table over depth, evicting tail");
            responses.push(Response::status(evicted.order.uid, Status::Reject));
        }
    }

    fn insert_market(
        &mut self,
        side: Side,
        uid: Uid,
        quantity: Quantity,
        responses: &mut Vec<Response>,
    ) {
        if !self
            .book
            .market_queue_mut(side)
            .push_back(Order::new(uid, quantity))
        {
            responses.push(Response::status(uid, Status::Reject));
            return;
        }
        responses.push(Response::status(uid, Status::Okay));
        self.match_book(responses);
    }

    fn match_book(&mut self, responses: &mut Vec<Response>) {
        responses.extend(
            matching::match_book(&mut self.book)
                .into_iter()
                .map(Response::Trade),
        );
    }

    fn pop_top(uid: Uid, entry: Option<LimitEntry>) -> Response {
        match entry {
            Some(LimitEntry { price, order }) => Response::okay(
                uid,
                Payload::PopTop {
                    price,
                    quantity: order.quantity,
                    uid: order.uid,
                },
            ),
            None => Response::status(uid, Status::BadPop),
        }
    }

    /// Remove `uid` from the book or the conditional set, at most once
    fn cancel(&mut self, uid: Uid) -> bool {
        self.book.remove(uid) || self.conditional.cancel(uid)
    }

    /// Clear every collection
    pub fn reset(&mut self) {
        self.book.clear();
        self.conditional.clear();
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn pending_conditionals(&self) -> &ConditionalController {
        &self.conditional
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.book.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.book.asks.best_price()
    }

    /// Quantity resting in the four live collections
    pub fn resting_quantity(&self) -> u64 {
        self.book.resting_quantity()
    }

    /// Copy of every collection, best first
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            bids: self.book.bids.entries().to_vec(),
            asks: self.book.asks.entries().to_vec(),
            market_bids: self.book.market_bids.iter().copied().collect(),
            market_asks: self.book.market_asks.iter().copied().collect(),
            conditional: self.conditional.iter().map(|cmd| cmd.uid).collect(),
        }
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Order book snapshot for reports and assertions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookSnapshot {
    pub bids: Vec<LimitEntry>,
    pub asks: Vec<LimitEntry>,
    pub market_bids: Vec<Order>,
    pub market_asks: Vec<Order>,
    pub conditional: Vec<Uid>,
}

impl BookSnapshot {
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
            && self.asks.is_empty()
            && self.market_bids.is_empty()
            && self.market_asks.is_empty()
            && self.conditional.is_empty()
    }
}
