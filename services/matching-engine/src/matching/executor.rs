//! Trade execution logic
//!
//! Fires a single trade between the heads of one bid collection and one ask
//! collection. The smaller head is consumed, the larger keeps its place with
//! its quantity reduced.

use types::command::Side;
use types::response::TradeEvent;

use super::crossing;
use crate::book::{Head, OrderBook};

/// Head-to-head pairings, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// Limit bid against limit ask
    LimitLimit,
    /// Limit ask against market bid
    LimitAskMarketBid,
    /// Market ask against limit bid
    MarketAskLimitBid,
    /// Market bid against market ask
    MarketMarket,
}

impl Pairing {
    pub const PRIORITY: [Pairing; 4] = [
        Pairing::LimitLimit,
        Pairing::LimitAskMarketBid,
        Pairing::MarketAskLimitBid,
        Pairing::MarketMarket,
    ];

    /// Whether the bid head comes from the market queue
    fn market_bid(self) -> bool {
        matches!(self, Pairing::LimitAskMarketBid | Pairing::MarketMarket)
    }

    /// Whether the ask head comes from the market queue
    fn market_ask(self) -> bool {
        matches!(self, Pairing::MarketAskLimitBid | Pairing::MarketMarket)
    }
}

/// Fill the two heads against each other
fn fill(bid: Head<'_>, ask: Head<'_>) -> TradeEvent {
    let quantity = bid.order.quantity.min(ask.order.quantity);
    bid.order.quantity -= quantity;
    ask.order.quantity -= quantity;
    TradeEvent {
        bid_uid: bid.order.uid,
        ask_uid: ask.order.uid,
        quantity,
    }
}

/// Attempt one trade for `pairing`
///
/// Returns `None` when either side is empty or the limit prices do not
/// cross. Of the two heads that traded, any left with zero quantity is
/// removed before returning; other collections are untouched.
pub fn try_fire(book: &mut OrderBook, pairing: Pairing) -> Option<TradeEvent> {
    let trade = {
        let OrderBook {
            bids,
            asks,
            market_bids,
            market_asks,
        } = &mut *book;
        let (bid, ask) = match pairing {
            Pairing::LimitLimit => (bids.head_mut()?.as_head(), asks.head_mut()?.as_head()),
            Pairing::LimitAskMarketBid => (market_bids.front_head()?, asks.head_mut()?.as_head()),
            Pairing::MarketAskLimitBid => (bids.head_mut()?.as_head(), market_asks.front_head()?),
            Pairing::MarketMarket => (market_bids.front_head()?, market_asks.front_head()?),
        };
        if !crossing::heads_cross(bid.price, ask.price) {
            return None;
        }
        fill(bid, ask)
    };
    book.retire_filled_head(Side::Bid, pairing.market_bid());
    book.retire_filled_head(Side::Ask, pairing.market_ask());
    Some(trade)
}
