//! Matching logic module
//!
//! Repeatedly fires the highest-priority pairing that can trade until none
//! can. Every fire removes at least one head, so the loop terminates.

pub mod crossing;
pub mod executor;

pub use crossing::can_match;
pub use executor::Pairing;

use tracing::trace;
use types::response::TradeEvent;

use crate::book::OrderBook;

/// Trade the book down until nothing crosses
pub fn match_book(book: &mut OrderBook) -> Vec<TradeEvent> {
    let mut trades = Vec::new();
    while let Some(trade) = Pairing::PRIORITY
        .iter()
        .find_map(|pairing| executor::try_fire(book, *pairing))
    {
        trace!(
            bid_uid = %trade.bid_uid,
            ask_uid = %trade.ask_uid,
            quantity = trade.quantity,
            "Trade fired"
        );
        trades.push(trade);
    }
    trades
}
