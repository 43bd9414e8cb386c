//! Crossing detection logic
//!
//! Determines when the heads of a bid collection and an ask collection can
//! trade.

use types::price::Price;

/// Check if a bid and ask can match at given prices
///
/// For a buy order to match with a sell order the bid must be >= the ask.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// Check if two heads cross
///
/// A market order (no price) crosses anything; two limit orders cross when
/// the bid is at or above the ask.
pub fn heads_cross(bid_price: Option<Price>, ask_price: Option<Price>) -> bool {
    match (bid_price, ask_price) {
        (Some(bid), Some(ask)) => can_match(bid, ask),
        _ => true,
    }
}
