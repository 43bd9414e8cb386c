//! Order book responses
//!
//! A response is either an acknowledgement addressed to one uid, or a trade
//! event that is not addressed to any single command. On the wire a trade is
//! an acknowledgement whose uid is `Uid::TRADE_SENTINEL`; in memory it is its
//! own variant.

use crate::command::Quantity;
use crate::errors::WireError;
use crate::ids::Uid;
use crate::price::Price;
use crate::render::KvList;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response status with its wire code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Status {
    Okay = 0,
    Reject = 1,
    CancelHit = 2,
    CancelMiss = 3,
    Bad = 4,
    BadPop = 5,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Okay,
        Status::Reject,
        Status::CancelHit,
        Status::CancelMiss,
        Status::Bad,
        Status::BadPop,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, WireError> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(WireError::UnknownStatus(code))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Okay => "Okay",
            Status::Reject => "Reject",
            Status::CancelHit => "CancelHit",
            Status::CancelMiss => "CancelMiss",
            Status::Bad => "Bad",
            Status::BadPop => "BadPop",
        };
        f.write_str(name)
    }
}

/// A match between one resting bid and one resting ask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeEvent {
    pub bid_uid: Uid,
    pub ask_uid: Uid,
    pub quantity: Quantity,
}

/// Opcode-dependent result carried by an acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Payload {
    #[default]
    None,
    /// Entry removed by `PopTopBid`/`PopTopAsk`
    PopTop { price: Price, quantity: Quantity, uid: Uid },
    /// Best bid and best ask, answered to `QueryBidAsk`
    BookTop { bid: Price, ask: Price },
    /// Summed quantity, answered to range queries
    Accumulator { quantity: u64 },
}

/// A response emitted by the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    Ack {
        uid: Uid,
        status: Status,
        payload: Payload,
    },
    Trade(TradeEvent),
}

impl Response {
    /// Acknowledgement without payload
    pub fn status(uid: Uid, status: Status) -> Self {
        Response::Ack {
            uid,
            status,
            payload: Payload::None,
        }
    }

    pub fn okay(uid: Uid, payload: Payload) -> Self {
        Response::Ack {
            uid,
            status: Status::Okay,
            payload,
        }
    }

    pub fn trade(bid_uid: Uid, ask_uid: Uid, quantity: Quantity) -> Self {
        Response::Trade(TradeEvent {
            bid_uid,
            ask_uid,
            quantity,
        })
    }

    /// Uid as driven on the response bus
    pub fn wire_uid(&self) -> Uid {
        match self {
            Response::Ack { uid, .. } => *uid,
            Response::Trade(_) => Uid::TRADE_SENTINEL,
        }
    }

    pub fn is_trade(&self) -> bool {
        matches!(self, Response::Trade(_))
    }

    fn render(&self) -> KvList {
        match self {
            Response::Trade(trade) => KvList::new()
                .field("uid", Uid::TRADE_SENTINEL)
                .field("bid_uid", trade.bid_uid)
                .field("ask_uid", trade.ask_uid)
                .field("quantity", trade.quantity),
            Response::Ack { uid, status, payload } => {
                let list = KvList::new().field("uid", uid).field("status", status);
                match payload {
                    Payload::None => list,
                    Payload::PopTop { price, quantity, uid } => list
                        .field("price", price)
                        .field("quantity", quantity)
                        .field("pop_uid", uid),
                    Payload::BookTop { bid, ask } => list.field("bid", bid).field("ask", ask),
                    Payload::Accumulator { quantity } => list.field("accum", quantity),
                }
            }
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render().fmt(f)
    }
}
