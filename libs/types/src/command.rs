//! Order book commands
//!
//! A command is an opcode plus the operands that opcode uses. Operands that
//! an opcode ignores on the wire simply do not exist in its variant.

use crate::errors::WireError;
use crate::ids::Uid;
use crate::price::Price;
use crate::render::KvList;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order quantity (shares)
pub type Quantity = u32;

/// Book side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

/// Command opcode with its wire code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0,
    QueryBidAsk = 1,
    BuyLimit = 2,
    SellLimit = 3,
    BuyMarket = 4,
    SellMarket = 5,
    PopTopBid = 6,
    PopTopAsk = 7,
    Cancel = 8,
    QueryAsksAtOrBelow = 9,
    QueryBidsAtOrAbove = 10,
    BuyStopLoss = 11,
    SellStopLoss = 12,
    BuyStopLimit = 13,
    SellStopLimit = 14,
}

impl Opcode {
    /// All opcodes, indexed by wire code
    pub const ALL: [Opcode; 15] = [
        Opcode::Nop,
        Opcode::QueryBidAsk,
        Opcode::BuyLimit,
        Opcode::SellLimit,
        Opcode::BuyMarket,
        Opcode::SellMarket,
        Opcode::PopTopBid,
        Opcode::PopTopAsk,
        Opcode::Cancel,
        Opcode::QueryAsksAtOrBelow,
        Opcode::QueryBidsAtOrAbove,
        Opcode::BuyStopLoss,
        Opcode::SellStopLoss,
        Opcode::BuyStopLimit,
        Opcode::SellStopLimit,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Result<Self, WireError> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(WireError::UnknownOpcode(code))
    }

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Nop => "Nop",
            Opcode::QueryBidAsk => "QryBidAsk",
            Opcode::BuyLimit => "BuyLimit",
            Opcode::SellLimit => "SellLimit",
            Opcode::BuyMarket => "BuyMarket",
            Opcode::SellMarket => "SellMarket",
            Opcode::PopTopBid => "PopTopBid",
            Opcode::PopTopAsk => "PopTopAsk",
            Opcode::Cancel => "Cancel",
            Opcode::QueryAsksAtOrBelow => "QryTblAskLe",
            Opcode::QueryBidsAtOrAbove => "QryTblBidGe",
            Opcode::BuyStopLoss => "BuyStopLoss",
            Opcode::SellStopLoss => "SellStopLoss",
            Opcode::BuyStopLimit => "BuyStopLimit",
            Opcode::SellStopLimit => "SellStopLimit",
        }
    }

    /// Stop-loss and stop-limit opcodes
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            Opcode::BuyStopLoss | Opcode::SellStopLoss | Opcode::BuyStopLimit | Opcode::SellStopLimit
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opcode-specific operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "opcode")]
pub enum CommandKind {
    Nop,
    QueryBidAsk,
    BuyLimit { quantity: Quantity, price: Price },
    SellLimit { quantity: Quantity, price: Price },
    BuyMarket { quantity: Quantity },
    SellMarket { quantity: Quantity },
    PopTopBid,
    PopTopAsk,
    Cancel { target: Uid },
    QueryAsksAtOrBelow { price: Price },
    QueryBidsAtOrAbove { price: Price },
    /// Matures into `BuyMarket`
    BuyStopLoss { quantity: Quantity, trigger: Price },
    /// Matures into `SellMarket`
    SellStopLoss { quantity: Quantity, trigger: Price },
    /// Matures into `BuyLimit` at `price`
    BuyStopLimit { quantity: Quantity, price: Price, trigger: Price },
    /// Matures into `SellLimit` at `price`
    SellStopLimit { quantity: Quantity, price: Price, trigger: Price },
}

impl CommandKind {
    pub fn opcode(&self) -> Opcode {
        match self {
            CommandKind::Nop => Opcode::Nop,
            CommandKind::QueryBidAsk => Opcode::QueryBidAsk,
            CommandKind::BuyLimit { .. } => Opcode::BuyLimit,
            CommandKind::SellLimit { .. } => Opcode::SellLimit,
            CommandKind::BuyMarket { .. } => Opcode::BuyMarket,
            CommandKind::SellMarket { .. } => Opcode::SellMarket,
            CommandKind::PopTopBid => Opcode::PopTopBid,
            CommandKind::PopTopAsk => Opcode::PopTopAsk,
            CommandKind::Cancel { .. } => Opcode::Cancel,
            CommandKind::QueryAsksAtOrBelow { .. } => Opcode::QueryAsksAtOrBelow,
            CommandKind::QueryBidsAtOrAbove { .. } => Opcode::QueryBidsAtOrAbove,
            CommandKind::BuyStopLoss { .. } => Opcode::BuyStopLoss,
            CommandKind::SellStopLoss { .. } => Opcode::SellStopLoss,
            CommandKind::BuyStopLimit { .. } => Opcode::BuyStopLimit,
            CommandKind::SellStopLimit { .. } => Opcode::SellStopLimit,
        }
    }

    /// Conversion applied when a conditional order matures
    ///
    /// Returns `None` for anything that is not a stop order. The trigger
    /// price does not survive maturation.
    pub fn matured(&self) -> Option<CommandKind> {
        match *self {
            CommandKind::BuyStopLoss { quantity, .. } => Some(CommandKind::BuyMarket { quantity }),
            CommandKind::SellStopLoss { quantity, .. } => Some(CommandKind::SellMarket { quantity }),
            CommandKind::BuyStopLimit { quantity, price, .. } => {
                Some(CommandKind::BuyLimit { quantity, price })
            }
            CommandKind::SellStopLimit { quantity, price, .. } => {
                Some(CommandKind::SellLimit { quantity, price })
            }
            _ => None,
        }
    }

    /// Trigger price and side watched, for conditional orders
    pub fn trigger(&self) -> Option<(Side, Price)> {
        match *self {
            CommandKind::BuyStopLoss { trigger, .. } | CommandKind::BuyStopLimit { trigger, .. } => {
                Some((Side::Bid, trigger))
            }
            CommandKind::SellStopLoss { trigger, .. } | CommandKind::SellStopLimit { trigger, .. } => {
                Some((Side::Ask, trigger))
            }
            _ => None,
        }
    }
}

/// A single command presented to the order book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub uid: Uid,
    #[serde(flatten)]
    pub kind: CommandKind,
}

impl Command {
    pub fn new(uid: u32, kind: CommandKind) -> Self {
        Self {
            uid: Uid::new(uid),
            kind,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.kind.opcode()
    }

    /// The live order a conditional command turns into, keeping its uid
    pub fn matured(&self) -> Option<Command> {
        self.kind.matured().map(|kind| Command { uid: self.uid, kind })
    }

    fn render(&self) -> KvList {
        let list = KvList::new()
            .field("opcode", self.opcode())
            .field("uid", self.uid);
        match self.kind {
            CommandKind::Nop
            | CommandKind::QueryBidAsk
            | CommandKind::PopTopBid
            | CommandKind::PopTopAsk => list,
            CommandKind::BuyLimit { quantity, price } | CommandKind::SellLimit { quantity, price } => {
                list.field("quantity", quantity).field("price", price)
            }
            CommandKind::BuyMarket { quantity } | CommandKind::SellMarket { quantity } => {
                list.field("quantity", quantity)
            }
            CommandKind::Cancel { target } => list.field("uid1", target),
            CommandKind::QueryAsksAtOrBelow { price } | CommandKind::QueryBidsAtOrAbove { price } => {
                list.field("price", price)
            }
            CommandKind::BuyStopLoss { quantity, trigger }
            | CommandKind::SellStopLoss { quantity, trigger } => {
                list.field("quantity", quantity).field("price1", trigger)
            }
            CommandKind::BuyStopLimit { quantity, price, trigger }
            | CommandKind::SellStopLimit { quantity, price, trigger } => list
                .field("quantity", quantity)
                .field("price", price)
                .field("price1", trigger),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render().fmt(f)
    }
}
