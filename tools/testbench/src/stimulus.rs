//! Random stimulus generation
//!
//! Opcodes are drawn from a weighted bag, prices from a normal distribution
//! around a mean so that both sides of the book overlap and trade. All
//! randomness comes from a seeded `ChaCha8Rng` owned by the generator.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::command::{Command, CommandKind, Opcode, Quantity};
use types::ids::Uid;
use types::price::Price;

/// Lowest and highest generated prices; the codec reserves 0.00 and 999.99
const PRICE_FLOOR: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
const PRICE_CEILING: Decimal = Decimal::from_parts(99_998, 0, 0, false, 2);

/// Weighted collection to draw from
#[derive(Debug, Clone, Default)]
pub struct Bag<T> {
    items: Vec<(T, u32)>,
    total: u32,
}

impl<T: Copy> Bag<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    /// Add `item` with relative `weight`; zero weights are ignored
    pub fn push(&mut self, item: T, weight: u32) {
        if weight == 0 {
            return;
        }
        self.items.push((item, weight));
        self.total += weight;
    }

    pub fn with(mut self, item: T, weight: u32) -> Self {
        self.push(item, weight);
        self
    }

    /// Draw one item; `None` when the bag is empty
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        if self.total == 0 {
            return None;
        }
        let mut ticket = rng.gen_range(0..self.total);
        for (item, weight) in &self.items {
            if ticket < *weight {
                return Some(*item);
            }
            ticket -= weight;
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Named opcode mixes used by the regressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mix {
    /// Limit orders only
    Lm,
    /// Market orders against limit orders, with range queries
    Mk,
    /// Limit and market flow with a trickle of stop orders
    Cn,
    /// Every opcode
    All,
}

impl Mix {
    pub fn bag(self) -> Bag<Opcode> {
        let bag = Bag::new();
        match self {
            Mix::Lm => bag.with(Opcode::BuyLimit, 1).with(Opcode::SellLimit, 1),
            Mix::Mk => bag
                .with(Opcode::BuyMarket, 1)
                .with(Opcode::SellMarket, 1)
                .with(Opcode::BuyLimit, 1)
                .with(Opcode::SellLimit, 1)
                .with(Opcode::QueryBidsAtOrAbove, 1)
                .with(Opcode::QueryAsksAtOrBelow, 1),
            Mix::Cn => bag
                .with(Opcode::BuyLimit, 100)
                .with(Opcode::SellLimit, 100)
                .with(Opcode::BuyMarket, 10)
                .with(Opcode::SellMarket, 10)
                .with(Opcode::BuyStopLoss, 1)
                .with(Opcode::SellStopLoss, 1)
                .with(Opcode::BuyStopLimit, 1)
                .with(Opcode::SellStopLimit, 1),
            Mix::All => bag
                .with(Opcode::Nop, 1)
                .with(Opcode::QueryBidAsk, 1)
                .with(Opcode::BuyLimit, 10)
                .with(Opcode::SellLimit, 10)
                .with(Opcode::BuyMarket, 2)
                .with(Opcode::SellMarket, 2)
                .with(Opcode::PopTopBid, 1)
                .with(Opcode::PopTopAsk, 1)
                .with(Opcode::Cancel, 1)
                .with(Opcode::QueryAsksAtOrBelow, 1)
                .with(Opcode::QueryBidsAtOrAbove, 1)
                .with(Opcode::BuyStopLoss, 1)
                .with(Opcode::SellStopLoss, 1)
                .with(Opcode::BuyStopLimit, 1)
                .with(Opcode::SellStopLimit, 1),
        }
    }
}

/// Stimulus generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusConfig {
    pub seed: u64,
    /// Mean of the price distribution
    pub mean_price: f64,
    /// Standard deviation of the price distribution
    pub price_stddev: f64,
    /// Quantities are uniform in `1..=max_quantity`
    pub max_quantity: Quantity,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            mean_price: 100.0,
            price_stddev: 10.0,
            max_quantity: 100,
        }
    }
}

/// Deterministic command generator
pub struct StimulusGenerator {
    bag: Bag<Opcode>,
    config: StimulusConfig,
    rng: ChaCha8Rng,
    next_uid: Uid,
    issued: Vec<Uid>,
}

impl StimulusGenerator {
    pub fn new(bag: Bag<Opcode>, config: StimulusConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            bag,
            config,
            next_uid: Uid::default(),
            issued: Vec::new(),
        }
    }

    /// Generate `count` commands with sequential uids
    pub fn generate(&mut self, count: usize) -> Vec<Command> {
        (0..count).filter_map(|_| self.next_command()).collect()
    }

    /// Next command; `None` when the bag is empty
    pub fn next_command(&mut self) -> Option<Command> {
        let opcode = self.bag.pick(&mut self.rng)?;
        let kind = self.operands(opcode);
        let uid = self.next_uid;
        self.next_uid = uid.next();
        self.issued.push(uid);
        Some(Command { uid, kind })
    }

    fn operands(&mut self, opcode: Opcode) -> CommandKind {
        match opcode {
            Opcode::Nop => CommandKind::Nop,
            Opcode::QueryBidAsk => CommandKind::QueryBidAsk,
            Opcode::BuyLimit => CommandKind::BuyLimit {
                quantity: self.quantity(),
                price: self.price(),
            },
            Opcode::SellLimit => CommandKind::SellLimit {
                quantity: self.quantity(),
                price: self.price(),
            },
            Opcode::BuyMarket => CommandKind::BuyMarket {
                quantity: self.quantity(),
            },
            Opcode::SellMarket => CommandKind::SellMarket {
                quantity: self.quantity(),
            },
            Opcode::PopTopBid => CommandKind::PopTopBid,
            Opcode::PopTopAsk => CommandKind::PopTopAsk,
            Opcode::Cancel => CommandKind::Cancel {
                target: self.cancel_target(),
            },
            Opcode::QueryAsksAtOrBelow => CommandKind::QueryAsksAtOrBelow { price: self.price() },
            Opcode::QueryBidsAtOrAbove => CommandKind::QueryBidsAtOrAbove { price: self.price() },
            Opcode::BuyStopLoss => CommandKind::BuyStopLoss {
                quantity: self.quantity(),
                trigger: self.price(),
            },
            Opcode::SellStopLoss => CommandKind::SellStopLoss {
                quantity: self.quantity(),
                trigger: self.price(),
            },
            Opcode::BuyStopLimit => CommandKind::BuyStopLimit {
                quantity: self.quantity(),
                price: self.price(),
                trigger: self.price(),
            },
            Opcode::SellStopLimit => CommandKind::SellStopLimit {
                quantity: self.quantity(),
                price: self.price(),
                trigger: self.price(),
            },
        }
    }

    fn quantity(&mut self) -> Quantity {
        self.rng.gen_range(1..=self.config.max_quantity.max(1))
    }

    /// Normally distributed price (Box-Muller), clamped into the valid range
    fn price(&mut self) -> Price {
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        let sample = self.config.mean_price + self.config.price_stddev * z;

        let value = Decimal::from_f64(sample)
            .unwrap_or(PRICE_FLOOR)
            .clamp(PRICE_FLOOR, PRICE_CEILING);
        Price::from_decimal(value).unwrap_or(Price::MIN)
    }

    /// A previously issued uid, whatever state it is in now
    fn cancel_target(&mut self) -> Uid {
        if self.issued.is_empty() {
            return Uid::default();
        }
        self.issued[self.rng.gen_range(0..self.issued.len())]
    }
}
