//! Fixed-point BCD price codec
//!
//! A price has three integer digits and two fraction digits, each held as a
//! 4-bit binary-coded-decimal nibble. On the wire a price is packed into 20
//! bits, cents first:
//!
//! ```text
//!  19    16 15    12 11     8 7      4 3      0
//! +--------+--------+--------+--------+--------+
//! |  D100  |  D10   |   D1   |  C10   |   C1   |
//! +--------+--------+--------+--------+--------+
//! ```
//!
//! `000.00` and `999.99` are reserved as sentinels and are never valid
//! prices. `Price::parse` is total and never fails; callers feeding it
//! untrusted text must check `is_valid` (or use `FromStr`, which does).

use crate::errors::PriceError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const DOLLAR_DIGITS: usize = 3;
const CENT_DIGITS: usize = 2;
const NIBBLE_BITS: u32 = 4;
const NIBBLE_MASK: u32 = 0xF;
/// Nibble value used for characters that are not decimal digits
const BAD_NIBBLE: u8 = 0xF;

/// Width of a packed price on the wire
pub const PACKED_BITS: u32 = 20;

/// Largest representable amount in cents (999.99)
const MAX_CENTS: u32 = 99_999;

/// Fixed-point decimal price in BCD form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Price {
    /// Integer digits, least significant first
    dollars: [u8; DOLLAR_DIGITS],
    /// Fraction digits, hundredths first
    cents: [u8; CENT_DIGITS],
}

impl Price {
    /// Lower sentinel (`000.00`)
    pub const MIN: Price = Price {
        dollars: [0; DOLLAR_DIGITS],
        cents: [0; CENT_DIGITS],
    };

    /// Upper sentinel (`999.99`)
    pub const MAX: Price = Price {
        dollars: [9; DOLLAR_DIGITS],
        cents: [9; CENT_DIGITS],
    };

    const GARBAGE: Price = Price {
        dollars: [BAD_NIBBLE; DOLLAR_DIGITS],
        cents: [BAD_NIBBLE; CENT_DIGITS],
    };

    /// Parse a `"DDD.CC"` decimal string
    ///
    /// Integer digits are read right to left. A single fraction digit is
    /// tenths, a missing decimal point means zero cents. Characters that are
    /// not digits become out-of-range nibbles and too many digits on either
    /// side yield a price with every nibble out of range; in both cases
    /// `is_valid` is false.
    pub fn parse(s: &str) -> Self {
        let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
        if whole.len() > DOLLAR_DIGITS || fraction.len() > CENT_DIGITS {
            return Self::GARBAGE;
        }

        let mut price = Self::MIN;
        for (i, b) in whole.bytes().rev().enumerate() {
            price.dollars[i] = to_nibble(b);
        }
        for (i, b) in fraction.bytes().enumerate() {
            price.cents[CENT_DIGITS - 1 - i] = to_nibble(b);
        }
        price
    }

    /// Pack into the 20-bit wire representation
    pub fn pack(&self) -> u32 {
        let mut packed = 0u32;
        for nibble in self.dollars.iter().rev().chain(self.cents.iter().rev()) {
            packed = (packed << NIBBLE_BITS) | (u32::from(*nibble) & NIBBLE_MASK);
        }
        packed
    }

    /// Unpack from the 20-bit wire representation
    ///
    /// Bits above bit 19 are ignored.
    pub fn unpack(mut packed: u32) -> Self {
        let mut price = Self::MIN;
        for nibble in price.cents.iter_mut().chain(price.dollars.iter_mut()) {
            *nibble = (packed & NIBBLE_MASK) as u8;
            packed >>= NIBBLE_BITS;
        }
        price
    }

    /// Every nibble is a decimal digit and the price is not a sentinel
    pub fn is_valid(&self) -> bool {
        self.is_bcd() && *self != Self::MIN && *self != Self::MAX
    }

    fn is_bcd(&self) -> bool {
        self.dollars.iter().chain(self.cents.iter()).all(|n| *n <= 9)
    }

    /// Build from an amount in cents; `None` above 999.99
    ///
    /// The sentinels are representable, so the result still needs `is_valid`
    /// when the input can be 0 or 99999.
    pub fn from_cents(amount: u32) -> Option<Self> {
        if amount > MAX_CENTS {
            return None;
        }
        let mut rest = amount;
        let mut price = Self::MIN;
        for nibble in price.cents.iter_mut().chain(price.dollars.iter_mut()) {
            *nibble = (rest % 10) as u8;
            rest /= 10;
        }
        Some(price)
    }

    /// Amount in cents (only meaningful when every nibble is a digit)
    pub fn to_cents(&self) -> u32 {
        self.dollars
            .iter()
            .rev()
            .chain(self.cents.iter().rev())
            .fold(0, |acc, n| acc * 10 + u32::from(*n))
    }

    /// Round a decimal to cents and convert; `None` when negative or too large
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let cents = (value.round_dp(CENT_DIGITS as u32) * Decimal::ONE_HUNDRED).to_u32()?;
        Self::from_cents(cents)
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(i64::from(self.to_cents()), CENT_DIGITS as u32)
    }
}

fn to_nibble(b: u8) -> u8 {
    if b.is_ascii_digit() {
        b - b'0'
    } else {
        BAD_NIBBLE
    }
}

fn to_char(nibble: u8) -> char {
    if nibble <= 9 {
        char::from(b'0' + nibble)
    } else {
        '?'
    }
}

/// Packed order; matches numeric order for BCD prices.
impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pack().cmp(&other.pack())
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::with_capacity(DOLLAR_DIGITS + CENT_DIGITS + 1);
        for (i, nibble) in self.dollars.iter().rev().enumerate() {
            // Suppress leading zeros, keep the units digit.
            if s.is_empty() && *nibble == 0 && i + 1 < DOLLAR_DIGITS {
                continue;
            }
            s.push(to_char(*nibble));
        }
        s.push('.');
        for nibble in self.cents.iter().rev() {
            s.push(to_char(*nibble));
        }
        f.pad(&s)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let price = Price::parse(s);
        if s.is_empty() || !price.is_bcd() {
            return Err(PriceError::Malformed(s.to_string()));
        }
        if !price.is_valid() {
            return Err(PriceError::Reserved(s.to_string()));
        }
        Ok(price)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
