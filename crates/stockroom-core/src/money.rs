//! # Money Module
//!
//! Provides the `Money` type for prices, line totals and sale totals.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With binary floating point:                                            │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Supplier price lists arrive as text ("19.90", "0.035", "1.5e2")       │
//! │  and must survive a save/load cycle character for character.           │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    "19.90" ──parse──► 1990 × 10⁻² ──to_string──► "19.90"               │
//! │    Comparison is by value: 10.0 == 10.00                               │
//! │    Strings are NEVER routed through f64                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::parse("19.90").unwrap();
//! let line = price.checked_mul_quantity(3).unwrap();   // 59.70
//! let total = line + Money::parse("0.30").unwrap();    // 60.00
//!
//! assert_eq!(total.to_string(), "60.00");
//! ```
//!
//! ## Wire Format
//! Serialized as a JSON **string** so no client ever sees a lossy number.
//! Deserialization also accepts a JSON number for older clients.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

// =============================================================================
// Parse Error
// =============================================================================

/// A string that is not a decimal number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid decimal \"{input}\": {reason}")]
pub struct ParseError {
    /// The rejected input, untrimmed.
    pub input: String,
    /// Why the decimal parser refused it.
    pub reason: String,
}

// =============================================================================
// Sign
// =============================================================================

/// Sign of a monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

// =============================================================================
// Money Type
// =============================================================================

/// An exact decimal monetary amount.
///
/// ## Design Decisions
/// - **Newtype over `Decimal`**: 96-bit mantissa, scale up to 28
/// - **Scale preserved**: `"19.90"` displays as `"19.90"`, not `"19.9"`
/// - **Value equality**: `Eq`/`Ord`/`Hash` ignore trailing zeros
/// - **Signed**: parsing accepts negatives; entities decide what is allowed
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──► SaleItem.unit_price × quantity ──► SaleItem.line_total│
/// │                                                            │            │
/// │                                    Σ line_total ──► Sale.total          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero, with scale 0.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps an existing decimal.
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Parses a decimal string.
    ///
    /// Accepts plain notation (`"19.90"`, `"-3"`, `"+1.5"`) and scientific
    /// notation (`"1.5e2"`). Surrounding whitespace is ignored. Digit
    /// separators, thousands commas and `inf`/`nan` are rejected. Inputs with
    /// more precision than a `Decimal` can hold are rejected rather than
    /// rounded.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::parse("1.5e2").unwrap(), Money::parse("150").unwrap());
    /// assert!(Money::parse("12,50").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseError {
                input: input.to_string(),
                reason: "empty input".to_string(),
            });
        }

        if !is_decimal_literal(trimmed) {
            return Err(ParseError {
                input: input.to_string(),
                reason: "expected [+-]digits[.digits][e[+-]digits]".to_string(),
            });
        }

        let parsed = if trimmed.contains(['e', 'E']) {
            Decimal::from_scientific(trimmed)
        } else {
            Decimal::from_str_exact(trimmed)
        };

        parsed.map(Money).map_err(|e| ParseError {
            input: input.to_string(),
            reason: e.to_string(),
        })
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Sign of the amount. Negative zero reports `Zero`.
    pub fn sign(&self) -> Sign {
        if self.0.is_zero() {
            Sign::Zero
        } else if self.0.is_sign_negative() {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.sign() == Sign::Zero
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.sign() == Sign::Negative
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.sign() == Sign::Positive
    }

    /// Multiplies by an item quantity.
    ///
    /// Returns `None` on overflow instead of panicking.
    pub fn checked_mul_quantity(&self, quantity: i64) -> Option<Money> {
        self.0.checked_mul(Decimal::from(quantity)).map(Money)
    }

    /// Adds two amounts, returning `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

/// `[+-]? digits [. digits] [(e|E) [+-]? digits]`, with at least one
/// mantissa digit on either side of the point.
fn is_decimal_literal(s: &str) -> bool {
    fn digits(s: &str) -> usize {
        s.bytes().take_while(u8::is_ascii_digit).count()
    }

    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(at) => (&s[..at], Some(&s[at + 1..])),
        None => (s, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    let mantissa_ok = digits(int_part) == int_part.len()
        && digits(frac_part) == frac_part.len()
        && !(int_part.is_empty() && frac_part.is_empty());

    let exponent_ok = exponent.map_or(true, |e| {
        let e = e.strip_prefix(['+', '-']).unwrap_or(e);
        !e.is_empty() && digits(e) == e.len()
    });

    mantissa_ok && exponent_ok
}

// =============================================================================
// Conversions
// =============================================================================

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl From<i64> for Money {
    fn from(units: i64) -> Self {
        Money(Decimal::from(units))
    }
}

impl FromStr for Money {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

// =============================================================================
// Display
// =============================================================================

impl fmt::Display for Money {
    /// Canonical decimal string, scale preserved (`"19.90"`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// =============================================================================
// Arithmetic Operations
// =============================================================================

// `+` saturates at the decimal bounds; use `checked_add` to detect overflow.

impl Add for Money {
    type Output = Money;

    #[inline]
    fn add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Money) {
        *self = *self + other;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        Ok(Money(Decimal::from(v)))
    }

    // JSON numbers have already been through f64 by the time they get here;
    // from_f64 picks the shortest decimal that round-trips.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Decimal::from_f64(v)
            .map(Money)
            .ok_or_else(|| E::custom(format!("number {v} is not representable as a decimal")))
    }
}

// =============================================================================
// SQLite Storage (TEXT column)
// =============================================================================

#[cfg(feature = "sqlx")]
mod sqlite {
    use super::Money;
    use sqlx::encode::IsNull;
    use sqlx::error::BoxDynError;
    use sqlx::sqlite::{Sqlite, SqliteTypeInfo};
    use sqlx::{Database, Decode, Encode, Type};

    impl Type<Sqlite> for Money {
        fn type_info() -> SqliteTypeInfo {
            <String as Type<Sqlite>>::type_info()
        }

        fn compatible(ty: &SqliteTypeInfo) -> bool {
            <String as Type<Sqlite>>::compatible(ty)
        }
    }

    impl<'q> Encode<'q, Sqlite> for Money {
        fn encode_by_ref(
            &self,
            buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
        ) -> Result<IsNull, BoxDynError> {
            <String as Encode<'q, Sqlite>>::encode(self.to_string(), buf)
        }
    }

    impl<'r> Decode<'r, Sqlite> for Money {
        fn decode(value: <Sqlite as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
            let text = <&str as Decode<'r, Sqlite>>::decode(value)?;
            Ok(Money::parse(text)?)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
