//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog API serializes prices as decimal strings (`"499.00"`) while the
//! built-in datasets and browser storage use plain JSON numbers. [`Price`]
//! accepts both on input and always writes a number, which keeps stored carts
//! readable by older clients.

use core::fmt;
use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The input could not be parsed as a decimal amount.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-negative price in rubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// The zero price ("Free").
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The largest representable price. Arithmetic saturates here.
    pub const MAX: Self = Self(Decimal::MAX);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount.normalize()))
    }

    /// Create a price from a whole number of rubles.
    #[must_use]
    pub fn from_rubles(rubles: u32) -> Self {
        Self(Decimal::from(rubles))
    }

    /// Parse a price from user or API input.
    ///
    /// Surrounding whitespace is ignored and a comma is accepted as the
    /// decimal separator.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] if the input is not a number and
    /// [`PriceError::Negative`] if it is below zero.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let normalized = s.trim().replace(',', ".");
        let amount: Decimal = normalized
            .parse()
            .map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// Returns the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this item is free.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.0.is_zero()
    }

    /// Price of `qty` units, saturating at [`Price::MAX`].
    #[must_use]
    pub fn times(self, qty: u32) -> Self {
        self.0
            .checked_mul(Decimal::from(qty))
            .map_or(Self::MAX, Self)
    }

    /// Sum of two prices, saturating at [`Price::MAX`].
    #[must_use]
    pub fn saturating_add(self, rhs: Self) -> Self {
        self.0.checked_add(rhs.0).map_or(Self::MAX, Self)
    }

    /// Format for display: `"Free"` for zero, otherwise `"1 299 ₽"`.
    ///
    /// ```
    /// use kv_market_core::Price;
    ///
    /// assert_eq!(Price::ZERO.display(), "Free");
    /// assert_eq!(Price::from_rubles(1299).display(), "1 299 ₽");
    /// assert_eq!(Price::parse("49.5").unwrap().display(), "49,50 ₽");
    /// ```
    #[must_use]
    pub fn display(&self) -> String {
        if self.is_free() {
            return "Free".to_string();
        }

        let rounded = self.0.round_dp(2);
        let whole = rounded.trunc();
        let fraction = ((rounded - whole) * Decimal::ONE_HUNDRED)
            .to_u32()
            .unwrap_or(0);

        let grouped = group_thousands(&whole.to_string());
        if fraction == 0 {
            format!("{grouped} ₽")
        } else {
            format!("{grouped},{fraction:02} ₽")
        }
    }
}

/// Insert a space between every group of three digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Whole amounts stay integers in JSON ("price": 499)
        if self.0.fract().is_zero()
            && let Some(n) = self.0.to_u64()
        {
            return serializer.serialize_u64(n);
        }
        match self.0.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Float(f64),
            Text(String),
        }

        let amount = match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Decimal::from(n),
            Raw::Float(f) => Decimal::try_from(f).map_err(serde::de::Error::custom)?,
            Raw::Text(s) => {
                return Self::parse(&s).map_err(serde::de::Error::custom);
            }
        };
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}
