//! Value objects shared across the storefront core.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StoreError;

/// Monetary amount, fixed-point with two decimal places.
///
/// All amounts in the core are quantized to two places on construction.
/// Rounding is half-up (`MidpointAwayFromZero`), matching how discounted
/// prices are displayed to customers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub fn new(amount: Decimal) -> Result<Self, StoreError> {
        if amount.is_sign_negative() {
            return Err(StoreError::Validation(format!(
                "price must not be negative, got {amount}"
            )));
        }
        Ok(Self::quantize(amount))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Quantizes to two decimal places, rounding half-up.
    pub(crate) fn quantize(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn add(&self, other: Price) -> Price {
        Self(self.0 + other.0)
    }

    /// Line subtotal: unit price times quantity, quantized per line.
    pub fn times(&self, quantity: u32) -> Price {
        Self::quantize(self.0 * Decimal::from(quantity))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Discount percentage in `[0, 100]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    pub fn new(value: u8) -> Result<Self, StoreError> {
        if value > 100 {
            return Err(StoreError::Validation(format!(
                "discount percent must be 0-100, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// URL-safe product identifier derived from the product name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn new(value: impl Into<String>) -> Result<Self, StoreError> {
        let value = value.into();
        if value.is_empty() {
            return Err(StoreError::Validation("slug must not be empty".into()));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(StoreError::Validation(format!("invalid slug: {value}")));
        }
        Ok(Self(value))
    }

    /// Slugifies a product name: lowercase, alphanumerics kept, runs of
    /// anything else collapsed to a single hyphen.
    pub fn from_name(name: &str) -> Self {
        let mut out = String::with_capacity(name.len());
        let mut pending_hyphen = false;
        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }
        Self(out)
    }

    /// Appends a numeric suffix, used to deduplicate catalog slugs.
    pub(crate) fn with_suffix(&self, counter: u32) -> Self {
        Self(format!("{}-{}", self.0, counter))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
