//! Discount pricing.
//!
//! Pure arithmetic, no catalog access. Rounding is half-up to two decimal
//! places, applied once when the discount multiplier is applied.

use rust_decimal::Decimal;

use crate::domain::value_objects::{DiscountPercent, Price};

/// Unit price after discount.
///
/// With a zero discount the base price is returned unchanged (no
/// re-quantization). Otherwise `base * (100 - percent) / 100`, rounded
/// half-up to two places.
pub fn effective_unit_price(base: Price, discount: DiscountPercent) -> Price {
    if discount.is_zero() {
        return base;
    }
    let multiplier = Decimal::from(100 - u32::from(discount.value())) / Decimal::from(100u32);
    Price::quantize(base.amount() * multiplier)
}

/// How much the discount takes off one unit.
pub fn discount_amount(base: Price, discount: DiscountPercent) -> Price {
    Price::quantize(base.amount() - effective_unit_price(base, discount).amount())
}
