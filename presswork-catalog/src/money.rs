use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ComputationError, PricingError};

/// Whole cents. Every monetary value that leaves the engine is one of these.
pub type Cents = i64;

pub const SQ_INCHES_PER_SQFT: Decimal = Decimal::from_parts(144, 0, 0, false, 0);

/// Round to the nearest whole cent, halves away from zero.
///
/// This is the only place money is rounded. Base prices, scaled tables,
/// surcharges and tax all go through it so two equivalent computations can
/// never drift apart by a cent.
pub fn round_half_up(amount: Decimal) -> Result<Cents, PricingError> {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| ComputationError::Overflow(amount.to_string()).into())
}

/// Exact product, failing instead of wrapping.
pub fn mul(a: Decimal, b: Decimal) -> Result<Decimal, PricingError> {
    a.checked_mul(b)
        .ok_or_else(|| ComputationError::Overflow(format!("{a} * {b}")).into())
}

pub fn div(a: Decimal, b: Decimal) -> Result<Decimal, PricingError> {
    a.checked_div(b)
        .ok_or_else(|| ComputationError::Overflow(format!("{a} / {b}")).into())
}

/// Area of a `width x height` inch rectangle in square feet, unrounded.
pub fn area_sqft(width_in: Decimal, height_in: Decimal) -> Result<Decimal, PricingError> {
    div(mul(width_in, height_in)?, SQ_INCHES_PER_SQFT)
}

pub fn checked_sum<I>(amounts: I) -> Result<Cents, PricingError>
where
    I: IntoIterator<Item = Cents>,
{
    amounts.into_iter().try_fold(0i64, |acc, c| {
        acc.checked_add(c)
            .ok_or_else(|| ComputationError::Overflow(format!("{acc} + {c}")).into())
    })
}
