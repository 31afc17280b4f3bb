use rust_decimal::Decimal;

use crate::config::{Charge, ChargeType};
use crate::error::{ConfigError, PricingResult};
use crate::money::{self, Cents};
use crate::pricing::engine::BreakdownLine;

#[derive(Debug, Clone, PartialEq)]
pub struct Composed {
    /// Base unit rate, unchanged. Surcharges never fold into it.
    pub unit_cents: Cents,
    pub lines: Vec<BreakdownLine>,
}

/// Exact, unrounded amount a charge contributes to an order.
///
/// `per_sqft` bills the exact piece area times quantity; `piece_sqft` must be
/// derived from the same width/height as the base price.
pub fn charge_amount(
    charge: &Charge,
    quantity: u32,
    piece_sqft: Option<Decimal>,
) -> PricingResult<Decimal> {
    let amount = Decimal::from(charge.amount_cents);
    match charge.charge_type {
        ChargeType::Flat => Ok(amount),
        ChargeType::PerUnit => money::mul(amount, Decimal::from(quantity)),
        ChargeType::PerSqft => {
            let sqft = piece_sqft.ok_or_else(|| ConfigError::InvalidField {
                field: charge.id.clone(),
                message: "per_sqft charge on a product without dimensions".to_string(),
            })?;
            money::mul(money::mul(amount, sqft)?, Decimal::from(quantity))
        }
    }
}

/// Lay the selected addons, finishings and cut type over a base unit rate.
///
/// Each selection becomes one breakdown line rounded half-up once.
pub fn compose(
    base_unit_cents: Cents,
    quantity: u32,
    piece_sqft: Option<Decimal>,
    selections: &[&Charge],
) -> PricingResult<Composed> {
    let lines = selections
        .iter()
        .map(|charge| {
            let amount = charge_amount(charge, quantity, piece_sqft)?;
            Ok(BreakdownLine {
                label: charge.name.clone(),
                amount_cents: money::round_half_up(amount)?,
            })
        })
        .collect::<PricingResult<Vec<_>>>()?;

    Ok(Composed {
        unit_cents: base_unit_cents,
        lines,
    })
}
