use rust_decimal::Decimal;

use crate::config::{AreaBound, AreaTier, QtyTier};
use crate::error::{ComputationError, ConfigError, PricingResult};
use crate::money::Cents;
use std::collections::BTreeMap;

/// Per-unit rate in exact (possibly fractional) cents that applies from
/// `min_qty` upward.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityRate {
    pub min_qty: u32,
    pub unit_rate: Decimal,
}

impl From<&QtyTier> for QuantityRate {
    fn from(tier: &QtyTier) -> Self {
        Self {
            min_qty: tier.min_qty,
            unit_rate: Decimal::from(tier.unit_price_cents),
        }
    }
}

/// Turn a `quantity -> total cents` table into quantity breakpoints.
///
/// The rate at each listed quantity is `total / quantity`, kept exact so the
/// total for a listed quantity reproduces the table value to the cent.
pub fn rates_from_table(table: &BTreeMap<u32, Cents>) -> Vec<QuantityRate> {
    table
        .iter()
        .filter(|(qty, _)| **qty > 0)
        .map(|(qty, total)| QuantityRate {
            min_qty: *qty,
            unit_rate: Decimal::from(*total) / Decimal::from(*qty),
        })
        .collect()
}

/// Select the tier with the largest `min_qty <= quantity`.
///
/// A tier whose `min_qty` equals `quantity` always wins over its neighbour.
pub fn resolve_quantity(tiers: &[QuantityRate], quantity: u32) -> PricingResult<&QuantityRate> {
    if tiers.is_empty() {
        return Err(ConfigError::EmptyTiers.into());
    }
    let idx = tiers.partition_point(|t| t.min_qty <= quantity);
    if idx == 0 {
        return Err(ComputationError::QuantityBelowMinimum {
            requested: quantity,
            minimum: tiers[0].min_qty,
        }
        .into());
    }
    Ok(&tiers[idx - 1])
}

/// Select the tier with the smallest `up_to_sqft >= sqft`.
///
/// The unbounded terminal tier matches everything that reaches it. A table
/// without one, or with an unbounded tier anywhere but last, is a config
/// defect, not a pricing gap.
pub fn resolve_area(tiers: &[AreaTier], sqft: Decimal) -> PricingResult<&AreaTier> {
    let Some((_, bounded)) = tiers.split_last() else {
        return Err(ConfigError::EmptyTiers.into());
    };
    if bounded.iter().any(|t| t.up_to_sqft == AreaBound::Unbounded) {
        return Err(ConfigError::MisplacedUnboundedTier.into());
    }
    let idx = tiers.partition_point(|t| !t.up_to_sqft.contains(sqft));
    tiers
        .get(idx)
        .ok_or_else(|| ConfigError::MissingUnboundedTier.into())
}
