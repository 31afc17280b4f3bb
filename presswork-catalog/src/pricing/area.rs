use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::{PricingResult, ValidationError};
use crate::money::{self, Cents};
use crate::config::PricingRule;
use crate::product::{Product, SizeOption};

/// Quantity -> total cents.
pub type PriceTable = BTreeMap<u32, Cents>;

/// Scale a size option's reference price table to another rectangle.
///
/// Every reference entry becomes `round(price * (A_req / A_ref) * multiplier)`.
/// Only quantities the reference table defines are emitted; nothing is
/// interpolated. Catalog seeding and live quoting both call this.
pub fn scale(
    size: &SizeOption,
    width_in: Decimal,
    height_in: Decimal,
    multiplier: Decimal,
) -> PricingResult<PriceTable> {
    let reference_area = money::mul(size.width_in, size.height_in)?;
    if reference_area <= Decimal::ZERO {
        return Err(ValidationError::InvalidDimensions(format!(
            "size {} has no reference area",
            size.id
        ))
        .into());
    }
    let requested_area = money::mul(width_in, height_in)?;
    let ratio = money::div(requested_area, reference_area)?;
    let factor = money::mul(ratio, multiplier)?;

    size.price_by_qty
        .iter()
        .map(|(qty, price)| {
            let scaled = money::mul(Decimal::from(*price), factor)?;
            Ok((*qty, money::round_half_up(scaled)?))
        })
        .collect()
}

/// Fill empty size tables of a size-priced product from its reference size.
///
/// Seeding tooling calls this so every preset carries a table derived by the
/// same arithmetic the engine uses for custom rectangles. Returns the ids of
/// the sizes that were filled.
pub fn backfill_size_tables(product: &mut Product) -> PricingResult<Vec<String>> {
    if !matches!(product.pricing.rule, PricingRule::QtyTiered { tiers: None }) {
        return Ok(Vec::new());
    }
    let Some(reference) = product.sizes.iter().find(|s| !s.price_by_qty.is_empty()).cloned() else {
        return Ok(Vec::new());
    };

    let mut filled = Vec::new();
    for size in product.sizes.iter_mut().filter(|s| s.price_by_qty.is_empty()) {
        // The size's own multiplier is applied again at quote time.
        size.price_by_qty = scale(&reference, size.width_in, size.height_in, Decimal::ONE)?;
        filled.push(size.id.clone());
    }
    Ok(filled)
}
