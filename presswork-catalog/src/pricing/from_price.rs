use std::collections::BTreeSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::{AreaBound, PricingRule};
use crate::error::{ComputationError, PricingError, PricingResult};
use crate::money::{self, Cents};
use crate::pricing::engine::{QuoteEngine, QuoteRequest, Sides};
use crate::product::Product;

/// Finds the lowest achievable unit price for a product.
///
/// Every candidate is priced by [`QuoteEngine::quote`] itself, so the listing
/// price and the checkout price go through the same tier and scaling code.
#[derive(Debug, Clone)]
pub struct FromPriceCalculator {
    engine: QuoteEngine,
}

/// A rectangle to try: preset size id and/or custom dimensions.
type Shape = (Option<String>, Option<(Decimal, Decimal)>);

impl FromPriceCalculator {
    pub fn new(engine: QuoteEngine) -> Self {
        Self { engine }
    }

    /// Minimum `unit_cents` over every size, material, side option and the
    /// quantities where a tier or the order minimum can change the rate.
    ///
    /// Candidates with no defined price (below the first tier) are skipped;
    /// any other error means the product itself is broken and is returned.
    pub fn minimum_price(&self, product: &Product) -> PricingResult<Cents> {
        let mut best: Option<Cents> = None;
        let mut last_gap: Option<PricingError> = None;

        for request in self.candidates(product)? {
            match self.engine.quote(product, &request) {
                Ok(quote) => {
                    best = Some(best.map_or(quote.unit_cents, |b| b.min(quote.unit_cents)));
                }
                Err(err @ PricingError::Computation(_)) => last_gap = Some(err),
                Err(err) => return Err(err),
            }
        }

        if let Some(floor) = self.custom_area_floor(product)? {
            best = Some(best.map_or(floor, |b| b.min(floor)));
        }

        best.ok_or_else(|| {
            last_gap.unwrap_or_else(|| {
                ComputationError::NoMatchingTier(format!("no priceable configuration for {}", product.slug)).into()
            })
        })
    }

    /// Recompute and store the cached display price.
    pub fn refresh(&self, product: &mut Product) -> PricingResult<Cents> {
        let cents = self.minimum_price(product)?;
        product.from_price_cents = Some(cents);
        Ok(cents)
    }

    /// The cached display price, derived on the spot when the cache is empty.
    pub fn display_price(&self, product: &Product) -> PricingResult<Cents> {
        match product.from_price_cents {
            Some(cents) => Ok(cents),
            None => {
                tracing::debug!(product = %product.slug, "from-price cache empty, deriving on read");
                self.minimum_price(product)
            }
        }
    }

    fn candidates(&self, product: &Product) -> PricingResult<Vec<QuoteRequest>> {
        let mut shapes: Vec<Shape> = Vec::new();
        if !product.is_dimensional() {
            shapes.push((None, None));
        } else {
            for size in &product.sizes {
                shapes.push((Some(size.id.clone()), None));
            }
            if let Some(bounds) = &product.dimensions {
                let smallest = (bounds.min_width_in, bounds.min_height_in);
                shapes.push((None, Some(smallest)));
                for size in &product.sizes {
                    shapes.push((Some(size.id.clone()), Some(smallest)));
                }
            }
        }

        let mut sides = vec![Sides::Single];
        if product.double_sided_multiplier.is_some() {
            sides.push(Sides::Double);
        }

        let mut requests = Vec::new();
        for (size_id, dims) in shapes {
            let quantities = self.candidate_quantities(product, size_id.as_deref(), dims)?;
            for material in &product.materials {
                for side in &sides {
                    for quantity in &quantities {
                        let mut request = QuoteRequest::new(product.id, *quantity);
                        request.size_id = size_id.clone();
                        request.width_in = dims.map(|(w, _)| w);
                        request.height_in = dims.map(|(_, h)| h);
                        request.material = Some(material.id.clone());
                        request.sides = *side;
                        requests.push(request);
                    }
                }
            }
        }
        Ok(requests)
    }

    /// Lowest unit price a custom rectangle reaches in any area tier.
    ///
    /// A piece costs `rate(tier(area * qty)) * area`, so growing the piece
    /// just past `limit / qty` moves the whole order into the next, cheaper
    /// tier. For each tier this prices the smallest piece that lands in it:
    /// the minimum custom area, or the infimum just above the previous
    /// tier's limit. Rounding is monotone, so the result is the cent value
    /// of pieces arbitrarily close to that infimum.
    fn custom_area_floor(&self, product: &Product) -> PricingResult<Option<Cents>> {
        let (PricingRule::AreaTiered { tiers }, Some(bounds)) = (&product.pricing.rule, &product.dimensions)
        else {
            return Ok(None);
        };
        let Some(multiplier) = cheapest_custom_multiplier(product)? else {
            return Ok(None);
        };
        let min_area = money::area_sqft(bounds.min_width_in, bounds.min_height_in)?;
        let max_area = money::area_sqft(bounds.max_width_in, bounds.max_height_in)?;

        // Within one tier the unit rate only falls as quantity grows, so the
        // last quantity before the minimum piece leaves each tier is enough.
        let range = product.quantity;
        let mut quantities = BTreeSet::from([range.min, range.max]);
        for tier in tiers {
            if let AreaBound::UpTo(limit) = tier.up_to_sqft {
                if let Some(q) = money::div(limit, min_area)?.floor().to_u32() {
                    quantities.insert(q);
                    quantities.insert(q.saturating_add(1));
                }
            }
        }
        quantities.retain(|q| *q > 0 && range.contains(*q));

        let mut best: Option<Cents> = None;
        for quantity in quantities {
            let qty = Decimal::from(quantity);
            let mut previous = Decimal::ZERO;
            for tier in tiers {
                let entry = money::div(previous, qty)?;
                let (area, reachable) = if min_area > entry {
                    (min_area, tier.up_to_sqft.contains(money::mul(min_area, qty)?))
                } else {
                    (entry, entry < max_area)
                };
                if reachable {
                    let cents = area_unit_cents(product, tier.rate_cents, area, quantity, multiplier)?;
                    best = Some(best.map_or(cents, |b| b.min(cents)));
                }
                if let AreaBound::UpTo(limit) = tier.up_to_sqft {
                    previous = limit;
                }
            }
        }
        Ok(best)
    }

    /// Range ends, plus both sides of every breakpoint inside the range.
    fn candidate_quantities(
        &self,
        product: &Product,
        size_id: Option<&str>,
        dims: Option<(Decimal, Decimal)>,
    ) -> PricingResult<BTreeSet<u32>> {
        let range = product.quantity;
        let mut quantities = BTreeSet::from([range.min, range.max]);
        let mut around = |q: u32| {
            quantities.insert(q);
            quantities.insert(q.saturating_sub(1));
            quantities.insert(q.saturating_add(1));
        };

        let size = size_id.and_then(|id| product.size(id));
        match &product.pricing.rule {
            PricingRule::QtyTiered { tiers: Some(tiers) } => {
                tiers.iter().for_each(|t| around(t.min_qty));
            }
            PricingRule::QtyTiered { tiers: None } => {
                if let Some(reference) = size.or_else(|| product.reference_size()) {
                    reference.price_by_qty.keys().for_each(|q| around(*q));
                }
            }
            PricingRule::AreaTiered { tiers } => {
                let dims = dims.or_else(|| size.map(|s| (s.width_in, s.height_in)));
                if let Some((w, h)) = dims {
                    let piece = money::area_sqft(w, h)?;
                    for tier in tiers {
                        if let AreaBound::UpTo(limit) = tier.up_to_sqft {
                            // Last quantity whose order area still fits this tier.
                            let last = money::div(limit, piece)?.floor();
                            if let Some(q) = last.to_u32() {
                                around(q);
                            }
                        }
                    }
                }
            }
            PricingRule::CostPlus { .. } => {}
        }

        quantities.retain(|q| range.contains(*q));
        Ok(quantities)
    }
}

/// Smallest size x material x sides multiplier a custom rectangle can carry.
///
/// A custom size may name a preset as its reference, which applies that
/// preset's multiplier; without one the size multiplier is 1.
fn cheapest_custom_multiplier(product: &Product) -> PricingResult<Option<Decimal>> {
    let sides: Vec<Decimal> = std::iter::once(Decimal::ONE)
        .chain(product.double_sided_multiplier)
        .collect();
    let sizes = std::iter::once(Decimal::ONE).chain(product.sizes.iter().map(|s| s.multiplier));

    let mut best: Option<Decimal> = None;
    for size in sizes {
        for material in &product.materials {
            for side in &sides {
                let combined = money::mul(size, money::mul(material.multiplier, *side)?)?;
                best = Some(best.map_or(combined, |b| b.min(combined)));
            }
        }
    }
    Ok(best)
}

/// Unit cents for an area-tier piece, with the order minimum applied the
/// way [`QuoteEngine::quote`] applies it.
fn area_unit_cents(
    product: &Product,
    rate_cents: Cents,
    area: Decimal,
    quantity: u32,
    multiplier: Decimal,
) -> PricingResult<Cents> {
    let qty = Decimal::from(quantity);
    let mut unit_rate = money::mul(money::mul(Decimal::from(rate_cents), area)?, multiplier)?;
    if let Some(minimum) = product.pricing.minimum_price_cents {
        if money::round_half_up(money::mul(unit_rate, qty)?)? < minimum {
            unit_rate = money::div(Decimal::from(minimum), qty)?;
        }
    }
    money::round_half_up(unit_rate)
}
