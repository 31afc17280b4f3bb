use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Charge, ChargeType, PricingModel, PricingRule};
use crate::error::{ComputationError, ConfigError, PricingError, PricingResult, ValidationError};
use crate::money::{self, Cents};
use crate::pricing::{area, surcharge, tier};
use crate::product::{Product, SizeOption};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sides {
    #[default]
    Single,
    Double,
}

/// Optional selections layered on top of the base price.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Selections {
    #[serde(default)]
    pub addons: Vec<String>,
    #[serde(default)]
    pub finishings: Vec<String>,
    pub cut_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuoteRequest {
    pub product_id: Uuid,
    pub quantity: u32,
    pub size_id: Option<String>,
    pub width_in: Option<Decimal>,
    pub height_in: Option<Decimal>,
    /// Falls back to the product's default material.
    pub material: Option<String>,
    #[serde(default)]
    pub sides: Sides,
    #[serde(default)]
    pub extra: Selections,
}

impl QuoteRequest {
    pub fn new(product_id: Uuid, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            size_id: None,
            width_in: None,
            height_in: None,
            material: None,
            sides: Sides::Single,
            extra: Selections::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    pub label: String,
    pub amount_cents: Cents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteMeta {
    pub model: PricingModel,
    pub quantity: u32,
    pub material: String,
    pub sides: Sides,
    pub size_id: Option<String>,
    pub width_in: Option<Decimal>,
    pub height_in: Option<Decimal>,
    /// Area of one piece, unrounded.
    pub area_sqft: Option<Decimal>,
    pub config_version: u64,
}

/// An itemized price.
///
/// `base.amount_cents + sum(breakdown) == subtotal_cents` and
/// `subtotal_cents + tax_cents == total_cents` always hold. `unit_cents` is
/// the base per-item rate only; surcharges are never folded into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub unit_cents: Cents,
    pub base: BreakdownLine,
    pub breakdown: Vec<BreakdownLine>,
    pub subtotal_cents: Cents,
    pub tax_cents: Cents,
    pub total_cents: Cents,
    pub meta: QuoteMeta,
}

/// The rectangle a request is priced at.
#[derive(Debug, Clone, Copy)]
struct Geometry<'a> {
    /// Preset chosen by id, or the only preset when the product has one.
    size: Option<&'a SizeOption>,
    dims: Option<(Decimal, Decimal)>,
    piece_sqft: Option<Decimal>,
}

/// Exact base price before rounding.
struct BaseRate {
    unit_rate: Decimal,
    total: Decimal,
}

/// Turns a product's pricing config plus a request into a [`Quote`].
///
/// Stateless apart from the tax rate: the same product version and request
/// always produce the same cents.
#[derive(Debug, Clone)]
pub struct QuoteEngine {
    tax_rate: Decimal,
}

impl QuoteEngine {
    pub fn new(tax_rate: Decimal) -> Self {
        Self { tax_rate }
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn quote(&self, product: &Product, request: &QuoteRequest) -> PricingResult<Quote> {
        if request.product_id != product.id {
            return Err(PricingError::NotFound(request.product_id.to_string()));
        }
        let quantity = request.quantity;
        if !product.quantity.contains(quantity) {
            return Err(ValidationError::QuantityOutOfRange {
                min: product.quantity.min,
                max: product.quantity.max,
                requested: quantity,
            }
            .into());
        }

        let geometry = resolve_geometry(product, request)?;

        let material = match &request.material {
            Some(id) => product
                .material(id)
                .ok_or_else(|| ValidationError::UnknownMaterial(id.clone()))?,
            None => product.default_material().ok_or(ConfigError::DefaultMaterial(0))?,
        };
        let sides_multiplier = match request.sides {
            Sides::Single => Decimal::ONE,
            Sides::Double => product
                .double_sided_multiplier
                .ok_or(ValidationError::UnsupportedSides)?,
        };
        let selections = resolve_selections(product, &request.extra)?;

        let multiplier = money::mul(material.multiplier, sides_multiplier)?;
        let base = base_rate(product, &geometry, quantity, multiplier)?;

        let mut base_cents = money::round_half_up(base.total)?;
        let mut unit_rate = base.unit_rate;
        let mut base_label = "Base price".to_string();
        if let Some(minimum) = product.pricing.minimum_price_cents {
            if base_cents < minimum {
                base_cents = minimum;
                unit_rate = money::div(Decimal::from(minimum), Decimal::from(quantity))?;
                base_label = "Base price (order minimum)".to_string();
            }
        }
        let unit_cents = money::round_half_up(unit_rate)?;

        let file_fee = product.pricing.file_fee_cents.map(|amount_cents| Charge {
            id: "file_fee".to_string(),
            name: "File setup fee".to_string(),
            charge_type: ChargeType::Flat,
            amount_cents,
        });
        let mut charges = selections;
        charges.extend(file_fee.as_ref());
        let composed = surcharge::compose(unit_cents, quantity, geometry.piece_sqft, &charges)?;

        let subtotal_cents = money::checked_sum(
            std::iter::once(base_cents).chain(composed.lines.iter().map(|l| l.amount_cents)),
        )?;
        let tax_cents = money::round_half_up(money::mul(Decimal::from(subtotal_cents), self.tax_rate)?)?;
        let total_cents = money::checked_sum([subtotal_cents, tax_cents])?;

        Ok(Quote {
            unit_cents: composed.unit_cents,
            base: BreakdownLine {
                label: base_label,
                amount_cents: base_cents,
            },
            breakdown: composed.lines,
            subtotal_cents,
            tax_cents,
            total_cents,
            meta: QuoteMeta {
                model: product.pricing.model(),
                quantity,
                material: material.id.clone(),
                sides: request.sides,
                size_id: geometry.size.map(|s| s.id.clone()),
                width_in: geometry.dims.map(|(w, _)| w),
                height_in: geometry.dims.map(|(_, h)| h),
                area_sqft: geometry.piece_sqft,
                config_version: product.version,
            },
        })
    }
}

fn resolve_geometry<'a>(product: &'a Product, request: &QuoteRequest) -> PricingResult<Geometry<'a>> {
    let size = match &request.size_id {
        Some(id) => Some(
            product
                .size(id)
                .ok_or_else(|| ValidationError::UnknownSize(id.clone()))?,
        ),
        None => None,
    };
    let custom = match (request.width_in, request.height_in) {
        (Some(w), Some(h)) => Some((w, h)),
        (None, None) => None,
        _ => {
            return Err(ValidationError::InvalidDimensions(
                "width and height must be given together".to_string(),
            )
            .into())
        }
    };

    if !product.is_dimensional() {
        if custom.is_some() {
            return Err(ValidationError::InvalidDimensions(
                "this product is not sold by size".to_string(),
            )
            .into());
        }
        return Ok(Geometry { size: None, dims: None, piece_sqft: None });
    }

    let (size, dims) = match (size, custom) {
        (size, Some((w, h))) => {
            if w <= Decimal::ZERO || h <= Decimal::ZERO {
                return Err(ValidationError::InvalidDimensions(format!(
                    "dimensions must be positive, got {w} x {h} in"
                ))
                .into());
            }
            let is_preset = size.is_some_and(|s| s.width_in == w && s.height_in == h);
            if !is_preset {
                match &product.dimensions {
                    Some(bounds) if bounds.contains(w, h) => {}
                    Some(bounds) => {
                        return Err(ValidationError::InvalidDimensions(format!(
                            "{w} x {h} in is outside {}-{} x {}-{} in",
                            bounds.min_width_in, bounds.max_width_in, bounds.min_height_in, bounds.max_height_in
                        ))
                        .into())
                    }
                    None => {
                        return Err(ValidationError::InvalidDimensions(
                            "custom sizes are not offered for this product".to_string(),
                        )
                        .into())
                    }
                }
            }
            (size, (w, h))
        }
        (Some(size), None) => (Some(size), (size.width_in, size.height_in)),
        (None, None) => match product.sizes.as_slice() {
            [only] => (Some(only), (only.width_in, only.height_in)),
            _ => {
                return Err(ValidationError::InvalidDimensions(
                    "a size option or width and height is required".to_string(),
                )
                .into())
            }
        },
    };

    Ok(Geometry {
        size,
        dims: Some(dims),
        piece_sqft: Some(money::area_sqft(dims.0, dims.1)?),
    })
}

/// Resolve every selected id before any money is computed.
fn resolve_selections<'a>(product: &'a Product, extra: &Selections) -> PricingResult<Vec<&'a Charge>> {
    let mut charges = Vec::new();
    let groups: [(&'static str, &Vec<String>, fn(&'a Product, &str) -> Option<&'a Charge>); 2] = [
        ("addon", &extra.addons, Product::addon),
        ("finishing", &extra.finishings, Product::finishing),
    ];
    for (group, ids, lookup) in groups {
        for (i, id) in ids.iter().enumerate() {
            if ids[..i].contains(id) {
                return Err(ValidationError::DuplicateSelection(id.clone()).into());
            }
            let charge = lookup(product, id).ok_or_else(|| ValidationError::UnknownOption {
                group,
                id: id.clone(),
            })?;
            charges.push(charge);
        }
    }
    if let Some(id) = &extra.cut_type {
        let charge = product.cut_type(id).ok_or_else(|| ValidationError::UnknownOption {
            group: "cut type",
            id: id.clone(),
        })?;
        charges.push(charge);
    }
    Ok(charges)
}

fn base_rate(
    product: &Product,
    geometry: &Geometry<'_>,
    quantity: u32,
    multiplier: Decimal,
) -> PricingResult<BaseRate> {
    let qty = Decimal::from(quantity);
    let size_multiplier = geometry.size.map_or(Decimal::ONE, |s| s.multiplier);

    let unit_rate = match &product.pricing.rule {
        PricingRule::QtyTiered { tiers: Some(tiers) } => {
            let rates: Vec<tier::QuantityRate> = tiers.iter().map(Into::into).collect();
            let tier = tier::resolve_quantity(&rates, quantity)?;
            money::mul(tier.unit_rate, multiplier)?
        }
        PricingRule::QtyTiered { tiers: None } => {
            let reference = geometry
                .size
                .or_else(|| product.reference_size())
                .ok_or(ConfigError::EmptyTiers)?;
            let (w, h) = geometry.dims.ok_or_else(|| {
                ValidationError::InvalidDimensions("a size is required".to_string())
            })?;
            let table = area::scale(reference, w, h, money::mul(reference.multiplier, multiplier)?)?;
            let rates = tier::rates_from_table(&table);
            tier::resolve_quantity(&rates, quantity)?.unit_rate
        }
        PricingRule::AreaTiered { tiers } => {
            let piece = geometry.piece_sqft.ok_or_else(|| {
                ValidationError::InvalidDimensions("a size is required".to_string())
            })?;
            let order_sqft = money::mul(piece, qty)?;
            let tier = tier::resolve_area(tiers, order_sqft)?;
            let per_piece = money::mul(Decimal::from(tier.rate_cents), piece)?;
            money::mul(money::mul(per_piece, size_multiplier)?, multiplier)?
        }
        PricingRule::CostPlus { components, markup_percent } => {
            let mut cost = Decimal::ZERO;
            for component in components {
                cost = cost
                    .checked_add(surcharge::charge_amount(component, quantity, geometry.piece_sqft)?)
                    .ok_or_else(|| ComputationError::Overflow(component.id.clone()))?;
            }
            let markup = match markup_percent {
                Some(pct) => Decimal::ONE + money::div(*pct, Decimal::ONE_HUNDRED)?,
                None => Decimal::ONE,
            };
            let total = money::mul(money::mul(money::mul(cost, markup)?, size_multiplier)?, multiplier)?;
            return Ok(BaseRate {
                unit_rate: money::div(total, qty)?,
                total,
            });
        }
    };

    Ok(BaseRate {
        unit_rate,
        total: money::mul(unit_rate, qty)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn engine() -> QuoteEngine {
        QuoteEngine::new(d("0.08"))
    }

    fn business_cards() -> Product {
        Product::from_value(json!({
            "id": "00000000-0000-4000-8000-0000000000b1",
            "slug": "business-cards",
            "name": "Business cards",
            "description": "16pt matte",
            "isActive": true,
            "pricing": {
                "model": "QTY_TIERED",
                "tiers": [
                    { "minQty": 50, "unitPriceCents": 30 },
                    { "minQty": 250, "unitPriceCents": 12 },
                    { "minQty": 1000, "unitPriceCents": 6 }
                ],
                "minimumPriceCents": 2000,
                "fileFeeCents": 500,
                "addons": [
                    { "id": "rounded", "name": "Rounded corners", "chargeType": "per_unit", "amountCents": 2 }
                ]
            },
            "materials": [
                { "id": "matte", "name": "Matte", "multiplier": 1, "isDefault": true },
                { "id": "linen", "name": "Linen", "multiplier": "1.5" }
            ],
            "quantity": { "min": 50, "max": 5000 },
            "doubleSidedMultiplier": "1.25"
        }))
        .unwrap()
    }

    #[test]
    fn test_qty_tiered_non_dimensional() {
        let product = business_cards();
        let mut request = QuoteRequest::new(product.id, 500);
        request.extra.addons.push("rounded".to_string());

        let quote = engine().quote(&product, &request).unwrap();

        assert_eq!(quote.unit_cents, 12);
        assert_eq!(quote.base.amount_cents, 6000);
        assert_eq!(
            quote.breakdown,
            vec![
                BreakdownLine { label: "Rounded corners".to_string(), amount_cents: 1000 },
                BreakdownLine { label: "File setup fee".to_string(), amount_cents: 500 },
            ]
        );
        assert_eq!(quote.subtotal_cents, 7500);
        assert_eq!(quote.tax_cents, 600);
        assert_eq!(quote.total_cents, 8100);
        assert_eq!(quote.meta.model, PricingModel::QtyTiered);
    }

    #[test]
    fn test_minimum_price_raises_base() {
        let product = business_cards();
        let quote = engine().quote(&product, &QuoteRequest::new(product.id, 50)).unwrap();
        // 50 x 30c = 1500 < 2000 minimum
        assert_eq!(quote.base.amount_cents, 2000);
        assert_eq!(quote.unit_cents, 40);
        assert_eq!(quote.base.label, "Base price (order minimum)");
    }

    #[test]
    fn test_material_and_sides_fold_into_base_rate() {
        let product = business_cards();
        let mut request = QuoteRequest::new(product.id, 1000);
        request.material = Some("linen".to_string());
        request.sides = Sides::Double;

        let quote = engine().quote(&product, &request).unwrap();
        // 6c * 1.5 * 1.25 = 11.25c
        assert_eq!(quote.base.amount_cents, 11250);
        assert_eq!(quote.unit_cents, 11);
    }

    #[test]
    fn test_validation_runs_before_computation() {
        let product = business_cards();
        let engine = engine();

        let err = engine.quote(&product, &QuoteRequest::new(product.id, 10)).unwrap_err();
        assert!(matches!(err, PricingError::Validation(ValidationError::QuantityOutOfRange { min: 50, max: 5000, requested: 10 })));

        let mut request = QuoteRequest::new(product.id, 100);
        request.material = Some("gold-foil".to_string());
        let err = engine.quote(&product, &request).unwrap_err();
        assert_eq!(err, PricingError::Validation(ValidationError::UnknownMaterial("gold-foil".to_string())));

        let mut request = QuoteRequest::new(product.id, 100);
        request.extra.finishings.push("spot-uv".to_string());
        let err = engine.quote(&product, &request).unwrap_err();
        assert_eq!(err.reason(), "unknown_option");

        let mut request = QuoteRequest::new(product.id, 100);
        request.width_in = Some(d("3.5"));
        request.height_in = Some(d("2"));
        let err = engine.quote(&product, &request).unwrap_err();
        assert_eq!(err.reason(), "invalid_dimensions");
    }

    #[test]
    fn test_wrong_product_is_not_found() {
        let product = business_cards();
        let err = engine().quote(&product, &QuoteRequest::new(Uuid::nil(), 100)).unwrap_err();
        assert!(matches!(err, PricingError::NotFound(_)));
    }

    fn banner() -> Product {
        Product::from_value(json!({
            "id": "00000000-0000-4000-8000-0000000000b2",
            "slug": "vinyl-banners",
            "name": "Vinyl banners",
            "description": null,
            "isActive": true,
            "pricing": {
                "model": "AREA_TIERED",
                "tiers": [
                    { "upToSqft": 20, "rateCents": 500 },
                    { "upToSqft": 100, "rateCents": 400 },
                    { "upToSqft": "unbounded", "rateCents": 300 }
                ],
                "finishings": [
                    { "id": "hem", "name": "Hem", "chargeType": "per_sqft", "amountCents": 10 }
                ]
            },
            "materials": [{ "id": "13oz", "name": "13oz vinyl", "multiplier": 1, "isDefault": true }],
            "quantity": { "min": 1, "max": 50 },
            "dimensions": { "minWidthIn": 12, "maxWidthIn": 240, "minHeightIn": 12, "maxHeightIn": 120 }
        }))
        .unwrap()
    }

    #[test]
    fn test_area_tiered_selects_by_order_area() {
        let product = banner();
        let mut request = QuoteRequest::new(product.id, 1);
        request.width_in = Some(d("72"));
        request.height_in = Some(d("40"));
        // 20 sqft exactly -> first tier
        let quote = engine().quote(&product, &request).unwrap();
        assert_eq!(quote.meta.area_sqft, Some(d("20")));
        assert_eq!(quote.unit_cents, 10000);

        request.quantity = 2;
        // 40 sqft -> second tier, 400c * 20 sqft per piece
        let quote = engine().quote(&product, &request).unwrap();
        assert_eq!(quote.unit_cents, 8000);
        assert_eq!(quote.base.amount_cents, 16000);
    }

    #[test]
    fn test_per_sqft_finishing_uses_quote_area() {
        let product = banner();
        let mut request = QuoteRequest::new(product.id, 3);
        request.width_in = Some(d("36"));
        request.height_in = Some(d("24"));
        request.extra.finishings.push("hem".to_string());

        let quote = engine().quote(&product, &request).unwrap();
        // 6 sqft x 3 pieces x 10c
        assert_eq!(quote.breakdown[0].amount_cents, 180);
        assert_eq!(
            quote.base.amount_cents + quote.breakdown.iter().map(|l| l.amount_cents).sum::<Cents>(),
            quote.subtotal_cents
        );
    }

    #[test]
    fn test_out_of_bounds_dimensions() {
        let product = banner();
        let mut request = QuoteRequest::new(product.id, 1);
        request.width_in = Some(d("300"));
        request.height_in = Some(d("24"));
        let err = engine().quote(&product, &request).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::ValidationError);

        request.width_in = Some(d("24"));
        request.height_in = None;
        assert_eq!(engine().quote(&product, &request).unwrap_err().reason(), "invalid_dimensions");
    }

    #[test]
    fn test_cost_plus() {
        let product = Product::from_value(json!({
            "id": "00000000-0000-4000-8000-0000000000b3",
            "slug": "acrylic-signs",
            "name": "Acrylic signs",
            "description": null,
            "isActive": true,
            "pricing": {
                "model": "COST_PLUS",
                "components": [
                    { "id": "acrylic", "name": "Acrylic sheet", "chargeType": "per_sqft", "amountCents": 900 },
                    { "id": "setup", "name": "Setup", "chargeType": "flat", "amountCents": 2500 },
                    { "id": "labor", "name": "Labor", "chargeType": "per_unit", "amountCents": 300 }
                ],
                "markupPercent": 50
            },
            "materials": [{ "id": "clear", "name": "Clear", "multiplier": 1, "isDefault": true }],
            "quantity": { "min": 1, "max": 100 },
            "dimensions": { "minWidthIn": 6, "maxWidthIn": 48, "minHeightIn": 6, "maxHeightIn": 48 }
        }))
        .unwrap();

        let mut request = QuoteRequest::new(product.id, 4);
        request.width_in = Some(d("24"));
        request.height_in = Some(d("12"));
        let quote = engine().quote(&product, &request).unwrap();

        // (2 sqft * 900 * 4 + 2500 + 300 * 4) * 1.5 = 16350
        assert_eq!(quote.base.amount_cents, 16350);
        assert_eq!(quote.unit_cents, 4088);
        assert_eq!(quote.meta.model, PricingModel::CostPlus);
    }

    #[test]
    fn test_quantity_below_first_tier_is_computation_error() {
        let mut product = business_cards();
        product.quantity.min = 1;
        let err = engine().quote(&product, &QuoteRequest::new(product.id, 10)).unwrap_err();
        assert_eq!(
            err,
            PricingError::Computation(ComputationError::QuantityBelowMinimum { requested: 10, minimum: 50 })
        );
    }
}
