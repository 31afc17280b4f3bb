#![allow(dead_code)]

use std::str::FromStr;

use presswork_catalog::pricing::Sides;
use presswork_catalog::{Product, QuoteEngine, QuoteRequest};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;

pub fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn engine() -> QuoteEngine {
    QuoteEngine::new(d("0.0825"))
}

/// Die-cut stickers: size tables scaled to custom rectangles.
pub fn stickers() -> Product {
    Product::from_value(json!({
        "id": "7d0f3c1a-5b8e-4c2d-9a61-000000000001",
        "slug": "die-cut-stickers",
        "name": "Die-cut stickers",
        "description": "Weatherproof vinyl stickers",
        "isActive": true,
        "pricing": {
            "model": "QTY_TIERED",
            "fileFeeCents": 0,
            "addons": [
                { "id": "proof", "name": "Printed proof", "chargeType": "flat", "amountCents": 900 },
                { "id": "backprint", "name": "Backing print", "chargeType": "per_unit", "amountCents": 3 }
            ],
            "finishings": [
                { "id": "laminate", "name": "Gloss laminate", "chargeType": "per_sqft", "amountCents": 45 }
            ],
            "cutTypes": [
                { "id": "kiss", "name": "Kiss cut", "chargeType": "flat", "amountCents": 0 },
                { "id": "die", "name": "Die cut", "chargeType": "per_unit", "amountCents": 2 }
            ]
        },
        "sizes": [
            {
                "id": "2x2", "label": "2\" x 2\"", "widthIn": 2, "heightIn": 2,
                "priceByQty": { "25": 1704, "100": 3526, "250": 6127, "500": 9900, "1000": 15400 },
                "multiplier": 1
            },
            {
                "id": "3x3", "label": "3\" x 3\"", "widthIn": 3, "heightIn": 3,
                "priceByQty": { "25": 3212, "100": 6540, "250": 11322, "500": 18300, "1000": 28500 },
                "multiplier": "0.95"
            }
        ],
        "materials": [
            { "id": "vinyl", "name": "White vinyl", "multiplier": 1, "isDefault": true },
            { "id": "holo", "name": "Holographic", "multiplier": "1.35" },
            { "id": "clear", "name": "Clear vinyl", "multiplier": "1.1" }
        ],
        "quantity": { "min": 1, "max": 5000 },
        "dimensions": { "minWidthIn": 1, "maxWidthIn": 12, "minHeightIn": 1, "maxHeightIn": 12 }
    }))
    .unwrap()
}

/// Business cards: flat quantity tiers with an order minimum.
pub fn business_cards() -> Product {
    Product::from_value(json!({
        "id": "7d0f3c1a-5b8e-4c2d-9a61-000000000002",
        "slug": "business-cards",
        "name": "Business cards",
        "description": null,
        "isActive": true,
        "pricing": {
            "model": "QTY_TIERED",
            "tiers": [
                { "minQty": 50, "unitPriceCents": 30 },
                { "minQty": 250, "unitPriceCents": 12 },
                { "minQty": 1000, "unitPriceCents": 6 },
                { "minQty": 2500, "unitPriceCents": 5 }
            ],
            "minimumPriceCents": 2000,
            "fileFeeCents": 500,
            "addons": [
                { "id": "rounded", "name": "Rounded corners", "chargeType": "per_unit", "amountCents": 2 }
            ],
            "finishings": [
                { "id": "spot-uv", "name": "Spot UV", "chargeType": "flat", "amountCents": 3500 }
            ]
        },
        "materials": [
            { "id": "matte", "name": "16pt matte", "multiplier": 1, "isDefault": true },
            { "id": "linen", "name": "Linen", "multiplier": "1.5" },
            { "id": "recycled", "name": "Recycled", "multiplier": "0.95" }
        ],
        "quantity": { "min": 50, "max": 10000 },
        "doubleSidedMultiplier": "1.3"
    }))
    .unwrap()
}

/// Vinyl banners: per-sqft rate chosen by total order area.
pub fn banners() -> Product {
    Product::from_value(json!({
        "id": "7d0f3c1a-5b8e-4c2d-9a61-000000000003",
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
            "minimumPriceCents": 2500,
            "finishings": [
                { "id": "hem", "name": "Hem and grommets", "chargeType": "per_sqft", "amountCents": 35 }
            ]
        },
        "sizes": [
            { "id": "2x4ft", "label": "2' x 4'", "widthIn": 48, "heightIn": 24, "priceByQty": {}, "multiplier": 1 }
        ],
        "materials": [
            { "id": "13oz", "name": "13oz vinyl", "multiplier": 1, "isDefault": true },
            { "id": "mesh", "name": "Mesh", "multiplier": "1.2" }
        ],
        "quantity": { "min": 1, "max": 50 },
        "dimensions": { "minWidthIn": 12, "maxWidthIn": 240, "minHeightIn": 12, "maxHeightIn": 120 },
        "doubleSidedMultiplier": "1.8"
    }))
    .unwrap()
}

/// Acrylic signs: itemized cost plus markup.
pub fn acrylic_signs() -> Product {
    Product::from_value(json!({
        "id": "7d0f3c1a-5b8e-4c2d-9a61-000000000004",
        "slug": "acrylic-signs",
        "name": "Acrylic signs",
        "description": null,
        "isActive": true,
        "pricing": {
            "model": "COST_PLUS",
            "components": [
                { "id": "sheet", "name": "Acrylic sheet", "chargeType": "per_sqft", "amountCents": 900 },
                { "id": "setup", "name": "Setup", "chargeType": "flat", "amountCents": 2500 },
                { "id": "labor", "name": "Labor", "chargeType": "per_unit", "amountCents": 300 }
            ],
            "markupPercent": "35.5",
            "addons": [
                { "id": "standoffs", "name": "Standoff mounts", "chargeType": "per_unit", "amountCents": 800 }
            ]
        },
        "materials": [
            { "id": "clear", "name": "Clear", "multiplier": 1, "isDefault": true },
            { "id": "frosted", "name": "Frosted", "multiplier": "1.15" }
        ],
        "quantity": { "min": 1, "max": 100 },
        "dimensions": { "minWidthIn": 6, "maxWidthIn": 48, "minHeightIn": 6, "maxHeightIn": 36 }
    }))
    .unwrap()
}

/// Car magnets: two area tiers, where 20 pieces just over 1 sqft each
/// already reach the cheap tier.
pub fn car_magnets() -> Product {
    Product::from_value(json!({
        "id": "7d0f3c1a-5b8e-4c2d-9a61-000000000005",
        "slug": "car-magnets",
        "name": "Car magnets",
        "description": null,
        "isActive": true,
        "pricing": {
            "model": "AREA_TIERED",
            "tiers": [
                { "upToSqft": 20, "rateCents": 500 },
                { "upToSqft": "unbounded", "rateCents": 100 }
            ]
        },
        "materials": [
            { "id": "30mil", "name": "30 mil", "multiplier": 1, "isDefault": true },
            { "id": "reflective", "name": "Reflective", "multiplier": "1.4" }
        ],
        "quantity": { "min": 1, "max": 20 },
        "dimensions": { "minWidthIn": 12, "maxWidthIn": 24, "minHeightIn": 12, "maxHeightIn": 24 }
    }))
    .unwrap()
}

pub fn catalog() -> Vec<Product> {
    vec![stickers(), business_cards(), banners(), acrylic_signs()]
}

fn quarter_inches(rng: &mut StdRng, lo: Decimal, hi: Decimal) -> Decimal {
    let four = Decimal::from(4);
    let lo = (lo * four).ceil().to_i64().unwrap();
    let hi = (hi * four).floor().to_i64().unwrap();
    Decimal::from(rng.gen_range(lo..=hi)) / four
}

/// A request that passes validation for `product`.
pub fn random_request(rng: &mut StdRng, product: &Product) -> QuoteRequest {
    let quantity = rng.gen_range(product.quantity.min..=product.quantity.max);
    let mut request = QuoteRequest::new(product.id, quantity);

    if product.is_dimensional() {
        let preset = !product.sizes.is_empty() && (product.dimensions.is_none() || rng.gen_bool(0.4));
        if preset || rng.gen_bool(0.3) {
            request.size_id = product.sizes.choose(rng).map(|s| s.id.clone());
        }
        if !preset {
            if let Some(bounds) = product.dimensions {
                request.width_in = Some(quarter_inches(rng, bounds.min_width_in, bounds.max_width_in));
                request.height_in = Some(quarter_inches(rng, bounds.min_height_in, bounds.max_height_in));
            }
        }
    }

    request.material = product.materials.choose(rng).map(|m| m.id.clone());
    if product.double_sided_multiplier.is_some() && rng.gen_bool(0.5) {
        request.sides = Sides::Double;
    }
    for addon in &product.pricing.addons {
        if rng.gen_bool(0.5) {
            request.extra.addons.push(addon.id.clone());
        }
    }
    for finishing in &product.pricing.finishings {
        if rng.gen_bool(0.5) {
            request.extra.finishings.push(finishing.id.clone());
        }
    }
    if rng.gen_bool(0.5) {
        request.extra.cut_type = product.pricing.cut_types.choose(rng).map(|c| c.id.clone());
    }
    request
}
