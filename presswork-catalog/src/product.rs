use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Charge, PricingConfig, PricingRule, QtyTier};
use crate::error::ConfigError;
use crate::money::Cents;

/// A preset rectangle with its reference price table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SizeOption {
    pub id: String,
    pub label: String,
    pub width_in: Decimal,
    pub height_in: Decimal,
    /// Total price at each listed quantity, captured at this rectangle.
    pub price_by_qty: BTreeMap<u32, Cents>,
    /// Complexity factor relative to the baseline size definition.
    pub multiplier: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub multiplier: Decimal,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuantityRange {
    pub min: u32,
    pub max: u32,
}

impl QuantityRange {
    pub fn contains(&self, quantity: u32) -> bool {
        (self.min..=self.max).contains(&quantity)
    }
}

/// Bounds for custom dimensions. Present only when custom sizes are sold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DimensionBounds {
    pub min_width_in: Decimal,
    pub max_width_in: Decimal,
    pub min_height_in: Decimal,
    pub max_height_in: Decimal,
}

impl DimensionBounds {
    pub fn contains(&self, width_in: Decimal, height_in: Decimal) -> bool {
        width_in >= self.min_width_in
            && width_in <= self.max_width_in
            && height_in >= self.min_height_in
            && height_in <= self.max_height_in
    }
}

/// A sellable product and its immutable pricing configuration.
///
/// Each catalog write produces a new `version`; `from_price_cents` is the
/// cached "starting at" price for that version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Product {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub pricing: PricingConfig,
    #[serde(default)]
    pub sizes: Vec<SizeOption>,
    pub materials: Vec<Material>,
    pub quantity: QuantityRange,
    pub dimensions: Option<DimensionBounds>,
    pub double_sided_multiplier: Option<Decimal>,
    #[serde(default)]
    pub version: u64,
    pub from_price_cents: Option<Cents>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Parse catalog JSON and run every consistency check.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let product: Product =
            serde_json::from_value(value).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        product.validate()?;
        Ok(product)
    }

    pub fn is_dimensional(&self) -> bool {
        !self.sizes.is_empty() || self.dimensions.is_some()
    }

    pub fn default_material(&self) -> Option<&Material> {
        self.materials.iter().find(|m| m.is_default)
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    pub fn size(&self, id: &str) -> Option<&SizeOption> {
        self.sizes.iter().find(|s| s.id == id)
    }

    /// The size option custom rectangles are scaled from.
    pub fn reference_size(&self) -> Option<&SizeOption> {
        self.sizes.first()
    }

    pub fn addon(&self, id: &str) -> Option<&Charge> {
        self.pricing.addons.iter().find(|c| c.id == id)
    }

    pub fn finishing(&self, id: &str) -> Option<&Charge> {
        self.pricing.finishings.iter().find(|c| c.id == id)
    }

    pub fn cut_type(&self, id: &str) -> Option<&Charge> {
        self.pricing.cut_types.iter().find(|c| c.id == id)
    }

    /// Quantity breakpoints for a non-dimensional `QTY_TIERED` product.
    pub fn qty_tiers(&self) -> Option<&[QtyTier]> {
        match &self.pricing.rule {
            PricingRule::QtyTiered { tiers } => tiers.as_deref(),
            _ => None,
        }
    }

    /// Checks that span the config and the rest of the product.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pricing.validate()?;

        if self.slug.trim().is_empty() {
            return Err(invalid("slug", "must not be empty"));
        }
        if self.quantity.min == 0 || self.quantity.min > self.quantity.max {
            return Err(invalid(
                "quantity",
                &format!("range {}..={} is empty or starts at zero", self.quantity.min, self.quantity.max),
            ));
        }

        let defaults = self.materials.iter().filter(|m| m.is_default).count();
        if defaults != 1 {
            return Err(ConfigError::DefaultMaterial(defaults));
        }
        for (i, material) in self.materials.iter().enumerate() {
            if material.multiplier <= Decimal::ZERO {
                return Err(invalid(&format!("materials.{}.multiplier", material.id), "must be positive"));
            }
            if self.materials[..i].iter().any(|m| m.id == material.id) {
                return Err(ConfigError::DuplicateOption(format!("materials.{}", material.id)));
            }
        }

        if let Some(multiplier) = self.double_sided_multiplier {
            if multiplier <= Decimal::ZERO {
                return Err(invalid("doubleSidedMultiplier", "must be positive"));
            }
        }

        for (i, size) in self.sizes.iter().enumerate() {
            if size.width_in <= Decimal::ZERO || size.height_in <= Decimal::ZERO {
                return Err(invalid(&format!("sizes.{}", size.id), "dimensions must be positive"));
            }
            if size.multiplier <= Decimal::ZERO {
                return Err(invalid(&format!("sizes.{}.multiplier", size.id), "must be positive"));
            }
            if self.sizes[..i].iter().any(|s| s.id == size.id) {
                return Err(ConfigError::DuplicateOption(format!("sizes.{}", size.id)));
            }
            if size.price_by_qty.keys().any(|q| *q == 0) {
                return Err(invalid(&format!("sizes.{}.priceByQty", size.id), "quantity 0 is not priceable"));
            }
            if size.price_by_qty.values().any(|p| *p < 0) {
                return Err(invalid(&format!("sizes.{}.priceByQty", size.id), "prices must not be negative"));
            }
        }

        if let Some(bounds) = &self.dimensions {
            if bounds.min_width_in <= Decimal::ZERO
                || bounds.min_height_in <= Decimal::ZERO
                || bounds.min_width_in > bounds.max_width_in
                || bounds.min_height_in > bounds.max_height_in
            {
                return Err(invalid("dimensions", "bounds must be positive and ordered"));
            }
        }

        if self.pricing.bills_by_area() && !self.is_dimensional() {
            return Err(invalid("pricing", "per_sqft charges need a dimensional product"));
        }

        match &self.pricing.rule {
            PricingRule::QtyTiered { tiers } => match (tiers, self.sizes.is_empty()) {
                (Some(_), false) => {
                    return Err(invalid("pricing.tiers", "sized products are priced from their size tables"));
                }
                (None, true) => return Err(ConfigError::EmptyTiers),
                (Some(_), true) => {
                    if self.dimensions.is_some() {
                        return Err(invalid("dimensions", "custom sizes need a reference size option"));
                    }
                }
                (None, false) => {
                    if let Some(size) = self.sizes.iter().find(|s| s.price_by_qty.is_empty()) {
                        return Err(invalid(&format!("sizes.{}.priceByQty", size.id), "must not be empty"));
                    }
                }
            },
            PricingRule::AreaTiered { .. } => {
                if !self.is_dimensional() {
                    return Err(invalid("pricing", "AREA_TIERED needs sizes or custom dimensions"));
                }
            }
            PricingRule::CostPlus { .. } => {}
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_sticker() -> serde_json::Value {
        json!({
            "id": "6f1c2b0e-0000-4000-8000-000000000001",
            "slug": "die-cut-stickers",
            "name": "Die-cut stickers",
            "description": null,
            "isActive": true,
            "pricing": { "model": "QTY_TIERED" },
            "sizes": [{
                "id": "2x2",
                "label": "2\" x 2\"",
                "widthIn": 2,
                "heightIn": 2,
                "priceByQty": { "25": 1704, "100": 3526 },
                "multiplier": 1
            }],
            "materials": [
                { "id": "vinyl", "name": "Vinyl", "multiplier": 1, "isDefault": true },
                { "id": "holo", "name": "Holographic", "multiplier": "1.35" }
            ],
            "quantity": { "min": 1, "max": 10000 },
            "dimensions": {
                "minWidthIn": 1, "maxWidthIn": 12, "minHeightIn": 1, "maxHeightIn": 12
            }
        })
    }

    #[test]
    fn test_parses_sized_product() {
        let product = Product::from_value(raw_sticker()).unwrap();
        assert!(product.is_dimensional());
        assert_eq!(product.default_material().unwrap().id, "vinyl");
        assert_eq!(product.reference_size().unwrap().price_by_qty[&100], 3526);
        assert_eq!(product.from_price_cents, None);
    }

    #[test]
    fn test_requires_single_default_material() {
        let mut raw = raw_sticker();
        raw["materials"][1]["isDefault"] = json!(true);
        assert_eq!(Product::from_value(raw).unwrap_err(), ConfigError::DefaultMaterial(2));
    }

    #[test]
    fn test_rejects_misspelled_multiplier() {
        let mut raw = raw_sticker();
        raw["doubleSidedMultipler"] = json!(1.5);
        assert!(matches!(Product::from_value(raw), Err(ConfigError::Malformed(_))));
    }

    #[test]
    fn test_tiers_and_size_tables_are_exclusive() {
        let mut raw = raw_sticker();
        raw["pricing"]["tiers"] = json!([{ "minQty": 1, "unitPriceCents": 10 }]);
        assert!(matches!(
            Product::from_value(raw),
            Err(ConfigError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_round_trips_through_json() {
        let product = Product::from_value(raw_sticker()).unwrap();
        let back = Product::from_value(serde_json::to_value(&product).unwrap()).unwrap();
        assert_eq!(back, product);
    }
}
