//! Typed pricing configuration.
//!
//! Configs arrive as free-form JSON from catalog management. They are parsed
//! here, once, into [`PricingConfig`]; nothing downstream inspects raw JSON.
//! Unknown fields and unknown models are rejected, and an absent charge is
//! `None`, never a silent zero.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::ConfigError;
use crate::money::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingModel {
    QtyTiered,
    AreaTiered,
    CostPlus,
}

impl FromStr for PricingModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QTY_TIERED" => Ok(PricingModel::QtyTiered),
            "AREA_TIERED" => Ok(PricingModel::AreaTiered),
            "COST_PLUS" => Ok(PricingModel::CostPlus),
            other => Err(ConfigError::UnknownModel(other.to_string())),
        }
    }
}

/// Bulk-discount breakpoint: `unit_price_cents` applies from `min_qty` upward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QtyTier {
    pub min_qty: u32,
    pub unit_price_cents: Cents,
}

/// Upper edge of an area tier.
///
/// The last tier of every area table is `Unbounded`. On the wire it is the
/// string `"unbounded"`; there is no numeric sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AreaBound {
    UpTo(Decimal),
    Unbounded,
}

impl AreaBound {
    pub fn contains(&self, sqft: Decimal) -> bool {
        match self {
            AreaBound::UpTo(limit) => sqft <= *limit,
            AreaBound::Unbounded => true,
        }
    }
}

impl Serialize for AreaBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AreaBound::UpTo(limit) => Serialize::serialize(limit, serializer),
            AreaBound::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

impl<'de> Deserialize<'de> for AreaBound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        match &raw {
            Value::String(s) if s == "unbounded" => Ok(AreaBound::Unbounded),
            other => decimal_from_json(other)
                .map(AreaBound::UpTo)
                .ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "upToSqft must be a number or \"unbounded\", got {other}"
                    ))
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AreaTier {
    pub up_to_sqft: AreaBound,
    /// Cents per square foot.
    pub rate_cents: Cents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeType {
    Flat,
    PerUnit,
    PerSqft,
}

/// A named charge: an addon, finishing, cut type or cost-plus component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Charge {
    pub id: String,
    pub name: String,
    pub charge_type: ChargeType,
    pub amount_cents: Cents,
}

/// Model-specific part of a config.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingRule {
    /// `tiers` is absent for products priced from their size tables.
    QtyTiered {
        #[serde(skip_serializing_if = "Option::is_none")]
        tiers: Option<Vec<QtyTier>>,
    },
    AreaTiered {
        tiers: Vec<AreaTier>,
    },
    CostPlus {
        components: Vec<Charge>,
        #[serde(rename = "markupPercent", skip_serializing_if = "Option::is_none")]
        markup_percent: Option<Decimal>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    #[serde(flatten)]
    pub rule: PricingRule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_price_cents: Option<Cents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_fee_cents: Option<Cents>,
    pub addons: Vec<Charge>,
    pub finishings: Vec<Charge>,
    pub cut_types: Vec<Charge>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PricingConfigWire {
    model: String,
    tiers: Option<Value>,
    components: Option<Vec<Charge>>,
    markup_percent: Option<Value>,
    minimum_price_cents: Option<Cents>,
    file_fee_cents: Option<Cents>,
    #[serde(default)]
    addons: Vec<Charge>,
    #[serde(default)]
    finishings: Vec<Charge>,
    #[serde(default)]
    cut_types: Vec<Charge>,
}

impl PricingConfig {
    pub fn model(&self) -> PricingModel {
        match self.rule {
            PricingRule::QtyTiered { .. } => PricingModel::QtyTiered,
            PricingRule::AreaTiered { .. } => PricingModel::AreaTiered,
            PricingRule::CostPlus { .. } => PricingModel::CostPlus,
        }
    }

    /// Parse and validate a config from catalog JSON.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let wire: PricingConfigWire =
            serde_json::from_value(value).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        let model = PricingModel::from_str(&wire.model)?;

        let rule = match model {
            PricingModel::QtyTiered => {
                reject_field(wire.components.is_some(), "components", model)?;
                reject_field(wire.markup_percent.is_some(), "markupPercent", model)?;
                let tiers = wire
                    .tiers
                    .map(serde_json::from_value::<Vec<QtyTier>>)
                    .transpose()
                    .map_err(|e| ConfigError::Malformed(format!("tiers: {e}")))?;
                PricingRule::QtyTiered { tiers }
            }
            PricingModel::AreaTiered => {
                reject_field(wire.components.is_some(), "components", model)?;
                reject_field(wire.markup_percent.is_some(), "markupPercent", model)?;
                let tiers = wire.tiers.ok_or(ConfigError::EmptyTiers)?;
                let tiers: Vec<AreaTier> = serde_json::from_value(tiers)
                    .map_err(|e| ConfigError::Malformed(format!("tiers: {e}")))?;
                PricingRule::AreaTiered { tiers }
            }
            PricingModel::CostPlus => {
                reject_field(wire.tiers.is_some(), "tiers", model)?;
                let components = wire.components.ok_or_else(|| ConfigError::InvalidField {
                    field: "components".to_string(),
                    message: "required for COST_PLUS".to_string(),
                })?;
                let markup_percent = wire
                    .markup_percent
                    .map(|v| {
                        decimal_from_json(&v).ok_or_else(|| ConfigError::InvalidField {
                            field: "markupPercent".to_string(),
                            message: format!("not a number: {v}"),
                        })
                    })
                    .transpose()?;
                PricingRule::CostPlus { components, markup_percent }
            }
        };

        let config = PricingConfig {
            rule,
            minimum_price_cents: wire.minimum_price_cents,
            file_fee_cents: wire.file_fee_cents,
            addons: wire.addons,
            finishings: wire.finishings,
            cut_types: wire.cut_types,
        };
        config.validate()?;
        Ok(config)
    }

    /// Structural checks that do not depend on the owning product.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.rule {
            PricingRule::QtyTiered { tiers: Some(tiers) } => validate_qty_tiers(tiers)?,
            PricingRule::QtyTiered { tiers: None } => {}
            PricingRule::AreaTiered { tiers } => validate_area_tiers(tiers)?,
            PricingRule::CostPlus { components, markup_percent } => {
                if components.is_empty() {
                    return Err(ConfigError::InvalidField {
                        field: "components".to_string(),
                        message: "at least one cost component is required".to_string(),
                    });
                }
                validate_charges("components", components)?;
                if let Some(markup) = markup_percent {
                    if markup.is_sign_negative() {
                        return Err(ConfigError::InvalidField {
                            field: "markupPercent".to_string(),
                            message: "must not be negative".to_string(),
                        });
                    }
                }
            }
        }

        non_negative("minimumPriceCents", self.minimum_price_cents)?;
        non_negative("fileFeeCents", self.file_fee_cents)?;
        validate_charges("addons", &self.addons)?;
        validate_charges("finishings", &self.finishings)?;
        validate_charges("cutTypes", &self.cut_types)?;
        Ok(())
    }

    /// Whether any charge is billed by area.
    pub fn bills_by_area(&self) -> bool {
        let components: &[Charge] = match &self.rule {
            PricingRule::CostPlus { components, .. } => components,
            _ => &[],
        };
        components
            .iter()
            .chain(&self.addons)
            .chain(&self.finishings)
            .chain(&self.cut_types)
            .any(|c| c.charge_type == ChargeType::PerSqft)
    }
}

impl<'de> Deserialize<'de> for PricingConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        PricingConfig::from_value(raw).map_err(serde::de::Error::custom)
    }
}

fn reject_field(present: bool, field: &str, model: PricingModel) -> Result<(), ConfigError> {
    if present {
        return Err(ConfigError::InvalidField {
            field: field.to_string(),
            message: format!("not allowed for {model:?}"),
        });
    }
    Ok(())
}

fn non_negative(field: &str, amount: Option<Cents>) -> Result<(), ConfigError> {
    match amount {
        Some(cents) if cents < 0 => Err(ConfigError::InvalidField {
            field: field.to_string(),
            message: format!("must not be negative, got {cents}"),
        }),
        _ => Ok(()),
    }
}

fn validate_qty_tiers(tiers: &[QtyTier]) -> Result<(), ConfigError> {
    if tiers.is_empty() {
        return Err(ConfigError::EmptyTiers);
    }
    if tiers[0].min_qty == 0 {
        return Err(ConfigError::InvalidField {
            field: "tiers.minQty".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    for pair in tiers.windows(2) {
        if pair[0].min_qty >= pair[1].min_qty {
            return Err(ConfigError::UnsortedBreakpoints(format!(
                "minQty {} followed by {}",
                pair[0].min_qty, pair[1].min_qty
            )));
        }
    }
    for tier in tiers {
        non_negative("tiers.unitPriceCents", Some(tier.unit_price_cents))?;
    }
    Ok(())
}

fn validate_area_tiers(tiers: &[AreaTier]) -> Result<(), ConfigError> {
    let (last, bounded) = tiers.split_last().ok_or(ConfigError::EmptyTiers)?;
    if last.up_to_sqft != AreaBound::Unbounded {
        return Err(ConfigError::MissingUnboundedTier);
    }
    if bounded.iter().any(|t| t.up_to_sqft == AreaBound::Unbounded) {
        return Err(ConfigError::MisplacedUnboundedTier);
    }
    if let Some(AreaTier { up_to_sqft: AreaBound::UpTo(first), .. }) = bounded.first() {
        if *first <= Decimal::ZERO {
            return Err(ConfigError::InvalidField {
                field: "tiers.upToSqft".to_string(),
                message: "must be positive".to_string(),
            });
        }
    }
    for pair in tiers.windows(2) {
        if pair[0].up_to_sqft >= pair[1].up_to_sqft {
            return Err(ConfigError::UnsortedBreakpoints(format!(
                "upToSqft {:?} followed by {:?}",
                pair[0].up_to_sqft, pair[1].up_to_sqft
            )));
        }
    }
    for tier in tiers {
        non_negative("tiers.rateCents", Some(tier.rate_cents))?;
    }
    Ok(())
}

fn validate_charges(group: &str, charges: &[Charge]) -> Result<(), ConfigError> {
    for (i, charge) in charges.iter().enumerate() {
        if charge.id.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: format!("{group}[{i}].id"),
                message: "must not be empty".to_string(),
            });
        }
        if charges[..i].iter().any(|c| c.id == charge.id) {
            return Err(ConfigError::DuplicateOption(format!("{group}.{}", charge.id)));
        }
        non_negative(&format!("{group}.{}.amountCents", charge.id), Some(charge.amount_cents))?;
    }
    Ok(())
}

/// Exact decimal from a JSON number or numeric string.
///
/// Goes through the number's shortest textual form so `0.1` stays `0.1`.
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}
