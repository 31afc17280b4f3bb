pub mod config;
pub mod error;
pub mod money;
pub mod pricing;
pub mod product;

pub use config::{AreaBound, AreaTier, Charge, ChargeType, PricingConfig, PricingModel, PricingRule, QtyTier};
pub use error::{ComputationError, ConfigError, ErrorKind, PricingError, PricingResult, ValidationError};
pub use money::Cents;
pub use pricing::{FromPriceCalculator, Quote, QuoteEngine, QuoteRequest};
pub use product::{DimensionBounds, Material, Product, QuantityRange, SizeOption};
