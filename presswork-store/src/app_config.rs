use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub pricing: PricingSettings,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingSettings {
    /// Fraction of the subtotal, e.g. "0.0825". Give it as a string to keep it exact.
    pub tax_rate: Decimal,
    #[serde(default = "default_debounce_ms")]
    pub quote_debounce_ms: u64,
}

fn default_debounce_ms() -> u64 { 275 }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    /// JSON array of products loaded at startup.
    pub seed_path: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked developer overrides
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `PRESSWORK__PRICING__TAX_RATE=0.07`
            .add_source(config::Environment::with_prefix("PRESSWORK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
