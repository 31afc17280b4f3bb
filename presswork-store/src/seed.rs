use std::path::Path;

use presswork_catalog::pricing::area;
use presswork_catalog::{ConfigError, PricingError, Product};
use presswork_core::{CoreError, ProductRepository};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("cannot read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("seed file is not a JSON array of products: {0}")]
    Json(#[from] serde_json::Error),
    #[error("seed product #{index} is invalid: {source}")]
    Product {
        index: usize,
        #[source]
        source: PricingError,
    },
    #[error("seed product {slug} was rejected by the store: {source}")]
    Store {
        slug: String,
        #[source]
        source: CoreError,
    },
}

/// Parse a seed document into validated products.
///
/// Size options of size-priced products may leave `priceByQty` empty; those
/// tables are derived from the first size's table with the same scaler the
/// quote engine uses for custom sizes.
pub fn parse_seed(json: &str) -> Result<Vec<Product>, SeedError> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            let invalid = |source: PricingError| SeedError::Product { index, source };
            let mut product: Product = serde_json::from_value(value)
                .map_err(|e| invalid(ConfigError::Malformed(e.to_string()).into()))?;
            let filled = area::backfill_size_tables(&mut product).map_err(invalid)?;
            if !filled.is_empty() {
                tracing::info!(slug = %product.slug, sizes = ?filled, "Derived size price tables");
            }
            product.validate().map_err(|e| invalid(e.into()))?;
            Ok(product)
        })
        .collect()
}

pub fn load_seed(path: impl AsRef<Path>) -> Result<Vec<Product>, SeedError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_seed(&json)
}

/// Write every product through the repository, so each gets a version and
/// a from-price exactly like an admin write.
pub async fn seed_repository(
    repo: &dyn ProductRepository,
    products: Vec<Product>,
) -> Result<usize, SeedError> {
    let count = products.len();
    for product in products {
        let slug = product.slug.clone();
        repo.upsert_product(product)
            .await
            .map_err(|source| SeedError::Store { slug, source })?;
    }
    tracing::info!(count, "Catalog seeded");
    Ok(count)
}
