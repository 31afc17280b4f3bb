use std::sync::Arc;

use presswork_catalog::{
    Cents, FromPriceCalculator, PricingError, PricingModel, Product, Quote, QuoteEngine, QuoteRequest,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{CoreError, CoreResult, ProductRepository};

/// Listing-page view of a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub model: PricingModel,
    /// `None` only when the product cannot be priced at all.
    pub from_price_cents: Option<Cents>,
    pub version: u64,
}

/// Quote and catalog operations over a [`ProductRepository`].
#[derive(Clone)]
pub struct QuoteService {
    products: Arc<dyn ProductRepository>,
    engine: QuoteEngine,
    from_price: FromPriceCalculator,
}

impl QuoteService {
    pub fn new(products: Arc<dyn ProductRepository>, engine: QuoteEngine) -> Self {
        Self {
            from_price: FromPriceCalculator::new(engine.clone()),
            products,
            engine,
        }
    }

    pub fn engine(&self) -> &QuoteEngine {
        &self.engine
    }

    /// Price a request against the current version of its product.
    pub async fn quote(&self, request: &QuoteRequest) -> CoreResult<Quote> {
        let product = self.product(request.product_id).await?;
        self.engine.quote(&product, request).map_err(|err| {
            if let PricingError::Config(config) = &err {
                tracing::error!(
                    product_id = %product.id,
                    slug = %product.slug,
                    version = product.version,
                    error = %config,
                    "Stored pricing config is inconsistent"
                );
            }
            CoreError::Pricing(err)
        })
    }

    /// An active product by id.
    pub async fn product(&self, id: Uuid) -> CoreResult<Product> {
        match self.products.get_product(id).await? {
            Some(product) if product.is_active => Ok(product),
            _ => Err(PricingError::NotFound(id.to_string()).into()),
        }
    }

    /// Active products with their "starting at" prices.
    pub async fn listing(&self) -> CoreResult<Vec<ProductSummary>> {
        let products = self.products.list_products(true).await?;
        Ok(products
            .into_iter()
            .map(|product| {
                let from_price_cents = match self.from_price.display_price(&product) {
                    Ok(cents) => Some(cents),
                    Err(err) => {
                        tracing::error!(
                            product_id = %product.id,
                            slug = %product.slug,
                            error = %err,
                            "No from-price for listed product"
                        );
                        None
                    }
                };
                ProductSummary {
                    id: product.id,
                    slug: product.slug,
                    name: product.name,
                    description: product.description,
                    model: product.pricing.model(),
                    from_price_cents,
                    version: product.version,
                }
            })
            .collect())
    }

    /// Parse raw catalog JSON for `id` and store it as a new version.
    pub async fn save_product(&self, id: Uuid, raw: serde_json::Value) -> CoreResult<Product> {
        let product = Product::from_value(raw).map_err(|e| CoreError::InvalidProduct(e.into()))?;
        if product.id != id {
            return Err(CoreError::ValidationError(format!(
                "body id {} does not match path id {id}",
                product.id
            )));
        }
        let stored = self.products.upsert_product(product).await?;
        tracing::info!(
            product_id = %stored.id,
            version = stored.version,
            from_price_cents = ?stored.from_price_cents,
            "Stored product"
        );
        Ok(stored)
    }
}
