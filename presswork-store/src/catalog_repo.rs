use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use presswork_catalog::{FromPriceCalculator, Product, QuoteEngine};
use presswork_core::{CoreError, CoreResult, ProductRepository};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Versioned product records held in memory.
///
/// Every write replaces the whole record under the write lock, with its
/// from-price already recomputed, so readers only ever clone a consistent
/// version.
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<Uuid, Product>>,
    from_price: FromPriceCalculator,
}

impl InMemoryProductRepository {
    pub fn new(engine: QuoteEngine) -> Self {
        Self {
            products: RwLock::new(HashMap::new()),
            from_price: FromPriceCalculator::new(engine),
        }
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_product(&self, id: Uuid) -> CoreResult<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list_products(&self, active_only: bool) -> CoreResult<Vec<Product>> {
        let products = self.products.read().await;
        let mut listed: Vec<Product> = products
            .values()
            .filter(|p| !active_only || p.is_active)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(listed)
    }

    async fn upsert_product(&self, mut product: Product) -> CoreResult<Product> {
        product
            .validate()
            .map_err(|e| CoreError::InvalidProduct(e.into()))?;

        let mut products = self.products.write().await;
        if let Some(other) = products
            .values()
            .find(|p| p.slug == product.slug && p.id != product.id)
        {
            return Err(CoreError::ValidationError(format!(
                "slug {} is already used by product {}",
                product.slug, other.id
            )));
        }

        let previous = products.get(&product.id).map_or(0, |p| p.version);
        product.version = previous + 1;
        product.from_price_cents = None;
        self.from_price.refresh(&mut product).map_err(|err| {
            tracing::warn!(
                product_id = %product.id,
                slug = %product.slug,
                error = %err,
                "Rejected product write: from-price could not be computed"
            );
            CoreError::InvalidProduct(err)
        })?;
        product.updated_at = Some(Utc::now());

        tracing::debug!(
            product_id = %product.id,
            version = product.version,
            from_price_cents = ?product.from_price_cents,
            "Product version stored"
        );
        products.insert(product.id, product.clone());
        Ok(product)
    }
}
