use async_trait::async_trait;
use presswork_catalog::Product;
use uuid::Uuid;

use crate::CoreResult;

/// Repository trait for product catalog access
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get_product(&self, id: Uuid) -> CoreResult<Option<Product>>;

    async fn list_products(&self, active_only: bool) -> CoreResult<Vec<Product>>;

    /// Store a new version of `product`.
    ///
    /// Implementations validate the product, recompute its from-price and
    /// bump the version as one step: a reader sees either the old record or
    /// the new one with its matching from-price, never a mix. A product whose
    /// from-price cannot be computed is rejected with
    /// [`CoreError::InvalidProduct`](crate::CoreError::InvalidProduct).
    async fn upsert_product(&self, product: Product) -> CoreResult<Product>;
}
