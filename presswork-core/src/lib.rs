pub mod repository;
pub mod service;

use presswork_catalog::PricingError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A quote or lookup the pricing engine refused.
    #[error(transparent)]
    Pricing(#[from] PricingError),
    /// A catalog write rejected before anything was stored.
    #[error("Invalid product: {0}")]
    InvalidProduct(PricingError),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

pub use repository::ProductRepository;
pub use service::{ProductSummary, QuoteService};
