use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use presswork_catalog::Product;
use presswork_core::ProductSummary;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", get(list_products))
        .route("/v1/products/{id}", get(get_product))
}

/// GET /v1/products
/// Active products with their "starting at" price
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<ProductSummary>>, AppError> {
    Ok(Json(state.quotes.listing().await?))
}

/// GET /v1/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.quotes.product(id).await?))
}
