use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::put,
    Json, Router,
};
use presswork_catalog::Product;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/admin/products/{id}", put(put_product))
}

/// PUT /v1/admin/products/{id}
/// Store a new version of a product from raw catalog JSON.
///
/// The from-price is recomputed as part of the write; a product that cannot
/// be priced is rejected and the previous version stays live.
pub async fn put_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<Product>, AppError> {
    let Json(raw) = body?;
    let stored = state.quotes.save_product(id, raw).await?;
    Ok(Json(stored))
}
