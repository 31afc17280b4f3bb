use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use presswork_catalog::{Quote, QuoteRequest};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSettingsResponse {
    pub debounce_ms: u64,
    pub tax_rate: Decimal,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/quotes", post(create_quote))
        .route("/v1/quotes/settings", get(quote_settings))
}

/// POST /v1/quotes
/// Price a customization against the current product version
pub async fn create_quote(
    State(state): State<AppState>,
    body: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<Quote>, AppError> {
    let Json(request) = body?;
    tracing::debug!(product_id = %request.product_id, quantity = request.quantity, "Quote requested");

    let quote = state.quotes.quote(&request).await?;
    Ok(Json(quote))
}

/// GET /v1/quotes/settings
pub async fn quote_settings(State(state): State<AppState>) -> Json<QuoteSettingsResponse> {
    Json(QuoteSettingsResponse {
        debounce_ms: debounce_ms(state.quote_debounce),
        tax_rate: state.quotes.engine().tax_rate(),
    })
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn debounce_ms(window: Duration) -> u64 {
    u64::try_from(window.as_millis()).unwrap_or(u64::MAX)
}
