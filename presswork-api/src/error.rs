use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use presswork_catalog::{ErrorKind, PricingError};
use presswork_core::CoreError;
use serde::{Deserialize, Serialize};

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub reason: String,
    pub message: String,
}

#[derive(Debug)]
pub enum AppError {
    Pricing(PricingError),
    /// Catalog write refused; the product was not stored.
    InvalidProduct(PricingError),
    ValidationError(String),
    InternalServerError(String),
}

fn kind_name(kind: ErrorKind) -> String {
    // ErrorKind serializes to a bare string
    match serde_json::to_value(kind) {
        Ok(serde_json::Value::String(s)) => s,
        _ => format!("{kind:?}"),
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Pricing(err) => match err.kind() {
                ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
                ErrorKind::NotFoundError => StatusCode::NOT_FOUND,
                ErrorKind::ComputationError => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::InvalidProduct(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            AppError::Pricing(err) | AppError::InvalidProduct(err) => ErrorBody {
                kind: kind_name(err.kind()),
                reason: err.reason().to_string(),
                message: err.to_string(),
            },
            AppError::ValidationError(msg) => ErrorBody {
                kind: kind_name(ErrorKind::ValidationError),
                reason: "invalid_request".to_string(),
                message: msg.clone(),
            },
            AppError::InternalServerError(_) => ErrorBody {
                kind: "internal_error".to_string(),
                reason: "internal_error".to_string(),
                message: "Internal Server Error".to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Pricing(err @ PricingError::Config(_)) => {
                tracing::error!("Pricing config error: {}", err);
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
            }
            AppError::InvalidProduct(err) => {
                tracing::warn!("Rejected product write: {}", err);
            }
            _ => {}
        }

        (self.status(), Json(self.body())).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Pricing(err) => AppError::Pricing(err),
            CoreError::InvalidProduct(err) => AppError::InvalidProduct(err),
            CoreError::ValidationError(msg) => AppError::ValidationError(msg),
            CoreError::InternalError(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::Pricing(err)
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}
