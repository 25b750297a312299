//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CatalogLoadError, CheckoutError, ErrorKind};
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Order placement failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The local catalog file could not be reloaded.
    #[error(transparent)]
    CatalogReload(#[from] CatalogLoadError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Checkout(err) => err.kind(),
            ApiError::CatalogReload(_) => ErrorKind::Internal,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Canceled => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        match &self {
            ApiError::Checkout(err) => tracing::error!(
                step = %err.step(),
                origin = %err.origin_kind(),
                error = %err,
                "failed to place order"
            ),
            ApiError::CatalogReload(err) => {
                tracing::error!(error = %err, "failed to reload catalog")
            }
        }

        let body = serde_json::json!({ "error": self.to_string(), "kind": kind.as_str() });
        (status, axum::Json(body)).into_response()
    }
}
