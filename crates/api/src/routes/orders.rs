//! Order placement endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use checkout::CancelSignal;
use domain::{PlaceOrderRequest, PlaceOrderResponse};

use crate::AppState;
use crate::error::ApiError;

/// POST /orders: places an order for the user's cart.
///
/// The order runs under the configured request deadline; an expired
/// deadline answers `504`.
#[tracing::instrument(skip_all)]
pub async fn place(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>, ApiError> {
    tracing::info!(
        user_id = %request.user_id,
        currency = %request.user_currency,
        "placing order"
    );

    let cancel = CancelSignal::with_timeout(state.request_timeout);
    let response = state.orchestrator.place_order(request, &cancel).await?;

    Ok(Json(response))
}
