//! HTTP front end for the checkout orchestrator.
//!
//! Exposes order placement over JSON, with structured logging (tracing) and
//! optional Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use checkout::{
    CartService, CatalogService, EmailService, InMemoryCatalogService, OrderOrchestrator,
    PaymentService, ShippingService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{CatalogSource, Config, ConfigError};
pub use error::ApiError;

/// Orchestrator over type-erased collaborators, so in-memory and HTTP
/// implementations can be mixed.
pub type CheckoutOrchestrator = OrderOrchestrator<
    Arc<dyn CartService>,
    Arc<dyn CatalogService>,
    Arc<dyn ShippingService>,
    Arc<dyn PaymentService>,
    Arc<dyn EmailService>,
>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: CheckoutOrchestrator,
    /// Deadline applied to each order placement.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(orchestrator: CheckoutOrchestrator, request_timeout: Duration) -> Self {
        Self {
            orchestrator,
            request_timeout,
        }
    }
}

/// Creates the Axum application router.
///
/// `/metrics` is only mounted with a Prometheus handle; the product and
/// catalog reload routes only with a local catalog.
pub fn create_app(
    state: Arc<AppState>,
    metrics_handle: Option<PrometheusHandle>,
    local_catalog: Option<InMemoryCatalogService>,
) -> Router {
    let mut app = Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::place))
        .with_state(state);

    if let Some(handle) = metrics_handle {
        app = app.merge(
            Router::new()
                .route("/metrics", get(routes::metrics::get))
                .with_state(handle),
        );
    }

    if let Some(catalog) = local_catalog {
        app = app.merge(
            Router::new()
                .route("/products", get(routes::catalog::list))
                .route("/admin/catalog/reload", post(routes::catalog::reload))
                .with_state(catalog),
        );
    }

    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
    .layer(TraceLayer::new_for_http())
}
