//! Checkout server entry point.

use std::process::ExitCode;
use std::sync::Arc;

use api::{AppState, CatalogSource, CheckoutOrchestrator, Config};
use checkout::{CatalogService, InMemoryCatalogService};
use clients::{
    HttpCartClient, HttpCatalogClient, HttpEmailClient, HttpPaymentClient, HttpShippingClient,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn install_metrics(config: &Config) -> Result<Option<PrometheusHandle>, ExitCode> {
    if config.disable_stats {
        tracing::info!("stats disabled");
        return Ok(None);
    }

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map(Some)
        .map_err(|e| {
            tracing::error!(error = %e, "failed to install Prometheus recorder");
            ExitCode::FAILURE
        })
}

/// Resolves the catalog, loading the local file when one is configured.
async fn build_catalog(
    config: &Config,
    http: &reqwest::Client,
) -> Result<(Arc<dyn CatalogService>, Option<InMemoryCatalogService>), ExitCode> {
    match &config.catalog {
        CatalogSource::Remote(addr) => {
            let remote: Arc<dyn CatalogService> =
                Arc::new(HttpCatalogClient::with_client(http.clone(), addr));
            Ok((remote, None))
        }
        CatalogSource::File {
            path,
            reload_interval,
        } => {
            let catalog = InMemoryCatalogService::load_json_file(path)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "failed to load catalog file");
                    ExitCode::FAILURE
                })?;
            if let Some(interval) = reload_interval {
                catalog.spawn_reload_task(*interval);
            }
            let local: Arc<dyn CatalogService> = Arc::new(catalog.clone());
            Ok((local, Some(catalog)))
        }
    }
}

async fn run() -> Result<(), ExitCode> {
    // 1. Load and validate configuration before binding anything
    let config = Config::from_env().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        ExitCode::FAILURE
    })?;

    // 2. Install Prometheus metrics recorder
    let metrics_handle = install_metrics(&config)?;

    // 3. Wire collaborators
    let http = reqwest::Client::new();
    let (catalog, local_catalog) = build_catalog(&config, &http).await?;
    let orchestrator = CheckoutOrchestrator::new(
        Arc::new(HttpCartClient::with_client(http.clone(), &config.cart_addr)),
        catalog,
        Arc::new(HttpShippingClient::with_client(http.clone(), &config.shipping_addr)),
        Arc::new(HttpPaymentClient::with_client(http.clone(), &config.payment_addr)),
        Arc::new(HttpEmailClient::with_client(http, &config.email_addr)),
    );
    let state = Arc::new(AppState::new(orchestrator, config.request_timeout));

    // 4. Build the application
    let app = api::create_app(state, metrics_handle, local_catalog);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting checkout server");

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(%addr, error = %e, "failed to bind address");
        ExitCode::FAILURE
    })?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "server error");
            ExitCode::FAILURE
        })?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}
