//! Catalog service trait and in-memory implementation.
//!
//! [`InMemoryCatalogService`] doubles as the local catalog used when products
//! are served from a JSON file. The product set is swapped atomically on
//! [`InMemoryCatalogService::reload`], which is triggered by an explicit call
//! or by the polling task from [`InMemoryCatalogService::spawn_reload_task`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::ProductId;
use domain::Product;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::error::{Collaborator, ServiceError};

/// Read-only product lookup.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Returns the product with the given ID.
    ///
    /// Unknown IDs yield [`ServiceError::NotFound`].
    async fn get_product(&self, id: &ProductId) -> Result<Product, ServiceError>;
}

#[async_trait]
impl<T: CatalogService + ?Sized> CatalogService for Arc<T> {
    async fn get_product(&self, id: &ProductId) -> Result<Product, ServiceError> {
        (**self).get_product(id).await
    }
}

/// Errors loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog was not loaded from a file")]
    NoSource,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<Product>,
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
    source: Option<PathBuf>,
    unavailable: bool,
    extra_latency: Duration,
    lookups: usize,
}

impl InMemoryCatalogState {
    fn replace(&mut self, products: Vec<Product>) {
        self.index = products
            .iter()
            .enumerate()
            .map(|(position, product)| (product.id.clone(), position))
            .collect();
        self.products = products;
    }
}

/// In-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogService {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogService {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding `products`.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut state = InMemoryCatalogState::default();
        state.replace(products.into_iter().collect());
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Loads a catalog from a `{"products": [...]}` JSON file and remembers the
    /// path for later reloads.
    pub async fn load_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref().to_path_buf();
        let products = read_catalog_file(&path).await?;

        let mut state = InMemoryCatalogState::default();
        state.replace(products);
        state.source = Some(path);

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Re-reads the file this catalog was loaded from. On failure the current
    /// products stay in place.
    ///
    /// Returns the number of products now in the catalog.
    #[tracing::instrument(skip(self))]
    pub async fn reload(&self) -> Result<usize, CatalogLoadError> {
        let source = self
            .state
            .read()
            .await
            .source
            .clone()
            .ok_or(CatalogLoadError::NoSource)?;

        let products = read_catalog_file(&source).await?;
        let count = products.len();
        self.state.write().await.replace(products);

        metrics::counter!("catalog_reloads_total").increment(1);
        tracing::info!(path = %source.display(), count, "catalog reloaded");
        Ok(count)
    }

    /// Reloads the catalog every `interval` until the returned task is aborted.
    pub fn spawn_reload_task(&self, interval: Duration) -> JoinHandle<()> {
        let catalog = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately and the catalog is already fresh.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = catalog.reload().await {
                    tracing::warn!(error = %e, "catalog reload failed, keeping previous products");
                }
            }
        })
    }

    /// Replaces every product.
    pub async fn replace_products(&self, products: impl IntoIterator<Item = Product>) {
        self.state
            .write()
            .await
            .replace(products.into_iter().collect());
    }

    /// Returns all products in catalog order.
    pub async fn list_products(&self) -> Vec<Product> {
        self.state.read().await.products.clone()
    }

    /// Returns products whose name or description contains `query`,
    /// ignoring case.
    pub async fn search(&self, query: &str) -> Vec<Product> {
        self.state
            .read()
            .await
            .products
            .iter()
            .filter(|product| product.matches(query))
            .cloned()
            .collect()
    }

    /// Number of `get_product` calls served.
    pub async fn lookup_count(&self) -> usize {
        self.state.read().await.lookups
    }

    /// Makes every lookup fail as if the service could not be reached.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Delays every lookup by `latency`.
    pub async fn set_extra_latency(&self, latency: Duration) {
        self.state.write().await.extra_latency = latency;
    }
}

async fn read_catalog_file(path: &Path) -> Result<Vec<Product>, CatalogLoadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| CatalogLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let file: CatalogFile =
        serde_json::from_slice(&bytes).map_err(|source| CatalogLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(file.products)
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    async fn get_product(&self, id: &ProductId) -> Result<Product, ServiceError> {
        let latency = self.state.read().await.extra_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.write().await;
        if state.unavailable {
            return Err(ServiceError::unavailable(
                Collaborator::Catalog,
                "connection refused",
            ));
        }

        state.lookups += 1;
        state
            .index
            .get(id)
            .and_then(|&position| state.products.get(position))
            .cloned()
            .ok_or_else(|| ServiceError::not_found(Collaborator::Catalog, id.as_str()))
    }
}
