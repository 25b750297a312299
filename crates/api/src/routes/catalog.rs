//! Local catalog browsing and reload endpoints.

use axum::Json;
use axum::extract::{Query, State};
use checkout::InMemoryCatalogService;
use domain::Product;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ProductQuery {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub products: usize,
}

/// GET /products: lists products, filtered by the `q` query parameter when given.
pub async fn list(
    State(catalog): State<InMemoryCatalogService>,
    Query(query): Query<ProductQuery>,
) -> Json<Vec<Product>> {
    let products = match query.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => catalog.search(q).await,
        _ => catalog.list_products().await,
    };
    Json(products)
}

/// POST /admin/catalog/reload: re-reads the catalog file.
///
/// On failure the previously loaded products stay in place.
#[tracing::instrument(skip_all)]
pub async fn reload(
    State(catalog): State<InMemoryCatalogService>,
) -> Result<Json<ReloadResponse>, ApiError> {
    let products = catalog.reload().await?;
    Ok(Json(ReloadResponse { products }))
}
