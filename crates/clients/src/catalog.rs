//! Product catalog client.

use async_trait::async_trait;
use checkout::{CatalogService, Collaborator, ServiceError};
use common::ProductId;
use domain::Product;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::transport::JsonTransport;

#[derive(Serialize)]
struct GetProductRequest<'a> {
    id: &'a ProductId,
}

/// Looks products up in a remote catalog service.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    transport: JsonTransport,
}

impl HttpCatalogClient {
    pub fn new(addr: &str) -> Self {
        Self::with_client(Client::new(), addr)
    }

    pub fn with_client(client: Client, addr: &str) -> Self {
        Self {
            transport: JsonTransport::new(client, addr),
        }
    }
}

#[async_trait]
impl CatalogService for HttpCatalogClient {
    #[tracing::instrument(skip_all, fields(product_id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Product, ServiceError> {
        self.transport
            .call("get-product", &GetProductRequest { id })
            .await
            .map_err(|e| match e.status() {
                Some(StatusCode::NOT_FOUND) => {
                    ServiceError::not_found(Collaborator::Catalog, id.as_str())
                }
                _ => e.into_service_error(Collaborator::Catalog),
            })
    }
}
