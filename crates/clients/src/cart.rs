//! Cart service client.

use async_trait::async_trait;
use checkout::{CartService, Collaborator, ServiceError};
use common::UserId;
use domain::CartItem;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::transport::JsonTransport;

#[derive(Serialize)]
struct UserRequest<'a> {
    user_id: &'a UserId,
}

#[derive(Deserialize)]
struct CartResponse {
    #[serde(default)]
    items: Vec<CartItem>,
}

/// Talks to the cart service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCartClient {
    transport: JsonTransport,
}

impl HttpCartClient {
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
impl CartService for HttpCartClient {
    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    async fn get_cart(&self, user_id: &UserId) -> Result<Vec<CartItem>, ServiceError> {
        let cart: CartResponse = self
            .transport
            .call("get-cart", &UserRequest { user_id })
            .await
            .map_err(|e| match e.status() {
                Some(StatusCode::NOT_FOUND) => {
                    ServiceError::not_found(Collaborator::Cart, user_id.as_str())
                }
                _ => e.into_service_error(Collaborator::Cart),
            })?;

        Ok(cart.items)
    }

    #[tracing::instrument(skip_all, fields(user_id = %user_id))]
    async fn empty_cart(&self, user_id: &UserId) -> Result<(), ServiceError> {
        self.transport
            .call_unit("empty-cart", &UserRequest { user_id })
            .await
            .map_err(|e| e.into_service_error(Collaborator::Cart))
    }
}
