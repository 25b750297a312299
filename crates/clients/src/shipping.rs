//! Shipping service client.

use async_trait::async_trait;
use checkout::{Collaborator, ServiceError, ShippingService};
use domain::{Address, CartItem, Money};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::transport::JsonTransport;

#[derive(Serialize)]
struct ShipmentRequest<'a> {
    address: &'a Address,
    items: &'a [CartItem],
}

#[derive(Deserialize)]
struct QuoteResponse {
    cost: Money,
}

#[derive(Deserialize)]
struct ShipOrderResponse {
    tracking_id: String,
}

/// Quotes and books shipments through a remote shipping service.
#[derive(Debug, Clone)]
pub struct HttpShippingClient {
    transport: JsonTransport,
}

impl HttpShippingClient {
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
impl ShippingService for HttpShippingClient {
    #[tracing::instrument(skip_all, fields(items = items.len()))]
    async fn get_quote(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> Result<Money, ServiceError> {
        let quote: QuoteResponse = self
            .transport
            .call("get-quote", &ShipmentRequest { address, items })
            .await
            .map_err(|e| e.into_service_error(Collaborator::Shipping))?;

        Ok(quote.cost)
    }

    #[tracing::instrument(skip_all, fields(items = items.len()))]
    async fn ship_order(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> Result<String, ServiceError> {
        let shipped: ShipOrderResponse = self
            .transport
            .call("ship-order", &ShipmentRequest { address, items })
            .await
            .map_err(|e| e.into_service_error(Collaborator::Shipping))?;

        Ok(shipped.tracking_id)
    }
}
