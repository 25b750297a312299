//! Email service client.

use async_trait::async_trait;
use checkout::{Collaborator, EmailService, ServiceError};
use domain::OrderResult;
use reqwest::Client;
use serde::Serialize;

use crate::transport::JsonTransport;

#[derive(Serialize)]
struct ConfirmationRequest<'a> {
    email: &'a str,
    order: &'a OrderResult,
}

#[derive(Debug, Clone)]
pub struct HttpEmailClient {
    transport: JsonTransport,
}

impl HttpEmailClient {
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
impl EmailService for HttpEmailClient {
    #[tracing::instrument(skip_all, fields(order_id = %order.order_id))]
    async fn send_order_confirmation(
        &self,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), ServiceError> {
        self.transport
            .call_unit("send-order-confirmation", &ConfirmationRequest { email, order })
            .await
            .map_err(|e| e.into_service_error(Collaborator::Email))
    }
}
