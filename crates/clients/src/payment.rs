//! Payment service client.

use async_trait::async_trait;
use checkout::{Collaborator, PaymentService, ServiceError};
use domain::{CreditCardInfo, Money};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::transport::JsonTransport;

#[derive(Serialize)]
struct ChargeRequest<'a> {
    amount: &'a Money,
    credit_card: &'a CreditCardInfo,
}

#[derive(Deserialize)]
struct ChargeResponse {
    transaction_id: String,
}

/// Charges cards through a remote payment service.
///
/// A `402 Payment Required` answer is a decline and is reported as
/// [`ServiceError::Declined`].
#[derive(Debug, Clone)]
pub struct HttpPaymentClient {
    transport: JsonTransport,
}

impl HttpPaymentClient {
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
impl PaymentService for HttpPaymentClient {
    #[tracing::instrument(skip_all, fields(amount = %amount, card = %card.last_four()))]
    async fn charge(&self, amount: &Money, card: &CreditCardInfo) -> Result<String, ServiceError> {
        let charged: ChargeResponse = self
            .transport
            .call(
                "charge",
                &ChargeRequest {
                    amount,
                    credit_card: card,
                },
            )
            .await
            .map_err(|e| match e {
                ClientError::Status {
                    status: StatusCode::PAYMENT_REQUIRED,
                    body,
                } => ServiceError::declined(body),
                other => other.into_service_error(Collaborator::Payment),
            })?;

        Ok(charged.transaction_id)
    }
}
