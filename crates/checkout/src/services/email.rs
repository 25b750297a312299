//! Email service trait and in-memory implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::OrderId;
use domain::OrderResult;
use tokio::sync::RwLock;

use crate::error::{Collaborator, ServiceError};

/// Trait for order notifications.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends an order confirmation to `email`.
    async fn send_order_confirmation(
        &self,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), ServiceError>;
}

#[async_trait]
impl<T: EmailService + ?Sized> EmailService for Arc<T> {
    async fn send_order_confirmation(
        &self,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), ServiceError> {
        (**self).send_order_confirmation(email, order).await
    }
}

#[derive(Debug, Default)]
struct InMemoryEmailState {
    sent: Vec<(String, OrderId)>,
    fail_on_send: bool,
    send_latency: Duration,
}

/// In-memory email service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmailService {
    state: Arc<RwLock<InMemoryEmailState>>,
}

impl InMemoryEmailService {
    /// Creates a new in-memory email service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every send to fail.
    pub async fn set_fail_on_send(&self, fail: bool) {
        self.state.write().await.fail_on_send = fail;
    }

    /// Delays every send by `latency`.
    pub async fn set_send_latency(&self, latency: Duration) {
        self.state.write().await.send_latency = latency;
    }

    /// Confirmations sent so far as `(recipient, order)` pairs.
    pub async fn sent(&self) -> Vec<(String, OrderId)> {
        self.state.read().await.sent.clone()
    }
}

#[async_trait]
impl EmailService for InMemoryEmailService {
    async fn send_order_confirmation(
        &self,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), ServiceError> {
        let latency = self.state.read().await.send_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.write().await;

        if state.fail_on_send {
            return Err(ServiceError::upstream(
                Collaborator::Email,
                format!("mailbox {email} rejected the message"),
            ));
        }

        state.sent.push((email.to_string(), order.order_id));
        Ok(())
    }
}
