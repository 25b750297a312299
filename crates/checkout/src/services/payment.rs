//! Payment service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{CreditCardInfo, Money};
use tokio::sync::RwLock;

use crate::error::{Collaborator, ServiceError};

/// Trait for payment processing operations.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Charges `amount` to the card and returns the transaction ID.
    ///
    /// A business rejection is [`ServiceError::Declined`].
    async fn charge(&self, amount: &Money, card: &CreditCardInfo)
    -> Result<String, ServiceError>;
}

#[async_trait]
impl<T: PaymentService + ?Sized> PaymentService for Arc<T> {
    async fn charge(
        &self,
        amount: &Money,
        card: &CreditCardInfo,
    ) -> Result<String, ServiceError> {
        (**self).charge(amount, card).await
    }
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    payments: HashMap<String, Money>,
    history: Vec<Money>,
    next_id: u32,
    unavailable: bool,
    fail_on_charge: bool,
}

/// In-memory payment service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    /// Creates a new in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to decline every charge.
    pub async fn set_fail_on_charge(&self, fail: bool) {
        self.state.write().await.fail_on_charge = fail;
    }

    /// Makes every call fail as if the service could not be reached.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Returns the number of successful charges.
    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }

    /// Returns true if a payment exists with the given transaction ID.
    pub async fn has_payment(&self, transaction_id: &str) -> bool {
        self.state.read().await.payments.contains_key(transaction_id)
    }

    /// Amounts charged so far, oldest first.
    pub async fn charged_amounts(&self) -> Vec<Money> {
        self.state.read().await.history.clone()
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn charge(
        &self,
        amount: &Money,
        card: &CreditCardInfo,
    ) -> Result<String, ServiceError> {
        let mut state = self.state.write().await;

        if state.unavailable {
            return Err(ServiceError::unavailable(
                Collaborator::Payment,
                "connection refused",
            ));
        }
        if state.fail_on_charge {
            return Err(ServiceError::declined(format!(
                "card ending in {} was declined",
                card.last_four()
            )));
        }

        state.next_id += 1;
        let transaction_id = format!("PAY-{:04}", state.next_id);
        state
            .payments
            .insert(transaction_id.clone(), amount.clone());
        state.history.push(amount.clone());

        Ok(transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> CreditCardInfo {
        CreditCardInfo {
            credit_card_number: "4432801561520454".to_string(),
            credit_card_cvv: 672,
            credit_card_expiration_year: 2030,
            credit_card_expiration_month: 1,
        }
    }

    #[tokio::test]
    async fn test_charge() {
        let service = InMemoryPaymentService::new();
        let amount = Money::new("USD", 50, 0);

        let transaction_id = service.charge(&amount, &card()).await.unwrap();
        assert!(transaction_id.starts_with("PAY-"));
        assert_eq!(service.payment_count().await, 1);
        assert!(service.has_payment(&transaction_id).await);
        assert_eq!(service.charged_amounts().await, vec![amount]);
    }

    #[tokio::test]
    async fn test_fail_on_charge_is_declined() {
        let service = InMemoryPaymentService::new();
        service.set_fail_on_charge(true).await;

        let err = service
            .charge(&Money::new("USD", 50, 0), &card())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Declined { .. }));
        assert!(err.to_string().contains("0454"));
        assert!(!err.to_string().contains("4432801561520454"));
        assert_eq!(service.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_unavailable_is_transient() {
        let service = InMemoryPaymentService::new();
        service.set_unavailable(true).await;

        let err = service
            .charge(&Money::new("USD", 1, 0), &card())
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_sequential_transaction_ids() {
        let service = InMemoryPaymentService::new();
        let amount = Money::new("USD", 10, 0);

        let t1 = service.charge(&amount, &card()).await.unwrap();
        let t2 = service.charge(&amount, &card()).await.unwrap();

        assert_eq!(t1, "PAY-0001");
        assert_eq!(t2, "PAY-0002");
    }
}
