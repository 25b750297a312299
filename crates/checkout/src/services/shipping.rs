//! Shipping service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::{Address, CartItem, Money};
use tokio::sync::RwLock;

use crate::error::{Collaborator, ServiceError};

/// Trait for shipping operations.
#[async_trait]
pub trait ShippingService: Send + Sync {
    /// Estimates the cost of shipping `items` to `address`.
    async fn get_quote(&self, address: &Address, items: &[CartItem])
    -> Result<Money, ServiceError>;

    /// Books a shipment and returns its tracking ID.
    async fn ship_order(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> Result<String, ServiceError>;
}

#[async_trait]
impl<T: ShippingService + ?Sized> ShippingService for Arc<T> {
    async fn get_quote(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> Result<Money, ServiceError> {
        (**self).get_quote(address, items).await
    }

    async fn ship_order(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> Result<String, ServiceError> {
        (**self).ship_order(address, items).await
    }
}

#[derive(Debug)]
struct InMemoryShippingState {
    quote: Money,
    shipments: HashMap<String, (Address, Vec<CartItem>)>,
    next_id: u32,
    unavailable: bool,
    fail_on_quote: bool,
    fail_on_ship: bool,
    ship_latency: Duration,
}

impl Default for InMemoryShippingState {
    fn default() -> Self {
        Self {
            quote: Money::new("USD", 8, 990_000_000),
            shipments: HashMap::new(),
            next_id: 0,
            unavailable: false,
            fail_on_quote: false,
            fail_on_ship: false,
            ship_latency: Duration::ZERO,
        }
    }
}

/// In-memory shipping service for testing.
///
/// Quotes a flat rate (USD 8.99 unless changed) regardless of destination.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShippingService {
    state: Arc<RwLock<InMemoryShippingState>>,
}

impl InMemoryShippingService {
    /// Creates a new in-memory shipping service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flat-rate quote.
    pub async fn set_quote(&self, quote: Money) {
        self.state.write().await.quote = quote;
    }

    /// Makes every call fail as if the service could not be reached.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Configures `get_quote` to return a service error.
    pub async fn set_fail_on_quote(&self, fail: bool) {
        self.state.write().await.fail_on_quote = fail;
    }

    /// Configures `ship_order` to return a service error.
    pub async fn set_fail_on_ship(&self, fail: bool) {
        self.state.write().await.fail_on_ship = fail;
    }

    /// Delays every `ship_order` call by `latency`.
    pub async fn set_ship_latency(&self, latency: Duration) {
        self.state.write().await.ship_latency = latency;
    }

    /// Returns the number of booked shipments.
    pub async fn shipment_count(&self) -> usize {
        self.state.read().await.shipments.len()
    }

    /// Returns true if a shipment exists with the given tracking ID.
    pub async fn has_shipment(&self, tracking_id: &str) -> bool {
        self.state.read().await.shipments.contains_key(tracking_id)
    }
}

#[async_trait]
impl ShippingService for InMemoryShippingService {
    async fn get_quote(
        &self,
        _address: &Address,
        _items: &[CartItem],
    ) -> Result<Money, ServiceError> {
        let state = self.state.read().await;

        if state.unavailable {
            return Err(ServiceError::unavailable(
                Collaborator::Shipping,
                "connection refused",
            ));
        }
        if state.fail_on_quote {
            return Err(ServiceError::upstream(
                Collaborator::Shipping,
                "destination not served",
            ));
        }

        Ok(state.quote.clone())
    }

    async fn ship_order(
        &self,
        address: &Address,
        items: &[CartItem],
    ) -> Result<String, ServiceError> {
        let latency = self.state.read().await.ship_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state.write().await;

        if state.unavailable {
            return Err(ServiceError::unavailable(
                Collaborator::Shipping,
                "connection refused",
            ));
        }
        if state.fail_on_ship {
            return Err(ServiceError::upstream(
                Collaborator::Shipping,
                "shipping unavailable",
            ));
        }

        state.next_id += 1;
        let tracking_id = format!("TRACK-{:04}", state.next_id);
        state
            .shipments
            .insert(tracking_id.clone(), (address.clone(), items.to_vec()));

        Ok(tracking_id)
    }
}
