//! Cart service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use domain::CartItem;
use tokio::sync::RwLock;

use crate::error::{Collaborator, ServiceError};

/// Trait for cart operations.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Returns the items in the user's cart. An unknown or empty cart is an
    /// empty list, not an error.
    async fn get_cart(&self, user_id: &UserId) -> Result<Vec<CartItem>, ServiceError>;

    /// Removes every item from the user's cart. Emptying an empty cart
    /// succeeds.
    async fn empty_cart(&self, user_id: &UserId) -> Result<(), ServiceError>;
}

#[async_trait]
impl<T: CartService + ?Sized> CartService for Arc<T> {
    async fn get_cart(&self, user_id: &UserId) -> Result<Vec<CartItem>, ServiceError> {
        (**self).get_cart(user_id).await
    }

    async fn empty_cart(&self, user_id: &UserId) -> Result<(), ServiceError> {
        (**self).empty_cart(user_id).await
    }
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    carts: HashMap<UserId, Vec<CartItem>>,
    unavailable: bool,
    fail_on_get: bool,
    fail_on_empty: bool,
}

/// In-memory cart service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartService {
    state: Arc<RwLock<InMemoryCartState>>,
}

impl InMemoryCartService {
    /// Creates a new in-memory cart service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item to a user's cart, merging quantities for the same product.
    pub async fn add_item(&self, user_id: &UserId, item: CartItem) {
        let mut state = self.state.write().await;
        let cart = state.carts.entry(user_id.clone()).or_default();

        match cart
            .iter_mut()
            .find(|existing| existing.product_id == item.product_id)
        {
            Some(existing) => existing.quantity += item.quantity,
            None => cart.push(item),
        }
    }

    /// Returns a snapshot of the user's cart.
    pub async fn items(&self, user_id: &UserId) -> Vec<CartItem> {
        self.state
            .read()
            .await
            .carts
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Makes every call fail as if the service could not be reached.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }

    /// Configures `get_cart` to return a service error.
    pub async fn set_fail_on_get(&self, fail: bool) {
        self.state.write().await.fail_on_get = fail;
    }

    /// Configures `empty_cart` to return a service error.
    pub async fn set_fail_on_empty(&self, fail: bool) {
        self.state.write().await.fail_on_empty = fail;
    }
}

#[async_trait]
impl CartService for InMemoryCartService {
    async fn get_cart(&self, user_id: &UserId) -> Result<Vec<CartItem>, ServiceError> {
        let state = self.state.read().await;

        if state.unavailable {
            return Err(ServiceError::unavailable(
                Collaborator::Cart,
                "connection refused",
            ));
        }
        if state.fail_on_get {
            return Err(ServiceError::upstream(
                Collaborator::Cart,
                format!("cannot read cart for user {user_id}"),
            ));
        }

        Ok(state.carts.get(user_id).cloned().unwrap_or_default())
    }

    async fn empty_cart(&self, user_id: &UserId) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;

        if state.unavailable {
            return Err(ServiceError::unavailable(
                Collaborator::Cart,
                "connection refused",
            ));
        }
        if state.fail_on_empty {
            return Err(ServiceError::upstream(
                Collaborator::Cart,
                format!("cannot empty cart for user {user_id}"),
            ));
        }

        state.carts.remove(user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_get_and_empty() {
        let service = InMemoryCartService::new();
        let user = UserId::new("user-1");

        service.add_item(&user, CartItem::new("P1", 2)).await;
        service.add_item(&user, CartItem::new("P2", 1)).await;
        service.add_item(&user, CartItem::new("P1", 3)).await;

        let cart = service.get_cart(&user).await.unwrap();
        assert_eq!(cart, vec![CartItem::new("P1", 5), CartItem::new("P2", 1)]);

        service.empty_cart(&user).await.unwrap();
        assert!(service.get_cart(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_has_empty_cart() {
        let service = InMemoryCartService::new();
        let cart = service.get_cart(&UserId::new("nobody")).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_is_idempotent() {
        let service = InMemoryCartService::new();
        let user = UserId::new("user-1");

        service.empty_cart(&user).await.unwrap();
        service.empty_cart(&user).await.unwrap();
    }

    #[tokio::test]
    async fn test_unavailable() {
        let service = InMemoryCartService::new();
        service.set_unavailable(true).await;

        let err = service.get_cart(&UserId::new("u")).await.unwrap_err();
        assert!(err.is_transient());
        let err = service.empty_cart(&UserId::new("u")).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_fail_on_empty_keeps_items() {
        let service = InMemoryCartService::new();
        let user = UserId::new("user-1");
        service.add_item(&user, CartItem::new("P1", 1)).await;
        service.set_fail_on_empty(true).await;

        let err = service.empty_cart(&user).await.unwrap_err();
        assert!(matches!(err, ServiceError::Upstream { .. }));
        assert_eq!(service.items(&user).await.len(), 1);
    }
}
