//! Domain layer for the checkout orchestrator.
//!
//! This crate provides:
//! - [`Money`], a fixed-point amount with exact, validated addition
//! - The cart, catalog and order types exchanged with backend services

pub mod catalog;
pub mod error;
pub mod money;
pub mod order;

pub use catalog::Product;
pub use error::MoneyError;
pub use money::Money;
pub use order::{
    Address, CartItem, CreditCardInfo, OrderItem, OrderResult, PlaceOrderRequest,
    PlaceOrderResponse,
};
