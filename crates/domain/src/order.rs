//! Checkout request/response types.

use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::money::Money;

/// A line in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl CartItem {
    pub fn new(product_id: impl Into<ProductId>, quantity: i32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A priced cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item: CartItem,
    /// Line cost, taken as the product's unit price.
    pub cost: Money,
}

impl OrderItem {
    /// Prices `item` with `product`'s listed price.
    pub fn priced(item: CartItem, product: &Product) -> Self {
        Self {
            item,
            cost: product.price.clone(),
        }
    }
}

/// Postal address, passed through to the shipping service unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

/// Card details forwarded to the payment service.
///
/// The `Debug` output masks everything but the last four digits so the value
/// can travel through logs and error messages safely.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCardInfo {
    pub credit_card_number: String,
    pub credit_card_cvv: i32,
    pub credit_card_expiration_year: i32,
    pub credit_card_expiration_month: i32,
}

impl CreditCardInfo {
    /// Last four digits of the card number.
    pub fn last_four(&self) -> &str {
        let number = self.credit_card_number.as_str();
        let start = number
            .char_indices()
            .rev()
            .nth(3)
            .map_or(0, |(index, _)| index);
        &number[start..]
    }
}

impl std::fmt::Debug for CreditCardInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditCardInfo")
            .field("credit_card_number", &format_args!("****{}", self.last_four()))
            .field("credit_card_cvv", &format_args!("***"))
            .field(
                "credit_card_expiration",
                &format_args!(
                    "{:02}/{}",
                    self.credit_card_expiration_month, self.credit_card_expiration_year
                ),
            )
            .finish()
    }
}

/// Input to `PlaceOrder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: UserId,
    pub user_currency: String,
    pub address: Address,
    pub email: String,
    pub credit_card: CreditCardInfo,
}

/// A confirmed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub order_id: OrderId,
    pub shipping_tracking_id: String,
    pub shipping_cost: Money,
    pub shipping_address: Address,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    pub order: OrderResult,
}
