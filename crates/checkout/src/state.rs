//! Checkout state machine.

use serde::{Deserialize, Serialize};

/// The state of a single `place_order` call.
///
/// State transitions:
/// ```text
/// Received ──► CartFetched ──► ItemsPriced ──► ShippingQuoted ──► TotalComputed
///     ──► PaymentCharged ──► Shipped ──► CartEmptied ──► Confirmed
///
/// any step from CartFetched through Shipped ──► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    /// Request accepted and order ID assigned.
    #[default]
    Received,

    /// The user's cart was read.
    CartFetched,

    /// Every cart line has a cost.
    ItemsPriced,

    /// Shipping cost is known.
    ShippingQuoted,

    /// Line costs and shipping were summed.
    TotalComputed,

    /// The total was charged.
    PaymentCharged,

    /// The shipment was booked.
    Shipped,

    /// Cart clearing was attempted. Reached even when clearing fails.
    CartEmptied,

    /// Order result built (terminal state).
    Confirmed,

    /// A required step failed (terminal state).
    Failed,
}

impl CheckoutState {
    /// The state that follows on success, if any.
    pub fn next(&self) -> Option<CheckoutState> {
        match self {
            CheckoutState::Received => Some(CheckoutState::CartFetched),
            CheckoutState::CartFetched => Some(CheckoutState::ItemsPriced),
            CheckoutState::ItemsPriced => Some(CheckoutState::ShippingQuoted),
            CheckoutState::ShippingQuoted => Some(CheckoutState::TotalComputed),
            CheckoutState::TotalComputed => Some(CheckoutState::PaymentCharged),
            CheckoutState::PaymentCharged => Some(CheckoutState::Shipped),
            CheckoutState::Shipped => Some(CheckoutState::CartEmptied),
            CheckoutState::CartEmptied => Some(CheckoutState::Confirmed),
            CheckoutState::Confirmed | CheckoutState::Failed => None,
        }
    }

    /// Returns true if failing while attempting this state aborts the order.
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            CheckoutState::CartFetched
                | CheckoutState::ItemsPriced
                | CheckoutState::ShippingQuoted
                | CheckoutState::TotalComputed
                | CheckoutState::PaymentCharged
                | CheckoutState::Shipped
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutState::Confirmed | CheckoutState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Received => "Received",
            CheckoutState::CartFetched => "CartFetched",
            CheckoutState::ItemsPriced => "ItemsPriced",
            CheckoutState::ShippingQuoted => "ShippingQuoted",
            CheckoutState::TotalComputed => "TotalComputed",
            CheckoutState::PaymentCharged => "PaymentCharged",
            CheckoutState::Shipped => "Shipped",
            CheckoutState::CartEmptied => "CartEmptied",
            CheckoutState::Confirmed => "Confirmed",
            CheckoutState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
