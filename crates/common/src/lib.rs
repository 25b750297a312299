//! Shared identifier types used across the checkout workspace.

mod types;

pub use types::{OrderId, ProductId, UserId};
