//! Collaborator service traits and in-memory implementations.

pub mod cart;
pub mod catalog;
pub mod email;
pub mod payment;
pub mod shipping;

pub use cart::{CartService, InMemoryCartService};
pub use catalog::{CatalogLoadError, CatalogService, InMemoryCatalogService};
pub use email::{EmailService, InMemoryEmailService};
pub use payment::{InMemoryPaymentService, PaymentService};
pub use shipping::{InMemoryShippingService, ShippingService};
