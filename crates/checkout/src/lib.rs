//! Order checkout orchestration.
//!
//! This crate places an order by sequencing calls to the backend services
//! that own the data:
//! 1. Fetch the user's cart
//! 2. Price every cart line against the catalog
//! 3. Quote shipping and compute the total
//! 4. Charge the total
//! 5. Book the shipment
//! 6. Empty the cart (best-effort)
//! 7. Send a confirmation email (best-effort)
//!
//! A failure in steps 1–5 aborts the order. Completed side effects are not
//! compensated.

pub mod cancel;
pub mod error;
pub mod orchestrator;
pub mod pricer;
pub mod progress;
pub mod services;
pub mod state;

pub use cancel::{CancelHandle, CancelSignal, Canceled};
pub use error::{CheckoutError, Collaborator, ErrorKind, ServiceError};
pub use orchestrator::{CheckoutRun, OrderOrchestrator};
pub use pricer::ProductPricer;
pub use progress::{CheckoutProgress, CheckoutWarning};
pub use services::{
    CartService, CatalogLoadError, CatalogService, EmailService, InMemoryCartService,
    InMemoryCatalogService, InMemoryEmailService, InMemoryPaymentService,
    InMemoryShippingService, PaymentService, ShippingService,
};
pub use state::CheckoutState;
