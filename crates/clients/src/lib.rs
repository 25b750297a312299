//! HTTP/JSON clients for the checkout collaborators.
//!
//! Each client implements one of the service traits from the `checkout`
//! crate by POSTing JSON to `<addr>/<operation>`. Clients are cheap to clone
//! and can share one [`reqwest::Client`] connection pool.

pub mod cart;
pub mod catalog;
pub mod email;
pub mod error;
pub mod payment;
pub mod shipping;
mod transport;

pub use cart::HttpCartClient;
pub use catalog::HttpCatalogClient;
pub use email::HttpEmailClient;
pub use error::ClientError;
pub use payment::HttpPaymentClient;
pub use shipping::HttpShippingClient;
