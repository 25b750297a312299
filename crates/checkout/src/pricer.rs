//! Cart line pricing against the catalog.

use domain::{CartItem, OrderItem};

use crate::error::ServiceError;
use crate::services::catalog::CatalogService;

/// Resolves a cost for every cart line.
#[derive(Debug, Clone)]
pub struct ProductPricer<C> {
    catalog: C,
}

impl<C: CatalogService> ProductPricer<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Looks up each item's product in order and returns one [`OrderItem`]
    /// per cart line, costed at the product's unit price.
    ///
    /// Stops at the first failed lookup; no partial result is returned.
    #[tracing::instrument(skip_all, fields(items = items.len()))]
    pub async fn price_items(&self, items: &[CartItem]) -> Result<Vec<OrderItem>, ServiceError> {
        let mut priced = Vec::with_capacity(items.len());

        for item in items {
            let product = self
                .catalog
                .get_product(&item.product_id)
                .await
                .inspect_err(|e| {
                    tracing::debug!(product_id = %item.product_id, error = %e, "product lookup failed");
                })?;
            priced.push(OrderItem::priced(item.clone(), &product));
        }

        Ok(priced)
    }
}
