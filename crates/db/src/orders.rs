//! Static order directory backed by a JSON fixture file. Stands in for a
//! storefront API during development and tests.

use std::path::Path;

use async_trait::async_trait;
use maildesk_core::domain::order::{normalize_order_number, Fulfillment, Order};
use maildesk_core::ports::{OrderDirectory, PortError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderBookError {
    #[error("could not read order fixture `{path}`: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("could not parse order fixture `{path}`: {source}")]
    Parse { path: String, source: serde_json::Error },
}

pub struct StaticOrderBook {
    orders: Vec<Order>,
}

impl StaticOrderBook {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub async fn from_file(path: &Path) -> Result<Self, OrderBookError> {
        let display = path.display().to_string();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| OrderBookError::Read { path: display.clone(), source })?;

        let orders: Vec<Order> = serde_json::from_str(&raw)
            .map_err(|source| OrderBookError::Parse { path: display, source })?;
        Ok(Self::new(orders))
    }

    /// The embedded development dataset.
    pub fn sample() -> Self {
        // The fixture ships with the crate and is validated by the seed
        // contract test, so decoding cannot fail at runtime.
        let orders: Vec<Order> = serde_json::from_str(crate::fixtures::SAMPLE_ORDERS_JSON)
            .unwrap_or_default();
        Self::new(orders)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait]
impl OrderDirectory for StaticOrderBook {
    async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, PortError> {
        let normalized = normalize_order_number(order_number);
        Ok(self
            .orders
            .iter()
            .find(|order| normalize_order_number(&order.order_number) == normalized)
            .cloned())
    }

    async fn find_by_customer(
        &self,
        customer_email: &str,
        limit: usize,
    ) -> Result<Vec<Order>, PortError> {
        let mut matches: Vec<Order> = self
            .orders
            .iter()
            .filter(|order| order.customer_email.eq_ignore_ascii_case(customer_email))
            .cloned()
            .collect();

        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn fulfillment_for(&self, order_number: &str) -> Result<Option<Fulfillment>, PortError> {
        Ok(self.find_by_number(order_number).await?.and_then(|order| order.fulfillment))
    }
}

#[cfg(test)]
mod tests {
    use maildesk_core::ports::OrderDirectory;

    use super::StaticOrderBook;

    #[tokio::test]
    async fn sample_dataset_loads_and_resolves_hash_prefixed_numbers() {
        let book = StaticOrderBook::sample();
        assert!(!book.is_empty());

        let direct = book.find_by_number("12345").await.unwrap();
        let prefixed = book.find_by_number("#12345").await.unwrap();
        let padded = book.find_by_number("  #12345 ").await.unwrap();

        assert!(direct.is_some());
        assert_eq!(direct, prefixed);
        assert_eq!(direct, padded);
    }

    #[tokio::test]
    async fn customer_orders_come_back_newest_first() {
        let book = StaticOrderBook::sample();
        let orders = book.find_by_customer("jane.doe@example.com", 10).await.unwrap();

        assert!(orders.len() >= 2);
        for pair in orders.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }

        let limited = book.find_by_customer("jane.doe@example.com", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].order_number, orders[0].order_number);
    }

    #[tokio::test]
    async fn customer_match_ignores_case() {
        let book = StaticOrderBook::sample();
        let lower = book.find_by_customer("jane.doe@example.com", 10).await.unwrap();
        let upper = book.find_by_customer("JANE.DOE@EXAMPLE.COM", 10).await.unwrap();

        assert_eq!(lower, upper);
    }

    #[tokio::test]
    async fn from_file_loads_the_same_dataset_as_sample() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("orders.json");
        std::fs::write(&path, crate::fixtures::SAMPLE_ORDERS_JSON).expect("write fixture");

        let book = StaticOrderBook::from_file(&path).await.expect("load");
        assert_eq!(book.len(), StaticOrderBook::sample().len());
    }

    #[tokio::test]
    async fn unshipped_orders_have_no_fulfillment() {
        let book = StaticOrderBook::sample();

        let shipped = book.fulfillment_for("12345").await.unwrap();
        assert!(shipped.is_some());
        assert_eq!(shipped.unwrap().carrier.as_deref(), Some("UPS"));

        let unshipped = book.fulfillment_for("12347").await.unwrap();
        assert!(unshipped.is_none());
    }
}
