use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub title: String,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub sku: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub province: Option<String>,
    pub country: String,
    pub zip: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    pub status: String,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub tracking_url: Option<String>,
    #[serde(default)]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// An order record as exposed by the fulfillment data provider. Read-mostly
/// from the agent's perspective.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub customer_email: String,
    pub customer_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub total_price: Decimal,
    pub currency: String,
    pub line_items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub fulfillment: Option<Fulfillment>,
}

/// Normalizes customer-supplied order numbers: strips a leading `#` and
/// surrounding whitespace, so `#12345`, `12345` and ` 12345 ` all match.
pub fn normalize_order_number(order_number: &str) -> String {
    order_number.trim().trim_start_matches('#').trim().to_string()
}
