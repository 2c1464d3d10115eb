//! Order and fulfillment lookup tools over the `OrderDirectory` port.
//! A missing order is a successful `found: false` result; only backend
//! failures use the error envelope.

use std::sync::Arc;

use async_trait::async_trait;
use maildesk_core::domain::order::Order;
use maildesk_core::ports::OrderDirectory;
use serde_json::{json, Value};

use crate::tools::{required_str, Tool, ToolResult};

const DEFAULT_CUSTOMER_ORDERS_LIMIT: usize = 5;

fn order_to_value(order: &Order) -> Value {
    // serde_json::to_value on Order cannot fail: no non-string map keys.
    serde_json::to_value(order).unwrap_or(Value::Null)
}

pub struct GetOrderTool {
    orders: Arc<dyn OrderDirectory>,
}

impl GetOrderTool {
    pub fn new(orders: Arc<dyn OrderDirectory>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl Tool for GetOrderTool {
    fn name(&self) -> &'static str {
        "get_order"
    }

    fn description(&self) -> &'static str {
        "Look up an order by its order number to get details like status, items, \
         total price, and shipping address. Use this when a customer asks about \
         their order status or order details."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "order_number": {
                    "type": "string",
                    "description": "The order number (e.g., '12345' or '#12345')",
                },
            },
            "required": ["order_number"],
        })
    }

    async fn execute(&self, arguments: Value) -> ToolResult {
        let order_number = match required_str(&arguments, "order_number") {
            Ok(value) => value,
            Err(failure) => return failure,
        };

        match self.orders.find_by_number(order_number).await {
            Ok(Some(order)) => ToolResult::ok(json!({
                "found": true,
                "order": order_to_value(&order),
            })),
            Ok(None) => ToolResult::ok(json!({
                "found": false,
                "message": format!(
                    "No order found with number {order_number}. \
                     Please verify the order number and try again."
                ),
            })),
            Err(error) => ToolResult::fail(format!("Failed to retrieve order: {error}")),
        }
    }
}

pub struct GetFulfillmentTool {
    orders: Arc<dyn OrderDirectory>,
}

impl GetFulfillmentTool {
    pub fn new(orders: Arc<dyn OrderDirectory>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl Tool for GetFulfillmentTool {
    fn name(&self) -> &'static str {
        "get_fulfillment"
    }

    fn description(&self) -> &'static str {
        "Get shipping and tracking information for an order. Use this when a customer \
         asks about shipping status, tracking number, or delivery date."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "order_number": {
                    "type": "string",
                    "description": "The order number to get fulfillment info for",
                },
            },
            "required": ["order_number"],
        })
    }

    async fn execute(&self, arguments: Value) -> ToolResult {
        let order_number = match required_str(&arguments, "order_number") {
            Ok(value) => value,
            Err(failure) => return failure,
        };

        let order = match self.orders.find_by_number(order_number).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                return ToolResult::ok(json!({
                    "found": false,
                    "message": format!("No order found with number {order_number}."),
                }))
            }
            Err(error) => {
                return ToolResult::fail(format!("Failed to retrieve fulfillment info: {error}"))
            }
        };

        match self.orders.fulfillment_for(order_number).await {
            Ok(Some(fulfillment)) => ToolResult::ok(json!({
                "found": true,
                "fulfilled": true,
                "fulfillment": serde_json::to_value(&fulfillment).unwrap_or(Value::Null),
            })),
            Ok(None) => ToolResult::ok(json!({
                "found": true,
                "fulfilled": false,
                "order_status": order.status,
                "message": format!(
                    "This order has not been shipped yet. Current status: {}.",
                    order.status
                ),
            })),
            Err(error) => {
                ToolResult::fail(format!("Failed to retrieve fulfillment info: {error}"))
            }
        }
    }
}

pub struct GetCustomerOrdersTool {
    orders: Arc<dyn OrderDirectory>,
}

impl GetCustomerOrdersTool {
    pub fn new(orders: Arc<dyn OrderDirectory>) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl Tool for GetCustomerOrdersTool {
    fn name(&self) -> &'static str {
        "get_customer_orders"
    }

    fn description(&self) -> &'static str {
        "Get all orders for a customer by their email address. Use this when a customer \
         wants to see their order history or when you need to look up orders without \
         a specific order number."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "customer_email": {
                    "type": "string",
                    "description": "The customer's email address",
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of orders to return (default: 5)",
                    "default": DEFAULT_CUSTOMER_ORDERS_LIMIT,
                },
            },
            "required": ["customer_email"],
        })
    }

    async fn execute(&self, arguments: Value) -> ToolResult {
        let customer_email = match required_str(&arguments, "customer_email") {
            Ok(value) => value,
            Err(failure) => return failure,
        };
        let limit = arguments
            .get("limit")
            .and_then(Value::as_u64)
            .map(|value| value as usize)
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_CUSTOMER_ORDERS_LIMIT);

        match self.orders.find_by_customer(customer_email, limit).await {
            Ok(orders) if orders.is_empty() => ToolResult::ok(json!({
                "found": false,
                "orders": [],
                "message": format!("No orders found for {customer_email}."),
            })),
            Ok(orders) => ToolResult::ok(json!({
                "found": true,
                "count": orders.len(),
                "orders": orders.iter().map(order_to_value).collect::<Vec<_>>(),
            })),
            Err(error) => {
                ToolResult::fail(format!("Failed to retrieve customer orders: {error}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use maildesk_core::domain::order::{Fulfillment, Order, ShippingAddress};
    use maildesk_core::domain::order::normalize_order_number;
    use maildesk_core::ports::{OrderDirectory, PortError};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{GetCustomerOrdersTool, GetFulfillmentTool, GetOrderTool};
    use crate::tools::Tool;

    fn sample_order(order_number: &str, fulfillment: Option<Fulfillment>) -> Order {
        Order {
            id: format!("order-{order_number}"),
            order_number: order_number.to_string(),
            customer_email: "jane@example.com".to_string(),
            customer_name: "Jane Doe".to_string(),
            status: "processing".to_string(),
            created_at: Utc::now(),
            total_price: Decimal::new(4999, 2),
            currency: "USD".to_string(),
            line_items: Vec::new(),
            shipping_address: ShippingAddress {
                name: "Jane Doe".to_string(),
                address1: "1 Main St".to_string(),
                address2: None,
                city: "Springfield".to_string(),
                province: None,
                country: "US".to_string(),
                zip: "00001".to_string(),
            },
            fulfillment,
        }
    }

    struct SingleOrderDirectory {
        order: Order,
    }

    #[async_trait]
    impl OrderDirectory for SingleOrderDirectory {
        async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, PortError> {
            let normalized = normalize_order_number(order_number);
            Ok((self.order.order_number == normalized).then(|| self.order.clone()))
        }

        async fn find_by_customer(
            &self,
            customer_email: &str,
            limit: usize,
        ) -> Result<Vec<Order>, PortError> {
            let matches = self.order.customer_email.eq_ignore_ascii_case(customer_email);
            Ok(matches.then(|| self.order.clone()).into_iter().take(limit).collect())
        }

        async fn fulfillment_for(
            &self,
            order_number: &str,
        ) -> Result<Option<Fulfillment>, PortError> {
            Ok(self
                .find_by_number(order_number)
                .await?
                .and_then(|order| order.fulfillment))
        }
    }

    #[tokio::test]
    async fn missing_order_is_found_false_not_an_error() {
        let directory = Arc::new(SingleOrderDirectory { order: sample_order("12345", None) });
        let result =
            GetOrderTool::new(directory).execute(json!({"order_number": "99999"})).await;

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["found"], false);
        assert!(data["message"].as_str().unwrap().contains("99999"));
    }

    #[tokio::test]
    async fn hash_prefixed_numbers_resolve_through_normalization() {
        let directory = Arc::new(SingleOrderDirectory { order: sample_order("12345", None) });
        let result =
            GetOrderTool::new(directory).execute(json!({"order_number": "#12345"})).await;

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["found"], true);
        assert_eq!(data["order"]["order_number"], "12345");
    }

    #[tokio::test]
    async fn unshipped_order_reports_status_without_fulfillment() {
        let directory = Arc::new(SingleOrderDirectory { order: sample_order("12345", None) });
        let result =
            GetFulfillmentTool::new(directory).execute(json!({"order_number": "12345"})).await;

        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["found"], true);
        assert_eq!(data["fulfilled"], false);
        assert_eq!(data["order_status"], "processing");
    }

    #[tokio::test]
    async fn shipped_order_exposes_tracking_details() {
        let fulfillment = Fulfillment {
            status: "in_transit".to_string(),
            carrier: Some("UPS".to_string()),
            tracking_number: Some("1Z999".to_string()),
            tracking_url: None,
            shipped_at: None,
            delivered_at: None,
            estimated_delivery: None,
        };
        let directory =
            Arc::new(SingleOrderDirectory { order: sample_order("12345", Some(fulfillment)) });
        let result =
            GetFulfillmentTool::new(directory).execute(json!({"order_number": "12345"})).await;

        let data = result.data.unwrap();
        assert_eq!(data["fulfilled"], true);
        assert_eq!(data["fulfillment"]["carrier"], "UPS");
    }

    #[tokio::test]
    async fn customer_lookup_is_case_insensitive() {
        let directory = Arc::new(SingleOrderDirectory { order: sample_order("12345", None) });
        let result = GetCustomerOrdersTool::new(directory)
            .execute(json!({"customer_email": "JANE@example.com"}))
            .await;

        let data = result.data.unwrap();
        assert_eq!(data["found"], true);
        assert_eq!(data["count"], 1);
    }

    #[tokio::test]
    async fn unknown_customer_yields_empty_order_list() {
        let directory = Arc::new(SingleOrderDirectory { order: sample_order("12345", None) });
        let result = GetCustomerOrdersTool::new(directory)
            .execute(json!({"customer_email": "nobody@example.com"}))
            .await;

        let data = result.data.unwrap();
        assert_eq!(data["found"], false);
        assert_eq!(data["orders"], json!([]));
    }
}
