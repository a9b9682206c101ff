//! Order aggregate: orders, their items and the read models built on them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::positive_amount;

/// Order domain entity (the aggregate root row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order row creation data; `total` is computed by the caller, never the client
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i32,
    pub total: Decimal,
}

/// Order item entity. `unit_price` is a snapshot taken at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order item row creation data
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// One requested line of a new order.
///
/// Serialized as-is into the atomic order routine's item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OrderLine {
    #[validate(range(min = 1, message = "Product ID must be greater than 0"))]
    pub product_id: i32,
    #[validate(range(min = 1, message = "Quantity must be greater than 0"))]
    pub quantity: i32,
    #[validate(custom(function = "positive_amount", message = "Unit price must be greater than 0"))]
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn new(product_id: i32, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    /// Quantity times unit price
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Sum of all line subtotals
pub fn order_total(lines: &[OrderLine]) -> Decimal {
    lines.iter().map(OrderLine::subtotal).sum()
}

/// An item of a fetched order, with the product name denormalized for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLineDetail {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Heavy read model: one order with all of its items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderLineDetail>,
}

/// Thin read model for listings: totals only, no items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub id: i32,
    pub user_id: i32,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderSummary {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            total: order.total,
            created_at: order.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_total() {
        let lines = vec![
            OrderLine::new(1, 2, Decimal::new(1000, 2)),
            OrderLine::new(2, 1, Decimal::new(500, 2)),
        ];
        assert_eq!(order_total(&lines), Decimal::new(2500, 2));
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_order_line_validation() {
        assert!(OrderLine::new(1, 1, Decimal::ONE).validate().is_ok());
        assert!(OrderLine::new(0, 1, Decimal::ONE).validate().is_err());
        assert!(OrderLine::new(1, 0, Decimal::ONE).validate().is_err());
        assert!(OrderLine::new(1, 1, Decimal::ZERO).validate().is_err());
    }

    #[test]
    fn test_order_line_wire_shape() {
        let json = serde_json::to_value(OrderLine::new(3, 2, Decimal::new(1050, 2))).unwrap();
        assert_eq!(json["product_id"], 3);
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["unit_price"], "10.50");
    }
}
