//! Product domain entity and catalog query types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::{not_blank, positive_amount};

/// Product domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub sku: String,
    pub price: Decimal,
    pub stock: i32,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product creation and replacement data
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(custom(function = "not_blank", message = "Product name is required"))]
    pub name: String,
    #[validate(custom(function = "not_blank", message = "Product SKU is required"))]
    pub sku: String,
    #[validate(custom(
        function = "positive_amount",
        message = "Product price must be greater than 0"
    ))]
    pub price: Decimal,
    #[validate(range(min = 0, message = "Product stock cannot be negative"))]
    pub stock: i32,
    pub category: Option<String>,
}

/// Optional catalog filters, combined with AND semantics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Exact category match
    pub category: Option<String>,
    /// Case-insensitive substring of the product name
    pub name: Option<String>,
}

impl ProductFilter {
    pub fn new(category: Option<&str>, name: Option<&str>) -> Self {
        Self {
            category: category.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    /// Category filter, ignoring empty input
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    /// Name filter, ignoring empty input
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}
