//! Product catalogue models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_sku_format;

/// A stock-keeping product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Unique across all products, active or not
    pub sku: String,
    pub category: String,
    /// Unit of measure (pcs, kg, box, ...)
    pub unit: String,
    /// Stock rows below this quantity are reported as low stock
    pub reorder_level: i32,
    pub initial_stock: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating a product
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255, message = "Product name must be 1-255 characters"))]
    pub name: String,

    #[validate(custom = "validate_sku_format")]
    pub sku: String,

    #[validate(length(min = 1, max = 120, message = "Category must be 1-120 characters"))]
    pub category: String,

    #[validate(length(min = 1, max = 32, message = "Unit of measure must be 1-32 characters"))]
    pub unit: String,

    #[validate(range(min = 0, message = "Reorder level must not be negative"))]
    pub reorder_level: Option<i32>,

    #[validate(range(min = 0, message = "Initial stock must not be negative"))]
    pub initial_stock: Option<i32>,

    pub active: Option<bool>,
}
