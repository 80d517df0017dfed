//! Stock level models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Quantity of one product held in one warehouse.
///
/// The (product, warehouse) pair is unique and `quantity` never drops below
/// zero. Product and warehouse names are joined in for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub quantity: i32,
    pub location_rack: Option<String>,
    pub last_updated: DateTime<Utc>,
}

/// Create a stock row or overwrite its quantity and rack location
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertStockInput {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,

    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity: i32,

    #[validate(length(max = 64, message = "Rack location is too long"))]
    pub location_rack: Option<String>,
}

/// Relative stock adjustment (positive adds, negative removes)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockInput {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub adjustment: i32,

    #[validate(length(max = 500, message = "Reason is too long"))]
    pub reason: Option<String>,
}

/// Total quantity of a product across every warehouse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductStockTotal {
    pub product_id: Uuid,
    pub total_quantity: i64,
}
