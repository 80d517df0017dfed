//! Dashboard aggregates

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub kpis: Kpis,
    pub low_stock_items: Vec<LowStockItem>,
    pub category_breakdown: Vec<CategoryStats>,
    pub warehouse_stats: Vec<WarehouseStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_products: i64,
    pub active_products: i64,
    pub total_stock: i64,
    pub low_stock_count: i64,
    pub total_warehouses: i64,
    pub active_warehouses: i64,
}

/// A stock row of an active product that sits below its reorder level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub category: String,
    pub current_stock: i32,
    pub reorder_level: i32,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: String,
    pub product_count: i64,
    pub total_stock: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseStats {
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub location: String,
    /// Number of stock rows (distinct products) held
    pub total_items: i64,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StockValueAnalysis {
    /// Total units held for active products
    pub total_stock_value: i64,
    pub product_count: i64,
}
