//! Stock ledger models

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of stock movement recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "VARCHAR", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Receipt,
    Delivery,
    Adjustment,
    TransferIn,
    TransferOut,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Receipt => "RECEIPT",
            ChangeType::Delivery => "DELIVERY",
            ChangeType::Adjustment => "ADJUSTMENT",
            ChangeType::TransferIn => "TRANSFER_IN",
            ChangeType::TransferOut => "TRANSFER_OUT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "RECEIPT" => Some(ChangeType::Receipt),
            "DELIVERY" => Some(ChangeType::Delivery),
            "ADJUSTMENT" => Some(ChangeType::Adjustment),
            "TRANSFER_IN" => Some(ChangeType::TransferIn),
            "TRANSFER_OUT" => Some(ChangeType::TransferOut),
            _ => None,
        }
    }

    /// Document type that a movement of this kind references
    pub fn reference_type(&self) -> ReferenceType {
        match self {
            ChangeType::Receipt => ReferenceType::Receipt,
            ChangeType::Delivery => ReferenceType::Delivery,
            ChangeType::Adjustment => ReferenceType::Adjustment,
            ChangeType::TransferIn | ChangeType::TransferOut => ReferenceType::Transfer,
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "VARCHAR", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    Receipt,
    Delivery,
    Transfer,
    Adjustment,
}

/// Immutable record of one quantity change for a (product, warehouse) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StockLedgerEntry {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub change_type: ChangeType,
    pub quantity_before: i32,
    pub quantity_change: i32,
    pub quantity_after: i32,
    /// Receipt, delivery, transfer or stock row that caused the change
    pub reference_id: Option<Uuid>,
    pub reference_type: ReferenceType,
    pub user_id: Uuid,
    pub user_email: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of checking a pair's ledger against its live stock row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerVerification {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub entry_count: usize,
    pub opening_quantity: Option<i32>,
    pub closing_quantity: Option<i32>,
    pub stock_quantity: Option<i32>,
    pub consistent: bool,
    /// Description of the first inconsistency found, if any
    pub problem: Option<String>,
}
