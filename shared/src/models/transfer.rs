//! Internal transfer models

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle of an internal transfer.
///
/// Only `Draft` transfers move; `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "VARCHAR", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    Draft,
    Completed,
    Cancelled,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Draft => "DRAFT",
            TransferStatus::Completed => "COMPLETED",
            TransferStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Some(TransferStatus::Draft),
            "COMPLETED" => Some(TransferStatus::Completed),
            "CANCELLED" => Some(TransferStatus::Cancelled),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        matches!(
            (self, next),
            (TransferStatus::Draft, TransferStatus::Completed)
                | (TransferStatus::Draft, TransferStatus::Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferStatus::Draft)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Movement of one product between two warehouses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct InternalTransfer {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub from_warehouse_id: Uuid,
    pub from_warehouse_name: String,
    pub to_warehouse_id: Uuid,
    pub to_warehouse_name: String,
    pub quantity: i32,
    pub status: TransferStatus,
    pub notes: Option<String>,
    pub created_by: String,
    pub completed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferInput {
    pub product_id: Uuid,
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,

    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_draft_transitions() {
        assert!(TransferStatus::Draft.can_transition_to(TransferStatus::Completed));
        assert!(TransferStatus::Draft.can_transition_to(TransferStatus::Cancelled));
        assert!(!TransferStatus::Completed.can_transition_to(TransferStatus::Cancelled));
        assert!(!TransferStatus::Cancelled.can_transition_to(TransferStatus::Completed));
        assert!(!TransferStatus::Draft.can_transition_to(TransferStatus::Draft));
    }

    #[test]
    fn test_status_serializes_screaming_case() {
        let json = serde_json::to_string(&TransferStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}
