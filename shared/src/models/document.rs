//! Receipt and delivery documents
//!
//! Both documents carry an ordered item list against a single warehouse and
//! stay in `Draft` until validated, at which point every item is applied to
//! stock.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle of a receipt or delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "VARCHAR", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Draft,
    Validated,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "DRAFT",
            DocumentStatus::Validated => "VALIDATED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DRAFT" => Some(DocumentStatus::Draft),
            "VALIDATED" => Some(DocumentStatus::Validated),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a receipt or delivery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DocumentItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
    /// Snapshot taken when the document was created
    pub product_name: String,
    pub product_sku: String,
}

impl DocumentItem {
    /// Quantity times unit price, zero when no price was recorded
    pub fn line_total(&self) -> Decimal {
        self.unit_price
            .map(|price| price * Decimal::from(self.quantity))
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DocumentItemInput {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,

    pub unit_price: Option<Decimal>,
}

/// Incoming stock from a supplier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: Uuid,
    pub receipt_number: String,
    pub supplier: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub receipt_date: DateTime<Utc>,
    pub status: DocumentStatus,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<DocumentItem>,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub validated_at: Option<DateTime<Utc>>,
    pub validated_by: Option<String>,
}

/// Outgoing stock to a customer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: Uuid,
    pub delivery_number: String,
    pub customer: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub delivery_date: DateTime<Utc>,
    pub status: DocumentStatus,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<DocumentItem>,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub validated_at: Option<DateTime<Utc>>,
    pub validated_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceiptInput {
    #[validate(length(min = 1, max = 255, message = "Supplier must be 1-255 characters"))]
    pub supplier: String,

    pub warehouse_id: Uuid,

    pub receipt_date: Option<DateTime<Utc>>,

    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<DocumentItemInput>,

    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryInput {
    #[validate(length(min = 1, max = 255, message = "Customer must be 1-255 characters"))]
    pub customer: String,

    pub warehouse_id: Uuid,

    pub delivery_date: Option<DateTime<Utc>>,

    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<DocumentItemInput>,

    pub notes: Option<String>,
}

/// Common view over receipts and deliveries used by filters and totals
pub trait StockDocument {
    fn number(&self) -> &str;
    fn counterparty(&self) -> &str;
    fn warehouse_id(&self) -> Uuid;
    fn status(&self) -> DocumentStatus;
    fn document_date(&self) -> DateTime<Utc>;
    fn items(&self) -> &[DocumentItem];

    /// Sum of all priced lines
    fn total_value(&self) -> Decimal {
        self.items().iter().map(DocumentItem::line_total).sum()
    }

    fn total_quantity(&self) -> i64 {
        self.items().iter().map(|item| i64::from(item.quantity)).sum()
    }
}

impl StockDocument for Receipt {
    fn number(&self) -> &str {
        &self.receipt_number
    }
    fn counterparty(&self) -> &str {
        &self.supplier
    }
    fn warehouse_id(&self) -> Uuid {
        self.warehouse_id
    }
    fn status(&self) -> DocumentStatus {
        self.status
    }
    fn document_date(&self) -> DateTime<Utc> {
        self.receipt_date
    }
    fn items(&self) -> &[DocumentItem] {
        &self.items
    }
}

impl StockDocument for Delivery {
    fn number(&self) -> &str {
        &self.delivery_number
    }
    fn counterparty(&self) -> &str {
        &self.customer
    }
    fn warehouse_id(&self) -> Uuid {
        self.warehouse_id
    }
    fn status(&self) -> DocumentStatus {
        self.status
    }
    fn document_date(&self) -> DateTime<Utc> {
        self.delivery_date
    }
    fn items(&self) -> &[DocumentItem] {
        &self.items
    }
}

/// Human-readable document number: `PREFIX-yyyyMMddHHmmss`, with `-N`
/// appended for the Nth retry when the plain number is already taken.
pub fn document_number(prefix: &str, at: DateTime<Utc>, attempt: u32) -> String {
    let stamp = at.format("%Y%m%d%H%M%S");
    if attempt == 0 {
        format!("{prefix}-{stamp}")
    } else {
        format!("{prefix}-{stamp}-{attempt}")
    }
}

pub const RECEIPT_PREFIX: &str = "RCV";
pub const DELIVERY_PREFIX: &str = "DLV";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn item(quantity: i32, price: Option<&str>) -> DocumentItem {
        DocumentItem {
            product_id: Uuid::new_v4(),
            quantity,
            unit_price: price.map(|p| Decimal::from_str(p).unwrap()),
            product_name: "Widget".to_string(),
            product_sku: "WDG-1".to_string(),
        }
    }

    #[test]
    fn test_document_number_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(document_number(RECEIPT_PREFIX, at, 0), "RCV-20240309140507");
        assert_eq!(document_number(DELIVERY_PREFIX, at, 2), "DLV-20240309140507-2");
    }

    #[test]
    fn test_line_total_without_price_is_zero() {
        assert_eq!(item(5, None).line_total(), Decimal::ZERO);
        assert_eq!(item(4, Some("2.50")).line_total(), Decimal::from(10));
    }

    fn delivery_input(customer: &str, items: Vec<DocumentItemInput>) -> CreateDeliveryInput {
        CreateDeliveryInput {
            customer: customer.to_string(),
            warehouse_id: Uuid::new_v4(),
            delivery_date: None,
            items,
            notes: None,
        }
    }

    #[test]
    fn test_document_input_requires_items() {
        let line = DocumentItemInput {
            product_id: Uuid::new_v4(),
            quantity: 2,
            unit_price: None,
        };
        assert!(delivery_input("Acme", vec![line]).validate().is_ok());

        let errors = delivery_input("Acme", Vec::new()).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));
    }

    #[test]
    fn test_counterparty_fits_its_column() {
        let line = DocumentItemInput {
            product_id: Uuid::new_v4(),
            quantity: 1,
            unit_price: None,
        };
        let errors = delivery_input(&"x".repeat(256), vec![line.clone()])
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("customer"));

        let receipt = CreateReceiptInput {
            supplier: "s".repeat(255),
            warehouse_id: Uuid::new_v4(),
            receipt_date: None,
            items: vec![line],
            notes: None,
        };
        assert!(receipt.validate().is_ok());
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(DocumentStatus::parse("draft"), Some(DocumentStatus::Draft));
        assert_eq!(DocumentStatus::parse("VALIDATED"), Some(DocumentStatus::Validated));
        assert_eq!(DocumentStatus::parse("done"), None);
    }
}
