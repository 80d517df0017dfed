//! Receipt service: incoming stock documents

use shared::stock;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{ChangeType, CreateReceiptInput, DocumentStatus, Receipt};
use crate::services::documents::{
    insert_draft, insert_items, load_items, load_items_tx, lock_document_pairs, snapshot_items,
    DraftHeader, RECEIPTS, RECEIPT_ITEMS,
};
use crate::services::stock::{ensure_warehouse, record_change, Movement};

const RECEIPT_SELECT: &str = r#"
    SELECT r.id, r.receipt_number, r.supplier, r.warehouse_id, w.name AS warehouse_name,
           r.receipt_date, r.status, r.notes, r.created_by, r.created_at, r.validated_at,
           r.validated_by
    FROM receipts r
    JOIN warehouses w ON w.id = r.warehouse_id
"#;

/// Receipt service
#[derive(Clone)]
pub struct ReceiptService {
    db: PgPool,
}

impl ReceiptService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<Receipt>> {
        let query = format!("{RECEIPT_SELECT} ORDER BY r.created_at DESC");
        let receipts = sqlx::query_as::<_, Receipt>(&query)
            .fetch_all(&self.db)
            .await?;
        self.with_items(receipts).await
    }

    pub async fn list_by_status(&self, status: DocumentStatus) -> AppResult<Vec<Receipt>> {
        let query = format!("{RECEIPT_SELECT} WHERE r.status = $1 ORDER BY r.created_at DESC");
        let receipts = sqlx::query_as::<_, Receipt>(&query)
            .bind(status)
            .fetch_all(&self.db)
            .await?;
        self.with_items(receipts).await
    }

    pub async fn list_by_warehouse(&self, warehouse_id: Uuid) -> AppResult<Vec<Receipt>> {
        let query =
            format!("{RECEIPT_SELECT} WHERE r.warehouse_id = $1 ORDER BY r.created_at DESC");
        let receipts = sqlx::query_as::<_, Receipt>(&query)
            .bind(warehouse_id)
            .fetch_all(&self.db)
            .await?;
        self.with_items(receipts).await
    }

    pub async fn get(&self, receipt_id: Uuid) -> AppResult<Receipt> {
        let query = format!("{RECEIPT_SELECT} WHERE r.id = $1");
        let receipt = sqlx::query_as::<_, Receipt>(&query)
            .bind(receipt_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Receipt".to_string()))?;

        let mut receipts = self.with_items(vec![receipt]).await?;
        receipts
            .pop()
            .ok_or_else(|| AppError::NotFound("Receipt".to_string()))
    }

    /// Create a draft receipt
    pub async fn create(&self, user: &AuthUser, input: CreateReceiptInput) -> AppResult<Receipt> {
        input.validate()?;
        shared::validate_document_items(&input.items)
            .map_err(|msg| AppError::validation("items", msg))?;

        let mut tx = self.db.begin().await?;
        ensure_warehouse(&mut tx, input.warehouse_id).await?;
        let items = snapshot_items(&mut tx, &input.items).await?;
        let (receipt_id, number) = insert_draft(
            &mut tx,
            RECEIPTS,
            DraftHeader {
                party: input.supplier.trim(),
                warehouse_id: input.warehouse_id,
                date: input.receipt_date,
                notes: input.notes.as_deref(),
                created_by: &user.email,
            },
        )
        .await?;

        insert_items(&mut tx, RECEIPT_ITEMS, receipt_id, &items).await?;
        tx.commit().await?;

        tracing::info!(receipt_id = %receipt_id, number = %number, items = items.len(), "Receipt created");
        self.get(receipt_id).await
    }

    /// Apply every item to stock and mark the receipt validated
    pub async fn validate(&self, user: &AuthUser, receipt_id: Uuid) -> AppResult<Receipt> {
        let mut tx = self.db.begin().await?;

        let (number, warehouse_id, status) = sqlx::query_as::<_, (String, Uuid, DocumentStatus)>(
            "SELECT receipt_number, warehouse_id, status FROM receipts WHERE id = $1 FOR UPDATE",
        )
        .bind(receipt_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Receipt".to_string()))?;

        if status != DocumentStatus::Draft {
            return Err(AppError::InvalidStateTransition(format!(
                "Receipt {} is already validated",
                number
            )));
        }

        let items = load_items_tx(&mut tx, RECEIPT_ITEMS, receipt_id).await?;
        let mut rows = lock_document_pairs(&mut tx, warehouse_id, &items).await?;
        let notes = format!("Receipt {}", number);

        for item in &items {
            let row = rows
                .get_mut(&item.product_id)
                .ok_or_else(|| AppError::Internal("Stock row not locked".to_string()))?;
            let change = stock::receive(row.quantity, item.quantity)?;
            record_change(
                &mut tx,
                row,
                change,
                Movement {
                    change_type: ChangeType::Receipt,
                    reference_id: Some(receipt_id),
                    notes: Some(&notes),
                },
                user,
            )
            .await?;
        }

        sqlx::query(
            r#"
            UPDATE receipts
            SET status = $2, validated_at = NOW(), validated_by = $3
            WHERE id = $1
            "#,
        )
        .bind(receipt_id)
        .bind(DocumentStatus::Validated)
        .bind(&user.email)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(receipt_id = %receipt_id, number = %number, user = %user.email, "Receipt validated");
        self.get(receipt_id).await
    }

    /// Delete a draft receipt
    pub async fn delete(&self, receipt_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let status = sqlx::query_scalar::<_, DocumentStatus>(
            "SELECT status FROM receipts WHERE id = $1 FOR UPDATE",
        )
        .bind(receipt_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Receipt".to_string()))?;

        if status == DocumentStatus::Validated {
            return Err(AppError::conflict("receipt", "Validated receipts cannot be deleted"));
        }

        sqlx::query("DELETE FROM receipts WHERE id = $1")
            .bind(receipt_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(receipt_id = %receipt_id, "Receipt deleted");
        Ok(())
    }

    async fn with_items(&self, mut receipts: Vec<Receipt>) -> AppResult<Vec<Receipt>> {
        let ids: Vec<Uuid> = receipts.iter().map(|r| r.id).collect();
        let mut items = load_items(&self.db, RECEIPT_ITEMS, &ids).await?;
        for receipt in &mut receipts {
            receipt.items = items.remove(&receipt.id).unwrap_or_default();
        }
        Ok(receipts)
    }
}
