//! Delivery service: outgoing stock documents

use shared::stock;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{ChangeType, CreateDeliveryInput, Delivery, DocumentStatus};
use crate::services::documents::{
    insert_draft, insert_items, load_items, load_items_tx, lock_document_pairs,
    requested_per_product, snapshot_items, DraftHeader, DELIVERIES, DELIVERY_ITEMS,
};
use crate::services::stock::{ensure_warehouse, record_change, Movement};

const DELIVERY_SELECT: &str = r#"
    SELECT d.id, d.delivery_number, d.customer, d.warehouse_id, w.name AS warehouse_name,
           d.delivery_date, d.status, d.notes, d.created_by, d.created_at, d.validated_at,
           d.validated_by
    FROM deliveries d
    JOIN warehouses w ON w.id = d.warehouse_id
"#;

/// Delivery service
#[derive(Clone)]
pub struct DeliveryService {
    db: PgPool,
}

impl DeliveryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<Delivery>> {
        let query = format!("{DELIVERY_SELECT} ORDER BY d.created_at DESC");
        let deliveries = sqlx::query_as::<_, Delivery>(&query)
            .fetch_all(&self.db)
            .await?;
        self.with_items(deliveries).await
    }

    pub async fn list_by_status(&self, status: DocumentStatus) -> AppResult<Vec<Delivery>> {
        let query = format!("{DELIVERY_SELECT} WHERE d.status = $1 ORDER BY d.created_at DESC");
        let deliveries = sqlx::query_as::<_, Delivery>(&query)
            .bind(status)
            .fetch_all(&self.db)
            .await?;
        self.with_items(deliveries).await
    }

    pub async fn list_by_warehouse(&self, warehouse_id: Uuid) -> AppResult<Vec<Delivery>> {
        let query =
            format!("{DELIVERY_SELECT} WHERE d.warehouse_id = $1 ORDER BY d.created_at DESC");
        let deliveries = sqlx::query_as::<_, Delivery>(&query)
            .bind(warehouse_id)
            .fetch_all(&self.db)
            .await?;
        self.with_items(deliveries).await
    }

    pub async fn get(&self, delivery_id: Uuid) -> AppResult<Delivery> {
        let query = format!("{DELIVERY_SELECT} WHERE d.id = $1");
        let delivery = sqlx::query_as::<_, Delivery>(&query)
            .bind(delivery_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Delivery".to_string()))?;

        let mut deliveries = self.with_items(vec![delivery]).await?;
        deliveries
            .pop()
            .ok_or_else(|| AppError::NotFound("Delivery".to_string()))
    }

    /// Create a draft delivery after checking current availability
    pub async fn create(&self, user: &AuthUser, input: CreateDeliveryInput) -> AppResult<Delivery> {
        input.validate()?;
        shared::validate_document_items(&input.items)
            .map_err(|msg| AppError::validation("items", msg))?;

        let mut tx = self.db.begin().await?;
        ensure_warehouse(&mut tx, input.warehouse_id).await?;
        let items = snapshot_items(&mut tx, &input.items).await?;

        // Advisory only: stock is checked again under lock on validation
        for (product_id, requested) in requested_per_product(&items) {
            let available = sqlx::query_scalar::<_, i32>(
                "SELECT quantity FROM stock WHERE product_id = $1 AND warehouse_id = $2",
            )
            .bind(product_id)
            .bind(input.warehouse_id)
            .fetch_optional(&mut *tx)
            .await?
            .unwrap_or(0);

            if requested > i64::from(available) {
                return Err(AppError::InsufficientStock(format!(
                    "Product {} has {} available, {} requested",
                    product_id, available, requested
                )));
            }
        }

        let (delivery_id, number) = insert_draft(
            &mut tx,
            DELIVERIES,
            DraftHeader {
                party: input.customer.trim(),
                warehouse_id: input.warehouse_id,
                date: input.delivery_date,
                notes: input.notes.as_deref(),
                created_by: &user.email,
            },
        )
        .await?;

        insert_items(&mut tx, DELIVERY_ITEMS, delivery_id, &items).await?;
        tx.commit().await?;

        tracing::info!(delivery_id = %delivery_id, number = %number, items = items.len(), "Delivery created");
        self.get(delivery_id).await
    }

    /// Apply every item to stock and mark the delivery validated
    pub async fn validate(&self, user: &AuthUser, delivery_id: Uuid) -> AppResult<Delivery> {
        let mut tx = self.db.begin().await?;

        let (number, warehouse_id, status) = sqlx::query_as::<_, (String, Uuid, DocumentStatus)>(
            "SELECT delivery_number, warehouse_id, status FROM deliveries WHERE id = $1 FOR UPDATE",
        )
        .bind(delivery_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Delivery".to_string()))?;

        if status != DocumentStatus::Draft {
            return Err(AppError::InvalidStateTransition(format!(
                "Delivery {} is already validated",
                number
            )));
        }

        let items = load_items_tx(&mut tx, DELIVERY_ITEMS, delivery_id).await?;
        let mut rows = lock_document_pairs(&mut tx, warehouse_id, &items).await?;
        let notes = format!("Delivery {}", number);

        for item in &items {
            let row = rows
                .get_mut(&item.product_id)
                .ok_or_else(|| AppError::Internal("Stock row not locked".to_string()))?;
            let change = stock::issue(row.quantity, item.quantity)?;
            record_change(
                &mut tx,
                row,
                change,
                Movement {
                    change_type: ChangeType::Delivery,
                    reference_id: Some(delivery_id),
                    notes: Some(&notes),
                },
                user,
            )
            .await?;
        }

        sqlx::query(
            r#"
            UPDATE deliveries
            SET status = $2, validated_at = NOW(), validated_by = $3
            WHERE id = $1
            "#,
        )
        .bind(delivery_id)
        .bind(DocumentStatus::Validated)
        .bind(&user.email)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(delivery_id = %delivery_id, number = %number, user = %user.email, "Delivery validated");
        self.get(delivery_id).await
    }

    /// Delete a draft delivery
    pub async fn delete(&self, delivery_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let status = sqlx::query_scalar::<_, DocumentStatus>(
            "SELECT status FROM deliveries WHERE id = $1 FOR UPDATE",
        )
        .bind(delivery_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Delivery".to_string()))?;

        if status == DocumentStatus::Validated {
            return Err(AppError::conflict("delivery", "Validated deliveries cannot be deleted"));
        }

        sqlx::query("DELETE FROM deliveries WHERE id = $1")
            .bind(delivery_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(delivery_id = %delivery_id, "Delivery deleted");
        Ok(())
    }

    async fn with_items(&self, mut deliveries: Vec<Delivery>) -> AppResult<Vec<Delivery>> {
        let ids: Vec<Uuid> = deliveries.iter().map(|d| d.id).collect();
        let mut items = load_items(&self.db, DELIVERY_ITEMS, &ids).await?;
        for delivery in &mut deliveries {
            delivery.items = items.remove(&delivery.id).unwrap_or_default();
        }
        Ok(deliveries)
    }
}
