//! Internal transfer service
//!
//! A transfer is created as a draft and moves stock only when completed.
//! Completion locks both stock rows in warehouse id order so concurrent
//! transfers between the same warehouses cannot deadlock.

use shared::stock::plan_transfer;
use shared::validation::validate_transfer_route;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{ChangeType, CreateTransferInput, InternalTransfer, TransferStatus};
use crate::services::stock::{
    ensure_product, ensure_warehouse, lock_pair, record_change, Movement,
};

const TRANSFER_SELECT: &str = r#"
    SELECT t.id, t.product_id, p.name AS product_name, p.sku AS product_sku,
           t.from_warehouse_id, fw.name AS from_warehouse_name,
           t.to_warehouse_id, tw.name AS to_warehouse_name,
           t.quantity, t.status, t.notes, t.created_by, t.completed_by,
           t.created_at, t.completed_at
    FROM internal_transfers t
    JOIN products p ON p.id = t.product_id
    JOIN warehouses fw ON fw.id = t.from_warehouse_id
    JOIN warehouses tw ON tw.id = t.to_warehouse_id
"#;

/// Column a transfer list is filtered on
#[derive(Debug, Clone, Copy)]
pub enum TransferScope {
    Product,
    FromWarehouse,
    ToWarehouse,
}

impl TransferScope {
    fn column(&self) -> &'static str {
        match self {
            TransferScope::Product => "t.product_id",
            TransferScope::FromWarehouse => "t.from_warehouse_id",
            TransferScope::ToWarehouse => "t.to_warehouse_id",
        }
    }
}

/// Internal transfer service
#[derive(Clone)]
pub struct TransferService {
    db: PgPool,
}

impl TransferService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<InternalTransfer>> {
        let query = format!("{TRANSFER_SELECT} ORDER BY t.created_at DESC");
        Ok(sqlx::query_as::<_, InternalTransfer>(&query)
            .fetch_all(&self.db)
            .await?)
    }

    pub async fn list_by_status(&self, status: TransferStatus) -> AppResult<Vec<InternalTransfer>> {
        let query = format!("{TRANSFER_SELECT} WHERE t.status = $1 ORDER BY t.created_at DESC");
        Ok(sqlx::query_as::<_, InternalTransfer>(&query)
            .bind(status)
            .fetch_all(&self.db)
            .await?)
    }

    pub async fn list_by(&self, scope: TransferScope, id: Uuid) -> AppResult<Vec<InternalTransfer>> {
        let query = format!(
            "{TRANSFER_SELECT} WHERE {} = $1 ORDER BY t.created_at DESC",
            scope.column()
        );
        Ok(sqlx::query_as::<_, InternalTransfer>(&query)
            .bind(id)
            .fetch_all(&self.db)
            .await?)
    }

    pub async fn get(&self, transfer_id: Uuid) -> AppResult<InternalTransfer> {
        let query = format!("{TRANSFER_SELECT} WHERE t.id = $1");
        sqlx::query_as::<_, InternalTransfer>(&query)
            .bind(transfer_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Transfer".to_string()))
    }

    /// Create a draft transfer
    pub async fn create(
        &self,
        user: &AuthUser,
        input: CreateTransferInput,
    ) -> AppResult<InternalTransfer> {
        input.validate()?;
        validate_transfer_route(input.from_warehouse_id, input.to_warehouse_id)
            .map_err(|msg| AppError::validation("toWarehouseId", msg))?;

        let mut tx = self.db.begin().await?;
        ensure_product(&mut tx, input.product_id).await?;
        ensure_warehouse(&mut tx, input.from_warehouse_id).await?;
        ensure_warehouse(&mut tx, input.to_warehouse_id).await?;

        let transfer_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO internal_transfers (product_id, from_warehouse_id, to_warehouse_id, quantity, status, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.product_id)
        .bind(input.from_warehouse_id)
        .bind(input.to_warehouse_id)
        .bind(input.quantity)
        .bind(TransferStatus::Draft)
        .bind(&input.notes)
        .bind(&user.email)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(transfer_id = %transfer_id, quantity = input.quantity, "Transfer created");
        self.get(transfer_id).await
    }

    /// Move the stock: decrement source, increment destination, both ledgered
    pub async fn complete(&self, user: &AuthUser, transfer_id: Uuid) -> AppResult<InternalTransfer> {
        let mut tx = self.db.begin().await?;

        let (product_id, from_id, to_id, quantity, status) =
            sqlx::query_as::<_, (Uuid, Uuid, Uuid, i32, TransferStatus)>(
                r#"
                SELECT product_id, from_warehouse_id, to_warehouse_id, quantity, status
                FROM internal_transfers
                WHERE id = $1
                FOR UPDATE
                "#,
            )
            .bind(transfer_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Transfer".to_string()))?;

        if !status.can_transition_to(TransferStatus::Completed) {
            return Err(AppError::InvalidStateTransition(format!(
                "Only DRAFT transfers can be completed (transfer is {})",
                status
            )));
        }

        // Fixed lock order
        let (mut source, mut dest) = if from_id < to_id {
            let source = lock_pair(&mut tx, product_id, from_id).await?;
            let dest = lock_pair(&mut tx, product_id, to_id).await?;
            (source, dest)
        } else {
            let dest = lock_pair(&mut tx, product_id, to_id).await?;
            let source = lock_pair(&mut tx, product_id, from_id).await?;
            (source, dest)
        };

        let plan = plan_transfer(source.quantity, dest.quantity, quantity)?;
        let notes = format!("Transfer {}", transfer_id);

        record_change(
            &mut tx,
            &mut source,
            plan.outgoing,
            Movement {
                change_type: ChangeType::TransferOut,
                reference_id: Some(transfer_id),
                notes: Some(&notes),
            },
            user,
        )
        .await?;

        record_change(
            &mut tx,
            &mut dest,
            plan.incoming,
            Movement {
                change_type: ChangeType::TransferIn,
                reference_id: Some(transfer_id),
                notes: Some(&notes),
            },
            user,
        )
        .await?;

        sqlx::query(
            r#"
            UPDATE internal_transfers
            SET status = $2, completed_by = $3, completed_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(transfer_id)
        .bind(TransferStatus::Completed)
        .bind(&user.email)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            transfer_id = %transfer_id,
            product_id = %product_id,
            from = %from_id,
            to = %to_id,
            quantity,
            user = %user.email,
            "Transfer completed"
        );

        self.get(transfer_id).await
    }

    pub async fn cancel(&self, transfer_id: Uuid) -> AppResult<InternalTransfer> {
        let mut tx = self.db.begin().await?;

        let status = sqlx::query_scalar::<_, TransferStatus>(
            "SELECT status FROM internal_transfers WHERE id = $1 FOR UPDATE",
        )
        .bind(transfer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Transfer".to_string()))?;

        if !status.can_transition_to(TransferStatus::Cancelled) {
            return Err(AppError::InvalidStateTransition(format!(
                "Only DRAFT transfers can be cancelled (transfer is {})",
                status
            )));
        }

        sqlx::query("UPDATE internal_transfers SET status = $2 WHERE id = $1")
            .bind(transfer_id)
            .bind(TransferStatus::Cancelled)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(transfer_id = %transfer_id, "Transfer cancelled");
        self.get(transfer_id).await
    }

    /// Delete a draft or cancelled transfer. Completed ones are kept as history.
    pub async fn delete(&self, transfer_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let status = sqlx::query_scalar::<_, TransferStatus>(
            "SELECT status FROM internal_transfers WHERE id = $1 FOR UPDATE",
        )
        .bind(transfer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Transfer".to_string()))?;

        if status == TransferStatus::Completed {
            return Err(AppError::conflict("transfer", "Completed transfers cannot be deleted"));
        }

        sqlx::query("DELETE FROM internal_transfers WHERE id = $1")
            .bind(transfer_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(transfer_id = %transfer_id, "Transfer deleted");
        Ok(())
    }
}
