//! Stock levels and the transactional movement protocol
//!
//! Every quantity change goes through [`lock_pair`] and [`record_change`]
//! inside a caller-owned transaction: the stock row is locked with
//! `FOR UPDATE`, the new quantity is computed by `shared::stock`, and the row
//! update and its ledger entry are written together.

use shared::stock::{self, QuantityChange};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{AdjustStockInput, ChangeType, ProductStockTotal, Stock, UpsertStockInput};

pub(crate) const STOCK_SELECT: &str = r#"
    SELECT s.id, s.product_id, p.name AS product_name, p.sku AS product_sku,
           s.warehouse_id, w.name AS warehouse_name, s.quantity, s.location_rack,
           s.last_updated
    FROM stock s
    JOIN products p ON p.id = s.product_id
    JOIN warehouses w ON w.id = s.warehouse_id
"#;

/// A locked stock row
#[derive(Debug, Clone, Copy)]
pub(crate) struct LockedStock {
    pub id: Uuid,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: i32,
}

/// What caused a quantity change, recorded on its ledger row
#[derive(Debug, Clone, Copy)]
pub(crate) struct Movement<'a> {
    pub change_type: ChangeType,
    pub reference_id: Option<Uuid>,
    pub notes: Option<&'a str>,
}

/// Lock the stock row of a pair, creating an empty one when missing
pub(crate) async fn lock_pair(
    conn: &mut PgConnection,
    product_id: Uuid,
    warehouse_id: Uuid,
) -> AppResult<LockedStock> {
    sqlx::query(
        r#"
        INSERT INTO stock (product_id, warehouse_id, quantity)
        VALUES ($1, $2, 0)
        ON CONFLICT (product_id, warehouse_id) DO NOTHING
        "#,
    )
    .bind(product_id)
    .bind(warehouse_id)
    .execute(&mut *conn)
    .await?;

    let (id, quantity) = sqlx::query_as::<_, (Uuid, i32)>(
        "SELECT id, quantity FROM stock WHERE product_id = $1 AND warehouse_id = $2 FOR UPDATE",
    )
    .bind(product_id)
    .bind(warehouse_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(LockedStock {
        id,
        product_id,
        warehouse_id,
        quantity,
    })
}

/// Write a computed change to a locked row and append its ledger entry
pub(crate) async fn record_change(
    conn: &mut PgConnection,
    row: &mut LockedStock,
    change: QuantityChange,
    movement: Movement<'_>,
    user: &AuthUser,
) -> AppResult<Uuid> {
    if change.before != row.quantity {
        return Err(AppError::Internal(format!(
            "Stale stock quantity for {}/{}: expected {}, locked {}",
            row.product_id, row.warehouse_id, change.before, row.quantity
        )));
    }

    sqlx::query("UPDATE stock SET quantity = $2, last_updated = NOW() WHERE id = $1")
        .bind(row.id)
        .bind(change.after)
        .execute(&mut *conn)
        .await?;

    let entry_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO stock_ledger (
            product_id, warehouse_id, change_type, quantity_before, quantity_change,
            quantity_after, reference_id, reference_type, user_id, user_email, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id
        "#,
    )
    .bind(row.product_id)
    .bind(row.warehouse_id)
    .bind(movement.change_type)
    .bind(change.before)
    .bind(change.change)
    .bind(change.after)
    .bind(movement.reference_id)
    .bind(movement.change_type.reference_type())
    .bind(user.user_id)
    .bind(&user.email)
    .bind(movement.notes)
    .fetch_one(&mut *conn)
    .await?;

    row.quantity = change.after;

    tracing::debug!(
        product_id = %row.product_id,
        warehouse_id = %row.warehouse_id,
        change_type = %movement.change_type,
        before = change.before,
        after = change.after,
        "Stock changed"
    );

    Ok(entry_id)
}

/// Ledger note for a manual adjustment without a usable reason
pub(crate) const DEFAULT_ADJUSTMENT_NOTE: &str = "Manual stock adjustment";

pub(crate) fn adjustment_note(reason: Option<&str>) -> &str {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_ADJUSTMENT_NOTE)
}

pub(crate) async fn ensure_product(conn: &mut PgConnection, product_id: Uuid) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
        .bind(product_id)
        .fetch_one(&mut *conn)
        .await?;
    if !exists {
        return Err(AppError::NotFound("Product".to_string()));
    }
    Ok(())
}

pub(crate) async fn ensure_warehouse(conn: &mut PgConnection, warehouse_id: Uuid) -> AppResult<()> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
            .bind(warehouse_id)
            .fetch_one(&mut *conn)
            .await?;
    if !exists {
        return Err(AppError::NotFound("Warehouse".to_string()));
    }
    Ok(())
}

/// Stock service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_all(&self) -> AppResult<Vec<Stock>> {
        let query = format!("{STOCK_SELECT} ORDER BY p.name, w.name");
        Ok(sqlx::query_as::<_, Stock>(&query).fetch_all(&self.db).await?)
    }

    pub async fn list_by_warehouse(&self, warehouse_id: Uuid) -> AppResult<Vec<Stock>> {
        let query = format!("{STOCK_SELECT} WHERE s.warehouse_id = $1 ORDER BY p.name");
        Ok(sqlx::query_as::<_, Stock>(&query)
            .bind(warehouse_id)
            .fetch_all(&self.db)
            .await?)
    }

    pub async fn list_by_product(&self, product_id: Uuid) -> AppResult<Vec<Stock>> {
        let query = format!("{STOCK_SELECT} WHERE s.product_id = $1 ORDER BY w.name");
        Ok(sqlx::query_as::<_, Stock>(&query)
            .bind(product_id)
            .fetch_all(&self.db)
            .await?)
    }

    pub async fn get(&self, product_id: Uuid, warehouse_id: Uuid) -> AppResult<Stock> {
        let query = format!("{STOCK_SELECT} WHERE s.product_id = $1 AND s.warehouse_id = $2");
        sqlx::query_as::<_, Stock>(&query)
            .bind(product_id)
            .bind(warehouse_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Stock".to_string()))
    }

    /// Total quantity across all warehouses (zero when the product holds no stock)
    pub async fn product_total(&self, product_id: Uuid) -> AppResult<ProductStockTotal> {
        let mut conn = self.db.acquire().await?;
        ensure_product(&mut conn, product_id).await?;

        let total_quantity = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM stock WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(ProductStockTotal {
            product_id,
            total_quantity,
        })
    }

    /// Rows whose quantity is strictly below `threshold`
    pub async fn list_low(&self, threshold: i32) -> AppResult<Vec<Stock>> {
        let query = format!("{STOCK_SELECT} WHERE s.quantity < $1 ORDER BY s.quantity, p.name");
        Ok(sqlx::query_as::<_, Stock>(&query)
            .bind(threshold)
            .fetch_all(&self.db)
            .await?)
    }

    /// Create a pair's stock row or set its quantity and rack location
    pub async fn upsert(&self, user: &AuthUser, input: UpsertStockInput) -> AppResult<Stock> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        ensure_product(&mut tx, input.product_id).await?;
        ensure_warehouse(&mut tx, input.warehouse_id).await?;

        let mut row = lock_pair(&mut tx, input.product_id, input.warehouse_id).await?;
        let stock_id = row.id;

        if let Some(change) = stock::set_quantity(row.quantity, input.quantity)? {
            let notes = format!("Stock set to {}", input.quantity);
            record_change(
                &mut tx,
                &mut row,
                change,
                Movement {
                    change_type: ChangeType::Adjustment,
                    reference_id: Some(stock_id),
                    notes: Some(&notes),
                },
                user,
            )
            .await?;
        }

        if let Some(rack) = &input.location_rack {
            sqlx::query("UPDATE stock SET location_rack = $2, last_updated = NOW() WHERE id = $1")
                .bind(stock_id)
                .bind(rack)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            product_id = %input.product_id,
            warehouse_id = %input.warehouse_id,
            quantity = input.quantity,
            "Stock row saved"
        );

        self.get(input.product_id, input.warehouse_id).await
    }

    /// Apply a relative adjustment. A pair without a stock row counts as zero.
    pub async fn adjust(&self, user: &AuthUser, input: AdjustStockInput) -> AppResult<Stock> {
        input.validate()?;

        let mut tx = self.db.begin().await?;
        ensure_product(&mut tx, input.product_id).await?;
        ensure_warehouse(&mut tx, input.warehouse_id).await?;

        let mut row = lock_pair(&mut tx, input.product_id, input.warehouse_id).await?;
        let stock_id = row.id;
        let change = stock::apply_delta(row.quantity, input.adjustment)?;

        record_change(
            &mut tx,
            &mut row,
            change,
            Movement {
                change_type: ChangeType::Adjustment,
                reference_id: Some(stock_id),
                notes: Some(adjustment_note(input.reason.as_deref())),
            },
            user,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            product_id = %input.product_id,
            warehouse_id = %input.warehouse_id,
            adjustment = input.adjustment,
            quantity = change.after,
            user = %user.email,
            "Stock adjusted"
        );

        self.get(input.product_id, input.warehouse_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{self, operator};

    #[test]
    fn test_adjustment_note_defaults() {
        assert_eq!(adjustment_note(None), DEFAULT_ADJUSTMENT_NOTE);
        assert_eq!(adjustment_note(Some("   ")), DEFAULT_ADJUSTMENT_NOTE);
        assert_eq!(adjustment_note(Some(" Cycle count ")), "Cycle count");
    }

    fn adjustment(product_id: Uuid, warehouse_id: Uuid, delta: i32) -> AdjustStockInput {
        AdjustStockInput {
            product_id,
            warehouse_id,
            adjustment: delta,
            reason: None,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires a running Postgres (DATABASE_URL)
    async fn test_each_adjustment_writes_one_ledger_row(pool: PgPool) {
        let product_id = fixtures::product(&pool, "BLT-1").await;
        let warehouse_id = fixtures::warehouse(&pool, "Main").await;
        let service = StockService::new(pool.clone());
        let user = operator();

        let stock = service
            .adjust(&user, adjustment(product_id, warehouse_id, 10))
            .await
            .unwrap();
        assert_eq!(stock.quantity, 10);

        let refused = service
            .adjust(&user, adjustment(product_id, warehouse_id, -15))
            .await;
        assert!(matches!(refused, Err(AppError::InsufficientStock(_))));
        assert_eq!(fixtures::quantity(&pool, product_id, warehouse_id).await, Some(10));

        service
            .adjust(&user, adjustment(product_id, warehouse_id, -4))
            .await
            .unwrap();

        let rows = fixtures::ledger_rows(&pool, product_id, warehouse_id).await;
        assert_eq!(
            rows,
            vec![
                (ChangeType::Adjustment, 0, 10, 10),
                (ChangeType::Adjustment, 10, -4, 6),
            ]
        );

        let notes = sqlx::query_scalar::<_, Option<String>>(
            "SELECT notes FROM stock_ledger WHERE product_id = $1 ORDER BY seq LIMIT 1",
        )
        .bind(product_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(notes.as_deref(), Some(DEFAULT_ADJUSTMENT_NOTE));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires a running Postgres (DATABASE_URL)
    async fn test_refused_adjustment_leaves_no_stock_row(pool: PgPool) {
        let product_id = fixtures::product(&pool, "NUT-1").await;
        let warehouse_id = fixtures::warehouse(&pool, "Annex").await;

        let refused = StockService::new(pool.clone())
            .adjust(&operator(), adjustment(product_id, warehouse_id, -1))
            .await;

        assert!(matches!(refused, Err(AppError::InsufficientStock(_))));
        assert_eq!(fixtures::quantity(&pool, product_id, warehouse_id).await, None);
        assert!(fixtures::ledger_rows(&pool, product_id, warehouse_id).await.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires a running Postgres (DATABASE_URL)
    async fn test_upsert_to_same_quantity_is_not_ledgered(pool: PgPool) {
        let product_id = fixtures::product(&pool, "WSH-1").await;
        let warehouse_id = fixtures::warehouse(&pool, "Main").await;
        let service = StockService::new(pool.clone());
        let input = UpsertStockInput {
            product_id,
            warehouse_id,
            quantity: 7,
            location_rack: Some("A-01".to_string()),
        };

        service.upsert(&operator(), input.clone()).await.unwrap();
        let stock = service.upsert(&operator(), input).await.unwrap();

        assert_eq!(stock.quantity, 7);
        assert_eq!(stock.location_rack.as_deref(), Some("A-01"));
        assert_eq!(fixtures::ledger_rows(&pool, product_id, warehouse_id).await.len(), 1);
    }
}
