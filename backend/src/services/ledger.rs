//! Stock ledger queries and chain verification
//!
//! Rows are written only by the stock movement helpers; this service reads.

use chrono::{DateTime, Utc};
use shared::filters::LedgerFilter;
use shared::stock::{closing_quantity, verify_chain};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{LedgerVerification, StockLedgerEntry};

const LEDGER_SELECT: &str = r#"
    SELECT l.id, l.product_id, p.name AS product_name, p.sku AS product_sku,
           l.warehouse_id, w.name AS warehouse_name, l.change_type, l.quantity_before,
           l.quantity_change, l.quantity_after, l.reference_id, l.reference_type,
           l.user_id, l.user_email, l.notes, l.created_at
    FROM stock_ledger l
    JOIN products p ON p.id = l.product_id
    JOIN warehouses w ON w.id = l.warehouse_id
"#;

/// Ledger service
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

impl LedgerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Entries matching every set field of the filter, newest first
    pub async fn list(&self, filter: &LedgerFilter) -> AppResult<Vec<StockLedgerEntry>> {
        if !filter.has_valid_range() {
            return Err(AppError::validation("from", "Start date must not be after end date"));
        }

        let mut query = QueryBuilder::<Postgres>::new(LEDGER_SELECT);
        query.push(" WHERE TRUE");

        if let Some(product_id) = filter.product_id {
            query.push(" AND l.product_id = ").push_bind(product_id);
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query.push(" AND l.warehouse_id = ").push_bind(warehouse_id);
        }
        if let Some(change_type) = filter.change_type {
            query.push(" AND l.change_type = ").push_bind(change_type);
        }
        if let Some(user_id) = filter.user_id {
            query.push(" AND l.user_id = ").push_bind(user_id);
        }
        if let Some(reference_id) = filter.reference_id {
            query.push(" AND l.reference_id = ").push_bind(reference_id);
        }
        if let Some(from) = filter.from {
            query.push(" AND l.created_at >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND l.created_at <= ").push_bind(to);
        }
        query.push(" ORDER BY l.created_at DESC, l.seq DESC");

        Ok(query
            .build_query_as::<StockLedgerEntry>()
            .fetch_all(&self.db)
            .await?)
    }

    pub async fn get(&self, entry_id: Uuid) -> AppResult<StockLedgerEntry> {
        let query = format!("{LEDGER_SELECT} WHERE l.id = $1");
        sqlx::query_as::<_, StockLedgerEntry>(&query)
            .bind(entry_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Ledger entry".to_string()))
    }

    pub async fn list_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<StockLedgerEntry>> {
        self.list(&LedgerFilter {
            from: Some(start),
            to: Some(end),
            ..Default::default()
        })
        .await
    }

    /// Entries of one pair in the order they were written
    pub async fn pair_history(
        &self,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<Vec<StockLedgerEntry>> {
        let query = format!(
            "{LEDGER_SELECT} WHERE l.product_id = $1 AND l.warehouse_id = $2 ORDER BY l.seq"
        );
        Ok(sqlx::query_as::<_, StockLedgerEntry>(&query)
            .bind(product_id)
            .bind(warehouse_id)
            .fetch_all(&self.db)
            .await?)
    }

    /// Check a pair's ledger chain and compare its end with the live stock row
    pub async fn verify_pair(
        &self,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> AppResult<LedgerVerification> {
        let entries = self.pair_history(product_id, warehouse_id).await?;

        let stock_quantity = sqlx::query_scalar::<_, i32>(
            "SELECT quantity FROM stock WHERE product_id = $1 AND warehouse_id = $2",
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?;

        let closing = closing_quantity(&entries);
        let problem = match verify_chain(&entries) {
            Err(brk) => Some(brk.to_string()),
            Ok(()) if closing.unwrap_or(0) != stock_quantity.unwrap_or(0) => Some(format!(
                "ledger ends at {} but stock holds {}",
                closing.unwrap_or(0),
                stock_quantity.unwrap_or(0)
            )),
            Ok(()) => None,
        };

        if let Some(problem) = &problem {
            tracing::warn!(
                product_id = %product_id,
                warehouse_id = %warehouse_id,
                problem = %problem,
                "Ledger inconsistency"
            );
        }

        Ok(LedgerVerification {
            product_id,
            warehouse_id,
            entry_count: entries.len(),
            opening_quantity: entries.first().map(|e| e.quantity_before),
            closing_quantity: closing,
            stock_quantity,
            consistent: problem.is_none(),
            problem,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ChangeType, CreateDeliveryInput, CreateReceiptInput, CreateTransferInput,
        DocumentItemInput, UpsertStockInput,
    };
    use crate::services::fixtures::{self, operator};
    use crate::services::{DeliveryService, ReceiptService, StockService, TransferService};

    fn items(product_id: Uuid, quantity: i32) -> Vec<DocumentItemInput> {
        vec![DocumentItemInput {
            product_id,
            quantity,
            unit_price: None,
        }]
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires a running Postgres (DATABASE_URL)
    async fn test_chain_stays_consistent_across_operations(pool: PgPool) {
        let bolts = fixtures::product(&pool, "BLT-1").await;
        let main = fixtures::warehouse(&pool, "Main").await;
        let annex = fixtures::warehouse(&pool, "Annex").await;
        let user = operator();

        let receipts = ReceiptService::new(pool.clone());
        let receipt = receipts
            .create(
                &user,
                CreateReceiptInput {
                    supplier: "Northwind Supply".to_string(),
                    warehouse_id: main,
                    receipt_date: None,
                    items: items(bolts, 10),
                    notes: None,
                },
            )
            .await
            .unwrap();
        receipts.validate(&user, receipt.id).await.unwrap();

        fixtures::adjust(&pool, bolts, main, -3).await;

        let deliveries = DeliveryService::new(pool.clone());
        let delivery = deliveries
            .create(
                &user,
                CreateDeliveryInput {
                    customer: "Acme Builders".to_string(),
                    warehouse_id: main,
                    delivery_date: None,
                    items: items(bolts, 2),
                    notes: None,
                },
            )
            .await
            .unwrap();
        deliveries.validate(&user, delivery.id).await.unwrap();

        let transfers = TransferService::new(pool.clone());
        let transfer = transfers
            .create(
                &user,
                CreateTransferInput {
                    product_id: bolts,
                    from_warehouse_id: main,
                    to_warehouse_id: annex,
                    quantity: 4,
                    notes: None,
                },
            )
            .await
            .unwrap();
        transfers.complete(&user, transfer.id).await.unwrap();

        StockService::new(pool.clone())
            .upsert(
                &user,
                UpsertStockInput {
                    product_id: bolts,
                    warehouse_id: main,
                    quantity: 6,
                    location_rack: None,
                },
            )
            .await
            .unwrap();

        let service = LedgerService::new(pool.clone());
        let main_check = service.verify_pair(bolts, main).await.unwrap();
        assert!(main_check.consistent, "{:?}", main_check.problem);
        assert_eq!(main_check.entry_count, 5);
        assert_eq!(main_check.opening_quantity, Some(0));
        assert_eq!(main_check.closing_quantity, Some(6));
        assert_eq!(main_check.stock_quantity, Some(6));

        let annex_check = service.verify_pair(bolts, annex).await.unwrap();
        assert!(annex_check.consistent);
        assert_eq!(annex_check.closing_quantity, Some(4));

        let history: Vec<ChangeType> = service
            .pair_history(bolts, main)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.change_type)
            .collect();
        assert_eq!(
            history,
            vec![
                ChangeType::Receipt,
                ChangeType::Adjustment,
                ChangeType::Delivery,
                ChangeType::TransferOut,
                ChangeType::Adjustment,
            ]
        );

        let by_reference = service
            .list(&LedgerFilter {
                reference_id: Some(transfer.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_reference.len(), 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires a running Postgres (DATABASE_URL)
    async fn test_ledger_rows_are_immutable(pool: PgPool) {
        let bolts = fixtures::product(&pool, "BLT-1").await;
        let main = fixtures::warehouse(&pool, "Main").await;
        fixtures::adjust(&pool, bolts, main, 5).await;

        let update = sqlx::query("UPDATE stock_ledger SET quantity_change = 50")
            .execute(&pool)
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM stock_ledger").execute(&pool).await;
        assert!(delete.is_err());

        assert_eq!(fixtures::ledger_rows(&pool, bolts, main).await.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires a running Postgres (DATABASE_URL)
    async fn test_stock_edited_outside_ledger_is_reported(pool: PgPool) {
        let bolts = fixtures::product(&pool, "BLT-1").await;
        let main = fixtures::warehouse(&pool, "Main").await;
        fixtures::adjust(&pool, bolts, main, 5).await;

        sqlx::query("UPDATE stock SET quantity = 9 WHERE product_id = $1")
            .bind(bolts)
            .execute(&pool)
            .await
            .unwrap();

        let check = LedgerService::new(pool.clone())
            .verify_pair(bolts, main)
            .await
            .unwrap();
        assert!(!check.consistent);
        assert_eq!(check.stock_quantity, Some(9));
    }
}
