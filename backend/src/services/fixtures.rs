//! Database fixtures for service tests
//!
//! Tests using these run against the database named by `DATABASE_URL`
//! (`cargo test -- --ignored`).

use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::models::{AdjustStockInput, ChangeType, ProductInput, UserRole, WarehouseInput};
use crate::services::{ProductService, StockService, WarehouseService};

pub(crate) fn operator() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        email: "ops@depot.io".to_string(),
        role: UserRole::Admin,
        permissions: UserRole::Admin.permissions(),
    }
}

pub(crate) async fn product(db: &PgPool, sku: &str) -> Uuid {
    ProductService::new(db.clone())
        .create(ProductInput {
            name: format!("Part {}", sku),
            sku: sku.to_string(),
            category: "Hardware".to_string(),
            unit: "pcs".to_string(),
            reorder_level: Some(5),
            initial_stock: None,
            active: None,
        })
        .await
        .unwrap()
        .id
}

pub(crate) async fn warehouse(db: &PgPool, name: &str) -> Uuid {
    WarehouseService::new(db.clone())
        .create(WarehouseInput {
            name: name.to_string(),
            location: "Dock 1".to_string(),
            description: None,
            active: None,
        })
        .await
        .unwrap()
        .id
}

/// Change a pair by `delta` units through a manual adjustment
pub(crate) async fn adjust(db: &PgPool, product_id: Uuid, warehouse_id: Uuid, delta: i32) {
    StockService::new(db.clone())
        .adjust(
            &operator(),
            AdjustStockInput {
                product_id,
                warehouse_id,
                adjustment: delta,
                reason: Some("Cycle count".to_string()),
            },
        )
        .await
        .unwrap();
}

pub(crate) async fn quantity(db: &PgPool, product_id: Uuid, warehouse_id: Uuid) -> Option<i32> {
    sqlx::query_scalar::<_, i32>(
        "SELECT quantity FROM stock WHERE product_id = $1 AND warehouse_id = $2",
    )
    .bind(product_id)
    .bind(warehouse_id)
    .fetch_optional(db)
    .await
    .unwrap()
}

/// `(change_type, before, change, after)` of a pair's ledger rows in write order
pub(crate) async fn ledger_rows(
    db: &PgPool,
    product_id: Uuid,
    warehouse_id: Uuid,
) -> Vec<(ChangeType, i32, i32, i32)> {
    sqlx::query_as::<_, (ChangeType, i32, i32, i32)>(
        r#"
        SELECT change_type, quantity_before, quantity_change, quantity_after
        FROM stock_ledger
        WHERE product_id = $1 AND warehouse_id = $2
        ORDER BY seq
        "#,
    )
    .bind(product_id)
    .bind(warehouse_id)
    .fetch_all(db)
    .await
    .unwrap()
}
