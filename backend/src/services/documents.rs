//! Helpers shared by the receipt and delivery services

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use sqlx::{Connection, PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    document_number, DocumentItem, DocumentItemInput, DocumentStatus, DELIVERY_PREFIX,
    RECEIPT_PREFIX,
};
use crate::services::stock::{lock_pair, LockedStock};

/// Item table of a document kind
#[derive(Debug, Clone, Copy)]
pub(crate) struct ItemTable {
    pub table: &'static str,
    pub owner_column: &'static str,
}

pub(crate) const RECEIPT_ITEMS: ItemTable = ItemTable {
    table: "receipt_items",
    owner_column: "receipt_id",
};

pub(crate) const DELIVERY_ITEMS: ItemTable = ItemTable {
    table: "delivery_items",
    owner_column: "delivery_id",
};

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    owner_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Option<rust_decimal::Decimal>,
    product_name: String,
    product_sku: String,
}

impl From<ItemRow> for DocumentItem {
    fn from(row: ItemRow) -> Self {
        DocumentItem {
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            product_name: row.product_name,
            product_sku: row.product_sku,
        }
    }
}

/// Resolve item inputs against the catalogue, snapshotting name and SKU
pub(crate) async fn snapshot_items(
    conn: &mut PgConnection,
    items: &[DocumentItemInput],
) -> AppResult<Vec<DocumentItem>> {
    let mut snapshots = Vec::with_capacity(items.len());

    for item in items {
        let (name, sku, active) = sqlx::query_as::<_, (String, String, bool)>(
            "SELECT name, sku, active FROM products WHERE id = $1",
        )
        .bind(item.product_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {}", item.product_id)))?;

        if !active {
            return Err(AppError::validation(
                "items",
                format!("Product {} is inactive", sku),
            ));
        }

        snapshots.push(DocumentItem {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            product_name: name,
            product_sku: sku,
        });
    }

    Ok(snapshots)
}

pub(crate) async fn insert_items(
    conn: &mut PgConnection,
    table: ItemTable,
    owner_id: Uuid,
    items: &[DocumentItem],
) -> AppResult<()> {
    let query = format!(
        r#"
        INSERT INTO {} ({}, line_no, product_id, quantity, unit_price, product_name, product_sku)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
        table.table, table.owner_column
    );

    for (line_no, item) in items.iter().enumerate() {
        sqlx::query(&query)
            .bind(owner_id)
            .bind(line_no as i32)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(&item.product_name)
            .bind(&item.product_sku)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Items of several documents, keyed by owner and kept in line order
pub(crate) async fn load_items(
    db: &PgPool,
    table: ItemTable,
    owner_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<DocumentItem>>> {
    let query = format!(
        r#"
        SELECT {owner} AS owner_id, product_id, quantity, unit_price, product_name, product_sku
        FROM {table}
        WHERE {owner} = ANY($1)
        ORDER BY {owner}, line_no
        "#,
        owner = table.owner_column,
        table = table.table
    );

    let rows = sqlx::query_as::<_, ItemRow>(&query)
        .bind(owner_ids)
        .fetch_all(db)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<DocumentItem>> = HashMap::new();
    for row in rows {
        grouped.entry(row.owner_id).or_default().push(row.into());
    }
    Ok(grouped)
}

pub(crate) async fn load_items_tx(
    conn: &mut PgConnection,
    table: ItemTable,
    owner_id: Uuid,
) -> AppResult<Vec<DocumentItem>> {
    let query = format!(
        r#"
        SELECT {owner} AS owner_id, product_id, quantity, unit_price, product_name, product_sku
        FROM {table}
        WHERE {owner} = $1
        ORDER BY line_no
        "#,
        owner = table.owner_column,
        table = table.table
    );

    let rows = sqlx::query_as::<_, ItemRow>(&query)
        .bind(owner_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.into_iter().map(DocumentItem::from).collect())
}

/// Header table of a document kind
#[derive(Debug, Clone, Copy)]
pub(crate) struct DocumentTable {
    pub table: &'static str,
    pub number_column: &'static str,
    pub party_column: &'static str,
    pub date_column: &'static str,
    pub prefix: &'static str,
    /// Unique constraint on `number_column`
    pub number_key: &'static str,
}

pub(crate) const RECEIPTS: DocumentTable = DocumentTable {
    table: "receipts",
    number_column: "receipt_number",
    party_column: "supplier",
    date_column: "receipt_date",
    prefix: RECEIPT_PREFIX,
    number_key: "receipts_receipt_number_key",
};

pub(crate) const DELIVERIES: DocumentTable = DocumentTable {
    table: "deliveries",
    number_column: "delivery_number",
    party_column: "customer",
    date_column: "delivery_date",
    prefix: DELIVERY_PREFIX,
    number_key: "deliveries_delivery_number_key",
};

/// Attempts at inserting a header before a number collision is reported
const NUMBER_ATTEMPTS: usize = 5;

/// Header fields of a new draft document
#[derive(Debug, Clone, Copy)]
pub(crate) struct DraftHeader<'a> {
    pub party: &'a str,
    pub warehouse_id: Uuid,
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<&'a str>,
    pub created_by: &'a str,
}

/// First free `PREFIX-yyyyMMddHHmmss[-N]` number for a document table
pub(crate) async fn next_number(
    conn: &mut PgConnection,
    table: DocumentTable,
) -> AppResult<String> {
    let now = Utc::now();
    let query = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1)",
        table.table, table.number_column
    );

    for attempt in 0..1000 {
        let candidate = document_number(table.prefix, now, attempt);
        let taken = sqlx::query_scalar::<_, bool>(&query)
            .bind(&candidate)
            .fetch_one(&mut *conn)
            .await?;
        if !taken {
            return Ok(candidate);
        }
    }

    Err(AppError::Internal(format!("No free {} number", table.prefix)))
}

fn is_number_collision(err: &sqlx::Error, table: DocumentTable) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(table.number_key)
        }
        _ => false,
    }
}

/// Insert a draft header under a fresh number. Each attempt runs in a
/// savepoint so a number taken by a concurrent create is retried with the
/// next free one.
pub(crate) async fn insert_draft(
    conn: &mut PgConnection,
    table: DocumentTable,
    header: DraftHeader<'_>,
) -> AppResult<(Uuid, String)> {
    let query = format!(
        r#"
        INSERT INTO {} ({}, {}, warehouse_id, {}, status, notes, created_by)
        VALUES ($1, $2, $3, COALESCE($4, NOW()), $5, $6, $7)
        RETURNING id
        "#,
        table.table, table.number_column, table.party_column, table.date_column
    );

    let mut attempt = 1;
    loop {
        let number = next_number(conn, table).await?;
        let mut savepoint = Connection::begin(&mut *conn).await?;

        let inserted = sqlx::query_scalar::<_, Uuid>(&query)
            .bind(&number)
            .bind(header.party)
            .bind(header.warehouse_id)
            .bind(header.date)
            .bind(DocumentStatus::Draft)
            .bind(header.notes)
            .bind(header.created_by)
            .fetch_one(&mut *savepoint)
            .await;

        match inserted {
            Ok(id) => {
                savepoint.commit().await?;
                return Ok((id, number));
            }
            Err(err) if attempt < NUMBER_ATTEMPTS && is_number_collision(&err, table) => {
                savepoint.rollback().await?;
                tracing::debug!(number = %number, attempt, "Document number taken, retrying");
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Lock the stock rows of every product in a document, in product id order
pub(crate) async fn lock_document_pairs(
    conn: &mut PgConnection,
    warehouse_id: Uuid,
    items: &[DocumentItem],
) -> AppResult<HashMap<Uuid, LockedStock>> {
    let products: BTreeSet<Uuid> = items.iter().map(|i| i.product_id).collect();
    let mut rows = HashMap::with_capacity(products.len());

    for product_id in products {
        let row = lock_pair(conn, product_id, warehouse_id).await?;
        rows.insert(product_id, row);
    }

    Ok(rows)
}

/// Requested units per product, summed over all lines
pub(crate) fn requested_per_product(items: &[DocumentItem]) -> HashMap<Uuid, i64> {
    let mut totals = HashMap::new();
    for item in items {
        *totals.entry(item.product_id).or_insert(0i64) += i64::from(item.quantity);
    }
    totals
}
