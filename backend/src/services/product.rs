//! Product catalogue service

use shared::validation::normalize_sku;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Product, ProductInput};

const PRODUCT_COLUMNS: &str = "id, name, sku, category, unit, reorder_level, initial_stock, active, created_at, updated_at";

/// Product service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, active_only: bool) -> AppResult<Vec<Product>> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE ($1 = FALSE OR active = TRUE) ORDER BY name"
        );
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(active_only)
            .fetch_all(&self.db)
            .await?)
    }

    pub async fn get(&self, product_id: Uuid) -> AppResult<Product> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub async fn get_by_sku(&self, sku: &str) -> AppResult<Product> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(normalize_sku(sku))
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Case-insensitive substring match on name or SKU
    pub async fn search(&self, keyword: &str) -> AppResult<Vec<Product>> {
        let pattern = format!("%{}%", escape_like(keyword.trim()));
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name ILIKE $1 OR sku ILIKE $1 ORDER BY name"
        );
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(pattern)
            .fetch_all(&self.db)
            .await?)
    }

    pub async fn list_by_category(&self, category: &str) -> AppResult<Vec<Product>> {
        let query =
            format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE category = $1 ORDER BY name");
        Ok(sqlx::query_as::<_, Product>(&query)
            .bind(category)
            .fetch_all(&self.db)
            .await?)
    }

    pub async fn create(&self, input: ProductInput) -> AppResult<Product> {
        input.validate()?;
        let sku = normalize_sku(&input.sku);

        if self.sku_taken(&sku, None).await? {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let query = format!(
            r#"
            INSERT INTO products (name, sku, category, unit, reorder_level, initial_stock, active)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(input.name.trim())
            .bind(&sku)
            .bind(input.category.trim())
            .bind(input.unit.trim())
            .bind(input.reorder_level.unwrap_or(0))
            .bind(input.initial_stock.unwrap_or(0))
            .fetch_one(&self.db)
            .await?;

        tracing::info!(product_id = %product.id, sku = %product.sku, "Product created");
        Ok(product)
    }

    pub async fn update(&self, product_id: Uuid, input: ProductInput) -> AppResult<Product> {
        input.validate()?;
        let existing = self.get(product_id).await?;
        let sku = normalize_sku(&input.sku);

        if sku != existing.sku && self.sku_taken(&sku, Some(product_id)).await? {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let query = format!(
            r#"
            UPDATE products
            SET name = $2, sku = $3, category = $4, unit = $5, reorder_level = $6,
                initial_stock = $7, active = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(product_id)
            .bind(input.name.trim())
            .bind(&sku)
            .bind(input.category.trim())
            .bind(input.unit.trim())
            .bind(input.reorder_level.unwrap_or(existing.reorder_level))
            .bind(input.initial_stock.unwrap_or(existing.initial_stock))
            .bind(input.active.unwrap_or(true))
            .fetch_one(&self.db)
            .await?;

        Ok(product)
    }

    /// Soft delete: the product stays referenced by stock and history
    pub async fn deactivate(&self, product_id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE products SET active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(product_id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }
        tracing::info!(product_id = %product_id, "Product deactivated");
        Ok(())
    }

    /// Remove a product that nothing references yet
    pub async fn delete_permanently(&self, product_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        sqlx::query("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM stock WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM stock_ledger WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM receipt_items WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM delivery_items WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM internal_transfers WHERE product_id = $1)
            "#,
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        if referenced {
            return Err(AppError::conflict(
                "product",
                "Product has stock or movement history; deactivate it instead",
            ));
        }

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(product_id = %product_id, "Product permanently deleted");
        Ok(())
    }

    async fn sku_taken(&self, sku: &str, except: Option<Uuid>) -> AppResult<bool> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1 AND ($2::UUID IS NULL OR id <> $2))",
        )
        .bind(sku)
        .bind(except)
        .fetch_one(&self.db)
        .await?)
    }
}

/// Escape LIKE wildcards in user input
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
