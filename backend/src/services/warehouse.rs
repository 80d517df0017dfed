//! Warehouse service

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Warehouse, WarehouseInput};

const WAREHOUSE_COLUMNS: &str = "id, name, location, description, active, created_at, updated_at";

/// Warehouse service
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

impl WarehouseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, active_only: bool) -> AppResult<Vec<Warehouse>> {
        let query = format!(
            "SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE ($1 = FALSE OR active = TRUE) ORDER BY name"
        );
        Ok(sqlx::query_as::<_, Warehouse>(&query)
            .bind(active_only)
            .fetch_all(&self.db)
            .await?)
    }

    pub async fn get(&self, warehouse_id: Uuid) -> AppResult<Warehouse> {
        let query = format!("SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE id = $1");
        sqlx::query_as::<_, Warehouse>(&query)
            .bind(warehouse_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
    }

    pub async fn create(&self, input: WarehouseInput) -> AppResult<Warehouse> {
        input.validate()?;
        let name = input.name.trim();

        if self.name_taken(name, None).await? {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let query = format!(
            r#"
            INSERT INTO warehouses (name, location, description, active)
            VALUES ($1, $2, $3, TRUE)
            RETURNING {WAREHOUSE_COLUMNS}
            "#
        );
        let warehouse = sqlx::query_as::<_, Warehouse>(&query)
            .bind(name)
            .bind(input.location.trim())
            .bind(&input.description)
            .fetch_one(&self.db)
            .await?;

        tracing::info!(warehouse_id = %warehouse.id, name = %warehouse.name, "Warehouse created");
        Ok(warehouse)
    }

    pub async fn update(&self, warehouse_id: Uuid, input: WarehouseInput) -> AppResult<Warehouse> {
        input.validate()?;
        self.get(warehouse_id).await?;
        let name = input.name.trim();

        if self.name_taken(name, Some(warehouse_id)).await? {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let query = format!(
            r#"
            UPDATE warehouses
            SET name = $2, location = $3, description = $4, active = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {WAREHOUSE_COLUMNS}
            "#
        );
        Ok(sqlx::query_as::<_, Warehouse>(&query)
            .bind(warehouse_id)
            .bind(name)
            .bind(input.location.trim())
            .bind(&input.description)
            .bind(input.active.unwrap_or(true))
            .fetch_one(&self.db)
            .await?)
    }

    /// Soft delete
    pub async fn deactivate(&self, warehouse_id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE warehouses SET active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(warehouse_id)
                .execute(&self.db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }
        tracing::info!(warehouse_id = %warehouse_id, "Warehouse deactivated");
        Ok(())
    }

    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> AppResult<bool> {
        Ok(sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM warehouses WHERE name = $1 AND ($2::UUID IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(except)
        .fetch_one(&self.db)
        .await?)
    }
}
