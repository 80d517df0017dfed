//! Dashboard service: loads the catalogue and stock, then aggregates in memory

use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{DashboardData, StockValueAnalysis};
use crate::services::{ProductService, StockService, WarehouseService};

#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

impl DashboardService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn summary(&self) -> AppResult<DashboardData> {
        let product_service = ProductService::new(self.db.clone());
        let warehouse_service = WarehouseService::new(self.db.clone());
        let stock_service = StockService::new(self.db.clone());

        let (products, warehouses, stock) = tokio::try_join!(
            product_service.list(false),
            warehouse_service.list(false),
            stock_service.list_all(),
        )?;

        let data = shared::dashboard::summarize(&products, &warehouses, &stock);
        tracing::debug!(
            products = data.kpis.total_products,
            low_stock = data.kpis.low_stock_count,
            "Dashboard computed"
        );
        Ok(data)
    }

    pub async fn stock_value(&self) -> AppResult<StockValueAnalysis> {
        let product_service = ProductService::new(self.db.clone());
        let stock_service = StockService::new(self.db.clone());

        let (products, stock) = tokio::try_join!(
            product_service.list(true),
            stock_service.list_all(),
        )?;

        Ok(shared::dashboard::stock_value(&products, &stock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires a running Postgres (DATABASE_URL)
    async fn test_summary_counts_catalogue_and_stock(pool: PgPool) {
        let bolts = fixtures::product(&pool, "BLT-1").await;
        let nuts = fixtures::product(&pool, "NUT-1").await;
        let main = fixtures::warehouse(&pool, "Main").await;
        fixtures::adjust(&pool, bolts, main, 20).await;
        fixtures::adjust(&pool, nuts, main, 2).await;

        let service = DashboardService::new(pool.clone());
        let data = service.summary().await.unwrap();
        assert_eq!(data.kpis.total_products, 2);
        assert_eq!(data.kpis.total_warehouses, 1);
        assert_eq!(data.kpis.total_stock, 22);
        assert_eq!(data.kpis.low_stock_count, 1);

        let value = service.stock_value().await.unwrap();
        assert_eq!(value.total_stock_value, 22);
        assert_eq!(value.product_count, 2);
    }
}
