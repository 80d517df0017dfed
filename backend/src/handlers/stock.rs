//! Stock level HTTP handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_permission, CurrentUser};
use crate::models::{
    Action, AdjustStockInput, ProductStockTotal, Resource, Stock, UpsertStockInput,
};
use crate::services::StockService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i32>,
}

pub async fn list_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Stock>>> {
    require_permission(&current_user.0, Resource::Stock, Action::View)?;
    Ok(Json(StockService::new(state.db).list_all().await?))
}

pub async fn list_stock_by_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Vec<Stock>>> {
    require_permission(&current_user.0, Resource::Stock, Action::View)?;
    Ok(Json(
        StockService::new(state.db)
            .list_by_warehouse(warehouse_id)
            .await?,
    ))
}

pub async fn list_stock_by_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<Stock>>> {
    require_permission(&current_user.0, Resource::Stock, Action::View)?;
    Ok(Json(
        StockService::new(state.db)
            .list_by_product(product_id)
            .await?,
    ))
}

pub async fn get_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((product_id, warehouse_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Stock>> {
    require_permission(&current_user.0, Resource::Stock, Action::View)?;
    Ok(Json(
        StockService::new(state.db)
            .get(product_id, warehouse_id)
            .await?,
    ))
}

pub async fn get_product_total(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductStockTotal>> {
    require_permission(&current_user.0, Resource::Stock, Action::View)?;
    Ok(Json(
        StockService::new(state.db)
            .product_total(product_id)
            .await?,
    ))
}

pub async fn list_low_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<Vec<Stock>>> {
    require_permission(&current_user.0, Resource::Stock, Action::View)?;
    let threshold = query
        .threshold
        .unwrap_or(state.config.inventory.low_stock_threshold);
    Ok(Json(StockService::new(state.db).list_low(threshold).await?))
}

/// Create or overwrite a stock row
pub async fn upsert_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpsertStockInput>,
) -> AppResult<Json<Stock>> {
    require_permission(&current_user.0, Resource::Stock, Action::Edit)?;
    Ok(Json(
        StockService::new(state.db)
            .upsert(&current_user.0, input)
            .await?,
    ))
}

pub async fn adjust_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<Stock>> {
    require_permission(&current_user.0, Resource::Stock, Action::Adjust)?;
    Ok(Json(
        StockService::new(state.db)
            .adjust(&current_user.0, input)
            .await?,
    ))
}
