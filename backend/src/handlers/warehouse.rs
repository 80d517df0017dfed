//! Warehouse HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_permission, CurrentUser};
use crate::models::{Action, Resource, Warehouse, WarehouseInput};
use crate::services::WarehouseService;
use crate::AppState;

pub async fn list_warehouses(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Warehouse>>> {
    require_permission(&current_user.0, Resource::Warehouse, Action::View)?;
    Ok(Json(WarehouseService::new(state.db).list(false).await?))
}

pub async fn list_active_warehouses(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Warehouse>>> {
    require_permission(&current_user.0, Resource::Warehouse, Action::View)?;
    Ok(Json(WarehouseService::new(state.db).list(true).await?))
}

pub async fn get_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Warehouse>> {
    require_permission(&current_user.0, Resource::Warehouse, Action::View)?;
    Ok(Json(WarehouseService::new(state.db).get(warehouse_id).await?))
}

pub async fn create_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<WarehouseInput>,
) -> AppResult<(StatusCode, Json<Warehouse>)> {
    require_permission(&current_user.0, Resource::Warehouse, Action::Create)?;
    let warehouse = WarehouseService::new(state.db).create(input).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

pub async fn update_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<WarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    require_permission(&current_user.0, Resource::Warehouse, Action::Edit)?;
    Ok(Json(
        WarehouseService::new(state.db)
            .update(warehouse_id, input)
            .await?,
    ))
}

/// Soft delete
pub async fn delete_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user.0, Resource::Warehouse, Action::Delete)?;
    WarehouseService::new(state.db)
        .deactivate(warehouse_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
