//! Internal transfer HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{require_permission, CurrentUser};
use crate::models::{Action, CreateTransferInput, InternalTransfer, Resource, TransferStatus};
use crate::services::transfer::TransferScope;
use crate::services::TransferService;
use crate::AppState;

pub async fn list_transfers(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<InternalTransfer>>> {
    require_permission(&current_user.0, Resource::Transfer, Action::View)?;
    Ok(Json(TransferService::new(state.db).list().await?))
}

pub async fn get_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transfer_id): Path<Uuid>,
) -> AppResult<Json<InternalTransfer>> {
    require_permission(&current_user.0, Resource::Transfer, Action::View)?;
    Ok(Json(TransferService::new(state.db).get(transfer_id).await?))
}

pub async fn list_transfers_by_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(status): Path<String>,
) -> AppResult<Json<Vec<InternalTransfer>>> {
    require_permission(&current_user.0, Resource::Transfer, Action::View)?;
    let status = TransferStatus::parse(&status)
        .ok_or_else(|| AppError::validation("status", format!("Unknown status '{}'", status)))?;
    Ok(Json(
        TransferService::new(state.db)
            .list_by_status(status)
            .await?,
    ))
}

pub async fn list_transfers_from_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Vec<InternalTransfer>>> {
    require_permission(&current_user.0, Resource::Transfer, Action::View)?;
    Ok(Json(
        TransferService::new(state.db)
            .list_by(TransferScope::FromWarehouse, warehouse_id)
            .await?,
    ))
}

pub async fn list_transfers_to_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Vec<InternalTransfer>>> {
    require_permission(&current_user.0, Resource::Transfer, Action::View)?;
    Ok(Json(
        TransferService::new(state.db)
            .list_by(TransferScope::ToWarehouse, warehouse_id)
            .await?,
    ))
}

pub async fn list_transfers_by_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<InternalTransfer>>> {
    require_permission(&current_user.0, Resource::Transfer, Action::View)?;
    Ok(Json(
        TransferService::new(state.db)
            .list_by(TransferScope::Product, product_id)
            .await?,
    ))
}

pub async fn create_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateTransferInput>,
) -> AppResult<(StatusCode, Json<InternalTransfer>)> {
    require_permission(&current_user.0, Resource::Transfer, Action::Create)?;
    let transfer = TransferService::new(state.db)
        .create(&current_user.0, input)
        .await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

pub async fn complete_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transfer_id): Path<Uuid>,
) -> AppResult<Json<InternalTransfer>> {
    require_permission(&current_user.0, Resource::Transfer, Action::Validate)?;
    Ok(Json(
        TransferService::new(state.db)
            .complete(&current_user.0, transfer_id)
            .await?,
    ))
}

pub async fn cancel_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transfer_id): Path<Uuid>,
) -> AppResult<Json<InternalTransfer>> {
    require_permission(&current_user.0, Resource::Transfer, Action::Validate)?;
    Ok(Json(TransferService::new(state.db).cancel(transfer_id).await?))
}

pub async fn delete_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transfer_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user.0, Resource::Transfer, Action::Delete)?;
    TransferService::new(state.db).delete(transfer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
