//! Receipt HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{require_permission, CurrentUser};
use crate::models::{Action, CreateReceiptInput, DocumentStatus, Receipt, Resource};
use crate::services::ReceiptService;
use crate::AppState;

pub(crate) fn parse_document_status(raw: &str) -> AppResult<DocumentStatus> {
    DocumentStatus::parse(raw)
        .ok_or_else(|| AppError::validation("status", format!("Unknown status '{}'", raw)))
}

pub async fn list_receipts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Receipt>>> {
    require_permission(&current_user.0, Resource::Receipt, Action::View)?;
    Ok(Json(ReceiptService::new(state.db).list().await?))
}

pub async fn list_receipts_by_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(status): Path<String>,
) -> AppResult<Json<Vec<Receipt>>> {
    require_permission(&current_user.0, Resource::Receipt, Action::View)?;
    let status = parse_document_status(&status)?;
    Ok(Json(
        ReceiptService::new(state.db)
            .list_by_status(status)
            .await?,
    ))
}

pub async fn list_receipts_by_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Vec<Receipt>>> {
    require_permission(&current_user.0, Resource::Receipt, Action::View)?;
    Ok(Json(
        ReceiptService::new(state.db)
            .list_by_warehouse(warehouse_id)
            .await?,
    ))
}

pub async fn get_receipt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(receipt_id): Path<Uuid>,
) -> AppResult<Json<Receipt>> {
    require_permission(&current_user.0, Resource::Receipt, Action::View)?;
    Ok(Json(ReceiptService::new(state.db).get(receipt_id).await?))
}

pub async fn create_receipt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateReceiptInput>,
) -> AppResult<(StatusCode, Json<Receipt>)> {
    require_permission(&current_user.0, Resource::Receipt, Action::Create)?;
    let receipt = ReceiptService::new(state.db)
        .create(&current_user.0, input)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn validate_receipt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(receipt_id): Path<Uuid>,
) -> AppResult<Json<Receipt>> {
    require_permission(&current_user.0, Resource::Receipt, Action::Validate)?;
    Ok(Json(
        ReceiptService::new(state.db)
            .validate(&current_user.0, receipt_id)
            .await?,
    ))
}

pub async fn delete_receipt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(receipt_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user.0, Resource::Receipt, Action::Delete)?;
    ReceiptService::new(state.db).delete(receipt_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
