//! Delivery HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::receipt::parse_document_status;
use crate::middleware::{require_permission, CurrentUser};
use crate::models::{Action, CreateDeliveryInput, Delivery, Resource};
use crate::services::DeliveryService;
use crate::AppState;

pub async fn list_deliveries(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Delivery>>> {
    require_permission(&current_user.0, Resource::Delivery, Action::View)?;
    Ok(Json(DeliveryService::new(state.db).list().await?))
}

pub async fn list_deliveries_by_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(status): Path<String>,
) -> AppResult<Json<Vec<Delivery>>> {
    require_permission(&current_user.0, Resource::Delivery, Action::View)?;
    let status = parse_document_status(&status)?;
    Ok(Json(
        DeliveryService::new(state.db)
            .list_by_status(status)
            .await?,
    ))
}

pub async fn list_deliveries_by_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Vec<Delivery>>> {
    require_permission(&current_user.0, Resource::Delivery, Action::View)?;
    Ok(Json(
        DeliveryService::new(state.db)
            .list_by_warehouse(warehouse_id)
            .await?,
    ))
}

pub async fn get_delivery(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(delivery_id): Path<Uuid>,
) -> AppResult<Json<Delivery>> {
    require_permission(&current_user.0, Resource::Delivery, Action::View)?;
    Ok(Json(DeliveryService::new(state.db).get(delivery_id).await?))
}

pub async fn create_delivery(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateDeliveryInput>,
) -> AppResult<(StatusCode, Json<Delivery>)> {
    require_permission(&current_user.0, Resource::Delivery, Action::Create)?;
    let delivery = DeliveryService::new(state.db)
        .create(&current_user.0, input)
        .await?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

pub async fn validate_delivery(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(delivery_id): Path<Uuid>,
) -> AppResult<Json<Delivery>> {
    require_permission(&current_user.0, Resource::Delivery, Action::Validate)?;
    Ok(Json(
        DeliveryService::new(state.db)
            .validate(&current_user.0, delivery_id)
            .await?,
    ))
}

pub async fn delete_delivery(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(delivery_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user.0, Resource::Delivery, Action::Delete)?;
    DeliveryService::new(state.db).delete(delivery_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
