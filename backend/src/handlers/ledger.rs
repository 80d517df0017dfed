//! Stock ledger HTTP handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use shared::filters::LedgerFilter;
use shared::types::DateRange;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::{require_permission, CurrentUser};
use crate::models::{Action, ChangeType, LedgerVerification, Resource, StockLedgerEntry};
use crate::services::LedgerService;
use crate::AppState;

type LedgerList = AppResult<Json<Vec<StockLedgerEntry>>>;

async fn filtered(state: AppState, user: &CurrentUser, filter: LedgerFilter) -> LedgerList {
    require_permission(&user.0, Resource::Ledger, Action::View)?;
    Ok(Json(LedgerService::new(state.db).list(&filter).await?))
}

/// `GET /ledger` with optional query filters
pub async fn list_ledger(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<LedgerFilter>,
) -> LedgerList {
    filtered(state, &current_user, filter).await
}

pub async fn get_ledger_entry(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<StockLedgerEntry>> {
    require_permission(&current_user.0, Resource::Ledger, Action::View)?;
    Ok(Json(LedgerService::new(state.db).get(entry_id).await?))
}

pub async fn list_ledger_by_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> LedgerList {
    let filter = LedgerFilter {
        product_id: Some(product_id),
        ..Default::default()
    };
    filtered(state, &current_user, filter).await
}

pub async fn list_ledger_by_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
) -> LedgerList {
    let filter = LedgerFilter {
        warehouse_id: Some(warehouse_id),
        ..Default::default()
    };
    filtered(state, &current_user, filter).await
}

pub async fn list_ledger_by_change_type(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(change_type): Path<String>,
) -> LedgerList {
    let change_type = ChangeType::parse(&change_type).ok_or_else(|| {
        AppError::validation("changeType", format!("Unknown change type '{}'", change_type))
    })?;
    let filter = LedgerFilter {
        change_type: Some(change_type),
        ..Default::default()
    };
    filtered(state, &current_user, filter).await
}

pub async fn list_ledger_by_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<Uuid>,
) -> LedgerList {
    let filter = LedgerFilter {
        user_id: Some(user_id),
        ..Default::default()
    };
    filtered(state, &current_user, filter).await
}

pub async fn list_ledger_by_reference(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(reference_id): Path<Uuid>,
) -> LedgerList {
    let filter = LedgerFilter {
        reference_id: Some(reference_id),
        ..Default::default()
    };
    filtered(state, &current_user, filter).await
}

pub async fn list_ledger_in_range(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(range): Query<DateRange>,
) -> LedgerList {
    require_permission(&current_user.0, Resource::Ledger, Action::View)?;
    if !range.is_valid() {
        return Err(AppError::validation("start", "Start date must not be after end date"));
    }
    Ok(Json(
        LedgerService::new(state.db)
            .list_in_range(range.start, range.end)
            .await?,
    ))
}

/// History of one pair, oldest first
pub async fn list_ledger_for_pair(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((product_id, warehouse_id)): Path<(Uuid, Uuid)>,
) -> LedgerList {
    require_permission(&current_user.0, Resource::Ledger, Action::View)?;
    Ok(Json(
        LedgerService::new(state.db)
            .pair_history(product_id, warehouse_id)
            .await?,
    ))
}

pub async fn verify_ledger_for_pair(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((product_id, warehouse_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<LedgerVerification>> {
    require_permission(&current_user.0, Resource::Ledger, Action::View)?;
    Ok(Json(
        LedgerService::new(state.db)
            .verify_pair(product_id, warehouse_id)
            .await?,
    ))
}
