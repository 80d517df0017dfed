//! Dashboard HTTP handlers

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::{require_permission, CurrentUser};
use crate::models::{Action, DashboardData, Resource, StockValueAnalysis};
use crate::services::DashboardService;
use crate::AppState;

pub async fn get_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardData>> {
    require_permission(&current_user.0, Resource::Dashboard, Action::View)?;
    Ok(Json(DashboardService::new(state.db).summary().await?))
}

pub async fn get_stock_value(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<StockValueAnalysis>> {
    require_permission(&current_user.0, Resource::Dashboard, Action::View)?;
    Ok(Json(DashboardService::new(state.db).stock_value().await?))
}
