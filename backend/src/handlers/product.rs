//! Product catalogue HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_permission, CurrentUser};
use crate::models::{Action, Product, ProductInput, Resource};
use crate::services::ProductService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn list_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    require_permission(&current_user.0, Resource::Product, Action::View)?;
    Ok(Json(ProductService::new(state.db).list(false).await?))
}

pub async fn list_active_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    require_permission(&current_user.0, Resource::Product, Action::View)?;
    Ok(Json(ProductService::new(state.db).list(true).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    require_permission(&current_user.0, Resource::Product, Action::View)?;
    Ok(Json(ProductService::new(state.db).get(product_id).await?))
}

pub async fn get_product_by_sku(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sku): Path<String>,
) -> AppResult<Json<Product>> {
    require_permission(&current_user.0, Resource::Product, Action::View)?;
    Ok(Json(ProductService::new(state.db).get_by_sku(&sku).await?))
}

pub async fn search_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Product>>> {
    require_permission(&current_user.0, Resource::Product, Action::View)?;
    Ok(Json(ProductService::new(state.db).search(&query.q).await?))
}

pub async fn list_products_by_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<Product>>> {
    require_permission(&current_user.0, Resource::Product, Action::View)?;
    Ok(Json(
        ProductService::new(state.db)
            .list_by_category(&category)
            .await?,
    ))
}

pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    require_permission(&current_user.0, Resource::Product, Action::Create)?;
    let product = ProductService::new(state.db).create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    require_permission(&current_user.0, Resource::Product, Action::Edit)?;
    Ok(Json(
        ProductService::new(state.db)
            .update(product_id, input)
            .await?,
    ))
}

/// Soft delete
pub async fn delete_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user.0, Resource::Product, Action::Delete)?;
    ProductService::new(state.db).deactivate(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_product_permanently(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_permission(&current_user.0, Resource::Product, Action::Purge)?;
    ProductService::new(state.db)
        .delete_permanently(product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
