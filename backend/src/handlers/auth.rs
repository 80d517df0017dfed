//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::services::auth::{decode_access_token, AuthResponse, LoginInput, RegisterInput};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Register endpoint handler. A bearer token is optional; an admin's token
/// allows assigning an elevated role.
pub async fn register(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Json(body): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let registrar = match bearer {
        Some(TypedHeader(Authorization(bearer))) => {
            Some(decode_access_token(bearer.token(), &state.config.jwt.secret)?.role)
        }
        None => None,
    };

    let auth_service = AuthService::new(state.db, &state.config);
    let response = auth_service.register(body, registrar).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> AppResult<Json<AuthResponse>> {
    let auth_service = AuthService::new(state.db, &state.config);
    Ok(Json(auth_service.login(body).await?))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let auth_service = AuthService::new(state.db, &state.config);
    Ok(Json(auth_service.refresh(&body.refresh_token).await?))
}

/// Current user profile
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    let auth_service = AuthService::new(state.db, &state.config);
    Ok(Json(auth_service.get_user(current_user.0.user_id).await?))
}
