use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

use super::AppState;
use crate::error::AppError;
use crate::model::{AuthResponse, LoginRequest, RegisterRequest};

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let Json(request) = payload?;
    let response = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.auth.login(request).await?))
}
