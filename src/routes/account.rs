use axum::{extract::State, http::StatusCode, Json};

use super::AppState;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::model::User;

pub async fn show(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

pub async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.auth.delete_account(&user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
