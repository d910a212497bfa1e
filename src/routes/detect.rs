use axum::extract::{multipart::MultipartRejection, Multipart, State};
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::model::Ingredient;

/// Name of the form field carrying the photo
const IMAGE_FIELD: &str = "image";

#[derive(Serialize)]
pub struct DetectResponse {
    pub ingredients: Vec<Ingredient>,
}

pub async fn detect(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, AppError> {
    let mut multipart = multipart?;

    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            image = Some(field.bytes().await?);
            break;
        }
    }

    let image = image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::InvalidInput("image file is required".to_string()))?;

    state.logger.scoped("ingredient_recognition::http").debug(format_args!(
        "User {} uploaded {} byte image",
        user.id,
        image.len()
    ));

    let ingredients = state.detector.detect_ingredients(&image).await?;
    Ok(Json(DetectResponse { ingredients }))
}
