use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use super::AppState;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::model::{Recipe, RecipeRecommendation, RecommendRequest, SavedRecipe};

#[derive(Serialize)]
pub struct SavedRecipeList {
    pub recipes: Vec<SavedRecipe>,
    pub total: usize,
}

pub async fn recommend(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecipeRecommendation>, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.recipes.recommend(request.ingredients).await?))
}

pub async fn save(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<Recipe>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedRecipe>), AppError> {
    let Json(recipe) = payload?;
    let saved = state.recipes.save(&user.id, recipe).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SavedRecipeList>, AppError> {
    let recipes = state.recipes.list_saved(&user.id).await?;
    Ok(Json(SavedRecipeList {
        total: recipes.len(),
        recipes,
    }))
}

pub async fn get(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SavedRecipe>, AppError> {
    Ok(Json(state.recipes.get_saved(&id, &user.id).await?))
}

pub async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.recipes.delete_saved(&id, &user.id).await?;
    Ok(Json(json!({ "message": "recipe deleted" })))
}
