//! HTTP surface.
//!
//! ```text
//! GET    /health                      - Liveness check
//! POST   /auth/register               - Create an account
//! POST   /auth/login                  - Exchange credentials for a token
//!
//! # Bearer token required
//! POST   /api/v1/detect               - Ingredients in an uploaded photo
//! POST   /api/v1/recipes/recommend    - Recipe ideas for a list of ingredients
//! GET    /api/v1/recipes/saved        - The caller's saved recipes
//! POST   /api/v1/recipes/saved        - Save a recipe
//! GET    /api/v1/recipes/saved/{id}   - One saved recipe
//! DELETE /api/v1/recipes/saved/{id}   - Remove a saved recipe
//! GET    /api/v1/account              - The caller's profile
//! DELETE /api/v1/account              - Delete the caller and their recipes
//! ```

mod account;
mod auth;
mod detect;
mod recipes;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::AppError;
use crate::logging::Logger;
use crate::middleware::log_requests;
use crate::services::{AuthService, DetectorService, RecipeService};

/// Shared handles cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub detector: Arc<dyn DetectorService>,
    pub recipes: Arc<dyn RecipeService>,
    pub logger: Logger,
}

/// Build the application router.
///
/// `max_upload_bytes` caps the request body accepted by `/api/v1/detect`.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    let api = Router::new()
        .route(
            "/detect",
            post(detect::detect).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/recipes/recommend", post(recipes::recommend))
        .route("/recipes/saved", get(recipes::list).post(recipes::save))
        .route("/recipes/saved/{id}", get(recipes::get).delete(recipes::delete))
        .route("/account", get(account::show).delete(account::delete));

    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .nest("/api/v1", api)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}
