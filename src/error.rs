use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extractors::MalformedResponse;
use crate::storage::RepositoryError;

/// Errors surfaced by services and mapped onto HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    /// Client-side validation failed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing, malformed or expired bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Password did not match the stored hash
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User or recipe is absent, or not owned by the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// A user with this email is already registered
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A cloud API call failed or answered in an unexpected shape
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Model output could not be turned into recipes
    #[error("Parse error: {0}")]
    Parse(String),

    /// Anything else that went wrong on our side
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Upstream(_) | Self::Parse(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(msg) => AppError::AlreadyExists(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<MalformedResponse> for AppError {
    fn from(err: MalformedResponse) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::InvalidInput(err.body_text())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}

/// Full text of a server-side failure, attached to the response for the request logger
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Don't expose upstream or internal details to clients
        let message = match &self {
            Self::Upstream(_) => "External service error".to_string(),
            Self::Parse(_) => "Failed to interpret model response".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
            Self::InvalidInput(msg)
            | Self::Unauthorized(msg)
            | Self::NotFound(msg)
            | Self::AlreadyExists(msg) => msg.clone(),
            Self::InvalidCredentials => self.to_string(),
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        if status.is_server_error() {
            response.extensions_mut().insert(ErrorDetail(self.to_string()));
        }
        response
    }
}
