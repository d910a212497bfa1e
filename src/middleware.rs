//! Bearer-token authentication and request logging.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

use crate::error::{AppError, ErrorDetail};
use crate::model::User;
use crate::routes::AppState;

/// Extractor that requires a valid `Authorization: Bearer <token>` header.
///
/// Resolves the token to the (sanitized) user it was issued for. Any failure
/// rejects the request with 401.
///
/// ```rust,ignore
/// async fn handler(AuthUser(user): AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("authorization header required".to_string()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("invalid authorization header".to_string()))?;

        let token = bearer_token(header)
            .ok_or_else(|| AppError::Unauthorized("bearer token required".to_string()))?;

        let user = state.auth.user_from_token(token).await?;
        Ok(AuthUser(user))
    }
}

/// The token part of a `Bearer <token>` header value
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Correlates the log lines of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

/// Log every request on arrival and completion, tagged with a fresh request id.
///
/// Client errors are logged at warn, server errors at error together with the
/// detail that was hidden from the client.
pub async fn log_requests(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4();
    request.extensions_mut().insert(RequestId(request_id));

    let logger = state.logger.scoped("ingredient_recognition::http");
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    logger.info(format_args!(
        "[{}] Incoming request {} {}",
        request_id, method, path
    ));

    let response = next.run(request).await;

    let status = response.status();
    let elapsed = started.elapsed().as_millis();

    if let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>() {
        logger.error(format_args!(
            "[{}] {} {} -> {} in {}ms: {}",
            request_id, method, path, status, elapsed, detail
        ));
    } else if status.is_server_error() {
        logger.error(format_args!(
            "[{}] {} {} -> {} in {}ms",
            request_id, method, path, status, elapsed
        ));
    } else if status.is_client_error() {
        logger.warn(format_args!(
            "[{}] {} {} -> {} in {}ms",
            request_id, method, path, status, elapsed
        ));
    } else {
        logger.info(format_args!(
            "[{}] {} {} -> {} in {}ms",
            request_id, method, path, status, elapsed
        ));
    }

    response
}
