use std::time::Duration;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::credentials::errors::AuthError;
use crate::domain::credentials::models::Principal;
use crate::domain::credentials::models::Role;
use crate::inbound::http::router::AppState;

/// Raw bearer token of the current request.
///
/// Only requires a well-formed `Authorization: Bearer` header; the token
/// itself is not validated, so logout accepts expired or revoked tokens.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_token_from_header(&parts.headers).map(|token| BearerToken(token.to_string()))
    }
}

/// Middleware that validates the bearer token and adds the principal to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(req.headers())?.to_string();

    let principal = state.auth_service.authenticate(&token).await.map_err(|e| {
        tracing::warn!("Bearer token rejected: {}", e.kind());
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Middleware that admits only principals holding `required` role.
///
/// Must run after `authenticate`.
pub async fn require_role(
    State(required): State<Role>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = req.extensions().get::<Principal>().ok_or_else(|| {
        ApiError::from(AuthError::Unauthenticated(
            "Authentication required".to_string(),
        ))
    })?;

    if principal.role != required {
        tracing::warn!(
            "User {} with role {} denied, {} required",
            principal.user_id,
            principal.role,
            required
        );
        return Err(ApiError::from(AuthError::Forbidden));
    }

    Ok(next.run(req).await)
}

/// Middleware that bounds the whole request by a deadline.
///
/// The handler future is dropped when the deadline elapses; writes it already
/// committed stand.
pub async fn enforce_deadline(
    State(deadline): State<Duration>,
    req: Request,
    next: Next,
) -> Response {
    match tokio::time::timeout(deadline, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!("Request exceeded deadline of {:?}", deadline);
            ApiError::from(AuthError::DeadlineExceeded).into_response()
        }
    }
}

fn extract_token_from_header(headers: &HeaderMap) -> Result<&str, ApiError> {
    let unauthenticated = |msg: &str| ApiError::from(AuthError::Unauthenticated(msg.to_string()));

    let auth_header = headers
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| unauthenticated("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthenticated("Invalid Authorization header"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(unauthenticated(
            "Invalid Authorization header format. Expected: Bearer <token>",
        )),
    }
}
