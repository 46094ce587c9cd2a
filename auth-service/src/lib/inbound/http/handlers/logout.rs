use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::JsonBody;
use crate::domain::credentials::models::RefreshHandle;
use crate::inbound::http::middleware::BearerToken;
use crate::inbound::http::router::AppState;

pub async fn logout(
    State(state): State<AppState>,
    BearerToken(access_token): BearerToken,
    JsonBody(body): JsonBody<LogoutRequestBody>,
) -> Result<StatusCode, ApiError> {
    let handle = RefreshHandle::new(body.refresh_token);

    state.auth_service.logout(&access_token, &handle).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogoutRequestBody {
    refresh_token: String,
}
