use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::TokenPairData;
use crate::domain::credentials::models::RefreshHandle;
use crate::inbound::http::router::AppState;

pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RefreshRequestBody>,
) -> Result<ApiSuccess<TokenPairData>, ApiError> {
    let handle = RefreshHandle::new(body.refresh_token);

    let pair = state.auth_service.refresh(&handle).await?;

    Ok(ApiSuccess::new(StatusCode::OK, pair.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefreshRequestBody {
    refresh_token: String,
}
