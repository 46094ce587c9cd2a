use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::UserData;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequestBody>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .auth_service
        .register(&body.email, &body.username, &body.password)
        .await
        .map_err(ApiError::from)
        .map(|ref user| {
            ApiSuccess::with_message(StatusCode::CREATED, "User registered", user.into())
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequestBody {
    email: String,
    username: String,
    password: String,
}
