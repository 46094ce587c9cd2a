use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::UserData;
use crate::domain::credentials::errors::ValidationError;
use crate::domain::credentials::models::Principal;
use crate::domain::credentials::models::Role;
use crate::domain::credentials::models::UserId;
use crate::inbound::http::router::AppState;

pub async fn change_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
    JsonBody(body): JsonBody<ChangeRoleRequestBody>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = UserId::from_string(&user_id)
        .map_err(|e| ApiError::BadRequest(ValidationError::from(e).to_string()))?;
    let role = body
        .role
        .parse::<Role>()
        .map_err(|e| ApiError::BadRequest(ValidationError::from(e).to_string()))?;

    let user = state.auth_service.change_role(&user_id, role).await?;
    tracing::info!(
        "User {} set role of {} to {}",
        principal.user_id,
        user.id,
        user.role
    );

    Ok(ApiSuccess::new(StatusCode::OK, (&user).into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangeRoleRequestBody {
    role: String,
}
