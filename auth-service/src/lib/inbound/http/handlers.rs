use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::credentials::errors::AuthError;
use crate::domain::credentials::models::TokenPair;
use crate::domain::credentials::models::User;

pub mod change_role;
pub mod health;
pub mod login;
pub mod logout;
pub mod me;
pub mod refresh;
pub mod register;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, None, data)))
    }

    pub fn with_message(status: StatusCode, message: &str, data: T) -> Self {
        ApiSuccess(
            status,
            Json(ApiResponseBody::new(status, Some(message.to_string()), data)),
        )
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status: StatusCode, message: Option<String>, data: T) -> Self {
        Self {
            status: status.as_u16(),
            message,
            data,
        }
    }
}

/// Error body: `{status, message, error}` where `error` names the error kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub message: String,
    pub error: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(&'static str, String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    InternalServerError(&'static str, String),
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_, _) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_, _) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error, message) = match self {
            ApiError::BadRequest(msg) => ("ValidationFailed", msg),
            ApiError::Unauthorized(kind, msg) => (kind, msg),
            ApiError::Forbidden(msg) => ("Forbidden", msg),
            ApiError::NotFound(msg) => ("NotFound", msg),
            ApiError::Conflict(msg) => ("ConflictEmail", msg),
            ApiError::InternalServerError(kind, msg) => {
                tracing::error!("Internal server error ({}): {}", kind, msg);
                (kind, "Internal server error".to_string())
            }
            ApiError::ServiceUnavailable(msg) => ("DeadlineExceeded", msg),
        };

        let body = ApiErrorBody {
            status: status.as_u16(),
            message,
            error,
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let kind = err.kind();
        match err {
            AuthError::ValidationFailed(_) => ApiError::BadRequest(err.to_string()),
            AuthError::BadCredentials
            | AuthError::Invalid
            | AuthError::Expired
            | AuthError::Unauthenticated(_)
            | AuthError::Revoked
            | AuthError::Token(_) => ApiError::Unauthorized(kind, err.to_string()),
            AuthError::Forbidden => ApiError::Forbidden(err.to_string()),
            AuthError::NotFound(_) => ApiError::NotFound(err.to_string()),
            AuthError::ConflictEmail(_) => ApiError::Conflict(err.to_string()),
            AuthError::Storage(_) | AuthError::Internal(_) => {
                ApiError::InternalServerError(kind, err.to_string())
            }
            AuthError::DeadlineExceeded => ApiError::ServiceUnavailable(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// JSON body extractor whose rejections use the API error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// The response body for a user; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.to_string(),
            username: user.username.to_string(),
            role: user.role.to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The response body for login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPairData {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl From<TokenPair> for TokenPairData {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token.into_inner(),
            token_type: "Bearer",
            expires_in: pair.expires_in,
        }
    }
}
