use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::identity::errors::AuthError;
use crate::domain::identity::models::AuthToken;

pub mod health;
pub mod login;
pub mod refresh;
pub mod validate;
pub mod verify;

pub const TOKEN_TYPE: &str = "Bearer";

/// Successful response: status plus a plain JSON body.
#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

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
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    UnprocessableEntity(String),
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed(_) => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::InvalidToken(_) => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// Body of a login or refresh response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponseData {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub username: String,
    pub roles: Vec<String>,
    pub company_id: String,
    pub company_name: String,
}

impl From<&AuthToken> for TokenResponseData {
    fn from(token: &AuthToken) -> Self {
        Self {
            token: token.token.clone(),
            token_type: TOKEN_TYPE.to_string(),
            expires_in: token.expires_in(),
            username: token.identity.username.clone(),
            roles: token.identity.roles.iter().cloned().collect(),
            company_id: token.identity.tenant_id.clone(),
            company_name: token.identity.tenant_name.clone(),
        }
    }
}
