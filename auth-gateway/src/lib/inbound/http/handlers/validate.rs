use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::identity::models::ValidationResult;
use crate::domain::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn validate(
    State(state): State<AppState>,
    Json(body): Json<TokenRequestBody>,
) -> Result<ApiSuccess<ValidateResponseData>, ApiError> {
    let token = body.non_blank_token()?;

    tracing::debug!("Token validation request received");

    state
        .auth_service
        .validate(token)
        .await
        .map_err(ApiError::from)
        .map(|ref result| ApiSuccess::new(StatusCode::OK, result.into()))
}

/// Body shared by the validate and refresh endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenRequestBody {
    token: String,
}

impl TokenRequestBody {
    pub fn non_blank_token(&self) -> Result<&str, ApiError> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err(ApiError::UnprocessableEntity(
                "Token must not be blank".to_string(),
            ));
        }
        Ok(token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponseData {
    pub valid: bool,
    pub username: String,
    pub roles: Vec<String>,
    pub company_id: String,
    pub company_name: String,
    pub expires_at: i64,
    pub nearing_expiry: bool,
}

impl From<&ValidationResult> for ValidateResponseData {
    fn from(result: &ValidationResult) -> Self {
        Self {
            valid: result.valid,
            username: result.identity.username.clone(),
            roles: result.identity.roles.iter().cloned().collect(),
            company_id: result.identity.tenant_id.clone(),
            company_name: result.identity.tenant_name.clone(),
            expires_at: result.expires_at,
            nearing_expiry: result.nearing_expiry,
        }
    }
}
