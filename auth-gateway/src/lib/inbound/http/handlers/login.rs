use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenResponseData;
use crate::domain::identity::models::Credential;
use crate::domain::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::UnprocessableEntity(
            "Username and password must not be blank".to_string(),
        ));
    }

    tracing::debug!(username = %body.username, "Login request received");

    let database = body.database.filter(|db| !db.trim().is_empty());
    let credential = Credential::new(body.username, body.password, database);

    state
        .auth_service
        .authenticate(credential)
        .await
        .map_err(ApiError::from)
        .map(|ref token| ApiSuccess::new(StatusCode::OK, token.into()))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
    #[serde(default)]
    database: Option<String>,
}
