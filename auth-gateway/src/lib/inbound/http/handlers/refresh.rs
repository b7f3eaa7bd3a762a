use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::validate::TokenRequestBody;
use super::ApiError;
use super::ApiSuccess;
use super::TokenResponseData;
use crate::domain::identity::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<TokenRequestBody>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    let token = body.non_blank_token()?;

    tracing::debug!("Token refresh request received");

    state
        .auth_service
        .refresh(token)
        .await
        .map_err(ApiError::from)
        .map(|ref token| ApiSuccess::new(StatusCode::OK, token.into()))
}
