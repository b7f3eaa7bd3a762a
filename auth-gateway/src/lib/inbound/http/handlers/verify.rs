use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::Response;

use crate::inbound::http::forward_auth;
use crate::inbound::http::router::AppState;

/// Forward-auth endpoint for the reverse proxy.
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Response {
    tracing::debug!("Forward-auth verification request received");

    forward_auth::verify(state.auth_service.as_ref(), headers.get(AUTHORIZATION)).await
}
