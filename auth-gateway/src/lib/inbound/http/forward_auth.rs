//! Forward-auth contract for the reverse proxy.
//!
//! `200` with identity headers when the bearer token validates, otherwise a
//! bare `401`: no body, no headers, no hint why. Never refreshes.

use axum::http::header::InvalidHeaderValue;
use axum::http::HeaderMap;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::identity::models::ValidationResult;
use crate::domain::identity::ports::AuthServicePort;

pub const BEARER_PREFIX: &str = "Bearer ";

pub const X_AUTH_USER: HeaderName = HeaderName::from_static("x-auth-user");
pub const X_AUTH_ROLE: HeaderName = HeaderName::from_static("x-auth-role");
pub const X_AUTH_COMPANY: HeaderName = HeaderName::from_static("x-auth-company");

/// Token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(authorization: Option<&HeaderValue>) -> Option<&str> {
    let value = authorization?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

pub async fn verify<S>(service: &S, authorization: Option<&HeaderValue>) -> Response
where
    S: AuthServicePort + ?Sized,
{
    let Some(token) = bearer_token(authorization) else {
        tracing::warn!("Missing or malformed Authorization header");
        return unauthorized();
    };

    let result = match service.validate(token).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e.detail(), "Forward-auth token rejected");
            return unauthorized();
        }
    };

    match identity_headers(&result) {
        Ok(headers) => (StatusCode::OK, headers).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Identity not representable as headers");
            unauthorized()
        }
    }
}

fn identity_headers(result: &ValidationResult) -> Result<HeaderMap, InvalidHeaderValue> {
    let roles = result
        .identity
        .roles
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",");

    let mut headers = HeaderMap::new();
    headers.insert(
        X_AUTH_USER,
        HeaderValue::from_bytes(result.identity.username.as_bytes())?,
    );
    headers.insert(X_AUTH_ROLE, HeaderValue::from_bytes(roles.as_bytes())?);
    headers.insert(
        X_AUTH_COMPANY,
        HeaderValue::from_bytes(result.identity.tenant_id.as_bytes())?,
    );

    Ok(headers)
}

fn unauthorized() -> Response {
    StatusCode::UNAUTHORIZED.into_response()
}
