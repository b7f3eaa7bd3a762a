use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::refresh::refresh;
use super::handlers::validate::validate;
use super::handlers::verify::verify;
use crate::domain::identity::service::AuthService;
use crate::outbound::clock::SystemClock;
use crate::outbound::directory::CachedDirectoryClient;
use crate::outbound::directory::OdooDirectoryClient;

pub type GatewayAuthService =
    AuthService<CachedDirectoryClient<OdooDirectoryClient>, SystemClock>;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<GatewayAuthService>,
}

pub fn create_router(auth_service: Arc<GatewayAuthService>) -> Router {
    let state = AppState { auth_service };

    let auth_routes = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/validate", post(validate))
        .route("/auth/refresh", post(refresh))
        .route("/auth/verify", get(verify));

    // Request headers stay out of the span: they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .route("/health", get(health))
        .merge(auth_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
