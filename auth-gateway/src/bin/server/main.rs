use std::sync::Arc;
use std::time::Duration;

use auth::TokenCodec;
use auth_gateway::config::Config;
use auth_gateway::domain::identity::cache::ValidationCache;
use auth_gateway::domain::identity::roles::RoleMappingTable;
use auth_gateway::domain::identity::roles::RoleResolver;
use auth_gateway::domain::identity::service::AuthService;
use auth_gateway::inbound::http::router::create_router;
use auth_gateway::outbound::clock::SystemClock;
use auth_gateway::outbound::directory::CachedDirectoryClient;
use auth_gateway::outbound::directory::OdooDirectoryClient;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-gateway",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        directory_url = %config.directory.url,
        directory_database = %config.directory.database,
        token_ttl_seconds = config.jwt.expiration_seconds,
        validation_cache_ttl_seconds = config.cache.validation_ttl_seconds,
        role_mappings = config.roles.len(),
        "Configuration loaded"
    );

    let codec = Arc::new(TokenCodec::new(
        &config.jwt.signing_key()?,
        config.jwt.issuer.clone(),
    )?);

    let role_table = RoleMappingTable::new(
        config
            .roles
            .iter()
            .map(|entry| (entry.group.clone(), entry.role.clone())),
    );
    let role_resolver = Arc::new(RoleResolver::new(role_table));

    let odoo = Arc::new(OdooDirectoryClient::new(&config.directory));
    let directory = Arc::new(CachedDirectoryClient::new(
        odoo,
        Duration::from_secs(config.cache.directory_ttl_seconds),
    ));

    let validation_cache = ValidationCache::new(
        Duration::from_secs(config.cache.validation_ttl_seconds),
        config.cache.validation_max_capacity,
    );

    let auth_service = Arc::new(AuthService::new(
        directory,
        Arc::new(SystemClock),
        codec,
        role_resolver,
        validation_cache,
        config.jwt.expiration_seconds,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
