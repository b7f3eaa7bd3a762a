use std::sync::Arc;

use async_trait::async_trait;
use auth::Claims;
use auth::TokenCodec;

use crate::domain::identity::cache::ValidationCache;
use crate::domain::identity::errors::AuthError;
use crate::domain::identity::models::AuthToken;
use crate::domain::identity::models::Credential;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::ValidationResult;
use crate::domain::identity::ports::AuthServicePort;
use crate::domain::identity::ports::Clock;
use crate::domain::identity::ports::DirectoryClient;
use crate::domain::identity::roles::RoleResolver;

/// Token lifecycle: login, validation and refresh.
///
/// Holds no per-token state besides the validation cache. Whether a token is
/// fresh, nearing expiry or expired is always recomputed from its `exp` claim
/// against the clock. There is no revocation: a refreshed token stays
/// cryptographically valid until its own expiry.
pub struct AuthService<D, C>
where
    D: DirectoryClient,
    C: Clock,
{
    directory: Arc<D>,
    clock: Arc<C>,
    codec: Arc<TokenCodec>,
    role_resolver: Arc<RoleResolver>,
    cache: ValidationCache,
    ttl_seconds: i64,
}

impl<D, C> AuthService<D, C>
where
    D: DirectoryClient,
    C: Clock,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `directory` - User directory implementation
    /// * `clock` - Wall-clock source
    /// * `codec` - Token signer/verifier
    /// * `role_resolver` - Group to role mapping
    /// * `cache` - Validation cache
    /// * `ttl_seconds` - Lifetime of every issued token
    pub fn new(
        directory: Arc<D>,
        clock: Arc<C>,
        codec: Arc<TokenCodec>,
        role_resolver: Arc<RoleResolver>,
        cache: ValidationCache,
        ttl_seconds: i64,
    ) -> Self {
        Self {
            directory,
            clock,
            codec,
            role_resolver,
            cache,
            ttl_seconds,
        }
    }

    /// Less than a tenth of the configured lifetime left.
    fn is_nearing_expiry(&self, claims: &Claims, now: i64) -> bool {
        claims.remaining_seconds(now).saturating_mul(10) < self.ttl_seconds
    }

    async fn decode_cached(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        if let Some(claims) = self.cache.get(token, now).await {
            return Ok(claims);
        }

        let claims = self.codec.decode(token, now).map_err(|e| {
            tracing::warn!(error = %e, "Token validation failed");
            AuthError::InvalidToken(e.to_string())
        })?;

        self.cache.insert(token, claims.clone(), now).await;

        Ok(claims)
    }
}

#[async_trait]
impl<D, C> AuthServicePort for AuthService<D, C>
where
    D: DirectoryClient,
    C: Clock,
{
    async fn authenticate(&self, credential: Credential) -> Result<AuthToken, AuthError> {
        tracing::debug!(username = %credential.username, "Authenticating user");

        let login_failed = |err: AuthError| {
            tracing::error!(
                username = %credential.username,
                error = %err.detail(),
                "Authentication failed"
            );
            err
        };

        let user = self
            .directory
            .authenticate(&credential)
            .await
            .map_err(|e| login_failed(e.into()))?;

        let attributes = self
            .directory
            .fetch_user_attributes(user.user_id)
            .await
            .map_err(|e| login_failed(e.into()))?;

        let identity = Identity {
            user_id: user.user_id,
            username: user.username,
            tenant_id: attributes.tenant_id,
            tenant_name: attributes.tenant_name,
            roles: self.role_resolver.resolve_roles(&attributes.raw_groups),
        };

        let issued = self
            .codec
            .issue(&identity, self.ttl_seconds, self.clock.now())
            .map_err(|e| login_failed(AuthError::AuthenticationFailed(e.to_string())))?;

        tracing::info!(
            username = %identity.username,
            user_id = identity.user_id,
            company_id = %identity.tenant_id,
            token_id = %issued.token_id(),
            roles = ?identity.roles,
            "User authenticated"
        );

        Ok(AuthToken::new(issued, identity))
    }

    async fn validate(&self, token: &str) -> Result<ValidationResult, AuthError> {
        let now = self.clock.now();
        let claims = self.decode_cached(token, now).await?;
        let identity = Identity::from_claims(&claims)?;

        Ok(ValidationResult {
            valid: true,
            identity,
            expires_at: claims.exp,
            nearing_expiry: self.is_nearing_expiry(&claims, now),
        })
    }

    async fn refresh(&self, token: &str) -> Result<AuthToken, AuthError> {
        let validation = self.validate(token).await?;

        self.cache.invalidate(token).await;

        let issued = self
            .codec
            .issue(&validation.identity, self.ttl_seconds, self.clock.now())
            .map_err(|e| {
                tracing::error!(error = %e, "Token refresh failed");
                AuthError::InvalidToken(e.to_string())
            })?;

        tracing::info!(
            username = %validation.identity.username,
            token_id = %issued.token_id(),
            "Token refreshed"
        );

        Ok(AuthToken::new(issued, validation.identity))
    }
}
