use async_trait::async_trait;

use crate::domain::identity::errors::AuthError;
use crate::domain::identity::errors::DirectoryError;
use crate::domain::identity::models::AuthToken;
use crate::domain::identity::models::Credential;
use crate::domain::identity::models::DirectoryUser;
use crate::domain::identity::models::UserAttributes;
use crate::domain::identity::models::ValidationResult;

/// Port for token lifecycle operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Log a user in against the directory and issue a token.
    ///
    /// # Arguments
    /// * `credential` - Username, password and optional tenant selector
    ///
    /// # Returns
    /// Signed token with the resolved identity
    ///
    /// # Errors
    /// * `AuthenticationFailed` - Any stage failed (directory, role lookup, signing)
    async fn authenticate(&self, credential: Credential) -> Result<AuthToken, AuthError>;

    /// Validate a token and report how close it is to expiry.
    ///
    /// # Arguments
    /// * `token` - Raw token string
    ///
    /// # Returns
    /// Identity claims, expiry and the nearing-expiry signal
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, malformed payload or expired
    async fn validate(&self, token: &str) -> Result<ValidationResult, AuthError>;

    /// Exchange a still-valid token for a new one with a full lifetime.
    ///
    /// Does not contact the directory; the old token's claims are reused.
    ///
    /// # Errors
    /// * `InvalidToken` - Token failed validation (expired tokens included)
    async fn refresh(&self, token: &str) -> Result<AuthToken, AuthError>;
}

/// Access to the external user directory.
#[async_trait]
pub trait DirectoryClient: Send + Sync + 'static {
    /// Check a username/password pair and return the directory user id.
    ///
    /// # Arguments
    /// * `credential` - Login name, password and optional directory database
    ///   (`None` selects the configured default)
    ///
    /// # Errors
    /// * `Authentication` - Credentials rejected or directory unreachable
    async fn verify_credentials(&self, credential: &Credential) -> Result<i64, DirectoryError>;

    /// Verify a username/password pair and resolve the user's tenant.
    ///
    /// The tenant comes from [`fetch_user_attributes`](Self::fetch_user_attributes),
    /// so a caching implementation serves both from one lookup. Attribute reads
    /// always run against the configured database: when the id resolves to a
    /// different login there (tenant-selector logins), the login is rejected.
    ///
    /// # Errors
    /// * `Authentication` - Credentials rejected, lookup failed or user mismatch
    async fn authenticate(&self, credential: &Credential) -> Result<DirectoryUser, DirectoryError> {
        let user_id = self.verify_credentials(credential).await?;

        let attributes = self
            .fetch_user_attributes(user_id)
            .await
            .map_err(|e| DirectoryError::Authentication(e.to_string()))?;

        if !attributes
            .login
            .eq_ignore_ascii_case(credential.username.trim())
        {
            tracing::warn!(
                username = %credential.username,
                user_id,
                directory_login = %attributes.login,
                "Directory user id resolves to a different login"
            );
            return Err(DirectoryError::Authentication(format!(
                "user {} is not {} in the lookup database",
                user_id, credential.username
            )));
        }

        Ok(DirectoryUser {
            user_id,
            username: credential.username.clone(),
            tenant_id: attributes.tenant_id,
            tenant_name: attributes.tenant_name,
        })
    }

    /// Read login, tenant association and group memberships of a user.
    ///
    /// # Errors
    /// * `Lookup` - User record could not be retrieved
    async fn fetch_user_attributes(&self, user_id: i64) -> Result<UserAttributes, DirectoryError>;

    /// Whether the user exists. Lookup failures resolve to `false`.
    async fn user_exists(&self, user_id: i64) -> bool;
}

/// Wall-clock source, second resolution Unix epoch.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> i64;
}
