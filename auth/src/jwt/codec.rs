use std::collections::BTreeSet;

use uuid::Uuid;

use super::claims::Claims;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Authenticated subject with its tenant and role attributes.
///
/// Immutable once built; embedded in full into every token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub tenant_id: String,
    pub tenant_name: String,
    pub roles: BTreeSet<String>,
}

impl Identity {
    /// Rebuild the identity carried by a decoded claim set.
    ///
    /// # Errors
    /// * `InvalidToken` - `userId` claim is not an integer
    pub fn from_claims(claims: &Claims) -> Result<Self, JwtError> {
        let user_id = claims
            .user_id
            .parse::<i64>()
            .map_err(|e| JwtError::InvalidToken(format!("malformed userId claim: {}", e)))?;

        Ok(Self {
            user_id,
            username: claims.sub.clone(),
            tenant_id: claims.company_id.clone(),
            tenant_name: claims.company_name.clone(),
            roles: claims.roles.clone(),
        })
    }
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    pub fn token_id(&self) -> &str {
        &self.claims.jti
    }

    pub fn issued_at(&self) -> i64 {
        self.claims.iat
    }

    pub fn expires_at(&self) -> i64 {
        self.claims.exp
    }
}

/// Issues and decodes signed, time-bound identity tokens.
///
/// All timestamps are second-resolution Unix epoch values supplied by the
/// caller, so expiry boundaries are exact and testable.
pub struct TokenCodec {
    handler: JwtHandler,
    issuer: String,
}

impl TokenCodec {
    /// Create a codec signing with `secret` and stamping `issuer` on every token.
    ///
    /// # Errors
    /// * `InvalidKey` - Secret is shorter than 256 bits
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Result<Self, JwtError> {
        Ok(Self {
            handler: JwtHandler::new(secret)?,
            issuer: issuer.into(),
        })
    }

    /// Sign a new token for `identity`, valid for `ttl_seconds` from `now`.
    ///
    /// Every call draws a fresh random token identifier.
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry not representable, or signing failed
    pub fn issue(
        &self,
        identity: &Identity,
        ttl_seconds: i64,
        now: i64,
    ) -> Result<IssuedToken, JwtError> {
        let exp = now.checked_add(ttl_seconds).ok_or_else(|| {
            JwtError::EncodingFailed(format!("expiry overflows: {} + {}", now, ttl_seconds))
        })?;

        let claims = Claims {
            sub: identity.username.clone(),
            user_id: identity.user_id.to_string(),
            roles: identity.roles.clone(),
            company_id: identity.tenant_id.clone(),
            company_name: identity.tenant_name.clone(),
            iat: now,
            exp,
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = self.handler.encode(&claims)?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify and decode a token as of `now`.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, malformed payload, foreign issuer or expired
    pub fn decode(&self, token: &str, now: i64) -> Result<Claims, JwtError> {
        let claims: Claims = self.handler.decode(token)?;

        if claims.iss != self.issuer {
            return Err(JwtError::InvalidToken(format!(
                "unexpected issuer: {}",
                claims.iss
            )));
        }

        if claims.is_expired(now) {
            return Err(JwtError::InvalidToken("token expired".to_string()));
        }

        Identity::from_claims(&claims)?;

        Ok(claims)
    }
}
