use std::fmt;

pub use auth::Identity;

/// Login credentials.
///
/// Transient: lives only for the duration of one authentication call.
#[derive(Clone)]
pub struct Credential {
    pub username: String,
    pub secret: String,
    /// Directory database to authenticate against; defaults to the configured one.
    pub tenant_selector: Option<String>,
}

impl Credential {
    pub fn new(username: String, secret: String, tenant_selector: Option<String>) -> Self {
        Self {
            username,
            secret,
            tenant_selector,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .field("tenant_selector", &self.tenant_selector)
            .finish()
    }
}

/// User record returned by a successful directory login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub user_id: i64,
    pub username: String,
    pub tenant_id: String,
    pub tenant_name: String,
}

/// A directory group membership as the directory reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawGroup {
    pub name: String,
    pub category: Option<String>,
}

impl RawGroup {
    pub fn new(name: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            name: name.into(),
            category: category.map(str::to_string),
        }
    }
}

/// Login name, tenant association and raw group memberships of a directory user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAttributes {
    pub login: String,
    pub tenant_id: String,
    pub tenant_name: String,
    pub raw_groups: Vec<RawGroup>,
}

/// Token handed to a caller after login or refresh.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub token: String,
    pub token_id: String,
    pub identity: Identity,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl AuthToken {
    pub fn new(issued: auth::IssuedToken, identity: Identity) -> Self {
        Self {
            token_id: issued.claims.jti,
            issued_at: issued.claims.iat,
            expires_at: issued.claims.exp,
            token: issued.token,
            identity,
        }
    }

    /// Lifetime in seconds as issued.
    pub fn expires_in(&self) -> i64 {
        self.expires_at - self.issued_at
    }
}

/// Outcome of a successful token validation.
///
/// `nearing_expiry` is recomputed from the wall clock on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub identity: Identity,
    pub expires_at: i64,
    pub nearing_expiry: bool,
}
