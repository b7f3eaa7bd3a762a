use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

/// Identity claims carried by every issued token.
///
/// The payload embeds the whole identity so the gateway stays stateless
/// between requests. Field names follow the wire format other services
/// already read (`userId`, `companyId`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Directory user identifier
    pub user_id: String,

    /// Canonical role names
    pub roles: BTreeSet<String>,

    /// Tenant (company) identifier
    pub company_id: String,

    /// Tenant (company) display name
    pub company_name: String,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Unique token identifier
    pub jti: String,
}

impl Claims {
    /// Check if the token is expired.
    ///
    /// A token stays valid through the second equal to `exp` and is
    /// expired strictly after it.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }

    /// Seconds of validity left at `current_timestamp` (negative once expired).
    pub fn remaining_seconds(&self, current_timestamp: i64) -> i64 {
        self.exp.saturating_sub(current_timestamp)
    }
}
