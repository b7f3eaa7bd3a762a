//! Token utilities for the authentication gateway
//!
//! Provides the signed-token layer the gateway builds on:
//! - HS256 signing and signature verification (`JwtHandler`)
//! - Identity claims with the wire field names downstream services read (`Claims`)
//! - Issue/decode with exact second-resolution expiry checks (`TokenCodec`)
//!
//! The crate holds no state beyond the signing key; time is always passed in
//! by the caller.
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use auth::{Identity, TokenCodec};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", "neuroerp-auth").unwrap();
//! let identity = Identity {
//!     user_id: 7,
//!     username: "alice".to_string(),
//!     tenant_id: "1".to_string(),
//!     tenant_name: "Acme".to_string(),
//!     roles: BTreeSet::from(["USER".to_string()]),
//! };
//!
//! let now = 1_700_000_000;
//! let issued = codec.issue(&identity, 3600, now).unwrap();
//! let claims = codec.decode(&issued.token, now).unwrap();
//! assert_eq!(claims.sub, "alice");
//! assert!(codec.decode(&issued.token, now + 3601).is_err());
//! ```

pub mod jwt;

pub use jwt::Claims;
pub use jwt::Identity;
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenCodec;
