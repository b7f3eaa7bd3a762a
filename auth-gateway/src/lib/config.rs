use std::env;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Upper bound for `jwt.expiration_seconds`.
pub const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Application configuration for auth-gateway.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub roles: Vec<RoleMappingEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Token signing configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Base64-encoded symmetric signing key
    pub secret: String,
    pub expiration_seconds: i64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl")]
    pub validation_ttl_seconds: u64,
    #[serde(default = "default_cache_capacity")]
    pub validation_max_capacity: u64,
    #[serde(default = "default_cache_ttl")]
    pub directory_ttl_seconds: u64,
}

/// ERP user directory connection and service account.
#[derive(Debug, Deserialize, Clone)]
pub struct DirectoryConfig {
    pub url: String,
    pub database: String,
    pub service_username: String,
    pub service_password: String,
}

/// One row of the role mapping table.
///
/// `group` is either the bare group name or `"{category} / {name}"`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RoleMappingEntry {
    pub group: String,
    pub role: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            validation_ttl_seconds: default_cache_ttl(),
            validation_max_capacity: default_cache_capacity(),
            directory_ttl_seconds: default_cache_ttl(),
        }
    }
}

fn default_issuer() -> String {
    "neuroerp-auth".to_string()
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_cache_capacity() -> u64 {
    10_000
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables named `SECTION__KEY` (JWT__SECRET, DIRECTORY__URL,
    ///    DIRECTORY__SERVICE_PASSWORD, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Unprefixed, `__` between section and key:
            // DIRECTORY__URL=http://odoo:8069 overrides directory.url
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.expiration_seconds <= 0 {
            return Err(ConfigError::Message(
                "jwt.expiration_seconds must be positive".to_string(),
            ));
        }

        if self.jwt.expiration_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_seconds must not exceed {} (one year)",
                MAX_TOKEN_TTL_SECONDS
            )));
        }

        if self.cache.validation_ttl_seconds as i64 >= self.jwt.expiration_seconds {
            return Err(ConfigError::Message(format!(
                "cache.validation_ttl_seconds ({}) must be shorter than jwt.expiration_seconds ({})",
                self.cache.validation_ttl_seconds, self.jwt.expiration_seconds
            )));
        }

        self.jwt.signing_key().map(|_| ())
    }
}

impl JwtConfig {
    /// Decode the base64 signing key.
    pub fn signing_key(&self) -> Result<Vec<u8>, ConfigError> {
        STANDARD
            .decode(self.secret.trim())
            .map_err(|e| ConfigError::Message(format!("jwt.secret is not valid base64: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, expiration_seconds: i64, validation_ttl_seconds: u64) -> Config {
        Config {
            server: ServerConfig { http_port: 8080 },
            jwt: JwtConfig {
                secret: secret.to_string(),
                expiration_seconds,
                issuer: default_issuer(),
            },
            cache: CacheConfig {
                validation_ttl_seconds,
                ..CacheConfig::default()
            },
            directory: DirectoryConfig {
                url: "http://localhost:8069".to_string(),
                database: "neuroerp".to_string(),
                service_username: "admin".to_string(),
                service_password: "admin".to_string(),
            },
            roles: Vec::new(),
        }
    }

    fn valid_secret() -> String {
        STANDARD.encode(b"test-secret-key-for-jwt-signing-at-least-32-bytes")
    }

    #[test]
    fn test_valid_config() {
        let config = config(&valid_secret(), 3600, 300);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.jwt.signing_key().unwrap(),
            b"test-secret-key-for-jwt-signing-at-least-32-bytes".to_vec()
        );
    }

    #[test]
    fn test_rejects_cache_ttl_not_shorter_than_token_ttl() {
        assert!(config(&valid_secret(), 300, 300).validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_token_ttl() {
        assert!(config(&valid_secret(), 0, 0).validate().is_err());
    }

    #[test]
    fn test_rejects_token_ttl_above_one_year() {
        assert!(config(&valid_secret(), MAX_TOKEN_TTL_SECONDS, 300)
            .validate()
            .is_ok());
        assert!(config(&valid_secret(), MAX_TOKEN_TTL_SECONDS + 1, 300)
            .validate()
            .is_err());
        assert!(config(&valid_secret(), i64::MAX, 300).validate().is_err());
    }

    #[test]
    fn test_load_applies_environment_overrides() {
        // Only test in this binary that touches the process environment.
        env::set_var("JWT__EXPIRATION_SECONDS", "7777");
        env::set_var("DIRECTORY__URL", "http://odoo.internal:8069");
        env::set_var("DIRECTORY__SERVICE_PASSWORD", "from-env");

        let loaded = Config::load();

        env::remove_var("JWT__EXPIRATION_SECONDS");
        env::remove_var("DIRECTORY__URL");
        env::remove_var("DIRECTORY__SERVICE_PASSWORD");

        let config = loaded.unwrap();
        assert_eq!(config.jwt.expiration_seconds, 7777);
        assert_eq!(config.directory.url, "http://odoo.internal:8069");
        assert_eq!(config.directory.service_password, "from-env");
        // Untouched keys still come from config/default.toml.
        assert_eq!(config.directory.database, "neuroerp");
    }

    #[test]
    fn test_rejects_invalid_base64_secret() {
        assert!(config("not base64 !!", 3600, 300).validate().is_err());
    }

    #[test]
    fn test_role_entries_deserialize() {
        let raw = r#"
            [server]
            http_port = 8080

            [jwt]
            secret = "c2VjcmV0"
            expiration_seconds = 3600

            [directory]
            url = "http://odoo:8069"
            database = "neuroerp"
            service_username = "admin"
            service_password = "admin"

            [[roles]]
            group = "Sales / Administrator"
            role = "SALES_ADMIN"
        "#;

        let config: Config = ConfigBuilder::builder()
            .add_source(File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.jwt.issuer, "neuroerp-auth");
        assert_eq!(config.cache.validation_ttl_seconds, 300);
        assert_eq!(
            config.roles,
            vec![RoleMappingEntry {
                group: "Sales / Administrator".to_string(),
                role: "SALES_ADMIN".to_string(),
            }]
        );
    }
}
