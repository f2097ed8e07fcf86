//! Application configuration loaded from environment variables.
//!
//! Fail-fast loading: required variables must be present and valid or the
//! application exits with a clear error message. Development-only
//! affordances are gated on `APP_ENV`.

use std::env;
use thiserror::Error;

/// Application environment mode.
///
/// Controls security enforcement: development allows the dev-login bypass
/// and relaxed cookie handling on plain HTTP; production refuses both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    /// Parse from the `APP_ENV` environment variable value. Defaults to
    /// `Development` when unset or unrecognized.
    pub fn from_env_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => {
                tracing::warn!(
                    value = other,
                    "Unrecognized APP_ENV value, defaulting to Development"
                );
                Self::Development
            }
        }
    }

    /// Returns true if this is production mode.
    #[must_use]
    pub fn is_production(&self) -> bool {
        *self == Self::Production
    }
}

impl std::fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host (default "0.0.0.0").
    pub host: String,
    /// Bind port (default 8080).
    pub port: u16,
    /// Postgres connection URL.
    pub database_url: String,
    /// Our issuer base URL (e.g. "https://id.corp.example").
    pub issuer_url: String,
    /// Log filter directive (default "info").
    pub rust_log: String,
    /// Environment mode.
    pub app_env: AppEnvironment,

    /// RS256 private key (PEM) for session tokens.
    pub session_private_key: String,
    /// RS256 public key (PEM) for session tokens.
    pub session_public_key: String,
    /// Session lifetime in seconds (default 43200 = 12 hours).
    pub session_ttl_secs: i64,
    /// Honor `X-Forwarded-Proto` from the reverse proxy (default true).
    pub trust_forwarded_proto: bool,

    /// Corporate identity provider issuer URL.
    pub sso_issuer_url: String,
    /// Our client id at the identity provider.
    pub sso_client_id: String,
    /// Our client secret at the identity provider.
    pub sso_client_secret: String,
    /// Scopes requested from the identity provider.
    pub sso_scopes: String,

    /// Maximum refresh-token lifetime in days (default 30).
    pub refresh_token_ttl_days: i64,

    /// Allowed CORS origins (comma-separated; empty = same-origin only).
    pub cors_origins: Vec<String>,
}

fn required(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: name.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from the environment, failing fast on missing or
    /// invalid required values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_env =
            AppEnvironment::from_env_str(&optional("APP_ENV", "development"));

        let config = Self {
            host: optional("HOST", "0.0.0.0"),
            port: parse_var("PORT", 8080u16)?,
            database_url: required("DATABASE_URL")?,
            issuer_url: required("ISSUER_URL")?,
            rust_log: optional("RUST_LOG", "info"),
            app_env,

            session_private_key: required("SESSION_PRIVATE_KEY")?,
            session_public_key: required("SESSION_PUBLIC_KEY")?,
            session_ttl_secs: parse_var("SESSION_TTL_SECS", 43_200i64)?,
            trust_forwarded_proto: parse_var("TRUST_FORWARDED_PROTO", true)?,

            sso_issuer_url: required("SSO_ISSUER_URL")?,
            sso_client_id: required("SSO_CLIENT_ID")?,
            sso_client_secret: required("SSO_CLIENT_SECRET")?,
            sso_scopes: optional("SSO_SCOPES", "openid profile email"),

            refresh_token_ttl_days: parse_var("REFRESH_TOKEN_TTL_DAYS", 30i64)?,

            cors_origins: env::var("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Cross-field validation.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.session_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                var: "SESSION_TTL_SECS".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.refresh_token_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue {
                var: "REFRESH_TOKEN_TTL_DAYS".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.app_env.is_production() && self.issuer_url.starts_with("http://") {
            return Err(ConfigError::InvalidValue {
                var: "ISSUER_URL".to_string(),
                message: "must be https in production".to_string(),
            });
        }
        Ok(())
    }

    /// The socket address string to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_environment_parsing() {
        assert_eq!(
            AppEnvironment::from_env_str("production"),
            AppEnvironment::Production
        );
        assert_eq!(
            AppEnvironment::from_env_str("PROD"),
            AppEnvironment::Production
        );
        assert_eq!(
            AppEnvironment::from_env_str("dev"),
            AppEnvironment::Development
        );
        // Unrecognized defaults to development
        assert_eq!(
            AppEnvironment::from_env_str("staging"),
            AppEnvironment::Development
        );
    }

    #[test]
    fn test_is_production() {
        assert!(AppEnvironment::Production.is_production());
        assert!(!AppEnvironment::Development.is_production());
    }

    fn base_config() -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/tessera".to_string(),
            issuer_url: "https://id.corp.example".to_string(),
            rust_log: "info".to_string(),
            app_env: AppEnvironment::Production,
            session_private_key: "key".to_string(),
            session_public_key: "key".to_string(),
            session_ttl_secs: 43_200,
            trust_forwarded_proto: true,
            sso_issuer_url: "https://login.corp.example".to_string(),
            sso_client_id: "portal".to_string(),
            sso_client_secret: "secret".to_string(),
            sso_scopes: "openid profile email".to_string(),
            refresh_token_ttl_days: 30,
            cors_origins: vec![],
        }
    }

    #[test]
    fn test_validate_rejects_http_issuer_in_production() {
        let mut config = base_config();
        config.issuer_url = "http://id.corp.example".to_string();
        assert!(config.validate().is_err());

        config.app_env = AppEnvironment::Development;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nonpositive_ttls() {
        let mut config = base_config();
        config.session_ttl_secs = 0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.refresh_token_ttl_days = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_addr() {
        assert_eq!(base_config().bind_addr(), "0.0.0.0:8080");
    }
}
