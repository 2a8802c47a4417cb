use std::env;
use thiserror::Error;

use crate::auth::CredentialSource;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Clock-skew tolerance for token expiry. Zero unless configured.
    pub token_leeway_secs: u64,
    pub cookie_name: String,
    /// Where to look for the credential, in priority order.
    pub credential_sources: Vec<CredentialSource>,
    /// Allowed CORS origins; empty allows any origin.
    pub cors_origins: Vec<String>,
    pub bcrypt_cost: u32,
    pub production: bool,
    /// Registering with this email yields a verified admin. Lowercased.
    pub admin_email: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let or_default =
            |key: &'static str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let credential_sources = or_default("AUTH_TOKEN_SOURCES", "cookie,header")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<CredentialSource>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConfigError::Invalid("AUTH_TOKEN_SOURCES"))?;
        if credential_sources.is_empty() {
            return Err(ConfigError::Invalid("AUTH_TOKEN_SOURCES"));
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_port: or_default("SERVER_PORT", "8080")
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("SERVER_PORT"))?,
            server_host: or_default("SERVER_HOST", "127.0.0.1"),
            jwt_secret: required("JWT_SECRET")?,
            token_ttl_hours: or_default("TOKEN_TTL_HOURS", "24")
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .ok_or(ConfigError::Invalid("TOKEN_TTL_HOURS"))?,
            token_leeway_secs: or_default("TOKEN_LEEWAY_SECS", "0")
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("TOKEN_LEEWAY_SECS"))?,
            cookie_name: or_default("AUTH_COOKIE_NAME", "token"),
            credential_sources,
            cors_origins: or_default("CORS_ORIGINS", "")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            bcrypt_cost: match lookup("BCRYPT_COST") {
                Some(cost) => cost
                    .parse::<u32>()
                    .ok()
                    .filter(|c| (4..=31).contains(c))
                    .ok_or(ConfigError::Invalid("BCRYPT_COST"))?,
                None => bcrypt::DEFAULT_COST,
            },
            production: matches!(
                lookup("APP_ENV").map(|v| v.to_ascii_lowercase()).as_deref(),
                Some("production") | Some("prod")
            ),
            admin_email: lookup("ADMIN_EMAIL")
                .map(|email| email.trim().to_ascii_lowercase())
                .filter(|email| !email.is_empty()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.token_leeway_secs, 0);
        assert_eq!(config.cookie_name, "token");
        assert_eq!(
            config.credential_sources,
            vec![CredentialSource::Cookie, CredentialSource::BearerHeader]
        );
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(!config.production);
        assert_eq!(config.admin_email, None);
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("AUTH_TOKEN_SOURCES", "header"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("BCRYPT_COST", "10"),
            ("APP_ENV", "Production"),
            ("ADMIN_EMAIL", " Root@Example.com "),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.credential_sources, vec![CredentialSource::BearerHeader]);
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.bcrypt_cost, 10);
        assert!(config.production);
        assert_eq!(config.admin_email.as_deref(), Some("root@example.com"));
    }

    #[test]
    fn test_config_errors() {
        assert_eq!(
            Config::from_lookup(lookup(&[("JWT_SECRET", "secret")])).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );
        assert_eq!(
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://test")])).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
        assert_eq!(
            Config::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://test"),
                ("JWT_SECRET", "secret"),
                ("SERVER_PORT", "eighty"),
            ]))
            .unwrap_err(),
            ConfigError::Invalid("SERVER_PORT")
        );
        assert_eq!(
            Config::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://test"),
                ("JWT_SECRET", "secret"),
                ("AUTH_TOKEN_SOURCES", "cookie,query"),
            ]))
            .unwrap_err(),
            ConfigError::Invalid("AUTH_TOKEN_SOURCES")
        );
    }
}
