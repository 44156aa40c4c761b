//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use bepawa_core::visibility::ProductVisibility;
use std::env;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// External checkout-session endpoint. Checkout is disabled when unset.
    pub checkout_url: Option<String>,

    /// Which rule decides what a retail caller sees
    pub product_visibility: ProductVisibility,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ApiConfig {
            http_port: lookup("HTTP_PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "./data/bepawa.db".to_string()),

            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,

            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(|| {
                // Production deployments set JWT_SECRET
                "bepawa-dev-secret-change-in-production".to_string()
            }),

            jwt_access_lifetime_secs: lookup("JWT_ACCESS_LIFETIME_SECS")
                .unwrap_or_else(|| "3600".to_string()) // 1 hour
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()))?,

            checkout_url: lookup("CHECKOUT_URL").filter(|url| !url.trim().is_empty()),

            product_visibility: match lookup("PRODUCT_VISIBILITY") {
                None => ProductVisibility::default(),
                Some(raw) => ProductVisibility::parse(&raw)
                    .ok_or_else(|| ConfigError::InvalidValue("PRODUCT_VISIBILITY".to_string()))?,
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database_path, "./data/bepawa.db");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_access_lifetime_secs, 3600);
        assert!(config.checkout_url.is_none());
        assert_eq!(config.product_visibility, ProductVisibility::Marketplace);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("HTTP_PORT", "9000"),
            ("PRODUCT_VISIBILITY", "linked-wholesaler"),
            ("CHECKOUT_URL", "https://pay.example.com/session"),
        ])
        .unwrap();
        assert_eq!(config.http_port, 9000);
        assert_eq!(config.product_visibility, ProductVisibility::LinkedWholesaler);
        assert_eq!(config.checkout_url.as_deref(), Some("https://pay.example.com/session"));
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("HTTP_PORT", "eighty")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for HTTP_PORT");

        assert!(load(&[("PRODUCT_VISIBILITY", "everyone")]).is_err());
        assert!(load(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
    }
}
