//! Application configuration loaded from environment variables.

use std::env;

use blog_infra::JwtConfig;
use blog_infra::auth::DEFAULT_JWT_SECRET;
use blog_infra::database::DatabaseConfig;

/// Search index settings. Without a URL the in-memory index is used.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub elasticsearch_url: Option<String>,
    pub index: String,
    pub refresh: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            elasticsearch_url: None,
            index: "entry".to_string(),
            refresh: true,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Application name used in `X-<name>-alert` response headers.
    pub app_name: String,
    pub database: Option<DatabaseConfig>,
    pub search: SearchConfig,
    pub jwt: JwtConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            app_name: "blogApp".to_string(),
            database: None,
            search: SearchConfig::default(),
            jwt: JwtConfig::default(),
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(100),
            min_connections: parsed("DB_MIN_CONNECTIONS").unwrap_or(10),
        });

        let search = SearchConfig {
            elasticsearch_url: env::var("ELASTICSEARCH_URL").ok(),
            index: env::var("ELASTICSEARCH_INDEX").unwrap_or(defaults.search.index),
            refresh: flag("ELASTICSEARCH_REFRESH", defaults.search.refresh),
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT").unwrap_or(defaults.port),
            app_name: env::var("APP_NAME").unwrap_or(defaults.app_name),
            database,
            search,
            jwt: Self::jwt_from_env(defaults.jwt),
        }
    }

    fn jwt_from_env(defaults: JwtConfig) -> JwtConfig {
        let secret = env::var("JWT_SECRET").unwrap_or(defaults.secret);

        if secret == DEFAULT_JWT_SECRET {
            let is_production = env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        JwtConfig {
            secret,
            expiration_hours: parsed("JWT_EXPIRATION_HOURS").unwrap_or(defaults.expiration_hours),
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        }
    }
}
