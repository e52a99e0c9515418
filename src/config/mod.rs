use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_API_VERSION: &str = "v1";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid API base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("Invalid API version '{0}': must be a single non-empty path segment")]
    InvalidVersion(String),

    #[error("Invalid route path '{0}': must start with '/'")]
    InvalidRoutePath(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Validated location of the backend API. Built once at start-up; the URL
/// builder never re-parses it per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base: Url,
    version: String,
}

impl ApiConfig {
    pub fn new(base: &str, version: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base).map_err(|e| ConfigError::InvalidBaseUrl {
            value: base.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl {
                value: base.to_string(),
                reason: "URL has no host".to_string(),
            });
        }

        let version = version.trim();
        if version.is_empty() || version.contains('/') {
            return Err(ConfigError::InvalidVersion(version.to_string()));
        }

        Ok(Self {
            base: parsed,
            version: version.to_string(),
        })
    }

    /// Reads `PORTAL_API_BASE_URL` and `PORTAL_API_VERSION`. Unset or blank
    /// values use the defaults; anything set but invalid is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = non_blank_var("PORTAL_API_BASE_URL");
        let version = non_blank_var("PORTAL_API_VERSION");
        Self::new(
            base.as_deref().unwrap_or(DEFAULT_API_BASE_URL),
            version.as_deref().unwrap_or(DEFAULT_API_VERSION),
        )
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Path portion of the base location, e.g. `/gateway/api`.
    pub fn base_path(&self) -> &str {
        self.base.path()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_API_BASE_URL).expect("default API base URL is valid"),
            version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

/// Landing pages the guard redirects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub signin: String,
    pub dashboard: String,
    pub home: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            signin: "/signin".to_string(),
            dashboard: "/dashboard".to_string(),
            home: "/".to_string(),
        }
    }
}

impl RouteConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.signin, &self.dashboard, &self.home] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidRoutePath(path.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_cors: bool,
}

#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub routes: RouteConfig,
    pub security: SecurityConfig,
    pub server: ServerConfig,
}

impl PortalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };
        config.api = ApiConfig::from_env()?;
        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(v) = non_blank_var("PORTAL_SIGNIN_PATH") {
            self.routes.signin = v;
        }
        if let Some(v) = non_blank_var("PORTAL_DASHBOARD_PATH") {
            self.routes.dashboard = v;
        }
        if let Some(v) = non_blank_var("PORTAL_HOME_PATH") {
            self.routes.home = v;
        }
        self.routes.validate()?;

        if let Some(v) = non_blank_var("PORTAL_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = non_blank_var("PORTAL_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_var("PORTAL_JWT_EXPIRY_HOURS", &v)?;
        }
        if let Some(v) = non_blank_var("PORTAL_PORT") {
            self.server.port = parse_var("PORTAL_PORT", &v)?;
        }
        if let Some(v) = non_blank_var("PORTAL_ENABLE_CORS") {
            self.server.enable_cors = parse_var("PORTAL_ENABLE_CORS", &v)?;
        }

        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig::default(),
            routes: RouteConfig::default(),
            security: SecurityConfig {
                jwt_secret: "pickleball-portal-dev-secret".to_string(),
                jwt_expiry_hours: 24 * 7,
            },
            server: ServerConfig {
                port: 3000,
                enable_cors: true,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig::default(),
            routes: RouteConfig::default(),
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            server: ServerConfig {
                port: 3000,
                enable_cors: true,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig::default(),
            routes: RouteConfig::default(),
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
            server: ServerConfig {
                port: 8000,
                enable_cors: false,
            },
        }
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

// Global config - validated and stored once at startup
static CONFIG: OnceCell<PortalConfig> = OnceCell::new();

pub fn init(config: PortalConfig) -> Result<&'static PortalConfig, ConfigError> {
    CONFIG
        .try_insert(config)
        .map_err(|_| ConfigError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_api_config() {
        let api = ApiConfig::default();
        assert_eq!(api.base().as_str(), "http://localhost:8080/");
        assert_eq!(api.version(), "v1");
        assert_eq!(api.base_path(), "/");
    }

    #[test]
    fn test_api_config_keeps_base_path() {
        let api = ApiConfig::new("https://example.com/gateway/api", "v2").unwrap();
        assert_eq!(api.base_path(), "/gateway/api");
        assert_eq!(api.version(), "v2");
    }

    #[test]
    fn test_unparseable_base_is_rejected() {
        let err = ApiConfig::new("not a url", "v1").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let err = ApiConfig::new("mailto:someone@example.com", "v1").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn test_bad_version_is_rejected() {
        assert_eq!(
            ApiConfig::new(DEFAULT_API_BASE_URL, "  ").unwrap_err(),
            ConfigError::InvalidVersion(String::new())
        );
        assert!(matches!(
            ApiConfig::new(DEFAULT_API_BASE_URL, "v1/beta"),
            Err(ConfigError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_route_paths_must_be_absolute() {
        let mut routes = RouteConfig::default();
        assert!(routes.validate().is_ok());
        routes.dashboard = "dashboard".to_string();
        assert_eq!(
            routes.validate(),
            Err(ConfigError::InvalidRoutePath("dashboard".to_string()))
        );
    }

    #[test]
    fn test_production_has_no_default_secret() {
        let config = PortalConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert!(!config.server.enable_cors);
        assert_eq!(config.routes.signin, "/signin");
    }
}
