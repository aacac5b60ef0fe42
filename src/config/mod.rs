use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub routes: RoutesConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub static_root: PathBuf,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    /// Server-held token used by the owner proxy routes
    pub service_token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of both the persisted store entry and the bridge cookie
    pub storage_name: String,
    pub cookie_max_age_days: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    pub login_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("HANUMAN_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("HANUMAN_STATIC_ROOT") {
            self.server.static_root = PathBuf::from(v);
        }
        if let Ok(v) = env::var("HANUMAN_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Backend overrides
        if let Ok(v) = env::var("HANUMAN_API_BASE_URL") {
            self.backend.base_url = v;
        }
        if let Ok(v) = env::var("BACKEND_API_TOKEN") {
            self.backend.service_token = Some(v).filter(|t| !t.is_empty());
        }
        if let Ok(v) = env::var("HANUMAN_BACKEND_TIMEOUT_SECS") {
            self.backend.timeout_secs = v.parse().unwrap_or(self.backend.timeout_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("HANUMAN_SESSION_NAME") {
            self.session.storage_name = v;
        }
        if let Ok(v) = env::var("HANUMAN_COOKIE_MAX_AGE_DAYS") {
            let days = v.parse().unwrap_or(self.session.cookie_max_age_days);
            self.session.cookie_max_age_days = clamp_cookie_max_age_days(days);
        }
        if let Ok(v) = env::var("HANUMAN_COOKIE_SECURE") {
            self.session.cookie_secure = v.parse().unwrap_or(self.session.cookie_secure);
        }

        // Route overrides
        if let Ok(v) = env::var("HANUMAN_LOGIN_PATH") {
            self.routes.login_path = v;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                static_root: PathBuf::from("public"),
                enable_request_logging: true,
            },
            backend: BackendConfig {
                base_url: "http://127.0.0.1:5000/api".to_string(),
                service_token: None,
                timeout_secs: 30,
            },
            session: SessionConfig {
                storage_name: "auth-storage".to_string(),
                cookie_max_age_days: 7,
                cookie_secure: false,
            },
            routes: RoutesConfig {
                login_path: "/auth".to_string(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                static_root: PathBuf::from("public"),
                enable_request_logging: true,
            },
            backend: BackendConfig {
                base_url: "https://staging-api.hanumancars.com/api".to_string(),
                service_token: None,
                timeout_secs: 15,
            },
            session: SessionConfig {
                storage_name: "auth-storage".to_string(),
                cookie_max_age_days: 7,
                cookie_secure: true,
            },
            routes: RoutesConfig {
                login_path: "/auth".to_string(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.hanumancars.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 3000,
                static_root: PathBuf::from("public"),
                enable_request_logging: false,
            },
            backend: BackendConfig {
                base_url: "https://api.hanumancars.com/api".to_string(),
                service_token: None,
                timeout_secs: 10,
            },
            session: SessionConfig {
                storage_name: "auth-storage".to_string(),
                cookie_max_age_days: 7,
                cookie_secure: true,
            },
            routes: RoutesConfig {
                login_path: "/auth".to_string(),
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://hanumancars.com".to_string()],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Browsers cap cookie lifetimes at 400 days
pub const MAX_COOKIE_AGE_DAYS: i64 = 400;

pub fn clamp_cookie_max_age_days(days: i64) -> i64 {
    days.clamp(1, MAX_COOKIE_AGE_DAYS)
}

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
