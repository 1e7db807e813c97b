use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub auth: AuthConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. `None` only makes sense in stub mode,
    /// where the in-memory store takes over.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Identity provider selection, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    Firebase { project_id: String },
    Stub { subject: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub mode: AuthMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub reflection_notes_ttl_secs: u64,
}

impl CacheConfig {
    pub fn reflection_notes_ttl(&self) -> Duration {
        Duration::from_secs(self.reflection_notes_ttl_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("FIREBASE_PROJECT_ID or FIREBASE_SERVICE_ACCOUNT must be set unless TESTING is enabled")]
    MissingFirebaseProject,

    #[error("FIREBASE_SERVICE_ACCOUNT is not valid JSON: {0}")]
    InvalidServiceAccount(#[from] serde_json::Error),

    #[error("FIREBASE_SERVICE_ACCOUNT has no project_id")]
    ServiceAccountMissingProject,
}

pub const DEFAULT_STUB_SUBJECT: &str = "test-user";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let auth = AuthConfig {
            mode: auth_mode_from_env()?,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(auth),
            Environment::Staging => Self::staging(auth),
            Environment::Development => Self::development(auth),
        };
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Some(port) = env::var("PETCARE_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Cache overrides
        if let Ok(v) = env::var("CACHE_REFLECTION_NOTES_TTL_SECS") {
            self.cache.reflection_notes_ttl_secs =
                v.parse().unwrap_or(self.cache.reflection_notes_ttl_secs);
        }

        self
    }

    pub fn development(auth: AuthConfig) -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                port: 8000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            auth,
            cache: CacheConfig {
                reflection_notes_ttl_secs: 60,
            },
        }
    }

    pub fn staging(auth: AuthConfig) -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
                run_migrations: false,
            },
            api: ApiConfig {
                port: 8000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![],
            },
            auth,
            cache: CacheConfig {
                reflection_notes_ttl_secs: 60,
            },
        }
    }

    pub fn production(auth: AuthConfig) -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                port: 8000,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![],
            },
            auth,
            cache: CacheConfig {
                reflection_notes_ttl_secs: 60,
            },
        }
    }
}

/// `TESTING` wins over any Firebase settings, matching how deployments and
/// CI select the stub provider.
fn auth_mode_from_env() -> Result<AuthMode, ConfigError> {
    if env_flag("TESTING") {
        let subject = env::var("AUTH_STUB_SUBJECT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STUB_SUBJECT.to_string());
        return Ok(AuthMode::Stub { subject });
    }

    if let Ok(project_id) = env::var("FIREBASE_PROJECT_ID") {
        if !project_id.trim().is_empty() {
            return Ok(AuthMode::Firebase { project_id });
        }
    }

    match env::var("FIREBASE_SERVICE_ACCOUNT") {
        Ok(raw) if !raw.trim().is_empty() => Ok(AuthMode::Firebase {
            project_id: project_id_from_service_account(&raw)?,
        }),
        _ => Err(ConfigError::MissingFirebaseProject),
    }
}

pub fn project_id_from_service_account(raw: &str) -> Result<String, ConfigError> {
    #[derive(Deserialize)]
    struct ServiceAccount {
        project_id: Option<String>,
    }

    let account: ServiceAccount = serde_json::from_str(raw)?;
    account
        .project_id
        .filter(|p| !p.is_empty())
        .ok_or(ConfigError::ServiceAccountMissingProject)
}

fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).map(|v| v.to_ascii_lowercase()).as_deref(),
        Ok("1") | Ok("true") | Ok("yes") | Ok("on")
    )
}

// Global singleton config - initialized once at startup
pub static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// Loads the configuration on first call and returns the same instance afterwards.
pub fn config() -> Result<&'static AppConfig, ConfigError> {
    CONFIG.get_or_try_init(AppConfig::from_env)
}
