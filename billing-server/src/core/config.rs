use crate::auth::{JwtConfig, JwtError};

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | directory holding the SQLite file |
/// | DATABASE_PATH | `<WORK_DIR>/billing.db` | SQLite path |
/// | HTTP_PORT | 3001 | HTTP API port |
/// | ENVIRONMENT | development | development / staging / production |
/// | CORS_ORIGIN | http://localhost:5173 | allowed browser origin (`*` = any) |
/// | SEED_DEFAULTS | true | seed the default customer categories |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
/// | LOG_LEVEL | info | level for this crate and tower-http |
/// | LOG_DIR | - | daily rolling log files when set |
/// | LOG_JSON | false | JSON log lines |
/// | JWT_SECRET, JWT_ISSUER, JWT_AUDIENCE, JWT_EXPIRATION_MINUTES | - | token verification |
///
/// ```ignore
/// WORK_DIR=/srv/billing HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub database_path: String,
    pub http_port: u16,
    pub environment: String,
    pub cors_origin: String,
    pub seed_defaults: bool,
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    pub jwt: JwtConfig,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Fails only when the JWT secret is unusable.
    pub fn from_env() -> Result<Self, JwtError> {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let jwt = JwtConfig::from_env(environment == "production")?;

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| format!("{work_dir}/billing.db")),
            work_dir,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            environment,
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            seed_defaults: std::env::var("SEED_DEFAULTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            jwt,
        })
    }

    /// Override work dir and port, commonly used in tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let work_dir = work_dir.into();
        Self {
            database_path: format!("{work_dir}/billing.db"),
            work_dir,
            http_port,
            ..Self::default()
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    /// Development defaults with a random JWT secret; ignores the environment
    fn default() -> Self {
        Self {
            work_dir: "./data".into(),
            database_path: "./data/billing.db".into(),
            http_port: 3001,
            environment: "development".into(),
            cors_origin: "http://localhost:5173".into(),
            seed_defaults: true,
            request_timeout_ms: 30000,
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
            jwt: JwtConfig::development(),
        }
    }
}
