//! Application configuration structs
//!
//! Loaded from environment variables; a `.env` file is honored when present.

use booking_chat_core::SnowflakeGenerator;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub snowflake: SnowflakeConfig,
    pub chat: ChatConfig,
    pub worker: WorkerConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Actor token configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of tokens minted by `JwtService::issue_access_token`
    pub access_token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Media storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub media_root: String,
    /// Base of signed read URLs, without trailing slash
    pub public_base_url: String,
    pub signing_secret: String,
    pub max_file_size_mb: u32,
}

impl StorageConfig {
    #[must_use]
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb as usize * 1024 * 1024
    }
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

/// Chat feature switches
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    pub enabled: bool,
    pub signed_url_ttl_secs: u64,
    pub redact_messages: bool,
    /// Delay before the first purge attempt after a close
    pub close_purge_delay_secs: u64,
    /// Bound on each object store call made by the purge job
    pub storage_timeout_secs: u64,
}

impl ChatConfig {
    #[must_use]
    pub fn close_purge_delay(&self) -> Duration {
        Duration::from_secs(self.close_purge_delay_secs)
    }

    #[must_use]
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }
}

/// Background job worker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    pub poll_interval_ms: u64,
    pub concurrency: usize,
    pub attempt_timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_secs: Vec<u64>,
    /// Threads `closing` for longer than this get their purge re-enqueued
    pub stall_after_secs: u64,
}

impl WorkerConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}

// Default value functions
fn default_app_name() -> String {
    "booking-chat".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const DEFAULT_BACKOFF: &str = "5,30,60,120,300";

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(get);
        let jwt_secret = vars.required("JWT_SECRET")?;
        let api_port = vars.parsed("API_PORT", 8080);

        Ok(Self {
            app: AppSettings {
                name: vars.string("APP_NAME", &default_app_name()),
                env: vars.parsed("APP_ENV", Environment::Development),
            },
            api: ServerConfig {
                host: vars.string("API_HOST", &default_host()),
                port: api_port,
            },
            database: DatabaseConfig {
                url: vars.required("DATABASE_URL")?,
                max_connections: vars.parsed("DATABASE_MAX_CONNECTIONS", 20),
                min_connections: vars.parsed("DATABASE_MIN_CONNECTIONS", 5),
            },
            redis: RedisConfig {
                url: vars.required("REDIS_URL")?,
                max_connections: vars.parsed("REDIS_MAX_CONNECTIONS", 10),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: vars.parsed("RATE_LIMIT_REQUESTS_PER_SECOND", 10),
                burst: vars.parsed("RATE_LIMIT_BURST", 50),
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .get("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            storage: StorageConfig {
                media_root: vars.string("MEDIA_ROOT", "./media"),
                public_base_url: vars
                    .string("MEDIA_PUBLIC_BASE_URL", &format!("http://127.0.0.1:{api_port}"))
                    .trim_end_matches('/')
                    .to_string(),
                signing_secret: vars.string("MEDIA_SIGNING_SECRET", &jwt_secret),
                max_file_size_mb: vars.parsed("MAX_FILE_SIZE_MB", 10),
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_token_expiry: vars.parsed("JWT_ACCESS_TOKEN_EXPIRY", 900),
            },
            snowflake: SnowflakeConfig {
                worker_id: parse_worker_id(vars.get("WORKER_ID"))?,
            },
            chat: ChatConfig {
                enabled: vars.flag("CHAT_ENABLED", true),
                signed_url_ttl_secs: vars.parsed("CHAT_SIGNED_URL_TTL", 300),
                redact_messages: vars.flag("CHAT_REDACT_MESSAGES", true),
                close_purge_delay_secs: vars.parsed("CHAT_CLOSE_PURGE_DELAY", 0),
                storage_timeout_secs: vars.parsed("CHAT_STORAGE_TIMEOUT", 30),
            },
            worker: WorkerConfig {
                poll_interval_ms: vars.parsed("JOB_POLL_INTERVAL_MS", 1000),
                concurrency: vars.parsed::<usize>("JOB_CONCURRENCY", 4).max(1),
                attempt_timeout_secs: vars.parsed("JOB_ATTEMPT_TIMEOUT", 120),
                max_attempts: vars.parsed::<u32>("JOB_MAX_ATTEMPTS", 5).max(1),
                backoff_secs: parse_backoff(&vars.string("JOB_BACKOFF", DEFAULT_BACKOFF))?,
                stall_after_secs: vars.parsed("JOB_STALL_AFTER", 900),
            },
        })
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingVar(key))
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: FromStr>(&self, key: &str, default: T) -> T {
        self.get(key)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        match self.get(key).map(|s| s.trim().to_lowercase()).as_deref() {
            Some("true" | "1" | "yes" | "on") => true,
            Some("false" | "0" | "no" | "off") => false,
            _ => default,
        }
    }
}

fn parse_backoff(raw: &str) -> Result<Vec<u64>, ConfigError> {
    let steps = raw
        .split(',')
        .map(|s| s.trim().parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ConfigError::InvalidValue("JOB_BACKOFF", raw.to_string()))?;
    if steps.is_empty() {
        return Err(ConfigError::InvalidValue("JOB_BACKOFF", raw.to_string()));
    }
    Ok(steps)
}

fn parse_worker_id(raw: Option<String>) -> Result<u16, ConfigError> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|id| *id <= SnowflakeGenerator::MAX_WORKER_ID)
        .ok_or(ConfigError::InvalidValue("WORKER_ID", raw))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
