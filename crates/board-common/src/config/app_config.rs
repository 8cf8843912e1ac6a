//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use board_core::Snowflake;
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
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub agent: AgentConfig,
    pub notifications: NotificationConfig,
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

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
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
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of tokens minted by [`crate::JwtService::issue`], in seconds
    #[serde(default = "default_token_expiry")]
    pub token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

/// Interaction list configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Most recent entries returned by the interactions listing
    #[serde(default = "default_interactions_limit")]
    pub interactions_limit: i64,
}

/// Identity and voice of the persona account
#[derive(Debug, Clone, Deserialize)]
pub struct PersonaConfig {
    /// Reserved user id of the persona
    #[serde(default = "default_persona_id")]
    pub id: i64,
    #[serde(default = "default_persona_name")]
    pub name: String,
    /// Names that count as a mention, matched case-insensitively
    #[serde(default)]
    pub aliases: Vec<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: String,
    /// System instructions sent with every generation request
    #[serde(default = "default_persona_instructions")]
    pub instructions: String,
}

impl PersonaConfig {
    /// Display name followed by the configured aliases, without blanks or repeats
    #[must_use]
    pub fn mention_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in std::iter::once(&self.name).chain(&self.aliases) {
            let name = name.trim();
            if !name.is_empty() && !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                names.push(name.to_string());
            }
        }
        names
    }
}

/// Autonomous participant configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Generative Language API key; the agent stays off without one
    pub api_key: Option<String>,
    #[serde(default = "default_agent_model")]
    pub model: String,
    #[serde(default = "default_agent_api_base_url")]
    pub api_base_url: String,
    pub persona: PersonaConfig,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_dedup_reset_secs")]
    pub dedup_reset_secs: u64,
    #[serde(default = "default_startup_lookback_secs")]
    pub startup_lookback_secs: u64,
    /// The in-memory dedup set is cleared once it holds this many entries
    #[serde(default = "default_max_dedup_entries")]
    pub max_dedup_entries: usize,
}

impl AgentConfig {
    /// Whether the agent should run: enabled and holding an API key
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    #[must_use]
    pub fn dedup_reset_interval(&self) -> Duration {
        Duration::from_secs(self.dedup_reset_secs)
    }

    #[must_use]
    pub fn startup_lookback(&self) -> Duration {
        Duration::from_secs(self.startup_lookback_secs)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_key: None,
            model: default_agent_model(),
            api_base_url: default_agent_api_base_url(),
            persona: PersonaConfig {
                id: default_persona_id(),
                name: default_persona_name(),
                aliases: Vec::new(),
                avatar: None,
                bio: String::new(),
                instructions: default_persona_instructions(),
            },
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            dedup_reset_secs: default_dedup_reset_secs(),
            startup_lookback_secs: default_startup_lookback_secs(),
            max_dedup_entries: default_max_dedup_entries(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "board-server".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_token_expiry() -> i64 {
    604_800 // 7 days
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_interactions_limit() -> i64 {
    50
}

fn default_true() -> bool {
    true
}

fn default_agent_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_agent_api_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_persona_id() -> i64 {
    1
}

fn default_persona_name() -> String {
    "Board Bot".to_string()
}

fn default_persona_instructions() -> String {
    "You are a long-time regular of an online discussion board. Read the post or \
     conversation you are given, including any images, and write one short, \
     conversational reply of at most 50 words in the language of the conversation. \
     Do not use hashtags and do not introduce yourself."
        .to_string()
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_dedup_reset_secs() -> u64 {
    3600
}

fn default_startup_lookback_secs() -> u64 {
    300
}

fn default_max_dedup_entries() -> usize {
    10_000
}

/// Read an optional variable, falling back when unset or unparsable
fn var_or<T: FromStr>(name: &str, default: impl FnOnce() -> T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(default)
}

/// Read an optional variable; blank values count as unset
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// Snowflake worker id; unset means 0, anything outside `0..=1023` is rejected
fn parse_worker_id(raw: Option<&str>) -> Result<u16, ConfigError> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|id| *id <= Snowflake::MAX_WORKER_ID)
        .ok_or_else(|| {
            ConfigError::InvalidValue(
                "WORKER_ID",
                format!("{} is not between 0 and {}", raw.trim(), Snowflake::MAX_WORKER_ID),
            )
        })
}

fn comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let worker_id = parse_worker_id(non_empty_var("WORKER_ID").as_deref())?;

        let persona_id = match non_empty_var("AGENT_PERSONA_ID") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(id) if id > 0 => id,
                _ => return Err(ConfigError::InvalidValue("AGENT_PERSONA_ID", raw)),
            },
            None => default_persona_id(),
        };

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: env::var("API_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or(ConfigError::MissingVar("API_PORT"))?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: var_or("DATABASE_MAX_CONNECTIONS", default_max_connections),
                min_connections: var_or("DATABASE_MIN_CONNECTIONS", default_min_connections),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?,
                token_expiry: var_or("JWT_TOKEN_EXPIRY", default_token_expiry),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: var_or(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second,
                ),
                burst: var_or("RATE_LIMIT_BURST", default_burst),
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|s| comma_list(&s))
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig { worker_id },
            agent: AgentConfig {
                enabled: var_or("AGENT_ENABLED", default_true),
                api_key: non_empty_var("GEMINI_API_KEY"),
                model: non_empty_var("AGENT_MODEL").unwrap_or_else(default_agent_model),
                api_base_url: non_empty_var("AGENT_API_BASE_URL")
                    .unwrap_or_else(default_agent_api_base_url),
                persona: PersonaConfig {
                    id: persona_id,
                    name: non_empty_var("AGENT_PERSONA_NAME").unwrap_or_else(default_persona_name),
                    aliases: env::var("AGENT_PERSONA_ALIASES")
                        .map(|s| comma_list(&s))
                        .unwrap_or_default(),
                    avatar: non_empty_var("AGENT_PERSONA_AVATAR"),
                    bio: env::var("AGENT_PERSONA_BIO").unwrap_or_default(),
                    instructions: non_empty_var("AGENT_PERSONA_INSTRUCTIONS")
                        .unwrap_or_else(default_persona_instructions),
                },
                poll_interval_secs: var_or("AGENT_POLL_INTERVAL_SECS", default_poll_interval_secs),
                request_timeout_secs: var_or(
                    "AGENT_REQUEST_TIMEOUT_SECS",
                    default_request_timeout_secs,
                ),
                dedup_reset_secs: var_or("AGENT_DEDUP_RESET_SECS", default_dedup_reset_secs),
                startup_lookback_secs: var_or(
                    "AGENT_STARTUP_LOOKBACK_SECS",
                    default_startup_lookback_secs,
                ),
                max_dedup_entries: var_or("AGENT_MAX_DEDUP_ENTRIES", default_max_dedup_entries),
            },
            notifications: NotificationConfig {
                interactions_limit: var_or("INTERACTIONS_LIMIT", default_interactions_limit),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
