//! Configuration structs

mod app_config;

pub use app_config::{
    AgentConfig, AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment,
    JwtConfig, NotificationConfig, PersonaConfig, RateLimitConfig, ServerConfig, SnowflakeConfig,
};
