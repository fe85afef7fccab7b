//! Application configuration

mod app_config;

pub use app_config::{
    AccessConfig, AppConfig, Argon2Config, DatabaseConfig, IdentityCacheConfig, LogFormat,
    LoggingConfig, PasswordConfig,
};
