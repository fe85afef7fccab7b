use serde::Deserialize;

use crate::domain::{GroupId, HashAlgorithm};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub password: PasswordConfig,
    pub database: DatabaseConfig,
    pub identity_cache: IdentityCacheConfig,
    pub access: AccessConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Password hashing settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Algorithm new credentials and rehashes are written with
    pub default_algorithm: HashAlgorithm,
    pub bcrypt_cost: u32,
    pub argon2: Argon2Config,
    /// Encoded iteration exponent for newly written PHPass hashes
    pub phpass_iteration_log2: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Argon2Config {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; in-memory stores are used when unset
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityCacheConfig {
    pub max_capacity: u64,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Groups granted `core.admin`
    pub super_user_groups: Vec<GroupId>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            default_algorithm: HashAlgorithm::Bcrypt,
            bcrypt_cost: 10,
            argon2: Argon2Config::default(),
            phpass_iteration_log2: 15,
        }
    }
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 4,
            parallelism: 1,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 30,
        }
    }
}

impl Default for IdentityCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            ttl_secs: 300,
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            super_user_groups: vec![GroupId::new(8)],
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
