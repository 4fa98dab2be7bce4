use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

#[derive(Debug)]
pub enum ConfigError {
    Missing(String),
    Invalid(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} environment variable is required", key),
            ConfigError::Invalid(key, value) => write!(f, "Invalid value for {}: {:?}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub enum DatabaseTarget {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        name: String,
    },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub target: DatabaseTarget,
    pub pool_size: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match &self.target {
            DatabaseTarget::Url(url) => PgConnectOptions::from_str(url),
            DatabaseTarget::Parts {
                host,
                port,
                user,
                password,
                name,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(name)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash-preview-05-20".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub bind_addr: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub analysis: AnalysisConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::Missing(key.to_string()));

        let target = match get("DATABASE_URL") {
            Some(url) => DatabaseTarget::Url(url),
            None => DatabaseTarget::Parts {
                host: get("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
                port: parse_or(&get, "DB_PORT", 5432)?,
                user: require("DB_USER")?,
                password: get("DB_PASSWORD").unwrap_or_default(),
                name: require("DB_NAME")?,
            },
        };

        let defaults = AnalysisConfig::default();
        let analysis = AnalysisConfig {
            api_base: get("GEMINI_API_BASE").unwrap_or(defaults.api_base),
            model: get("GEMINI_MODEL").unwrap_or(defaults.model),
            api_key: get("GEMINI_API_KEY").unwrap_or_default(),
            timeout: Duration::from_secs(parse_or(&get, "ANALYSIS_TIMEOUT_SECS", 30)?),
        };

        Ok(Self {
            database: DatabaseConfig {
                target,
                pool_size: parse_or(&get, "DB_POOL_SIZE", 10)?,
            },
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&get, "PORT", 3000)?,
            static_dir: PathBuf::from(get("STATIC_DIR").unwrap_or_else(|| "public".to_string())),
            analysis,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key.to_string(), value)),
        None => Ok(default),
    }
}
