use std::env;
use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is invalid: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub seed_demo_data: bool,
    pub notify_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://timetable.db".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_connections: 5,
            seed_demo_data: false,
            notify_capacity: 64,
        }
    }
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL").unwrap_or(defaults.database_url);
        let bind_addr = parse_var(&lookup, "BIND_ADDR", defaults.bind_addr)?;
        let max_connections = parse_var(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let notify_capacity = parse_var(&lookup, "NOTIFY_CAPACITY", defaults.notify_capacity)?;
        let seed_demo_data = match lookup("SEED_DEMO_DATA") {
            Some(v) => parse_flag(&v)
                .ok_or_else(|| ConfigError::Invalid { key: "SEED_DEMO_DATA", value: v.clone() })?,
            None => defaults.seed_demo_data,
        };

        if notify_capacity == 0 {
            return Err(ConfigError::NotPositive("NOTIFY_CAPACITY"));
        }

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            seed_demo_data,
            notify_capacity,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw.clone() }),
        None => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
