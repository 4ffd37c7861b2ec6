//! Process settings from environment variables (a `.env` file is honoured).

use crate::error::ConfigError;
use std::time::Duration;

/// Backing store for resource collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            _ => Err(ConfigError::InvalidSetting {
                key: "STORE",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub store: StoreKind,
    pub database_url: String,
    /// Schema holding the collection tables.
    pub schema: String,
    pub db_max_connections: u32,
    pub db_connect_retries: u32,
    pub db_retry_interval: Duration,
    /// How long one connect attempt may wait for the server.
    pub db_acquire_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0:3000".into(),
            store: StoreKind::Postgres,
            database_url: "postgres://localhost/cms".into(),
            schema: "public".into(),
            db_max_connections: 5,
            db_connect_retries: 10,
            db_retry_interval: Duration::from_millis(500),
            db_acquire_timeout: Duration::from_secs(5),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `BIND_ADDR`, `STORE`, `DATABASE_URL`, `CMS_SCHEMA`,
    /// `DB_MAX_CONNECTIONS`, `DB_CONNECT_RETRIES`, `DB_RETRY_INTERVAL_MS`, `DB_ACQUIRE_TIMEOUT_MS`,
    /// `BODY_LIMIT_BYTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(v) = lookup("BIND_ADDR") {
            config.bind_addr = v;
        }
        if let Some(v) = lookup("STORE") {
            config.store = v.parse()?;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            config.database_url = v;
        }
        if let Some(v) = lookup("CMS_SCHEMA") {
            validate_identifier("CMS_SCHEMA", &v)?;
            config.schema = v;
        }
        if let Some(v) = lookup("DB_MAX_CONNECTIONS") {
            config.db_max_connections = parse_number("DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DB_CONNECT_RETRIES") {
            config.db_connect_retries = parse_number("DB_CONNECT_RETRIES", &v)?;
        }
        if let Some(v) = lookup("DB_RETRY_INTERVAL_MS") {
            config.db_retry_interval = Duration::from_millis(parse_number("DB_RETRY_INTERVAL_MS", &v)?);
        }
        if let Some(v) = lookup("DB_ACQUIRE_TIMEOUT_MS") {
            config.db_acquire_timeout = Duration::from_millis(parse_number("DB_ACQUIRE_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = lookup("BODY_LIMIT_BYTES") {
            config.body_limit_bytes = parse_number("BODY_LIMIT_BYTES", &v)?;
        }
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidSetting {
        key,
        value: value.to_string(),
    })
}

fn validate_identifier(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if crate::config::is_valid_resource_name(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidSetting {
            key,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_use_small_pool_and_half_second_retry() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_retry_interval, Duration::from_millis(500));
        assert_eq!(config.store, StoreKind::Postgres);
    }

    #[test]
    fn overrides_from_environment() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("STORE", "memory"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("DB_RETRY_INTERVAL_MS", "50"),
            ("DB_ACQUIRE_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.db_max_connections, 12);
        assert_eq!(config.db_retry_interval, Duration::from_millis(50));
        assert_eq!(config.db_acquire_timeout, Duration::from_millis(250));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "lots")])),
            Err(ConfigError::InvalidSetting { key: "DB_MAX_CONNECTIONS", .. })
        ));
        assert!(ServerConfig::from_lookup(lookup(&[("STORE", "mongo")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("CMS_SCHEMA", "a;drop")])).is_err());
    }
}
