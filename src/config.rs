//! Configuration management for the trust scoring service
//!
//! Values come from environment variables (a `.env` file is loaded by `main`
//! through dotenv). Every section has defaults so the service starts with an
//! in-memory store and cache when nothing is configured.

use crate::error::{Error, Result};
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub scoring: ScoringConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Which persistence backend holds registry, ledger and audit rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    MongoDb { uri: String, database: String },
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
        }
    }
}

/// Which cache sits in front of the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Redis { url: String },
}

/// Verification cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Time-to-live for cached verification results
    pub ttl: Duration,
    /// Interval of the in-memory expiry sweep
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            ttl: Duration::from_secs(15 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// Scoring engine tuning
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// MX lookup deadline
    pub dns_timeout: Duration,
    /// Scores strictly below this value are classified as temporary
    pub temp_threshold: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            dns_timeout: Duration::from_millis(2000),
            temp_threshold: 40,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    pub const SERVER_HOST: &str = "SERVER_HOST";
    pub const SERVER_PORT: &str = "SERVER_PORT";
    pub const STORAGE_BACKEND: &str = "STORAGE_BACKEND";
    pub const MONGODB_URI: &str = "MONGODB_URI";
    pub const DB_NAME: &str = "DB_NAME";
    pub const CACHE_BACKEND: &str = "CACHE_BACKEND";
    pub const REDIS_URL: &str = "REDIS_URL";
    pub const CACHE_TTL_SECS: &str = "CACHE_TTL_SECS";
    pub const CACHE_SWEEP_INTERVAL_SECS: &str = "CACHE_SWEEP_INTERVAL_SECS";
    pub const DNS_TIMEOUT_MS: &str = "DNS_TIMEOUT_MS";
    pub const TEMP_SCORE_THRESHOLD: &str = "TEMP_SCORE_THRESHOLD";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const LOG_JSON: &str = "LOG_JSON";
}

impl AppConfig {
    /// Build the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a value cannot be parsed or a selected
    /// backend is missing its connection settings.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        use env_vars::*;

        let defaults = AppConfig::default();

        let server = ServerConfig {
            host: lookup(SERVER_HOST).unwrap_or(defaults.server.host),
            port: parse_or(&lookup, SERVER_PORT, defaults.server.port)?,
        };

        let storage_backend = match lookup(STORAGE_BACKEND).as_deref() {
            None | Some("memory") => StorageBackend::Memory,
            Some("mongodb") => StorageBackend::MongoDb {
                uri: required(&lookup, MONGODB_URI)?,
                database: lookup(DB_NAME).unwrap_or_else(|| "email_trust".to_string()),
            },
            Some(other) => {
                return Err(Error::Config(format!(
                    "{STORAGE_BACKEND} must be 'memory' or 'mongodb', got '{other}'"
                )));
            }
        };

        let cache_backend = match lookup(CACHE_BACKEND).as_deref() {
            None | Some("memory") => CacheBackend::Memory,
            Some("redis") => CacheBackend::Redis {
                url: required(&lookup, REDIS_URL)?,
            },
            Some(other) => {
                return Err(Error::Config(format!(
                    "{CACHE_BACKEND} must be 'memory' or 'redis', got '{other}'"
                )));
            }
        };

        let cache = CacheConfig {
            backend: cache_backend,
            ttl: Duration::from_secs(parse_or(
                &lookup,
                CACHE_TTL_SECS,
                defaults.cache.ttl.as_secs(),
            )?),
            sweep_interval: Duration::from_secs(nonzero_or(
                &lookup,
                CACHE_SWEEP_INTERVAL_SECS,
                defaults.cache.sweep_interval.as_secs(),
            )?),
        };

        let temp_threshold = parse_or(
            &lookup,
            TEMP_SCORE_THRESHOLD,
            defaults.scoring.temp_threshold,
        )?;
        if !(0..=100).contains(&temp_threshold) {
            return Err(Error::Config(format!(
                "{TEMP_SCORE_THRESHOLD} must be within 0..=100, got {temp_threshold}"
            )));
        }

        let scoring = ScoringConfig {
            dns_timeout: Duration::from_millis(nonzero_or(
                &lookup,
                DNS_TIMEOUT_MS,
                defaults.scoring.dns_timeout.as_millis() as u64,
            )?),
            temp_threshold,
        };

        let logging = LoggingConfig {
            level: lookup(LOG_LEVEL).unwrap_or(defaults.logging.level),
            json: parse_or(&lookup, LOG_JSON, defaults.logging.json)?,
        };

        Ok(Self {
            server,
            storage: StorageConfig {
                backend: storage_backend,
            },
            cache,
            scoring,
            logging,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| Error::Config(format!("{key} must be set")))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} has an invalid value: '{raw}'"))),
        None => Ok(default),
    }
}

/// Like [`parse_or`], but a zero is a configuration error.
fn nonzero_or<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, key, default)? {
        0 => Err(Error::Config(format!("{key} must be greater than zero"))),
        value => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.ttl, Duration::from_secs(900));
        assert_eq!(config.scoring.dns_timeout, Duration::from_millis(2000));
        assert_eq!(config.scoring.temp_threshold, 40);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_mongodb_and_redis_backends() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "mongodb"),
            ("MONGODB_URI", "mongodb://localhost:27017"),
            ("DB_NAME", "trust_test"),
            ("CACHE_BACKEND", "redis"),
            ("REDIS_URL", "redis://127.0.0.1:6379"),
        ]))
        .unwrap();

        assert_eq!(
            config.storage.backend,
            StorageBackend::MongoDb {
                uri: "mongodb://localhost:27017".to_string(),
                database: "trust_test".to_string(),
            }
        );
        assert_eq!(
            config.cache.backend,
            CacheBackend::Redis {
                url: "redis://127.0.0.1:6379".to_string()
            }
        );
    }

    #[test]
    fn test_mongodb_requires_uri() {
        let result = AppConfig::from_lookup(lookup_from(&[("STORAGE_BACKEND", "mongodb")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("CACHE_BACKEND", "memcached")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("DNS_TIMEOUT_MS", "soon")]));
        assert!(matches!(result, Err(Error::Config(_))));

        let result = AppConfig::from_lookup(lookup_from(&[("DNS_TIMEOUT_MS", "0")]));
        assert!(matches!(result, Err(Error::Config(_))));

        let result =
            AppConfig::from_lookup(lookup_from(&[("CACHE_SWEEP_INTERVAL_SECS", "0")]));
        assert!(matches!(result, Err(Error::Config(_))));

        let config = AppConfig::from_lookup(lookup_from(&[
            ("CACHE_SWEEP_INTERVAL_SECS", "1"),
            ("DNS_TIMEOUT_MS", "1"),
        ]))
        .unwrap();
        assert_eq!(config.cache.sweep_interval, Duration::from_secs(1));
        assert_eq!(config.scoring.dns_timeout, Duration::from_millis(1));

        let result = AppConfig::from_lookup(lookup_from(&[("TEMP_SCORE_THRESHOLD", "140")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SERVER_PORT", "9090"),
            ("CACHE_TTL_SECS", "60"),
            ("DNS_TIMEOUT_MS", "500"),
            ("TEMP_SCORE_THRESHOLD", "50"),
            ("LOG_JSON", "true"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.scoring.dns_timeout, Duration::from_millis(500));
        assert_eq!(config.scoring.temp_threshold, 50);
        assert!(config.logging.json);
    }
}
