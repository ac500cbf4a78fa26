//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

// == Run Mode ==
/// Controls how verbose the server is by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Debug,
    Release,
}

impl RunMode {
    /// Default tracing filter when `RUST_LOG` is not set.
    pub fn default_log_filter(self) -> &'static str {
        match self {
            RunMode::Debug => "kv_gateway=debug,tower_http=debug",
            RunMode::Release => "kv_gateway=info,tower_http=info",
        }
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(RunMode::Debug),
            "release" => Ok(RunMode::Release),
            other => Err(format!("unknown run mode '{}'", other)),
        }
    }
}

// == Store Backend ==
/// Which key-value store implementation backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store address, either `host:port` or a `redis://` URL
    pub redis_url: String,
    /// Store password, empty for none
    pub redis_password: String,
    /// Debug or release behaviour
    pub run_mode: RunMode,
    /// HTTP server port
    pub server_port: u16,
    /// Store implementation
    pub store_backend: StoreBackend,
    /// Upper bound on a single store round trip, in milliseconds
    pub store_timeout_ms: u64,
    /// Memory backend expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Report a degraded status when the store is unreachable
    pub health_strict: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Store address (default: localhost:6379)
    /// - `REDIS_PASSWORD` - Store password (default: empty)
    /// - `RUN_MODE` - `debug` or `release` (default: debug)
    /// - `PORT` - HTTP server port (default: 8002)
    /// - `STORE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `STORE_TIMEOUT_MS` - Store call timeout (default: 2000)
    /// - `CLEANUP_INTERVAL` - Memory backend sweep frequency in seconds (default: 1)
    /// - `HEALTH_STRICT` - Propagate store health into /health (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            redis_url: env::var("REDIS_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.redis_url),
            redis_password: env::var("REDIS_PASSWORD").unwrap_or(defaults.redis_password),
            run_mode: parse_var("RUN_MODE").unwrap_or(defaults.run_mode),
            server_port: parse_var("PORT").unwrap_or(defaults.server_port),
            store_backend: parse_var("STORE_BACKEND").unwrap_or(defaults.store_backend),
            store_timeout_ms: parse_var("STORE_TIMEOUT_MS").unwrap_or(defaults.store_timeout_ms),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            health_strict: parse_var("HEALTH_STRICT").unwrap_or(defaults.health_strict),
        }
    }

    /// Store call timeout as a Duration.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: "localhost:6379".to_string(),
            redis_password: String::new(),
            run_mode: RunMode::Debug,
            server_port: 8002,
            store_backend: StoreBackend::Redis,
            store_timeout_ms: 2000,
            cleanup_interval: 1,
            health_strict: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.redis_url, "localhost:6379");
        assert!(config.redis_password.is_empty());
        assert_eq!(config.run_mode, RunMode::Debug);
        assert_eq!(config.server_port, 8002);
        assert_eq!(config.store_backend, StoreBackend::Redis);
        assert_eq!(config.store_timeout(), Duration::from_secs(2));
        assert!(!config.health_strict);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for name in [
            "REDIS_URL",
            "REDIS_PASSWORD",
            "RUN_MODE",
            "PORT",
            "STORE_BACKEND",
            "STORE_TIMEOUT_MS",
            "CLEANUP_INTERVAL",
            "HEALTH_STRICT",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.redis_url, "localhost:6379");
        assert_eq!(config.server_port, 8002);
        assert_eq!(config.store_backend, StoreBackend::Redis);
        assert_eq!(config.cleanup_interval, 1);
    }

    #[test]
    fn test_run_mode_parse() {
        assert_eq!("release".parse::<RunMode>(), Ok(RunMode::Release));
        assert_eq!("DEBUG".parse::<RunMode>(), Ok(RunMode::Debug));
        assert!("test".parse::<RunMode>().is_err());
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert_eq!("Redis".parse::<StoreBackend>(), Ok(StoreBackend::Redis));
        assert!("etcd".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_release_mode_is_quieter() {
        assert!(RunMode::Release.default_log_filter().contains("=info"));
        assert!(RunMode::Debug.default_log_filter().contains("=debug"));
    }
}
