//! Configuration management for the Filing Diff server

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub sec: SecConfig,
    pub cache: CacheConfig,
    pub rate: RateConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Upstream EDGAR access
#[derive(Debug, Clone)]
pub struct SecConfig {
    /// EDGAR rejects requests without a contact User-Agent
    pub user_agent: String,
    pub data_base_url: String,
    pub www_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub dir: PathBuf,
}

/// Outbound request budget
#[derive(Debug, Clone)]
pub struct RateConfig {
    pub global_per_sec: usize,
    pub host_per_sec: usize,
}

impl SecConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            sec: SecConfig {
                user_agent: "filing-diff-server/0.1 contact@example.com".to_string(),
                data_base_url: "https://data.sec.gov".to_string(),
                www_base_url: "https://www.sec.gov".to_string(),
                timeout_secs: 15,
            },
            cache: CacheConfig {
                dir: PathBuf::from(".cache"),
            },
            rate: RateConfig {
                global_per_sec: 8,
                host_per_sec: 2,
            },
        }
    }
}

/// Parse an optional numeric variable, falling back on absence
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name: name.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: String, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let config = Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
            },
            sec: SecConfig {
                user_agent: env::var("SEC_USER_AGENT").unwrap_or(defaults.sec.user_agent),
                data_base_url: env::var("SEC_DATA_BASE_URL").unwrap_or(defaults.sec.data_base_url),
                www_base_url: env::var("SEC_WWW_BASE_URL").unwrap_or(defaults.sec.www_base_url),
                timeout_secs: parse_var("HTTP_TIMEOUT_SECS", defaults.sec.timeout_secs)?,
            },
            cache: CacheConfig {
                dir: env::var("CACHE_DIR").map(PathBuf::from).unwrap_or(defaults.cache.dir),
            },
            rate: RateConfig {
                global_per_sec: parse_var("RATE_GLOBAL_PER_SEC", defaults.rate.global_per_sec)?,
                host_per_sec: parse_var("RATE_HOST_PER_SEC", defaults.rate.host_per_sec)?,
            },
        };

        if config.rate.global_per_sec == 0 || config.rate.host_per_sec == 0 {
            return Err(ConfigError::Invalid {
                name: "RATE_GLOBAL_PER_SEC/RATE_HOST_PER_SEC".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(config)
    }
}
