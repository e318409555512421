//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{DaemonError, DaemonResult};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Store configuration
    pub store: StoreConfig,

    /// Order lifecycle and worker configuration
    pub orders: OrderConfig,

    /// Zone configuration
    pub zones: ZoneConfig,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Which backend to use
    pub backend: StoreBackend,
    /// Redis host
    pub redis_host: String,
    /// Redis port
    pub redis_port: u16,
    /// Bound on the startup connectivity check
    pub connect_timeout: Duration,
    /// Bound on every store command (Redis backend)
    pub command_timeout: Duration,
}

/// Order lifecycle configuration.
#[derive(Debug, Clone)]
pub struct OrderConfig {
    /// Lifetime of an order
    pub max_age: Duration,
    /// Cleaner tick
    pub clean_interval: Duration,
    /// Generator tick
    pub generate_interval: Duration,
    /// Generator skips ticks while this many orders are live
    pub max_active_orders: i64,
    /// Radius around the courier in which orders are visible (meters)
    pub visibility_radius_m: f64,
}

/// Zone configuration.
#[derive(Debug, Clone)]
pub struct ZoneConfig {
    /// Zone definition file; the built-in operational area when unset
    pub file: Option<PathBuf>,
    /// Rejection sampling cap
    pub max_attempts: u32,
}

/// Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process store
    Memory,
    /// Redis server
    Redis,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let api = Self::load_api_config()?;
        let store = Self::load_store_config()?;
        let orders = Self::load_order_config()?;
        let zones = Self::load_zone_config()?;

        Ok(Self {
            api,
            store,
            orders,
            zones,
            environment,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            store: StoreConfig::default(),
            orders: OrderConfig {
                clean_interval: Duration::from_millis(50),
                generate_interval: Duration::from_millis(10),
                ..OrderConfig::default()
            },
            zones: ZoneConfig::default(),
            environment: Environment::Test,
        }
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("GEOTASK_ENV").unwrap_or_else(|_| "development".to_string());

        match env_str.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid GEOTASK_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }

    fn load_api_config() -> DaemonResult<ApiConfig> {
        let host = env::var("GEOTASK_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = load_env("GEOTASK_API_PORT", 8080u16)?;

        Ok(ApiConfig { host, port })
    }

    fn load_store_config() -> DaemonResult<StoreConfig> {
        let backend_str = env::var("GEOTASK_STORE_BACKEND").unwrap_or_else(|_| "memory".to_string());
        let backend = match backend_str.to_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "redis" => StoreBackend::Redis,
            other => {
                return Err(DaemonError::Config(format!(
                    "Invalid GEOTASK_STORE_BACKEND: {}. Expected: memory, redis",
                    other
                )))
            },
        };

        Ok(StoreConfig {
            backend,
            redis_host: env::var("GEOTASK_REDIS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            redis_port: load_env("GEOTASK_REDIS_PORT", 6379u16)?,
            connect_timeout: load_millis("GEOTASK_STORE_CONNECT_TIMEOUT_MS", 100)?,
            command_timeout: load_millis("GEOTASK_STORE_COMMAND_TIMEOUT_MS", 500)?,
        })
    }

    fn load_order_config() -> DaemonResult<OrderConfig> {
        let max_age = load_secs("GEOTASK_ORDER_MAX_AGE_SECS", 120)?;
        let visibility_radius_m = load_env("GEOTASK_VISIBILITY_RADIUS_M", 2800.0f64)?;

        if visibility_radius_m <= 0.0 || !visibility_radius_m.is_finite() {
            return Err(DaemonError::Config(format!(
                "Invalid GEOTASK_VISIBILITY_RADIUS_M: {}",
                visibility_radius_m
            )));
        }

        Ok(OrderConfig {
            max_age,
            clean_interval: load_millis("GEOTASK_ORDER_CLEAN_INTERVAL_MS", 5000)?,
            generate_interval: load_millis("GEOTASK_ORDER_GENERATE_INTERVAL_MS", 1000)?,
            max_active_orders: load_env("GEOTASK_MAX_ACTIVE_ORDERS", 200i64)?,
            visibility_radius_m,
        })
    }

    fn load_zone_config() -> DaemonResult<ZoneConfig> {
        Ok(ZoneConfig {
            file: env::var("GEOTASK_ZONES_FILE").ok().map(PathBuf::from),
            max_attempts: load_env("GEOTASK_ZONE_MAX_ATTEMPTS", geotask_zone::DEFAULT_MAX_ATTEMPTS)?,
        })
    }
}

fn load_env<T: FromStr>(key: &str, default: T) -> DaemonResult<T> {
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
        Err(_) => Ok(default),
    }
}

/// Millisecond durations must be positive; a zero interval panics in tokio.
fn load_millis(key: &str, default: u64) -> DaemonResult<Duration> {
    match load_env(key, default)? {
        0 => Err(DaemonError::Config(format!("{} must be greater than zero", key))),
        ms => Ok(Duration::from_millis(ms)),
    }
}

/// Whole-second lifetimes must be positive; Redis rejects a zero expiry.
fn load_secs(key: &str, default: u64) -> DaemonResult<Duration> {
    match load_env(key, default)? {
        0 => Err(DaemonError::Config(format!("{} must be greater than zero", key))),
        secs => Ok(Duration::from_secs(secs)),
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            connect_timeout: Duration::from_millis(100),
            command_timeout: Duration::from_millis(500),
        }
    }
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(120),
            clean_interval: Duration::from_secs(5),
            generate_interval: Duration::from_secs(1),
            max_active_orders: 200,
            visibility_radius_m: 2800.0,
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            file: None,
            max_attempts: geotask_zone::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            store: StoreConfig::default(),
            orders: OrderConfig::default(),
            zones: ZoneConfig::default(),
            environment: Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Redis => write!(f, "redis"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
