//! GeoTask Daemon
//!
//! Simulates a courier and delivery orders inside a geofenced area and
//! serves them over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Start with default configuration (in-memory store)
//! cargo run -p geotaskd
//!
//! # Against Redis, JSON logs
//! GEOTASK_STORE_BACKEND=redis GEOTASK_LOG_FORMAT=json cargo run -p geotaskd --features redis
//! ```
//!
//! # Environment Variables
//!
//! - `GEOTASK_ENV`: Environment (test, development, production)
//! - `GEOTASK_API_HOST` / `GEOTASK_API_PORT`: API bind (default: 0.0.0.0:8080)
//! - `GEOTASK_STORE_BACKEND`: memory or redis (default: memory)
//! - `GEOTASK_REDIS_HOST` / `GEOTASK_REDIS_PORT`: Redis (default: 127.0.0.1:6379)
//! - `GEOTASK_STORE_CONNECT_TIMEOUT_MS`: Startup ping bound (default: 100)
//! - `GEOTASK_STORE_COMMAND_TIMEOUT_MS`: Per-command bound (default: 500)
//! - `GEOTASK_ORDER_MAX_AGE_SECS`: Order lifetime (default: 120)
//! - `GEOTASK_ORDER_CLEAN_INTERVAL_MS`: Cleaner tick (default: 5000)
//! - `GEOTASK_ORDER_GENERATE_INTERVAL_MS`: Generator tick (default: 1000)
//! - `GEOTASK_MAX_ACTIVE_ORDERS`: Generator cap (default: 200)
//! - `GEOTASK_VISIBILITY_RADIUS_M`: Status radius (default: 2800)
//! - `GEOTASK_ZONES_FILE`: Zone definition file (default: built-in area)
//! - `GEOTASK_ZONE_MAX_ATTEMPTS`: Sampling cap (default: 10000)
//! - `GEOTASK_LOG_FORMAT`: `json` for JSON logs

use geotaskd::{Config, Daemon};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    let filter = EnvFilter::from_default_env().add_directive("geotaskd=info".parse()?);
    let json = std::env::var("GEOTASK_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::registry().with(fmt::layer().json()).with(filter).init();
    } else {
        tracing_subscriber::registry().with(fmt::layer()).with(filter).init();
    }

    // Load configuration
    let config = Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        api_host = %config.api.host,
        api_port = config.api.port,
        store = %config.store.backend,
        "GeoTask Daemon"
    );

    // Create and run daemon
    let daemon = Daemon::from_config(config).await?;
    daemon.run().await?;

    Ok(())
}
