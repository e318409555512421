//! Daemon: Main runtime orchestrator.
//!
//! The Daemon ties together all components:
//! - Zone set (built-in area or zone file)
//! - Store (in-memory or Redis)
//! - Courier tracker, order lifecycle manager and facade
//! - Background workers (cleaner, generator)
//! - API Server (HTTP endpoints)
//!
//! # Lifecycle
//!
//! 1. Load zones and build the store
//! 2. Check store connectivity (bounded, fatal on failure)
//! 3. Start workers, each with its own child cancellation token
//! 4. Start API server
//! 5. Wait for SIGINT or cancellation
//! 6. Cancel workers and wait for them to stop

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use geotask_store::{CourierStorage, GeoStore, MemoryStore, OrderStorage};
use geotask_zone::ZoneSet;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::api::{create_router, ApiState};
use crate::config::{Config, StoreBackend, ZoneConfig};
use crate::error::{DaemonError, DaemonResult};
use crate::facade::{CourierFacade, CourierFacadeService};
use crate::orders::{OrderLifecycle, OrderService};
use crate::tracker::{CourierService, CourierTracker};
use crate::workers::{OrderCleaner, OrderGenerator};

// =============================================================================
// Daemon
// =============================================================================

/// The main GeoTask daemon.
pub struct Daemon {
    /// Configuration
    config: Config,
    /// Client-facing facade
    facade: Arc<dyn CourierFacade>,
    /// Order lifecycle manager driven by the workers
    orders: Arc<dyn OrderLifecycle>,
    /// Parent of every worker token
    shutdown: CancellationToken,
}

impl Daemon {
    /// Build the daemon from configuration, selecting the store backend.
    pub async fn from_config(config: Config) -> DaemonResult<Self> {
        let zones = Arc::new(load_zones(&config.zones)?);

        match config.store.backend {
            StoreBackend::Memory => Self::with_store(config, Arc::new(MemoryStore::new()), zones).await,
            StoreBackend::Redis => Self::with_redis(config, zones).await,
        }
    }

    #[cfg(feature = "redis")]
    async fn with_redis(config: Config, zones: Arc<ZoneSet>) -> DaemonResult<Self> {
        let url = geotask_store::RedisStore::url(&config.store.redis_host, config.store.redis_port);
        let store = geotask_store::RedisStore::new(&url, config.store.command_timeout)
            .map_err(|e| DaemonError::StoreUnavailable(format!("{}: {}", url, e)))?;

        Self::with_store(config, Arc::new(store), zones).await
    }

    #[cfg(not(feature = "redis"))]
    async fn with_redis(_config: Config, _zones: Arc<ZoneSet>) -> DaemonResult<Self> {
        Err(DaemonError::Config(
            "GEOTASK_STORE_BACKEND=redis requires building with the `redis` feature".to_string(),
        ))
    }

    /// Build the daemon over an existing store.
    ///
    /// Fails with `StoreUnavailable` when the store does not answer a ping
    /// within the configured connect timeout.
    pub async fn with_store<S: GeoStore + 'static>(
        config: Config,
        store: Arc<S>,
        zones: Arc<ZoneSet>,
    ) -> DaemonResult<Self> {
        check_store(store.as_ref(), config.store.connect_timeout).await?;

        let tracker: Arc<dyn CourierTracker> = Arc::new(CourierService::new(
            Arc::new(CourierStorage::new(store.clone())),
            zones.clone(),
        ));
        let orders: Arc<dyn OrderLifecycle> = Arc::new(OrderService::new(
            Arc::new(OrderStorage::new(store)),
            zones,
            config.orders.max_age,
        ));
        let facade: Arc<dyn CourierFacade> = Arc::new(CourierFacadeService::new(
            tracker,
            orders.clone(),
            config.orders.visibility_radius_m,
        ));

        Ok(Self {
            config,
            facade,
            orders,
            shutdown: CancellationToken::new(),
        })
    }

    /// Token that stops the daemon when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// The facade served by the API.
    pub fn facade(&self) -> Arc<dyn CourierFacade> {
        self.facade.clone()
    }

    /// Run the daemon.
    ///
    /// This method blocks until shutdown is requested (SIGINT or the
    /// shutdown token).
    pub async fn run(self) -> DaemonResult<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            store = %self.config.store.backend,
            "Starting GeoTask daemon"
        );

        // 1. Start workers
        let cleaner = OrderCleaner::new(self.orders.clone(), self.config.orders.clean_interval)
            .spawn(self.shutdown.child_token());
        let generator = OrderGenerator::new(
            self.orders.clone(),
            self.config.orders.generate_interval,
            self.config.orders.max_active_orders,
        )
        .spawn(self.shutdown.child_token());

        // 2. Start API server
        let api_addr = self.start_api_server().await?;
        info!(%api_addr, "API server started");

        // 3. Wait for shutdown
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
            }
            _ = self.shutdown.cancelled() => {
                info!("Shutdown requested");
            }
        }

        // 4. Graceful shutdown
        self.shutdown.cancel();
        for (name, handle) in [("cleaner", cleaner), ("generator", generator)] {
            if let Err(e) = handle.await {
                error!(worker = name, error = %e, "Worker task failed");
            }
        }

        info!("Shutdown complete");
        Ok(())
    }

    /// Start the API server; it stops when the shutdown token is cancelled.
    async fn start_api_server(&self) -> DaemonResult<SocketAddr> {
        let state = Arc::new(ApiState {
            facade: self.facade.clone(),
        });

        let router = create_router(state);
        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);

        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            DaemonError::Config(format!("Failed to bind to {}: {}", addr, e))
        })?;

        let local_addr = listener.local_addr()?;
        let shutdown = self.shutdown.clone();

        // Spawn the server task
        tokio::spawn(async move {
            let server = axum::serve(listener, router)
                .with_graceful_shutdown(async move { shutdown.cancelled().await });
            if let Err(e) = server.await {
                error!(error = %e, "API server error");
            }
        });

        Ok(local_addr)
    }
}

/// Zones from the configured file, or the built-in operational area.
pub fn load_zones(config: &ZoneConfig) -> DaemonResult<ZoneSet> {
    let zones = match &config.file {
        Some(path) => {
            let zones = ZoneSet::load(path).map_err(|e| {
                DaemonError::Config(format!("Failed to load zones from {}: {}", path.display(), e))
            })?;
            info!(path = %path.display(), disallowed = zones.disallowed().len(), "Loaded zone file");
            zones
        },
        None => ZoneSet::operational_area(),
    };

    Ok(zones.with_max_attempts(config.max_attempts))
}

/// Ping the store, failing if it does not answer within `timeout`.
async fn check_store<S: GeoStore + ?Sized>(store: &S, timeout: Duration) -> DaemonResult<()> {
    match tokio::time::timeout(timeout, store.ping()).await {
        Ok(Ok(())) => {
            info!("Store reachable");
            Ok(())
        },
        Ok(Err(e)) => Err(DaemonError::StoreUnavailable(e.to_string())),
        Err(_) => Err(DaemonError::StoreUnavailable(format!(
            "no reply within {}ms",
            timeout.as_millis()
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================
