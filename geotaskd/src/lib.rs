//! GeoTask Daemon Library
//!
//! Courier tracking and order lifecycle services, the background workers
//! that drive them, and the runtime that wires everything together.
//!
//! # Architecture
//!
//! ```text
//! API Server → Facade → Courier Tracker ──┐
//!                  └──→ Order Lifecycle ──┼──→ Zone Engine
//!                            ↑            └──→ Geo Store
//!                  Workers (cleaner, generator)
//! ```
//!
//! # Components
//!
//! - **Daemon**: Main runtime orchestrator
//! - **Tracker**: Courier reads with self-correction, movement
//! - **Orders**: Order creation, radius queries, counting, expiry
//! - **Facade**: Composed status view and fire-and-forget moves
//! - **Workers**: Periodic cleanup and generation
//! - **API**: HTTP endpoints
//! - **Config**: Environment-based configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use geotaskd::{Config, Daemon};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!     let daemon = Daemon::from_config(config).await.expect("Store unavailable");
//!     daemon.run().await.expect("Daemon error");
//! }
//! ```

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;
pub mod facade;
pub mod orders;
pub mod tracker;
pub mod workers;

// Re-exports for convenience
pub use config::{ApiConfig, Config, Environment, OrderConfig, StoreBackend, StoreConfig, ZoneConfig};
pub use daemon::{load_zones, Daemon};
pub use error::{DaemonError, DaemonResult, ServiceError, ServiceResult};
pub use facade::{CourierFacade, CourierFacadeService};
pub use orders::{OrderLifecycle, OrderService, DELIVERY_PRICE, ORDER_PRICE};
pub use tracker::{CourierService, CourierTracker};
pub use workers::{OrderCleaner, OrderGenerator};
