//! GeoTask Storage Layer
//!
//! Persistence for the courier and delivery orders on top of a small set of
//! key-value, geo-index and ordered-set primitives.
//!
//! # Architecture
//!
//! - **`GeoStore`**: the store primitives (ports)
//! - **In-memory store**: implementation for tests and local runs
//! - **Redis store**: production implementation (feature `redis`)
//! - **Repositories**: courier and order persistence expressed in primitives
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use chrono::Utc;
//! use geotask_domain::{Order, Point};
//! use geotask_store::{DistanceUnit, MemoryStore, OrderRepository, OrderStorage};
//!
//! #[tokio::main]
//! async fn main() {
//!     let orders = OrderStorage::new(Arc::new(MemoryStore::new()));
//!
//!     let id = orders.generate_unique_id().await.unwrap();
//!     let order = Order::new(id, 1500.0, 200.0, Point::new(59.93, 30.36), Utc::now());
//!     orders.save(&order, Duration::from_secs(120)).await.unwrap();
//!
//!     let nearby = orders
//!         .get_by_radius(Point::new(59.93, 30.36), 100.0, DistanceUnit::Meters)
//!         .await
//!         .unwrap();
//!     assert_eq!(nearby.len(), 1);
//! }
//! ```

#![warn(clippy::all)]

// Modules
mod courier;
mod error;
mod geo;
mod memory;
mod order;
#[cfg(feature = "redis")]
mod redis_store;
mod repository;

// Re-exports
pub use courier::{CourierStorage, COURIER_KEY};
pub use error::StoreError;
pub use geo::{haversine_distance, DistanceUnit, GeoHit, GeoStore};
pub use memory::MemoryStore;
pub use order::{order_key, OrderStorage, ORDERS_GEO_KEY, ORDERS_SET_KEY, ORDER_ID_KEY};
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;
pub use repository::{CourierRepository, OrderRepository};
