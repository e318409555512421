//! Repository trait definitions (Ports)
//!
//! These traits define the persistence interface for the courier and orders.
//! Implementations translate them into `GeoStore` primitives; tests may
//! substitute their own doubles.

use std::time::Duration;

use async_trait::async_trait;
use geotask_domain::{Courier, Order, OrderId, Point};

use crate::error::StoreError;
use crate::geo::DistanceUnit;

/// Repository for the singleton courier
#[async_trait]
pub trait CourierRepository: Send + Sync {
    /// Load the courier, `None` if it was never saved
    async fn get_one(&self) -> Result<Option<Courier>, StoreError>;

    /// Save the courier (no expiry)
    async fn save(&self, courier: &Courier) -> Result<(), StoreError>;
}

/// Repository for delivery orders
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist an order: value record expiring after `max_age`, geo index
    /// entry and ordered-set entry scored by creation time
    async fn save(&self, order: &Order, max_age: Duration) -> Result<(), StoreError>;

    /// Find an order by ID, `None` if missing or expired
    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Next order ID (atomic, strictly increasing)
    async fn generate_unique_id(&self) -> Result<OrderId, StoreError>;

    /// Orders within `radius` of `center`, nearest first
    async fn get_by_radius(
        &self,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
    ) -> Result<Vec<Order>, StoreError>;

    /// Number of indexed orders
    async fn get_count(&self) -> Result<i64, StoreError>;

    /// Drop index entries for orders created `max_age` ago or earlier.
    /// Returns how many orders were pruned.
    async fn remove_old_orders(&self, max_age: Duration) -> Result<usize, StoreError>;
}
