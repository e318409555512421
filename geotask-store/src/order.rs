//! Order persistence.
//!
//! Every order is written three times:
//! 1. value record `order:{id}` expiring after the max age,
//! 2. geo index `orders:geo` entry for radius queries,
//! 3. ordered set `orders` entry scored by creation time (epoch seconds),
//!    used for O(1) counting and for expiry scans.
//!
//! The writes are not transactional. A value record whose index entries
//! were never written is invisible to radius queries and expires on its TTL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use geotask_domain::{Order, OrderId, Point};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::geo::{DistanceUnit, GeoStore};
use crate::repository::OrderRepository;

/// Counter key for order IDs.
pub const ORDER_ID_KEY: &str = "order:id";
/// Geo index of live orders.
pub const ORDERS_GEO_KEY: &str = "orders:geo";
/// Ordered set of live orders scored by creation time.
pub const ORDERS_SET_KEY: &str = "orders";

const ORDER_KEY_PREFIX: &str = "order";

/// Value record key for an order.
pub fn order_key(id: OrderId) -> String {
    format!("{}:{}", ORDER_KEY_PREFIX, id)
}

/// Order repository over any `GeoStore`.
pub struct OrderStorage<S: GeoStore> {
    store: Arc<S>,
}

impl<S: GeoStore> OrderStorage<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn fetch(&self, key: &str) -> Result<Option<Order>, StoreError> {
        match self.store.get(key).await? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<S: GeoStore> OrderRepository for OrderStorage<S> {
    async fn save(&self, order: &Order, max_age: Duration) -> Result<(), StoreError> {
        let data = serde_json::to_vec(order)?;
        let key = order_key(order.id);

        self.store.set(&key, &data, Some(max_age)).await?;
        self.store.geo_add(ORDERS_GEO_KEY, &key, order.location()).await?;
        self.store
            .zadd(ORDERS_SET_KEY, &key, order.created_at.timestamp() as f64)
            .await?;

        debug!(order_id = order.id, "Order saved");
        Ok(())
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.fetch(&order_key(id)).await
    }

    async fn generate_unique_id(&self) -> Result<OrderId, StoreError> {
        self.store.incr(ORDER_ID_KEY).await
    }

    async fn get_by_radius(
        &self,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
    ) -> Result<Vec<Order>, StoreError> {
        let hits = self.store.geo_radius(ORDERS_GEO_KEY, center, radius, unit).await?;

        let mut orders = Vec::with_capacity(hits.len());
        for hit in hits {
            match self.fetch(&hit.member).await {
                Ok(Some(order)) => orders.push(order),
                // Expired value record, index not pruned yet
                Ok(None) => {},
                Err(e) => {
                    warn!(member = %hit.member, error = %e, "Skipping unreadable order");
                },
            }
        }

        Ok(orders)
    }

    async fn get_count(&self) -> Result<i64, StoreError> {
        self.store.zcard(ORDERS_SET_KEY).await
    }

    async fn remove_old_orders(&self, max_age: Duration) -> Result<usize, StoreError> {
        let cutoff = (Utc::now().timestamp() - max_age.as_secs() as i64) as f64;

        let old = self
            .store
            .zrange_by_score(ORDERS_SET_KEY, f64::NEG_INFINITY, cutoff)
            .await?;
        if old.is_empty() {
            return Ok(0);
        }

        // Value records expire on their own TTL; only the indexes need pruning.
        self.store.zrem(ORDERS_GEO_KEY, &old).await?;
        self.store
            .zrem_range_by_score(ORDERS_SET_KEY, f64::NEG_INFINITY, cutoff)
            .await?;

        debug!(removed = old.len(), cutoff, "Pruned old orders");
        Ok(old.len())
    }
}

// =============================================================================
// Tests
// =============================================================================
