//! Facade consumed by the transport layer.
//!
//! Composes the courier tracker and the order lifecycle manager. Failures
//! are logged and swallowed: status reads degrade to partial or empty
//! views, and moves are fire-and-forget.

use std::sync::Arc;

use async_trait::async_trait;
use geotask_domain::CourierStatus;
use geotask_store::DistanceUnit;
use tracing::warn;

use crate::orders::OrderLifecycle;
use crate::tracker::CourierTracker;

/// Client-facing courier operations.
#[async_trait]
pub trait CourierFacade: Send + Sync {
    /// The courier and the orders visible around it.
    async fn get_status(&self) -> CourierStatus;

    /// Move the courier; failures are logged, never returned.
    async fn move_courier(&self, direction: i32, zoom: i32);
}

pub struct CourierFacadeService {
    tracker: Arc<dyn CourierTracker>,
    orders: Arc<dyn OrderLifecycle>,
    visibility_radius_m: f64,
}

impl CourierFacadeService {
    pub fn new(
        tracker: Arc<dyn CourierTracker>,
        orders: Arc<dyn OrderLifecycle>,
        visibility_radius_m: f64,
    ) -> Self {
        Self {
            tracker,
            orders,
            visibility_radius_m,
        }
    }
}

#[async_trait]
impl CourierFacade for CourierFacadeService {
    async fn get_status(&self) -> CourierStatus {
        let courier = match self.tracker.get_courier().await {
            Ok(courier) => courier,
            Err(e) => {
                warn!(error = %e, "Courier read failed, returning empty status");
                return CourierStatus::default();
            },
        };

        let orders = match self
            .orders
            .get_by_radius(courier.location, self.visibility_radius_m, DistanceUnit::Meters)
            .await
        {
            Ok(orders) => orders,
            Err(e) => {
                warn!(error = %e, "Order query failed, returning courier only");
                Vec::new()
            },
        };

        CourierStatus { courier, orders }
    }

    async fn move_courier(&self, direction: i32, zoom: i32) {
        let courier = match self.tracker.get_courier().await {
            Ok(courier) => courier,
            Err(e) => {
                warn!(error = %e, "Courier read failed, move dropped");
                return;
            },
        };

        if let Err(e) = self.tracker.move_courier(courier, direction, zoom).await {
            warn!(error = %e, direction, zoom, "Move failed");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ServiceError, ServiceResult};
    use crate::orders::OrderService;
    use crate::tracker::CourierService;
    use chrono::Utc;
    use geotask_domain::{Courier, Order, Point};
    use geotask_store::{CourierStorage, MemoryStore, OrderStorage, StoreError};
    use geotask_zone::ZoneSet;
    use std::time::Duration;

    /// Tracker whose store is down.
    struct UnavailableTracker;

    #[async_trait]
    impl CourierTracker for UnavailableTracker {
        async fn get_courier(&self) -> ServiceResult<Courier> {
            Err(ServiceError::Store(StoreError::Connection("refused".to_string())))
        }

        async fn move_courier(&self, _: Courier, _: i32, _: i32) -> ServiceResult<Courier> {
            Err(ServiceError::Store(StoreError::Connection("refused".to_string())))
        }
    }

    /// Order manager whose radius query always fails.
    struct BrokenOrders;

    #[async_trait]
    impl OrderLifecycle for BrokenOrders {
        async fn generate_order(&self) -> ServiceResult<Order> {
            Err(ServiceError::Store(StoreError::Timeout(Duration::from_millis(500))))
        }

        async fn save(&self, _: &Order) -> ServiceResult<()> {
            Ok(())
        }

        async fn get_by_radius(&self, _: Point, _: f64, _: DistanceUnit) -> ServiceResult<Vec<Order>> {
            Err(ServiceError::Store(StoreError::Timeout(Duration::from_millis(500))))
        }

        async fn get_count(&self) -> ServiceResult<i64> {
            Ok(0)
        }

        async fn remove_old_orders(&self) -> ServiceResult<usize> {
            Ok(0)
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        tracker: Arc<dyn CourierTracker>,
        orders: Arc<dyn OrderLifecycle>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let zones = Arc::new(ZoneSet::operational_area());
        Fixture {
            tracker: Arc::new(CourierService::new(
                Arc::new(CourierStorage::new(store.clone())),
                zones.clone(),
            )),
            orders: Arc::new(OrderService::new(
                Arc::new(OrderStorage::new(store.clone())),
                zones,
                Duration::from_secs(120),
            )),
            store,
        }
    }

    #[tokio::test]
    async fn test_status_includes_only_visible_orders() {
        let f = fixture();
        let courier = f.tracker.get_courier().await.unwrap();
        let near = Point::new(courier.location.lat + 0.01, courier.location.lng); // ~1.1 km
        let far = Point::new(courier.location.lat + 0.05, courier.location.lng); // ~5.6 km
        f.orders.save(&Order::new(1, 1500.0, 200.0, near, Utc::now())).await.unwrap();
        f.orders.save(&Order::new(2, 1500.0, 200.0, far, Utc::now())).await.unwrap();
        let facade = CourierFacadeService::new(f.tracker, f.orders, 2800.0);

        let status = facade.get_status().await;

        assert_eq!(status.courier, courier);
        assert_eq!(status.orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn test_move_persists() {
        let f = fixture();
        let before = f.tracker.get_courier().await.unwrap();
        let facade = CourierFacadeService::new(f.tracker.clone(), f.orders, 2800.0);

        facade.move_courier(0, 14).await;

        let after = f.tracker.get_courier().await.unwrap();
        assert!((after.location.lat - (before.location.lat + 0.001)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_move_with_invalid_direction_is_swallowed() {
        let f = fixture();
        let before = f.tracker.get_courier().await.unwrap();
        let values_before = f.store.value_count();
        let facade = CourierFacadeService::new(f.tracker.clone(), f.orders, 2800.0);

        facade.move_courier(9, 14).await;

        assert_eq!(f.tracker.get_courier().await.unwrap(), before);
        assert_eq!(f.store.value_count(), values_before);
    }

    #[tokio::test]
    async fn test_status_when_courier_read_fails_is_empty() {
        let f = fixture();
        let facade = CourierFacadeService::new(Arc::new(UnavailableTracker), f.orders, 2800.0);

        let status = facade.get_status().await;

        assert_eq!(status, CourierStatus::default());
        facade.move_courier(0, 14).await;
    }

    #[tokio::test]
    async fn test_status_when_order_query_fails_keeps_courier() {
        let f = fixture();
        let courier = f.tracker.get_courier().await.unwrap();
        let facade = CourierFacadeService::new(f.tracker, Arc::new(BrokenOrders), 2800.0);

        let status = facade.get_status().await;

        assert_eq!(status.courier, courier);
        assert!(status.orders.is_empty());
    }
}
