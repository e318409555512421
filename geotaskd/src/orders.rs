//! Order Lifecycle Manager: creation, radius queries, counting and expiry.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use geotask_domain::{Order, Point};
use geotask_store::{DistanceUnit, OrderRepository};
use geotask_zone::ZoneGuard;
use rand::Rng;
use tracing::{debug, info};

use crate::error::ServiceResult;

/// Order price range.
pub const ORDER_PRICE: Range<f64> = 1000.0..3000.0;

/// Delivery price range.
pub const DELIVERY_PRICE: Range<f64> = 100.0..500.0;

// =============================================================================
// Order Lifecycle
// =============================================================================

/// Order lifecycle operations.
#[async_trait]
pub trait OrderLifecycle: Send + Sync {
    /// Create and persist an order at a random allowed location.
    async fn generate_order(&self) -> ServiceResult<Order>;

    /// Persist an order with the configured lifetime.
    async fn save(&self, order: &Order) -> ServiceResult<()>;

    /// Orders within `radius` of `center`; empty when none qualify.
    async fn get_by_radius(
        &self,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
    ) -> ServiceResult<Vec<Order>>;

    /// Number of live orders.
    async fn get_count(&self) -> ServiceResult<i64>;

    /// Prune orders older than the configured lifetime, returning how many.
    async fn remove_old_orders(&self) -> ServiceResult<usize>;
}

/// Lifecycle manager backed by an order repository and a zone guard.
pub struct OrderService<R: OrderRepository> {
    repository: Arc<R>,
    zones: Arc<dyn ZoneGuard>,
    max_age: Duration,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repository: Arc<R>, zones: Arc<dyn ZoneGuard>, max_age: Duration) -> Self {
        Self {
            repository,
            zones,
            max_age,
        }
    }
}

fn random_prices() -> (f64, f64) {
    let mut rng = rand::thread_rng();
    (rng.gen_range(ORDER_PRICE), rng.gen_range(DELIVERY_PRICE))
}

#[async_trait]
impl<R: OrderRepository + 'static> OrderLifecycle for OrderService<R> {
    async fn generate_order(&self) -> ServiceResult<Order> {
        let id = self.repository.generate_unique_id().await?;
        let location = self.zones.random_allowed_point()?;
        let (price, delivery_price) = random_prices();

        let order = Order::new(id, price, delivery_price, location, Utc::now());
        self.save(&order).await?;

        debug!(order_id = id, %location, price, delivery_price, "Order generated");
        Ok(order)
    }

    async fn save(&self, order: &Order) -> ServiceResult<()> {
        self.repository.save(order, self.max_age).await?;
        Ok(())
    }

    async fn get_by_radius(
        &self,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
    ) -> ServiceResult<Vec<Order>> {
        Ok(self.repository.get_by_radius(center, radius, unit).await?)
    }

    async fn get_count(&self) -> ServiceResult<i64> {
        Ok(self.repository.get_count().await?)
    }

    async fn remove_old_orders(&self) -> ServiceResult<usize> {
        let removed = self.repository.remove_old_orders(self.max_age).await?;
        if removed > 0 {
            info!(removed, "Removed old orders");
        }
        Ok(removed)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use geotask_store::{MemoryStore, OrderStorage};
    use geotask_zone::{Polygon, ZoneSet};

    const MAX_AGE: Duration = Duration::from_secs(120);

    fn service(zones: ZoneSet) -> OrderService<OrderStorage<MemoryStore>> {
        let repository = Arc::new(OrderStorage::new(Arc::new(MemoryStore::new())));
        OrderService::new(repository, Arc::new(zones), MAX_AGE)
    }

    fn aged(id: i64, location: Point, age_secs: i64) -> Order {
        Order::new(id, 1200.0, 150.0, location, Utc::now() - chrono::Duration::seconds(age_secs))
    }

    #[tokio::test]
    async fn test_generate_order_ranges_and_location() {
        let zones = ZoneSet::operational_area();
        let orders = service(zones.clone());

        for expected_id in 1..=50 {
            let order = orders.generate_order().await.unwrap();

            assert_eq!(order.id, expected_id);
            assert!(ORDER_PRICE.contains(&order.price));
            assert!(DELIVERY_PRICE.contains(&order.delivery_price));
            assert!(!order.is_delivered);
            assert!(zones.is_allowed(order.location()));
        }

        assert_eq!(orders.get_count().await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_generated_order_is_visible_nearby() {
        let zones = ZoneSet::new(
            Polygon::from_pairs(&[(0.0, 0.0), (0.001, 0.0), (0.001, 0.001), (0.0, 0.001)]).unwrap(),
            vec![],
        );
        let orders = service(zones);

        let order = orders.generate_order().await.unwrap();
        let found = orders
            .get_by_radius(Point::new(0.0005, 0.0005), 1.0, DistanceUnit::Kilometers)
            .await
            .unwrap();

        assert_eq!(found, vec![order]);
    }

    #[tokio::test]
    async fn test_get_by_radius_empty_is_ok() {
        let orders = service(ZoneSet::operational_area());

        let found = orders
            .get_by_radius(Point::new(59.93, 30.36), 2800.0, DistanceUnit::Meters)
            .await
            .unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_remove_old_orders_uses_configured_age() {
        let orders = service(ZoneSet::operational_area());
        let p = Point::new(59.93, 30.36);
        orders.save(&aged(1, p, 200)).await.unwrap();
        orders.save(&aged(2, p, 50)).await.unwrap();

        assert_eq!(orders.remove_old_orders().await.unwrap(), 1);
        assert_eq!(orders.get_count().await.unwrap(), 1);

        let ids: Vec<i64> = orders
            .get_by_radius(p, 100.0, DistanceUnit::Meters)
            .await
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![2]);
    }
}
