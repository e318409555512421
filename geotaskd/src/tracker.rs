//! Courier Tracker: position reads with self-correction, and movement.
//!
//! The read-validate-correct-write sequence is not transactional. A
//! self-correction racing a concurrent move is last-writer-wins.

use std::sync::Arc;

use async_trait::async_trait;
use geotask_domain::{Courier, Direction, Zoom};
use geotask_store::CourierRepository;
use geotask_zone::ZoneGuard;
use tracing::{debug, info, warn};

use crate::error::ServiceResult;

// =============================================================================
// Courier Tracker
// =============================================================================

/// Courier position tracking.
#[async_trait]
pub trait CourierTracker: Send + Sync {
    /// Load the courier, synthesizing it at the default location if missing
    /// and relocating it if it sits outside the allowed area.
    async fn get_courier(&self) -> ServiceResult<Courier>;

    /// Move `courier` one step in `direction` (0=Up, 1=Down, 2=Left,
    /// 3=Right) at `zoom`, and persist the result.
    async fn move_courier(&self, courier: Courier, direction: i32, zoom: i32)
        -> ServiceResult<Courier>;
}

/// Tracker backed by a courier repository and a zone guard.
pub struct CourierService<R: CourierRepository> {
    repository: Arc<R>,
    zones: Arc<dyn ZoneGuard>,
}

impl<R: CourierRepository> CourierService<R> {
    pub fn new(repository: Arc<R>, zones: Arc<dyn ZoneGuard>) -> Self {
        Self { repository, zones }
    }
}

#[async_trait]
impl<R: CourierRepository + 'static> CourierTracker for CourierService<R> {
    async fn get_courier(&self) -> ServiceResult<Courier> {
        let (mut courier, mut changed) = match self.repository.get_one().await? {
            Some(courier) => (courier, false),
            None => {
                debug!("No courier persisted, using default location");
                (Courier::at_default_location(), true)
            },
        };

        if !self.zones.is_allowed(courier.location) {
            let location = self.zones.random_allowed_point()?;
            warn!(from = %courier.location, to = %location, "Courier outside allowed area, relocated");
            courier.location = location;
            changed = true;
        }

        if changed {
            self.repository.save(&courier).await?;
        }

        Ok(courier)
    }

    async fn move_courier(
        &self,
        mut courier: Courier,
        direction: i32,
        zoom: i32,
    ) -> ServiceResult<Courier> {
        let direction = Direction::try_from(direction)?;
        let zoom = Zoom::new(zoom);

        let target = direction.apply(courier.location, zoom.step());
        courier.location = if target.is_finite() && self.zones.is_allowed(target) {
            target
        } else {
            let location = self.zones.random_allowed_point()?;
            info!(%target, to = %location, "Move left the allowed area, courier relocated");
            location
        };

        self.repository.save(&courier).await?;

        debug!(%direction, zoom = zoom.level(), location = %courier.location, "Courier moved");
        Ok(courier)
    }
}

// =============================================================================
// Tests
// =============================================================================
