//! Domain Entities for GeoTask
//!
//! The singleton courier, delivery orders and the composed status view.

use crate::value_objects::Point;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique, strictly increasing order identifier
pub type OrderId = i64;

/// Where a courier is placed when nothing has been persisted yet.
pub const DEFAULT_COURIER_LOCATION: Point = Point::new(59.9311, 30.3609);

// =============================================================================
// Courier
// =============================================================================

/// The single courier moving through the operational area.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Courier {
    pub score: i64,
    pub location: Point,
}

impl Courier {
    /// Create a courier with zero score at `location`.
    pub fn new(location: Point) -> Self {
        Self { score: 0, location }
    }

    /// Courier synthesized when none is persisted.
    pub fn at_default_location() -> Self {
        Self::new(DEFAULT_COURIER_LOCATION)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A transient delivery order.
///
/// Orders are immutable after creation and disappear once older than the
/// configured maximum age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub price: f64,
    pub delivery_price: f64,
    pub lat: f64,
    pub lng: f64,
    pub is_delivered: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create an undelivered order at `location`.
    pub fn new(
        id: OrderId,
        price: f64,
        delivery_price: f64,
        location: Point,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            price,
            delivery_price,
            lat: location.lat,
            lng: location.lng,
            is_delivered: false,
            created_at,
        }
    }

    /// Order coordinates as a point.
    pub fn location(&self) -> Point {
        Point::new(self.lat, self.lng)
    }
}

// =============================================================================
// Courier Status
// =============================================================================

/// Client-facing view: the courier and the orders visible around it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CourierStatus {
    pub courier: Courier,
    pub orders: Vec<Order>,
}

// =============================================================================
// Tests
// =============================================================================
