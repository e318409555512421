//! Store primitives (ports).
//!
//! The smallest surface the courier and order repositories need: scalar
//! values with expiry, an atomic counter, a geospatial index and a
//! score-ordered set. Implementations: `MemoryStore`, `RedisStore`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use geotask_domain::Point;

use crate::error::StoreError;

/// Earth radius used by Redis GEO commands, in meters.
const EARTH_RADIUS_M: f64 = 6_372_797.560856;

// =============================================================================
// Distance Unit
// =============================================================================

/// Unit for radius queries and returned distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    Miles,
    Feet,
}

impl DistanceUnit {
    /// Meters per one unit.
    pub fn meters(self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Kilometers => 1000.0,
            DistanceUnit::Miles => 1609.34,
            DistanceUnit::Feet => 0.3048,
        }
    }

    /// Redis unit token.
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Meters => "m",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
            DistanceUnit::Feet => "ft",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Great-circle distance in meters, the way Redis computes GEO distances.
pub fn haversine_distance(a: Point, b: Point) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let u = ((lat2 - lat1) / 2.0).sin();
    let v = ((b.lng - a.lng).to_radians() / 2.0).sin();
    2.0 * EARTH_RADIUS_M * (u * u + lat1.cos() * lat2.cos() * v * v).sqrt().asin()
}

// =============================================================================
// Geo Hit
// =============================================================================

/// One member returned by a radius query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoHit {
    /// Member key stored in the index
    pub member: String,
    /// Indexed coordinates
    pub point: Point,
    /// Distance from the query center, in the query unit
    pub distance: f64,
}

// =============================================================================
// GeoStore
// =============================================================================

/// Key-value, geo-index and ordered-set primitives.
///
/// Geo indexes live in the ordered-set namespace, as they do in Redis:
/// `zrem` on an index key removes indexed members.
#[async_trait]
pub trait GeoStore: Send + Sync {
    /// Connectivity check
    async fn ping(&self) -> Result<(), StoreError>;

    /// Read a value; `None` when the key is missing or expired
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write a value, optionally expiring after `ttl`
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Atomically increment a counter; the first call returns 1
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;

    /// Add or move `member` in the geo index
    async fn geo_add(&self, index: &str, member: &str, point: Point) -> Result<(), StoreError>;

    /// Members within `radius` of `center`, nearest first
    async fn geo_radius(
        &self,
        index: &str,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
    ) -> Result<Vec<GeoHit>, StoreError>;

    /// Add or rescore `member`
    async fn zadd(&self, set: &str, member: &str, score: f64) -> Result<(), StoreError>;

    /// Members with `min <= score <= max`, lowest score first
    async fn zrange_by_score(&self, set: &str, min: f64, max: f64) -> Result<Vec<String>, StoreError>;

    /// Remove members; unknown members are ignored
    async fn zrem(&self, set: &str, members: &[String]) -> Result<(), StoreError>;

    /// Remove every member with `min <= score <= max`
    async fn zrem_range_by_score(&self, set: &str, min: f64, max: f64) -> Result<(), StoreError>;

    /// Number of members
    async fn zcard(&self, set: &str) -> Result<i64, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero() {
        let p = Point::new(59.93, 30.36);
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn test_haversine_one_millidegree_latitude() {
        // 0.001 degree of latitude is ~111 m everywhere.
        let d = haversine_distance(Point::new(59.930, 30.36), Point::new(59.931, 30.36));
        assert!((d - 111.2).abs() < 0.5, "got {}", d);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Palace Square to Moscow railway station, ~2.8 km
        let d = haversine_distance(Point::new(59.9390, 30.3158), Point::new(59.9296, 30.3620));
        assert!(d > 2500.0 && d < 2900.0, "got {}", d);
    }

    #[test]
    fn test_unit_tokens_and_scale() {
        assert_eq!(DistanceUnit::Kilometers.to_string(), "km");
        assert_eq!(DistanceUnit::Meters.as_str(), "m");
        assert_eq!(DistanceUnit::Kilometers.meters(), 1000.0);
    }
}
