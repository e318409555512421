//! Allowed/disallowed zone sets and random placement.

use std::path::Path;

use geotask_domain::Point;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ZoneError;
use crate::polygon::Polygon;

/// Sampling attempts before falling back to the allowed zone centroid.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

// =============================================================================
// Zone Guard
// =============================================================================

/// Placement policy consulted by the courier tracker and order generator.
pub trait ZoneGuard: Send + Sync {
    /// True iff `point` is inside the allowed zone and outside every
    /// disallowed zone.
    fn is_allowed(&self, point: Point) -> bool;

    /// A random point satisfying [`ZoneGuard::is_allowed`].
    fn random_allowed_point(&self) -> Result<Point, ZoneError>;
}

// =============================================================================
// Zone Set
// =============================================================================

/// One allowed polygon minus a set of disallowed polygons.
///
/// Built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct ZoneSet {
    allowed: Polygon,
    disallowed: Vec<Polygon>,
    max_attempts: u32,
}

impl ZoneSet {
    pub fn new(allowed: Polygon, disallowed: Vec<Polygon>) -> Self {
        Self {
            allowed,
            disallowed,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the rejection sampling cap (minimum 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn disallowed(&self) -> &[Polygon] {
        &self.disallowed
    }

    /// Built-in St Petersburg operational area with two carved-out zones.
    pub fn operational_area() -> Self {
        let allowed = Polygon::from_pairs_unchecked(&[
            (60.0050, 30.2100),
            (60.0100, 30.3900),
            (59.9800, 30.4900),
            (59.9050, 30.4800),
            (59.8700, 30.3600),
            (59.9000, 30.2200),
        ]);
        let river_islands = Polygon::from_pairs_unchecked(&[
            (59.9560, 30.3050),
            (59.9560, 30.3300),
            (59.9470, 30.3300),
            (59.9470, 30.3050),
        ]);
        let port_area = Polygon::from_pairs_unchecked(&[
            (59.9100, 30.2700),
            (59.9150, 30.3000),
            (59.9000, 30.3050),
            (59.8950, 30.2750),
        ]);

        Self::new(allowed, vec![river_islands, port_area])
    }

    /// Parse a zone file.
    ///
    /// ```json
    /// { "allowed": [[lat, lng], ...], "disallowed": [[[lat, lng], ...], ...] }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ZoneError> {
        let file: ZoneFile =
            serde_json::from_str(json).map_err(|e| ZoneError::InvalidZoneFile(e.to_string()))?;

        let allowed = Polygon::new(to_points(&file.allowed))?;
        let disallowed = file
            .disallowed
            .iter()
            .map(|ring| Polygon::new(to_points(ring)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(allowed, disallowed))
    }

    /// Read and parse a zone file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ZoneError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ZoneError::InvalidZoneFile(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Rejection sampling with a caller-supplied RNG.
    ///
    /// Draws uniformly inside the allowed zone's bounding box until a point
    /// passes [`ZoneGuard::is_allowed`], at most `max_attempts` times. After
    /// that the allowed zone centroid is returned if it is itself allowed.
    pub fn random_allowed_point_with<R: Rng>(&self, rng: &mut R) -> Result<Point, ZoneError> {
        let (sw, ne) = self.allowed.bounding_box();

        for attempt in 1..=self.max_attempts {
            let candidate = Point::new(
                rng.gen_range(sw.lat..=ne.lat),
                rng.gen_range(sw.lng..=ne.lng),
            );
            if self.is_allowed(candidate) {
                debug!(attempt, %candidate, "Sampled allowed point");
                return Ok(candidate);
            }
        }

        let centroid = self.allowed.centroid();
        if self.is_allowed(centroid) {
            warn!(
                attempts = self.max_attempts,
                %centroid,
                "Rejection sampling exhausted, falling back to centroid"
            );
            return Ok(centroid);
        }

        Err(ZoneError::NoAllowedPoint { attempts: self.max_attempts })
    }
}

impl ZoneGuard for ZoneSet {
    fn is_allowed(&self, point: Point) -> bool {
        self.allowed.contains(point) && !self.disallowed.iter().any(|zone| zone.contains(point))
    }

    fn random_allowed_point(&self) -> Result<Point, ZoneError> {
        self.random_allowed_point_with(&mut rand::thread_rng())
    }
}

#[derive(Debug, Deserialize)]
struct ZoneFile {
    allowed: Vec<[f64; 2]>,
    #[serde(default)]
    disallowed: Vec<Vec<[f64; 2]>>,
}

fn to_points(pairs: &[[f64; 2]]) -> Vec<Point> {
    pairs.iter().map(|[lat, lng]| Point::new(*lat, *lng)).collect()
}

// =============================================================================
// Tests
// =============================================================================
