//! Value Objects for the GeoTask Domain
//!
//! Immutable domain primitives: coordinates, movement directions and map zoom.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Movement direction outside Up/Down/Left/Right
    #[error("Invalid direction: {0}")]
    InvalidDirection(i32),
}

// =============================================================================
// Point
// =============================================================================

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl Point {
    /// Create a new point from latitude and longitude.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

// =============================================================================
// Direction
// =============================================================================

/// Courier movement direction as sent by the client.
///
/// Wire values: `0` Up, `1` Down, `2` Left, `3` Right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// North: latitude increases
    Up,
    /// South: latitude decreases
    Down,
    /// West: longitude decreases
    Left,
    /// East: longitude increases
    Right,
}

impl Direction {
    /// Shift `point` by `delta` degrees in this direction.
    pub fn apply(self, point: Point, delta: f64) -> Point {
        match self {
            Direction::Up => Point::new(point.lat + delta, point.lng),
            Direction::Down => Point::new(point.lat - delta, point.lng),
            Direction::Left => Point::new(point.lat, point.lng - delta),
            Direction::Right => Point::new(point.lat, point.lng + delta),
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Down),
            2 => Ok(Direction::Left),
            3 => Ok(Direction::Right),
            other => Err(DomainError::InvalidDirection(other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

// =============================================================================
// Zoom
// =============================================================================

/// Map zoom level driving the movement step size.
///
/// # Invariants
/// - Never above [`Zoom::MAX`]; larger values are clamped, not rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Zoom(i32);

impl Zoom {
    /// Highest zoom level; the step at this level is [`Zoom::BASE_STEP`].
    pub const MAX: i32 = 14;

    /// Step in degrees at the highest zoom level.
    pub const BASE_STEP: f64 = 0.001;

    /// Create a zoom level, clamping anything above [`Zoom::MAX`].
    pub fn new(level: i32) -> Self {
        Self(level.min(Self::MAX))
    }

    /// The clamped level.
    pub fn level(&self) -> i32 {
        self.0
    }

    /// Movement step in degrees: `0.001 / 2^(zoom - 14)`.
    ///
    /// Each zoom level below the maximum doubles the step. The exponent is
    /// taken in floating point, so very low levels give an infinite step.
    pub fn step(&self) -> f64 {
        Self::BASE_STEP / 2f64.powf(f64::from(self.0) - f64::from(Self::MAX))
    }
}

impl From<i32> for Zoom {
    fn from(level: i32) -> Self {
        Self::new(level)
    }
}

// =============================================================================
// Tests
// =============================================================================
