//! GeoTask Zone Engine
//!
//! Pure geofencing logic, no I/O beyond reading an optional zone file.
//!
//! - **Polygon**: point-in-polygon containment
//! - **ZoneSet**: one allowed polygon minus any number of disallowed ones,
//!   plus bounded rejection sampling of allowed points
//!
//! # Example
//!
//! ```rust
//! use geotask_domain::DEFAULT_COURIER_LOCATION;
//! use geotask_zone::{ZoneGuard, ZoneSet};
//!
//! let zones = ZoneSet::operational_area();
//! assert!(zones.is_allowed(DEFAULT_COURIER_LOCATION));
//!
//! let point = zones.random_allowed_point().unwrap();
//! assert!(zones.is_allowed(point));
//! ```

#![warn(clippy::all)]

mod error;
mod polygon;
mod zones;

pub use error::ZoneError;
pub use polygon::Polygon;
pub use zones::{ZoneGuard, ZoneSet, DEFAULT_MAX_ATTEMPTS};
