//! GeoTask Domain Layer
//!
//! Pure domain types with zero I/O dependencies: the courier, delivery
//! orders, the composed status view and the movement primitives.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod entities;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{Courier, CourierStatus, Order, OrderId, DEFAULT_COURIER_LOCATION};
pub use value_objects::{Direction, DomainError, Point, Zoom};
