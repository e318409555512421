//! Zone engine errors

use thiserror::Error;

/// Errors raised while building zones or placing points in them
#[derive(Debug, Error)]
pub enum ZoneError {
    /// A polygon needs at least three vertices
    #[error("Degenerate polygon: {vertices} vertices, need at least 3")]
    DegeneratePolygon {
        /// Number of vertices supplied
        vertices: usize,
    },

    /// Rejection sampling and the centroid fallback both failed
    #[error("No allowed point found after {attempts} attempts")]
    NoAllowedPoint {
        /// Sampling attempts made before giving up
        attempts: u32,
    },

    /// Zone file could not be read or parsed
    #[error("Invalid zone file: {0}")]
    InvalidZoneFile(String),
}
