//! Polygon containment.

use geotask_domain::Point;

use crate::error::ZoneError;

/// Closed polygon over lat/lng vertices.
///
/// The last vertex connects back to the first; callers do not repeat it.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Build a polygon.
    ///
    /// # Errors
    /// Returns `ZoneError::DegeneratePolygon` for fewer than three vertices.
    pub fn new(vertices: Vec<Point>) -> Result<Self, ZoneError> {
        if vertices.len() < 3 {
            return Err(ZoneError::DegeneratePolygon { vertices: vertices.len() });
        }
        Ok(Self { vertices })
    }

    /// Build a polygon from `(lat, lng)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, ZoneError> {
        Self::new(pairs.iter().map(|&(lat, lng)| Point::new(lat, lng)).collect())
    }

    /// Built-in polygons, known to have at least three vertices.
    pub(crate) fn from_pairs_unchecked(pairs: &[(f64, f64)]) -> Self {
        Self {
            vertices: pairs.iter().map(|&(lat, lng)| Point::new(lat, lng)).collect(),
        }
    }

    /// Ray-casting containment test (ray along increasing longitude).
    pub fn contains(&self, point: Point) -> bool {
        let v = &self.vertices;
        let mut inside = false;
        let mut j = v.len() - 1;

        for i in 0..v.len() {
            let (a, b) = (v[i], v[j]);
            if (a.lat > point.lat) != (b.lat > point.lat) {
                let cross_lng = (b.lng - a.lng) * (point.lat - a.lat) / (b.lat - a.lat) + a.lng;
                if point.lng < cross_lng {
                    inside = !inside;
                }
            }
            j = i;
        }

        inside
    }

    /// `(south_west, north_east)` corners of the bounding box.
    pub fn bounding_box(&self) -> (Point, Point) {
        let first = self.vertices[0];
        self.vertices.iter().skip(1).fold((first, first), |(min, max), p| {
            (
                Point::new(min.lat.min(p.lat), min.lng.min(p.lng)),
                Point::new(max.lat.max(p.lat), max.lng.max(p.lng)),
            )
        })
    }

    /// Arithmetic mean of the vertices.
    pub fn centroid(&self) -> Point {
        let n = self.vertices.len() as f64;
        let (lat, lng) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
        Point::new(lat / n, lng / n)
    }
}
