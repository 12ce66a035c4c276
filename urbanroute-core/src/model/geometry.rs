//! Planar projection of degree coordinates.
//!
//! Positions are stored as (x = longitude, y = latitude) in degrees. Distances
//! use a flat projection around a fixed reference latitude instead of a
//! geodesic formula; the study area is a single city.

use geo::Point;

use crate::Meters;

/// Meters per degree along a meridian.
pub const METERS_PER_DEGREE: f64 = 111_000.0;
/// Reference latitude of the projection, not adapted to the data.
pub const REFERENCE_LATITUDE: f64 = 30.0;

#[inline]
fn latitude_factor() -> f64 {
    METERS_PER_DEGREE * REFERENCE_LATITUDE.to_radians().cos()
}

/// Projects a degree position onto the planar metric frame.
#[inline]
pub fn project(point: Point<f64>) -> [f64; 2] {
    [point.x() * METERS_PER_DEGREE, point.y() * latitude_factor()]
}

/// Straight-line distance between two positions in meters.
pub fn planar_distance(a: Point<f64>, b: Point<f64>) -> Meters {
    let dx = (b.x() - a.x()) * METERS_PER_DEGREE;
    let dy = (b.y() - a.y()) * latitude_factor();
    dx.hypot(dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longitude_degree_is_111_km() {
        let d = planar_distance(Point::new(31.0, 30.0), Point::new(32.0, 30.0));
        assert!((d - 111_000.0).abs() < 1e-6);
    }

    #[test]
    fn latitude_degree_is_shortened_by_reference_cosine() {
        let d = planar_distance(Point::new(31.0, 30.0), Point::new(31.0, 31.0));
        assert!((d - 96_128.819_82).abs() < 1e-3);
    }

    #[test]
    fn projection_agrees_with_distance() {
        let a = Point::new(31.2, 30.05);
        let b = Point::new(31.25, 30.1);
        let [ax, ay] = project(a);
        let [bx, by] = project(b);
        assert!(((bx - ax).hypot(by - ay) - planar_distance(a, b)).abs() < 1e-6);
    }
}
