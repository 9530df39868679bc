//! Geographic utilities: deviation area, distance and polygon tests.
//!
//! All functions operate on raw decimal-degree coordinates. The deviation
//! area is a planar measure used by the trace filter; it is not corrected
//! for latitude because only relative magnitudes along one way matter.

use crate::GeoPoint;

/// Mean earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Area of the parallelogram spanned by the points `a`, `b` and `c`,
/// i.e. twice the triangle area.
///
/// This measures how far `b` deviates from the straight line through `a`
/// and `c`; it is zero iff the three points are colinear.
pub fn parallelogram_area(a: GeoPoint, b: GeoPoint, c: GeoPoint) -> f64 {
    ((a.longitude - c.longitude) * (b.latitude - a.latitude)
        - (a.longitude - b.longitude) * (c.latitude - a.latitude))
        .abs()
}

/// Great-circle distance between two points in meters (haversine formula).
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Total length of a point sequence in meters.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

/// Winding-number test whether `p` lies inside the polygon `area`.
///
/// The polygon is treated as closed (last vertex connects back to the
/// first). Fewer than 3 vertices never contain anything.
pub fn point_in_polygon(p: GeoPoint, area: &[GeoPoint]) -> bool {
    if area.len() < 3 {
        return false;
    }

    // Winding count, doubled so axis touches can count as half crossings.
    let mut w = 0i32;

    let mut y1 = area[0].latitude - p.latitude;
    let mut x1 = area[0].longitude - p.longitude;

    for i in 1..=area.len() {
        let vertex = area[i % area.len()];
        let y = y1;
        let x = x1;
        y1 = vertex.latitude - p.latitude;
        x1 = vertex.longitude - p.longitude;

        if y * y1 < 0.0 {
            // the segment crosses the x axis; find where
            let r = x + (y * (x1 - x)) / (y - y1);
            if r > 0.0 {
                w += 2;
            }
        } else if y == 0.0 && x > 0.0 {
            // segment starts on the positive x axis
            if y1 > 0.0 {
                w += 1;
            } else {
                w -= 1;
            }
        } else if y1 == 0.0 && x1 > 0.0 {
            // segment ends on the positive x axis
            if y < 0.0 {
                w += 1;
            } else {
                w -= 1;
            }
        }
    }

    w != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_of_colinear_points_is_zero() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 1.0);
        let c = GeoPoint::new(2.0, 2.0);
        assert_eq!(parallelogram_area(a, b, c), 0.0);
    }

    #[test]
    fn area_of_unit_triangle() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 0.0);
        let c = GeoPoint::new(0.0, 1.0);
        // parallelogram area is twice the triangle area of 0.5
        assert!((parallelogram_area(a, b, c) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn haversine_of_identical_points_is_zero() {
        let p = GeoPoint::new(52.4556, 13.2972);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn haversine_one_degree_latitude() {
        let a = GeoPoint::new(52.0, 13.0);
        let b = GeoPoint::new(53.0, 13.0);
        let d = haversine_distance(&a, &b);
        // one degree of latitude is roughly 111 km
        assert!((d - 111_195.0).abs() < 200.0);
    }

    #[test]
    fn point_inside_square() {
        let square = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 2.0),
            GeoPoint::new(2.0, 2.0),
            GeoPoint::new(2.0, 0.0),
        ];
        assert!(point_in_polygon(GeoPoint::new(1.0, 1.0), &square));
        assert!(!point_in_polygon(GeoPoint::new(3.0, 1.0), &square));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let line = [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)];
        assert!(!point_in_polygon(GeoPoint::new(0.5, 0.5), &line));
    }
}
