//! Great-circle distances and scale estimates used for registration diagnostics.

use serde::{Deserialize, Serialize};

use super::projection::{LocalTangentPlane, Projection, EARTH_RADIUS_M};
use crate::types::{ControlPoint, LatLon};

/// Haversine distance between two positions, in meters.
pub fn haversine_m(a: LatLon, b: LatLon) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lon - a.lon).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Ground extent of an axis-aligned lat/lon rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsExtent {
    /// East-west distance, measured at the middle latitude.
    pub width_m: f64,
    /// North-south distance, measured along the north-west meridian.
    pub height_m: f64,
}

impl BoundsExtent {
    /// Area in square kilometers.
    pub fn area_km2(&self) -> f64 {
        self.width_m * self.height_m / 1_000_000.0
    }

    /// Width divided by height, or `None` for a zero-height rectangle.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height_m > 0.0 {
            Some(self.width_m / self.height_m)
        } else {
            None
        }
    }
}

/// Measure the rectangle spanned by a north-west and a south-east corner.
pub fn bounds_extent(nw: LatLon, se: LatLon) -> BoundsExtent {
    let height_m = haversine_m(nw, LatLon::new(se.lat, nw.lon));
    let mid_lat = (nw.lat + se.lat) / 2.0;
    let width_m = haversine_m(LatLon::new(mid_lat, nw.lon), LatLon::new(mid_lat, se.lon));
    BoundsExtent { width_m, height_m }
}

/// Ground resolution of the overlay along each image axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetersPerPixel {
    pub x: f64,
    pub y: f64,
}

/// Estimate meters per pixel from every pair of control points.
///
/// Each pair contributes a ratio of ground distance to pixel distance along
/// each axis it moves on; ratios are averaged per axis. The estimate ignores
/// rotation, so it is a rough figure for display.
///
/// Returns `None` if no pair moves along one of the axes.
pub fn meters_per_pixel(points: &[ControlPoint]) -> Option<MetersPerPixel> {
    let first = points.first()?;
    let plane = LocalTangentPlane::new(first.geo);
    let projected: Vec<_> = points.iter().map(|p| plane.project(p.geo)).collect();

    let (mut sum_x, mut count_x) = (0.0, 0usize);
    let (mut sum_y, mut count_y) = (0.0, 0usize);

    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let dx_px = points[j].pixel.x - points[i].pixel.x;
            let dy_px = points[j].pixel.y - points[i].pixel.y;
            let delta_m = projected[j] - projected[i];

            if dx_px != 0.0 {
                sum_x += delta_m.x / dx_px;
                count_x += 1;
            }
            if dy_px != 0.0 {
                sum_y += delta_m.y / dy_px;
                count_y += 1;
            }
        }
    }

    if count_x == 0 || count_y == 0 {
        return None;
    }

    Some(MetersPerPixel {
        x: (sum_x / count_x as f64).abs(),
        y: (sum_y / count_y as f64).abs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero() {
        let p = LatLon::new(60.39, 5.34);
        assert_eq!(haversine_m(p, p), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_on_meridian() {
        let d = haversine_m(LatLon::new(0.0, 0.0), LatLon::new(1.0, 0.0));
        assert!((d - 111_194.926_644_558_7).abs() < 1e-4, "distance was {}", d);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = LatLon::new(60.39113, 5.34356);
        let b = LatLon::new(60.40450, 5.35765);
        assert!((haversine_m(a, b) - haversine_m(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_antipodal_is_finite() {
        let d = haversine_m(LatLon::new(0.0, 0.0), LatLon::new(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 1e-3);
    }

    #[test]
    fn test_bounds_extent_of_equatorial_square() {
        let extent = bounds_extent(LatLon::new(0.5, 0.0), LatLon::new(-0.5, 1.0));
        // One degree both ways near the equator
        assert!((extent.height_m - 111_194.93).abs() < 0.1);
        assert!((extent.width_m - 111_194.93).abs() < 0.1, "width was {}", extent.width_m);
        let aspect = extent.aspect_ratio().unwrap();
        assert!((aspect - 1.0).abs() < 1e-4);
        assert!((extent.area_km2() - 12_364.31).abs() < 0.1);
    }

    #[test]
    fn test_bounds_extent_flat_has_no_aspect() {
        let extent = bounds_extent(LatLon::new(60.0, 5.0), LatLon::new(60.0, 6.0));
        assert_eq!(extent.height_m, 0.0);
        assert!(extent.aspect_ratio().is_none());
        assert_eq!(extent.area_km2(), 0.0);
    }

    #[test]
    fn test_meters_per_pixel_axis_aligned() {
        // 1 m per pixel on both axes, north-up, y down
        let plane = LocalTangentPlane::new(LatLon::new(60.0, 5.0));
        let geo = |x: f64, y: f64| plane.unproject(nalgebra::Vector2::new(x, -y));
        let points = [
            ControlPoint::new((0.0, 0.0).into(), geo(0.0, 0.0)),
            ControlPoint::new((100.0, 50.0).into(), geo(100.0, 50.0)),
            ControlPoint::new((30.0, 200.0).into(), geo(30.0, 200.0)),
        ];
        let mpp = meters_per_pixel(&points).unwrap();
        assert!((mpp.x - 1.0).abs() < 1e-9, "x was {}", mpp.x);
        assert!((mpp.y - 1.0).abs() < 1e-9, "y was {}", mpp.y);
    }

    #[test]
    fn test_meters_per_pixel_needs_movement_on_both_axes() {
        let points = [
            ControlPoint::from_parts(10.0, 10.0, 60.0, 5.0),
            ControlPoint::from_parts(20.0, 10.0, 60.0, 5.001),
            ControlPoint::from_parts(30.0, 10.0, 60.0, 5.002),
        ];
        assert!(meters_per_pixel(&points).is_none());
        assert!(meters_per_pixel(&[]).is_none());
    }
}
