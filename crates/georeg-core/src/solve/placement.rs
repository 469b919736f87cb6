//! Placement solver: independent least-squares fit per image axis.
//!
//! Once the rotation is known, the de-rotated overlay is north-up and its
//! placement reduces to two 1-D linear regressions in the chosen plane:
//! ```text
//! plane_y ≈ origin_y + scale_y * y_rotated
//! plane_x ≈ origin_x + scale_x * x_rotated
//! ```
//! With the [`PlacementModel::Equirectangular`] model the plane is plain degrees, so this is
//! `lat ≈ lat_nw + scale_lat * y` and `lon ≈ lon_nw + scale_lon * x`.
//!
//! The north-west corner is the fitted value at rotated pixel `(0, 0)` and the
//! south-east corner is the fit extrapolated to `(W, H)`.
//!
//! Longitudes are unwrapped next to the first control point before fitting,
//! and every position handed back is folded into `[-180, 180)`.

use log::debug;
use nalgebra::Vector2;

use super::pixel::{rotate_about_center, rotate_points_about_center};
use crate::geo::PlacementModel;
use crate::types::{
    validate_points, Axis, ControlPoint, LatLon, OverlayDimensions, PixelPoint, RegistrationError,
};

/// Two points already determine both regressions exactly.
pub const MIN_PLACEMENT_POINTS: usize = 2;

/// Relative share of total spread below which one axis counts as constant.
const VARIANCE_TOLERANCE: f64 = 1e-12;

/// Ratio `det(cov) / trace(cov)²` below which three or more points count as
/// lying on one line.
const COLLINEARITY_TOLERANCE: f64 = 1e-10;

/// Result of [`solve_placement`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementFit {
    /// North-west corner of the overlay.
    pub nw: LatLon,
    /// South-east corner of the overlay.
    pub se: LatLon,
    /// Plane coordinates of rotated pixel `(0, 0)`, with longitudes unwrapped
    /// next to the first control point.
    pub origin: Vector2<f64>,
    /// Plane units per rotated pixel along `x` and `y`.
    pub scale: Vector2<f64>,
    /// Mean squared distance in degrees between fitted and true positions.
    pub mean_squared_error: f64,
    /// Rotation the pixels were de-rotated by.
    pub theta_degrees: f64,
    /// Overlay the fit belongs to.
    pub dims: OverlayDimensions,
    /// Plane the fit was solved in.
    pub model: PlacementModel,
}

impl PlacementFit {
    /// Geographic position of any pixel of the (unrotated) bordered overlay.
    pub fn locate(&self, pixel: PixelPoint) -> LatLon {
        let rotated = rotate_about_center(pixel, self.theta_degrees, self.dims);
        self.locate_rotated(rotated).normalized()
    }

    /// Fitted position of an already rotated pixel, longitude left unwrapped.
    fn locate_rotated(&self, rotated: PixelPoint) -> LatLon {
        self.model.projection().unproject(Vector2::new(
            self.origin.x + self.scale.x * rotated.x,
            self.origin.y + self.scale.y * rotated.y,
        ))
    }
}

/// Fit the overlay placement in plain latitude/longitude degrees.
///
/// Equivalent to [`solve_placement_with`] using [`PlacementModel::Equirectangular`].
pub fn solve_placement(
    points: &[ControlPoint],
    theta_degrees: f64,
    dims: OverlayDimensions,
) -> Result<PlacementFit, RegistrationError> {
    solve_placement_with(points, theta_degrees, dims, PlacementModel::Equirectangular)
}

/// Fit the overlay placement under a given plane projection.
///
/// # Arguments
///
/// * `points` - Control points, pixels on the unrotated bordered overlay
/// * `theta_degrees` - Rotation from the rotation solver (counter-clockwise positive)
/// * `dims` - Bordered overlay dimensions
/// * `model` - Plane in which the overlay is stretched linearly
///
/// # Errors
///
/// * [`RegistrationError::TooFewPoints`] with fewer than two points
/// * [`RegistrationError::NonFiniteCoordinate`] or
///   [`RegistrationError::CoordinateOutOfRange`] for an unusable point
/// * [`RegistrationError::NonFiniteAngle`] when `theta_degrees` is NaN or infinite
/// * [`RegistrationError::ZeroVariance`] when every rotated `x` (or `y`) is equal
/// * [`RegistrationError::CollinearPoints`] when three or more rotated points
///   lie on one line
pub fn solve_placement_with(
    points: &[ControlPoint],
    theta_degrees: f64,
    dims: OverlayDimensions,
    model: PlacementModel,
) -> Result<PlacementFit, RegistrationError> {
    if points.len() < MIN_PLACEMENT_POINTS {
        return Err(RegistrationError::TooFewPoints {
            required: MIN_PLACEMENT_POINTS,
            found: points.len(),
        });
    }
    validate_points(points)?;
    if !theta_degrees.is_finite() {
        return Err(RegistrationError::NonFiniteAngle);
    }

    let pixels: Vec<PixelPoint> = points.iter().map(|p| p.pixel).collect();
    let rotated = rotate_points_about_center(&pixels, theta_degrees, dims);
    check_spread(&rotated)?;

    let projection = model.projection();
    let reference_lon = points[0].geo.lon;
    let geo: Vec<LatLon> = points.iter().map(|p| p.geo.unwrapped_near(reference_lon)).collect();
    let plane: Vec<Vector2<f64>> = geo.iter().map(|g| projection.project(*g)).collect();

    let xs: Vec<f64> = rotated.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = rotated.iter().map(|p| p.y).collect();
    let plane_xs: Vec<f64> = plane.iter().map(|p| p.x).collect();
    let plane_ys: Vec<f64> = plane.iter().map(|p| p.y).collect();

    let (origin_x, scale_x) = fit_line(&xs, &plane_xs);
    let (origin_y, scale_y) = fit_line(&ys, &plane_ys);

    let origin = Vector2::new(origin_x, origin_y);
    let scale = Vector2::new(scale_x, scale_y);

    let nw = projection.unproject(origin).normalized();
    let se = projection
        .unproject(Vector2::new(
            origin_x + dims.width as f64 * scale_x,
            origin_y + dims.height as f64 * scale_y,
        ))
        .normalized();

    let mut fit = PlacementFit {
        nw,
        se,
        origin,
        scale,
        mean_squared_error: 0.0,
        theta_degrees,
        dims,
        model,
    };

    let sum_sq: f64 = rotated
        .iter()
        .zip(geo.iter())
        .map(|(r, g)| fit.locate_rotated(*r).distance_squared_deg(g))
        .sum();
    fit.mean_squared_error = sum_sq / points.len() as f64;

    debug!(
        "placement fit: nw=({:.6}, {:.6}) se=({:.6}, {:.6}) mse={:.3e}",
        nw.lat, nw.lon, se.lat, se.lon, fit.mean_squared_error
    );

    Ok(fit)
}

/// Reject point sets that cannot determine both regressions.
fn check_spread(rotated: &[PixelPoint]) -> Result<(), RegistrationError> {
    let n = rotated.len() as f64;
    let mean_x = rotated.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = rotated.iter().map(|p| p.y).sum::<f64>() / n;

    let (mut var_x, mut var_y, mut cov_xy) = (0.0, 0.0, 0.0);
    for p in rotated {
        let dx = p.x - mean_x;
        let dy = p.y - mean_y;
        var_x += dx * dx;
        var_y += dy * dy;
        cov_xy += dx * dy;
    }

    let total = var_x + var_y;
    let tolerance = VARIANCE_TOLERANCE * total.max(f64::MIN_POSITIVE);
    if var_x <= tolerance {
        return Err(RegistrationError::ZeroVariance { axis: Axis::X });
    }
    if var_y <= tolerance {
        return Err(RegistrationError::ZeroVariance { axis: Axis::Y });
    }

    // Two points always lie on a line; the regression is then exact interpolation
    if rotated.len() > MIN_PLACEMENT_POINTS {
        let det = var_x * var_y - cov_xy * cov_xy;
        if det <= COLLINEARITY_TOLERANCE * total * total {
            return Err(RegistrationError::CollinearPoints);
        }
    }

    Ok(())
}

/// Ordinary least squares `v ≈ intercept + slope * u`.
///
/// Callers guarantee `u` has non-zero variance.
fn fit_line(u: &[f64], v: &[f64]) -> (f64, f64) {
    let n = u.len() as f64;
    let mean_u = u.iter().sum::<f64>() / n;
    let mean_v = v.iter().sum::<f64>() / n;

    let (mut num, mut den) = (0.0, 0.0);
    for (a, b) in u.iter().zip(v.iter()) {
        num += (a - mean_u) * (b - mean_v);
        den += (a - mean_u) * (a - mean_u);
    }

    let slope = num / den;
    (mean_v - slope * mean_u, slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Projection, WebMercator};
    use crate::types::ErrorKind;

    fn regression_points() -> Vec<ControlPoint> {
        vec![
            ControlPoint::from_parts(238.0, 1337.7000122070312, 60.39113388285876, 5.3435611724853525),
            ControlPoint::from_parts(844.0, 319.6999969482422, 60.40450336375729, 5.357653498649598),
            ControlPoint::from_parts(414.0, 403.6999969482422, 60.40313627352001, 5.346728861331941),
        ]
    }

    /// North-up overlay with a linear lat/lon grid.
    fn grid_point(x: f64, y: f64) -> ControlPoint {
        ControlPoint::from_parts(x, y, 60.41 - 1e-5 * y, 5.33 + 2e-5 * x)
    }

    #[test]
    fn test_fit_line_exact() {
        let (intercept, slope) = fit_line(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]);
        assert!((intercept - 1.0).abs() < 1e-12);
        assert!((slope - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_line_least_squares() {
        // Best fit through (0,0), (1,1), (2,1) is y = 1/6 + x/2
        let (intercept, slope) = fit_line(&[0.0, 1.0, 2.0], &[0.0, 1.0, 1.0]);
        assert!((slope - 0.5).abs() < 1e-12);
        assert!((intercept - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_north_up_grid_is_exact() {
        let dims = OverlayDimensions::new(1000, 800);
        let points = vec![
            grid_point(100.0, 100.0),
            grid_point(900.0, 300.0),
            grid_point(400.0, 700.0),
        ];

        let fit = solve_placement(&points, 0.0, dims).unwrap();

        assert!((fit.nw.lat - 60.41).abs() < 1e-10);
        assert!((fit.nw.lon - 5.33).abs() < 1e-10);
        assert!((fit.se.lat - (60.41 - 1e-5 * 800.0)).abs() < 1e-10);
        assert!((fit.se.lon - (5.33 + 2e-5 * 1000.0)).abs() < 1e-10);
        assert!(fit.mean_squared_error < 1e-20);
        assert!((fit.scale.y + 1e-5).abs() < 1e-15);
        assert!((fit.scale.x - 2e-5).abs() < 1e-15);
    }

    #[test]
    fn test_locate_reproduces_control_points() {
        let dims = OverlayDimensions::new(1000, 800);
        let points = vec![
            grid_point(100.0, 100.0),
            grid_point(900.0, 300.0),
            grid_point(400.0, 700.0),
        ];
        let fit = solve_placement(&points, 0.0, dims).unwrap();

        for p in &points {
            let located = fit.locate(p.pixel);
            assert!((located.lat - p.geo.lat).abs() < 1e-10);
            assert!((located.lon - p.geo.lon).abs() < 1e-10);
        }
        let corner = fit.locate(PixelPoint::new(0.0, 0.0));
        assert!((corner.lat - fit.nw.lat).abs() < 1e-12);
    }

    #[test]
    fn test_regression_fixture_corners() {
        let dims = OverlayDimensions::new(1325, 1709);
        let fit = solve_placement(&regression_points(), 3.2472346402084464, dims).unwrap();

        assert!((fit.nw.lat - 60.4085).abs() < 1e-3, "nw {:?}", fit.nw);
        assert!((fit.nw.lon - 5.3367).abs() < 1e-3, "nw {:?}", fit.nw);
        assert!((fit.se.lat - 60.3867).abs() < 1e-3, "se {:?}", fit.se);
        assert!((fit.se.lon - 5.3708).abs() < 1e-3, "se {:?}", fit.se);
        assert!(fit.mean_squared_error < 1e-9);
    }

    #[test]
    fn test_two_points_interpolate_exactly() {
        let dims = OverlayDimensions::new(1000, 800);
        let points = vec![grid_point(100.0, 100.0), grid_point(900.0, 700.0)];

        let fit = solve_placement(&points, 0.0, dims).unwrap();
        assert!((fit.nw.lat - 60.41).abs() < 1e-10);
        assert!((fit.nw.lon - 5.33).abs() < 1e-10);
        assert!(fit.mean_squared_error < 1e-20);
    }

    #[test]
    fn test_single_point_rejected() {
        let dims = OverlayDimensions::new(100, 100);
        let result = solve_placement(&[grid_point(10.0, 10.0)], 0.0, dims);
        assert_eq!(
            result,
            Err(RegistrationError::TooFewPoints {
                required: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_shared_x_is_zero_variance() {
        let dims = OverlayDimensions::new(1000, 800);
        let points = vec![
            grid_point(250.0, 100.0),
            grid_point(250.0, 400.0),
            grid_point(250.0, 700.0),
        ];
        assert_eq!(
            solve_placement(&points, 0.0, dims),
            Err(RegistrationError::ZeroVariance { axis: Axis::X })
        );
    }

    #[test]
    fn test_shared_y_is_zero_variance() {
        let dims = OverlayDimensions::new(1000, 800);
        let points = vec![
            grid_point(100.0, 400.0),
            grid_point(500.0, 400.0),
            grid_point(900.0, 400.0),
        ];
        assert_eq!(
            solve_placement(&points, 0.0, dims),
            Err(RegistrationError::ZeroVariance { axis: Axis::Y })
        );
    }

    #[test]
    fn test_shared_x_rotated_is_still_degenerate() {
        // A vertical line stays a line under any rotation
        let dims = OverlayDimensions::new(1000, 800);
        let points = vec![
            grid_point(250.0, 100.0),
            grid_point(250.0, 400.0),
            grid_point(250.0, 700.0),
        ];
        let err = solve_placement(&points, 1e-13, dims).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DegenerateGeometry);
    }

    #[test]
    fn test_diagonal_line_is_collinear() {
        let dims = OverlayDimensions::new(1000, 800);
        let points = vec![
            grid_point(100.0, 100.0),
            grid_point(300.0, 250.0),
            grid_point(700.0, 550.0),
        ];
        assert_eq!(
            solve_placement(&points, 5.0, dims),
            Err(RegistrationError::CollinearPoints)
        );
    }

    #[test]
    fn test_identical_pixels_rejected() {
        let dims = OverlayDimensions::new(1000, 800);
        let points = vec![
            ControlPoint::from_parts(10.0, 10.0, 60.0, 5.0),
            ControlPoint::from_parts(10.0, 10.0, 60.1, 5.1),
            ControlPoint::from_parts(10.0, 10.0, 60.2, 5.2),
        ];
        let err = solve_placement(&points, 0.0, dims).unwrap_err();
        assert_eq!(err, RegistrationError::ZeroVariance { axis: Axis::X });
    }

    #[test]
    fn test_web_mercator_model_is_exact_in_mercator_space() {
        let dims = OverlayDimensions::new(1000, 800);
        let nw = WebMercator.project(LatLon::new(60.41, 5.33));
        let mercator_point = |x: f64, y: f64| {
            let geo = WebMercator.unproject(Vector2::new(nw.x + 2.0 * x, nw.y - 2.0 * y));
            ControlPoint::new(PixelPoint::new(x, y), geo)
        };
        let points = vec![
            mercator_point(100.0, 100.0),
            mercator_point(900.0, 300.0),
            mercator_point(400.0, 700.0),
        ];

        let fit = solve_placement_with(&points, 0.0, dims, PlacementModel::WebMercator).unwrap();
        assert!((fit.nw.lat - 60.41).abs() < 1e-9);
        assert!((fit.nw.lon - 5.33).abs() < 1e-9);
        assert!(fit.mean_squared_error < 1e-18);

        // The same data is not linear in degrees, so the degree model is off
        let degree_fit = solve_placement(&points, 0.0, dims).unwrap();
        assert!(degree_fit.mean_squared_error > fit.mean_squared_error);
    }

    #[test]
    fn test_non_finite_angle_rejected() {
        let dims = OverlayDimensions::new(1325, 1709);
        for theta in [f64::NAN, f64::INFINITY] {
            assert_eq!(
                solve_placement(&regression_points(), theta, dims),
                Err(RegistrationError::NonFiniteAngle)
            );
        }
    }

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let dims = OverlayDimensions::new(1325, 1709);
        let mut points = regression_points();
        points[2].geo.lon = f64::NAN;
        assert_eq!(
            solve_placement(&points, 3.2, dims),
            Err(RegistrationError::NonFiniteCoordinate(2))
        );
    }

    #[test]
    fn test_grid_across_antimeridian() {
        let dims = OverlayDimensions::new(1000, 800);
        // lon runs from 179.99 at x = 0 through 180 to -179.99 at x = 1000
        let wrapped = |x: f64, y: f64| {
            ControlPoint::new(
                PixelPoint::new(x, y),
                LatLon::new(-16.0 - 1e-5 * y, 179.99 + 2e-5 * x).normalized(),
            )
        };
        let points = vec![
            wrapped(100.0, 100.0),
            wrapped(900.0, 300.0),
            wrapped(400.0, 700.0),
        ];
        assert!(points[1].geo.lon < 0.0);

        let fit = solve_placement(&points, 0.0, dims).unwrap();
        assert!((fit.nw.lon - 179.99).abs() < 1e-9, "nw {:?}", fit.nw);
        assert!((fit.se.lon + 179.99).abs() < 1e-9, "se {:?}", fit.se);
        assert!((fit.se.lat + 16.008).abs() < 1e-9);
        assert!(fit.mean_squared_error < 1e-20);

        let located = fit.locate(points[1].pixel);
        assert!((located.lon - points[1].geo.lon).abs() < 1e-9);
    }

    #[test]
    fn test_fit_remembers_model() {
        let dims = OverlayDimensions::new(1000, 800);
        let points = vec![
            grid_point(100.0, 100.0),
            grid_point(900.0, 300.0),
            grid_point(400.0, 700.0),
        ];

        let fit = solve_placement_with(&points, 0.0, dims, PlacementModel::WebMercator).unwrap();
        assert_eq!(fit.model, PlacementModel::WebMercator);
        let corner = fit.locate(PixelPoint::new(0.0, 0.0));
        assert!((corner.lat - fit.nw.lat).abs() < 1e-12);
        assert!((corner.lon - fit.nw.lon).abs() < 1e-12);

        let far = fit.locate(PixelPoint::new(1000.0, 800.0));
        assert!((far.lat - fit.se.lat).abs() < 1e-12);
        assert!((far.lon - fit.se.lon).abs() < 1e-12);
    }
}
