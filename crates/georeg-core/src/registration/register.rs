//! The single public registration operation.

use log::{debug, warn};

use super::diagnostics::diagnose;
use super::options::RegistrationOptions;
use super::types::RegistrationResult;
use crate::solve::{solve_placement_with, solve_rotation};
use crate::types::{
    validate_points, ControlPoint, OverlayDimensions, RegistrationError, MIN_CONTROL_POINTS,
};

/// Register an overlay with default options.
///
/// See [`register_overlay_with`].
pub fn register_overlay(
    points: &[ControlPoint],
    dims: OverlayDimensions,
) -> Result<RegistrationResult, RegistrationError> {
    register_overlay_with(points, dims, &RegistrationOptions::default())
}

/// Compute rotation and corner bounds for a bordered overlay.
///
/// Runs the rotation solver once, then the placement solver once with the
/// solved angle. Soft problems are logged and returned in the diagnostics;
/// they never fail the call.
///
/// # Arguments
///
/// * `points` - Three or more control points on the bordered overlay
/// * `dims` - Bordered overlay dimensions the pixels were measured in
/// * `options` - Placement model and warning thresholds
///
/// # Errors
///
/// Input problems ([`ErrorKind::InvalidInput`](crate::ErrorKind::InvalidInput))
/// are checked before any solving. Degenerate point layouts surface from the
/// solvers as [`ErrorKind::DegenerateGeometry`](crate::ErrorKind::DegenerateGeometry).
pub fn register_overlay_with(
    points: &[ControlPoint],
    dims: OverlayDimensions,
    options: &RegistrationOptions,
) -> Result<RegistrationResult, RegistrationError> {
    validate(points, dims)?;

    let rotation = solve_rotation(points, dims)?;
    let placement = solve_placement_with(
        points,
        rotation.theta_degrees,
        dims,
        options.placement_model,
    )?;

    let diagnostics = diagnose(points, dims, &rotation, &placement, options);
    for warning in &diagnostics.warnings {
        warn!("registration: {}", warning);
    }
    debug!(
        "registration: angle={:.4}° nw=({:.6}, {:.6}) se=({:.6}, {:.6}) area={:.3} km² aspect in={:.4} out={:?}",
        rotation.theta_degrees,
        placement.nw.lat,
        placement.nw.lon,
        placement.se.lat,
        placement.se.lon,
        diagnostics.registered_area_km2,
        diagnostics.input_aspect_ratio,
        diagnostics.registered_aspect_ratio,
    );

    Ok(RegistrationResult {
        nw_coords: placement.nw,
        se_coords: placement.se,
        optimal_rotation_angle: rotation.theta_degrees,
        error: placement.mean_squared_error,
        selected_pixel_coords: points.iter().map(|p| p.pixel).collect(),
        selected_realworld_coords: points.iter().map(|p| p.geo).collect(),
        overlay_width: dims.width,
        overlay_height: dims.height,
        diagnostics,
    })
}

fn validate(points: &[ControlPoint], dims: OverlayDimensions) -> Result<(), RegistrationError> {
    if points.len() < MIN_CONTROL_POINTS {
        return Err(RegistrationError::TooFewPoints {
            required: MIN_CONTROL_POINTS,
            found: points.len(),
        });
    }
    if dims.is_empty() {
        return Err(RegistrationError::EmptyOverlay {
            width: dims.width,
            height: dims.height,
        });
    }
    validate_points(points)
}
