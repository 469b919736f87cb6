//! Rotation solver: orthogonal Procrustes (Kabsch) fit of pixels onto ground.
//!
//! # Algorithm
//!
//! 1. Pixels move to a centered, y-up frame (see [`to_centered_y_up`]).
//! 2. Geographic points are projected onto a [`LocalTangentPlane`] centered on
//!    their mean, giving meters east/north.
//! 3. Both sets are centered on their centroids and the cross-covariance
//!    `H = Σ geo_c · pixel_cᵀ` is decomposed as `H = U Σ Vᵀ`.
//! 4. The rotation is `R = U · S · Vᵀ` where `S = diag(1, d)` and
//!    `d = sign(det(U) · det(Vᵀ))`. A negative `d` means the best orthogonal
//!    map is a reflection; flipping the last singular vector forces a proper
//!    rotation instead.
//! 5. Scale is `trace(Σ S) / Σ |pixel_c|²`, translation is
//!    `geo_centroid - s · R · pixel_centroid`.
//!
//! The angle `atan2(R[1,0], R[0,0])` is counter-clockwise positive in the
//! geographic frame.
//!
//! Collinear pixel points leave `H` rank-deficient. The decomposition still
//! yields a rotation, but it is numerically meaningless; the placement solver
//! is where such input is rejected.

use log::debug;
use nalgebra::{Matrix2, Vector2};

use super::pixel::to_centered_y_up;
use crate::geo::{LocalTangentPlane, Projection};
use crate::types::{
    validate_points, ControlPoint, LatLon, OverlayDimensions, RegistrationError, MIN_CONTROL_POINTS,
};

/// Pixel spread below which the points are treated as a single location.
const MIN_SOURCE_VARIANCE: f64 = 1e-10;

/// `target ≈ scale · rotation · source + translation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityTransform {
    pub scale: f64,
    pub rotation: Matrix2<f64>,
    pub translation: Vector2<f64>,
}

impl SimilarityTransform {
    #[cfg(test)]
    pub(crate) fn identity() -> Self {
        Self {
            scale: 1.0,
            rotation: Matrix2::identity(),
            translation: Vector2::zeros(),
        }
    }

    /// Rotation angle in radians, counter-clockwise positive.
    pub fn angle_radians(&self) -> f64 {
        self.rotation[(1, 0)].atan2(self.rotation[(0, 0)])
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle_radians().to_degrees()
    }

    #[inline]
    pub fn apply(&self, point: &Vector2<f64>) -> Vector2<f64> {
        self.scale * (self.rotation * point) + self.translation
    }
}

/// Result of [`solve_rotation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationFit {
    /// Map rotation in degrees, counter-clockwise positive.
    pub theta_degrees: f64,
    /// Root-mean-square distance in meters between fitted and true positions.
    pub fit_error: f64,
    /// Fitted transform from centered y-up pixels to tangent-plane meters.
    pub transform: SimilarityTransform,
    /// Origin of the tangent plane the transform targets.
    pub plane_origin: LatLon,
    /// True when the best orthogonal fit was a reflection, which points at
    /// control points entered with mirrored handedness.
    pub reflection_detected: bool,
}

impl RotationFit {
    /// Ground meters per pixel implied by the fit.
    pub fn meters_per_pixel(&self) -> f64 {
        self.transform.scale
    }
}

/// Solve for the rotation that best superimposes pixel layout onto ground layout.
///
/// # Arguments
///
/// * `points` - At least three control points
/// * `dims` - Dimensions of the bordered overlay the pixels were measured on
///
/// # Errors
///
/// * [`RegistrationError::TooFewPoints`] with fewer than three points
/// * [`RegistrationError::NonFiniteCoordinate`] or
///   [`RegistrationError::CoordinateOutOfRange`] for an unusable point
/// * [`RegistrationError::CoincidentPixels`] when every pixel is the same
/// * [`RegistrationError::DecompositionFailed`] if the SVD yields no vectors
pub fn solve_rotation(
    points: &[ControlPoint],
    dims: OverlayDimensions,
) -> Result<RotationFit, RegistrationError> {
    let too_few = RegistrationError::TooFewPoints {
        required: MIN_CONTROL_POINTS,
        found: points.len(),
    };
    if points.len() < MIN_CONTROL_POINTS {
        return Err(too_few);
    }
    validate_points(points)?;

    let plane = LocalTangentPlane::centered_on(points.iter().map(|p| &p.geo)).ok_or(too_few)?;

    let source: Vec<Vector2<f64>> = points
        .iter()
        .map(|p| to_centered_y_up(p.pixel, dims))
        .collect();
    let target: Vec<Vector2<f64>> = points.iter().map(|p| plane.project(p.geo)).collect();

    let (transform, reflection_detected) = fit_similarity(&source, &target)?;
    let fit_error = rms_error(&transform, &source, &target);
    let theta_degrees = transform.angle_degrees();

    debug!(
        "rotation fit: theta={:.4}° scale={:.4} m/px rms={:.3} m reflection={}",
        theta_degrees, transform.scale, fit_error, reflection_detected
    );

    Ok(RotationFit {
        theta_degrees,
        fit_error,
        transform,
        plane_origin: plane.origin(),
        reflection_detected,
    })
}

/// Kabsch/Umeyama similarity fit from `source` onto `target`.
///
/// Returns the transform and whether a reflection had to be suppressed.
pub(crate) fn fit_similarity(
    source: &[Vector2<f64>],
    target: &[Vector2<f64>],
) -> Result<(SimilarityTransform, bool), RegistrationError> {
    let src_centroid = centroid(source);
    let tar_centroid = centroid(target);

    let mut h: Matrix2<f64> = Matrix2::zeros();
    let mut src_var = 0.0;
    for (s, t) in source.iter().zip(target.iter()) {
        let sc = s - src_centroid;
        let tc = t - tar_centroid;
        h += tc * sc.transpose();
        src_var += sc.norm_squared();
    }

    if src_var < MIN_SOURCE_VARIANCE {
        return Err(RegistrationError::CoincidentPixels);
    }

    let svd = h.svd(true, true);
    let u = svd.u.ok_or(RegistrationError::DecompositionFailed)?;
    let v_t = svd.v_t.ok_or(RegistrationError::DecompositionFailed)?;
    let sigma = svd.singular_values;

    let reflection = u.determinant() * v_t.determinant() < 0.0;
    let d = if reflection { -1.0 } else { 1.0 };
    let s = Matrix2::new(1.0, 0.0, 0.0, d);

    let rotation = u * s * v_t;
    let scale = (sigma[0] + d * sigma[1]) / src_var;
    let translation = tar_centroid - scale * (rotation * src_centroid);

    Ok((
        SimilarityTransform {
            scale,
            rotation,
            translation,
        },
        reflection,
    ))
}

pub(crate) fn centroid(points: &[Vector2<f64>]) -> Vector2<f64> {
    if points.is_empty() {
        return Vector2::zeros();
    }
    let sum: Vector2<f64> = points.iter().fold(Vector2::zeros(), |acc, p| acc + p);
    sum / points.len() as f64
}

fn rms_error(
    transform: &SimilarityTransform,
    source: &[Vector2<f64>],
    target: &[Vector2<f64>],
) -> f64 {
    if source.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = source
        .iter()
        .zip(target.iter())
        .map(|(s, t)| (transform.apply(s) - t).norm_squared())
        .sum();
    (sum_sq / source.len() as f64).sqrt()
}
