//! Fit-quality reporting.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::options::RegistrationOptions;
use super::types::RegistrationDiagnostics;
use crate::geo::{bounds_extent, meters_per_pixel};
use crate::solve::{PlacementFit, RotationFit};
use crate::types::{ControlPoint, OverlayDimensions};

/// Soft problem with a registration. The result is still returned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitWarning {
    /// The pixel layout is a mirror image of the ground layout. Usually the
    /// latitude and longitude of the clicked points were swapped, or points
    /// were paired in the wrong order.
    ReflectedControlPoints,
    /// The rotation fit misses the control points by more than the configured
    /// threshold.
    LargeResidual { rms_m: f64 },
}

impl fmt::Display for FitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitWarning::ReflectedControlPoints => {
                write!(f, "control points appear mirrored relative to the map")
            }
            FitWarning::LargeResidual { rms_m } => {
                write!(f, "rotation fit error is {:.1} m RMS", rms_m)
            }
        }
    }
}

pub(crate) fn collect_warnings(rotation: &RotationFit, options: &RegistrationOptions) -> Vec<FitWarning> {
    let mut warnings = Vec::new();
    if rotation.reflection_detected {
        warnings.push(FitWarning::ReflectedControlPoints);
    }
    if rotation.fit_error > options.residual_warning_m {
        warnings.push(FitWarning::LargeResidual {
            rms_m: rotation.fit_error,
        });
    }
    warnings
}

pub(crate) fn diagnose(
    points: &[ControlPoint],
    dims: OverlayDimensions,
    rotation: &RotationFit,
    placement: &PlacementFit,
    options: &RegistrationOptions,
) -> RegistrationDiagnostics {
    let extent = bounds_extent(placement.nw, placement.se);

    RegistrationDiagnostics {
        procrustes_scale_m_per_px: rotation.meters_per_pixel(),
        rotation_rms_error_m: rotation.fit_error,
        warnings: collect_warnings(rotation, options),
        meters_per_pixel: meters_per_pixel(points),
        registered_extent: extent,
        registered_area_km2: extent.area_km2(),
        input_aspect_ratio: dims.aspect_ratio(),
        registered_aspect_ratio: extent.aspect_ratio(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::SimilarityTransform;
    use crate::types::LatLon;

    fn rotation_fit(fit_error: f64, reflection_detected: bool) -> RotationFit {
        RotationFit {
            theta_degrees: 0.0,
            fit_error,
            transform: SimilarityTransform::identity(),
            plane_origin: LatLon::new(60.0, 5.0),
            reflection_detected,
        }
    }

    #[test]
    fn test_clean_fit_has_no_warnings() {
        let warnings = collect_warnings(&rotation_fit(0.5, false), &RegistrationOptions::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_reflection_and_residual_warnings() {
        let warnings = collect_warnings(&rotation_fit(400.0, true), &RegistrationOptions::default());
        assert_eq!(
            warnings,
            vec![
                FitWarning::ReflectedControlPoints,
                FitWarning::LargeResidual { rms_m: 400.0 }
            ]
        );
    }

    #[test]
    fn test_residual_threshold_is_configurable() {
        let options = RegistrationOptions {
            residual_warning_m: 0.1,
            ..Default::default()
        };
        let warnings = collect_warnings(&rotation_fit(0.5, false), &options);
        assert_eq!(warnings, vec![FitWarning::LargeResidual { rms_m: 0.5 }]);
    }

    #[test]
    fn test_warning_wire_format() {
        let json = serde_json::to_string(&FitWarning::ReflectedControlPoints).unwrap();
        assert_eq!(json, r#"{"kind":"reflected_control_points"}"#);

        let json = serde_json::to_string(&FitWarning::LargeResidual { rms_m: 12.5 }).unwrap();
        assert_eq!(json, r#"{"kind":"large_residual","rms_m":12.5}"#);
    }

    #[test]
    fn test_warning_display() {
        assert_eq!(
            FitWarning::LargeResidual { rms_m: 399.84 }.to_string(),
            "rotation fit error is 399.8 m RMS"
        );
    }
}
