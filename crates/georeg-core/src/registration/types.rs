//! Wire types exchanged with the registration page.

use serde::{Deserialize, Serialize};

use super::options::RegistrationOptions;
use super::{register_overlay_with, FitWarning};
use crate::geo::{BoundsExtent, MetersPerPixel};
use crate::types::{ControlPoint, LatLon, OverlayDimensions, PixelPoint, RegistrationError};

/// Registration request as posted by the registration page.
///
/// ```json
/// {
///   "image_coords": [[238, 1337.7], [844, 319.7], [414, 403.7]],
///   "real_coords": [[60.39113, 5.34356], [60.40450, 5.35765], [60.40314, 5.34673]],
///   "overlayWidth": 1325,
///   "overlayHeight": 1709
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    /// Clicked pixels on the bordered overlay, `[x, y]`.
    pub image_coords: Vec<PixelPoint>,
    /// Matching positions, `[lat, lon]`.
    pub real_coords: Vec<LatLon>,
    #[serde(rename = "overlayWidth")]
    pub overlay_width: u32,
    #[serde(rename = "overlayHeight")]
    pub overlay_height: u32,
}

impl RegistrationRequest {
    /// Pair up pixel and geographic coordinates.
    pub fn control_points(&self) -> Result<Vec<ControlPoint>, RegistrationError> {
        if self.image_coords.len() != self.real_coords.len() {
            return Err(RegistrationError::MismatchedLengths {
                pixels: self.image_coords.len(),
                geo: self.real_coords.len(),
            });
        }
        Ok(self
            .image_coords
            .iter()
            .zip(self.real_coords.iter())
            .map(|(&pixel, &geo)| ControlPoint::new(pixel, geo))
            .collect())
    }

    pub fn dimensions(&self) -> OverlayDimensions {
        OverlayDimensions::new(self.overlay_width, self.overlay_height)
    }

    /// Register with default options.
    pub fn register(&self) -> Result<RegistrationResult, RegistrationError> {
        self.register_with(&RegistrationOptions::default())
    }

    pub fn register_with(
        &self,
        options: &RegistrationOptions,
    ) -> Result<RegistrationResult, RegistrationError> {
        let points = self.control_points()?;
        register_overlay_with(&points, self.dimensions(), options)
    }
}

/// Where the bordered overlay goes on the map.
///
/// Persisted verbatim by the map store, so field names are part of the wire
/// format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationResult {
    pub nw_coords: LatLon,
    pub se_coords: LatLon,
    /// Rotation to apply to the bordered image, degrees counter-clockwise.
    pub optimal_rotation_angle: f64,
    /// Placement mean squared error in degrees².
    pub error: f64,
    pub selected_pixel_coords: Vec<PixelPoint>,
    pub selected_realworld_coords: Vec<LatLon>,
    pub overlay_width: u32,
    pub overlay_height: u32,
    pub diagnostics: RegistrationDiagnostics,
}

impl RegistrationResult {
    pub fn dimensions(&self) -> OverlayDimensions {
        OverlayDimensions::new(self.overlay_width, self.overlay_height)
    }

    /// Echoed control points.
    pub fn control_points(&self) -> Vec<ControlPoint> {
        self.selected_pixel_coords
            .iter()
            .zip(self.selected_realworld_coords.iter())
            .map(|(&pixel, &geo)| ControlPoint::new(pixel, geo))
            .collect()
    }
}

/// Fit-quality figures. Informational only, never used to reject a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationDiagnostics {
    /// Ground meters per bordered-image pixel from the rotation fit.
    pub procrustes_scale_m_per_px: f64,
    /// RMS rotation-fit error in meters.
    pub rotation_rms_error_m: f64,
    pub warnings: Vec<FitWarning>,
    /// Pairwise estimate ignoring rotation; `None` if no pair moves on an axis.
    pub meters_per_pixel: Option<MetersPerPixel>,
    pub registered_extent: BoundsExtent,
    pub registered_area_km2: f64,
    /// Overlay `W / H`.
    pub input_aspect_ratio: f64,
    /// Registered `width_m / height_m`; `None` for a zero-height extent.
    pub registered_aspect_ratio: Option<f64>,
}
