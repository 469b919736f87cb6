//! Tunable settings for registration.

use serde::{Deserialize, Serialize};

use crate::geo::PlacementModel;
use crate::types::{OverlayDimensions, PixelPoint};

/// Default border width as a share of the longer image side.
pub const DEFAULT_BORDER_FRACTION: f64 = 0.13;

/// Default RMS rotation-fit error, in meters, above which a warning is raised.
pub const DEFAULT_RESIDUAL_WARNING_M: f64 = 50.0;

/// Options for [`register_overlay_with`](super::register_overlay_with).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationOptions {
    pub placement_model: PlacementModel,
    /// RMS rotation-fit error in meters that triggers
    /// [`FitWarning::LargeResidual`](super::FitWarning::LargeResidual).
    pub residual_warning_m: f64,
}

impl Default for RegistrationOptions {
    fn default() -> Self {
        Self {
            placement_model: PlacementModel::default(),
            residual_warning_m: DEFAULT_RESIDUAL_WARNING_M,
        }
    }
}

/// Transparent border the image layer pads every overlay with before the
/// control points are picked.
///
/// Registration only needs the bordered dimensions. These helpers keep the
/// caller's arithmetic identical to the image layer's.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderSettings {
    /// Border width per side as a share of the longer image side.
    pub border_fraction: f64,
}

impl Default for BorderSettings {
    fn default() -> Self {
        Self {
            border_fraction: DEFAULT_BORDER_FRACTION,
        }
    }
}

impl BorderSettings {
    pub fn new(border_fraction: f64) -> Self {
        Self { border_fraction }
    }

    /// Border width in pixels for an unbordered image: `floor(max(w, h) * fraction)`.
    pub fn border_size(&self, image: OverlayDimensions) -> u32 {
        let longest = image.width.max(image.height) as f64;
        (longest * self.border_fraction).max(0.0).floor() as u32
    }

    /// Dimensions after padding `image` with the border on all four sides.
    pub fn bordered_dimensions(&self, image: OverlayDimensions) -> OverlayDimensions {
        let border = self.border_size(image);
        OverlayDimensions::new(
            image.width.saturating_add(border.saturating_mul(2)),
            image.height.saturating_add(border.saturating_mul(2)),
        )
    }

    /// Shift a pixel measured on the unbordered image into bordered space.
    pub fn to_bordered(&self, pixel: PixelPoint, image: OverlayDimensions) -> PixelPoint {
        let border = self.border_size(image) as f64;
        PixelPoint::new(pixel.x + border, pixel.y + border)
    }
}
