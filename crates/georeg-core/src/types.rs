//! Core value types shared by the solvers and the registration facade.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::wrap_longitude;

/// Minimum number of control points a registration request must carry.
pub const MIN_CONTROL_POINTS: usize = 3;

/// A pixel position on the bordered overlay image.
///
/// Origin is the top-left corner, `y` grows downward. Serialized as a
/// two-element `[x, y]` array to match what the registration page sends.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for PixelPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<PixelPoint> for (f64, f64) {
    fn from(p: PixelPoint) -> Self {
        (p.x, p.y)
    }
}

/// A WGS84 position in degrees, serialized as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Check that latitude is within [-90, 90] and longitude within [-180, 180].
    #[inline]
    pub fn in_range(&self) -> bool {
        self.lat.abs() <= 90.0 && self.lon.abs() <= 180.0
    }

    /// Same position with longitude folded into `[-180, 180)`.
    #[inline]
    pub fn normalized(&self) -> LatLon {
        LatLon::new(self.lat, wrap_longitude(self.lon))
    }

    /// Same position with longitude shifted by whole turns to lie within 180°
    /// of `reference_lon`. Lets points straddling the antimeridian be fitted
    /// in a continuous plane.
    #[inline]
    pub fn unwrapped_near(&self, reference_lon: f64) -> LatLon {
        if (self.lon - reference_lon).abs() <= 180.0 {
            return *self;
        }
        LatLon::new(self.lat, reference_lon + wrap_longitude(self.lon - reference_lon))
    }

    /// Squared Euclidean distance in degree space.
    #[inline]
    pub fn distance_squared_deg(&self, other: &LatLon) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        dlat * dlat + dlon * dlon
    }
}

impl From<(f64, f64)> for LatLon {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl From<LatLon> for (f64, f64) {
    fn from(p: LatLon) -> Self {
        (p.lat, p.lon)
    }
}

/// A calibration pair linking one pixel on the overlay to one known position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub pixel: PixelPoint,
    pub geo: LatLon,
}

impl ControlPoint {
    pub fn new(pixel: PixelPoint, geo: LatLon) -> Self {
        Self { pixel, geo }
    }

    /// Shorthand for `ControlPoint::new(PixelPoint::new(x, y), LatLon::new(lat, lon))`.
    pub fn from_parts(x: f64, y: f64, lat: f64, lon: f64) -> Self {
        Self::new(PixelPoint::new(x, y), LatLon::new(lat, lon))
    }
}

/// Pixel dimensions of the bordered overlay image.
///
/// These must describe the same pixel space the control points were clicked
/// in, otherwise the image center (the rotation pivot) is wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverlayDimensions {
    pub width: u32,
    pub height: u32,
}

impl OverlayDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Image center `(W/2, H/2)` in pixel coordinates.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Returns true if either side is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Image axis, used to report which regression lost its variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Broad classification of a [`RegistrationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is malformed. Fix the request.
    InvalidInput,
    /// The request is well-formed but the points cannot determine a placement.
    /// Pick better control points.
    DegenerateGeometry,
}

/// Error types for registration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// Fewer control points than the solver needs.
    #[error("Invalid input: expected at least {required} control points, got {found}")]
    TooFewPoints { required: usize, found: usize },

    /// Pixel and geographic coordinate lists have different lengths.
    #[error("Invalid input: {pixels} pixel coordinates but {geo} geographic coordinates")]
    MismatchedLengths { pixels: usize, geo: usize },

    /// A coordinate is NaN or infinite.
    #[error("Invalid input: control point {0} has a non-finite coordinate")]
    NonFiniteCoordinate(usize),

    /// Latitude or longitude outside the valid WGS84 range.
    #[error("Invalid input: control point {0} is outside the valid latitude/longitude range")]
    CoordinateOutOfRange(usize),

    /// Rotation angle handed to the placement solver is NaN or infinite.
    #[error("Invalid input: rotation angle must be finite")]
    NonFiniteAngle,

    /// Overlay has no area.
    #[error("Invalid input: overlay dimensions must be non-zero, got {width}x{height}")]
    EmptyOverlay { width: u32, height: u32 },

    /// The request could not be decoded (missing or non-numeric field).
    #[error("Invalid input: {0}")]
    Malformed(String),

    /// All rotated pixel coordinates share the same value on one axis.
    #[error("Degenerate geometry: rotated {axis} coordinates have zero variance")]
    ZeroVariance { axis: Axis },

    /// Three or more control points lie on a single line.
    #[error("Degenerate geometry: control points are collinear")]
    CollinearPoints,

    /// All pixel coordinates are the same point.
    #[error("Degenerate geometry: all pixel coordinates coincide")]
    CoincidentPixels,

    /// The singular value decomposition did not produce singular vectors.
    #[error("Degenerate geometry: singular value decomposition failed")]
    DecompositionFailed,
}

impl RegistrationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistrationError::TooFewPoints { .. }
            | RegistrationError::MismatchedLengths { .. }
            | RegistrationError::NonFiniteCoordinate(_)
            | RegistrationError::CoordinateOutOfRange(_)
            | RegistrationError::NonFiniteAngle
            | RegistrationError::EmptyOverlay { .. }
            | RegistrationError::Malformed(_) => ErrorKind::InvalidInput,
            RegistrationError::ZeroVariance { .. }
            | RegistrationError::CollinearPoints
            | RegistrationError::CoincidentPixels
            | RegistrationError::DecompositionFailed => ErrorKind::DegenerateGeometry,
        }
    }
}

/// Check every control point is finite and within WGS84 range.
pub(crate) fn validate_points(points: &[ControlPoint]) -> Result<(), RegistrationError> {
    for (i, p) in points.iter().enumerate() {
        if !p.pixel.is_finite() || !p.geo.is_finite() {
            return Err(RegistrationError::NonFiniteCoordinate(i));
        }
        if !p.geo.in_range() {
            return Err(RegistrationError::CoordinateOutOfRange(i));
        }
    }
    Ok(())
}
