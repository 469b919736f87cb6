//! Georeg Core - overlay geo-registration engine
//!
//! Given three or more control points pairing a pixel on a scanned map with a
//! known latitude/longitude, this crate finds the rotation that turns the map
//! north-up and the north-west/south-east corners the rotated, bordered image
//! must be draped between on a web map.
//!
//! The pipeline is a single pass:
//! control points → [`solve::solve_rotation`] → [`solve::solve_placement`] → corners.
//! [`registration::register_overlay`] runs it and adds diagnostics.

pub mod geo;
pub mod registration;
pub mod solve;
pub mod types;

pub use registration::{
    register_overlay, register_overlay_with, FitWarning, RegistrationOptions,
    RegistrationRequest, RegistrationResult,
};
pub use types::{
    Axis, ControlPoint, ErrorKind, LatLon, OverlayDimensions, PixelPoint, RegistrationError,
};
