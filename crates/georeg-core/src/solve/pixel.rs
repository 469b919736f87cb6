//! Pixel-frame helpers shared by the solvers.
//!
//! Image coordinates have their origin at the top-left corner with `y`
//! growing downward. The rotation solver works in a centered, y-up frame so
//! that rotating about the image center is the same operation as rotating in
//! the geographic plane.
//!
//! # Rotation Convention
//!
//! [`rotate_about_center`] matches a center-pinned image rotation with canvas
//! expansion disabled: a positive angle turns the picture counter-clockwise
//! as seen on screen. For a point at `(x, y)` the mapping is:
//! ```text
//! θ' = -θ
//! x' = (x - cx) * cos(θ') - (y - cy) * sin(θ') + cx
//! y' = (x - cx) * sin(θ') + (y - cy) * cos(θ') + cy
//! ```
//! The angle is negated because the standard rotation matrix turns clockwise
//! on screen when `y` points down.

use nalgebra::Vector2;

use crate::types::{OverlayDimensions, PixelPoint};

/// Convert a pixel to a frame centered on the image with `y` pointing up.
#[inline]
pub fn to_centered_y_up(pixel: PixelPoint, dims: OverlayDimensions) -> Vector2<f64> {
    let (cx, cy) = dims.center();
    Vector2::new(pixel.x - cx, cy - pixel.y)
}

/// Rotate a pixel about the image center.
///
/// # Arguments
///
/// * `pixel` - Point in image coordinates (top-left origin, y down)
/// * `angle_degrees` - Rotation angle in degrees (positive = counter-clockwise on screen)
/// * `dims` - Dimensions of the image the point lives in
///
/// # Returns
///
/// Where the pixel lands after the whole image is rotated by `angle_degrees`
/// about its center on an unexpanded canvas.
pub fn rotate_about_center(
    pixel: PixelPoint,
    angle_degrees: f64,
    dims: OverlayDimensions,
) -> PixelPoint {
    let (cx, cy) = dims.center();

    // Negate angle for correct visual rotation direction
    let angle_rad = -angle_degrees.to_radians();
    let (sin, cos) = angle_rad.sin_cos();

    let dx = pixel.x - cx;
    let dy = pixel.y - cy;

    PixelPoint::new(dx * cos - dy * sin + cx, dx * sin + dy * cos + cy)
}

/// Rotate every pixel about the image center. See [`rotate_about_center`].
pub fn rotate_points_about_center(
    pixels: &[PixelPoint],
    angle_degrees: f64,
    dims: OverlayDimensions,
) -> Vec<PixelPoint> {
    pixels
        .iter()
        .map(|&p| rotate_about_center(p, angle_degrees, dims))
        .collect()
}
