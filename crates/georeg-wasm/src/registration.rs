//! WASM bindings for overlay registration.
//!
//! These back the registration page: the user clicks three points on the
//! bordered map image and three points on the web map, and the page asks for
//! the rotation and corner bounds to drape the image with.

use georeg_core::registration::{BorderSettings, RegistrationOptions, RegistrationRequest};
use georeg_core::solve::rotate_about_center;
use georeg_core::{OverlayDimensions, PixelPoint, RegistrationError};
use wasm_bindgen::prelude::*;

fn to_js_error(err: RegistrationError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn decode_request(request: JsValue) -> Result<RegistrationRequest, RegistrationError> {
    serde_wasm_bindgen::from_value(request).map_err(|e| RegistrationError::Malformed(e.to_string()))
}

fn decode_options(options: JsValue) -> Result<RegistrationOptions, RegistrationError> {
    if options.is_undefined() || options.is_null() {
        return Ok(RegistrationOptions::default());
    }
    serde_wasm_bindgen::from_value(options).map_err(|e| RegistrationError::Malformed(e.to_string()))
}

/// Compute overlay rotation and corner bounds.
///
/// # Arguments
///
/// * `request` - `{ image_coords, real_coords, overlayWidth, overlayHeight }`
///
/// # Returns
///
/// The registration result object, or an error string prefixed with
/// `Invalid input:` or `Degenerate geometry:`.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const result = get_overlay_coordinates({
///   image_coords: [[238, 1337.7], [844, 319.7], [414, 403.7]],
///   real_coords: [[60.39113, 5.34356], [60.4045, 5.35765], [60.40314, 5.34673]],
///   overlayWidth: 1325,
///   overlayHeight: 1709,
/// });
/// L.imageOverlay(url, [result.nw_coords, result.se_coords]).addTo(map);
/// ```
#[wasm_bindgen]
pub fn get_overlay_coordinates(request: JsValue) -> Result<JsValue, JsValue> {
    get_overlay_coordinates_with_options(request, JsValue::UNDEFINED)
}

/// Like [`get_overlay_coordinates`] with `{ placement_model, residual_warning_m }`
/// options. Missing fields take their defaults.
#[wasm_bindgen]
pub fn get_overlay_coordinates_with_options(
    request: JsValue,
    options: JsValue,
) -> Result<JsValue, JsValue> {
    let request = decode_request(request).map_err(to_js_error)?;
    let options = decode_options(options).map_err(to_js_error)?;
    let result = request.register_with(&options).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Where a pixel of the bordered image lands after the image is rotated by
/// `angle_degrees` (counter-clockwise) about its center.
///
/// Returns `[x, y]`.
#[wasm_bindgen]
pub fn rotate_pixel(x: f64, y: f64, angle_degrees: f64, width: u32, height: u32) -> Vec<f64> {
    let rotated = rotate_about_center(
        PixelPoint::new(x, y),
        angle_degrees,
        OverlayDimensions::new(width, height),
    );
    vec![rotated.x, rotated.y]
}

/// Transparent border width per side for an unbordered image.
#[wasm_bindgen]
pub fn border_size(width: u32, height: u32) -> u32 {
    BorderSettings::default().border_size(OverlayDimensions::new(width, height))
}

/// `[width, height]` of the image after padding it with the border.
///
/// These are the dimensions to send as `overlayWidth` / `overlayHeight`.
#[wasm_bindgen]
pub fn bordered_dimensions(width: u32, height: u32) -> Vec<u32> {
    let bordered = BorderSettings::default().bordered_dimensions(OverlayDimensions::new(width, height));
    vec![bordered.width, bordered.height]
}
