//! Georeg WASM - WebAssembly bindings for overlay geo-registration
//!
//! This crate exposes georeg-core to the browser-side registration page.
//!
//! # Module Structure
//!
//! - `registration` - Overlay coordinates, pixel rotation preview, border helpers
//! - `logger` - Routes `log` output from the core to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { get_overlay_coordinates, bordered_dimensions } from '@georeg/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const [overlayWidth, overlayHeight] = bordered_dimensions(img.width, img.height);
//! const result = get_overlay_coordinates({ image_coords, real_coords, overlayWidth, overlayHeight });
//! console.log(`Rotate by ${result.optimal_rotation_angle}°`);
//! ```

use wasm_bindgen::prelude::*;

mod logger;
mod registration;

pub use logger::ConsoleLogger;
pub use registration::{
    border_size, bordered_dimensions, get_overlay_coordinates,
    get_overlay_coordinates_with_options, rotate_pixel,
};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install();
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
