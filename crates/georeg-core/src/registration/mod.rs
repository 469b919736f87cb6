//! Registration facade: request in, overlay bounds out.
//!
//! # Usage
//!
//! ```ignore
//! use georeg_core::registration::RegistrationRequest;
//!
//! let request: RegistrationRequest = serde_json::from_str(body)?;
//! let result = request.register()?;
//! // Rotate the bordered image by result.optimal_rotation_angle about its
//! // center, then drape it between result.nw_coords and result.se_coords.
//! ```

mod diagnostics;
mod options;
mod register;
mod types;

pub use diagnostics::FitWarning;
pub use crate::geo::PlacementModel;
pub use options::{
    BorderSettings, RegistrationOptions, DEFAULT_BORDER_FRACTION, DEFAULT_RESIDUAL_WARNING_M,
};
pub use register::{register_overlay, register_overlay_with};
pub use types::{RegistrationDiagnostics, RegistrationRequest, RegistrationResult};
