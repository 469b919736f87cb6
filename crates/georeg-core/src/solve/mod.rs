//! The two numerical stages of overlay registration.
//!
//! 1. [`solve_rotation`] finds how far the overlay is turned relative to
//!    north-up with a Procrustes (similarity) fit.
//! 2. [`solve_placement`] de-rotates the control pixels by that angle and fits
//!    each image axis against one geographic axis by ordinary least squares.
//!
//! Both stages are pure functions of their inputs.

mod pixel;
mod placement;
mod rotation;

pub use pixel::{rotate_about_center, rotate_points_about_center, to_centered_y_up};
pub use placement::{solve_placement, solve_placement_with, PlacementFit, MIN_PLACEMENT_POINTS};
pub use rotation::{solve_rotation, RotationFit, SimilarityTransform};
