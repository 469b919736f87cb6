//! Geographic helpers: plane projections and great-circle measurements.
//!
//! # Projections
//!
//! Every solver works in a flat plane. How latitude/longitude map into that
//! plane is a [`Projection`] strategy:
//!
//! - [`LocalTangentPlane`] - meters east/north of an origin, accurate over a
//!   few kilometers. Used by the rotation solver.
//! - [`Equirectangular`] - degrees as-is (`x = lon`, `y = lat`). The default
//!   placement model.
//! - [`WebMercator`] - EPSG:3857 meters, for map clients that stretch an image
//!   overlay linearly in Web-Mercator space.
//!
//! # Coordinate System
//!
//! Plane points are `Vector2<f64>` with `x` pointing east and `y` pointing
//! north.

mod distance;
mod projection;

pub use distance::{bounds_extent, haversine_m, meters_per_pixel, BoundsExtent, MetersPerPixel};
pub use projection::{
    wrap_longitude, Equirectangular, LocalTangentPlane, PlacementModel, Projection, WebMercator,
    EARTH_RADIUS_M, WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_RADIUS_M,
};
