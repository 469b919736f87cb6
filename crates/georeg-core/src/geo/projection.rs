//! Plane projections for latitude/longitude.
//!
//! The solvers never touch spherical math directly. They project positions
//! into a plane, fit there, and unproject the results.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::types::LatLon;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Equatorial radius used by the Web-Mercator (EPSG:3857) projection.
pub const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Latitude where Web-Mercator maps to a square world.
pub const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Fold a longitude into `[-180, 180)`.
#[inline]
pub fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..180.0).contains(&lon) {
        return lon;
    }
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Maps geographic positions to and from a flat plane.
///
/// Implementations must be exact inverses of each other within floating
/// point tolerance, with `x` east and `y` north.
pub trait Projection {
    /// Project a geographic position into the plane.
    fn project(&self, geo: LatLon) -> Vector2<f64>;

    /// Map a plane point back to a geographic position.
    fn unproject(&self, plane: Vector2<f64>) -> LatLon;
}

/// Local tangent-plane projection in meters.
///
/// Treats a small patch of the Earth around `origin` as flat:
/// ```text
/// x = Δlon_rad * cos(lat0) * R
/// y = Δlat_rad * R
/// ```
/// Accurate only over short distances, which is fine for control points a
/// few kilometers apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTangentPlane {
    origin: LatLon,
    cos_lat0: f64,
}

impl LocalTangentPlane {
    pub fn new(origin: LatLon) -> Self {
        Self {
            origin,
            cos_lat0: origin.lat.to_radians().cos(),
        }
    }

    /// Tangent plane centered on the arithmetic mean of `points`.
    ///
    /// Longitudes are averaged after unwrapping them next to the first point,
    /// so a cluster straddling the antimeridian is centered on it.
    /// Returns `None` for an empty slice.
    pub fn centered_on<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a LatLon>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;

        let mut count = 1usize;
        let (mut lat_sum, mut lon_sum) = (first.lat, first.lon);
        for p in points {
            lat_sum += p.lat;
            lon_sum += p.unwrapped_near(first.lon).lon;
            count += 1;
        }
        let n = count as f64;
        Some(Self::new(LatLon::new(lat_sum / n, lon_sum / n).normalized()))
    }

    pub fn origin(&self) -> LatLon {
        self.origin
    }
}

impl Projection for LocalTangentPlane {
    fn project(&self, geo: LatLon) -> Vector2<f64> {
        let dlat = (geo.lat - self.origin.lat).to_radians();
        let dlon = wrap_longitude(geo.lon - self.origin.lon).to_radians();
        Vector2::new(
            EARTH_RADIUS_M * dlon * self.cos_lat0,
            EARTH_RADIUS_M * dlat,
        )
    }

    fn unproject(&self, plane: Vector2<f64>) -> LatLon {
        let dlat = (plane.y / EARTH_RADIUS_M).to_degrees();
        let dlon = (plane.x / (EARTH_RADIUS_M * self.cos_lat0)).to_degrees();
        LatLon::new(self.origin.lat + dlat, self.origin.lon + dlon).normalized()
    }
}

/// Degrees used directly as plane coordinates (`x = lon`, `y = lat`).
///
/// Placing an image with this model means latitude and longitude vary
/// linearly across the image, which is how a plain corner-bounds overlay is
/// interpreted by the registration result consumers.
///
/// Longitudes are not wrapped. Callers fitting across the antimeridian unwrap
/// them first (see [`LatLon::unwrapped_near`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Equirectangular;

impl Projection for Equirectangular {
    #[inline]
    fn project(&self, geo: LatLon) -> Vector2<f64> {
        Vector2::new(geo.lon, geo.lat)
    }

    #[inline]
    fn unproject(&self, plane: Vector2<f64>) -> LatLon {
        LatLon::new(plane.y, plane.x)
    }
}

/// Spherical Web-Mercator (EPSG:3857) in meters.
///
/// Latitudes beyond [`WEB_MERCATOR_MAX_LAT`] are clamped before projecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn project(&self, geo: LatLon) -> Vector2<f64> {
        let lat = geo
            .lat
            .clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT)
            .to_radians();
        let x = WEB_MERCATOR_RADIUS_M * geo.lon.to_radians();
        let y = WEB_MERCATOR_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
        Vector2::new(x, y)
    }

    fn unproject(&self, plane: Vector2<f64>) -> LatLon {
        let lon = (plane.x / WEB_MERCATOR_RADIUS_M).to_degrees();
        let lat = (2.0 * (plane.y / WEB_MERCATOR_RADIUS_M).exp().atan()
            - std::f64::consts::FRAC_PI_2)
            .to_degrees();
        LatLon::new(lat, lon)
    }
}

/// Plane in which the overlay is assumed to stretch linearly between its corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementModel {
    /// Latitude and longitude vary linearly across the image.
    #[default]
    Equirectangular,
    /// Web-Mercator meters vary linearly across the image, matching how tile
    /// map clients draw a corner-bounded image overlay.
    WebMercator,
}

impl PlacementModel {
    pub fn projection(&self) -> &'static dyn Projection {
        match self {
            PlacementModel::Equirectangular => &Equirectangular,
            PlacementModel::WebMercator => &WebMercator,
        }
    }
}
