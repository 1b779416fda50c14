//! Equirectangular (plate carrée) texture mapping.
//!
//! Pixel `x` grows eastwards from the antimeridian, pixel `y` grows southwards
//! from the north pole. Coordinates are continuous; callers round as needed.

use super::{GeoPoint, Vec2};

/// Smallest `sin(latitude band)` used for horizontal stretching near the poles.
pub const MIN_FORESHORTENING: f64 = 1e-3;

pub fn lon_lat_to_pixel(point: GeoPoint, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (point.lon_deg + 180.0) / 360.0 * width as f64,
        -(point.lat_deg - 90.0) / 180.0 * height as f64,
    )
}

pub fn pixel_to_lon_lat(pixel: Vec2, width: u32, height: u32) -> GeoPoint {
    GeoPoint::new(
        pixel.x / width as f64 * 360.0 - 180.0,
        90.0 - pixel.y / height as f64 * 180.0,
    )
}

/// `sin(y / H · π)`: the width of a texture row on the sphere relative to the
/// equator, clamped away from zero at the poles.
pub fn foreshortening(y: f64, height: u32) -> f64 {
    let s = (y / height as f64 * std::f64::consts::PI).sin();
    s.max(MIN_FORESHORTENING)
}

/// Horizontal radius that renders as `radius` on the sphere at row `y`,
/// capped at half the texture width.
pub fn stretched_radius(radius: f64, y: f64, width: u32, height: u32) -> f64 {
    (radius / foreshortening(y, height)).min(width as f64 / 2.0)
}
