use std::f64::consts::TAU;

/// A geographic position in degrees (WGS84-style longitude/latitude order).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoPoint {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// Finite and inside [-180, 180] x [-90, 90].
    pub fn is_valid(&self) -> bool {
        self.lon_deg.is_finite()
            && self.lat_deg.is_finite()
            && (-180.0..=180.0).contains(&self.lon_deg)
            && (-90.0..=90.0).contains(&self.lat_deg)
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn wrap_deg_360(deg: f64) -> f64 {
    let w = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if w >= 360.0 { 0.0 } else { w }
}

/// Wraps an angle in radians into `[0, 2π)`.
pub fn wrap_rad_tau(rad: f64) -> f64 {
    let w = rad.rem_euclid(TAU);
    if w >= TAU { 0.0 } else { w }
}
