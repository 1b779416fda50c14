use std::f64::consts::{FRAC_PI_2, TAU};

use foundation::math::{GeoPoint, Vec2, Vec3, wrap_rad_tau};

use crate::camera::CameraMatrices;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// A picked spot on the globe in texture terms.
///
/// `texture_lon_rad` runs east from the antimeridian (0 at the left texture
/// edge); latitude is north-positive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfacePoint {
    pub texture_lon_rad: f64,
    pub lat_rad: f64,
}

impl SurfacePoint {
    pub fn geo_point(&self) -> GeoPoint {
        GeoPoint::new(
            self.texture_lon_rad.to_degrees() - 180.0,
            self.lat_rad.to_degrees(),
        )
    }

    /// Within `exclusion_rad` of either pole, where longitude is meaningless.
    pub fn is_polar(&self, exclusion_rad: f64) -> bool {
        self.lat_rad.abs() > FRAC_PI_2 - exclusion_rad
    }

    /// Continuous pixel position on a `width` x `height` equirectangular raster.
    pub fn pixel(&self, width: u32, height: u32) -> Vec2 {
        Vec2::new(
            self.texture_lon_rad / TAU * width as f64,
            (FRAC_PI_2 - self.lat_rad) / std::f64::consts::PI * height as f64,
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PickOutcome {
    /// The ray passed beside the globe.
    Miss,
    /// Hit close to a pole: report the coordinates but place no marker.
    Polar(SurfacePoint),
    Hit(SurfacePoint),
}

impl PickOutcome {
    pub fn surface_point(&self) -> Option<SurfacePoint> {
        match self {
            PickOutcome::Miss => None,
            PickOutcome::Polar(p) | PickOutcome::Hit(p) => Some(*p),
        }
    }
}

/// Host pointer coordinates grow downwards; the ray caster wants them upwards.
pub fn flip_y(screen: Vec2, viewport_height: u32) -> Vec2 {
    Vec2::new(screen.x, viewport_height as f64 - screen.y)
}

/// World-space ray through a screen position given with a bottom-left origin.
pub fn cast_ray(screen: Vec2, viewport: (u32, u32), matrices: &CameraMatrices) -> Ray {
    let (w, h) = (viewport.0.max(1) as f64, viewport.1.max(1) as f64);
    let ndc_x = 2.0 * screen.x / w - 1.0;
    let ndc_y = 2.0 * screen.y / h - 1.0;

    // Unproject onto the near plane; only the xy direction survives.
    let [ex, ey, _, _] = matrices.inv_projection.mul_vec4([ndc_x, ndc_y, -1.0, 1.0]);
    let dir = matrices.inv_view.transform_dir(Vec3::new(ex, ey, -1.0));
    let origin = matrices.inv_view.transform_point(Vec3::ZERO);
    Ray::new(origin, dir)
}

/// Nearest intersection with a sphere centered at the origin.
///
/// Returns `None` when the ray misses or the sphere lies behind the origin.
pub fn intersect_sphere(ray: Ray, radius: f64) -> Option<Vec3> {
    let a = ray.dir.dot(ray.dir);
    if a <= 0.0 {
        return None;
    }
    let b = 2.0 * ray.origin.dot(ray.dir);
    let c = ray.origin.dot(ray.origin) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / (2.0 * a);
    if t < 0.0 {
        return None;
    }
    Some(ray.at(t))
}

/// Converts a world-space point on the globe to texture longitude and latitude.
///
/// The globe is turned by `horizontal_deg` about +Y, so that angle is added
/// back; the quarter turn moves the zero from +Z to the texture's left edge.
pub fn to_geographic(point: Vec3, horizontal_deg: f64, radius: f64) -> SurfacePoint {
    let lon = point.x.atan2(point.z) - FRAC_PI_2 + horizontal_deg.to_radians();
    let lat = (point.y / radius).clamp(-1.0, 1.0).asin();
    SurfacePoint {
        texture_lon_rad: wrap_rad_tau(lon),
        lat_rad: lat,
    }
}

/// Full pick from a host pointer position (top-left origin).
pub fn pick(
    screen: Vec2,
    viewport: (u32, u32),
    matrices: &CameraMatrices,
    horizontal_deg: f64,
    radius: f64,
    polar_exclusion_rad: f64,
) -> PickOutcome {
    let ray = cast_ray(flip_y(screen, viewport.1), viewport, matrices);
    let Some(hit) = intersect_sphere(ray, radius) else {
        return PickOutcome::Miss;
    };
    let surface = to_geographic(hit, horizontal_deg, radius);
    if surface.is_polar(polar_exclusion_rad) {
        PickOutcome::Polar(surface)
    } else {
        PickOutcome::Hit(surface)
    }
}
