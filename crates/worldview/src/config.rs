use layers::OverlayStyle;
use scene::{CameraParams, InertiaParams};
use serde::{Deserialize, Serialize};

/// Tunables of the globe view. Every field has a default, so a partial JSON
/// document only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub sphere_radius: f64,
    pub sphere_step: u32,
    pub eye_distance: f64,
    pub near: f64,
    pub far: f64,
    pub min_zoom: f64,
    pub initial_horizontal_deg: f64,
    pub initial_vertical_deg: f64,
    pub max_vertical_deg: f64,
    pub inertia: InertiaConfig,
    /// Pointer pixels per degree of rotation at zoom 1.
    pub drag_divisor: f64,
    /// Picks closer than this to a pole (radians) get no marker.
    pub polar_exclusion_rad: f64,
    /// Pointer travel in pixels still treated as a tap.
    pub tap_slop_px: f64,
    pub point_radius_px: f64,
    pub stamp_radius_px: f64,
    pub marker_radius_px: f64,
    pub point_color: [u8; 4],
    pub marker_color: [u8; 4],
    pub alpha_floor: u8,
    pub queue_capacity: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InertiaConfig {
    pub damping: f64,
    pub vertical_ratio: f64,
    pub snap_threshold: f64,
}

impl Default for InertiaConfig {
    fn default() -> Self {
        let p = InertiaParams::default();
        Self {
            damping: p.damping,
            vertical_ratio: p.vertical_ratio,
            snap_threshold: p.snap_threshold,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let style = OverlayStyle::default();
        Self {
            sphere_radius: scene::DEFAULT_RADIUS,
            sphere_step: scene::DEFAULT_STEP,
            eye_distance: 5.0,
            near: 1.0,
            far: 10.0,
            min_zoom: 0.15,
            initial_horizontal_deg: -70.0,
            initial_vertical_deg: -16.0,
            max_vertical_deg: 75.0,
            inertia: InertiaConfig::default(),
            drag_divisor: 5.0,
            polar_exclusion_rad: 0.1,
            tap_slop_px: 0.0,
            point_radius_px: style.point_radius,
            stamp_radius_px: style.stamp_radius,
            marker_radius_px: style.marker_radius,
            point_color: style.point_color,
            marker_color: style.marker_color,
            alpha_floor: style.alpha_floor,
            queue_capacity: 1024,
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn camera_params(&self) -> CameraParams {
        CameraParams {
            eye_distance: self.eye_distance,
            near: self.near,
            far: self.far,
            min_zoom: self.min_zoom,
            max_zoom: 1.0,
            max_vertical_deg: self.max_vertical_deg,
            inertia: InertiaParams {
                damping: self.inertia.damping,
                vertical_ratio: self.inertia.vertical_ratio,
                snap_threshold: self.inertia.snap_threshold,
            },
        }
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            point_color: self.point_color,
            point_radius: self.point_radius_px,
            stamp_radius: self.stamp_radius_px,
            marker_color: self.marker_color,
            marker_radius: self.marker_radius_px,
            alpha_floor: self.alpha_floor,
        }
    }
}
