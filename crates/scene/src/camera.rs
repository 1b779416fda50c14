//! Orbit camera around the globe.
//!
//! The globe spins about +Y by the horizontal angle (model matrix) while the
//! eye slides along a vertical circle by the vertical angle (view matrix).
//! Zoom scales the frustum extents, never the eye distance.

use foundation::math::{Mat4, Vec2, Vec3, wrap_deg_360};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InertiaParams {
    /// Multiplier applied to pending movement every frame.
    pub damping: f64,
    /// Share of vertical movement turned into vertical angle.
    pub vertical_ratio: f64,
    /// Pending movement below this magnitude stops dead.
    pub snap_threshold: f64,
}

impl Default for InertiaParams {
    fn default() -> Self {
        Self {
            damping: 0.93,
            vertical_ratio: 0.7,
            snap_threshold: 0.08,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraParams {
    pub eye_distance: f64,
    pub near: f64,
    pub far: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub max_vertical_deg: f64,
    pub inertia: InertiaParams,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            eye_distance: 5.0,
            near: 1.0,
            far: 10.0,
            min_zoom: 0.15,
            max_zoom: 1.0,
            max_vertical_deg: 75.0,
            inertia: InertiaParams::default(),
        }
    }
}

/// Everything a frame or a pick needs, derived from one camera snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraMatrices {
    pub eye: Vec3,
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub inv_view: Mat4,
    pub inv_projection: Mat4,
}

impl CameraMatrices {
    pub fn model_view(&self) -> Mat4 {
        self.view.mul(&self.model)
    }

    pub fn model_view_projection(&self) -> Mat4 {
        self.projection.mul(&self.model_view())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    params: CameraParams,
    horizontal_deg: f64,
    vertical_deg: f64,
    zoom: f64,
    movement: Vec2,
    viewport: (u32, u32),
}

impl CameraState {
    pub fn new(params: CameraParams, horizontal_deg: f64, vertical_deg: f64) -> Self {
        let mut cam = Self {
            params,
            horizontal_deg: 0.0,
            vertical_deg: 0.0,
            zoom: params.max_zoom,
            movement: Vec2::new(0.0, 0.0),
            viewport: (1, 1),
        };
        cam.set_angles(horizontal_deg, vertical_deg);
        cam
    }

    pub fn params(&self) -> &CameraParams {
        &self.params
    }

    pub fn horizontal_deg(&self) -> f64 {
        self.horizontal_deg
    }

    pub fn vertical_deg(&self) -> f64 {
        self.vertical_deg
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn movement(&self) -> Vec2 {
        self.movement
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn aspect(&self) -> f64 {
        let (w, h) = self.viewport;
        w as f64 / h as f64
    }

    /// Zero-sized viewports are clamped to one pixel.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.params.min_zoom, self.params.max_zoom)
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = self.clamp_zoom(zoom);
    }

    /// Jumps to the given angles; vertical is clamped, horizontal wrapped.
    pub fn set_angles(&mut self, horizontal_deg: f64, vertical_deg: f64) {
        let max_v = self.params.max_vertical_deg;
        self.horizontal_deg = wrap_deg_360(horizontal_deg);
        self.vertical_deg = vertical_deg.clamp(-max_v, max_v);
    }

    /// Replaces the pending inertial movement (degrees per frame).
    pub fn set_movement(&mut self, movement: Vec2) {
        self.movement = movement;
    }

    pub fn stop(&mut self) {
        self.movement = Vec2::new(0.0, 0.0);
    }

    /// Per-frame inertia: decay pending movement, then apply it to the angles.
    pub fn advance(&mut self) {
        let inertia = self.params.inertia;
        let decay = |m: f64| {
            if m.abs() < inertia.snap_threshold {
                0.0
            } else {
                m * inertia.damping
            }
        };
        self.movement = Vec2::new(decay(self.movement.x), decay(self.movement.y));
        self.set_angles(
            self.horizontal_deg + self.movement.x,
            self.vertical_deg + self.movement.y * inertia.vertical_ratio,
        );
    }

    pub fn is_moving(&self) -> bool {
        self.movement.x != 0.0 || self.movement.y != 0.0
    }

    /// Eye, look target and up vector for the current vertical angle.
    pub fn eye_frame(&self) -> (Vec3, Vec3, Vec3) {
        let d = self.params.eye_distance;
        let (s, c) = (-self.vertical_deg).to_radians().sin_cos();
        let eye = Vec3::new(0.0, d * s, d * c);
        let look = Vec3::new(0.0, -d * s, -d * c);
        let up = Vec3::new(0.0, c, -s);
        (eye, look, up)
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::rotation_y(-self.horizontal_deg.to_radians())
    }

    pub fn view_matrix(&self) -> Mat4 {
        let (eye, look, up) = self.eye_frame();
        Mat4::look_at(eye, look, up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let half_w = self.aspect() * self.zoom;
        let half_h = self.zoom;
        Mat4::frustum(
            -half_w,
            half_w,
            -half_h,
            half_h,
            self.params.near,
            self.params.far,
        )
    }

    /// `None` only if a matrix turned singular, which valid params never cause.
    pub fn matrices(&self) -> Option<CameraMatrices> {
        let view = self.view_matrix();
        let projection = self.projection_matrix();
        Some(CameraMatrices {
            eye: self.eye_frame().0,
            model: self.model_matrix(),
            view,
            projection,
            inv_view: view.inverse()?,
            inv_projection: projection.inverse()?,
        })
    }
}
