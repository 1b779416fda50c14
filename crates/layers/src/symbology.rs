/// Colors and sizes used when painting overlays.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OverlayStyle {
    /// Shared color of single-category points.
    pub point_color: [u8; 4],
    /// Radius in pixels of single-category points.
    pub point_radius: f64,
    /// Half-size in pixels of a categorized density stamp.
    pub stamp_radius: f64,
    pub marker_color: [u8; 4],
    pub marker_radius: f64,
    /// Alpha of the faintest non-empty density pixel.
    pub alpha_floor: u8,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            point_color: [255, 255, 255, 255],
            point_radius: 1.0,
            stamp_radius: 1.0,
            marker_color: [255, 255, 255, 255],
            marker_radius: 7.0,
            alpha_floor: 100,
        }
    }
}

impl OverlayStyle {
    /// Alpha for a pixel whose strongest channel counts `max` hits, relative
    /// to the strongest pixel overall.
    pub fn density_alpha(&self, max: u32, global_max: u32) -> u8 {
        if max == 0 || global_max == 0 {
            return 0;
        }
        let floor = self.alpha_floor as f64;
        let ratio = (max as f64 / global_max as f64).min(1.0);
        (floor + ratio * (255.0 - floor)).round() as u8
    }
}
