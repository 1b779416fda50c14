//! Three-layer texture compositor: base map, data overlay, tap marker.
//!
//! All layers share the base map's dimensions. Any mutation marks the
//! composite stale; `composite()` rebuilds it on demand.

use foundation::GeoBounds;
use foundation::math::{GeoPoint, Vec2, lon_lat_to_pixel, stretched_radius};
use tracing::{debug, info, warn};

use crate::grid::{DensityGrid, PixelRect};
use crate::raster::RgbaRaster;
use crate::symbology::OverlayStyle;

/// Density channel a category is counted into.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    /// Reserved; no category maps here yet.
    Green,
    Blue,
}

impl Channel {
    /// Category 1 is blue, category 2 is red, anything else is not drawn.
    pub fn for_category(category: i64) -> Option<Self> {
        match category {
            1 => Some(Channel::Blue),
            2 => Some(Channel::Red),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct DrawSummary {
    pub drawn: usize,
    pub red: usize,
    pub blue: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct OverlayCompositor {
    style: OverlayStyle,
    base: RgbaRaster,
    data: RgbaRaster,
    marker: RgbaRaster,
    red: DensityGrid,
    green: DensityGrid,
    blue: DensityGrid,
    composite: RgbaRaster,
    stale: bool,
}

impl OverlayCompositor {
    pub fn new(base: RgbaRaster, style: OverlayStyle) -> Self {
        let (w, h) = base.dimensions();
        let blank = base.blank_like();
        let mut out = Self {
            style,
            composite: base.clone(),
            data: blank.clone(),
            marker: blank,
            red: DensityGrid::new(w, h),
            green: DensityGrid::new(w, h),
            blue: DensityGrid::new(w, h),
            base,
            stale: true,
        };
        out.reset_layers();
        out
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.base.dimensions()
    }

    pub fn base(&self) -> &RgbaRaster {
        &self.base
    }

    pub fn data_layer(&self) -> &RgbaRaster {
        &self.data
    }

    pub fn marker_layer(&self) -> &RgbaRaster {
        &self.marker
    }

    pub fn grid(&self, channel: Channel) -> &DensityGrid {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Swaps in a new base map. Every overlay is reallocated to its size and cleared.
    pub fn set_base(&mut self, base: RgbaRaster) {
        *self = Self::new(base, self.style);
    }

    /// Data overlay and marker back to transparent, density grids to zero.
    pub fn reset_layers(&mut self) {
        self.data.clear();
        self.marker.clear();
        self.red.clear();
        self.green.clear();
        self.blue.clear();
        self.stale = true;
    }

    /// Paints every point as a small filled dot in the shared point color.
    pub fn draw_single_category(&mut self, points: &[GeoPoint]) -> DrawSummary {
        self.reset_layers();
        let (w, h) = self.dimensions();
        let r = self.style.point_radius;
        let color = self.style.point_color;
        let mut summary = DrawSummary::default();

        for p in points {
            let px = lon_lat_to_pixel(*p, w, h);
            let rx = stretched_radius(r, px.y, w, h);
            for cx in wrapped_centers(px.x, rx, w) {
                self.data.fill_ellipse(cx, px.y, rx, r, color);
            }
            summary.drawn += 1;
        }

        info!(points = summary.drawn, "{} points drawn", summary.drawn);
        summary
    }

    /// Counts points per category into the density grids, then turns the
    /// grids into colors over the region covered by `bounds`.
    pub fn draw_categorized(&mut self, points: &[(GeoPoint, i64)], bounds: &GeoBounds) -> DrawSummary {
        self.reset_layers();
        let (w, h) = self.dimensions();
        let r = self.style.stamp_radius;
        let mut summary = DrawSummary::default();

        for (p, category) in points {
            let Some(channel) = Channel::for_category(*category) else {
                summary.skipped += 1;
                continue;
            };
            let px = lon_lat_to_pixel(*p, w, h);
            let (x, y) = (px.x.round(), px.y.round());
            let dw = stretched_radius(r, y, w, h);
            let grid = match channel {
                Channel::Red => {
                    summary.red += 1;
                    &mut self.red
                }
                Channel::Green => &mut self.green,
                Channel::Blue => {
                    summary.blue += 1;
                    &mut self.blue
                }
            };
            grid.stamp(
                (x - dw).round() as i64,
                (x + dw).round() as i64,
                (y - r).round() as i64,
                (y + r).round() as i64,
            );
            summary.drawn += 1;
        }

        let region = self.normalization_region(bounds);
        self.normalize(region);

        info!(
            blue = summary.blue,
            red = summary.red,
            "{} blue points and {} red points drawn",
            summary.blue,
            summary.red
        );
        if summary.skipped > 0 {
            debug!(skipped = summary.skipped, "points with unknown category skipped");
        }
        summary
    }

    /// Pixel rectangle that holds every stamp for data inside `bounds`.
    /// Falls back to the full width when the data straddles the seam.
    pub fn normalization_region(&self, bounds: &GeoBounds) -> PixelRect {
        let (w, h) = self.dimensions();
        let r = self.style.stamp_radius;
        let top_left = lon_lat_to_pixel(GeoPoint::new(bounds.min_lon, bounds.max_lat), w, h);
        let bottom_right = lon_lat_to_pixel(GeoPoint::new(bounds.max_lon, bounds.min_lat), w, h);

        let widest = stretched_radius(r, top_left.y.round(), w, h)
            .max(stretched_radius(r, bottom_right.y.round(), w, h));
        let pad_x = widest.ceil() + 1.0;
        let pad_y = r.ceil() + 1.0;

        let x0 = (top_left.x.round() - pad_x).floor();
        let x1 = (bottom_right.x.round() + pad_x).ceil();
        let y0 = (top_left.y.round() - pad_y).floor().max(0.0);
        let y1 = (bottom_right.y.round() + pad_y).ceil().min(h as f64);

        let (x0, x1) = if bounds.crosses_antimeridian() || x0 < 0.0 || x1 > w as f64 {
            (0, w)
        } else {
            (x0 as u32, x1 as u32)
        };
        PixelRect {
            x0,
            y0: y0 as u32,
            x1,
            y1: y1 as u32,
        }
    }

    fn normalize(&mut self, region: PixelRect) {
        let global_max = self
            .red
            .max_in(region)
            .max(self.green.max_in(region))
            .max(self.blue.max_in(region));
        if global_max == 0 {
            return;
        }

        for y in region.y0..region.y1 {
            for x in region.x0..region.x1 {
                let (xi, yi) = (x as i64, y as i64);
                let counts = [self.red.get(xi, yi), self.green.get(xi, yi), self.blue.get(xi, yi)];
                let max = counts.into_iter().max().unwrap_or(0);
                if max == 0 {
                    continue;
                }
                let scale = |c: u32| (c as f64 * 255.0 / max as f64).round() as u8;
                let alpha = self.style.density_alpha(max, global_max);
                self.data
                    .put(xi, yi, [scale(counts[0]), scale(counts[1]), scale(counts[2]), alpha]);
            }
        }
        self.stale = true;
    }

    /// Replaces the tap marker with a ring around `pixel`.
    pub fn mark_point(&mut self, pixel: Vec2) {
        self.marker.clear();
        let (w, h) = self.dimensions();
        let r = self.style.marker_radius;
        let rx = stretched_radius(r, pixel.y, w, h);
        for cx in wrapped_centers(pixel.x, rx, w) {
            self.marker.stroke_ellipse(cx, pixel.y, rx, r, self.style.marker_color);
        }
        self.stale = true;
    }

    /// Drops the tap marker. A marker layer that is already clear stays fresh.
    pub fn clear_marker(&mut self) {
        if self.marker.is_transparent() {
            return;
        }
        self.marker.clear();
        self.stale = true;
    }

    /// Base, then data, then marker, flattened with source-over.
    pub fn composite(&mut self) -> &RgbaRaster {
        if self.stale {
            self.composite.clone_from(&self.base);
            for layer in [&self.data, &self.marker] {
                if let Err(e) = self.composite.composite_over(layer) {
                    warn!(error = %e, "overlay layer left out of the composite");
                }
            }
            self.stale = false;
        }
        &self.composite
    }
}

/// Horizontal centers to draw at so a shape crossing the left or right edge
/// reappears on the other side.
fn wrapped_centers(x: f64, rx: f64, width: u32) -> Vec<f64> {
    let w = width as f64;
    let mut centers = vec![x];
    if x < rx {
        centers.push(x + w);
    } else if w - x < rx {
        centers.push(x - w);
    }
    centers
}

#[cfg(test)]
mod tests {
    use super::{Channel, OverlayCompositor, wrapped_centers};
    use crate::raster::RgbaRaster;
    use crate::symbology::OverlayStyle;
    use foundation::GeoBounds;
    use foundation::math::{GeoPoint, Vec2, lon_lat_to_pixel};

    const W: u32 = 360;
    const H: u32 = 180;

    fn compositor() -> OverlayCompositor {
        let base = RgbaRaster::filled(W, H, [0, 64, 0, 255]).unwrap();
        OverlayCompositor::new(base, OverlayStyle::default())
    }

    fn categorized(c: &mut OverlayCompositor, pts: &[(GeoPoint, i64)]) {
        let bounds = GeoBounds::from_points(pts.iter().map(|(p, _)| *p)).unwrap();
        c.draw_categorized(pts, &bounds);
    }

    #[test]
    fn categories_route_to_channels() {
        assert_eq!(Channel::for_category(1), Some(Channel::Blue));
        assert_eq!(Channel::for_category(2), Some(Channel::Red));
        assert_eq!(Channel::for_category(3), None);
    }

    #[test]
    fn stacked_points_saturate_and_outshine_single_points() {
        let mut c = compositor();
        let a = GeoPoint::new(10.0, 0.0);
        let b = GeoPoint::new(40.0, 0.0);
        categorized(&mut c, &[(a, 1), (a, 1), (b, 1)]);

        let pa = lon_lat_to_pixel(a, W, H);
        let pb = lon_lat_to_pixel(b, W, H);
        let da = c.data_layer().get(pa.x as i64, pa.y as i64).unwrap();
        let db = c.data_layer().get(pb.x as i64, pb.y as i64).unwrap();
        assert_eq!(da[2], 255);
        assert_eq!(db[2], 255);
        assert_eq!(da[3], 255);
        assert!(da[3] > db[3]);
        assert_eq!(db[3], 178);
    }

    #[test]
    fn mixed_categories_share_a_pixel() {
        let mut c = compositor();
        let a = GeoPoint::new(10.0, 0.0);
        let b = GeoPoint::new(40.0, 0.0);
        categorized(&mut c, &[(a, 2), (a, 2), (a, 1), (b, 1)]);

        // Red holds the pixel's max, blue is scaled against it, alpha against the busiest pixel.
        let pa = lon_lat_to_pixel(a, W, H);
        assert_eq!(
            c.data_layer().get(pa.x as i64, pa.y as i64),
            Some([255, 0, 128, 255])
        );

        let pb = lon_lat_to_pixel(b, W, H);
        let db = c.data_layer().get(pb.x as i64, pb.y as i64).unwrap();
        assert_eq!(&db[..3], &[0, 0, 255]);
        assert!(db[3] > 100 && db[3] < 255, "{db:?}");
    }

    #[test]
    fn only_the_matching_grid_is_touched() {
        let mut c = compositor();
        categorized(&mut c, &[(GeoPoint::new(0.0, 10.0), 2), (GeoPoint::new(5.0, 10.0), 7)]);
        assert!(c.grid(Channel::Red).total() > 0);
        assert_eq!(c.grid(Channel::Blue).total(), 0);
        assert_eq!(c.grid(Channel::Green).total(), 0);
    }

    #[test]
    fn seam_data_normalizes_across_full_width() {
        let mut c = compositor();
        let pts = [(GeoPoint::new(179.9, 0.0), 1), (GeoPoint::new(-179.9, 0.0), 1)];
        let bounds = GeoBounds::from_points(pts.iter().map(|(p, _)| *p)).unwrap();
        let region = c.normalization_region(&bounds);
        assert_eq!((region.x0, region.x1), (0, W));

        c.draw_categorized(&pts, &bounds);
        assert!(c.data_layer().get(0, 90).unwrap()[3] > 0);
        assert!(c.data_layer().get(W as i64 - 1, 90).unwrap()[3] > 0);
    }

    #[test]
    fn near_pole_stamps_do_not_panic() {
        let mut c = compositor();
        categorized(&mut c, &[(GeoPoint::new(0.0, 90.0), 1), (GeoPoint::new(0.0, -90.0), 2)]);
        assert!(c.grid(Channel::Blue).total() > 0);
    }

    #[test]
    fn single_points_wrap_across_the_seam() {
        let mut c = compositor();
        let summary = c.draw_single_category(&[GeoPoint::new(-180.0, 0.0)]);
        assert_eq!(summary.drawn, 1);
        assert_eq!(c.data_layer().get(0, 90), Some([255, 255, 255, 255]));
        assert_eq!(c.data_layer().get(W as i64 - 1, 90), Some([255, 255, 255, 255]));
    }

    #[test]
    fn marker_replaces_previous_marker() {
        let mut c = compositor();
        c.mark_point(Vec2::new(100.0, 90.0));
        c.mark_point(Vec2::new(200.0, 90.0));
        assert_eq!(c.marker_layer().get(106, 90).unwrap()[3], 0);
        assert_eq!(c.marker_layer().get(206, 90).unwrap()[3], 255);
    }

    #[test]
    fn marker_at_the_left_edge_wraps_to_the_right() {
        let mut c = compositor();
        c.mark_point(Vec2::new(1.0, 90.0));
        let marker = c.marker_layer();
        assert_eq!(marker.get(7, 90).unwrap()[3], 255);
        assert_eq!(marker.get(W as i64 - 6, 90).unwrap()[3], 255);
        assert_eq!(marker.get(1, 90).unwrap()[3], 0);
        assert_eq!(marker.get(180, 90).unwrap()[3], 0);
    }

    #[test]
    fn clearing_an_empty_marker_keeps_the_composite() {
        let mut c = compositor();
        c.composite();
        c.clear_marker();
        assert!(!c.is_stale());

        c.mark_point(Vec2::new(100.0, 90.0));
        c.composite();
        c.clear_marker();
        assert!(c.is_stale());
        assert!(c.marker_layer().is_transparent());
    }

    #[test]
    fn composite_paints_layers_in_order() {
        let mut c = compositor();
        assert_eq!(c.composite().get(5, 5), Some([0, 64, 0, 255]));

        c.draw_single_category(&[GeoPoint::new(0.0, 0.0)]);
        c.mark_point(Vec2::new(30.0, 30.0));
        let out = c.composite().clone();
        assert_eq!(out.get(180, 90), Some([255, 255, 255, 255]));
        assert_eq!(out.get(43, 30), Some([255, 255, 255, 255]));
        assert_eq!(out.get(5, 5), Some([0, 64, 0, 255]));
        assert!(!c.is_stale());
    }

    #[test]
    fn swapping_base_resizes_and_clears_layers() {
        let mut c = compositor();
        c.mark_point(Vec2::new(30.0, 30.0));
        c.set_base(RgbaRaster::filled(100, 50, [1, 2, 3, 255]).unwrap());
        assert_eq!(c.dimensions(), (100, 50));
        assert_eq!(c.grid(Channel::Blue).width(), 100);
        assert!(c.marker_layer().is_transparent());
        assert_eq!(c.composite().get(0, 0), Some([1, 2, 3, 255]));
    }

    #[test]
    fn wrap_duplicates_only_near_edges() {
        assert_eq!(wrapped_centers(50.0, 3.0, 100), vec![50.0]);
        assert_eq!(wrapped_centers(1.0, 3.0, 100), vec![1.0, 101.0]);
        assert_eq!(wrapped_centers(99.0, 3.0, 100), vec![99.0, -1.0]);
    }
}
