use foundation::GeoBounds;
use foundation::math::GeoPoint;

/// Extra degrees of longitude kept around the data when picking a zoom.
const SPAN_MARGIN_DEG: f64 = 10.0;
/// Longitude span that exactly fills the view at zoom 1.
const FULL_VIEW_SPAN_DEG: f64 = 120.0;
/// The camera faces texture longitude `horizontal + 90`.
const SEAM_OFFSET_DEG: f64 = 90.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewFit {
    pub horizontal_deg: f64,
    pub vertical_deg: f64,
    pub zoom: f64,
    pub center: GeoPoint,
    pub bounds: GeoBounds,
}

/// Camera target and zoom that frame every point. `None` when there are no points.
///
/// The returned angles are raw; the camera wraps and clamps them on apply.
pub fn fit_view<I>(points: I, min_zoom: f64, max_zoom: f64) -> Option<ViewFit>
where
    I: IntoIterator<Item = GeoPoint>,
{
    let bounds = GeoBounds::from_points(points)?;
    let center = GeoPoint::new(bounds.center_lon(), bounds.center_lat());
    // Zoom follows the direct span, so seam-straddling data zooms out.
    let zoom =
        ((bounds.direct_lon_span() + SPAN_MARGIN_DEG) / FULL_VIEW_SPAN_DEG).clamp(min_zoom, max_zoom);

    Some(ViewFit {
        horizontal_deg: center.lon_deg - SEAM_OFFSET_DEG,
        vertical_deg: -center.lat_deg,
        zoom,
        center,
        bounds,
    })
}
