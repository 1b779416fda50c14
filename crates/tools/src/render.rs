//! Headless sessions: drive a [`WorldView`] the way a host would and capture
//! what it hands back.

use formats::{Dataset, DrawMode};
use foundation::math::Vec2;
use layers::{BaseMapProvider, RgbaRaster};
use scene::fit_view;
use serde_json::{Value, json};
use tracing::info;
use worldview::{FrameOutput, HostUi, PointerEvent, ViewerConfig, WorldView};

/// Records status lines and keeps the latest uploaded texture.
#[derive(Debug, Default)]
pub struct CaptureHost {
    pub status: Vec<String>,
    pub texture: Option<RgbaRaster>,
    pub uploads: usize,
}

impl HostUi for CaptureHost {
    fn display_status_text(&mut self, text: &str) {
        info!(status = text, "status");
        self.status.push(text.to_string());
    }

    fn request_texture_upload(&mut self, raster: &RgbaRaster) {
        self.uploads += 1;
        match &mut self.texture {
            Some(t) => t.clone_from(raster),
            None => self.texture = Some(raster.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderJob {
    pub dataset: Option<Dataset>,
    /// Viewport positions, top-left origin.
    pub taps: Vec<Vec2>,
    pub swap: bool,
    pub viewport: (u32, u32),
}

#[derive(Debug)]
pub struct RenderReport {
    pub host: CaptureHost,
    pub last_frame: FrameOutput,
}

impl RenderReport {
    pub fn texture(&self) -> Option<&RgbaRaster> {
        self.host.texture.as_ref()
    }
}

pub fn run_render<P: BaseMapProvider>(
    config: ViewerConfig,
    provider: P,
    job: RenderJob,
) -> Result<RenderReport, String> {
    let mut view = WorldView::new(config, provider).map_err(|e| e.to_string())?;
    let handle = view.handle();
    let mut host = CaptureHost::default();

    let (w, h) = job.viewport;
    handle
        .on_viewport_resize(w, h)
        .map_err(|e| e.to_string())?;
    if let Some(dataset) = job.dataset {
        handle.load_dataset(dataset).map_err(|e| e.to_string())?;
    }
    let mut last_frame = view.frame(&mut host).map_err(|e| e.to_string())?;

    for (i, position) in job.taps.into_iter().enumerate() {
        let id = i as u64 + 1;
        handle
            .on_pointer_event(PointerEvent::Down { id, position })
            .map_err(|e| e.to_string())?;
        handle
            .on_pointer_event(PointerEvent::Up { id, position })
            .map_err(|e| e.to_string())?;
        last_frame = view.frame(&mut host).map_err(|e| e.to_string())?;
    }

    if job.swap {
        handle.swap_base_texture().map_err(|e| e.to_string())?;
        last_frame = view.frame(&mut host).map_err(|e| e.to_string())?;
    }

    info!(
        frames = last_frame.frame.index + 1,
        uploads = host.uploads,
        base_map = %view.active_base_map(),
        "render finished"
    );
    Ok(RenderReport { host, last_frame })
}

/// Summary of a dataset: title, draw path and the camera fit it would get.
pub fn inspect_dataset(dataset: &Dataset, config: &ViewerConfig) -> Value {
    let mode = match dataset.draw_mode() {
        DrawMode::SingleCategory => "single-category",
        DrawMode::Categorized => "categorized",
    };
    let fit = fit_view(
        dataset.positions(),
        config.min_zoom,
        config.camera_params().max_zoom,
    )
    .map(|fit| {
        json!({
            "center": { "lon": fit.center.lon_deg, "lat": fit.center.lat_deg },
            "bounds": {
                "min_lon": fit.bounds.min_lon,
                "max_lon": fit.bounds.max_lon,
                "min_lat": fit.bounds.min_lat,
                "max_lat": fit.bounds.max_lat,
            },
            "crosses_antimeridian": fit.bounds.crosses_antimeridian(),
            "lon_span": fit.bounds.lon_span(),
            "lat_span": fit.bounds.lat_span(),
            "horizontal_deg": fit.horizontal_deg,
            "vertical_deg": fit.vertical_deg,
            "zoom": fit.zoom,
        })
    });

    json!({
        "title": dataset.title,
        "features": dataset.len(),
        "draw_mode": mode,
        "view_fit": fit,
    })
}

/// Parses `"x,y"` into a viewport position.
pub fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got `{s}`"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x in `{s}`: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y in `{s}`: {e}"))?;
    Ok(Vec2::new(x, y))
}
