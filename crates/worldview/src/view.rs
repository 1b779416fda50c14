//! The globe view: owns every piece of render-thread state and applies the
//! commands hosts queue through a [`WorldViewHandle`].

use std::fmt;

use foundation::math::{GeoPoint, Vec2};
use formats::{Dataset, DatasetError, DrawMode};
use layers::{BaseMapError, BaseMapProvider, BaseMapSet, DrawSummary, OverlayCompositor, RgbaRaster};
use runtime::{Frame, QueueFull, RenderQueue};
use scene::{CameraState, Mesh, MeshError, PickOutcome, build_sphere, fit_view, pick};
use tracing::{debug, info, warn};

use crate::config::ViewerConfig;
use crate::gesture::{GestureAction, GestureTracker, PointerEvent};

/// Nominal frame step reported in [`FrameOutput`]; inertia is per frame, not per second.
const FRAME_DT_S: f64 = 1.0 / 60.0;

/// Work a host hands to the render thread.
#[derive(Debug, Clone)]
pub enum ViewCommand {
    Pointer(PointerEvent),
    LoadDataset(Dataset),
    SwapBaseTexture,
    Resize { width: u32, height: u32 },
}

/// Callbacks from the view back into the embedding application.
pub trait HostUi {
    fn display_status_text(&mut self, text: &str);
    /// The globe texture changed; `raster` is the full flattened image.
    fn request_texture_upload(&mut self, raster: &RgbaRaster);
}

#[derive(Debug)]
pub enum ViewError {
    Mesh(MeshError),
    BaseMap(BaseMapError),
    Dataset(DatasetError),
    QueueFull(QueueFull),
    DegenerateCamera,
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::Mesh(e) => write!(f, "globe mesh: {e}"),
            ViewError::BaseMap(e) => write!(f, "base map: {e}"),
            ViewError::Dataset(e) => write!(f, "dataset: {e}"),
            ViewError::QueueFull(e) => write!(f, "{e}"),
            ViewError::DegenerateCamera => write!(f, "camera matrices are not invertible"),
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewError::Mesh(e) => Some(e),
            ViewError::BaseMap(e) => Some(e),
            ViewError::Dataset(e) => Some(e),
            ViewError::QueueFull(e) => Some(e),
            ViewError::DegenerateCamera => None,
        }
    }
}

impl From<MeshError> for ViewError {
    fn from(e: MeshError) -> Self {
        ViewError::Mesh(e)
    }
}

impl From<BaseMapError> for ViewError {
    fn from(e: BaseMapError) -> Self {
        ViewError::BaseMap(e)
    }
}

impl From<DatasetError> for ViewError {
    fn from(e: DatasetError) -> Self {
        ViewError::Dataset(e)
    }
}

impl From<QueueFull> for ViewError {
    fn from(e: QueueFull) -> Self {
        ViewError::QueueFull(e)
    }
}

/// Clonable, `Send` entry point for input and loader threads.
#[derive(Debug, Clone)]
pub struct WorldViewHandle {
    queue: RenderQueue<ViewCommand>,
}

impl WorldViewHandle {
    pub fn on_pointer_event(&self, event: PointerEvent) -> Result<(), QueueFull> {
        self.queue.submit(ViewCommand::Pointer(event))
    }

    pub fn load_dataset(&self, dataset: Dataset) -> Result<(), QueueFull> {
        self.queue.submit(ViewCommand::LoadDataset(dataset))
    }

    pub fn swap_base_texture(&self) -> Result<(), QueueFull> {
        self.queue.submit(ViewCommand::SwapBaseTexture)
    }

    pub fn on_viewport_resize(&self, width: u32, height: u32) -> Result<(), QueueFull> {
        self.queue.submit(ViewCommand::Resize { width, height })
    }

    pub fn pending(&self) -> usize {
        self.queue.pending()
    }
}

/// What a renderer needs to draw one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameOutput {
    pub frame: Frame,
    /// Column-major, OpenGL clip conventions.
    pub model_view_projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub commands_applied: usize,
}

pub struct WorldView<P> {
    config: ViewerConfig,
    provider: P,
    mesh: Mesh,
    camera: CameraState,
    gestures: GestureTracker,
    compositor: OverlayCompositor,
    active_base: BaseMapSet,
    dataset: Option<Dataset>,
    queue: RenderQueue<ViewCommand>,
    frame: Frame,
}

impl<P: BaseMapProvider> WorldView<P> {
    /// Builds the mesh and loads the geographic base map.
    pub fn new(config: ViewerConfig, mut provider: P) -> Result<Self, ViewError> {
        let mesh = build_sphere(config.sphere_radius, config.sphere_step)?;
        let base = provider.load(BaseMapSet::Geographic)?;
        info!(
            width = base.width(),
            height = base.height(),
            triangles = mesh.triangle_count(),
            "world view ready"
        );

        let camera = CameraState::new(
            config.camera_params(),
            config.initial_horizontal_deg,
            config.initial_vertical_deg,
        );
        let queue = if config.queue_capacity == 0 {
            RenderQueue::unbounded()
        } else {
            RenderQueue::bounded(config.queue_capacity)
        };

        Ok(Self {
            gestures: GestureTracker::new(config.tap_slop_px),
            compositor: OverlayCompositor::new(base, config.overlay_style()),
            config,
            provider,
            mesh,
            camera,
            active_base: BaseMapSet::Geographic,
            dataset: None,
            queue,
            frame: Frame::new(0, FRAME_DT_S),
        })
    }

    pub fn handle(&self) -> WorldViewHandle {
        WorldViewHandle {
            queue: self.queue.clone(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn compositor(&self) -> &OverlayCompositor {
        &self.compositor
    }

    pub fn active_base_map(&self) -> BaseMapSet {
        self.active_base
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// The flattened globe texture, for hosts that attach a renderer late.
    pub fn texture(&mut self) -> &RgbaRaster {
        self.compositor.composite()
    }

    /// Runs one frame: applies queued commands in order, advances inertia,
    /// pushes a texture upload if the overlay changed and returns the matrices.
    ///
    /// A failing command is reported through the status text and skipped; it
    /// never aborts the frame.
    pub fn frame(&mut self, host: &mut dyn HostUi) -> Result<FrameOutput, ViewError> {
        let commands = self.queue.drain();
        let commands_applied = commands.len();
        for command in commands {
            if let Err(e) = self.apply(command, host) {
                warn!(error = %e, "command failed");
                host.display_status_text(&e.to_string());
            }
        }

        self.camera.advance();

        if self.compositor.is_stale() {
            host.request_texture_upload(self.compositor.composite());
        }

        let matrices = self.camera.matrices().ok_or(ViewError::DegenerateCamera)?;
        let out = FrameOutput {
            frame: self.frame,
            model_view_projection: matrices.model_view_projection().to_cols_f32(),
            model_view: matrices.model_view().to_cols_f32(),
            commands_applied,
        };
        self.frame = self.frame.next();
        Ok(out)
    }

    fn apply(&mut self, command: ViewCommand, host: &mut dyn HostUi) -> Result<(), ViewError> {
        match command {
            ViewCommand::Pointer(event) => {
                self.on_pointer(event, host)?;
            }
            ViewCommand::LoadDataset(dataset) => self.load_dataset(dataset, host)?,
            ViewCommand::SwapBaseTexture => self.swap_base_texture()?,
            ViewCommand::Resize { width, height } => {
                debug!(width, height, "viewport resized");
                self.camera.set_viewport(width, height);
            }
        }
        Ok(())
    }

    fn on_pointer(&mut self, event: PointerEvent, host: &mut dyn HostUi) -> Result<(), ViewError> {
        match self.gestures.handle(event) {
            GestureAction::None => {}
            GestureAction::Rotate(delta) => {
                let scale = self.camera.zoom() / self.config.drag_divisor;
                self.camera
                    .set_movement(Vec2::new(delta.x * scale, delta.y * scale));
            }
            GestureAction::Zoom(ratio) => {
                self.camera.set_zoom(self.camera.zoom() * ratio);
            }
            GestureAction::Tap(position) => {
                let outcome = self.pick(position)?;
                self.apply_pick(outcome, host);
            }
        }
        Ok(())
    }

    /// Casts a pick at a host position (top-left origin) with the current camera.
    pub fn pick(&self, screen: Vec2) -> Result<PickOutcome, ViewError> {
        let matrices = self.camera.matrices().ok_or(ViewError::DegenerateCamera)?;
        Ok(pick(
            screen,
            self.camera.viewport(),
            &matrices,
            self.camera.horizontal_deg(),
            self.config.sphere_radius,
            self.config.polar_exclusion_rad,
        ))
    }

    fn apply_pick(&mut self, outcome: PickOutcome, host: &mut dyn HostUi) {
        match outcome {
            PickOutcome::Miss => {
                debug!("pick missed the globe");
                self.compositor.clear_marker();
                host.display_status_text("");
            }
            PickOutcome::Polar(surface) => {
                host.display_status_text(&format_coordinates(surface.geo_point()));
            }
            PickOutcome::Hit(surface) => {
                let (w, h) = self.compositor.dimensions();
                self.compositor.mark_point(surface.pixel(w, h));
                host.display_status_text(&format_coordinates(surface.geo_point()));
            }
        }
    }

    /// Paints the dataset and turns the camera to frame it.
    fn load_dataset(&mut self, dataset: Dataset, host: &mut dyn HostUi) -> Result<(), ViewError> {
        let fit = fit_view(
            dataset.positions(),
            self.config.min_zoom,
            self.camera.params().max_zoom,
        )
        .ok_or(ViewError::Dataset(DatasetError::Empty))?;

        let summary = self.draw_dataset(&dataset);
        info!(
            features = dataset.len(),
            drawn = summary.drawn,
            center_lon = fit.center.lon_deg,
            center_lat = fit.center.lat_deg,
            zoom = fit.zoom,
            "dataset loaded"
        );

        self.camera.stop();
        self.camera.set_angles(fit.horizontal_deg, fit.vertical_deg);
        self.camera.set_zoom(fit.zoom);

        let status = match &dataset.title {
            Some(title) => title.clone(),
            None => format!("{} points", dataset.len()),
        };
        host.display_status_text(&status);
        self.dataset = Some(dataset);
        Ok(())
    }

    fn draw_dataset(&mut self, dataset: &Dataset) -> DrawSummary {
        match dataset.draw_mode() {
            DrawMode::SingleCategory => self.compositor.draw_single_category(&dataset.positions()),
            DrawMode::Categorized => match dataset.bounds() {
                Some(bounds) => self
                    .compositor
                    .draw_categorized(&dataset.categorized(), &bounds),
                None => DrawSummary::default(),
            },
        }
    }

    /// Toggles between the two base-map sets. The loaded dataset is repainted
    /// at the new size; the tap marker is dropped.
    fn swap_base_texture(&mut self) -> Result<(), ViewError> {
        let next = self.active_base.other();
        let base = self.provider.load(next)?;
        info!(set = %next, width = base.width(), height = base.height(), "base map swapped");

        self.compositor.set_base(base);
        self.active_base = next;
        if let Some(dataset) = self.dataset.take() {
            self.draw_dataset(&dataset);
            self.dataset = Some(dataset);
        }
        Ok(())
    }
}

/// Coordinate readout, e.g. `"12.50°E ; 41.90°N"`.
pub fn format_coordinates(point: GeoPoint) -> String {
    let ew = if point.lon_deg < 0.0 { 'W' } else { 'E' };
    let ns = if point.lat_deg < 0.0 { 'S' } else { 'N' };
    format!(
        "{:.2}°{ew} ; {:.2}°{ns}",
        point.lon_deg.abs(),
        point.lat_deg.abs()
    )
}

#[cfg(test)]
mod tests {
    use super::{HostUi, ViewError, WorldView, format_coordinates};
    use crate::config::ViewerConfig;
    use crate::gesture::PointerEvent;
    use formats::Dataset;
    use foundation::math::{GeoPoint, Vec2, lon_lat_to_pixel};
    use layers::{BaseMapSet, Channel, RgbaRaster, StaticBaseMaps};

    #[derive(Default)]
    struct RecordingHost {
        status: Vec<String>,
        uploads: Vec<(u32, u32)>,
    }

    impl HostUi for RecordingHost {
        fn display_status_text(&mut self, text: &str) {
            self.status.push(text.to_string());
        }

        fn request_texture_upload(&mut self, raster: &RgbaRaster) {
            self.uploads.push(raster.dimensions());
        }
    }

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn small_config() -> ViewerConfig {
        ViewerConfig {
            sphere_step: 8,
            ..ViewerConfig::default()
        }
    }

    fn provider() -> StaticBaseMaps {
        StaticBaseMaps::new()
            .with(
                BaseMapSet::Geographic,
                RgbaRaster::filled(360, 180, [0, 80, 0, 255]).unwrap(),
            )
            .with(
                BaseMapSet::LandOcean,
                RgbaRaster::filled(240, 120, [0, 0, 80, 255]).unwrap(),
            )
    }

    fn view() -> WorldView<StaticBaseMaps> {
        let mut view = WorldView::new(small_config(), provider()).unwrap();
        view.handle().on_viewport_resize(400, 400).unwrap();
        view.frame(&mut RecordingHost::default()).unwrap();
        view
    }

    fn tap(view: &WorldView<StaticBaseMaps>, x: f64, y: f64) {
        let position = Vec2::new(x, y);
        let handle = view.handle();
        handle
            .on_pointer_event(PointerEvent::Down { id: 1, position })
            .unwrap();
        handle
            .on_pointer_event(PointerEvent::Up { id: 1, position })
            .unwrap();
    }

    const DATASET: &str = r#"{
        "type": "FeatureCollection",
        "title": "Sample",
        "features": [
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [10.0, 20.0] }, "properties": { "category": 1 } },
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [12.0, 22.0] }, "properties": { "category": 1 } },
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [14.0, 24.0] }, "properties": { "category": 1 } }
        ]
    }"#;

    #[test]
    fn coordinates_use_hemisphere_letters() {
        assert_eq!(format_coordinates(GeoPoint::new(12.5, 41.9)), "12.50°E ; 41.90°N");
        assert_eq!(format_coordinates(GeoPoint::new(-74.0, -33.456)), "74.00°W ; 33.46°S");
    }

    #[test]
    fn first_frame_uploads_the_base_map_once() {
        let mut view = WorldView::new(small_config(), provider()).unwrap();
        let mut host = RecordingHost::default();
        let first = view.frame(&mut host).unwrap();
        let second = view.frame(&mut host).unwrap();
        assert_eq!(host.uploads, vec![(360, 180)]);
        assert_eq!(first.frame.index, 0);
        assert_eq!(second.frame.index, 1);
    }

    #[test]
    fn missing_base_map_fails_construction() {
        let err = WorldView::new(small_config(), StaticBaseMaps::new()).err();
        assert!(matches!(err, Some(ViewError::BaseMap(_))));
    }

    #[test]
    fn same_category_dataset_fills_only_the_blue_grid() {
        let mut view = view();
        let mut host = RecordingHost::default();
        view.handle()
            .load_dataset(Dataset::from_geojson_str(DATASET).unwrap())
            .unwrap();
        view.frame(&mut host).unwrap();

        let c = view.compositor();
        assert!(c.grid(Channel::Blue).total() > 0);
        assert_eq!(c.grid(Channel::Red).total(), 0);
        assert_eq!(c.grid(Channel::Green).total(), 0);
        assert_eq!(host.status, vec!["Sample".to_string()]);
        assert_eq!(host.uploads.len(), 1);

        // Camera faces the data center (12E, 22N).
        assert_close(view.camera().horizontal_deg(), 12.0 - 90.0 + 360.0, 1e-9);
        assert_close(view.camera().vertical_deg(), -22.0, 1e-9);
        assert_close(view.camera().zoom(), 0.15, 1e-9);
    }

    #[test]
    fn tap_on_the_globe_marks_it_and_reports_coordinates() {
        let mut view = view();
        let mut host = RecordingHost::default();
        tap(&view, 200.0, 200.0);
        view.frame(&mut host).unwrap();

        // Initial camera faces 20E, 16N.
        assert_eq!(host.status, vec!["20.00°E ; 16.00°N".to_string()]);
        assert!(!view.compositor().marker_layer().is_transparent());
        // Ring of radius 7 above the hit pixel; the hit pixel itself stays clear.
        let center = lon_lat_to_pixel(GeoPoint::new(20.0, 16.0), 360, 180);
        let (cx, cy) = (center.x.floor() as i64, center.y.floor() as i64);
        let marker = view.compositor().marker_layer();
        assert!((cy - 9..=cy - 5).any(|y| marker.get(cx, y).is_some_and(|p| p[3] > 0)));
        assert_eq!(marker.get(cx, cy), Some([0, 0, 0, 0]));
    }

    #[test]
    fn tap_beside_the_globe_clears_the_text() {
        let mut view = view();
        let mut host = RecordingHost::default();
        tap(&view, 2.0, 2.0);
        view.frame(&mut host).unwrap();
        assert_eq!(host.status, vec![String::new()]);
        assert!(view.compositor().marker_layer().is_transparent());
    }

    #[test]
    fn tap_off_the_globe_removes_the_last_marker() {
        let mut view = view();
        let mut host = RecordingHost::default();
        tap(&view, 200.0, 200.0);
        view.frame(&mut host).unwrap();
        assert!(!view.compositor().marker_layer().is_transparent());

        tap(&view, 2.0, 2.0);
        view.frame(&mut host).unwrap();
        assert!(view.compositor().marker_layer().is_transparent());
        assert_eq!(host.status.last(), Some(&String::new()));
        // Marker drawn, then marker removed.
        assert_eq!(host.uploads.len(), 2);
        assert_eq!(host.uploads.last(), Some(&(360, 180)));
    }

    #[test]
    fn tap_near_a_pole_reports_but_does_not_mark() {
        let mut view = WorldView::new(
            ViewerConfig {
                initial_vertical_deg: -75.0,
                ..small_config()
            },
            provider(),
        )
        .unwrap();
        let mut host = RecordingHost::default();
        view.handle().on_viewport_resize(400, 400).unwrap();
        view.frame(&mut host).unwrap();

        // Looking down from 75N; about 15 degrees of arc above the screen center is the pole.
        let outcome = view.pick(Vec2::new(200.0, 166.0)).unwrap();
        let lat = outcome.surface_point().map(|p| p.lat_rad.to_degrees());
        assert!(lat.is_some_and(|l| l > 84.3), "{outcome:?}");

        tap(&view, 200.0, 166.0);
        view.frame(&mut host).unwrap();
        assert!(view.compositor().marker_layer().is_transparent());
        assert!(host.status.last().is_some_and(|s| s.ends_with("°N")));
    }

    #[test]
    fn drag_sets_movement_scaled_by_zoom() {
        let mut view = view();
        let mut host = RecordingHost::default();
        let handle = view.handle();
        handle
            .on_pointer_event(PointerEvent::Down {
                id: 1,
                position: Vec2::new(100.0, 100.0),
            })
            .unwrap();
        handle
            .on_pointer_event(PointerEvent::Move {
                id: 1,
                position: Vec2::new(50.0, 100.0),
            })
            .unwrap();
        let before = view.camera().horizontal_deg();
        view.frame(&mut host).unwrap();

        // 50 px / 5 at zoom 1 = 10 degrees, decayed once before applying.
        assert_close(view.camera().movement().x, 10.0 * 0.93, 1e-9);
        assert_close(view.camera().horizontal_deg(), before + 9.3, 1e-9);
    }

    #[test]
    fn pinch_zoom_is_clamped() {
        let mut view = view();
        let mut host = RecordingHost::default();
        let handle = view.handle();
        let pinch = |from: f64, to: f64| {
            handle
                .on_pointer_event(PointerEvent::Down {
                    id: 1,
                    position: Vec2::new(0.0, 0.0),
                })
                .unwrap();
            handle
                .on_pointer_event(PointerEvent::Down {
                    id: 2,
                    position: Vec2::new(from, 0.0),
                })
                .unwrap();
            handle
                .on_pointer_event(PointerEvent::Move {
                    id: 2,
                    position: Vec2::new(to, 0.0),
                })
                .unwrap();
            handle.on_pointer_event(PointerEvent::Cancel).unwrap();
        };

        pinch(100.0, 50.0);
        view.frame(&mut host).unwrap();
        assert_close(view.camera().zoom(), 1.0, 1e-12);

        pinch(50.0, 100.0);
        view.frame(&mut host).unwrap();
        assert_close(view.camera().zoom(), 0.5, 1e-12);

        pinch(10.0, 100.0);
        view.frame(&mut host).unwrap();
        assert_close(view.camera().zoom(), 0.15, 1e-12);
        assert!(host.status.is_empty());
    }

    #[test]
    fn swap_resizes_overlays_and_keeps_the_dataset() {
        let mut view = view();
        let mut host = RecordingHost::default();
        let handle = view.handle();
        handle
            .load_dataset(Dataset::from_geojson_str(DATASET).unwrap())
            .unwrap();
        handle.swap_base_texture().unwrap();
        view.frame(&mut host).unwrap();

        assert_eq!(view.active_base_map(), BaseMapSet::LandOcean);
        assert_eq!(view.compositor().dimensions(), (240, 120));
        assert_eq!(view.compositor().marker_layer().dimensions(), (240, 120));
        assert!(view.compositor().grid(Channel::Blue).total() > 0);
        assert_eq!(host.uploads, vec![(240, 120)]);

        view.handle().swap_base_texture().unwrap();
        view.frame(&mut host).unwrap();
        assert_eq!(view.active_base_map(), BaseMapSet::Geographic);
    }

    #[test]
    fn failed_swap_leaves_state_untouched() {
        let only_geo = StaticBaseMaps::new().with(
            BaseMapSet::Geographic,
            RgbaRaster::filled(360, 180, [0, 80, 0, 255]).unwrap(),
        );
        let mut view = WorldView::new(small_config(), only_geo).unwrap();
        let mut host = RecordingHost::default();
        view.frame(&mut host).unwrap();
        view.handle().swap_base_texture().unwrap();
        view.frame(&mut host).unwrap();

        assert_eq!(view.active_base_map(), BaseMapSet::Geographic);
        assert_eq!(view.compositor().dimensions(), (360, 180));
        assert_eq!(host.uploads.len(), 1);
        assert!(host.status[0].contains("land-ocean"));
    }

    #[test]
    fn commands_apply_in_submission_order() {
        let mut view = view();
        let mut host = RecordingHost::default();
        let handle = view.handle();
        handle.on_viewport_resize(800, 400).unwrap();
        handle.on_viewport_resize(300, 600).unwrap();
        let out = view.frame(&mut host).unwrap();
        assert_eq!(out.commands_applied, 2);
        assert_eq!(view.camera().viewport(), (300, 600));
        assert_eq!(handle.pending(), 0);
    }

    #[test]
    fn full_queue_pushes_back() {
        let view = WorldView::new(
            ViewerConfig {
                queue_capacity: 1,
                ..small_config()
            },
            provider(),
        )
        .unwrap();
        let handle = view.handle();
        handle.swap_base_texture().unwrap();
        assert!(handle.swap_base_texture().is_err());
    }

    #[test]
    fn handle_is_send() {
        fn assert_send<T: Send + Sync + Clone>() {}
        assert_send::<super::WorldViewHandle>();
    }
}
