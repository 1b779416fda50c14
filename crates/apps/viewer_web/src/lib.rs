use console_error_panic_hook::set_once;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use formats::Dataset;
use foundation::math::Vec2;
use gpu::{FrameUniforms, GlobeRenderer};
use layers::{BaseMapSet, RgbaRaster, StaticBaseMaps};
use worldview::{HostUi, PointerEvent, ViewerConfig, WorldView};

mod wgpu;
use wgpu::{WgpuBackend, init_from_canvas_id};

const CANVAS_ID: &str = "worlddata-canvas";
const STATUS_ID: &str = "worlddata-status";

fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Status text goes to the status element (if the page has one) and the
/// console; textures go straight to the GPU once a renderer is attached.
#[derive(Default)]
struct PageHost {
    renderer: Option<GlobeRenderer<WgpuBackend>>,
}

impl HostUi for PageHost {
    fn display_status_text(&mut self, text: &str) {
        log(text);
        let element = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(STATUS_ID));
        if let Some(element) = element {
            element.set_text_content(Some(text));
        }
    }

    fn request_texture_upload(&mut self, raster: &RgbaRaster) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };
        let (w, h) = raster.dimensions();
        if let Err(e) = renderer.upload_texture(w, h, raster.as_bytes()) {
            log(&format!("texture upload failed: {e}"));
        }
    }
}

struct ViewerState {
    view: WorldView<StaticBaseMaps>,
    host: PageHost,
}

thread_local! {
    static BASE_MAPS: RefCell<StaticBaseMaps> = RefCell::new(StaticBaseMaps::new());
    static STATE: RefCell<Option<ViewerState>> = const { RefCell::new(None) };
}

fn with_state<R>(f: impl FnOnce(&mut ViewerState) -> Result<R, JsValue>) -> Result<R, JsValue> {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        let state = state
            .as_mut()
            .ok_or_else(|| JsValue::from_str("viewer not initialized"))?;
        f(state)
    })
}

fn submit_pointer(event: PointerEvent) -> Result<(), JsValue> {
    with_state(|s| s.view.handle().on_pointer_event(event).map_err(to_js))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Registers decoded RGBA8 pixels for `"geographic"` or `"land-ocean"`.
/// Must happen before [`init_viewer`] for the geographic set.
#[wasm_bindgen]
pub fn set_base_map(name: &str, width: u32, height: u32, rgba: Vec<u8>) -> Result<(), JsValue> {
    let set = BaseMapSet::from_name(name)
        .ok_or_else(|| JsValue::from_str(&format!("unknown base map `{name}`")))?;
    let raster = RgbaRaster::from_rgba8(width, height, rgba).map_err(to_js)?;
    BASE_MAPS.with(|maps| maps.borrow_mut().insert(set, raster));
    Ok(())
}

/// Builds the view from the registered base maps. `config_json` overrides tunables.
#[wasm_bindgen]
pub fn init_viewer(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(text) => ViewerConfig::from_json_str(&text).map_err(to_js)?,
        None => ViewerConfig::default(),
    };
    let maps = BASE_MAPS.with(|maps| std::mem::take(&mut *maps.borrow_mut()));
    let view = WorldView::new(config, maps).map_err(to_js)?;
    STATE.with(|state| {
        *state.borrow_mut() = Some(ViewerState {
            view,
            host: PageHost::default(),
        });
    });
    Ok(())
}

/// Attaches the GPU renderer to the page canvas. Runs asynchronously.
#[wasm_bindgen]
pub fn init_wgpu() {
    spawn_local(async move {
        if let Err(err) = init_wgpu_inner().await {
            log(&format!("wgpu init error: {err:?}"));
        }
    });
}

async fn init_wgpu_inner() -> Result<(), JsValue> {
    let backend = init_from_canvas_id(CANVAS_ID).await.map_err(to_js)?;
    with_state(|s| {
        let mut renderer = GlobeRenderer::new(backend, s.view.mesh()).map_err(to_js)?;
        let (w, h) = s.view.camera().viewport();
        renderer.resize(w, h);
        let texture = s.view.texture();
        let (tw, th) = texture.dimensions();
        renderer
            .upload_texture(tw, th, texture.as_bytes())
            .map_err(to_js)?;
        s.host.renderer = Some(renderer);
        Ok(())
    })
}

#[wasm_bindgen]
pub fn load_geojson(text: &str) -> Result<(), JsValue> {
    let dataset = Dataset::from_geojson_str(text).map_err(to_js)?;
    with_state(|s| s.view.handle().load_dataset(dataset).map_err(to_js))
}

#[wasm_bindgen]
pub fn swap_base_texture() -> Result<(), JsValue> {
    with_state(|s| s.view.handle().swap_base_texture().map_err(to_js))
}

#[wasm_bindgen]
pub fn resize(width: u32, height: u32) -> Result<(), JsValue> {
    with_state(|s| {
        if let Some(renderer) = &mut s.host.renderer {
            renderer.resize(width, height);
        }
        s.view
            .handle()
            .on_viewport_resize(width, height)
            .map_err(to_js)
    })
}

#[wasm_bindgen]
pub fn pointer_down(id: u32, x: f64, y: f64) -> Result<(), JsValue> {
    submit_pointer(PointerEvent::Down {
        id: id.into(),
        position: Vec2::new(x, y),
    })
}

#[wasm_bindgen]
pub fn pointer_move(id: u32, x: f64, y: f64) -> Result<(), JsValue> {
    submit_pointer(PointerEvent::Move {
        id: id.into(),
        position: Vec2::new(x, y),
    })
}

#[wasm_bindgen]
pub fn pointer_up(id: u32, x: f64, y: f64) -> Result<(), JsValue> {
    submit_pointer(PointerEvent::Up {
        id: id.into(),
        position: Vec2::new(x, y),
    })
}

#[wasm_bindgen]
pub fn pointer_cancel() -> Result<(), JsValue> {
    submit_pointer(PointerEvent::Cancel)
}

/// One animation frame: apply queued input, advance inertia, draw.
/// Returns the frame index.
#[wasm_bindgen]
pub fn frame() -> Result<f64, JsValue> {
    with_state(|s| {
        let out = s.view.frame(&mut s.host).map_err(to_js)?;
        if let Some(renderer) = &mut s.host.renderer {
            let uniforms =
                FrameUniforms::new(out.model_view_projection, out.model_view).with_depth_correction();
            renderer.draw(&uniforms).map_err(to_js)?;
        }
        Ok(out.frame.index as f64)
    })
}
