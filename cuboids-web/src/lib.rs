/// Cuboids Web - WebGL2 host for the cuboid demos
///
/// Sizes a canvas to the window, compiles the lighting program, uploads the
/// cube once and redraws it every tick of the demo's clock.
use std::cell::RefCell;
use std::rc::Rc;

use cuboids_core::{
    render, update, ClearPolicy, DemoConfig, DemoKind, FrameClock, FrameContext, Mesh,
};
use js_sys::{Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlCanvasElement, WebGl2RenderingContext};

pub mod backend;
pub mod shaders;

pub use backend::WebGlBackend;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
pub struct DemoApp {
    inner: Rc<RefCell<AppState>>,
}

#[wasm_bindgen]
impl DemoApp {
    /// Run a built-in demo (`"arm"` or `"cuboids"`) on the canvas with the given id
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, demo: &str) -> Result<DemoApp, JsValue> {
        let kind: DemoKind = demo.parse().map_err(to_js)?;
        let mut config = DemoConfig::preset(kind);
        config.cuboids.seed = js_sys::Date::now() as u64;
        Self::with_config(canvas_id, config)
    }

    /// Run a demo described by a JSON config document
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(canvas_id: &str, json: &str) -> Result<DemoApp, JsValue> {
        let config = DemoConfig::from_json(json).map_err(to_js)?;
        Self::with_config(canvas_id, config)
    }

    /// Start driving frames from the demo's clock
    pub fn start(&self) -> Result<(), JsValue> {
        let clock = {
            let mut state = self.inner.borrow_mut();
            if state.running {
                return Ok(());
            }
            state.running = true;
            state.clock
        };
        match clock {
            FrameClock::Interval { millis } => start_interval(&self.inner, millis),
            FrameClock::AnimationFrame => schedule_animation_frame(&self.inner),
        }
    }

    /// Stop drawing. A pending animation frame still fires but draws
    /// nothing and does not reschedule.
    pub fn stop(&self) {
        let mut state = self.inner.borrow_mut();
        state.running = false;
        if let (Some(handle), Some(window)) = (state.interval.take(), window()) {
            window.clear_interval_with_handle(handle);
        }
    }

    /// Number of frames rendered so far
    pub fn frame(&self) -> f64 {
        self.inner
            .borrow()
            .context
            .as_ref()
            .map(|c| c.frame as f64)
            .unwrap_or_default()
    }
}

impl DemoApp {
    fn with_config(canvas_id: &str, config: DemoConfig) -> Result<DemoApp, JsValue> {
        let window = window().ok_or_else(|| JsValue::from_str("window not available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("document not available"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str("canvas element not found"))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("element is not a canvas"))?;

        let width = window.inner_width()?.as_f64().unwrap_or(800.0).max(1.0) as u32;
        let height = window.inner_height()?.as_f64().unwrap_or(600.0).max(1.0) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Depth-only clears rely on the previous frame surviving presentation
        let options = Object::new();
        let preserve = config.presentation.clear == ClearPolicy::DepthOnly;
        Reflect::set(&options, &"preserveDrawingBuffer".into(), &preserve.into())?;
        let gl = canvas
            .get_context_with_context_options("webgl2", &options)?
            .ok_or_else(|| JsValue::from_str("webgl2 not supported"))?
            .dyn_into::<WebGl2RenderingContext>()
            .map_err(|_| JsValue::from_str("context is not webgl2"))?;

        let config = config.with_aspect(width as f32 / height as f32);
        let context = FrameContext::new(&config).map_err(to_js)?;
        let mesh = Mesh::cube(1.0);
        let backend = WebGlBackend::new(gl, &mesh, &config.presentation)?;
        backend.set_viewport(width as i32, height as i32);

        let state = AppState {
            context: Some(context),
            backend,
            index_count: mesh.index_count(),
            clock: config.clock,
            running: false,
            frame_pending: false,
            callback: None,
            interval: None,
        };
        Ok(Self {
            inner: Rc::new(RefCell::new(state)),
        })
    }
}

struct AppState {
    context: Option<FrameContext>,
    backend: WebGlBackend,
    index_count: usize,
    clock: FrameClock,
    running: bool,
    frame_pending: bool,
    callback: Option<Closure<dyn FnMut()>>,
    interval: Option<i32>,
}

impl AppState {
    fn tick(&mut self) -> Result<(), JsValue> {
        if !self.running {
            return Ok(());
        }
        let Some(context) = self.context.take() else {
            return Ok(());
        };
        let context = self.context.insert(update(context));
        render(context, &mut self.backend, self.index_count)?;
        Ok(())
    }
}

fn report(err: JsValue) {
    web_sys::console::error_1(&err);
}

/// The stored callback holds the app, so a started app lives as long as
/// the page does.
fn frame_callback(app: &Rc<RefCell<AppState>>) -> Closure<dyn FnMut()> {
    let app = Rc::clone(app);
    Closure::wrap(Box::new(move || {
        let reschedule = {
            let mut state = app.borrow_mut();
            state.frame_pending = false;
            if let Err(err) = state.tick() {
                report(err);
            }
            state.running && state.clock == FrameClock::AnimationFrame
        };
        if reschedule {
            if let Err(err) = schedule_animation_frame(&app) {
                report(err);
            }
        }
    }) as Box<dyn FnMut()>)
}

fn start_interval(app: &Rc<RefCell<AppState>>, millis: u32) -> Result<(), JsValue> {
    let window = window().ok_or_else(|| JsValue::from_str("window not available"))?;
    let timeout = i32::try_from(millis).map_err(|_| JsValue::from_str("interval too long"))?;

    let mut state = app.borrow_mut();
    if state.interval.is_some() {
        return Ok(());
    }
    if state.callback.is_none() {
        state.callback = Some(frame_callback(app));
    }
    let handle = match &state.callback {
        Some(callback) => window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            timeout,
        )?,
        None => return Ok(()),
    };
    state.interval = Some(handle);
    Ok(())
}

fn schedule_animation_frame(app: &Rc<RefCell<AppState>>) -> Result<(), JsValue> {
    let window = window().ok_or_else(|| JsValue::from_str("window not available"))?;

    let mut state = app.borrow_mut();
    if state.frame_pending {
        return Ok(());
    }
    if state.callback.is_none() {
        state.callback = Some(frame_callback(app));
    }
    if let Some(callback) = &state.callback {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    }
    state.frame_pending = true;
    Ok(())
}

fn to_js(err: cuboids_core::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}
