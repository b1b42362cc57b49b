//! Lifecycle controllers exposed to the host page
//!
//! Each scene exports a handle with the same surface: `start(canvas_id)`
//! binds to a named canvas (silent no-op if it does not exist), wires
//! listeners, and begins the loop; `stop()` unbinds everything and cancels
//! the pending frame. `start` while running is ignored, `stop` while
//! stopped is a no-op. There are no module-level singletons: all state
//! lives inside the handle and dies with it.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent};

use crate::consts::MAX_FRAME_DT;
use crate::render::{self, RenderOptions};
use crate::settings::Settings;
use crate::sim::flappy::{self, FlappyInput, FlappyState};
use crate::sim::graph::{self, GraphInput, GraphState};
use crate::sim::loader::LoaderScene;

/// Resize events are coalesced; the rebuild runs once the stream has been
/// quiet this long (milliseconds)
const RESIZE_DEBOUNCE_MS: f64 = 150.0;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("neon-graph simulation layer loaded");
}

/// Elapsed-time source over the host's frame timestamps
struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    fn new() -> Self {
        Self { last: None }
    }

    /// Seconds since the previous frame, clamped so a backgrounded tab
    /// cannot produce a giant step on resume
    fn dt(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last {
            Some(prev) => ((now_ms - prev) / 1000.0) as f32,
            None => 1.0 / 60.0,
        };
        self.last = Some(now_ms);
        dt.clamp(0.0, MAX_FRAME_DT)
    }

    fn reset(&mut self) {
        self.last = None;
    }
}

/// Registered DOM listeners, removed as a batch on stop
struct Listeners {
    entries: Vec<(
        web_sys::EventTarget,
        &'static str,
        Closure<dyn FnMut(web_sys::Event)>,
    )>,
}

impl Listeners {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add(
        &mut self,
        target: &web_sys::EventTarget,
        kind: &'static str,
        f: impl FnMut(web_sys::Event) + 'static,
    ) {
        let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(web_sys::Event)>);
        let _ = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        self.entries.push((target.clone(), kind, closure));
    }

    fn remove_all(&mut self) {
        for (target, kind, closure) in self.entries.drain(..) {
            let _ =
                target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        }
    }
}

/// Bind a canvas by element id, sized to its CSS box with the device pixel
/// ratio applied (capped at 2 for crispness without waste)
fn bind_canvas(canvas_id: &str) -> Option<(HtmlCanvasElement, CanvasRenderingContext2d, f32, f32, f64)> {
    let window = web_sys::window()?;
    let document = window.document()?;
    let canvas: HtmlCanvasElement = document.get_element_by_id(canvas_id)?.dyn_into().ok()?;
    let dpr = window.device_pixel_ratio().clamp(1.0, 2.0);
    let rect = canvas.get_bounding_client_rect();
    let width = (rect.width() * dpr).floor().max(1.0);
    let height = (rect.height() * dpr).floor().max(1.0);
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .ok()??
        .dyn_into()
        .ok()?;
    Some((canvas, ctx, width as f32, height as f32, dpr))
}

fn session_seed() -> u64 {
    js_sys::Date::now() as u64
}

/// Schedule the next frame for an app whose inner type exposes
/// `frame(ts) -> bool` (false stops the loop and drops the closure)
macro_rules! raf_loop {
    ($inner:expr, $frame:ident) => {{
        let holder: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let tick_holder = holder.clone();
        let app = $inner.clone();
        *holder.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            let keep_going = app.borrow_mut().$frame(ts);
            if keep_going {
                if let Some(window) = web_sys::window() {
                    let id = window
                        .request_animation_frame(
                            tick_holder.borrow().as_ref().unwrap().as_ref().unchecked_ref(),
                        )
                        .ok();
                    app.borrow_mut().raf_id = id;
                }
            } else {
                // Break the closure's self-reference so it can drop
                tick_holder.borrow_mut().take();
            }
        }) as Box<dyn FnMut(f64)>));
        if let Some(window) = web_sys::window() {
            let id = window
                .request_animation_frame(holder.borrow().as_ref().unwrap().as_ref().unchecked_ref())
                .ok();
            $inner.borrow_mut().raf_id = id;
        }
    }};
}

fn cancel_frame(raf_id: &mut Option<i32>) {
    if let (Some(window), Some(id)) = (web_sys::window(), raf_id.take()) {
        let _ = window.cancel_animation_frame(id);
    }
}

// ---------------------------------------------------------------------------
// Node-graph background
// ---------------------------------------------------------------------------

struct GraphApp {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    state: GraphState,
    clock: FrameClock,
    input: GraphInput,
    opts: RenderOptions,
    pointer_force: bool,
    running: bool,
    raf_id: Option<i32>,
    resize_requested_at: Option<f64>,
    dpr: f64,
}

impl GraphApp {
    fn frame(&mut self, ts: f64) -> bool {
        if !self.running {
            return false;
        }
        let dt = self.clock.dt(ts);
        self.apply_pending_resize();

        let input = if self.pointer_force {
            self.input.clone()
        } else {
            GraphInput::default()
        };
        graph::tick(&mut self.state, &input, dt);
        if let Err(err) = render::graph::draw(&self.ctx, &self.state, &self.opts) {
            log::warn!("graph render error: {err:?}");
        }
        true
    }

    fn apply_pending_resize(&mut self) {
        let Some(at) = self.resize_requested_at else {
            return;
        };
        if js_sys::Date::now() - at < RESIZE_DEBOUNCE_MS {
            return;
        }
        self.resize_requested_at = None;
        let rect = self.canvas.get_bounding_client_rect();
        let width = (rect.width() * self.dpr).floor().max(1.0);
        let height = (rect.height() * self.dpr).floor().max(1.0);
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.state.resize(width as f32, height as f32);
        log::info!("graph resized to {width:.0}x{height:.0}");
    }
}

/// The always-on node-graph background behind the page
#[wasm_bindgen]
pub struct GraphBackground {
    inner: Rc<RefCell<Option<Rc<RefCell<GraphApp>>>>>,
    listeners: RefCell<Listeners>,
}

impl Default for GraphBackground {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl GraphBackground {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(None)),
            listeners: RefCell::new(Listeners::new()),
        }
    }

    /// Bind to the named canvas and begin animating. No-op if the canvas is
    /// missing or the background is already running.
    pub fn start(&self, canvas_id: &str) {
        if self.inner.borrow().is_some() {
            return;
        }
        let Some((canvas, ctx, width, height, dpr)) = bind_canvas(canvas_id) else {
            log::warn!("GraphBackground.start: no canvas #{canvas_id}");
            return;
        };

        let settings = Settings::load();
        let area = crate::consts::GRAPH_AREA_PER_NODE * settings.density.area_factor();
        let mut state = GraphState::with_density(session_seed(), width, height, area);
        state.ufo_enabled = settings.ufo_enabled;

        let app = Rc::new(RefCell::new(GraphApp {
            canvas: canvas.clone(),
            ctx,
            state,
            clock: FrameClock::new(),
            input: GraphInput::default(),
            opts: RenderOptions::from_settings(&settings),
            pointer_force: settings.pointer_force,
            running: true,
            raf_id: None,
            resize_requested_at: None,
            dpr,
        }));

        let mut listeners = self.listeners.borrow_mut();
        if let Some(window) = web_sys::window() {
            let app_resize = app.clone();
            listeners.add(&window, "resize", move |_event| {
                app_resize.borrow_mut().resize_requested_at = Some(js_sys::Date::now());
            });
        }
        {
            let app_move = app.clone();
            let dpr = dpr as f32;
            listeners.add(&canvas, "mousemove", move |event| {
                if let Some(e) = event.dyn_ref::<MouseEvent>() {
                    app_move.borrow_mut().input.pointer = Some(glam::Vec2::new(
                        e.offset_x() as f32 * dpr,
                        e.offset_y() as f32 * dpr,
                    ));
                }
            });
        }
        {
            let app_leave = app.clone();
            listeners.add(&canvas, "mouseleave", move |_event| {
                app_leave.borrow_mut().input.pointer = None;
            });
        }

        raf_loop!(app, frame);
        *self.inner.borrow_mut() = Some(app);
        log::info!("GraphBackground started on #{canvas_id}");
    }

    /// Halt the loop and unbind every listener. Safe when not running.
    pub fn stop(&self) {
        let Some(app) = self.inner.borrow_mut().take() else {
            return;
        };
        {
            let mut app = app.borrow_mut();
            app.running = false;
            cancel_frame(&mut app.raf_id);
            app.clock.reset();
        }
        self.listeners.borrow_mut().remove_all();
        log::info!("GraphBackground stopped");
    }

    /// Session abduction count, for the curious host page
    pub fn abductions(&self) -> u32 {
        self.inner
            .borrow()
            .as_ref()
            .map(|app| app.borrow().state.ufo.total_abductions as u32)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Flappy Node
// ---------------------------------------------------------------------------

struct FlappyApp {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    state: FlappyState,
    clock: FrameClock,
    input: FlappyInput,
    running: bool,
    raf_id: Option<i32>,
    resize_requested_at: Option<f64>,
    dpr: f64,
    on_request_exit: Option<js_sys::Function>,
}

impl FlappyApp {
    fn frame(&mut self, ts: f64) -> bool {
        if !self.running {
            return false;
        }
        let dt = self.clock.dt(ts);
        self.apply_pending_resize();

        let input = self.input;
        flappy::tick(&mut self.state, &input, dt);
        // One-shot inputs are consumed by exactly one tick
        self.input.flap = false;

        if let Err(err) = render::flappy::draw(&self.ctx, &self.state) {
            log::warn!("flappy render error: {err:?}");
        }
        true
    }

    fn apply_pending_resize(&mut self) {
        let Some(at) = self.resize_requested_at else {
            return;
        };
        if js_sys::Date::now() - at < RESIZE_DEBOUNCE_MS {
            return;
        }
        self.resize_requested_at = None;
        let rect = self.canvas.get_bounding_client_rect();
        let width = (rect.width() * self.dpr).floor().max(1.0);
        let height = (rect.height() * self.dpr).floor().max(1.0);
        if width as u32 != self.canvas.width() || height as u32 != self.canvas.height() {
            self.canvas.set_width(width as u32);
            self.canvas.set_height(height as u32);
            self.state.resize(width as f32, height as f32);
        }
    }

}

/// The arcade game behind the secret code
#[wasm_bindgen]
pub struct FlappyNode {
    inner: Rc<RefCell<Option<Rc<RefCell<FlappyApp>>>>>,
    listeners: RefCell<Listeners>,
    exit_callback: RefCell<Option<js_sys::Function>>,
}

impl Default for FlappyNode {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl FlappyNode {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(None)),
            listeners: RefCell::new(Listeners::new()),
            exit_callback: RefCell::new(None),
        }
    }

    /// Host-settable hook invoked when the player presses the exit key.
    /// Hiding the overlay is the host's job; the game never touches the DOM
    /// outside its canvas.
    pub fn set_on_request_exit(&self, callback: js_sys::Function) {
        *self.exit_callback.borrow_mut() = Some(callback.clone());
        if let Some(app) = self.inner.borrow().as_ref() {
            app.borrow_mut().on_request_exit = Some(callback);
        }
    }

    pub fn clear_on_request_exit(&self) {
        *self.exit_callback.borrow_mut() = None;
        if let Some(app) = self.inner.borrow().as_ref() {
            app.borrow_mut().on_request_exit = None;
        }
    }

    /// Bind to the named canvas and begin a session in Ready. No-op if the
    /// canvas is missing or the game is already running.
    pub fn start(&self, canvas_id: &str) {
        if self.inner.borrow().is_some() {
            return;
        }
        let Some((canvas, ctx, width, height, dpr)) = bind_canvas(canvas_id) else {
            log::warn!("FlappyNode.start: no canvas #{canvas_id}");
            return;
        };

        let app = Rc::new(RefCell::new(FlappyApp {
            canvas: canvas.clone(),
            ctx,
            state: FlappyState::new(session_seed(), width, height),
            clock: FrameClock::new(),
            input: FlappyInput::default(),
            running: true,
            raf_id: None,
            resize_requested_at: None,
            dpr,
            on_request_exit: self.exit_callback.borrow().clone(),
        }));

        let mut listeners = self.listeners.borrow_mut();
        if let Some(window) = web_sys::window() {
            {
                let app_resize = app.clone();
                listeners.add(&window, "resize", move |_event| {
                    app_resize.borrow_mut().resize_requested_at = Some(js_sys::Date::now());
                });
            }
            {
                let app_keys = app.clone();
                listeners.add(&window, "keydown", move |event| {
                    let Some(e) = event.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };
                    match e.code().as_str() {
                        "Space" => {
                            e.prevent_default();
                            app_keys.borrow_mut().input.flap = true;
                        }
                        "Escape" => {
                            // Forwarded to the host, never handled here. The
                            // borrow is released first: the callback may
                            // synchronously call stop().
                            let callback = app_keys.borrow().on_request_exit.clone();
                            if let Some(callback) = callback {
                                let _ = callback.call0(&JsValue::NULL);
                            }
                        }
                        _ => {}
                    }
                });
            }
        }
        {
            let app_pointer = app.clone();
            listeners.add(&canvas, "pointerdown", move |_event| {
                app_pointer.borrow_mut().input.flap = true;
            });
        }

        raf_loop!(app, frame);
        *self.inner.borrow_mut() = Some(app);
        log::info!("FlappyNode started on #{canvas_id}");
    }

    /// Halt the loop and unbind every listener. Safe when not running.
    pub fn stop(&self) {
        let Some(app) = self.inner.borrow_mut().take() else {
            return;
        };
        {
            let mut app = app.borrow_mut();
            app.running = false;
            cancel_frame(&mut app.raf_id);
            app.clock.reset();
        }
        self.listeners.borrow_mut().remove_all();
        log::info!("FlappyNode stopped");
    }

    pub fn score(&self) -> u32 {
        self.inner
            .borrow()
            .as_ref()
            .map(|app| app.borrow().state.score)
            .unwrap_or(0)
    }

    pub fn best_score(&self) -> u32 {
        self.inner
            .borrow()
            .as_ref()
            .map(|app| app.borrow().state.best_score)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Loading splash
// ---------------------------------------------------------------------------

struct LoaderApp {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    scene: LoaderScene,
    clock: FrameClock,
    running: bool,
    raf_id: Option<i32>,
    resize_requested_at: Option<f64>,
}

impl LoaderApp {
    fn frame(&mut self, ts: f64) -> bool {
        if !self.running {
            return false;
        }
        let dt = self.clock.dt(ts);
        self.apply_pending_resize();
        self.scene.tick(dt);
        if let Err(err) = render::loader::draw(&self.ctx, &self.scene) {
            log::warn!("loader render error: {err:?}");
        }
        true
    }

    fn apply_pending_resize(&mut self) {
        let Some(at) = self.resize_requested_at else {
            return;
        };
        if js_sys::Date::now() - at < RESIZE_DEBOUNCE_MS {
            return;
        }
        self.resize_requested_at = None;
        if let Some(size) = splash_size() {
            self.canvas.set_width(size as u32);
            self.canvas.set_height(size as u32);
            self.scene.resize(size as f32);
        }
    }
}

/// Square splash canvas side: 80% of the smaller viewport dimension
fn splash_size() -> Option<f64> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some((width.min(height) * 0.8).max(1.0))
}

/// The loading-splash spinner
#[wasm_bindgen]
pub struct LoaderSplash {
    inner: Rc<RefCell<Option<Rc<RefCell<LoaderApp>>>>>,
    listeners: RefCell<Listeners>,
}

impl Default for LoaderSplash {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl LoaderSplash {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(None)),
            listeners: RefCell::new(Listeners::new()),
        }
    }

    pub fn start(&self, canvas_id: &str) {
        if self.inner.borrow().is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let Some(canvas) = document
            .get_element_by_id(canvas_id)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::warn!("LoaderSplash.start: no canvas #{canvas_id}");
            return;
        };
        let Some(size) = splash_size() else {
            return;
        };
        canvas.set_width(size as u32);
        canvas.set_height(size as u32);
        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            return;
        };

        let app = Rc::new(RefCell::new(LoaderApp {
            canvas: canvas.clone(),
            ctx,
            scene: LoaderScene::new(session_seed(), size as f32),
            clock: FrameClock::new(),
            running: true,
            raf_id: None,
            resize_requested_at: None,
        }));

        let mut listeners = self.listeners.borrow_mut();
        {
            let app_resize = app.clone();
            listeners.add(&window, "resize", move |_event| {
                app_resize.borrow_mut().resize_requested_at = Some(js_sys::Date::now());
            });
        }

        raf_loop!(app, frame);
        *self.inner.borrow_mut() = Some(app);
        log::info!("LoaderSplash started on #{canvas_id}");
    }

    pub fn stop(&self) {
        let Some(app) = self.inner.borrow_mut().take() else {
            return;
        };
        {
            let mut app = app.borrow_mut();
            app.scene.stop();
            app.running = false;
            cancel_frame(&mut app.raf_id);
        }
        self.listeners.borrow_mut().remove_all();
        log::info!("LoaderSplash stopped");
    }
}

// ---------------------------------------------------------------------------
// Page utilities
// ---------------------------------------------------------------------------

/// Uniform random pick from the 404 quote table
#[wasm_bindgen]
pub fn pick_error_quote() -> String {
    use rand::SeedableRng;
    let mut rng = rand_pcg::Pcg32::seed_from_u64(session_seed());
    crate::quotes::pick(&mut rng).to_string()
}

/// Keystroke matcher for the secret code that unlocks the game.
///
/// `feed` returns how many letters are lit so the host can highlight the
/// tagline; the full target length reports a match, and the unlock flag is
/// recorded in host storage.
#[wasm_bindgen]
pub struct SecretCodeMatcher {
    code: crate::SecretCode,
}

impl Default for SecretCodeMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl SecretCodeMatcher {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            code: crate::SecretCode::new("ELEVATE"),
        }
    }

    pub fn target_len(&self) -> u32 {
        self.code.target().len() as u32
    }

    /// Feed one key (the host passes `event.key`); returns lit letter count
    pub fn feed(&mut self, key: &str) -> u32 {
        use crate::secret::Progress;
        use crate::storage::{FlagStore, LocalStore, SECRET_UNLOCKED_KEY};

        let Some(first) = key.chars().next() else {
            return self.code.progress() as u32;
        };
        // Multi-character keys ("Shift", "Escape") are not letters
        if key.chars().count() > 1 {
            return self.code.progress() as u32;
        }
        match self.code.feed(first) {
            Progress::Matched => {
                LocalStore.set(SECRET_UNLOCKED_KEY, "1");
                log::info!("secret code matched");
                self.target_len()
            }
            _ => self.code.progress() as u32,
        }
    }
}

/// Animated stat counter driven by the host's frame timestamps
#[wasm_bindgen]
pub struct StatCounter {
    tween: crate::CounterTween,
    clock: FrameClock,
}

#[wasm_bindgen]
impl StatCounter {
    #[wasm_bindgen(constructor)]
    pub fn new(target: u32, duration_secs: f32) -> Self {
        Self {
            tween: crate::CounterTween::new(target as u64, duration_secs),
            clock: FrameClock::new(),
        }
    }

    /// Advance with a frame timestamp and return the value to display
    pub fn tick(&mut self, now_ms: f64) -> u32 {
        let dt = self.clock.dt(now_ms);
        self.tween.advance(dt) as u32
    }

    pub fn done(&self) -> bool {
        self.tween.done()
    }
}
