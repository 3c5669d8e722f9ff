//! Head Flap entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent};

    use head_flap::audio::WebAudio;
    use head_flap::input::{
        Keypoint, KeypointProvider, TrackStep, TrackingError, TrackingLoop, select_source,
        start_tracking,
    };
    use head_flap::renderer::{SdfRenderState, SpriteSet, final_score_text};
    use head_flap::sim::GamePhase;
    use head_flap::{ControlMode, Game, Settings, Tuning};

    // Camera + face landmark bridge. Inference runs on its own animation
    // frame pump; Rust only ever reads the latest nose keypoint.
    #[wasm_bindgen(inline_js = "
        let video = null;
        let detector = null;
        let running = false;
        let busy = false;
        let latest = null;
        let failure = null;

        export async function camera_start() {
            if (!navigator.mediaDevices || !navigator.mediaDevices.getUserMedia) {
                throw 'camera API not available';
            }
            if (typeof faceLandmarksDetection === 'undefined') {
                throw 'face landmark model not loaded';
            }
            let stream;
            try {
                stream = await navigator.mediaDevices.getUserMedia({ video: { facingMode: 'user' } });
            } catch (e) {
                if (e && e.name === 'NotAllowedError') throw 'permission';
                throw String(e);
            }
            video = document.getElementById('webcam') || document.createElement('video');
            video.srcObject = stream;
            video.muted = true;
            video.playsInline = true;
            await video.play();
            detector = await faceLandmarksDetection.createDetector(
                faceLandmarksDetection.SupportedModels.MediaPipeFaceMesh,
                { runtime: 'tfjs', refineLandmarks: false, maxFaces: 1 });
            running = true;
            requestAnimationFrame(pump);
            return true;
        }

        async function pump() {
            if (!running) return;
            if (!busy && video.readyState === 4) {
                busy = true;
                try {
                    const faces = await detector.estimateFaces(video);
                    latest = faces.length > 0 ? faces[0].keypoints[1] : null;
                } catch (e) {
                    failure = String(e);
                }
                busy = false;
            }
            requestAnimationFrame(pump);
        }

        export function camera_latest_y() {
            if (failure !== null) {
                const f = failure;
                failure = null;
                throw f;
            }
            return latest ? latest.y : NaN;
        }

        export function camera_latest_x() {
            return latest ? latest.x : NaN;
        }

        export function camera_frame_height() {
            return video ? video.videoHeight : 0;
        }

        export function camera_stop() {
            running = false;
            if (video && video.srcObject) {
                video.srcObject.getTracks().forEach(t => t.stop());
            }
        }
    ")]
    extern "C" {
        #[wasm_bindgen(catch)]
        async fn camera_start() -> Result<JsValue, JsValue>;
        #[wasm_bindgen(catch)]
        fn camera_latest_y() -> Result<f64, JsValue>;
        fn camera_latest_x() -> f64;
        fn camera_frame_height() -> f64;
        fn camera_stop();
    }

    fn js_error_text(err: &JsValue) -> String {
        err.as_string()
            .or_else(|| {
                err.dyn_ref::<js_sys::Error>()
                    .map(|e| String::from(e.message()))
            })
            .unwrap_or_else(|| format!("{:?}", err))
    }

    /// Keypoints from the browser camera bridge, in native video pixels
    struct BrowserCamera;

    impl KeypointProvider for BrowserCamera {
        fn latest_keypoint(&mut self) -> Result<Option<Keypoint>, TrackingError> {
            let y = camera_latest_y().map_err(|e| TrackingError::Inference(js_error_text(&e)))?;
            if y.is_nan() {
                return Ok(None);
            }
            Ok(Some(Keypoint {
                x: camera_latest_x() as f32,
                y: y as f32,
            }))
        }

        fn frame_height(&self) -> f32 {
            camera_frame_height() as f32
        }
    }

    async fn start_camera() -> Result<(), TrackingError> {
        camera_start().await.map(|_| ()).map_err(|e| {
            let text = js_error_text(&e);
            if text == "permission" {
                TrackingError::PermissionDenied
            } else {
                TrackingError::Unavailable(text)
            }
        })
    }

    /// Tracking loop on its own animation frame chain, until disabled
    fn schedule_tracking(mut tracking: TrackingLoop<BrowserCamera>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            if tracking.step() == TrackStep::Stopped {
                camera_stop();
                log::info!("Tracking loop stopped");
                return;
            }
            schedule_tracking(tracking);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Everything the frame callback needs
    struct App {
        game: Game,
        settings: Settings,
        render_state: Option<SdfRenderState>,
        sprites: SpriteSet,
        last_phase: GamePhase,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            self.game.frame(time);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            self.render(time);
            self.update_hud();
        }

        fn render(&mut self, time: f64) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            self.game.render(render_state, &self.sprites);
            match render_state.present(self.game.state.phase, time) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(render_state) = &self.render_state {
                if let (Some(el), Some(text)) = (
                    document.get_element_by_id("hud-score"),
                    render_state.hud().first(),
                ) {
                    if el.text_content().as_deref() != Some(text.text.as_str()) {
                        el.set_text_content(Some(&text.text));
                    }
                    if let Ok(el) = el.dyn_into::<HtmlElement>() {
                        let style = el.style();
                        let _ = style.set_property("left", &format!("{}px", text.x));
                        let _ = style.set_property("top", &format!("{}px", text.y - text.size_px));
                        let _ = style.set_property("font-size", &format!("{}px", text.size_px));
                    }
                }
            }

            if self.settings.show_fps {
                if let Some(el) = document.get_element_by_id("hud-fps") {
                    el.set_text_content(Some(&self.fps.to_string()));
                }
            }

            let phase = self.game.state.phase;
            if phase == self.last_phase {
                return;
            }
            self.last_phase = phase;

            if let Some(el) = document.get_element_by_id("gameover-menu") {
                if let Some(text) = final_score_text(&self.game.state) {
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&text));
                    }
                    set_hidden(&el, false);
                } else {
                    set_hidden(&el, true);
                }
            }
        }
    }

    fn set_hidden(el: &web_sys::Element, hidden: bool) {
        let _ = el.class_list().toggle_with_force("hidden", hidden);
    }

    fn hide(document: &web_sys::Document, id: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            set_hidden(&el, true);
        }
    }

    fn show_error(message: &str) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("error-message") {
            el.set_text_content(Some(message));
            set_hidden(&el, false);
        }
    }

    /// Runtime balance override from LocalStorage, validated
    fn load_tuning() -> Tuning {
        let json = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .and_then(|s| s.get_item("head_flap_tuning").ok())
            .flatten();
        match json.map(|j| Tuning::from_json(&j)) {
            Some(Ok(tuning)) => {
                log::info!("Loaded tuning override");
                tuning
            }
            Some(Err(e)) => {
                log::warn!("Ignoring tuning override: {e}");
                Tuning::default()
            }
            None => Tuning::default(),
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Head Flap starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        hide(&document, "loading");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("board")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = match SdfRenderState::new(surface, &adapter, width, height).await {
            Ok(mut rs) => {
                rs.set_start_time(head_flap::platform::now_ms());
                Some(rs)
            }
            Err(e) => {
                log::error!("Renderer unavailable: {e}");
                None
            }
        };
        let render_state = Rc::new(RefCell::new(render_state));

        setup_start_button(render_state);

        log::info!("Head Flap ready");
    }

    /// Start button: set up input (camera if wanted), then the game
    fn setup_start_button(render_state: Rc<RefCell<Option<SdfRenderState>>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(btn) = document.get_element_by_id("start-button") else {
            log::error!("No start button in page");
            return;
        };

        let starting = Rc::new(Cell::new(false));
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            if starting.get() {
                return;
            }
            starting.set(true);
            let render_state = render_state.clone();
            let starting = starting.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if !start_game(render_state).await {
                    starting.set(false);
                }
            });
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Returns false when the player can retry
    async fn start_game(render_state: Rc<RefCell<Option<SdfRenderState>>>) -> bool {
        let settings = Settings::load();
        let tuning = load_tuning();

        let tracker = if settings.control_mode == ControlMode::Tracked {
            Some(match start_camera().await {
                Ok(()) => {
                    let (tracking, handle) = start_tracking(BrowserCamera, tuning.smoothing_factor);
                    schedule_tracking(tracking);
                    Ok(handle)
                }
                Err(e) => Err(e),
            })
        } else {
            None
        };

        let input = match select_source(&settings, tracker) {
            Ok(input) => input,
            Err(e) => {
                log::error!("{e}");
                show_error(&format!("{e}. Allow camera access and press start again."));
                return false;
            }
        };

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return false;
        };
        hide(&document, "main-menu");
        hide(&document, "error-message");

        let audio = WebAudio::new(&settings);
        audio.resume();

        let seed = js_sys::Date::now() as u64;
        let mut game = Game::new(seed, tuning, input, Box::new(audio));
        game.enter();
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            last_phase: game.state.phase,
            game,
            settings,
            render_state: render_state.borrow_mut().take(),
            sprites: SpriteSet::all(),
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }));

        setup_input_handlers(app.clone());
        setup_restart_button(app.clone());
        request_animation_frame(app);
        true
    }

    fn setup_input_handlers(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Mouse
        if let Some(canvas) = document.get_element_by_id("board") {
            let app_mouse = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app_mouse.borrow_mut().game.trigger();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();

            // Touch
            let app_touch = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                app_touch.borrow_mut().game.trigger();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if event.repeat() {
                return;
            }
            match event.key().as_str() {
                " " | "Enter" | "ArrowUp" | "w" | "W" => {
                    event.prevent_default();
                    app.borrow_mut().game.trigger();
                }
                "m" | "M" => {
                    let mut app = app.borrow_mut();
                    let app = &mut *app;
                    app.settings.muted = !app.settings.muted;
                    app.game.audio_mut().apply_settings(&app.settings);
                    app.settings.save();
                    log::info!("Muted: {}", app.settings.muted);
                }
                _ => {}
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-button") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut app = app.borrow_mut();
                if app.game.state.phase == GamePhase::Ended {
                    app.game.trigger();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    //! Native runs without a window: an autopilot plays against the real
    //! simulation and logs how far it got.

    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use head_flap::audio::SilentAudio;
    use head_flap::consts::SIM_DT;
    use head_flap::input::{
        ImpulseInput, Keypoint, KeypointProvider, TrackingError, select_source, spawn_thread,
        start_tracking,
    };
    use head_flap::renderer::{DrawList, SpriteSet};
    use head_flap::sim::{GamePhase, GameState, Obstacle};
    use head_flap::{ControlMode, Game, Settings, Tuning};

    const MAX_SECONDS: f64 = 120.0;

    /// First obstacle the entity has not yet cleared
    fn next_obstacle(state: &GameState) -> Option<&Obstacle> {
        state
            .obstacles
            .iter()
            .find(|o| o.right_edge() >= state.entity.pos.x)
    }

    /// Where the autopilot wants the entity's center
    fn target_y(state: &GameState) -> f32 {
        next_obstacle(state)
            .map(|o| o.gap_center)
            .unwrap_or(state.tuning.field_height / 2.0)
    }

    fn finish(game: &Game, frames: u64) {
        let mut surface = DrawList::default();
        game.render(&mut surface, &SpriteSet::all());
        log::info!(
            "Headless run finished after {} frames: phase {:?}, score {}, {} draw calls",
            frames,
            game.state.phase,
            game.state.display_score(),
            surface.commands.len()
        );
    }

    /// Impulse autopilot on simulated time
    pub fn run_impulse(seed: u64) {
        let mut game = Game::new(
            seed,
            Tuning::default(),
            Box::new(ImpulseInput::default()),
            Box::new(SilentAudio),
        );
        game.enter();
        game.trigger();

        let frame_ms = SIM_DT as f64 * 1000.0;
        let mut frames = 0;
        let mut t = 0.0;
        while t < MAX_SECONDS * 1000.0 && game.state.phase != GamePhase::Ended {
            let entity = &game.state.entity;
            let center = entity.pos.y + entity.size.y / 2.0;
            if center > target_y(&game.state) + 12.0 && entity.vel_y >= 0.0 {
                game.trigger();
            }
            game.frame(t);
            t += frame_ms;
            frames += 1;
        }
        finish(&game, frames);
    }

    /// Synthetic head that drifts toward a target row, like a player would
    struct SyntheticHead {
        target: Arc<AtomicU32>,
        y: f32,
        frame_height: f32,
    }

    impl KeypointProvider for SyntheticHead {
        fn latest_keypoint(&mut self) -> Result<Option<Keypoint>, TrackingError> {
            let target = f32::from_bits(self.target.load(Ordering::Relaxed)) * self.frame_height;
            self.y += (target - self.y) * 0.2;
            Ok(Some(Keypoint { x: 320.0, y: self.y }))
        }

        fn frame_height(&self) -> f32 {
            self.frame_height
        }
    }

    /// Tracked autopilot: a tracking thread feeds the mailbox in real time
    pub fn run_tracked(seed: u64) {
        let tuning = Tuning::default();
        let target = Arc::new(AtomicU32::new(0.3f32.to_bits()));
        let provider = SyntheticHead {
            target: target.clone(),
            y: 240.0,
            frame_height: 480.0,
        };
        let (tracking, handle) = start_tracking(provider, tuning.smoothing_factor);
        let control = handle.control.clone();
        let thread = spawn_thread(tracking, Duration::from_millis(33));

        let settings = Settings {
            control_mode: ControlMode::Tracked,
            ..Settings::default()
        };
        let input = match select_source(&settings, Some(Ok(handle))) {
            Ok(input) => input,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        };
        let range = tuning.tracked_y_range();
        let mut game = Game::new(seed, tuning, input, Box::new(SilentAudio));
        game.enter();

        let started = head_flap::platform::now_ms();
        let mut frames = 0;
        loop {
            let now = head_flap::platform::now_ms();
            if now - started > MAX_SECONDS * 1000.0 || game.state.phase == GamePhase::Ended {
                break;
            }
            let half = game.state.entity.size.y / 2.0;
            let wanted = ((target_y(&game.state) - half) / range).clamp(0.0, 1.0);
            target.store(wanted.to_bits(), Ordering::Relaxed);

            game.frame(now);
            frames += 1;
            std::thread::sleep(Duration::from_millis(16));
        }

        finish(&game, frames);

        control.disable();
        drop(game);
        if thread.join().is_err() {
            log::warn!("Tracking thread panicked");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
use head_flap::ControlMode;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Head Flap (native, headless) starting...");

    let mut mode = ControlMode::Impulse;
    let mut seed = 42;
    for arg in std::env::args().skip(1) {
        if arg == "--tracked" {
            mode = ControlMode::Tracked;
        } else if let Some(name) = arg.strip_prefix("--mode=") {
            match ControlMode::from_str(name) {
                Some(m) => mode = m,
                None => log::warn!("Unknown control mode {name:?}"),
            }
        } else {
            match arg.parse() {
                Ok(s) => seed = s,
                Err(_) => log::warn!("Ignoring argument {arg:?}"),
            }
        }
    }

    log::info!("Headless run: {} control, seed {seed}", mode.as_str());
    match mode {
        ControlMode::Tracked => headless::run_tracked(seed),
        ControlMode::Impulse => headless::run_impulse(seed),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
