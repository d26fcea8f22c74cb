//! Sharp Objects entry point
//!
//! In the browser this wires the canvas, the control buttons and the
//! animation loop to a [`Scene`]. Natively it runs the same scene headless
//! for a few simulated seconds and logs where everything ended up.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlElement, HtmlInputElement};

    use sharp_objects::consts::{MAX_POPULATION, MIN_POPULATION, SIM_DT};
    use sharp_objects::engine::RapierEngine;
    use sharp_objects::renderer::{DisplaySurface, Frame, RenderState};
    use sharp_objects::sim::{ContainerKind, PopulationMode, Scene, Viewport};
    use sharp_objects::{LiveConfigPatch, PaletteId, RenderError, SceneConfig, SpeedLevel};

    /// Canvas-backed surface; the GPU state outlives individual mounts
    struct CanvasSurface {
        canvas: HtmlCanvasElement,
        render_state: RenderState,
        attached: bool,
    }

    impl DisplaySurface for CanvasSurface {
        fn measure(&self) -> Option<Viewport> {
            let window = web_sys::window()?;
            let mut viewport = Viewport::new(
                self.canvas.client_width() as f32,
                self.canvas.client_height() as f32,
            );
            viewport.pixel_ratio = window.device_pixel_ratio() as f32;
            viewport.is_valid().then_some(viewport)
        }

        fn attach(&mut self, viewport: &Viewport) {
            let (width, height) = viewport.physical_size();
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.render_state.resize(viewport);
            self.attached = true;
        }

        fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
            if !self.attached {
                return Err(RenderError::Detached);
            }
            self.render_state.render(frame)
        }

        fn detach(&mut self) {
            self.attached = false;
        }
    }

    struct App {
        scene: Scene<RapierEngine, CanvasSurface>,
        speed: SpeedLevel,
        last_time: f64,
    }

    fn js_err(e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).map_err(js_err)?;

        log::info!("Sharp Objects starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let mut viewport = Viewport::new(
            canvas.client_width().max(1) as f32,
            canvas.client_height().max(1) as f32,
        );
        viewport.pixel_ratio = window.device_pixel_ratio() as f32;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(js_err)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(js_err)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, &viewport)
            .await
            .map_err(js_err)?;

        let config = SceneConfig::default();
        let seed = js_sys::Date::now() as u64;
        let surface = CanvasSurface {
            canvas,
            render_state,
            attached: false,
        };
        let mut scene = Scene::new(&config, surface, seed);
        scene.start();
        log::info!("Scene created with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            scene,
            speed: SpeedLevel::default(),
            last_time: 0.0,
        }));

        setup_controls(&app);
        setup_window_events(&app);
        refresh_labels(&app.borrow());

        request_animation_frame(app);
        Ok(())
    }

    fn element(id: &str) -> Option<HtmlElement> {
        web_sys::window()?
            .document()?
            .get_element_by_id(id)?
            .dyn_into()
            .ok()
    }

    fn set_label(id: &str, text: &str) {
        if let Some(el) = element(id) {
            el.set_text_content(Some(text));
        }
    }

    fn refresh_labels(app: &App) {
        let live = app.scene.live();
        let structural = app.scene.structural();
        set_label("speed-btn", app.speed.as_str());
        set_label("play-btn", if live.running { "Pause" } else { "Play" });
        set_label("reverse-btn", if live.reversed { "CCW" } else { "CW" });
        set_label("palette-btn", &app.scene.palette().name);
        set_label("container-btn", structural.container.as_str());
        set_label(
            "mode-btn",
            match structural.mode {
                PopulationMode::Classic => "Classic",
                PopulationMode::Mixed => "Mixed",
            },
        );
        set_label("count-label", &structural.population.to_string());
    }

    /// Register a click handler on `id` that mutates the app, then relabel
    fn on_click(app: &Rc<RefCell<App>>, id: &str, handler: impl Fn(&mut App) + 'static) {
        let Some(btn) = element(id) else {
            log::warn!("Missing control #{}", id);
            return;
        };
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            let mut a = app.borrow_mut();
            handler(&mut a);
            refresh_labels(&a);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn next_in<T: Copy + PartialEq>(all: &[T], current: T) -> T {
        let i = all.iter().position(|x| *x == current).unwrap_or(0);
        all[(i + 1) % all.len()]
    }

    fn setup_controls(app: &Rc<RefCell<App>>) {
        on_click(app, "speed-btn", |a| {
            a.speed = a.speed.next();
            let speed = a.speed.degrees_per_tick();
            a.scene.apply_live_config(LiveConfigPatch::speed(speed));
        });
        on_click(app, "play-btn", |a| {
            let running = !a.scene.live().running;
            a.scene.apply_live_config(LiveConfigPatch::running(running));
        });
        on_click(app, "reverse-btn", |a| {
            let reversed = !a.scene.live().reversed;
            a.scene.apply_live_config(LiveConfigPatch::reversed(reversed));
        });
        on_click(app, "palette-btn", |a| {
            let palette = next_in(&PaletteId::ALL, a.scene.live().palette);
            a.scene.apply_live_config(LiveConfigPatch::palette(palette));
        });
        on_click(app, "container-btn", |a| {
            let mut next = *a.scene.structural();
            next.container = next_in(&ContainerKind::ALL, next.container);
            a.scene.rebuild(next);
        });
        on_click(app, "mode-btn", |a| {
            let mut next = *a.scene.structural();
            next.mode = match next.mode {
                PopulationMode::Classic => PopulationMode::Mixed,
                PopulationMode::Mixed => PopulationMode::Classic,
            };
            a.scene.rebuild(next);
        });
        on_click(app, "reset-btn", |a| a.scene.reset());

        if let Some(input) =
            element("count-input").and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_min(&MIN_POPULATION.to_string());
            input.set_max(&MAX_POPULATION.to_string());
            input.set_value(&app.borrow().scene.structural().population.to_string());

            let app = app.clone();
            let source = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Ok(population) = source.value().parse::<i32>() else {
                    return;
                };
                let mut a = app.borrow_mut();
                let mut next = *a.scene.structural();
                next.population = population;
                a.scene.rebuild(next);
                refresh_labels(&a);
            });
            let _ = input
                .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_window_events(app: &Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::UiEvent| {
                app.borrow_mut().scene.notify_resize();
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().scene.stop();
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pages restored from the back/forward cache come back torn down
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().scene.start();
            });
            let _ = window
                .add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;
            a.scene.update(dt);
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = web::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    use sharp_objects::consts::SIM_DT;
    use sharp_objects::engine::{PhysicsEngine, RapierEngine};
    use sharp_objects::renderer::HeadlessSurface;
    use sharp_objects::sim::{Scene, Viewport};
    use sharp_objects::{ConfigError, SceneConfig};

    /// Simulated wall-clock time for a headless run (seconds)
    const RUN_SECONDS: f32 = 10.0;

    pub fn run() -> Result<(), ConfigError> {
        let config = match std::env::args().nth(1) {
            Some(path) => SceneConfig::load(Path::new(&path))?,
            None => SceneConfig::default(),
        };
        let seed = config.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        });

        let surface = HeadlessSurface::new(Some(Viewport::new(1280.0, 800.0)));
        let mut scene: Scene<RapierEngine, HeadlessSurface> = Scene::new(&config, surface, seed);
        scene.start();

        let frames = (RUN_SECONDS / SIM_DT) as usize;
        for _ in 0..frames {
            scene.update(SIM_DT);
        }

        if let (Some(rotation), Some(engine), Some(bodies)) =
            (scene.rotation(), scene.engine(), scene.bodies())
        {
            log::info!(
                "{} ticks, container at {:.1} degrees, {} frames presented",
                scene.ticks(),
                rotation.angle.to_degrees(),
                scene.surface().frames
            );
            for (i, body) in bodies.dynamic.iter().enumerate() {
                if let Some(state) = engine.body_state(body.handle) {
                    log::info!(
                        "  #{} {} at ({:.1}, {:.1}) v=({:.1}, {:.1})",
                        i,
                        body.fill.to_hex(),
                        state.position.x,
                        state.position.y,
                        state.linvel.x,
                        state.linvel.y
                    );
                }
            }
        }

        scene.stop();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Sharp Objects (native, headless) starting...");
    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}
