//! Rocket Lander entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use rocket_lander::audio::AudioManager;
    use rocket_lander::consts::*;
    use rocket_lander::records::format_ticks;
    use rocket_lander::sim::{
        Category, DebugCommand, GameEvent, GameState, InputBindings, InputSnapshot, TickInput,
        tick,
    };
    use rocket_lander::{LandingRecords, Settings, Tuning};

    /// Keys currently held
    #[derive(Debug, Default, Clone, Copy)]
    struct HeldKeys {
        thrust: bool,
        left: bool,
        right: bool,
    }

    impl HeldKeys {
        fn snapshot(&self) -> InputSnapshot {
            // Positive axis turns the nose clockwise
            let rotation = match (self.left, self.right) {
                (true, false) => -1.0,
                (false, true) => 1.0,
                _ => 0.0,
            };
            InputSnapshot {
                thrust: self.thrust,
                rotation,
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        tuning: Tuning,
        settings: Settings,
        records: LandingRecords,
        audio: AudioManager,
        accumulator: f32,
        last_time: f64,
        keys: HeldKeys,
        pending_debug: Option<DebugCommand>,
        paused: bool,
        status: String,
    }

    impl Game {
        fn new(seed: u64, tuning: Tuning) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);

            let mut state = GameState::with_tuning(seed, &tuning);
            state.initialize(InputBindings::default());

            Self {
                state,
                tuning,
                settings,
                records: LandingRecords::load(),
                audio,
                accumulator: 0.0,
                last_time: 0.0,
                keys: HeldKeys::default(),
                pending_debug: None,
                paused: false,
                status: String::new(),
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            if self.paused {
                self.accumulator = 0.0;
                return;
            }

            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = TickInput {
                    controls: self.keys.snapshot(),
                    debug: self.pending_debug.take(),
                };
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            for event in self.state.drain_events() {
                self.handle_event(&event);
            }
        }

        fn handle_event(&mut self, event: &GameEvent) {
            self.audio.handle(event);

            match *event {
                GameEvent::TransitionStarted {
                    category: Category::Hazard,
                } => {
                    self.status = "Crashed!".to_string();
                }
                GameEvent::Landed {
                    forced: true,
                    scene,
                    ..
                } => {
                    self.status = "Skipped (debug)".to_string();
                    log::debug!("Debug landing on level {} not recorded", scene + 1);
                }
                GameEvent::Landed { scene, ticks, .. } => {
                    self.status = format!("Landed in {}", format_ticks(ticks));
                    if self.records.record(scene, ticks, js_sys::Date::now()) {
                        self.status.push_str(" - new best!");
                        self.records.save();
                        self.audio.play_record();
                    }
                }
                GameEvent::SceneLoaded { .. } => self.status.clear(),
                GameEvent::PickupCollected { .. } => {
                    log::debug!("Fuel collected ({})", self.state.fuel_collected);
                }
                _ => {}
            }
        }

        fn set_paused(&mut self, paused: bool) {
            if self.paused == paused {
                return;
            }
            self.paused = paused;
            if self.settings.mute_on_blur {
                self.audio.set_muted(paused);
            }
            log::info!("{}", if paused { "Paused" } else { "Resumed" });
        }

        /// Reset game state for restart
        fn restart(&mut self, seed: u64) {
            self.state.shutdown();
            self.audio.stop_all();
            self.state = GameState::with_tuning(seed, &self.tuning);
            self.state.initialize(InputBindings::default());
            self.accumulator = 0.0;
            self.status.clear();
            log::info!("Game restarted with seed: {}", seed);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let set = |selector: &str, text: &str| {
                if let Some(el) = document.query_selector(selector).ok().flatten() {
                    el.set_text_content(Some(text));
                }
            };

            let scene = self.state.scene_index();
            set(
                "#hud-level .hud-value",
                &format!("{}/{}", scene + 1, self.state.scene_count()),
            );
            set("#hud-time .hud-value", &format_ticks(self.state.level_ticks));
            set(
                "#hud-fuel .hud-value",
                &self.state.fuel_collected.to_string(),
            );

            if self.settings.show_telemetry {
                let craft = &self.state.craft;
                set("#hud-speed .hud-value", &format!("{:.1}", craft.vel.length()));
                set(
                    "#hud-angle .hud-value",
                    &format!("{:.0}°", craft.angle.to_degrees()),
                );
            }

            if self.settings.show_records {
                let best = self
                    .records
                    .best(scene)
                    .map(|r| format_ticks(r.ticks))
                    .unwrap_or_else(|| "--".to_string());
                set("#hud-best .hud-value", &best);
                let total = self
                    .records
                    .total_ticks(self.state.scene_count())
                    .map(format_ticks)
                    .unwrap_or_else(|| "--".to_string());
                set("#hud-total .hud-value", &total);
            }

            if let Some(el) = document.get_element_by_id("status") {
                el.set_text_content(Some(&self.status));
                let class = if self.status.is_empty() { "hidden" } else { "" };
                let _ = el.set_attribute("class", class);
            }

            if let Some(el) = document.get_element_by_id("pause-overlay") {
                let class = if self.paused { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }
        }
    }

    /// Tuning overrides embedded in the page as `<script id="tuning" type="application/json">`
    fn load_tuning(document: &web_sys::Document) -> Tuning {
        let Some(json) = document
            .get_element_by_id("tuning")
            .and_then(|el| el.text_content())
        else {
            return Tuning::default();
        };
        match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring invalid tuning: {}", e);
                Tuning::default()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Rocket Lander starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let tuning = load_tuning(&document);
        let game = Rc::new(RefCell::new(Game::new(seed, tuning)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&window, game.clone());
        setup_auto_pause(&window, &document, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        request_animation_frame(game);

        log::info!("Rocket Lander running!");
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                match event.key().as_str() {
                    " " | "w" | "W" | "ArrowUp" => g.keys.thrust = true,
                    "a" | "A" | "ArrowLeft" => g.keys.left = true,
                    "d" | "D" | "ArrowRight" => g.keys.right = true,
                    "Escape" | "p" | "P" => {
                        let paused = !g.paused;
                        g.set_paused(paused);
                    }
                    "r" | "R" => g.restart(js_sys::Date::now() as u64),
                    // Debug shortcuts (ignored by release builds)
                    "l" | "L" => g.pending_debug = Some(DebugCommand::ForceFinish),
                    "k" | "K" => g.pending_debug = Some(DebugCommand::ForceCrash),
                    "c" | "C" => g.pending_debug = Some(DebugCommand::ToggleCollisions),
                    _ => return,
                }
                event.prevent_default();
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " | "w" | "W" | "ArrowUp" => g.keys.thrust = false,
                    "a" | "A" | "ArrowLeft" => g.keys.left = false,
                    "d" | "D" | "ArrowRight" => g.keys.right = false,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(
        window: &web_sys::Window,
        document: &web_sys::Document,
        game: Rc<RefCell<Game>>,
    ) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    g.keys = HeldKeys::default();
                    g.set_paused(true);
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                // Key-ups are lost while unfocused
                g.keys = HeldKeys::default();
                g.set_paused(true);
                log::info!("Auto-paused (window blur)");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use rocket_lander::sim::{Category, GameState, InputSnapshot};

    /// Cruise altitude while crossing the level
    const CRUISE_HEIGHT: f32 = 13.0;
    /// Maximum tilt away from vertical (radians)
    const MAX_TILT: f32 = 0.45;

    /// Fly toward the finish pad: climb, cross, then descend slowly
    pub fn steer(state: &GameState) -> InputSnapshot {
        let craft = &state.craft;
        let Some(pad) = state.level.with_category(Category::Finish).next() else {
            return InputSnapshot::default();
        };
        let target = pad.rect.center();
        let pad_top = pad.rect.max.y;

        let dx = target.x - craft.pos.x;
        let desired_vx = (dx * 0.5).clamp(-4.0, 4.0);
        // Positive angle tilts the nose left, pushing the craft left
        let desired_angle = (-(desired_vx - craft.vel.x) * 0.2).clamp(-MAX_TILT, MAX_TILT);

        let rotation = if craft.angle > desired_angle + 0.05 {
            1.0
        } else if craft.angle < desired_angle - 0.05 {
            -1.0
        } else {
            0.0
        };

        let over_pad = dx.abs() < pad.rect.max.x - target.x - craft.radius;
        let target_y = if over_pad {
            pad_top + craft.radius
        } else {
            CRUISE_HEIGHT
        };
        let desired_vy = ((target_y - craft.pos.y) * 0.8).clamp(-1.5, 3.0);

        InputSnapshot {
            thrust: craft.vel.y < desired_vy,
            rotation,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rocket_lander::consts::SIM_DT;
    use rocket_lander::records::format_ticks;
    use rocket_lander::sim::{GameEvent, GameState, InputBindings, TickInput, tick};
    use rocket_lander::{LandingRecords, Tuning};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Rocket Lander (native) starting...");
    log::info!("Native mode runs a headless autopilot - build for wasm32 to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let tuning = match std::env::args().nth(2) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Could not load tuning from {}: {}", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let mut state = GameState::with_tuning(seed, &tuning);
    state.initialize(InputBindings::default());
    let mut records = LandingRecords::load();

    // Two minutes of simulated flight
    let max_ticks = (120.0 / SIM_DT) as u64;
    let mut crashes = 0;
    while state.time_ticks < max_ticks {
        let input = TickInput {
            controls: autopilot::steer(&state),
            debug: None,
        };
        tick(&mut state, &input, SIM_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::Landed {
                    forced: true,
                    scene,
                    ..
                } => log::debug!("Debug landing on level {} not recorded", scene + 1),
                GameEvent::Landed { scene, ticks, .. } => {
                    let best = records.record(scene, ticks, state.time_ticks as f64);
                    log::info!(
                        "Landed on level {} in {}{}",
                        scene + 1,
                        format_ticks(ticks),
                        if best { " (new best)" } else { "" }
                    );
                }
                GameEvent::TransitionStarted { category } => {
                    log::debug!("Transition started by {:?}", category);
                    if category == rocket_lander::sim::Category::Hazard {
                        crashes += 1;
                    }
                }
                GameEvent::PickupCollected { id } => log::info!("Collected fuel cell {}", id),
                GameEvent::SceneLoaded { index } => log::info!("Level {} loaded", index + 1),
                _ => {}
            }
        }
    }

    state.shutdown();
    records.save();
    log::info!(
        "Autopilot finished: level {}/{}, {} crashes, {} fuel cells",
        state.scene_index() + 1,
        state.scene_count(),
        crashes,
        state.fuel_collected
    );
    match records.total_ticks(state.scene_count()) {
        Some(total) => log::info!("Best full run: {}", format_ticks(total)),
        None => log::info!("Best full run: not every level landed yet"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
