//! Game state and core simulation types
//!
//! All state that must be persisted for Continue/determinism lives here.

use serde::{Deserialize, Serialize};

use super::craft::Craft;
use super::feedback::GameEvent;
use super::flight::{FlightController, InputBindings};
use super::level::Level;
use super::physics::Physics;
use super::router::CollisionRouter;
use super::scene::{LevelLoader, SceneLoader};
use crate::tuning::Tuning;

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for level generation
    pub seed: u64,
    /// Layout of the active scene
    pub level: Level,
    pub craft: Craft,
    pub physics: Physics,
    pub controller: FlightController,
    pub router: CollisionRouter,
    pub loader: LevelLoader,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Ticks flown in the active scene (paused during transitions)
    pub level_ticks: u64,
    /// Fuel cells collected this run
    pub fuel_collected: u32,
    /// Events for the host, drained every frame
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, &Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: &Tuning) -> Self {
        let level = Level::generate(seed, 0);
        let craft = Craft::new(level.spawn);
        let mut physics = Physics::new(tuning.gravity);
        physics.reset(&craft, &level);

        Self {
            seed,
            level,
            craft,
            physics,
            controller: FlightController::new(tuning.thrust_strength, tuning.rotation_speed),
            router: CollisionRouter::new(tuning.outcomes.clone(), tuning.load_mode),
            loader: LevelLoader::new(tuning.scene_count, tuning.load_latency_ticks),
            time_ticks: 0,
            level_ticks: 0,
            fuel_collected: 0,
            events: Vec::new(),
        }
    }

    /// Hook the controller to its inputs and the router to contacts
    pub fn initialize(&mut self, bindings: InputBindings) {
        self.controller.initialize(bindings);
        self.router.initialize();
        log::info!(
            "Run {} started on scene {} (controller enabled: {})",
            self.seed,
            self.scene_index(),
            self.controller.is_enabled()
        );
    }

    /// Unhook both components; always pairs with `initialize`
    pub fn shutdown(&mut self) {
        self.controller.shutdown(&mut self.events);
        self.router.shutdown();
        log::info!("Run {} shut down", self.seed);
    }

    /// Index of the active scene
    pub fn scene_index(&self) -> usize {
        self.loader.active_scene()
    }

    pub fn scene_count(&self) -> usize {
        self.loader.scene_count()
    }

    /// Rebuild the level and craft for a freshly loaded scene
    pub fn enter_scene(&mut self, index: usize) {
        self.level = Level::generate(self.seed, index);
        self.craft = Craft::new(self.level.spawn);
        self.physics.reset(&self.craft, &self.level);
        self.level_ticks = 0;
        self.events.push(GameEvent::SceneLoaded { index });
        log::info!("Entered scene {} of {}", index + 1, self.scene_count());
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
