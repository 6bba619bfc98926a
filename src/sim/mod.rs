//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by collider ID)
//! - No rendering or platform dependencies

pub mod craft;
pub mod feedback;
pub mod flight;
pub mod level;
pub mod outcome;
pub mod physics;
pub mod router;
pub mod scene;
pub mod state;
pub mod tick;

pub use craft::Craft;
pub use feedback::{EffectKind, FeedbackSink, GameEvent, SoundEffect};
pub use flight::{FlightController, FlightOutput, InputBindings, InputSnapshot};
pub use level::{Collider, Level, Rect};
pub use outcome::{Category, OutcomeDescriptor, OutcomeTable, SceneChange};
pub use physics::Physics;
pub use router::{
    CollisionRouter, ContactEvent, ContactResponse, RouterState, Transition, TransitionStep,
};
pub use scene::{
    LevelLoader, LoadMode, LoadStatus, LoadTicket, SceneLoader, next_scene_index,
    reload_scene_index,
};
pub use state::GameState;
pub use tick::{DebugCommand, TickInput, tick};
