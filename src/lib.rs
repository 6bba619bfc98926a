//! Rocket Lander - A browser arcade lander game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (flight control, contacts, scene flow)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `records`: Best landing times per level
//! - `audio`: Web Audio feedback (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod records;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use records::LandingRecords;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz physics)
    pub const SIM_DT: f32 = 0.02;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Thrust along local up, applied as `THRUST_STRENGTH * dt` per tick
    pub const THRUST_STRENGTH: f32 = 100.0;
    /// Manual rotation rate (radians per second, ~100 degrees)
    pub const ROTATION_SPEED: f32 = 1.745;
    /// Downward gravity (units/s²)
    pub const GRAVITY: f32 = 9.81;

    /// Craft defaults
    pub const CRAFT_MASS: f32 = 5.0;
    pub const CRAFT_RADIUS: f32 = 0.5;
    /// Angular damping applied by the physics step (per second)
    pub const ANGULAR_DAMPING: f32 = 0.5;

    /// Seconds between a finish/hazard contact and the scene load request
    pub const TRANSITION_DELAY: f32 = 1.0;
    /// Number of levels in a run
    pub const SCENE_COUNT: usize = 5;

    /// Arena dimensions (world units)
    pub const ARENA_WIDTH: f32 = 40.0;
    pub const ARENA_HEIGHT: f32 = 24.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Local "up" axis for an orientation (0 = pointing up, positive = counterclockwise)
#[inline]
pub fn local_up(angle: f32) -> Vec2 {
    Vec2::new(-angle.sin(), angle.cos())
}
