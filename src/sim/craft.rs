//! The player's craft
//!
//! A single rigid body with one rotation axis. Impulses written by the flight
//! controller are accumulated and consumed by the physics step.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{local_up, normalize_angle};

/// The lander craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craft {
    pub pos: Vec2,
    /// Orientation in radians (0 = nose up, positive = counterclockwise)
    pub angle: f32,
    pub vel: Vec2,
    /// Angular velocity from physics response (radians/sec)
    pub angular_vel: f32,
    pub mass: f32,
    pub radius: f32,
    /// Player input is honored only while this is set
    pub control_enabled: bool,
    /// Physics motion frozen (used during scene transitions)
    pub kinematic: bool,
    /// Physics-driven angular response suspended for the current tick
    #[serde(default)]
    pub rotation_locked: bool,
    /// Impulse accumulated this tick, cleared by the physics step
    #[serde(skip)]
    pub pending_impulse: Vec2,
}

impl Craft {
    /// Create a craft resting at `pos`, nose up
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            angle: 0.0,
            vel: Vec2::ZERO,
            angular_vel: 0.0,
            mass: CRAFT_MASS,
            radius: CRAFT_RADIUS,
            control_enabled: true,
            kinematic: false,
            rotation_locked: false,
            pending_impulse: Vec2::ZERO,
        }
    }

    /// Unit vector along the craft's local up axis
    pub fn up(&self) -> Vec2 {
        local_up(self.angle)
    }

    /// Add an impulse in world space (applied by the next physics step)
    pub fn add_impulse(&mut self, impulse: Vec2) {
        self.pending_impulse += impulse;
    }

    /// Rotate about the forward axis by `delta` radians
    pub fn rotate(&mut self, delta: f32) {
        self.angle = normalize_angle(self.angle + delta);
    }

    /// Stop all motion and ignore physics until released
    pub fn freeze(&mut self) {
        self.kinematic = true;
        self.vel = Vec2::ZERO;
        self.angular_vel = 0.0;
        self.pending_impulse = Vec2::ZERO;
    }

    pub fn release(&mut self) {
        self.kinematic = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_axis() {
        let mut craft = Craft::new(Vec2::ZERO);
        assert!((craft.up() - Vec2::Y).length() < 1e-6);

        // Quarter turn counterclockwise points the nose left
        craft.rotate(std::f32::consts::FRAC_PI_2);
        assert!((craft.up() - Vec2::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_freeze_clears_motion() {
        let mut craft = Craft::new(Vec2::ZERO);
        craft.vel = Vec2::new(3.0, -4.0);
        craft.angular_vel = 1.0;
        craft.add_impulse(Vec2::ONE);
        craft.freeze();
        assert!(craft.kinematic);
        assert_eq!(craft.vel, Vec2::ZERO);
        assert_eq!(craft.angular_vel, 0.0);
        assert_eq!(craft.pending_impulse, Vec2::ZERO);

        craft.release();
        assert!(!craft.kinematic);
    }
}
