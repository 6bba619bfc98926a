//! Flight controller
//!
//! Turns the player's two input channels into thrust and rotation on the
//! craft, once per fixed tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::craft::Craft;
use super::feedback::{EffectKind, FeedbackSink};
use crate::consts::*;

/// Input channel values for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Main engine on/off
    pub thrust: bool,
    /// Rotation axis in [-1, 1] (positive turns the nose clockwise)
    pub rotation: f32,
}

impl InputSnapshot {
    /// Direction of the rotation axis: -1, 0 or 1. Magnitude is ignored, NaN counts as idle.
    pub fn rotation_sign(&self) -> f32 {
        if self.rotation.is_nan() || self.rotation == 0.0 {
            0.0
        } else {
            self.rotation.signum()
        }
    }
}

/// Which input channels the host has bound to a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBindings {
    pub thrust: bool,
    pub rotation: bool,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            thrust: true,
            rotation: true,
        }
    }
}

/// What the controller did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightOutput {
    /// World-space impulse handed to the craft
    pub thrust_impulse: Vec2,
    /// Orientation change in radians
    pub rotation_delta: f32,
}

/// Reads input channels and drives the craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightController {
    pub thrust_strength: f32,
    pub rotation_speed: f32,
    enabled: bool,
    /// Main engine currently firing (for feedback edges)
    thrusting: bool,
    /// Current manual rotation direction (for feedback edges)
    turning: i8,
}

impl Default for FlightController {
    fn default() -> Self {
        Self::new(THRUST_STRENGTH, ROTATION_SPEED)
    }
}

impl FlightController {
    pub fn new(thrust_strength: f32, rotation_speed: f32) -> Self {
        Self {
            thrust_strength,
            rotation_speed,
            enabled: false,
            thrusting: false,
            turning: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start reading input. Disables the controller when a channel is unbound.
    pub fn initialize(&mut self, bindings: InputBindings) -> bool {
        if !bindings.thrust || !bindings.rotation {
            log::warn!(
                "Flight controller disabled: unbound input channel (thrust: {}, rotation: {})",
                bindings.thrust,
                bindings.rotation
            );
            self.enabled = false;
            return false;
        }
        self.enabled = true;
        true
    }

    /// Stop reading input and silence engine feedback
    pub fn shutdown(&mut self, feedback: &mut impl FeedbackSink) {
        self.set_thrusting(false, feedback);
        self.set_turning(0, feedback);
        self.enabled = false;
    }

    /// Drop feedback edge state without emitting stops (after a global silence)
    pub fn reset_feedback(&mut self) {
        self.thrusting = false;
        self.turning = 0;
    }

    /// Apply one fixed tick of input to the craft
    pub fn apply(
        &mut self,
        craft: &mut Craft,
        input: &InputSnapshot,
        dt: f32,
        feedback: &mut impl FeedbackSink,
    ) -> FlightOutput {
        let mut output = FlightOutput::default();
        craft.rotation_locked = false;

        if !self.enabled || !craft.control_enabled {
            self.set_thrusting(false, feedback);
            self.set_turning(0, feedback);
            return output;
        }

        // Thrust along local up
        if input.thrust {
            let impulse = craft.up() * self.thrust_strength * dt;
            craft.add_impulse(impulse);
            output.thrust_impulse = impulse;
        }
        self.set_thrusting(input.thrust, feedback);

        // Manual rotation at a fixed rate
        let sign = input.rotation_sign();
        if sign != 0.0 {
            // Physics must not fight manual rotation this tick
            craft.rotation_locked = true;
            let delta = -sign * self.rotation_speed * dt;
            craft.rotate(delta);
            output.rotation_delta = delta;
        }
        self.set_turning(sign as i8, feedback);

        output
    }

    fn set_thrusting(&mut self, thrusting: bool, feedback: &mut impl FeedbackSink) {
        if thrusting == self.thrusting {
            return;
        }
        if thrusting {
            feedback.start_effect(EffectKind::MainExhaust);
        } else {
            feedback.stop_effect(EffectKind::MainExhaust);
        }
        self.thrusting = thrusting;
    }

    fn set_turning(&mut self, turning: i8, feedback: &mut impl FeedbackSink) {
        if turning == self.turning {
            return;
        }
        if let Some(effect) = Self::thruster_for(self.turning) {
            feedback.stop_effect(effect);
        }
        if let Some(effect) = Self::thruster_for(turning) {
            feedback.start_effect(effect);
        }
        self.turning = turning;
    }

    /// Turning clockwise fires the left thruster and vice versa
    fn thruster_for(turning: i8) -> Option<EffectKind> {
        match turning {
            1 => Some(EffectKind::LeftThruster),
            -1 => Some(EffectKind::RightThruster),
            _ => None,
        }
    }
}
