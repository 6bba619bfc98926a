//! Data-driven game balance
//!
//! Every field has a default, so tuning files only need the values they
//! change.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{Category, LoadMode, OutcomeTable, SceneChange};

/// Gameplay balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Main engine thrust (impulse per second of burn)
    pub thrust_strength: f32,
    /// Manual rotation rate (radians per second)
    pub rotation_speed: f32,
    /// Downward gravity (units/s²)
    pub gravity: f32,
    /// Levels in a run
    pub scene_count: usize,
    /// How scene transitions load the next level
    pub load_mode: LoadMode,
    /// Simulated loader latency in ticks (0 = synchronous)
    pub load_latency_ticks: u32,
    /// Contact outcomes per category
    pub outcomes: OutcomeTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            thrust_strength: THRUST_STRENGTH,
            rotation_speed: ROTATION_SPEED,
            gravity: GRAVITY,
            scene_count: SCENE_COUNT,
            load_mode: LoadMode::Replace,
            load_latency_ticks: 0,
            outcomes: OutcomeTable::default(),
        }
    }
}

impl Tuning {
    /// Parse tuning JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Replace values that would break the simulation
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.thrust_strength.is_finite() || self.thrust_strength < 0.0 {
            log::warn!("Invalid thrust_strength {}, using default", self.thrust_strength);
            self.thrust_strength = defaults.thrust_strength;
        }
        if !self.rotation_speed.is_finite() || self.rotation_speed < 0.0 {
            log::warn!("Invalid rotation_speed {}, using default", self.rotation_speed);
            self.rotation_speed = defaults.rotation_speed;
        }
        if !self.gravity.is_finite() {
            log::warn!("Invalid gravity {}, using default", self.gravity);
            self.gravity = defaults.gravity;
        }
        if self.scene_count == 0 {
            log::warn!("scene_count must be at least 1");
            self.scene_count = 1;
        }

        // Scene flow per category is fixed; only feedback and timing are tunable
        for category in [
            Category::Friendly,
            Category::Finish,
            Category::Pickup,
            Category::Hazard,
        ] {
            let required = required_scene_change(category);
            let outcome = self.outcomes.get_mut(category);
            if outcome.scene_change != required {
                log::warn!(
                    "{:?} outcome cannot use scene_change {:?}, using {:?}",
                    category,
                    outcome.scene_change,
                    required
                );
                outcome.scene_change = required;
            }
        }
        self
    }
}

fn required_scene_change(category: Category) -> SceneChange {
    match category {
        Category::Finish => SceneChange::Advance,
        Category::Hazard => SceneChange::Reload,
        Category::Friendly | Category::Pickup => SceneChange::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "thrust_strength": 150.0, "load_latency_ticks": 5 }"#)
            .expect("valid tuning");
        assert_eq!(tuning.thrust_strength, 150.0);
        assert_eq!(tuning.load_latency_ticks, 5);
        assert_eq!(tuning.rotation_speed, ROTATION_SPEED);
        assert_eq!(tuning.outcomes, OutcomeTable::default());
    }

    #[test]
    fn test_outcome_override() {
        let json = r#"{
            "load_mode": "Additive",
            "outcomes": {
                "hazard": { "sound": null, "effect": "Explosion", "effect_duration": 2.0, "delay": null, "scene_change": "Reload" }
            }
        }"#;
        let tuning = Tuning::from_json(json).expect("valid tuning");
        assert_eq!(tuning.load_mode, LoadMode::Additive);
        assert_eq!(tuning.outcomes.hazard.sound, None);
        assert_eq!(tuning.outcomes.hazard.resolved_delay(), 2.0);
        // Untouched categories keep defaults
        assert_eq!(tuning.outcomes.finish.scene_change, SceneChange::Advance);
    }

    #[test]
    fn test_invalid_values_are_replaced() {
        let tuning = Tuning::from_json(r#"{ "thrust_strength": -1.0, "scene_count": 0 }"#)
            .expect("valid json");
        assert_eq!(tuning.thrust_strength, THRUST_STRENGTH);
        assert_eq!(tuning.scene_count, 1);
    }

    #[test]
    fn test_scene_flow_cannot_be_retuned() {
        let json = r#"{
            "outcomes": {
                "finish": { "sound": "Success", "effect": null, "effect_duration": null, "delay": 0.5, "scene_change": "None" },
                "hazard": { "sound": "Crash", "effect": null, "effect_duration": null, "delay": 0.5, "scene_change": "Advance" },
                "friendly": { "sound": "Bump", "effect": null, "effect_duration": null, "delay": null, "scene_change": "Reload" }
            }
        }"#;
        let tuning = Tuning::from_json(json).expect("valid json");
        assert_eq!(tuning.outcomes.finish.scene_change, SceneChange::Advance);
        assert_eq!(tuning.outcomes.hazard.scene_change, SceneChange::Reload);
        assert_eq!(tuning.outcomes.friendly.scene_change, SceneChange::None);
        assert_eq!(tuning.outcomes.pickup.scene_change, SceneChange::None);
        // Feedback and timing overrides survive
        assert_eq!(tuning.outcomes.finish.effect, None);
        assert_eq!(tuning.outcomes.hazard.resolved_delay(), 0.5);
        assert!(tuning.outcomes.get(Category::Finish).suspends_control());
        assert!(!tuning.outcomes.get(Category::Friendly).suspends_control());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::default();
        let json = tuning.to_json().expect("serializable");
        assert_eq!(Tuning::from_json(&json).expect("parses"), tuning);
    }
}
