//! Contact categories and their outcomes
//!
//! Colliders carry a free-form tag; it is resolved into a [`Category`] once,
//! when the contact is produced. Everything downstream matches on the enum.

use serde::{Deserialize, Serialize};

use super::feedback::{EffectKind, SoundEffect};
use crate::consts::TRANSITION_DELAY;

/// Classification of a collidable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Safe to touch (launch pad, friendly platforms)
    Friendly,
    /// Landing pad that completes the level
    Finish,
    /// Collectible, consumed on contact
    Pickup,
    /// Anything unclassified
    Hazard,
}

impl Category {
    /// Resolve a collider tag. Unknown tags are hazards.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Friendly" => Category::Friendly,
            "Finish" => Category::Finish,
            "Fuel" | "Pickup" => Category::Pickup,
            _ => Category::Hazard,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Category::Friendly => "Friendly",
            Category::Finish => "Finish",
            Category::Pickup => "Fuel",
            Category::Hazard => "Untagged",
        }
    }
}

/// What happens to the scene after the outcome's delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneChange {
    /// Stay in the current scene
    None,
    /// Load the current scene again
    Reload,
    /// Load the next scene in sequence
    Advance,
}

/// Static description of a contact outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDescriptor {
    /// One-shot sound (skipped when unset)
    pub sound: Option<SoundEffect>,
    /// Effect to start (skipped when unset)
    pub effect: Option<EffectKind>,
    /// Intrinsic effect duration in seconds
    pub effect_duration: Option<f32>,
    /// Explicit delay before the scene change, overrides `effect_duration`
    pub delay: Option<f32>,
    pub scene_change: SceneChange,
}

impl OutcomeDescriptor {
    /// Feedback-only outcome
    pub fn feedback(sound: Option<SoundEffect>, effect: Option<EffectKind>) -> Self {
        Self {
            sound,
            effect,
            effect_duration: None,
            delay: None,
            scene_change: SceneChange::None,
        }
    }

    /// Outcomes that change the scene suspend control until the load completes
    pub fn suspends_control(&self) -> bool {
        self.scene_change != SceneChange::None
    }

    /// Seconds to wait after feedback starts
    pub fn resolved_delay(&self) -> f32 {
        self.delay
            .or(self.effect_duration)
            .unwrap_or(0.0)
            .max(0.0)
    }
}

/// Outcome per category. Read-only once the game is running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeTable {
    pub friendly: OutcomeDescriptor,
    pub finish: OutcomeDescriptor,
    pub pickup: OutcomeDescriptor,
    pub hazard: OutcomeDescriptor,
}

impl Default for OutcomeTable {
    fn default() -> Self {
        Self {
            friendly: OutcomeDescriptor::feedback(Some(SoundEffect::Bump), None),
            finish: OutcomeDescriptor {
                sound: Some(SoundEffect::Success),
                effect: Some(EffectKind::Celebration),
                effect_duration: Some(1.5),
                delay: Some(TRANSITION_DELAY),
                scene_change: SceneChange::Advance,
            },
            pickup: OutcomeDescriptor::feedback(Some(SoundEffect::Pickup), Some(EffectKind::Sparkle)),
            hazard: OutcomeDescriptor {
                sound: Some(SoundEffect::Crash),
                effect: Some(EffectKind::Explosion),
                effect_duration: Some(1.2),
                delay: Some(TRANSITION_DELAY),
                scene_change: SceneChange::Reload,
            },
        }
    }
}

impl OutcomeTable {
    pub fn get(&self, category: Category) -> &OutcomeDescriptor {
        match category {
            Category::Friendly => &self.friendly,
            Category::Finish => &self.finish,
            Category::Pickup => &self.pickup,
            Category::Hazard => &self.hazard,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut OutcomeDescriptor {
        match category {
            Category::Friendly => &mut self.friendly,
            Category::Finish => &mut self.finish,
            Category::Pickup => &mut self.pickup,
            Category::Hazard => &mut self.hazard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_resolution() {
        assert_eq!(Category::from_tag("Friendly"), Category::Friendly);
        assert_eq!(Category::from_tag("Finish"), Category::Finish);
        assert_eq!(Category::from_tag("Fuel"), Category::Pickup);
        assert_eq!(Category::from_tag("Pickup"), Category::Pickup);
        assert_eq!(Category::from_tag("Untagged"), Category::Hazard);
        assert_eq!(Category::from_tag(""), Category::Hazard);
        // Tags are case sensitive
        assert_eq!(Category::from_tag("finish"), Category::Hazard);
    }

    #[test]
    fn test_tag_round_trip() {
        for category in [
            Category::Friendly,
            Category::Finish,
            Category::Pickup,
            Category::Hazard,
        ] {
            assert_eq!(Category::from_tag(category.as_tag()), category);
        }
    }

    #[test]
    fn test_delay_resolution() {
        let mut outcome = OutcomeDescriptor::feedback(None, None);
        assert_eq!(outcome.resolved_delay(), 0.0);

        outcome.effect_duration = Some(1.5);
        assert_eq!(outcome.resolved_delay(), 1.5);

        // Explicit delay wins over the effect duration
        outcome.delay = Some(0.25);
        assert_eq!(outcome.resolved_delay(), 0.25);

        outcome.delay = Some(-3.0);
        assert_eq!(outcome.resolved_delay(), 0.0);
    }

    #[test]
    fn test_default_table() {
        let table = OutcomeTable::default();
        assert!(!table.get(Category::Friendly).suspends_control());
        assert!(!table.get(Category::Pickup).suspends_control());
        assert!(table.get(Category::Finish).suspends_control());
        assert!(table.get(Category::Hazard).suspends_control());
        assert_eq!(table.get(Category::Hazard).scene_change, SceneChange::Reload);
        assert_eq!(table.get(Category::Finish).scene_change, SceneChange::Advance);
    }
}
