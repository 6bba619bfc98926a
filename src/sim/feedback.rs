//! Fire-and-forget feedback triggers
//!
//! The simulation never plays audio or spawns visuals itself. It pushes
//! triggers into a [`FeedbackSink`]; the host drains them into its audio and
//! effect layers.

use serde::{Deserialize, Serialize};

use super::outcome::Category;

/// One-shot sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Hazard contact
    Crash,
    /// Landed on the finish pad
    Success,
    /// Touched something friendly
    Bump,
    /// Fuel cell collected
    Pickup,
}

/// Visual effects (particle systems on the craft)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Main engine exhaust (looping, hosts pair it with the engine hum)
    MainExhaust,
    /// Left side thruster (looping)
    LeftThruster,
    /// Right side thruster (looping)
    RightThruster,
    /// Crash explosion
    Explosion,
    /// Landing celebration
    Celebration,
    /// Pickup sparkle
    Sparkle,
}

impl EffectKind {
    /// Looping effects run until stopped; others play out on their own
    pub fn is_looping(&self) -> bool {
        matches!(
            self,
            EffectKind::MainExhaust | EffectKind::LeftThruster | EffectKind::RightThruster
        )
    }
}

/// Events emitted by the simulation for the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundEffect),
    EffectStarted(EffectKind),
    EffectStopped(EffectKind),
    /// Stop every looping sound and effect
    FeedbackSilenced,
    /// A finish/hazard contact started a scene transition
    TransitionStarted { category: Category },
    /// Scene load finished and control is back
    SceneLoaded { index: usize },
    /// A pickup was collected and removed from the level
    PickupCollected { id: u32 },
    /// Finish pad reached after `ticks` fixed ticks in the level.
    /// `forced` marks landings triggered by a debug shortcut.
    Landed {
        scene: usize,
        ticks: u64,
        forced: bool,
    },
}

/// Receiver for feedback triggers
pub trait FeedbackSink {
    fn play_one_shot(&mut self, sound: SoundEffect);
    fn start_effect(&mut self, effect: EffectKind);
    fn stop_effect(&mut self, effect: EffectKind);
    fn stop_all(&mut self);
}

impl FeedbackSink for Vec<GameEvent> {
    fn play_one_shot(&mut self, sound: SoundEffect) {
        self.push(GameEvent::Sound(sound));
    }

    fn start_effect(&mut self, effect: EffectKind) {
        self.push(GameEvent::EffectStarted(effect));
    }

    fn stop_effect(&mut self, effect: EffectKind) {
        self.push(GameEvent::EffectStopped(effect));
    }

    fn stop_all(&mut self) {
        self.push(GameEvent::FeedbackSilenced);
    }
}
