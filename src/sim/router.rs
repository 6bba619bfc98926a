//! Collision outcome router
//!
//! Classifies contacts, fires feedback and sequences scene transitions.
//!
//! A transition is a small state machine advanced once per fixed tick by
//! [`CollisionRouter::update`]. Its suspension points are, in order:
//! feedback started, delay elapsed, current scene unloaded (additive mode
//! only), target scene loaded. Control stays suspended until the last one.

use serde::{Deserialize, Serialize};

use super::craft::Craft;
use super::feedback::FeedbackSink;
use super::outcome::{Category, OutcomeDescriptor, OutcomeTable, SceneChange};
use super::scene::{
    LoadMode, LoadStatus, LoadTicket, SceneLoader, next_scene_index, reload_scene_index,
};

/// Ticks a load may stay pending before a warning is logged (10 seconds at 50 Hz)
pub const SLOW_LOAD_WARN_TICKS: u32 = 500;

/// A contact reported by the physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEvent {
    /// Collider id of the other entity
    pub other: u32,
    pub category: Category,
}

/// How the router handled a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactResponse {
    /// Router not initialized or already transitioning
    Ignored,
    /// Feedback only, still flying
    Feedback,
    /// A scene transition started
    Transition,
}

/// Where a transition currently waits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransitionStep {
    /// Feedback is playing; seconds left before the scene change
    Delay { remaining: f32 },
    /// Waiting for the current scene to unload
    Unloading { ticket: LoadTicket, target: usize },
    /// Waiting for the target scene to load
    Loading { ticket: LoadTicket, target: usize },
}

/// An in-flight transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub category: Category,
    pub scene_change: SceneChange,
    pub step: TransitionStep,
    /// Ticks spent waiting on the loader
    waited_ticks: u32,
}

/// Router state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RouterState {
    Flying,
    Transitioning(Transition),
}

/// Routes contacts to outcomes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionRouter {
    outcomes: OutcomeTable,
    load_mode: LoadMode,
    state: RouterState,
    registered: bool,
}

impl CollisionRouter {
    pub fn new(outcomes: OutcomeTable, load_mode: LoadMode) -> Self {
        Self {
            outcomes,
            load_mode,
            state: RouterState::Flying,
            registered: false,
        }
    }

    /// Start receiving contacts
    pub fn initialize(&mut self) {
        self.registered = true;
    }

    /// Stop receiving contacts. An in-flight transition keeps running.
    pub fn shutdown(&mut self) {
        self.registered = false;
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn state(&self) -> &RouterState {
        &self.state
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, RouterState::Transitioning(_))
    }

    pub fn outcomes(&self) -> &OutcomeTable {
        &self.outcomes
    }

    /// Handle a contact event
    pub fn on_contact(
        &mut self,
        contact: ContactEvent,
        craft: &mut Craft,
        feedback: &mut impl FeedbackSink,
    ) -> ContactResponse {
        if !self.registered || self.is_transitioning() {
            log::debug!("Ignoring contact with {} ({:?})", contact.other, contact.category);
            return ContactResponse::Ignored;
        }

        let outcome = self.outcomes.get(contact.category).clone();
        if outcome.suspends_control() {
            self.begin_transition(contact.category, &outcome, craft, feedback);
            ContactResponse::Transition
        } else {
            play_feedback(&outcome, feedback);
            ContactResponse::Feedback
        }
    }

    /// Debug shortcut: start a transition regardless of state.
    ///
    /// Unlike contacts, this does not check for an in-flight transition; the
    /// previous sequence is dropped and any load it is waiting on is cancelled.
    pub fn force_transition(
        &mut self,
        category: Category,
        craft: &mut Craft,
        loader: &mut impl SceneLoader,
        feedback: &mut impl FeedbackSink,
    ) {
        if let RouterState::Transitioning(previous) = &self.state {
            log::warn!(
                "Debug transition ({:?}) replaces in-flight {:?} transition at {:?}",
                category,
                previous.category,
                previous.step
            );
            if let Some(ticket) = previous.step.ticket() {
                loader.cancel(ticket);
            }
        }
        let mut outcome = self.outcomes.get(category).clone();
        if !outcome.suspends_control() {
            outcome.scene_change = match category {
                Category::Finish => SceneChange::Advance,
                _ => SceneChange::Reload,
            };
        }
        self.begin_transition(category, &outcome, craft, feedback);
    }

    fn begin_transition(
        &mut self,
        category: Category,
        outcome: &OutcomeDescriptor,
        craft: &mut Craft,
        feedback: &mut impl FeedbackSink,
    ) {
        craft.control_enabled = false;
        craft.freeze();
        feedback.stop_all();
        play_feedback(outcome, feedback);

        let delay = outcome.resolved_delay();
        log::info!("{:?} contact, changing scene in {:.2}s", category, delay);
        self.state = RouterState::Transitioning(Transition {
            category,
            scene_change: outcome.scene_change,
            step: TransitionStep::Delay { remaining: delay },
            waited_ticks: 0,
        });
    }

    /// Advance an in-flight transition by one tick.
    ///
    /// Returns the scene index once a load has completed and control is back.
    /// The caller rebuilds the level for that scene.
    pub fn update(
        &mut self,
        dt: f32,
        craft: &mut Craft,
        loader: &mut impl SceneLoader,
    ) -> Option<usize> {
        let RouterState::Transitioning(mut transition) = self.state else {
            return None;
        };

        loop {
            match transition.step {
                TransitionStep::Delay { remaining } => {
                    let remaining = remaining - dt;
                    // Half a tick of slack absorbs float drift
                    if remaining > dt * 0.5 {
                        transition.step = TransitionStep::Delay { remaining };
                        break;
                    }
                    let current = loader.active_scene();
                    let count = loader.scene_count();
                    let target = match transition.scene_change {
                        SceneChange::Reload => reload_scene_index(current, count),
                        SceneChange::Advance => {
                            next_scene_index(current, count, loader.loaded_scenes())
                        }
                        SceneChange::None => {
                            self.finish(craft);
                            return None;
                        }
                    };
                    transition.step = match self.load_mode {
                        LoadMode::Replace => TransitionStep::Loading {
                            ticket: loader.begin_load(target, LoadMode::Replace),
                            target,
                        },
                        LoadMode::Additive => TransitionStep::Unloading {
                            ticket: loader.begin_unload(current),
                            target,
                        },
                    };
                    log::debug!("Delay elapsed, requesting scene {}", target);
                }
                TransitionStep::Unloading { ticket, target } => match loader.poll(ticket) {
                    LoadStatus::Pending => {
                        transition.note_wait();
                        break;
                    }
                    LoadStatus::Complete => {
                        transition.step = TransitionStep::Loading {
                            ticket: loader.begin_load(target, LoadMode::Additive),
                            target,
                        };
                    }
                    LoadStatus::Failed => return Some(self.recover(craft, loader)),
                },
                TransitionStep::Loading { ticket, target } => match loader.poll(ticket) {
                    LoadStatus::Pending => {
                        transition.note_wait();
                        break;
                    }
                    LoadStatus::Complete => {
                        self.finish(craft);
                        return Some(target);
                    }
                    LoadStatus::Failed => return Some(self.recover(craft, loader)),
                },
            }
        }

        self.state = RouterState::Transitioning(transition);
        None
    }

    /// Back to flying with control restored
    fn finish(&mut self, craft: &mut Craft) {
        craft.release();
        craft.control_enabled = true;
        self.state = RouterState::Flying;
    }

    /// Loader lost our ticket: restart on whatever scene is active
    fn recover(&mut self, craft: &mut Craft, loader: &impl SceneLoader) -> usize {
        let index = loader.active_scene();
        log::error!("Scene load ticket rejected, restarting scene {}", index);
        self.finish(craft);
        index
    }
}

impl TransitionStep {
    /// Loader request this step is waiting on
    pub fn ticket(&self) -> Option<LoadTicket> {
        match *self {
            TransitionStep::Delay { .. } => None,
            TransitionStep::Unloading { ticket, .. } | TransitionStep::Loading { ticket, .. } => {
                Some(ticket)
            }
        }
    }
}

impl Transition {
    fn note_wait(&mut self) {
        self.waited_ticks += 1;
        if self.waited_ticks == SLOW_LOAD_WARN_TICKS {
            log::warn!("Scene load pending for {} ticks at {:?}", self.waited_ticks, self.step);
        }
    }
}

/// Fire an outcome's one-shot sound and effect, skipping unset assets
fn play_feedback(outcome: &OutcomeDescriptor, feedback: &mut impl FeedbackSink) {
    if let Some(sound) = outcome.sound {
        feedback.play_one_shot(sound);
    }
    if let Some(effect) = outcome.effect {
        feedback.start_effect(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::feedback::{EffectKind, GameEvent, SoundEffect};
    use crate::sim::scene::LevelLoader;
    use glam::Vec2;

    fn setup(scene: usize, latency: u32) -> (CollisionRouter, Craft, LevelLoader) {
        let mut router = CollisionRouter::new(OutcomeTable::default(), LoadMode::Replace);
        router.initialize();
        let craft = Craft::new(Vec2::ZERO);
        let loader = LevelLoader::new(5, latency).with_active(scene);
        (router, craft, loader)
    }

    fn contact(category: Category) -> ContactEvent {
        ContactEvent { other: 7, category }
    }

    /// Tick until the router reports a scene or `limit` ticks pass
    fn run_until_loaded(
        router: &mut CollisionRouter,
        craft: &mut Craft,
        loader: &mut LevelLoader,
        limit: usize,
    ) -> Option<(usize, usize)> {
        for i in 0..limit {
            loader.tick();
            if let Some(index) = router.update(SIM_DT, craft, loader) {
                return Some((index, i + 1));
            }
            assert!(!craft.control_enabled);
        }
        None
    }

    #[test]
    fn test_hazard_reloads_same_scene() {
        let (mut router, mut craft, mut loader) = setup(2, 0);
        let mut events = Vec::new();
        craft.vel = Vec2::new(1.0, -5.0);

        let response = router.on_contact(contact(Category::Hazard), &mut craft, &mut events);
        assert_eq!(response, ContactResponse::Transition);
        assert!(router.is_transitioning());
        assert!(!craft.control_enabled);
        assert!(craft.kinematic);
        assert_eq!(craft.vel, Vec2::ZERO);
        assert_eq!(
            events,
            vec![
                GameEvent::FeedbackSilenced,
                GameEvent::Sound(SoundEffect::Crash),
                GameEvent::EffectStarted(EffectKind::Explosion),
            ]
        );

        let (index, ticks) = run_until_loaded(&mut router, &mut craft, &mut loader, 200)
            .expect("scene should reload");
        assert_eq!(index, 2);
        // 1 second delay at 50 Hz, synchronous load completes on the same tick
        assert_eq!(ticks, 50);
        assert!(craft.control_enabled);
        assert!(!craft.kinematic);
        assert_eq!(router.state(), &RouterState::Flying);
        assert_eq!(loader.active_scene(), 2);
    }

    #[test]
    fn test_async_load_holds_control_until_complete() {
        let (mut router, mut craft, mut loader) = setup(2, 10);
        let mut events = Vec::new();
        router.on_contact(contact(Category::Hazard), &mut craft, &mut events);

        let (index, ticks) = run_until_loaded(&mut router, &mut craft, &mut loader, 200)
            .expect("scene should reload");
        assert_eq!(index, 2);
        assert!(ticks > 50);
        assert!(craft.control_enabled);
    }

    #[test]
    fn test_finish_advances() {
        let (mut router, mut craft, mut loader) = setup(1, 0);
        let mut events = Vec::new();
        router.on_contact(contact(Category::Finish), &mut craft, &mut events);
        assert!(events.contains(&GameEvent::Sound(SoundEffect::Success)));

        let (index, _) = run_until_loaded(&mut router, &mut craft, &mut loader, 200)
            .expect("scene should advance");
        assert_eq!(index, 2);
    }

    #[test]
    fn test_finish_on_last_scene_loops() {
        let (mut router, mut craft, mut loader) = setup(4, 0);
        let mut events = Vec::new();
        router.on_contact(contact(Category::Finish), &mut craft, &mut events);
        let (index, _) = run_until_loaded(&mut router, &mut craft, &mut loader, 200)
            .expect("scene should advance");
        assert_eq!(index, 0);
    }

    #[test]
    fn test_friendly_and_pickup_are_feedback_only() {
        let (mut router, mut craft, _) = setup(0, 0);
        let mut events = Vec::new();
        for _ in 0..3 {
            for category in [Category::Friendly, Category::Pickup] {
                let response = router.on_contact(contact(category), &mut craft, &mut events);
                assert_eq!(response, ContactResponse::Feedback);
                assert_eq!(router.state(), &RouterState::Flying);
                assert!(craft.control_enabled);
                assert!(!craft.kinematic);
            }
        }
        assert_eq!(events.iter().filter(|e| **e == GameEvent::Sound(SoundEffect::Bump)).count(), 3);
    }

    #[test]
    fn test_contacts_ignored_while_transitioning() {
        let (mut router, mut craft, _) = setup(0, 0);
        let mut events = Vec::new();
        router.on_contact(contact(Category::Hazard), &mut craft, &mut events);
        let before = *router.state();
        events.clear();

        for category in [Category::Finish, Category::Hazard, Category::Pickup] {
            let response = router.on_contact(contact(category), &mut craft, &mut events);
            assert_eq!(response, ContactResponse::Ignored);
        }
        assert_eq!(router.state(), &before);
        assert!(events.is_empty());
    }

    #[test]
    fn test_unregistered_router_ignores_contacts() {
        let mut router = CollisionRouter::new(OutcomeTable::default(), LoadMode::Replace);
        let mut craft = Craft::new(Vec2::ZERO);
        let mut events = Vec::new();
        let response = router.on_contact(contact(Category::Hazard), &mut craft, &mut events);
        assert_eq!(response, ContactResponse::Ignored);
        assert!(craft.control_enabled);

        router.initialize();
        router.shutdown();
        let response = router.on_contact(contact(Category::Hazard), &mut craft, &mut events);
        assert_eq!(response, ContactResponse::Ignored);
    }

    #[test]
    fn test_missing_assets_are_skipped() {
        let mut outcomes = OutcomeTable::default();
        outcomes.hazard.sound = None;
        outcomes.hazard.effect = None;
        outcomes.hazard.delay = None;
        outcomes.hazard.effect_duration = None;
        let mut router = CollisionRouter::new(outcomes, LoadMode::Replace);
        router.initialize();
        let mut craft = Craft::new(Vec2::ZERO);
        let mut loader = LevelLoader::new(5, 0).with_active(3);
        let mut events = Vec::new();

        router.on_contact(contact(Category::Hazard), &mut craft, &mut events);
        assert_eq!(events, vec![GameEvent::FeedbackSilenced]);

        // Zero delay: resolves on the first update
        assert_eq!(router.update(SIM_DT, &mut craft, &mut loader), Some(3));
    }

    #[test]
    fn test_effect_duration_used_without_delay() {
        let mut outcomes = OutcomeTable::default();
        outcomes.hazard.delay = None;
        outcomes.hazard.effect_duration = Some(0.5);
        let mut router = CollisionRouter::new(outcomes, LoadMode::Replace);
        router.initialize();
        let mut craft = Craft::new(Vec2::ZERO);
        let mut loader = LevelLoader::new(5, 0);
        let mut events = Vec::new();

        router.on_contact(contact(Category::Hazard), &mut craft, &mut events);
        let (_, ticks) = run_until_loaded(&mut router, &mut craft, &mut loader, 200)
            .expect("scene should reload");
        assert_eq!(ticks, 25);
    }

    #[test]
    fn test_additive_mode_unloads_then_loads() {
        let mut router = CollisionRouter::new(OutcomeTable::default(), LoadMode::Additive);
        router.initialize();
        let mut craft = Craft::new(Vec2::ZERO);
        let mut loader = LevelLoader::new(5, 3).with_active(1);
        let mut events = Vec::new();

        router.on_contact(contact(Category::Finish), &mut craft, &mut events);
        let mut saw_unloading = false;
        let mut loaded = None;
        for _ in 0..200 {
            loader.tick();
            if let Some(index) = router.update(SIM_DT, &mut craft, &mut loader) {
                loaded = Some(index);
                break;
            }
            if let RouterState::Transitioning(t) = router.state() {
                if matches!(t.step, TransitionStep::Unloading { .. }) {
                    saw_unloading = true;
                }
            }
        }
        assert!(saw_unloading);
        assert_eq!(loaded, Some(2));
        assert_eq!(loader.loaded_scenes(), &[2]);
    }

    /// Loader that forgets every ticket
    struct ForgetfulLoader;

    impl SceneLoader for ForgetfulLoader {
        fn scene_count(&self) -> usize {
            3
        }
        fn active_scene(&self) -> usize {
            1
        }
        fn loaded_scenes(&self) -> &[usize] {
            &[1]
        }
        fn begin_load(&mut self, _index: usize, _mode: LoadMode) -> LoadTicket {
            LoadTicket(0)
        }
        fn begin_unload(&mut self, _index: usize) -> LoadTicket {
            LoadTicket(0)
        }
        fn poll(&mut self, _ticket: LoadTicket) -> LoadStatus {
            LoadStatus::Failed
        }
        fn cancel(&mut self, _ticket: LoadTicket) {}
    }

    #[test]
    fn test_failed_load_recovers_on_active_scene() {
        let (mut router, mut craft, _) = setup(0, 0);
        let mut events = Vec::new();
        router.on_contact(contact(Category::Finish), &mut craft, &mut events);

        let mut loader = ForgetfulLoader;
        let mut result = None;
        for _ in 0..100 {
            if let Some(index) = router.update(SIM_DT, &mut craft, &mut loader) {
                result = Some(index);
                break;
            }
        }
        assert_eq!(result, Some(1));
        assert!(craft.control_enabled);
        assert!(!router.is_transitioning());
    }

    #[test]
    fn test_debug_transition_replaces_in_flight() {
        let (mut router, mut craft, mut loader) = setup(2, 0);
        let mut events = Vec::new();
        router.on_contact(contact(Category::Hazard), &mut craft, &mut events);
        for _ in 0..10 {
            router.update(SIM_DT, &mut craft, &mut loader);
        }

        router.force_transition(Category::Finish, &mut craft, &mut loader, &mut events);
        match router.state() {
            RouterState::Transitioning(t) => {
                assert_eq!(t.category, Category::Finish);
                assert!(matches!(t.step, TransitionStep::Delay { .. }));
            }
            RouterState::Flying => panic!("expected a transition"),
        }

        let (index, ticks) = run_until_loaded(&mut router, &mut craft, &mut loader, 200)
            .expect("scene should advance");
        assert_eq!(index, 3);
        assert_eq!(ticks, 50);
    }

    #[test]
    fn test_debug_transition_cancels_pending_load() {
        let (mut router, mut craft, mut loader) = setup(2, 1000);
        let mut events = Vec::new();

        for _ in 0..20 {
            router.force_transition(Category::Hazard, &mut craft, &mut loader, &mut events);
            // Run past the delay so the router is waiting on the slow load
            for _ in 0..60 {
                loader.tick();
                assert_eq!(router.update(SIM_DT, &mut craft, &mut loader), None);
            }
            match router.state() {
                RouterState::Transitioning(t) => {
                    assert!(matches!(t.step, TransitionStep::Loading { .. }))
                }
                RouterState::Flying => panic!("expected a pending load"),
            }
            assert_eq!(loader.pending_count(), 1);
        }

        router.force_transition(Category::Finish, &mut craft, &mut loader, &mut events);
        assert_eq!(loader.pending_count(), 0);
    }

    #[test]
    fn test_finish_on_last_scene_stays_with_persistent_scene_loaded() {
        let mut router = CollisionRouter::new(OutcomeTable::default(), LoadMode::Additive);
        router.initialize();
        let mut craft = Craft::new(Vec2::ZERO);
        // Scene 0 stays loaded underneath the gameplay scene
        let mut loader = LevelLoader::new(5, 0);
        let ticket = loader.begin_load(4, LoadMode::Additive);
        assert_eq!(loader.poll(ticket), LoadStatus::Complete);
        assert_eq!(loader.loaded_scenes(), &[0, 4]);
        let mut events = Vec::new();

        router.on_contact(contact(Category::Finish), &mut craft, &mut events);
        let (index, _) = run_until_loaded(&mut router, &mut craft, &mut loader, 200)
            .expect("scene should load");
        assert_eq!(index, 4);
        assert_eq!(loader.active_scene(), 4);
        assert_eq!(loader.loaded_scenes(), &[0, 4]);
    }

    #[test]
    fn test_update_while_flying_is_noop() {
        let (mut router, mut craft, mut loader) = setup(0, 0);
        assert_eq!(router.update(SIM_DT, &mut craft, &mut loader), None);
        assert!(craft.control_enabled);
    }
}
