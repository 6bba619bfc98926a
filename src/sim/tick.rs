//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically:
//! flight controller, physics step, contact routing, transition sequencing.

use serde::{Deserialize, Serialize};

use super::feedback::GameEvent;
use super::flight::InputSnapshot;
use super::outcome::Category;
use super::router::{ContactEvent, ContactResponse};
use super::state::GameState;

/// Debug shortcuts (honored in debug builds only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebugCommand {
    /// Act as if the craft touched the landing pad
    ForceFinish,
    /// Act as if the craft hit a hazard
    ForceCrash,
    /// Toggle collision detection
    ToggleCollisions,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub controls: InputSnapshot,
    pub debug: Option<DebugCommand>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;
    state.loader.tick();

    if let Some(command) = input.debug {
        if cfg!(debug_assertions) {
            run_debug_command(state, command);
        } else {
            log::debug!("Ignoring debug command {:?} in release build", command);
        }
    }

    state
        .controller
        .apply(&mut state.craft, &input.controls, dt, &mut state.events);

    let contacts = state.physics.step(&mut state.craft, &state.level, dt);
    for contact in contacts {
        route_contact(state, contact);
    }

    if let Some(index) = state.router.update(dt, &mut state.craft, &mut state.loader) {
        state.enter_scene(index);
    }

    if !state.router.is_transitioning() {
        state.level_ticks += 1;
    }
}

fn route_contact(state: &mut GameState, contact: ContactEvent) {
    let response = state
        .router
        .on_contact(contact, &mut state.craft, &mut state.events);

    match response {
        ContactResponse::Ignored => {}
        ContactResponse::Feedback => {
            if contact.category == Category::Pickup && state.level.remove(contact.other).is_some() {
                state.fuel_collected += 1;
                state
                    .events
                    .push(GameEvent::PickupCollected { id: contact.other });
            }
        }
        ContactResponse::Transition => announce_transition(state, contact.category, false),
    }
}

fn announce_transition(state: &mut GameState, category: Category, forced: bool) {
    // Router silenced every loop, including the engine
    state.controller.reset_feedback();
    state.events.push(GameEvent::TransitionStarted { category });
    if category == Category::Finish {
        state.events.push(GameEvent::Landed {
            scene: state.scene_index(),
            ticks: state.level_ticks,
            forced,
        });
    }
}

fn run_debug_command(state: &mut GameState, command: DebugCommand) {
    match command {
        DebugCommand::ForceFinish | DebugCommand::ForceCrash => {
            let category = if command == DebugCommand::ForceFinish {
                Category::Finish
            } else {
                Category::Hazard
            };
            state.router.force_transition(
                category,
                &mut state.craft,
                &mut state.loader,
                &mut state.events,
            );
            announce_transition(state, category, true);
        }
        DebugCommand::ToggleCollisions => {
            state.physics.collisions_enabled = !state.physics.collisions_enabled;
            log::info!("Collisions enabled: {}", state.physics.collisions_enabled);
        }
    }
}
