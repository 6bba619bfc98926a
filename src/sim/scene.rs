//! Scene loading
//!
//! Loads are requested with a ticket and polled until complete, so a loader
//! may finish immediately (synchronous) or after any number of ticks.

use serde::{Deserialize, Serialize};

/// How a scene is brought in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadMode {
    /// Replace every loaded scene with the target
    #[default]
    Replace,
    /// Unload the current scene, then load the target alongside the rest
    Additive,
}

/// Handle for a pending load or unload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadTicket(pub u64);

/// Progress of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Complete,
    /// Ticket unknown to the loader (never issued, or already reported complete)
    Failed,
}

/// External scene/level loader
pub trait SceneLoader {
    /// Total scenes in the build
    fn scene_count(&self) -> usize;
    /// Index of the scene that currently owns the craft
    fn active_scene(&self) -> usize;
    /// Loaded scene indices, oldest first
    fn loaded_scenes(&self) -> &[usize];
    fn begin_load(&mut self, index: usize, mode: LoadMode) -> LoadTicket;
    fn begin_unload(&mut self, index: usize) -> LoadTicket;
    /// Check a ticket. `Complete` is reported exactly once per ticket.
    fn poll(&mut self, ticket: LoadTicket) -> LoadStatus;
    /// Drop a request that will never be polled again
    fn cancel(&mut self, ticket: LoadTicket);
}

/// Index to reload after a hazard, clamped into range
pub fn reload_scene_index(current: usize, scene_count: usize) -> usize {
    if scene_count == 0 {
        log::warn!("No scenes available, reloading index 0");
        return 0;
    }
    current.min(scene_count - 1)
}

/// Index to advance to after a finish.
///
/// Past the last scene this loops to 0, unless several scenes are loaded at
/// once, in which case it stays on the last loaded one.
pub fn next_scene_index(current: usize, scene_count: usize, loaded: &[usize]) -> usize {
    if scene_count == 0 {
        log::warn!("No scenes available, advancing to index 0");
        return 0;
    }
    let next = current.saturating_add(1);
    if next < scene_count {
        return next;
    }
    match loaded {
        [_, .., last] => (*last).min(scene_count - 1),
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum SceneOp {
    Load { index: usize, mode: LoadMode },
    Unload { index: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingOp {
    ticket: LoadTicket,
    op: SceneOp,
    remaining_ticks: u32,
}

/// Built-in loader for generated levels
///
/// Every request takes `latency_ticks` calls to [`LevelLoader::tick`] before
/// it completes; zero latency makes loads synchronous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelLoader {
    scene_count: usize,
    latency_ticks: u32,
    active: usize,
    loaded: Vec<usize>,
    pending: Vec<PendingOp>,
    next_ticket: u64,
}

impl LevelLoader {
    /// Loader with scene 0 already loaded
    pub fn new(scene_count: usize, latency_ticks: u32) -> Self {
        Self {
            scene_count,
            latency_ticks,
            active: 0,
            loaded: vec![0],
            pending: Vec::new(),
            next_ticket: 1,
        }
    }

    /// Start on a specific scene (e.g. when continuing a run)
    pub fn with_active(mut self, index: usize) -> Self {
        let index = reload_scene_index(index, self.scene_count);
        self.active = index;
        self.loaded = vec![index];
        self
    }

    pub fn latency_ticks(&self) -> u32 {
        self.latency_ticks
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Advance pending operations by one tick
    pub fn tick(&mut self) {
        for op in &mut self.pending {
            op.remaining_ticks = op.remaining_ticks.saturating_sub(1);
        }
    }

    fn issue(&mut self, op: SceneOp) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.push(PendingOp {
            ticket,
            op,
            remaining_ticks: self.latency_ticks,
        });
        ticket
    }

    fn finish(&mut self, op: SceneOp) {
        match op {
            SceneOp::Load { index, mode } => {
                match mode {
                    LoadMode::Replace => self.loaded.clear(),
                    LoadMode::Additive => self.loaded.retain(|&i| i != index),
                }
                self.loaded.push(index);
                self.active = index;
                log::info!("Scene {} loaded ({:?})", index, mode);
            }
            SceneOp::Unload { index } => {
                self.loaded.retain(|&i| i != index);
                log::debug!("Scene {} unloaded", index);
            }
        }
    }
}

impl SceneLoader for LevelLoader {
    fn scene_count(&self) -> usize {
        self.scene_count
    }

    fn active_scene(&self) -> usize {
        self.active
    }

    fn loaded_scenes(&self) -> &[usize] {
        &self.loaded
    }

    fn begin_load(&mut self, index: usize, mode: LoadMode) -> LoadTicket {
        self.issue(SceneOp::Load { index, mode })
    }

    fn begin_unload(&mut self, index: usize) -> LoadTicket {
        self.issue(SceneOp::Unload { index })
    }

    fn poll(&mut self, ticket: LoadTicket) -> LoadStatus {
        let Some(pos) = self.pending.iter().position(|p| p.ticket == ticket) else {
            return LoadStatus::Failed;
        };
        if self.pending[pos].remaining_ticks > 0 {
            return LoadStatus::Pending;
        }
        let done = self.pending.remove(pos);
        self.finish(done.op);
        LoadStatus::Complete
    }

    fn cancel(&mut self, ticket: LoadTicket) {
        let before = self.pending.len();
        self.pending.retain(|p| p.ticket != ticket);
        if self.pending.len() < before {
            log::debug!("Cancelled scene request {:?}", ticket);
        }
    }
}
