//! Best landing times
//!
//! One entry per level, persisted to LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT;

/// Fastest landing recorded for a level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandingRecord {
    /// Level index
    pub scene: usize,
    /// Simulation ticks from spawn to touchdown
    pub ticks: u64,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Per-level landing records, sorted by level index
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LandingRecords {
    pub entries: Vec<LandingRecord>,
}

impl LandingRecords {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "rocket_lander_records";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn best(&self, scene: usize) -> Option<&LandingRecord> {
        self.entries.iter().find(|e| e.scene == scene)
    }

    /// Record a landing. Returns true if it set a new best for the level.
    pub fn record(&mut self, scene: usize, ticks: u64, timestamp: f64) -> bool {
        if ticks == 0 {
            return false;
        }

        let entry = LandingRecord {
            scene,
            ticks,
            timestamp,
        };

        match self.entries.binary_search_by_key(&scene, |e| e.scene) {
            Ok(i) if ticks < self.entries[i].ticks => {
                self.entries[i] = entry;
                true
            }
            Ok(_) => false,
            Err(i) => {
                self.entries.insert(i, entry);
                true
            }
        }
    }

    /// Sum of best times across every level in `0..scene_count`, if all are recorded
    pub fn total_ticks(&self, scene_count: usize) -> Option<u64> {
        (0..scene_count)
            .map(|scene| self.best(scene).map(|e| e.ticks))
            .sum()
    }

    /// Load records from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<LandingRecords>(&json) {
                    Ok(mut records) => {
                        records.entries.sort_by_key(|e| e.scene);
                        records.entries.dedup_by_key(|e| e.scene);
                        log::info!("Loaded {} landing records", records.entries.len());
                        return records;
                    }
                    Err(e) => log::warn!("Discarding corrupt landing records: {}", e),
                }
            }
        }

        log::info!("No landing records found, starting fresh");
        Self::new()
    }

    /// Save records to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Landing records saved ({} levels)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Format a tick count as seconds, e.g. `12.34s`
pub fn format_ticks(ticks: u64) -> String {
    format!("{:.2}s", ticks as f32 * SIM_DT)
}
