//! Player preferences
//!
//! Persisted separately from landing records in LocalStorage.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === HUD ===
    /// Show velocity and angle readout
    pub show_telemetry: bool,
    /// Show best landing time for the current level
    pub show_records: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Engine hum volume (0.0 - 1.0)
    pub engine_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_telemetry: true,
            show_records: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            engine_volume: 0.5,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// Final gain for one-shot sounds
    pub fn sfx_gain(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Final gain for the engine loop
    pub fn engine_gain(&self) -> f32 {
        (self.master_volume * self.engine_volume).clamp(0.0, 1.0)
    }

    /// Clamp volumes into range after loading
    fn sanitized(mut self) -> Self {
        for volume in [
            &mut self.master_volume,
            &mut self.sfx_volume,
            &mut self.engine_volume,
        ] {
            if !volume.is_finite() {
                *volume = 0.0;
            }
            *volume = volume.clamp(0.0, 1.0);
        }
        self
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "rocket_lander_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str::<Settings>(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings.sanitized();
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default().sanitized()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gains() {
        let settings = Settings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            engine_volume: 1.0,
            ..Default::default()
        };
        assert!((settings.sfx_gain() - 0.25).abs() < 1e-6);
        assert!((settings.engine_gain() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"master_volume": 0.3}"#).unwrap();
        assert!((settings.master_volume - 0.3).abs() < 1e-6);
        assert!(settings.mute_on_blur);
        assert!(settings.show_records);
    }

    #[test]
    fn test_sanitize_clamps_volumes() {
        let settings = Settings {
            master_volume: 3.0,
            sfx_volume: -1.0,
            engine_volume: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.sfx_volume, 0.0);
        assert_eq!(settings.engine_volume, 0.0);
    }
}
