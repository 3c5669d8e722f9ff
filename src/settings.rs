//! Player settings and preferences
//!
//! Persisted in LocalStorage on the web, defaults on native.

use serde::{Deserialize, Serialize};

use crate::consts::RELATIVE_SENSITIVITY;
pub use crate::sim::ControlMode;

/// How a tracked head position maps onto the playfield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Mapping {
    /// Top of the camera frame is the top of the field
    #[default]
    Absolute,
    /// Offset from the head position when the run started, scaled
    Relative { sensitivity: f32 },
}

impl Mapping {
    pub fn relative() -> Self {
        Mapping::Relative {
            sensitivity: RELATIVE_SENSITIVITY,
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Mapping::Relative { .. })
    }

    /// Map a smoothed sample given the run's baseline (if any)
    pub fn apply(&self, sample: f32, baseline: Option<f32>) -> f32 {
        match (self, baseline) {
            (Mapping::Relative { sensitivity }, Some(base)) => {
                (0.5 + (sample - base) * sensitivity).clamp(0.0, 1.0)
            }
            (Mapping::Relative { .. }, None) => 0.5,
            (Mapping::Absolute, _) => sample.clamp(0.0, 1.0),
        }
    }
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Impulse => "Impulse",
            ControlMode::Tracked => "Tracked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "impulse" | "flap" | "tap" => Some(ControlMode::Impulse),
            "tracked" | "head" | "camera" => Some(ControlMode::Tracked),
            _ => None,
        }
    }
}

/// Player settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Controls ===
    /// Preferred control mode
    pub control_mode: ControlMode,
    /// Refuse to start instead of falling back to impulse control when
    /// tracking cannot be initialized
    pub tracking_required: bool,
    /// Tracked position mapping
    pub mapping: Mapping,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            control_mode: ControlMode::Tracked,
            tracking_required: false,
            mapping: Mapping::Absolute,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            show_fps: false,
        }
    }
}

impl Settings {
    /// Effective sound effect gain
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "head_flap_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
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
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        log::debug!("Settings are not persisted on native ({})", Self::STORAGE_KEY);
    }
}
