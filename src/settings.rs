//! Game settings and preferences
//!
//! Gameplay tuning lives in [`SimConfig`]; audio preferences sit next to it.
//! Persisted as JSON in LocalStorage on the web build.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, RpgError};

/// Gameplay tuning consumed by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Canvas width in pixels
    pub canvas_width: f32,
    /// Canvas height in pixels
    pub canvas_height: f32,
    /// Player movement per tick
    pub player_speed: f32,
    /// Player square side
    pub player_size: f32,
    /// Pursuit step per tick for enemies and orbs
    pub pursuit_speed: f32,
    /// Distance past a canvas edge after which entities are culled
    pub cull_margin: f32,
    pub orb_size: f32,
    /// Probability of an orb spawning on a given tick
    pub orb_spawn_chance: f64,
    pub orb_experience: u32,
    pub enemy_size: f32,
    /// Probability of an enemy spawning on a given tick (0 disables enemies)
    pub enemy_spawn_chance: f64,
    pub enemy_damage: i32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            player_speed: PLAYER_SPEED,
            player_size: PLAYER_SIZE,
            pursuit_speed: PURSUIT_SPEED,
            cull_margin: CULL_MARGIN,
            orb_size: ORB_SIZE,
            orb_spawn_chance: ORB_SPAWN_CHANCE,
            orb_experience: ORB_EXPERIENCE,
            enemy_size: ENEMY_SIZE,
            enemy_spawn_chance: ENEMY_SPAWN_CHANCE,
            enemy_damage: ENEMY_DAMAGE,
        }
    }
}

impl SimConfig {
    /// Reject tuning the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let (w, h) = (self.canvas_width, self.canvas_height);
        if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
            return Err(RpgError::InvalidConfig(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if !(self.player_size > 0.0 && self.orb_size > 0.0 && self.enemy_size > 0.0) {
            return Err(RpgError::InvalidConfig("entity sizes must be positive".into()));
        }
        if self.player_speed < 0.0 || self.pursuit_speed < 0.0 || self.cull_margin < 0.0 {
            return Err(RpgError::InvalidConfig(
                "speeds and cull margin must not be negative".into(),
            ));
        }
        for (name, chance) in [
            ("orb_spawn_chance", self.orb_spawn_chance),
            ("enemy_spawn_chance", self.enemy_spawn_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(RpgError::InvalidConfig(format!(
                    "{name} must be within 0..=1, got {chance}"
                )));
            }
        }
        Ok(())
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gameplay tuning
    pub sim: SimConfig,

    // === Audio ===
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Click/effect volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            music_volume: 1.0,
            sfx_volume: 1.0,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.sim.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Set music volume from a 0-100 slider value
    pub fn set_music_slider(&mut self, value: f32) {
        self.music_volume = slider_to_volume(value);
    }

    /// Set effect volume from a 0-100 slider value
    pub fn set_sfx_slider(&mut self, value: f32) {
        self.sfx_volume = slider_to_volume(value);
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "canvas_rpg_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
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
            if let Ok(json) = self.to_json() {
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
        // No-op for native
    }
}

fn slider_to_volume(value: f32) -> f32 {
    (value / 100.0).clamp(0.0, 1.0)
}
