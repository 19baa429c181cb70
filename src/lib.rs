//! Canvas RPG - A real-time action RPG prototype
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, pursuit, collisions, progression)
//! - `session`: Screen flow, character creation and the frame driver
//! - `ui`: Narrow interface the simulation publishes state through
//! - `settings`: Data-driven game tuning and audio preferences

pub mod error;
pub mod session;
pub mod settings;
pub mod sim;
pub mod ui;

pub use error::{Result, RpgError};
pub use session::{Session, SessionCommand};
pub use settings::{Settings, SimConfig};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per reference display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default canvas dimensions (overridden by the real viewport)
    pub const DEFAULT_CANVAS_WIDTH: f32 = 1280.0;
    pub const DEFAULT_CANVAS_HEIGHT: f32 = 720.0;

    /// Player defaults (units per tick / square side)
    pub const PLAYER_SPEED: f32 = 3.0;
    pub const PLAYER_SIZE: f32 = 30.0;

    /// Pursuit step for enemies and orbs (units per tick)
    pub const PURSUIT_SPEED: f32 = 1.0;
    /// Entities further than this past any canvas edge are culled
    pub const CULL_MARGIN: f32 = 50.0;

    /// Experience orb defaults
    pub const ORB_SIZE: f32 = 10.0;
    pub const ORB_SPAWN_CHANCE: f64 = 0.01;
    pub const ORB_EXPERIENCE: u32 = 10;

    /// Enemy defaults
    pub const ENEMY_SIZE: f32 = 30.0;
    pub const ENEMY_SPAWN_CHANCE: f64 = 0.005;
    pub const ENEMY_DAMAGE: i32 = 10;

    /// Entities narrower than this are orbs when classified by geometry alone
    pub const ORB_WIDTH_LIMIT: f32 = 20.0;
}

/// Clamp a box origin so a box of `size` stays inside `[0, bounds]`
#[inline]
pub fn clamp_to_bounds(pos: Vec2, size: Vec2, bounds: Vec2) -> Vec2 {
    let max = (bounds - size).max(Vec2::ZERO);
    pos.clamp(Vec2::ZERO, max)
}

/// Unit vector from `from` toward `to`, or `None` when the points coincide
#[inline]
pub fn direction_toward(from: Vec2, to: Vec2) -> Option<Vec2> {
    let delta = to - from;
    let distance = delta.length();
    if distance > 0.0 {
        Some(delta / distance)
    } else {
        None
    }
}
