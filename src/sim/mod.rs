//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Explicit `dt` per tick, driven from outside
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod input;
pub mod state;
pub mod stats;
pub mod tick;

pub use collision::{ResolveReport, is_colliding, resolve_collisions};
pub use input::InputTracker;
pub use state::{
    BoundingBox, Entity, EntityId, EntityKind, EntityStore, GameEvent, GamePhase, GameState,
    PlayerCharacter, PlayerStats, RenderSnapshot, RunSummary,
};
pub use stats::{
    Archetype, Attributes, Gender, base_attributes, derive_max_health,
    initial_experience_threshold, next_experience_threshold,
};
pub use tick::{TickInput, step, tick};
