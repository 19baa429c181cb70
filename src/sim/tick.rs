//! Simulation tick
//!
//! One tick moves the player, walks every enemy and orb toward the player,
//! culls stragglers, rolls spawns, then resolves collisions. Per-tick
//! constants are expressed for a tick of `SIM_DT`; other `dt` values scale
//! them linearly.

use glam::Vec2;
use rand::Rng;

use super::collision::{ResolveReport, resolve_collisions};
use super::input::{DOWN_KEYS, InputTracker, LEFT_KEYS, RIGHT_KEYS, UP_KEYS};
use super::state::GameState;
use crate::consts::SIM_DT;
use crate::{clamp_to_bounds, direction_toward};

/// Movement intent for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl TickInput {
    /// Resolve held keys into directions
    pub fn from_keys(keys: &InputTracker) -> Self {
        Self {
            left: keys.is_any_held(LEFT_KEYS),
            right: keys.is_any_held(RIGHT_KEYS),
            up: keys.is_any_held(UP_KEYS),
            down: keys.is_any_held(DOWN_KEYS),
        }
    }

    /// Net direction; opposite keys cancel
    pub fn axis(&self) -> Vec2 {
        let x = self.right as i32 - self.left as i32;
        let y = self.down as i32 - self.up as i32;
        Vec2::new(x as f32, y as f32)
    }
}

/// Advance the game by one tick: movement, spawns, then collisions
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> ResolveReport {
    if state.is_game_over() {
        return ResolveReport::default();
    }
    step(state, input, dt);
    resolve_collisions(state)
}

/// Movement, culling and spawning (no collision handling)
pub fn step(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.is_game_over() {
        return;
    }
    state.time_ticks += 1;
    let scale = dt / SIM_DT;

    move_player(state, input, scale);
    pursue_player(state, scale);
    spawn_entities(state, scale);
}

fn move_player(state: &mut GameState, input: &TickInput, scale: f32) {
    let speed = state.config.player_speed * scale;
    let bounds = state.bounds;
    if let Some(player) = state.entities.player_mut() {
        // Deltas are summed before the single clamp
        let moved = player.pos + input.axis() * speed;
        player.pos = clamp_to_bounds(moved, player.size, bounds);
    }
}

fn pursue_player(state: &mut GameState, scale: f32) {
    let step = state.config.pursuit_speed * scale;
    let margin = state.config.cull_margin;
    let bounds = state.bounds;
    let target = state.entities.player().map(|p| p.pos);

    if let Some(target) = target {
        for entity in state.entities.iter_mut() {
            // Zero distance: already on target, nothing to normalize
            if let Some(dir) = direction_toward(entity.bounds.pos, target) {
                entity.bounds.pos += dir * step;
            }
        }
    }

    let mut index = state.entities.len();
    while index > 0 {
        index -= 1;
        let pos = state.entities.as_slice()[index].bounds.pos;
        let outside = pos.x < -margin
            || pos.x > bounds.x + margin
            || pos.y < -margin
            || pos.y > bounds.y + margin;
        if outside {
            let culled = state.entities.remove_at(index);
            log::debug!("Culled {:?} {:?} at {:?}", culled.kind, culled.id, pos);
        }
    }
}

fn spawn_entities(state: &mut GameState, scale: f32) {
    // Empty spawn ranges: nothing can be placed on this canvas
    let bounds = state.bounds;
    if !(bounds.x > 0.0 && bounds.y > 0.0 && bounds.is_finite()) {
        return;
    }

    if roll(state, state.config.orb_spawn_chance, scale) {
        let pos = Vec2::new(
            state.rng.random_range(0.0..bounds.x),
            state.rng.random_range(0.0..bounds.y),
        );
        let id = state.spawn_orb(pos);
        log::debug!("Spawned orb {:?} at {:?}", id, pos);
    }

    if roll(state, state.config.enemy_spawn_chance, scale) {
        let pos = edge_spawn_point(state);
        let id = state.spawn_enemy(pos);
        log::debug!("Spawned enemy {:?} at {:?}", id, pos);
    }
}

/// Per-tick spawn roll, scaled by `dt`; non-finite chances never fire
fn roll(state: &mut GameState, chance: f64, scale: f32) -> bool {
    let p = chance * scale as f64;
    if !p.is_finite() || p <= 0.0 {
        return false;
    }
    state.rng.random_bool(p.min(1.0))
}

/// A point just past a random canvas edge, inside the cull margin
fn edge_spawn_point(state: &mut GameState) -> Vec2 {
    let bounds = state.bounds;
    let offset = state.config.enemy_size.min(state.config.cull_margin);
    let along_x = state.rng.random_range(0.0..bounds.x);
    let along_y = state.rng.random_range(0.0..bounds.y);
    match state.rng.random_range(0..4u8) {
        0 => Vec2::new(along_x, -offset),
        1 => Vec2::new(bounds.x, along_y),
        2 => Vec2::new(along_x, bounds.y),
        _ => Vec2::new(-offset, along_y),
    }
}
