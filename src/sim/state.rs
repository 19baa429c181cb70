//! Game state and core simulation types
//!
//! Everything a run needs lives in [`GameState`], owned by the frame driver.

use std::collections::HashMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::stats::{
    Archetype, Attributes, Gender, derive_max_health, initial_experience_threshold,
    next_experience_threshold,
};
use crate::clamp_to_bounds;
use crate::consts::ORB_WIDTH_LIMIT;
use crate::error::{Result, RpgError};
use crate::settings::SimConfig;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Simulation ticking, player alive
    Active,
    /// Player died; simulation frozen until a new character is created
    GameOver,
}

/// Axis-aligned box used for both drawing and collision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Box of `size` whose center is `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            pos: center - size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// Stable handle for a non-player entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// What touching an entity does to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Deals damage on contact
    Enemy,
    /// Grants experience on contact
    ExperienceOrb,
}

impl EntityKind {
    /// Legacy size rule: anything narrower than 20 is an orb
    pub fn classify(width: f32) -> Self {
        if width < ORB_WIDTH_LIMIT {
            EntityKind::ExperienceOrb
        } else {
            EntityKind::Enemy
        }
    }
}

/// An enemy or orb
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub bounds: BoundingBox,
}

/// Player avatar plus the unordered enemy/orb collection
///
/// Removal is swap-remove with an id→slot index, so order is not preserved.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    player: Option<BoundingBox>,
    entities: Vec<Entity>,
    slots: HashMap<EntityId, usize>,
    next_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the player avatar centered at `center`
    pub fn spawn_player(&mut self, center: Vec2, size: Vec2) -> BoundingBox {
        let player = BoundingBox::centered(center, size);
        self.player = Some(player);
        player
    }

    pub fn player(&self) -> Option<&BoundingBox> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut BoundingBox> {
        self.player.as_mut()
    }

    /// Add an entity, returning its id
    pub fn spawn(&mut self, kind: EntityKind, bounds: BoundingBox) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.slots.insert(id, self.entities.len());
        self.entities.push(Entity { id, kind, bounds });
        id
    }

    /// Remove an entity by id
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = *self.slots.get(&id)?;
        Some(self.remove_at(index))
    }

    /// Remove the entity at `index`; the last entity moves into its slot
    pub(crate) fn remove_at(&mut self, index: usize) -> Entity {
        let removed = self.entities.swap_remove(index);
        self.slots.remove(&removed.id);
        if let Some(moved) = self.entities.get(index) {
            self.slots.insert(moved.id, index);
        }
        removed
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(&id).map(|&i| &self.entities[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Drop every enemy and orb (the player stays)
    pub fn clear(&mut self) {
        self.entities.clear();
        self.slots.clear();
    }
}

/// Character sheet and progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCharacter {
    pub archetype: Archetype,
    pub gender: Gender,
    pub level: u32,
    pub experience: u32,
    pub experience_to_next: u32,
    pub attributes: Attributes,
    pub health: i32,
    pub max_health: i32,
}

impl PlayerCharacter {
    pub fn new(archetype: Archetype, gender: Gender) -> Self {
        let attributes = archetype.base_attributes();
        let max_health = derive_max_health(attributes.vitality);
        Self {
            archetype,
            gender,
            level: 1,
            experience: 0,
            experience_to_next: initial_experience_threshold(),
            attributes,
            health: max_health,
            max_health,
        }
    }

    /// Add experience and apply every level-up it pays for
    ///
    /// Returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: u32) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0;
        while self.experience >= self.experience_to_next {
            self.experience -= self.experience_to_next;
            self.level_up();
            gained += 1;
        }
        gained
    }

    fn level_up(&mut self) {
        self.level += 1;
        self.experience_to_next = next_experience_threshold(self.experience_to_next);
        self.attributes.vitality = self.attributes.vitality.saturating_add(1);
        self.max_health = derive_max_health(self.attributes.vitality);
        self.health = self.max_health;
    }

    /// Apply damage; returns true if the hit was fatal
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health = self.health.saturating_sub(amount);
        self.is_dead()
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn stats(&self) -> PlayerStats {
        PlayerStats {
            level: self.level,
            experience: self.experience,
            experience_to_next: self.experience_to_next,
            health: self.health,
            max_health: self.max_health,
        }
    }
}

/// HUD-facing progression numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub level: u32,
    pub experience: u32,
    pub experience_to_next: u32,
    pub health: i32,
    pub max_health: i32,
}

/// Final numbers of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub archetype: Archetype,
    pub gender: Gender,
    pub level: u32,
    pub experience: u32,
    pub ticks: u64,
    pub orbs_collected: u32,
    pub enemies_hit: u32,
}

/// Things that happened during a tick, drained by the driver
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    OrbSpawned(EntityId),
    EnemySpawned(EntityId),
    OrbCollected(EntityId),
    EnemyHit { id: EntityId, damage: i32 },
    LevelUp { level: u32 },
    GameOver(RunSummary),
}

/// Read-only view handed to the render adapter each frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub bounds: Vec2,
    pub player: Option<BoundingBox>,
    pub entities: Vec<Entity>,
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub config: SimConfig,
    /// Canvas size
    pub bounds: Vec2,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub character: PlayerCharacter,
    pub entities: EntityStore,
    pub orbs_collected: u32,
    pub enemies_hit: u32,
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Start a run for a freshly created character
    ///
    /// Fails with `InvalidConfig` if the tuning cannot be simulated.
    pub fn new(seed: u64, config: SimConfig, archetype: Archetype, gender: Gender) -> Result<Self> {
        config.validate()?;
        let bounds = Vec2::new(config.canvas_width, config.canvas_height);
        let mut entities = EntityStore::new();
        entities.spawn_player(bounds / 2.0, Vec2::splat(config.player_size));

        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            config,
            bounds,
            phase: GamePhase::Active,
            time_ticks: 0,
            character: PlayerCharacter::new(archetype, gender),
            entities,
            orbs_collected: 0,
            enemies_hit: 0,
            events: Vec::new(),
        })
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Follow a canvas resize, keeping the player on screen
    ///
    /// An empty canvas is rejected and the previous bounds stay in place.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(RpgError::InvalidConfig(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        self.bounds = Vec2::new(width, height);
        self.config.canvas_width = width;
        self.config.canvas_height = height;
        let bounds = self.bounds;
        if let Some(player) = self.entities.player_mut() {
            player.pos = clamp_to_bounds(player.pos, player.size, bounds);
        }
        Ok(())
    }

    /// Spawn an orb with its top-left corner at `pos`
    pub fn spawn_orb(&mut self, pos: Vec2) -> EntityId {
        let size = Vec2::splat(self.config.orb_size);
        let id = self.entities.spawn(
            EntityKind::ExperienceOrb,
            BoundingBox { pos, size },
        );
        self.events.push(GameEvent::OrbSpawned(id));
        id
    }

    /// Spawn an enemy with its top-left corner at `pos`
    pub fn spawn_enemy(&mut self, pos: Vec2) -> EntityId {
        let size = Vec2::splat(self.config.enemy_size);
        let id = self.entities.spawn(EntityKind::Enemy, BoundingBox { pos, size });
        self.events.push(GameEvent::EnemySpawned(id));
        id
    }

    pub fn stats(&self) -> PlayerStats {
        self.character.stats()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            archetype: self.character.archetype,
            gender: self.character.gender,
            level: self.character.level,
            experience: self.character.experience,
            ticks: self.time_ticks,
            orbs_collected: self.orbs_collected,
            enemies_hit: self.enemies_hit,
        }
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            bounds: self.bounds,
            player: self.entities.player().copied(),
            entities: self.entities.as_slice().to_vec(),
        }
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warrior() -> PlayerCharacter {
        PlayerCharacter::new(Archetype::Warrior, Gender::Male)
    }

    #[test]
    fn test_new_character() {
        let c = warrior();
        assert_eq!(c.level, 1);
        assert_eq!(c.experience, 0);
        assert_eq!(c.experience_to_next, 100);
        assert_eq!(c.max_health, 120);
        assert_eq!(c.health, 120);
    }

    #[test]
    fn test_single_level_up() {
        let mut c = warrior();
        c.health = 50;
        for _ in 0..9 {
            assert_eq!(c.gain_experience(10), 0);
        }
        assert_eq!(c.gain_experience(10), 1);
        assert_eq!(c.level, 2);
        assert_eq!(c.experience, 0);
        assert_eq!(c.experience_to_next, 120);
        assert_eq!(c.attributes.vitality, 13);
        assert_eq!(c.max_health, 130);
        assert_eq!(c.health, 130);
    }

    #[test]
    fn test_multi_level_up_loops() {
        let mut c = warrior();
        // 100 + 120 = 220 crosses two thresholds with 5 left over
        assert_eq!(c.gain_experience(225), 2);
        assert_eq!(c.level, 3);
        assert_eq!(c.experience, 5);
        assert_eq!(c.experience_to_next, 144);
        assert_eq!(c.attributes.vitality, 14);
        assert_eq!(c.health, 140);
    }

    #[test]
    fn test_take_damage() {
        let mut c = warrior();
        assert!(!c.take_damage(10));
        assert_eq!(c.health, 110);
        assert!(c.take_damage(110));
        assert!(c.is_dead());

        // Huge hits and vitality pin at the integer limits
        assert!(c.take_damage(i32::MAX));
        assert!(c.take_damage(i32::MAX));
        assert_eq!(c.health, i32::MIN);
        c.attributes.vitality = u32::MAX;
        c.level_up();
        assert_eq!(c.attributes.vitality, u32::MAX);
        assert_eq!(c.max_health, i32::MAX);
        assert_eq!(c.health, i32::MAX);
    }

    #[test]
    fn test_spawn_player_centered() {
        let mut store = EntityStore::new();
        let player = store.spawn_player(Vec2::new(100.0, 50.0), Vec2::splat(30.0));
        assert_eq!(player.pos, Vec2::new(85.0, 35.0));
        assert_eq!(player.center(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_store_remove_keeps_index_consistent() {
        let mut store = EntityStore::new();
        let a = store.spawn(EntityKind::Enemy, BoundingBox::new(0.0, 0.0, 30.0, 30.0));
        let b = store.spawn(EntityKind::ExperienceOrb, BoundingBox::new(1.0, 1.0, 10.0, 10.0));
        let c = store.spawn(EntityKind::ExperienceOrb, BoundingBox::new(2.0, 2.0, 10.0, 10.0));

        let removed = store.remove(a).unwrap();
        assert_eq!(removed.id, a);
        assert_eq!(store.len(), 2);
        assert!(store.get(a).is_none());
        // c was moved into a's slot and must still resolve
        assert_eq!(store.get(c).unwrap().bounds.pos, Vec2::new(2.0, 2.0));
        assert_eq!(store.get(b).unwrap().bounds.pos, Vec2::new(1.0, 1.0));

        assert!(store.remove(a).is_none());
        store.remove(c);
        store.remove(b);
        assert!(store.is_empty());
    }

    #[test]
    fn test_classify_by_width() {
        assert_eq!(EntityKind::classify(10.0), EntityKind::ExperienceOrb);
        assert_eq!(EntityKind::classify(19.9), EntityKind::ExperienceOrb);
        assert_eq!(EntityKind::classify(20.0), EntityKind::Enemy);
        assert_eq!(EntityKind::classify(30.0), EntityKind::Enemy);
    }

    #[test]
    fn test_resize_reclamps_player() {
        let mut state =
            GameState::new(1, SimConfig::default(), Archetype::Mage, Gender::Female).unwrap();
        state.resize(200.0, 100.0).unwrap();
        let player = state.entities.player().unwrap();
        assert!(player.pos.x <= 170.0 && player.pos.y <= 70.0);
        assert_eq!(state.bounds, Vec2::new(200.0, 100.0));
    }

    #[test]
    fn test_resize_rejects_empty_canvas() {
        let mut state =
            GameState::new(1, SimConfig::default(), Archetype::Mage, Gender::Female).unwrap();
        assert!(matches!(state.resize(0.0, 300.0), Err(RpgError::InvalidConfig(_))));
        assert!(state.resize(400.0, -1.0).is_err());
        assert!(state.resize(f32::NAN, 300.0).is_err());
        assert_eq!(state.bounds, Vec2::new(1280.0, 720.0));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimConfig {
            canvas_width: 0.0,
            ..SimConfig::default()
        };
        let err = GameState::new(1, config, Archetype::Rogue, Gender::Male).unwrap_err();
        assert!(matches!(err, RpgError::InvalidConfig(_)));
    }
}
