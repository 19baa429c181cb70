//! Collision detection and progression
//!
//! Boxes overlap when their half-open extents intersect on both axes, so
//! boxes that merely share an edge do not collide.

use super::state::{BoundingBox, EntityKind, GameEvent, GamePhase, GameState};

/// AABB overlap test (symmetric)
#[inline]
pub fn is_colliding(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.pos.x < b.pos.x + b.size.x
        && a.pos.x + a.size.x > b.pos.x
        && a.pos.y < b.pos.y + b.size.y
        && a.pos.y + a.size.y > b.pos.y
}

/// Outcome counts of one resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub orbs_collected: u32,
    pub enemies_hit: u32,
    pub levels_gained: u32,
}

/// Resolve every entity touching the player
///
/// Walks the store back to front so swap-remove only moves entities that
/// were already visited, and every entity is examined once per pass.
///
/// The one exception is a fatal enemy hit: the pass ends there and the
/// entities not yet visited stay in the store unresolved. A later orb in the
/// same pass would otherwise level up, and fully heal, a dead player.
pub fn resolve_collisions(state: &mut GameState) -> ResolveReport {
    let mut report = ResolveReport::default();
    if state.is_game_over() {
        return report;
    }
    let Some(player) = state.entities.player().copied() else {
        return report;
    };

    let mut index = state.entities.len();
    while index > 0 {
        index -= 1;
        let entity = state.entities.as_slice()[index];
        if !is_colliding(&player, &entity.bounds) {
            continue;
        }
        state.entities.remove_at(index);

        match entity.kind {
            EntityKind::ExperienceOrb => {
                report.orbs_collected += 1;
                state.orbs_collected += 1;
                state.events.push(GameEvent::OrbCollected(entity.id));

                let gained = state.character.gain_experience(state.config.orb_experience);
                if gained > 0 {
                    report.levels_gained += gained;
                    let level = state.character.level;
                    log::info!(
                        "Level up! Now level {} ({} hp, next at {} xp)",
                        level,
                        state.character.max_health,
                        state.character.experience_to_next
                    );
                    state.events.push(GameEvent::LevelUp { level });
                }
            }
            EntityKind::Enemy => {
                let damage = state.config.enemy_damage;
                report.enemies_hit += 1;
                state.enemies_hit += 1;
                state.events.push(GameEvent::EnemyHit {
                    id: entity.id,
                    damage,
                });

                if state.character.take_damage(damage) {
                    state.phase = GamePhase::GameOver;
                    let summary = state.summary();
                    log::info!(
                        "Game over at level {} after {} ticks",
                        summary.level,
                        summary.ticks
                    );
                    state.events.push(GameEvent::GameOver(summary));
                    break;
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimConfig;
    use crate::sim::stats::{Archetype, Gender};
    use glam::Vec2;
    use proptest::prelude::*;

    fn warrior_state() -> GameState {
        GameState::new(7, SimConfig::default(), Archetype::Warrior, Gender::Male).unwrap()
    }

    fn player_pos(state: &GameState) -> Vec2 {
        state.entities.player().unwrap().pos
    }

    #[test]
    fn test_edge_touch_is_not_collision() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 10.0, 10.0);
        assert!(!is_colliding(&a, &b));
        let c = BoundingBox::new(9.5, 9.5, 10.0, 10.0);
        assert!(is_colliding(&a, &c));
    }

    #[test]
    fn test_enemy_hits_until_game_over() {
        let mut state = warrior_state();
        let pos = player_pos(&state);

        state.spawn_enemy(pos);
        resolve_collisions(&mut state);
        assert_eq!(state.character.health, 110);
        assert!(state.entities.is_empty());

        for _ in 0..9 {
            state.spawn_enemy(pos);
            resolve_collisions(&mut state);
        }
        assert_eq!(state.character.health, 20);
        assert!(!state.is_game_over());

        state.spawn_enemy(pos);
        state.spawn_enemy(pos);
        let report = resolve_collisions(&mut state);
        assert_eq!(report.enemies_hit, 2);
        assert!(state.character.health <= 0);
        assert!(state.is_game_over());
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::GameOver(_)))
        );
    }

    #[test]
    fn test_ten_orbs_level_up() {
        let mut state = warrior_state();
        let pos = player_pos(&state);
        state.character.health = 60;

        for _ in 0..10 {
            state.spawn_orb(pos);
        }
        let report = resolve_collisions(&mut state);

        assert_eq!(report.orbs_collected, 10);
        assert_eq!(report.levels_gained, 1);
        let c = &state.character;
        assert_eq!(c.level, 2);
        assert_eq!(c.experience, 0);
        assert_eq!(c.experience_to_next, 120);
        assert_eq!(c.attributes.vitality, 13);
        assert_eq!(c.max_health, 130);
        assert_eq!(c.health, 130);
    }

    #[test]
    fn test_kind_decides_outcome() {
        let mut state = warrior_state();
        let pos = player_pos(&state);

        let orb = EntityKind::classify(10.0);
        state.entities.spawn(orb, BoundingBox { pos, size: Vec2::splat(10.0) });
        resolve_collisions(&mut state);
        assert_eq!(state.character.experience, 10);
        assert_eq!(state.character.health, 120);

        for width in [20.0, 30.0] {
            let kind = EntityKind::classify(width);
            state.entities.spawn(kind, BoundingBox { pos, size: Vec2::splat(width) });
        }
        resolve_collisions(&mut state);
        assert_eq!(state.character.experience, 10);
        assert_eq!(state.character.health, 100);
    }

    #[test]
    fn test_non_overlapping_entities_untouched() {
        let mut state = warrior_state();
        state.spawn_orb(Vec2::new(0.0, 0.0));
        state.spawn_enemy(Vec2::new(1200.0, 650.0));
        let report = resolve_collisions(&mut state);
        assert_eq!(report, ResolveReport::default());
        assert_eq!(state.entities.len(), 2);
    }

    #[test]
    fn test_fatal_hit_stops_resolution() {
        let mut state = warrior_state();
        let pos = player_pos(&state);
        state.character.health = 10;
        // Back-to-front traversal visits the enemy (last) first
        state.spawn_orb(pos);
        state.spawn_enemy(pos);
        resolve_collisions(&mut state);
        assert!(state.is_game_over());
        assert_eq!(state.character.experience, 0);
        assert_eq!(state.entities.len(), 1);
    }

    #[test]
    fn test_interleaved_hits_resolve_once() {
        let mut state = warrior_state();
        let pos = player_pos(&state);

        let a = state.spawn_orb(pos);
        let far_enemy = state.spawn_enemy(Vec2::new(0.0, 0.0));
        let c = state.spawn_orb(pos + Vec2::splat(2.0));
        let far_orb = state.spawn_orb(Vec2::new(1200.0, 650.0));
        let e = state.spawn_orb(pos - Vec2::splat(2.0));

        let report = resolve_collisions(&mut state);
        assert_eq!(report.orbs_collected, 3);
        assert_eq!(report.enemies_hit, 0);
        assert_eq!(state.character.experience, 30);
        assert_eq!(state.character.health, 120);

        let mut survivors: Vec<_> = state.entities.iter().map(|e| e.id).collect();
        survivors.sort();
        assert_eq!(survivors, vec![far_enemy, far_orb]);
        for id in [a, c, e] {
            assert!(state.entities.get(id).is_none());
        }
        // Slots of moved entities still point at the right geometry
        assert_eq!(state.entities.get(far_enemy).unwrap().bounds.pos, Vec2::ZERO);
        assert_eq!(
            state.entities.get(far_orb).unwrap().bounds.pos,
            Vec2::new(1200.0, 650.0)
        );

        assert_eq!(resolve_collisions(&mut state), ResolveReport::default());
        assert_eq!(state.character.experience, 30);
    }

    #[test]
    fn test_game_over_freezes_resolution() {
        let mut state = warrior_state();
        state.phase = GamePhase::GameOver;
        let pos = player_pos(&state);
        state.spawn_orb(pos);
        assert_eq!(resolve_collisions(&mut state), ResolveReport::default());
        assert_eq!(state.entities.len(), 1);
    }

    fn arb_box() -> impl Strategy<Value = BoundingBox> {
        (-100.0f32..100.0, -100.0f32..100.0, 0.0f32..50.0, 0.0f32..50.0)
            .prop_map(|(x, y, w, h)| BoundingBox::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn collision_is_symmetric(a in arb_box(), b in arb_box()) {
            prop_assert_eq!(is_colliding(&a, &b), is_colliding(&b, &a));
        }
    }
}
