//! Celestial Fury - periodic lightning strikes unlocked by upgrades.
//!
//! Every period the player calls down one bolt per level, a few
//! milliseconds apart, at random columns. A bolt hurts every enemy and the
//! boss whose sprite touches its corridor.

use bevy::prelude::*;
use rand::Rng;

use super::{
    combat::LIGHTNING_HIT_TINT,
    enemy::EnemyId,
    physics::overlaps,
    session::Session,
    signals::{Signal, VisualCue},
    timers::Deferred,
};
use crate::config::{ArenaConfig, ms};

/// Impact markers never sit lower than this above the arena floor.
const IMPACT_FLOOR_OFFSET: f32 = 30.0;

/// Height above the arena floor of the ground impact marker.
const GROUND_IMPACT_OFFSET: f32 = 20.0;

/// Full-height strike column centered on `x`.
pub fn strike_corridor(x: f32, width: f32, arena: &ArenaConfig) -> Rect {
    Rect::new(x - width / 2.0, 0.0, x + width / 2.0, arena.height)
}

impl Session {
    /// Start or stop the strike cadence to match the current level.
    pub(crate) fn sync_celestial_fury(&mut self) {
        let level = self.attributes.celestial_fury_level;
        match (level > 0, self.fury_timer) {
            (true, None) => {
                let period = ms(self.config.celestial_fury.period_ms);
                self.fury_timer = Some(self.timers.every(period, Deferred::CelestialFury));
                info!("Celestial fury active at level {}", level);
            }
            (false, Some(timer)) => {
                self.timers.cancel(timer);
                self.fury_timer = None;
            }
            _ => {}
        }
    }

    /// One cadence tick: schedule this period's bolts.
    pub(crate) fn celestial_fury(&mut self) {
        let level = self.attributes.celestial_fury_level;
        if !self.flow.is_simulating() || level == 0 {
            return;
        }
        let damage = self.attributes.celestial_fury_damage();
        let stagger = self.config.celestial_fury.stagger_ms;

        self.lightning_strike(damage);
        for i in 1..level {
            self.timers.after(
                ms(i as f32 * stagger),
                Deferred::LightningStrike { damage },
            );
        }
    }

    pub(crate) fn lightning_strike(&mut self, damage: f32) {
        if !self.flow.is_simulating() {
            return;
        }
        let arena = &self.config.arena;
        let fury = &self.config.celestial_fury;
        let low = fury.edge_margin;
        let high = (arena.width - fury.edge_margin).max(low);
        let x = self.rng.random_range(low..=high);
        let corridor = strike_corridor(x, fury.strike_width, arena);
        let impact_floor = arena.height - IMPACT_FLOOR_OFFSET;
        let ground_impact = Vec2::new(x, arena.height - GROUND_IMPACT_OFFSET);

        self.emit(Signal::Effect(VisualCue::LightningBolt { x }));

        let struck: Vec<(EnemyId, f32)> = self
            .enemies
            .iter()
            .filter(|enemy| overlaps(corridor, enemy.sprite_bounds()))
            .map(|enemy| (enemy.id, enemy.body.position.y))
            .collect();
        for (enemy, y) in struck {
            self.emit(Signal::Effect(VisualCue::LightningImpact {
                position: Vec2::new(x, y.min(impact_floor)),
            }));
            self.damage_enemy(enemy, damage, LIGHTNING_HIT_TINT);
        }

        if self
            .boss
            .as_ref()
            .is_some_and(|boss| overlaps(corridor, boss.sprite_bounds()))
        {
            self.damage_boss(damage);
        }

        self.emit(Signal::Effect(VisualCue::LightningImpact {
            position: ground_impact,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corridor_spans_full_arena_height() {
        let arena = ArenaConfig::default();
        let corridor = strike_corridor(100.0, 30.0, &arena);
        assert_eq!(corridor.min, Vec2::new(85.0, 0.0));
        assert_eq!(corridor.max, Vec2::new(115.0, 600.0));
    }
}
