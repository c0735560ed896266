//! Enemies - archetypes, wave scaling and per-type movement.
//!
//! The catalog is data so new archetypes can be added from the config file.
//! The three canonical kinds have hand-written behaviour; any custom kind
//! simply homes in on the player.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::physics::Body;
use crate::config::{ImpAttackConfig, ProgressionConfig, Size, ms};

/// Half-width of the window around the player's x where pacing IMPs stop.
const IMP_DEAD_ZONE: f32 = 15.0;

/// Fraction of their speed IMPs use while pacing on the stop line.
const IMP_PACE_FACTOR: f32 = 0.9;

/// Flyers stop descending once they are this far above the player.
const FLYER_HOVER_MARGIN: f32 = 10.0;

const FLYER_DEAD_ZONE: f32 = 10.0;

/// Stable identity of a live enemy, used for pierce bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Descends to a stop line, paces under the player and shoots.
    Imp,
    /// Slow homing melee enemy. Its art faces the other way.
    Brute,
    /// Ignores gravity, dives to the player's altitude and strafes.
    Flyer,
    Custom(u16),
}

impl EnemyKind {
    /// Collision hitbox as a multiple of the display size. The oversized
    /// boxes are part of the game's balance.
    pub fn hitbox_scale(self) -> f32 {
        match self {
            EnemyKind::Imp => 5.0,
            EnemyKind::Brute => 4.5,
            EnemyKind::Flyer => 4.8,
            EnemyKind::Custom(_) => 1.5,
        }
    }

    /// Canonical kinds drop their tint entirely after a hit flash.
    pub fn is_canonical(self) -> bool {
        !matches!(self, EnemyKind::Custom(_))
    }

    pub fn has_gravity(self) -> bool {
        self != EnemyKind::Flyer
    }

    fn bounce(self) -> Vec2 {
        match self {
            EnemyKind::Flyer => Vec2::new(0.2, 0.0),
            _ => Vec2::new(0.2, 0.1),
        }
    }
}

/// Catalog entry an enemy is spawned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyArchetype {
    pub kind: EnemyKind,
    pub health: f32,
    pub speed: f32,
    pub damage: f32,
    pub score_value: u32,
    #[serde(default)]
    pub color: Option<u32>,
    pub size: Size,
    pub min_gold: u32,
    pub max_gold: u32,
}

/// Health for an enemy spawned in `wave`.
pub fn scaled_health(base: f32, wave: u32, endless: bool, progression: &ProgressionConfig) -> f32 {
    let growth = if endless {
        progression.endless_health_growth
    } else {
        progression.health_growth
    };
    (base * growth.powi(wave.saturating_sub(1) as i32)).ceil()
}

/// Speed for an enemy spawned in `wave`. The wave bonus is capped.
pub fn scaled_speed(base: f32, wave: u32, progression: &ProgressionConfig) -> f32 {
    let bonus = (wave.saturating_sub(1) as f32 * progression.speed_bonus_per_wave)
        .min(progression.max_speed_bonus);
    base * (1.0 + bonus)
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub body: Body,
    pub display_size: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,
    pub score_value: u32,
    pub min_gold: u32,
    pub max_gold: u32,
    /// Catalog tint, restored after hit flashes on custom kinds.
    pub color: Option<u32>,
    pub tint: Option<u32>,
    pub flip_x: bool,
    pub last_shot_at: Option<Duration>,
}

impl Enemy {
    pub fn spawn(
        id: EnemyId,
        archetype: &EnemyArchetype,
        position: Vec2,
        wave: u32,
        endless: bool,
        progression: &ProgressionConfig,
    ) -> Self {
        let kind = archetype.kind;
        let display_size = archetype.size.to_vec2();
        let health = scaled_health(archetype.health, wave, endless, progression);
        let body = Body::new(position, display_size)
            .with_hitbox(display_size * kind.hitbox_scale())
            .with_gravity(kind.has_gravity())
            .with_bounce(kind.bounce())
            .colliding_with_world();

        Self {
            id,
            kind,
            body,
            display_size,
            health,
            max_health: health,
            damage: archetype.damage,
            speed: scaled_speed(archetype.speed, wave, progression),
            score_value: archetype.score_value,
            min_gold: archetype.min_gold,
            max_gold: archetype.max_gold,
            color: archetype.color,
            tint: if kind.is_canonical() { None } else { archetype.color },
            flip_x: false,
            last_shot_at: None,
        }
    }

    /// Bounds of the drawn sprite, smaller than the hitbox.
    pub fn sprite_bounds(&self) -> Rect {
        Rect::from_center_size(self.body.position, self.display_size)
    }

    /// Apply damage. Returns true once the enemy is dead.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health -= amount;
        self.health <= 0.0
    }

    pub fn flash(&mut self, tint: u32) {
        self.tint = Some(tint);
    }

    pub fn revert_tint(&mut self) {
        self.tint = if self.kind.is_canonical() {
            None
        } else {
            self.color
        };
    }

    /// Set this tick's velocity from the enemy's behaviour toward `player`.
    pub fn steer(&mut self, player: Vec2, imp: &ImpAttackConfig) {
        let body = &mut self.body;
        match self.kind {
            EnemyKind::Imp if body.position.y < imp.stop_y => {
                body.gravity = true;
                body.move_toward(player, self.speed);
            }
            EnemyKind::Imp => {
                body.gravity = false;
                body.velocity.y = 0.0;
                body.position.y = imp.stop_y;
                body.velocity.x = pace(body.position.x, player.x, IMP_DEAD_ZONE, self.speed * IMP_PACE_FACTOR);
            }
            EnemyKind::Flyer if body.position.y < player.y - FLYER_HOVER_MARGIN => {
                body.move_toward(player, self.speed);
            }
            EnemyKind::Flyer => {
                body.velocity.y = 0.0;
                body.velocity.x = pace(body.position.x, player.x, FLYER_DEAD_ZONE, self.speed);
            }
            EnemyKind::Brute | EnemyKind::Custom(_) => {
                body.move_toward(player, self.speed);
            }
        }

        let moving_left = body.velocity.x < 0.0;
        if body.velocity.x != 0.0 {
            // Brute art is mirrored.
            self.flip_x = if self.kind == EnemyKind::Brute {
                !moving_left
            } else {
                moving_left
            };
        }
    }

    /// Whether an IMP should fire at `player` at session time `now`.
    pub fn wants_to_fire(&self, player: Vec2, now: Duration, imp: &ImpAttackConfig) -> bool {
        if self.kind != EnemyKind::Imp {
            return false;
        }
        let cooled_down = self
            .last_shot_at
            .is_none_or(|last| now > last + ms(imp.fire_rate_ms));
        cooled_down && self.body.position.distance(player) < imp.attack_range
    }
}

/// Horizontal velocity that closes on `target_x`, zero inside the dead zone.
fn pace(x: f32, target_x: f32, dead_zone: f32, speed: f32) -> f32 {
    if target_x < x - dead_zone {
        -speed
    } else if target_x > x + dead_zone {
        speed
    } else {
        0.0
    }
}
