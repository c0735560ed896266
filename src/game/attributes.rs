//! Player attributes - the mutable stat block upgrades and combat act on.
//!
//! Resets on every session start. Durations are kept in milliseconds so the
//! block can be written straight into the JSON config.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ms;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerAttributes {
    /// May be fractional and may dip below zero before the game-over check.
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    /// Cooldown between shots in milliseconds.
    pub fire_rate: f32,
    pub damage: f32,
    pub projectile_speed: f32,
    /// Bullet lifetime in milliseconds.
    pub projectile_lifespan: f32,
    pub pierce_count: u32,
    pub num_projectiles: u32,
    pub is_invincible: bool,
    pub invincibility_duration: f32,
    pub gold: u32,
    pub is_dashing: bool,
    pub dash_speed_multiplier: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    /// Session time of the last dash, `None` until the first one.
    #[serde(skip)]
    pub last_dash_time: Option<Duration>,
    pub celestial_fury_level: u32,
    pub celestial_fury_base_damage: f32,
    pub celestial_fury_damage_bonus_per_level: f32,
}

impl Default for PlayerAttributes {
    fn default() -> Self {
        Self {
            health: 10.0,
            max_health: 10.0,
            speed: 200.0,
            fire_rate: 500.0,
            damage: 1.0,
            projectile_speed: 400.0,
            projectile_lifespan: 1500.0,
            pierce_count: 1,
            num_projectiles: 1,
            is_invincible: false,
            invincibility_duration: 750.0,
            gold: 0,
            is_dashing: false,
            dash_speed_multiplier: 3.5,
            dash_duration: 180.0,
            dash_cooldown: 750.0,
            last_dash_time: None,
            celestial_fury_level: 0,
            celestial_fury_base_damage: 4.0,
            celestial_fury_damage_bonus_per_level: 2.0,
        }
    }
}

impl PlayerAttributes {
    /// Restore health, never above the maximum.
    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Restore health to the maximum.
    pub fn heal_full(&mut self) {
        self.health = self.max_health;
    }

    /// Raise the maximum and heal by the same amount.
    pub fn raise_max_health(&mut self, amount: f32) {
        self.max_health += amount;
        self.heal(amount);
    }

    /// Subtract damage without clamping. Returns true once health is gone.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health -= amount;
        self.health <= 0.0
    }

    /// Lower the shot cooldown by `factor`, floored at `floor` milliseconds.
    pub fn scale_fire_rate(&mut self, factor: f32, floor: f32) {
        self.fire_rate = (self.fire_rate * factor).max(floor);
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    /// Whether the dash cooldown has elapsed at session time `now`.
    pub fn dash_ready(&self, now: Duration) -> bool {
        self.last_dash_time
            .is_none_or(|last| now >= last + ms(self.dash_cooldown))
    }

    /// Damage of a single celestial-fury strike at the current level.
    pub fn celestial_fury_damage(&self) -> f32 {
        let extra_levels = self.celestial_fury_level.saturating_sub(1) as f32;
        self.celestial_fury_base_damage + extra_levels * self.celestial_fury_damage_bonus_per_level
    }
}
