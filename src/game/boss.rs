//! The boss encounter.
//!
//! The boss's health is fixed at spawn from the player's damage at that
//! moment, so it scales with the player's power rather than the wave. It
//! patrols a band near the top of the arena and picks one of three attack
//! patterns on a fixed cadence.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use super::{
    combat::HIT_FLASH_MS,
    flow::FlowState,
    physics::Body,
    projectile::{EnemyProjectile, ProjectileId, ProjectileSource},
    session::Session,
    signals::{Signal, VisualCue},
    timers::{Deferred, TimerId},
};
use crate::config::{BossProjectileConfig, ms};

/// Tint of the boss while it flashes after a hit.
pub const BOSS_HIT_TINT: u32 = 0xffaaaa;

#[derive(Debug, Clone)]
pub struct Boss {
    pub name: String,
    pub body: Body,
    pub display_size: Vec2,
    pub health: f32,
    /// Snapshot taken at spawn, never changes during the fight.
    pub max_health: f32,
    pub tint: Option<u32>,
    /// Current patrol destination.
    pub target: Option<Vec2>,
    attack_timer: TimerId,
    move_timer: TimerId,
}

impl Boss {
    pub fn sprite_bounds(&self) -> Rect {
        Rect::from_center_size(self.body.position, self.display_size)
    }

    /// Head for the patrol target, stopping once it is reached.
    pub fn patrol(&mut self, speed: f32, dt: f32) {
        let Some(target) = self.target else {
            return;
        };
        if self.body.position.distance(target) <= speed * dt {
            self.body.position = target;
            self.body.velocity = Vec2::ZERO;
            self.target = None;
        } else {
            self.body.move_toward(target, speed);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossAttack {
    /// One large shot aimed where the player stands.
    Fastball,
    /// A ring of shots in every direction.
    Nova,
    /// Staggered shots falling from above the arena.
    Meteors,
}

impl BossAttack {
    pub const ALL: [BossAttack; 3] = [BossAttack::Fastball, BossAttack::Nova, BossAttack::Meteors];
}

/// Velocities of `count` shots evenly spread around a full circle.
pub fn nova_velocities(count: u32, speed: f32) -> Vec<Vec2> {
    (0..count)
        .map(|i| Vec2::from_angle(i as f32 / count as f32 * TAU) * speed)
        .collect()
}

impl Session {
    /// Start the boss fight. Ignored during a fight or after game over.
    pub(crate) fn trigger_boss(&mut self) {
        if matches!(self.flow, FlowState::BossFight | FlowState::GameOver) {
            return;
        }

        self.enemies.clear();
        if let Some(spawn) = self.spawn_timer {
            self.timers.set_paused(spawn, true);
        }
        self.set_flow_state(FlowState::BossFight);

        let config = &self.config.boss;
        let health = self.attributes.damage * config.health_multiplier;
        let display_size = config.display_size.to_vec2();
        let [x, y] = config.spawn;
        let body = Body::new(Vec2::new(x, y), display_size)
            .with_hitbox(display_size * config.hitbox_scale)
            .colliding_with_world();
        let name = config.name.clone();
        let attack_timer = self
            .timers
            .every(ms(config.attack_interval_ms), Deferred::BossAttack);
        let move_timer = self
            .timers
            .every(ms(config.move_interval_ms), Deferred::BossMove);

        info!("{} spawned with {} health", name, health);
        self.emit(Signal::BossSpawned {
            name: name.clone(),
            max_health: health,
        });
        self.boss = Some(Boss {
            name,
            body,
            display_size,
            health,
            max_health: health,
            tint: None,
            target: None,
            attack_timer,
            move_timer,
        });
    }

    /// Pick a fresh patrol point inside the boss's band.
    pub(crate) fn move_boss(&mut self) {
        if self.flow != FlowState::BossFight {
            return;
        }
        let config = &self.config.boss;
        let width = self.config.arena.width;
        let x = self
            .rng
            .random_range(width * config.patrol_x[0]..=width * config.patrol_x[1]);
        let y = self
            .rng
            .random_range(config.patrol_y[0]..=config.patrol_y[1]);
        let speed = config.speed;
        if let Some(boss) = self.boss.as_mut() {
            boss.target = Some(Vec2::new(x, y));
            boss.body.move_toward(Vec2::new(x, y), speed);
        }
    }

    pub(crate) fn boss_attack(&mut self) {
        if self.flow != FlowState::BossFight || self.boss.is_none() {
            return;
        }
        let index = self.rng.random_range(0..BossAttack::ALL.len());
        let attack = BossAttack::ALL[index];
        debug!("Boss attack: {:?}", attack);

        match attack {
            BossAttack::Fastball => self.boss_fastball(),
            BossAttack::Nova => self.boss_nova(),
            BossAttack::Meteors => {
                let config = &self.config.boss;
                let (count, stagger) = (config.meteor_count, config.meteor_stagger_ms);
                self.spawn_meteor();
                for i in 1..count {
                    self.timers
                        .after(ms(i as f32 * stagger), Deferred::Meteor);
                }
            }
        }
    }

    fn boss_fastball(&mut self) {
        let Some(origin) = self.boss.as_ref().map(|boss| boss.body.position) else {
            return;
        };
        let config = self.config.boss.fastball.clone();
        let velocity = (self.player.body.position - origin).normalize_or_zero() * config.speed;
        self.spawn_boss_projectile(origin, velocity, &config);
    }

    fn boss_nova(&mut self) {
        let Some(origin) = self.boss.as_ref().map(|boss| boss.body.position) else {
            return;
        };
        let config = self.config.boss.nova.clone();
        for velocity in nova_velocities(self.config.boss.nova_count, config.speed) {
            self.spawn_boss_projectile(origin, velocity, &config);
        }
    }

    /// Drop one meteor at a random column. Skipped once the fight is over.
    pub(crate) fn spawn_meteor(&mut self) {
        if self.flow != FlowState::BossFight || self.boss.is_none() {
            return;
        }
        let config = self.config.boss.meteor.clone();
        let x = self.rng.random_range(0.0..=self.config.arena.width);
        let origin = Vec2::new(x, self.config.boss.meteor_spawn_y);
        self.spawn_boss_projectile(origin, Vec2::new(0.0, config.speed), &config);
    }

    fn spawn_boss_projectile(&mut self, origin: Vec2, velocity: Vec2, config: &BossProjectileConfig) {
        let id = ProjectileId(self.next_id());
        let body = Body::new(origin, config.size.to_vec2()).with_velocity(velocity);
        self.enemy_projectiles.push(EnemyProjectile::new(
            id,
            ProjectileSource::Boss,
            body,
            config.damage,
            ms(config.lifespan_ms),
        ));
    }

    /// Bullets always break on the boss, whatever their pierce.
    pub(crate) fn bullet_hit_boss(&mut self, bullet_id: ProjectileId) {
        if self.boss.is_none() {
            return;
        }
        let Some(index) = self.bullets.iter().position(|b| b.id == bullet_id) else {
            return;
        };
        let bullet = self.bullets.swap_remove(index);
        self.damage_boss(bullet.damage);
    }

    pub(crate) fn damage_boss(&mut self, amount: f32) {
        let Some(boss) = self.boss.as_mut() else {
            return;
        };
        boss.health -= amount;
        let (position, current_health, max_health) = (boss.body.position, boss.health, boss.max_health);
        let defeated = current_health <= 0.0;
        if !defeated {
            boss.tint = Some(BOSS_HIT_TINT);
        }

        self.emit(Signal::Effect(VisualCue::DamageNumber { position, amount }));
        self.emit(Signal::BossHealthUpdate {
            current_health,
            max_health,
        });
        if defeated {
            self.defeat_boss();
        } else {
            self.timers
                .after(ms(HIT_FLASH_MS), Deferred::RevertBossTint);
        }
    }

    pub(crate) fn revert_boss_tint(&mut self) {
        if let Some(boss) = self.boss.as_mut() {
            boss.tint = None;
        }
    }

    fn defeat_boss(&mut self) {
        let Some(boss) = self.boss.take() else {
            return;
        };
        self.timers.cancel(boss.attack_timer);
        self.timers.cancel(boss.move_timer);
        self.enemy_projectiles
            .retain(|shot| shot.source != ProjectileSource::Boss);

        info!("{} defeated", boss.name);
        self.set_flow_state(FlowState::BossDefeated);
        self.emit(Signal::BossDefeatedShowScreen);
    }

    /// Keep playing after the boss with steeper enemy scaling.
    pub(crate) fn continue_endless(&mut self) {
        if self.flow != FlowState::BossDefeated {
            warn!("Endless mode requested in {:?}, ignoring", self.flow);
            return;
        }
        self.progression.endless = true;
        info!("Endless mode started");
        self.set_flow_state(FlowState::Playing);
    }

    pub(crate) fn end_run(&mut self) {
        if self.flow != FlowState::BossDefeated {
            warn!("End run requested in {:?}, ignoring", self.flow);
            return;
        }
        self.restart();
    }
}
