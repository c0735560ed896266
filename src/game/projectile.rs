//! Projectiles - player bullets and hostile shots.
//!
//! Bullets snapshot damage and pierce from the player when fired and
//! remember every enemy they already hurt. Hostile shots come from IMPs and
//! the boss and only ever hurt the player.

use bevy::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

use super::{enemy::EnemyId, physics::Body};

/// Handle shared by every kind of projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectileId(pub u64);

#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: ProjectileId,
    pub body: Body,
    pub damage: f32,
    /// Remaining enemies this bullet may pass through.
    pub pierce: u32,
    /// Enemies already damaged; a bullet never hits the same one twice.
    pub hit: HashSet<EnemyId>,
    pub lifespan: Timer,
}

impl Bullet {
    pub fn new(id: ProjectileId, body: Body, damage: f32, pierce: u32, lifespan: Duration) -> Self {
        Self {
            id,
            body,
            damage,
            pierce,
            hit: HashSet::new(),
            lifespan: Timer::new(lifespan, TimerMode::Once),
        }
    }

    /// Record a hit on `enemy`. Returns false if it was already hit.
    pub fn register_hit(&mut self, enemy: EnemyId) -> bool {
        if !self.hit.insert(enemy) {
            return false;
        }
        self.pierce = self.pierce.saturating_sub(1);
        true
    }

    pub fn is_spent(&self) -> bool {
        self.pierce == 0
    }
}

/// Who fired a hostile projectile. Decides how it leaves the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileSource {
    Imp,
    Boss,
}

#[derive(Debug, Clone)]
pub struct EnemyProjectile {
    pub id: ProjectileId,
    pub source: ProjectileSource,
    pub body: Body,
    pub damage: f32,
    pub lifespan: Timer,
}

impl EnemyProjectile {
    pub fn new(
        id: ProjectileId,
        source: ProjectileSource,
        body: Body,
        damage: f32,
        lifespan: Duration,
    ) -> Self {
        Self {
            id,
            source,
            body,
            damage,
            lifespan: Timer::new(lifespan, TimerMode::Once),
        }
    }
}

/// Angles of a volley of `count` shots fanned symmetrically around `base`.
pub fn spread_angles(base: f32, count: u32, spread: f32) -> Vec<f32> {
    if count <= 1 {
        return vec![base];
    }
    let first = base - spread * (count - 1) as f32 / 2.0;
    (0..count).map(|i| first + i as f32 * spread).collect()
}

/// Velocity for a shot travelling at `angle` radians.
pub fn velocity_from_angle(angle: f32, speed: f32) -> Vec2 {
    Vec2::from_angle(angle) * speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn single_shot_follows_aim() {
        assert_eq!(spread_angles(0.3, 1, PI / 18.0), vec![0.3]);
    }

    #[test]
    fn volley_is_symmetric_around_aim() {
        let spread = PI / 18.0;
        let angles = spread_angles(0.0, 3, spread);
        assert_eq!(angles.len(), 3);
        assert!((angles[0] + spread).abs() < 1e-6);
        assert!(angles[1].abs() < 1e-6);
        assert!((angles[2] - spread).abs() < 1e-6);

        let pair = spread_angles(1.0, 2, spread);
        assert!(((pair[0] + pair[1]) / 2.0 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn bullet_hits_each_enemy_once() {
        let body = Body::new(Vec2::ZERO, Vec2::splat(16.0));
        let mut bullet = Bullet::new(ProjectileId(0), body, 1.0, 2, Duration::from_secs(1));

        assert!(bullet.register_hit(EnemyId(4)));
        assert!(!bullet.register_hit(EnemyId(4)));
        assert_eq!(bullet.pierce, 1);
        assert!(!bullet.is_spent());

        assert!(bullet.register_hit(EnemyId(5)));
        assert!(bullet.is_spent());
    }

    #[test]
    fn velocity_points_along_angle() {
        let velocity = velocity_from_angle(PI / 2.0, 400.0);
        assert!(velocity.x.abs() < 1e-3);
        assert!((velocity.y - 400.0).abs() < 1e-3);
    }
}
