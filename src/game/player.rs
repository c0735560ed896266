//! The player - movement, shooting and the dash.

use bevy::prelude::*;

use super::{
    physics::Body,
    projectile::{Bullet, ProjectileId, spread_angles, velocity_from_angle},
    session::Session,
    signals::{Intents, SoundCue, Signal, VisualCue},
    timers::Deferred,
};
use crate::config::{PlayerConfig, ms};

/// Player opacity while dashing.
pub const DASH_ALPHA: f32 = 0.6;

/// Player opacity right after taking a hit.
pub const HIT_ALPHA: f32 = 0.5;

/// Speeds at or below this count as standing still when picking a dash direction.
const DASH_MOVE_THRESHOLD: f32 = 1.0;

/// Horizontal velocity kept when a dash ends.
const DASH_EXIT_DAMPING: f32 = 0.15;

/// Shot sounds play quieter than the effects volume.
const SHOOT_VOLUME_FACTOR: f32 = 0.8;

#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    /// True when the sprite faces left.
    pub flip_x: bool,
    pub alpha: f32,
    pub tint: Option<u32>,
    pub last_trail_at: Option<std::time::Duration>,
}

impl Player {
    pub fn new(config: &PlayerConfig) -> Self {
        let [x, y] = config.spawn;
        Self {
            body: Body::new(Vec2::new(x, y), config.body_size.to_vec2())
                .with_gravity(true)
                .with_bounce(Vec2::splat(0.1))
                .colliding_with_world(),
            flip_x: false,
            alpha: 1.0,
            tint: None,
            last_trail_at: None,
        }
    }

    fn facing(&self) -> f32 {
        if self.flip_x { -1.0 } else { 1.0 }
    }
}

/// Unit direction of a dash. A moving player dashes along its velocity,
/// snapped to horizontal when running along the ground; a still player
/// dashes the way it faces.
pub fn dash_direction(velocity: Vec2, grounded: bool, facing: f32) -> Vec2 {
    let moving = velocity.x.abs() > DASH_MOVE_THRESHOLD || velocity.y.abs() > DASH_MOVE_THRESHOLD;
    if !moving {
        return Vec2::new(facing, 0.0);
    }

    let direction = velocity.normalize_or_zero();
    if grounded && velocity.x.abs() > velocity.y.abs() * 1.1 {
        let x = if direction.x.abs() < 0.1 {
            facing
        } else {
            direction.x.signum()
        };
        return Vec2::new(x, 0.0);
    }
    if direction.length_squared() < 1e-4 {
        Vec2::new(facing, 0.0)
    } else {
        direction
    }
}

impl Session {
    /// Run and jump from held intents, and fire when asked.
    pub(crate) fn drive_player(&mut self, intents: &Intents) {
        let speed = self.attributes.speed;
        let player = &mut self.player;
        if intents.left {
            player.body.velocity.x = -speed;
            player.flip_x = true;
        } else if intents.right {
            player.body.velocity.x = speed;
            player.flip_x = false;
        } else {
            player.body.velocity.x = 0.0;
        }

        if intents.jump && player.body.blocked_down {
            player.body.velocity.y = -self.config.player.jump_strength;
        }

        if intents.fire {
            self.shoot(intents.aim);
        }
    }

    /// Fire a volley at `target` if the shot cooldown has elapsed.
    pub(crate) fn shoot(&mut self, target: Vec2) {
        if self
            .last_shot_at
            .is_some_and(|last| self.clock < last + ms(self.attributes.fire_rate))
        {
            return;
        }
        self.last_shot_at = Some(self.clock);
        self.emit(Signal::Sound(SoundCue::Shoot {
            volume: self.audio.sfx_volume * SHOOT_VOLUME_FACTOR,
        }));

        let config = &self.config.player;
        let origin = self.player.body.position + Vec2::new(config.muzzle_offset * self.player.facing(), 0.0);
        let aim = target - origin;
        let base_angle = aim.y.atan2(aim.x);
        let spread = config.spread_degrees.to_radians();
        let bullet_size = config.bullet_size.to_vec2();
        let max_bullets = config.max_bullets;

        for angle in spread_angles(base_angle, self.attributes.num_projectiles, spread) {
            if self.bullets.len() >= max_bullets {
                debug!("Bullet pool exhausted, dropping shot");
                break;
            }
            let id = ProjectileId(self.next_id());
            let body = Body::new(origin, bullet_size)
                .with_velocity(velocity_from_angle(angle, self.attributes.projectile_speed));
            self.bullets.push(Bullet::new(
                id,
                body,
                self.attributes.damage,
                self.attributes.pierce_count,
                ms(self.attributes.projectile_lifespan),
            ));
        }
    }

    /// Start a dash unless one is running or the cooldown has not elapsed.
    pub(crate) fn try_dash(&mut self) {
        if self.attributes.is_dashing || !self.attributes.dash_ready(self.clock) {
            return;
        }

        self.attributes.is_dashing = true;
        self.attributes.last_dash_time = Some(self.clock);
        self.player.last_trail_at = Some(self.clock);

        let direction = dash_direction(
            self.player.body.velocity,
            self.player.body.blocked_down,
            self.player.facing(),
        );
        let dash_speed = self.attributes.speed * self.attributes.dash_speed_multiplier;
        self.player.body.gravity = false;
        self.player.body.velocity = direction * dash_speed;
        self.player.alpha = DASH_ALPHA;

        if let Some(previous) = self.dash_timer.take() {
            self.timers.cancel(previous);
        }
        self.dash_timer = Some(
            self.timers
                .after(ms(self.attributes.dash_duration), Deferred::EndDash),
        );
        debug!("Dash started toward {:?}", direction);
    }

    pub(crate) fn end_dash(&mut self) {
        self.dash_timer = None;
        if !self.attributes.is_dashing {
            return;
        }
        self.attributes.is_dashing = false;
        self.player.body.gravity = true;
        self.player.body.velocity.x *= DASH_EXIT_DAMPING;
        self.player.alpha = 1.0;
    }

    /// Leave a fading marker behind a dashing player at a fixed cadence.
    pub(crate) fn spawn_dash_trail(&mut self) {
        let dash = &self.config.dash;
        let due = self
            .player
            .last_trail_at
            .is_none_or(|last| self.clock > last + ms(dash.trail_interval_ms));
        if !due {
            return;
        }
        self.player.last_trail_at = Some(self.clock);
        let cue = VisualCue::DashTrail {
            position: self.player.body.position,
            lifetime_ms: dash.trail_lifetime_ms,
        };
        self.emit(Signal::Effect(cue));
    }

    pub(crate) fn restore_player_alpha(&mut self) {
        self.player.alpha = if self.attributes.is_dashing {
            DASH_ALPHA
        } else {
            1.0
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_on_ground_dashes_horizontally() {
        assert_eq!(dash_direction(Vec2::new(200.0, 0.0), true, 1.0), Vec2::X);
        assert_eq!(dash_direction(Vec2::new(-200.0, 30.0), true, 1.0), Vec2::NEG_X);
    }

    #[test]
    fn airborne_dash_follows_velocity() {
        let direction = dash_direction(Vec2::new(300.0, -400.0), false, 1.0);
        assert!((direction - Vec2::new(0.6, -0.8)).length() < 1e-5);
    }

    #[test]
    fn standing_still_dashes_the_way_the_player_faces() {
        assert_eq!(dash_direction(Vec2::new(0.5, 0.0), true, -1.0), Vec2::NEG_X);
        assert_eq!(dash_direction(Vec2::ZERO, false, 1.0), Vec2::X);
    }

    #[test]
    fn falling_on_ground_keeps_vertical_component() {
        // Vertical speed dominates, so no horizontal snap.
        let direction = dash_direction(Vec2::new(10.0, 200.0), true, 1.0);
        assert!(direction.y > 0.9);
    }
}
