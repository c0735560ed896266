//! Combat resolution - what happens when two bodies overlap.
//!
//! After the physics step a broad-phase pass pairs up overlapping bodies
//! and each pair is routed through one resolver. Resolvers look their
//! participants up by id, so a body removed earlier in the same pass is
//! simply skipped.

use bevy::prelude::*;

use super::{
    enemy::EnemyId,
    flow::FlowState,
    gold::{GoldDrop, GoldId, roll_gold_drop},
    physics::overlapping_pairs,
    player::HIT_ALPHA,
    projectile::ProjectileId,
    session::Session,
    signals::{SoundCue, Signal, VisualCue},
    timers::Deferred,
};
use crate::config::ms;

/// Tint of an enemy hit by a bullet.
pub const BULLET_HIT_TINT: u32 = 0xff8888;

/// Tint of an enemy struck by lightning.
pub const LIGHTNING_HIT_TINT: u32 = 0xffff99;

/// How long a hit tint stays on an enemy or the boss, in milliseconds.
pub const HIT_FLASH_MS: f32 = 100.0;

/// How long the player stays translucent after a hit, in milliseconds.
const PLAYER_FLASH_MS: f32 = 200.0;

const KNOCKBACK_X: f32 = 150.0;
const KNOCKBACK_Y: f32 = -100.0;

/// Impulse pushing an enemy away from the player after contact.
pub fn knockback(enemy_x: f32, player_x: f32) -> Vec2 {
    if enemy_x < player_x {
        Vec2::new(-KNOCKBACK_X, KNOCKBACK_Y)
    } else {
        Vec2::new(KNOCKBACK_X, KNOCKBACK_Y)
    }
}

impl Session {
    /// Route every overlapping pair of this step through its resolver.
    pub(crate) fn resolve_collisions(&mut self) {
        let bullets: Vec<(ProjectileId, Rect)> =
            self.bullets.iter().map(|b| (b.id, b.body.bounds())).collect();
        let enemies: Vec<(EnemyId, Rect)> =
            self.enemies.iter().map(|e| (e.id, e.body.bounds())).collect();
        for (bullet, enemy) in overlapping_pairs(&bullets, &enemies) {
            self.bullet_hit_enemy(bullet, enemy);
        }

        if let Some(boss) = &self.boss {
            let boss_bounds = [((), boss.body.bounds())];
            let bullets: Vec<(ProjectileId, Rect)> =
                self.bullets.iter().map(|b| (b.id, b.body.bounds())).collect();
            for (bullet, ()) in overlapping_pairs(&bullets, &boss_bounds) {
                self.bullet_hit_boss(bullet);
            }
        }

        let player = [((), self.player.body.bounds())];
        let enemies: Vec<(EnemyId, Rect)> =
            self.enemies.iter().map(|e| (e.id, e.body.bounds())).collect();
        for ((), enemy) in overlapping_pairs(&player, &enemies) {
            self.player_hit_by_enemy(enemy);
        }

        let shots: Vec<(ProjectileId, Rect)> = self
            .enemy_projectiles
            .iter()
            .map(|p| (p.id, p.body.bounds()))
            .collect();
        for ((), shot) in overlapping_pairs(&player, &shots) {
            self.player_hit_by_projectile(shot);
        }

        let gold: Vec<(GoldId, Rect)> = self.gold.iter().map(|g| (g.id, g.body.bounds())).collect();
        for ((), drop) in overlapping_pairs(&player, &gold) {
            self.collect_gold(drop);
        }
    }

    fn bullet_hit_enemy(&mut self, bullet_id: ProjectileId, enemy_id: EnemyId) {
        if self.flow == FlowState::GameOver || self.enemy(enemy_id).is_none() {
            return;
        }
        let Some(index) = self.bullets.iter().position(|b| b.id == bullet_id) else {
            return;
        };

        let bullet = &mut self.bullets[index];
        if !bullet.register_hit(enemy_id) {
            return;
        }
        let damage = bullet.damage;
        if bullet.is_spent() {
            self.bullets.swap_remove(index);
        }
        self.damage_enemy(enemy_id, damage, BULLET_HIT_TINT);
    }

    /// Apply damage from any source, killing or flashing the enemy.
    pub(crate) fn damage_enemy(&mut self, enemy_id: EnemyId, amount: f32, tint: u32) {
        let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == enemy_id) else {
            return;
        };
        let dead = enemy.take_damage(amount);
        let position = enemy.body.position;
        if !dead {
            enemy.flash(tint);
        }

        self.emit(Signal::Effect(VisualCue::DamageNumber { position, amount }));
        if dead {
            self.kill_enemy(enemy_id);
        } else {
            self.timers
                .after(ms(HIT_FLASH_MS), Deferred::RevertEnemyTint(enemy_id));
        }
    }

    /// Remove a dead enemy, drop its gold and count the kill.
    fn kill_enemy(&mut self, enemy_id: EnemyId) {
        let Some(index) = self.enemies.iter().position(|e| e.id == enemy_id) else {
            return;
        };
        let enemy = self.enemies.swap_remove(index);
        debug!("{:?} {:?} killed", enemy.kind, enemy.id);

        self.emit(Signal::Effect(VisualCue::BloodBurst {
            position: enemy.body.position,
            size: enemy.display_size.x,
        }));
        // Custom kinds have no death sound.
        if enemy.kind.is_canonical() {
            self.emit(Signal::Sound(SoundCue::EnemyDeath {
                kind: enemy.kind,
                volume: self.audio.sfx_volume,
            }));
        }

        let value = roll_gold_drop(&mut self.rng, enemy.min_gold, enemy.max_gold);
        if value > 0 {
            let id = GoldId(self.next_id());
            let drop = GoldDrop::new(id, enemy.body.position, value, &self.config.gold);
            self.gold.push(drop);
        }

        self.after_kill();
    }

    pub(crate) fn revert_enemy_tint(&mut self, enemy_id: EnemyId) {
        if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == enemy_id) {
            enemy.revert_tint();
        }
    }

    fn player_hit_by_enemy(&mut self, enemy_id: EnemyId) {
        if self.attributes.is_dashing || self.attributes.is_invincible || !self.flow.is_simulating() {
            return;
        }
        let Some(enemy) = self.enemy(enemy_id) else {
            return;
        };
        let damage = enemy.damage;
        let enemy_x = enemy.body.position.x;

        self.damage_player(damage);
        let push = knockback(enemy_x, self.player.body.position.x);
        if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == enemy_id) {
            enemy.body.velocity = push;
        }
        self.check_defeat();
    }

    fn player_hit_by_projectile(&mut self, shot_id: ProjectileId) {
        let Some(index) = self.enemy_projectiles.iter().position(|p| p.id == shot_id) else {
            return;
        };
        let shot = self.enemy_projectiles.swap_remove(index);
        if self.attributes.is_dashing || self.attributes.is_invincible || !self.flow.is_simulating() {
            return;
        }

        self.damage_player(shot.damage);
        self.check_defeat();
    }

    /// Hurt the player and open the invincibility window.
    fn damage_player(&mut self, amount: f32) {
        self.attributes.is_invincible = true;
        self.attributes.take_damage(amount);
        self.player.alpha = HIT_ALPHA;
        debug!("Player took {} damage, {} left", amount, self.attributes.health);

        self.timers
            .after(ms(PLAYER_FLASH_MS), Deferred::RestorePlayerAlpha);
        self.timers.after(
            ms(self.attributes.invincibility_duration),
            Deferred::ClearInvincibility,
        );
        self.emit_ui();
    }

    fn check_defeat(&mut self) {
        if self.attributes.is_defeated() {
            self.set_flow_state(FlowState::GameOver);
        }
    }

    fn collect_gold(&mut self, gold_id: GoldId) {
        let Some(index) = self.gold.iter().position(|g| g.id == gold_id) else {
            return;
        };
        let drop = self.gold.swap_remove(index);
        self.attributes.gold += drop.value;
        self.emit_ui();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knockback_pushes_enemy_away_and_up() {
        assert_eq!(knockback(100.0, 400.0), Vec2::new(-150.0, -100.0));
        assert_eq!(knockback(500.0, 400.0), Vec2::new(150.0, -100.0));
    }
}
