//! The simulation session - one run of the game, start to finish.
//!
//! A [`Session`] owns every entity, counter and timer of a run. The host
//! drives it with [`Session::tick`] and [`Session::handle`], and reads back
//! what happened with [`Session::drain_signals`]. Nothing here is global:
//! dropping or disposing the session cancels everything it scheduled.

use bevy::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use std::time::Duration;

use super::{
    attributes::PlayerAttributes,
    boss::Boss,
    enemy::{Enemy, EnemyId, EnemyKind},
    flow::{FlowState, MusicState},
    gold::GoldDrop,
    physics::Body,
    player::Player,
    progression::Progression,
    projectile::{Bullet, EnemyProjectile, ProjectileId, ProjectileSource},
    signals::{Command, Intents, Signal, UiSnapshot},
    timers::{Deferred, TimerId, TimerRegistry},
    upgrades::Upgrade,
};
use crate::{
    audio::AudioSettings,
    config::{GameConfig, ms},
};

#[derive(Resource)]
pub struct Session {
    pub(crate) config: GameConfig,
    pub(crate) rng: StdRng,
    pub(crate) timers: TimerRegistry,
    pub(crate) signals: Vec<Signal>,
    pub(crate) flow: FlowState,
    /// Where a resume from the pause menu returns to.
    pub(crate) resume_to: FlowState,
    pub(crate) music: MusicState,
    pub(crate) audio: AudioSettings,
    /// Simulated time; only advances while the run simulates.
    pub(crate) clock: Duration,
    pub(crate) attributes: PlayerAttributes,
    pub(crate) progression: Progression,
    pub(crate) player: Player,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) bullets: Vec<Bullet>,
    pub(crate) enemy_projectiles: Vec<EnemyProjectile>,
    pub(crate) gold: Vec<GoldDrop>,
    pub(crate) boss: Option<Boss>,
    /// Choices shown by the open upgrade selection.
    pub(crate) offered_upgrades: Vec<Upgrade>,
    pub(crate) last_shot_at: Option<Duration>,
    pub(crate) spawn_timer: Option<TimerId>,
    pub(crate) dash_timer: Option<TimerId>,
    pub(crate) fury_timer: Option<TimerId>,
    next_id: u64,
    disposed: bool,
}

impl Session {
    /// Start a run seeded from the operating system.
    pub fn new(config: GameConfig, audio: AudioSettings) -> Self {
        Self::with_rng(config, audio, StdRng::from_os_rng())
    }

    /// Start a run with a fixed seed, for tests and reproducible runs.
    pub fn with_seed(config: GameConfig, audio: AudioSettings, seed: u64) -> Self {
        Self::with_rng(config, audio, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, audio: AudioSettings, rng: StdRng) -> Self {
        let mut session = Self {
            attributes: config.player.attributes.clone(),
            progression: Progression::new(&config.progression),
            player: Player::new(&config.player),
            config,
            rng,
            timers: TimerRegistry::default(),
            signals: Vec::new(),
            flow: FlowState::Playing,
            resume_to: FlowState::Playing,
            music: MusicState::Stopped,
            audio: audio.clamped(),
            clock: Duration::ZERO,
            enemies: Vec::new(),
            bullets: Vec::new(),
            enemy_projectiles: Vec::new(),
            gold: Vec::new(),
            boss: None,
            offered_upgrades: Vec::new(),
            last_shot_at: None,
            spawn_timer: None,
            dash_timer: None,
            fury_timer: None,
            next_id: 0,
            disposed: false,
        };
        session.begin();
        session
    }

    /// Put a freshly reset session into play.
    fn begin(&mut self) {
        let delay = ms(self.progression.spawn_delay_ms);
        self.spawn_timer = Some(self.timers.every(delay, Deferred::SpawnEnemy));
        self.sync_celestial_fury();
        self.start_music();
        self.emit_ui();
        info!("Session started");
    }

    /// Throw the current run away and start over with the same config,
    /// volumes and random stream. Every pending timer is cancelled.
    pub fn restart(&mut self) {
        if self.disposed {
            return;
        }
        info!("Restarting session");
        self.stop_music();
        self.timers.clear();
        self.flow = FlowState::Playing;
        self.resume_to = FlowState::Playing;
        self.clock = Duration::ZERO;
        self.attributes = self.config.player.attributes.clone();
        self.progression = Progression::new(&self.config.progression);
        self.player = Player::new(&self.config.player);
        self.enemies.clear();
        self.bullets.clear();
        self.enemy_projectiles.clear();
        self.gold.clear();
        self.boss = None;
        self.offered_upgrades.clear();
        self.last_shot_at = None;
        self.spawn_timer = None;
        self.dash_timer = None;
        self.fury_timer = None;
        self.emit(Signal::PauseOverlay { paused: false });
        self.begin();
    }

    /// Cancel everything. A disposed session ignores ticks and commands.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.stop_music();
        self.timers.clear();
        self.enemies.clear();
        self.bullets.clear();
        self.enemy_projectiles.clear();
        self.gold.clear();
        self.boss = None;
        self.spawn_timer = None;
        self.dash_timer = None;
        self.fury_timer = None;
        self.disposed = true;
        info!("Session disposed");
    }

    /// Apply one inbound command.
    pub fn handle(&mut self, command: Command) {
        if self.disposed {
            return;
        }
        debug!("Command: {:?}", command);
        match command {
            Command::TogglePause => self.toggle_pause(),
            Command::Resume => self.resume(),
            Command::ChooseUpgrade(id) => self.choose_upgrade(&id),
            Command::PurchaseItem(id) => self.purchase(&id),
            Command::CloseShop => self.close_shop(),
            Command::Restart => self.restart(),
            Command::ContinueEndless => self.continue_endless(),
            Command::EndRun => self.end_run(),
            Command::SetMusicVolume(volume) => self.set_music_volume(volume),
            Command::SetSfxVolume(volume) => self.set_sfx_volume(volume),
            Command::TriggerBoss => self.trigger_boss(),
        }
    }

    /// Advance the run by `delta` using this tick's input.
    pub fn tick(&mut self, delta: Duration, intents: &Intents) {
        if self.disposed {
            return;
        }
        let _span = debug_span!("tick", flow = ?self.flow).entered();

        if !self.flow.is_simulating() {
            self.freeze();
            return;
        }

        self.clock += delta;
        let dt = delta.as_secs_f32();
        let fired = self.timers.tick(delta);

        if intents.dash {
            self.try_dash();
        }
        if self.attributes.is_dashing {
            self.spawn_dash_trail();
        } else {
            self.drive_player(intents);
        }

        self.steer_enemies();
        self.steer_boss(dt);
        let player = self.player.body.position;
        for drop in &mut self.gold {
            drop.attract(player, &self.config.gold);
        }

        self.step_physics(dt, delta);
        self.resolve_collisions();

        for action in fired {
            if self.flow == FlowState::GameOver {
                break;
            }
            self.run_deferred(action);
        }
    }

    /// Hold everything still while a menu or game over is showing. Player
    /// bullets keep their velocity; enemy shots stop where they are.
    fn freeze(&mut self) {
        if !self.attributes.is_dashing {
            self.player.body.velocity = Vec2::ZERO;
        }
        if let Some(boss) = self.boss.as_mut() {
            boss.body.velocity = Vec2::ZERO;
        }
        for drop in &mut self.gold {
            drop.body.velocity = Vec2::ZERO;
        }
        for enemy in &mut self.enemies {
            enemy.body.velocity = Vec2::ZERO;
        }
        for shot in &mut self.enemy_projectiles {
            shot.body.velocity = Vec2::ZERO;
        }
    }

    fn steer_enemies(&mut self) {
        let player = self.player.body.position;
        let now = self.clock;
        let mut shooters = Vec::new();
        for enemy in &mut self.enemies {
            enemy.steer(player, &self.config.imp_attack);
            if enemy.wants_to_fire(player, now, &self.config.imp_attack) {
                enemy.last_shot_at = Some(now);
                shooters.push((enemy.body.position, enemy.damage));
            }
        }
        for (origin, damage) in shooters {
            self.imp_shoot(origin, damage, player);
        }
    }

    fn imp_shoot(&mut self, origin: Vec2, damage: f32, target: Vec2) {
        let imp = &self.config.imp_attack;
        let live = self
            .enemy_projectiles
            .iter()
            .filter(|shot| shot.source == ProjectileSource::Imp)
            .count();
        if live >= imp.max_projectiles {
            return;
        }
        let velocity = (target - origin).normalize_or_zero() * imp.projectile_speed;
        let body = Body::new(origin, imp.projectile_size.to_vec2()).with_velocity(velocity);
        let projectile_damage = damage * imp.damage_multiplier;
        let lifespan = ms(imp.lifespan_ms);
        let id = ProjectileId(self.next_id());
        self.enemy_projectiles.push(EnemyProjectile::new(
            id,
            ProjectileSource::Imp,
            body,
            projectile_damage,
            lifespan,
        ));
    }

    fn steer_boss(&mut self, dt: f32) {
        let speed = self.config.boss.speed;
        if let Some(boss) = self.boss.as_mut() {
            boss.patrol(speed, dt);
        }
    }

    /// Integrate every body, then expire shots that ran out of time or
    /// left the arena.
    fn step_physics(&mut self, dt: f32, delta: Duration) {
        let arena = &self.config.arena;
        self.player.body.integrate(dt, arena);
        for enemy in &mut self.enemies {
            enemy.body.integrate(dt, arena);
        }
        if let Some(boss) = self.boss.as_mut() {
            boss.body.integrate(dt, arena);
        }
        for drop in &mut self.gold {
            drop.body.integrate(dt, arena);
        }

        self.bullets.retain_mut(|bullet| {
            bullet.body.integrate(dt, arena);
            bullet.lifespan.tick(delta);
            !bullet.lifespan.is_finished() && !bullet.body.is_outside(arena)
        });
        self.enemy_projectiles.retain_mut(|shot| {
            shot.body.integrate(dt, arena);
            shot.lifespan.tick(delta);
            let escaped = shot.source == ProjectileSource::Imp && shot.body.is_outside(arena);
            !shot.lifespan.is_finished() && !escaped
        });
    }

    fn run_deferred(&mut self, action: Deferred) {
        match action {
            Deferred::SpawnEnemy => self.spawn_enemy(),
            Deferred::EndDash => self.end_dash(),
            Deferred::CelestialFury => self.celestial_fury(),
            Deferred::LightningStrike { damage } => self.lightning_strike(damage),
            Deferred::BossAttack => self.boss_attack(),
            Deferred::BossMove => self.move_boss(),
            Deferred::Meteor => self.spawn_meteor(),
            Deferred::ClearInvincibility => self.attributes.is_invincible = false,
            Deferred::RestorePlayerAlpha => self.restore_player_alpha(),
            Deferred::RevertEnemyTint(enemy) => self.revert_enemy_tint(enemy),
            Deferred::RevertBossTint => self.revert_boss_tint(),
        }
    }

    /// Spawn a random catalog enemy at the top of the arena. Regular
    /// spawning only happens in normal play.
    fn spawn_enemy(&mut self) {
        if self.flow != FlowState::Playing {
            return;
        }
        let Some(archetype) = self.config.enemies.choose(&mut self.rng) else {
            warn!("Enemy catalog is empty, nothing to spawn");
            return;
        };
        let kind = archetype.kind;
        let half = archetype.size.to_vec2() / 2.0;
        let low = half.x;
        let high = (self.config.arena.width - half.x).max(low);
        let x = self.rng.random_range(low..=high);
        self.spawn_enemy_at(kind, Vec2::new(x, -half.y));
    }

    /// Spawn an enemy of `kind` at `position`, scaled for the current wave.
    /// Returns `None` when the catalog has no such kind.
    pub fn spawn_enemy_at(&mut self, kind: EnemyKind, position: Vec2) -> Option<EnemyId> {
        let Some(archetype) = self.config.archetype(kind) else {
            warn!("No archetype for {:?} in the enemy catalog", kind);
            return None;
        };
        let id = EnemyId(self.next_id);
        let enemy = Enemy::spawn(
            id,
            archetype,
            position,
            self.progression.wave,
            self.progression.endless,
            &self.config.progression,
        );
        self.next_id += 1;
        debug!("Spawned {:?} {:?} with {} health", kind, id, enemy.health);
        self.enemies.push(enemy);
        Some(id)
    }

    pub(crate) fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn emit(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    pub(crate) fn emit_ui(&mut self) {
        let snapshot = UiSnapshot {
            health: self.attributes.health,
            max_health: self.attributes.max_health,
            wave: self.progression.wave,
            total_kills: self.progression.total_kills,
            upgrade_progress: self.progression.ui_progress(),
            upgrade_required: self.progression.kills_required,
            gold: self.attributes.gold,
        };
        self.emit(Signal::UiData(snapshot));
    }

    /// Take every signal emitted since the last drain.
    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    pub fn flow(&self) -> FlowState {
        self.flow
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn attributes(&self) -> &PlayerAttributes {
        &self.attributes
    }

    /// Direct access to the player's stats for tooling and scripted runs.
    pub fn attributes_mut(&mut self) -> &mut PlayerAttributes {
        &mut self.attributes
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn enemy_projectiles(&self) -> &[EnemyProjectile] {
        &self.enemy_projectiles
    }

    pub fn gold_drops(&self) -> &[GoldDrop] {
        &self.gold
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    pub fn audio_settings(&self) -> AudioSettings {
        self.audio
    }

    /// Simulated time since the run started.
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Number of scheduled timers, including paused ones.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        combat::BULLET_HIT_TINT,
        signals::{MusicCue, ShopOffer, VisualCue},
    };

    const FRAME: Duration = Duration::from_millis(16);

    /// Defaults with spawning pushed far enough out not to interfere.
    fn quiet_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.progression.initial_spawn_delay_ms = 600_000.0;
        config
    }

    fn session() -> Session {
        Session::with_seed(quiet_config(), AudioSettings::default(), 42)
    }

    fn idle() -> Intents {
        Intents::default()
    }

    fn settle(session: &mut Session) {
        for _ in 0..120 {
            session.tick(FRAME, &idle());
        }
    }

    /// Spawn an enemy far from the player and kill it outright.
    fn kill_one(session: &mut Session) {
        let id = session.spawn_enemy_at(EnemyKind::Flyer, Vec2::new(100.0, 50.0));
        if let Some(id) = id {
            session.damage_enemy(id, 1000.0, BULLET_HIT_TINT);
        }
    }

    #[test]
    fn new_session_starts_playing_with_music_and_hud() {
        let mut session = session();
        assert_eq!(session.flow(), FlowState::Playing);
        assert_eq!(session.pending_timers(), 1);

        let signals = session.drain_signals();
        assert!(signals.contains(&Signal::Music(MusicCue::Play { volume: 0.3 })));
        assert!(signals.iter().any(|s| matches!(s, Signal::UiData(ui) if ui.health == 10.0)));
    }

    #[test]
    fn wave_advances_after_twenty_five_kills() {
        let mut session = session();
        for _ in 0..14 {
            kill_one(&mut session);
        }
        assert_eq!(session.progression().wave, 1);
        // The fifteenth kill offers an upgrade; take it and keep going.
        kill_one(&mut session);
        assert_eq!(session.flow(), FlowState::UpgradeSelection);
        let first = session.offered_upgrades[0].id();
        session.handle(Command::ChooseUpgrade(first.into()));
        assert_eq!(session.flow(), FlowState::Playing);

        for _ in 15..25 {
            kill_one(&mut session);
        }
        assert_eq!(session.progression().wave, 2);
        assert_eq!(session.progression().spawn_delay_ms, 600_000.0 * 0.8);
    }

    #[test]
    fn boss_wave_kill_starts_boss_fight_and_clears_enemies() {
        let mut session = session();
        session.progression.wave = 14;
        session.progression.total_kills = 14 * 25 - 1;
        session.progression.next_upgrade_at = 10_000;
        session.spawn_enemy_at(EnemyKind::Brute, Vec2::new(700.0, 100.0));

        kill_one(&mut session);

        assert_eq!(session.progression().wave, 15);
        assert_eq!(session.flow(), FlowState::BossFight);
        assert!(session.enemies().is_empty());
        let boss = session.boss().map(|boss| boss.max_health);
        assert_eq!(boss, Some(50.0));
        let spawn = session.spawn_timer;
        assert!(spawn.is_some_and(|timer| session.timers.is_paused(timer)));
    }

    #[test]
    fn shop_opens_when_completed_waves_hit_the_cadence() {
        let mut session = session();
        session.progression.wave = 5;
        session.progression.total_kills = 5 * 25 - 1;
        session.progression.next_upgrade_at = 10_000;
        session.attributes.gold = 60;

        kill_one(&mut session);

        assert_eq!(session.progression().wave, 6);
        assert_eq!(session.flow(), FlowState::ShopOpen);
        let shop = session
            .drain_signals()
            .into_iter()
            .find_map(|signal| match signal {
                Signal::ShowShop { items, player_gold } => Some((items, player_gold)),
                _ => None,
            });
        let Some((items, gold)) = shop else {
            panic!("shop was not shown");
        };
        assert_eq!(items.len(), 3);
        assert!(gold >= 60);
        assert!(items.iter().all(|item: &ShopOffer| item.affordable == (gold >= item.cost)));
    }

    #[test]
    fn purchase_only_works_in_open_shop_with_enough_gold() {
        let mut session = session();
        session.attributes.gold = 200;
        session.handle(Command::PurchaseItem("shop_perm_damage_up".into()));
        assert_eq!(session.attributes().gold, 200);

        session.open_shop();
        session.handle(Command::PurchaseItem("shop_perm_damage_up".into()));
        assert_eq!(session.attributes().gold, 100);
        assert_eq!(session.attributes().damage, 1.5);

        session.handle(Command::PurchaseItem("shop_perm_fire_rate_boost".into()));
        assert_eq!(session.attributes().gold, 100);

        session.drain_signals();
        session.handle(Command::CloseShop);
        assert_eq!(session.flow(), FlowState::Playing);
        assert!(session.drain_signals().contains(&Signal::CloseShopUi));
    }

    #[test]
    fn upgrade_outside_selection_is_ignored() {
        let mut session = session();
        session.handle(Command::ChooseUpgrade("damage_up".into()));
        assert_eq!(session.attributes().damage, 1.0);
        assert_eq!(session.progression().upgrades_completed, 0);
    }

    #[test]
    fn unknown_upgrade_keeps_selection_open() {
        let mut session = session();
        session.progression.total_kills = 14;
        kill_one(&mut session);
        assert_eq!(session.flow(), FlowState::UpgradeSelection);
        assert_eq!(session.offered_upgrades.len(), 3);

        session.handle(Command::ChooseUpgrade("laser_eyes".into()));
        assert_eq!(session.flow(), FlowState::UpgradeSelection);

        let chosen = session.offered_upgrades[1].id();
        session.handle(Command::ChooseUpgrade(chosen.into()));
        assert_eq!(session.flow(), FlowState::Playing);
        assert!(session.offered_upgrades.is_empty());
        assert_eq!(session.progression().kills_required, 25);
        assert_eq!(session.progression().next_upgrade_at, 40);
    }

    #[test]
    fn upgrade_that_was_not_offered_is_rejected() {
        let mut session = session();
        session.progression.total_kills = 14;
        kill_one(&mut session);
        let missing = Upgrade::ALL
            .into_iter()
            .find(|upgrade| !session.offered_upgrades.contains(upgrade));
        let Some(missing) = missing else {
            panic!("every upgrade was offered");
        };
        let before = session.attributes().clone();

        session.handle(Command::ChooseUpgrade(missing.id().into()));

        assert_eq!(session.flow(), FlowState::UpgradeSelection);
        assert_eq!(session.attributes(), &before);
        assert_eq!(session.progression().upgrades_completed, 0);
    }

    /// Kill up to the next upgrade threshold and take celestial fury.
    fn take_celestial_fury(session: &mut Session) {
        session.progression.total_kills = session.progression.next_upgrade_at - 1;
        kill_one(session);
        assert_eq!(session.flow(), FlowState::UpgradeSelection);
        session.offered_upgrades[0] = Upgrade::CelestialFury;
        session.handle(Command::ChooseUpgrade("celestial_fury".into()));
        assert_eq!(session.flow(), FlowState::Playing);
    }

    fn count_bolts(session: &mut Session) -> usize {
        session
            .drain_signals()
            .iter()
            .filter(|signal| matches!(signal, Signal::Effect(VisualCue::LightningBolt { .. })))
            .count()
    }

    #[test]
    fn fury_strikes_once_per_level_each_period_and_pauses() {
        let mut session = session();
        take_celestial_fury(&mut session);
        take_celestial_fury(&mut session);
        assert_eq!(session.attributes().celestial_fury_level, 2);
        session.drain_signals();

        // 132 frames is a little over one 2s period.
        for _ in 0..132 {
            session.tick(FRAME, &idle());
        }
        assert_eq!(count_bolts(&mut session), 2);

        session.handle(Command::TogglePause);
        for _ in 0..250 {
            session.tick(FRAME, &idle());
        }
        assert_eq!(count_bolts(&mut session), 0);

        session.handle(Command::Resume);
        for _ in 0..132 {
            session.tick(FRAME, &idle());
        }
        assert_eq!(count_bolts(&mut session), 2);
    }

    #[test]
    fn bullet_pierce_hits_each_enemy_once() {
        let mut session = session();
        settle(&mut session);
        let id = session.spawn_enemy_at(EnemyKind::Brute, Vec2::new(600.0, 300.0));
        let Some(id) = id else {
            panic!("brute missing from catalog");
        };
        session.enemies[0].body.gravity = false;
        session.enemies[0].speed = 0.0;
        let bullet = Bullet::new(
            ProjectileId(999),
            Body::new(Vec2::new(600.0, 300.0), Vec2::splat(16.0)),
            1.0,
            3,
            Duration::from_secs(5),
        );
        session.bullets.push(bullet);

        for _ in 0..10 {
            session.tick(FRAME, &idle());
        }

        let enemy = session.enemy(id).map(|enemy| enemy.health);
        assert_eq!(enemy, Some(4.0));
        assert_eq!(session.bullets()[0].pierce, 2);
    }

    #[test]
    fn dash_grants_projectile_immunity_and_destroys_the_shot() {
        let mut session = session();
        settle(&mut session);
        session.attributes.is_dashing = true;
        let position = session.player.body.position;
        session.enemy_projectiles.push(EnemyProjectile::new(
            ProjectileId(500),
            ProjectileSource::Imp,
            Body::new(position, Vec2::splat(20.0)),
            3.0,
            Duration::from_secs(3),
        ));

        session.resolve_collisions();

        assert!(session.enemy_projectiles().is_empty());
        assert_eq!(session.attributes().health, 10.0);
    }

    #[test]
    fn invincibility_blocks_damage_until_it_expires() {
        let mut session = session();
        settle(&mut session);
        let position = session.player.body.position;
        let shot = |id| {
            EnemyProjectile::new(
                ProjectileId(id),
                ProjectileSource::Boss,
                Body::new(position, Vec2::splat(20.0)),
                1.0,
                Duration::from_secs(3),
            )
        };

        session.enemy_projectiles.push(shot(900));
        session.resolve_collisions();
        assert_eq!(session.attributes().health, 9.0);
        assert!(session.attributes().is_invincible);

        session.enemy_projectiles.push(shot(901));
        session.resolve_collisions();
        assert_eq!(session.attributes().health, 9.0);
        assert!(session.enemy_projectiles().is_empty());

        // 750ms window at 16ms frames.
        for _ in 0..48 {
            session.tick(FRAME, &idle());
        }
        assert!(!session.attributes().is_invincible);
        assert_eq!(session.player().alpha, 1.0);
    }

    #[test]
    fn contact_knocks_the_enemy_away() {
        let mut session = session();
        settle(&mut session);
        let player_x = session.player.body.position.x;
        let id = session.spawn_enemy_at(EnemyKind::Brute, Vec2::new(player_x - 50.0, 300.0));

        session.resolve_collisions();

        assert_eq!(session.attributes().health, 8.0);
        let velocity = id.and_then(|id| session.enemy(id)).map(|e| e.body.velocity);
        assert_eq!(velocity, Some(Vec2::new(-150.0, -100.0)));
    }

    #[test]
    fn grounded_dash_runs_horizontally_then_damps() {
        let mut session = session();
        settle(&mut session);
        let right = Intents {
            right: true,
            ..Default::default()
        };
        session.tick(FRAME, &right);
        assert_eq!(session.player().body.velocity.x, 200.0);

        session.tick(
            FRAME,
            &Intents {
                dash: true,
                ..right.clone()
            },
        );
        assert!(session.attributes().is_dashing);
        assert!((session.player().body.velocity - Vec2::new(700.0, 0.0)).length() < 1e-3);

        for _ in 0..11 {
            session.tick(FRAME, &idle());
        }
        assert!(session.attributes().is_dashing);
        session.tick(FRAME, &idle());
        assert!(!session.attributes().is_dashing);
        assert!((session.player().body.velocity.x - 105.0).abs() < 1e-3);
        assert_eq!(session.player().alpha, 1.0);
    }

    #[test]
    fn pause_freezes_timers_and_resume_restores_them() {
        let mut session = session();
        session.handle(Command::TogglePause);
        assert_eq!(session.flow(), FlowState::ManuallyPaused);
        assert!(session.timers.is_suspended());
        let signals = session.drain_signals();
        assert!(signals.contains(&Signal::PauseOverlay { paused: true }));
        assert!(signals.contains(&Signal::ShowPauseMenu {
            music_volume: 0.3,
            sfx_volume: 0.5
        }));

        let clock = session.clock();
        session.tick(FRAME, &idle());
        assert_eq!(session.clock(), clock);

        session.handle(Command::Resume);
        assert_eq!(session.flow(), FlowState::Playing);
        assert!(!session.timers.is_suspended());
        assert!(session.drain_signals().contains(&Signal::ResumedFromPauseMenu));
    }

    #[test]
    fn frozen_states_stop_enemy_shots() {
        let mut session = session();
        session.enemy_projectiles.push(EnemyProjectile::new(
            ProjectileId(800),
            ProjectileSource::Imp,
            Body::new(Vec2::new(100.0, 100.0), Vec2::splat(20.0))
                .with_velocity(Vec2::new(180.0, 0.0)),
            1.0,
            Duration::from_secs(3),
        ));

        session.handle(Command::TogglePause);
        session.tick(FRAME, &idle());

        let shot = &session.enemy_projectiles()[0];
        assert_eq!(shot.body.velocity, Vec2::ZERO);
        assert_eq!(shot.body.position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn meteors_only_fall_during_the_boss_fight() {
        let mut session = session();
        session.handle(Command::TriggerBoss);
        session.handle(Command::TogglePause);

        session.spawn_meteor();
        assert!(session.enemy_projectiles().is_empty());

        session.handle(Command::Resume);
        session.spawn_meteor();
        assert_eq!(session.enemy_projectiles().len(), 1);
    }

    #[test]
    fn pausing_a_boss_fight_resumes_into_the_fight() {
        let mut session = session();
        session.handle(Command::TriggerBoss);
        session.handle(Command::TogglePause);
        session.handle(Command::TogglePause);
        assert_eq!(session.flow(), FlowState::BossFight);
    }

    #[test]
    fn bullets_always_break_on_the_boss() {
        let mut session = session();
        session.handle(Command::TriggerBoss);
        let Some(position) = session.boss().map(|boss| boss.body.position) else {
            panic!("boss did not spawn");
        };
        session.bullets.push(Bullet::new(
            ProjectileId(700),
            Body::new(position, Vec2::splat(16.0)),
            1.0,
            5,
            Duration::from_secs(1),
        ));
        session.drain_signals();

        session.resolve_collisions();

        assert!(session.bullets().is_empty());
        assert_eq!(session.boss().map(|boss| boss.health), Some(49.0));
        assert!(session.drain_signals().contains(&Signal::BossHealthUpdate {
            current_health: 49.0,
            max_health: 50.0
        }));
    }

    #[test]
    fn defeating_the_boss_clears_its_shots_and_allows_endless() {
        let mut session = session();
        session.handle(Command::TriggerBoss);
        session.spawn_meteor();
        assert_eq!(session.enemy_projectiles().len(), 1);

        session.damage_boss(1000.0);

        assert_eq!(session.flow(), FlowState::BossDefeated);
        assert!(session.boss().is_none());
        assert!(session.enemy_projectiles().is_empty());
        assert!(session.drain_signals().contains(&Signal::BossDefeatedShowScreen));

        session.handle(Command::ContinueEndless);
        assert_eq!(session.flow(), FlowState::Playing);
        assert!(session.progression().endless);
        let spawn = session.spawn_timer;
        assert!(spawn.is_some_and(|timer| !session.timers.is_paused(timer)));
    }

    #[test]
    fn end_run_restarts_from_scratch() {
        let mut session = session();
        session.attributes.gold = 40;
        session.handle(Command::TriggerBoss);
        session.damage_boss(1000.0);

        session.handle(Command::EndRun);

        assert_eq!(session.flow(), FlowState::Playing);
        assert_eq!(session.attributes().gold, 0);
        assert_eq!(session.progression().wave, 1);
        assert_eq!(session.pending_timers(), 1);
    }

    #[test]
    fn lightning_hits_enemies_in_its_column() {
        let mut session = session();
        let mut config = quiet_config();
        // Every column is inside the corridor when it is as wide as the arena.
        config.celestial_fury.strike_width = 2000.0;
        session.config = config;
        let id = session.spawn_enemy_at(EnemyKind::Brute, Vec2::new(400.0, 300.0));

        session.lightning_strike(4.0);

        let health = id.and_then(|id| session.enemy(id)).map(|e| (e.health, e.tint));
        assert_eq!(health, Some((1.0, Some(0xffff99))));
    }

    #[test]
    fn fury_cadence_follows_level() {
        let mut session = session();
        session.attributes.celestial_fury_level = 2;
        session.sync_celestial_fury();
        assert!(session.fury_timer.is_some());

        session.attributes.celestial_fury_level = 0;
        session.sync_celestial_fury();
        assert!(session.fury_timer.is_none());
        assert_eq!(session.pending_timers(), 1);
    }

    #[test]
    fn volume_commands_clamp_and_report() {
        let mut session = session();
        session.drain_signals();
        session.handle(Command::SetMusicVolume(1.5));
        session.handle(Command::SetSfxVolume(-1.0));
        assert_eq!(session.audio_settings().music_volume, 1.0);
        assert_eq!(session.audio_settings().sfx_volume, 0.0);
        assert!(session.drain_signals().contains(&Signal::Music(MusicCue::Volume(1.0))));
    }

    #[test]
    fn disposed_session_ignores_input() {
        let mut session = session();
        session.dispose();
        assert_eq!(session.pending_timers(), 0);

        session.handle(Command::TriggerBoss);
        session.tick(FRAME, &idle());
        assert!(session.boss().is_none());
        assert_eq!(session.clock(), Duration::ZERO);
    }

    #[test]
    fn spawn_timer_places_enemies_at_top_of_arena() {
        let mut config = GameConfig::default();
        config.progression.initial_spawn_delay_ms = 100.0;
        let mut session = Session::with_seed(config, AudioSettings::default(), 5);

        for _ in 0..7 {
            session.tick(FRAME, &idle());
        }

        assert_eq!(session.enemies().len(), 1);
        let enemy = &session.enemies()[0];
        let half_width = enemy.display_size.x / 2.0;
        assert!(enemy.body.position.x >= half_width);
        assert!(enemy.body.position.x <= 800.0 - half_width);
    }
}
