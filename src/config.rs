//! Tunable game configuration.
//!
//! Every balance constant lives here so a run can be re-tuned without a
//! rebuild. The defaults reproduce the shipped balance; an optional JSON file
//! in the user's config directory overrides any subset of them.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::game::{
    attributes::PlayerAttributes,
    enemy::{EnemyArchetype, EnemyKind},
};

/// Converts a millisecond value from the config into a [`Duration`].
pub fn ms(value: f32) -> Duration {
    Duration::from_micros((value.max(0.0) * 1000.0).round() as u64)
}

/// Width/height pair used for display sizes and hitboxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const fn square(side: f32) -> Self {
        Self::new(side, side)
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// The whole configuration snapshot a [`Session`](crate::game::session::Session)
/// is built from.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena: ArenaConfig,
    pub player: PlayerConfig,
    pub progression: ProgressionConfig,
    pub enemies: Vec<EnemyArchetype>,
    pub imp_attack: ImpAttackConfig,
    pub gold: GoldConfig,
    pub dash: DashConfig,
    pub celestial_fury: CelestialFuryConfig,
    pub boss: BossConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            player: PlayerConfig::default(),
            progression: ProgressionConfig::default(),
            enemies: vec![
                EnemyArchetype {
                    kind: EnemyKind::Imp,
                    health: 2.0,
                    speed: 75.0,
                    damage: 1.0,
                    score_value: 10,
                    color: Some(0xff0000),
                    size: Size::square(100.0),
                    min_gold: 0,
                    max_gold: 3,
                },
                EnemyArchetype {
                    kind: EnemyKind::Brute,
                    health: 5.0,
                    speed: 50.0,
                    damage: 2.0,
                    score_value: 25,
                    color: Some(0x00ff00),
                    size: Size::square(144.0),
                    min_gold: 2,
                    max_gold: 5,
                },
                EnemyArchetype {
                    kind: EnemyKind::Flyer,
                    health: 1.0,
                    speed: 120.0,
                    damage: 1.0,
                    score_value: 15,
                    color: Some(0xffff00),
                    size: Size::square(62.0),
                    min_gold: 1,
                    max_gold: 4,
                },
            ],
            imp_attack: ImpAttackConfig::default(),
            gold: GoldConfig::default(),
            dash: DashConfig::default(),
            celestial_fury: CelestialFuryConfig::default(),
            boss: BossConfig::default(),
        }
    }
}

impl GameConfig {
    /// Get the file path for the config override.
    fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("celestial-fury").join("config.json"))
    }

    /// Load the config override from disk, falling back to the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine config directory, using default config");
            return Self::default();
        };

        if !path.exists() {
            info!("No config file found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded game config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse game config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read game config: {}", e);
                Self::default()
            }
        }
    }

    /// Look up the catalog entry for an enemy kind.
    pub fn archetype(&self, kind: EnemyKind) -> Option<&EnemyArchetype> {
        self.enemies.iter().find(|archetype| archetype.kind == kind)
    }
}

/// Playfield geometry. Coordinates grow right and down from the top-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Downward acceleration in px/s² for bodies with gravity.
    pub gravity: f32,
    /// Y coordinate of the top of the ground strip.
    pub ground_top: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            gravity: 600.0,
            ground_top: 568.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub attributes: PlayerAttributes,
    pub jump_strength: f32,
    pub body_size: Size,
    pub spawn: [f32; 2],
    /// Horizontal offset of the muzzle from the player's center.
    pub muzzle_offset: f32,
    /// Angle between neighbouring bullets of one volley, in degrees.
    pub spread_degrees: f32,
    pub bullet_size: Size,
    pub max_bullets: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            attributes: PlayerAttributes::default(),
            jump_strength: 350.0,
            body_size: Size::new(70.0, 100.0),
            spawn: [400.0, 200.0],
            muzzle_offset: 16.0,
            spread_degrees: 10.0,
            bullet_size: Size::square(16.0),
            max_bullets: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub base_kills_for_upgrade: u32,
    pub increment_kills_per_upgrade: u32,
    pub kills_per_wave: u32,
    pub waves_per_shop: u32,
    pub shop_items_to_display: usize,
    pub upgrade_choices: usize,
    pub boss_wave: u32,
    pub initial_spawn_delay_ms: f32,
    pub spawn_delay_factor: f32,
    pub min_spawn_delay_ms: f32,
    pub health_growth: f32,
    pub endless_health_growth: f32,
    pub speed_bonus_per_wave: f32,
    pub max_speed_bonus: f32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            base_kills_for_upgrade: 15,
            increment_kills_per_upgrade: 10,
            kills_per_wave: 25,
            waves_per_shop: 5,
            shop_items_to_display: 3,
            upgrade_choices: 3,
            boss_wave: 15,
            initial_spawn_delay_ms: 3000.0,
            spawn_delay_factor: 0.8,
            min_spawn_delay_ms: 150.0,
            health_growth: 1.05,
            endless_health_growth: 1.20,
            speed_bonus_per_wave: 0.025,
            max_speed_bonus: 0.50,
        }
    }
}

/// Ranged attack of the ground-pacing IMP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpAttackConfig {
    pub projectile_speed: f32,
    pub damage_multiplier: f32,
    pub lifespan_ms: f32,
    pub fire_rate_ms: f32,
    pub attack_range: f32,
    /// IMPs stop descending at this y and pace horizontally.
    pub stop_y: f32,
    pub projectile_size: Size,
    pub max_projectiles: usize,
}

impl Default for ImpAttackConfig {
    fn default() -> Self {
        Self {
            projectile_speed: 180.0,
            damage_multiplier: 0.5,
            lifespan_ms: 3000.0,
            fire_rate_ms: 2500.0,
            attack_range: 450.0,
            stop_y: 600.0 * 0.4,
            projectile_size: Size::square(20.0),
            max_projectiles: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoldConfig {
    pub magnet_radius: f32,
    pub magnet_speed: f32,
    pub pickup_size: Size,
}

impl Default for GoldConfig {
    fn default() -> Self {
        Self {
            magnet_radius: 600.0,
            magnet_speed: 120.0,
            pickup_size: Size::square(32.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub trail_interval_ms: f32,
    pub trail_lifetime_ms: f32,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            trail_interval_ms: 25.0,
            trail_lifetime_ms: 350.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CelestialFuryConfig {
    pub period_ms: f32,
    pub stagger_ms: f32,
    pub strike_width: f32,
    /// Strikes never land closer than this to the arena's side walls.
    pub edge_margin: f32,
}

impl Default for CelestialFuryConfig {
    fn default() -> Self {
        Self {
            period_ms: 2000.0,
            stagger_ms: 50.0,
            strike_width: 30.0,
            edge_margin: 20.0,
        }
    }
}

/// One boss projectile pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossProjectileConfig {
    pub speed: f32,
    pub damage: f32,
    pub lifespan_ms: f32,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub name: String,
    /// Boss health is the player's damage at spawn times this.
    pub health_multiplier: f32,
    pub speed: f32,
    pub hitbox_scale: f32,
    pub attack_interval_ms: f32,
    pub move_interval_ms: f32,
    pub display_size: Size,
    pub spawn: [f32; 2],
    /// Patrol region as fractions of the arena width.
    pub patrol_x: [f32; 2],
    pub patrol_y: [f32; 2],
    pub fastball: BossProjectileConfig,
    pub nova: BossProjectileConfig,
    pub nova_count: u32,
    pub meteor: BossProjectileConfig,
    pub meteor_count: u32,
    pub meteor_stagger_ms: f32,
    pub meteor_spawn_y: f32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            name: "Archdemon of the Abyss".to_string(),
            health_multiplier: 50.0,
            speed: 80.0,
            hitbox_scale: 2.0,
            attack_interval_ms: 2000.0,
            move_interval_ms: 3500.0,
            display_size: Size::square(230.0),
            spawn: [400.0, 150.0],
            patrol_x: [0.2, 0.8],
            patrol_y: [100.0, 200.0],
            fastball: BossProjectileConfig {
                speed: 450.0,
                damage: 2.0,
                lifespan_ms: 3000.0,
                size: Size::square(40.0),
            },
            nova: BossProjectileConfig {
                speed: 250.0,
                damage: 1.0,
                lifespan_ms: 4000.0,
                size: Size::square(30.0),
            },
            nova_count: 10,
            meteor: BossProjectileConfig {
                speed: 300.0,
                damage: 2.0,
                lifespan_ms: 5000.0,
                size: Size::square(40.0),
            },
            meteor_count: 6,
            meteor_stagger_ms: 150.0,
            meteor_spawn_y: -50.0,
        }
    }
}
