//! Upgrade catalog - permanent perks offered every few kills.
//!
//! Upgrades are picked from a random choice of three and last until the
//! run ends (roguelike-style progression).

use rand::{Rng, seq::SliceRandom};

use super::attributes::PlayerAttributes;
use crate::game::signals::UpgradeOffer;

/// Shot cooldown never drops below this many milliseconds.
pub const MIN_FIRE_RATE_MS: f32 = 100.0;

/// Volley size at which multi-shot turns into a damage bonus.
const MAX_PROJECTILES: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Upgrade {
    HealthUp,
    SpeedUp,
    FireRateUp,
    DamageUp,
    ProjectileSpeedUp,
    PierceUp,
    MultiShot,
    ProjectileLifespanUp,
    HealMinor,
    CelestialFury,
}

impl Upgrade {
    pub const ALL: [Upgrade; 10] = [
        Upgrade::HealthUp,
        Upgrade::SpeedUp,
        Upgrade::FireRateUp,
        Upgrade::DamageUp,
        Upgrade::ProjectileSpeedUp,
        Upgrade::PierceUp,
        Upgrade::MultiShot,
        Upgrade::ProjectileLifespanUp,
        Upgrade::HealMinor,
        Upgrade::CelestialFury,
    ];

    /// Stable identifier used by menus when a choice is made.
    pub fn id(&self) -> &'static str {
        match self {
            Upgrade::HealthUp => "health_up",
            Upgrade::SpeedUp => "speed_up",
            Upgrade::FireRateUp => "fire_rate_up",
            Upgrade::DamageUp => "damage_up",
            Upgrade::ProjectileSpeedUp => "projectile_speed_up",
            Upgrade::PierceUp => "pierce_up",
            Upgrade::MultiShot => "multi_shot",
            Upgrade::ProjectileLifespanUp => "projectile_lifespan_up",
            Upgrade::HealMinor => "heal_minor",
            Upgrade::CelestialFury => "celestial_fury",
        }
    }

    pub fn from_id(id: &str) -> Option<Upgrade> {
        Self::ALL.into_iter().find(|upgrade| upgrade.id() == id)
    }

    /// Get the display name.
    pub fn name(&self) -> &'static str {
        match self {
            Upgrade::HealthUp => "Extra Life",
            Upgrade::SpeedUp => "Angelic Swiftness",
            Upgrade::FireRateUp => "Rapid Fire",
            Upgrade::DamageUp => "Divine Power",
            Upgrade::ProjectileSpeedUp => "Swift Projectiles",
            Upgrade::PierceUp => "Piercing Shots",
            Upgrade::MultiShot => "Multi Shot",
            Upgrade::ProjectileLifespanUp => "Extended Range",
            Upgrade::HealMinor => "Minor Blessing",
            Upgrade::CelestialFury => "Celestial Fury",
        }
    }

    /// Get the description.
    pub fn description(&self) -> &'static str {
        match self {
            Upgrade::HealthUp => "+2 max health and heal 2",
            Upgrade::SpeedUp => "20% faster movement",
            Upgrade::FireRateUp => "20% shorter shot cooldown",
            Upgrade::DamageUp => "+1 projectile damage",
            Upgrade::ProjectileSpeedUp => "25% faster projectiles",
            Upgrade::PierceUp => "Projectiles pass through +1 enemy",
            Upgrade::MultiShot => "+1 projectile per shot (max 3)",
            Upgrade::ProjectileLifespanUp => "Projectiles travel 30% farther",
            Upgrade::HealMinor => "Heal 3",
            Upgrade::CelestialFury => "Lightning strikes every 2s. Each level: +1 bolt, +2 damage",
        }
    }

    pub fn offer(&self) -> UpgradeOffer {
        UpgradeOffer {
            id: self.id(),
            name: self.name(),
            description: self.description(),
        }
    }

    /// Apply the upgrade to the player.
    pub fn apply(&self, attributes: &mut PlayerAttributes) {
        match self {
            Upgrade::HealthUp => attributes.raise_max_health(2.0),
            Upgrade::SpeedUp => attributes.speed *= 1.2,
            Upgrade::FireRateUp => attributes.scale_fire_rate(0.8, MIN_FIRE_RATE_MS),
            Upgrade::DamageUp => attributes.damage += 1.0,
            Upgrade::ProjectileSpeedUp => attributes.projectile_speed *= 1.25,
            Upgrade::PierceUp => attributes.pierce_count += 1,
            Upgrade::MultiShot => {
                if attributes.num_projectiles < MAX_PROJECTILES {
                    attributes.num_projectiles += 1;
                } else {
                    attributes.damage += 0.5;
                }
            }
            Upgrade::ProjectileLifespanUp => attributes.projectile_lifespan *= 1.3,
            Upgrade::HealMinor => attributes.heal(3.0),
            Upgrade::CelestialFury => attributes.celestial_fury_level += 1,
        }
    }

    /// Get up to `count` distinct upgrades for selection.
    pub fn random_choices(rng: &mut impl Rng, count: usize) -> Vec<Upgrade> {
        let mut available = Self::ALL.to_vec();
        available.shuffle(rng);
        available.into_iter().take(count).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    #[test]
    fn ids_round_trip_through_catalog() {
        for upgrade in Upgrade::ALL {
            assert_eq!(Upgrade::from_id(upgrade.id()), Some(upgrade));
        }
        assert_eq!(Upgrade::from_id("laser_eyes"), None);
    }

    #[test]
    fn choices_are_distinct_and_degrade_to_catalog_size() {
        let mut rng = StdRng::seed_from_u64(3);
        let choices = Upgrade::random_choices(&mut rng, 3);
        assert_eq!(choices.len(), 3);
        assert_eq!(choices.iter().collect::<HashSet<_>>().len(), 3);

        assert_eq!(Upgrade::random_choices(&mut rng, 25).len(), Upgrade::ALL.len());
    }

    #[test]
    fn heal_upgrades_respect_max_health() {
        let mut attributes = PlayerAttributes {
            health: 9.0,
            ..Default::default()
        };
        Upgrade::HealMinor.apply(&mut attributes);
        assert_eq!(attributes.health, 10.0);

        Upgrade::HealthUp.apply(&mut attributes);
        assert_eq!(attributes.max_health, 12.0);
        assert_eq!(attributes.health, 12.0);
    }

    #[test]
    fn multi_shot_turns_into_damage_once_capped() {
        let mut attributes = PlayerAttributes::default();
        Upgrade::MultiShot.apply(&mut attributes);
        Upgrade::MultiShot.apply(&mut attributes);
        assert_eq!(attributes.num_projectiles, 3);
        assert_eq!(attributes.damage, 1.0);

        Upgrade::MultiShot.apply(&mut attributes);
        assert_eq!(attributes.num_projectiles, 3);
        assert_eq!(attributes.damage, 1.5);
    }

    #[test]
    fn fire_rate_upgrade_is_floored() {
        let mut attributes = PlayerAttributes::default();
        for _ in 0..20 {
            Upgrade::FireRateUp.apply(&mut attributes);
        }
        assert_eq!(attributes.fire_rate, MIN_FIRE_RATE_MS);
    }

    #[test]
    fn celestial_fury_raises_level() {
        let mut attributes = PlayerAttributes::default();
        Upgrade::CelestialFury.apply(&mut attributes);
        assert_eq!(attributes.celestial_fury_level, 1);
    }
}
