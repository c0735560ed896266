//! Shop catalog - permanent upgrades bought with gold between waves.

use rand::{Rng, seq::SliceRandom};

use super::{attributes::PlayerAttributes, upgrades::MIN_FIRE_RATE_MS};
use crate::game::signals::ShopOffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShopItem {
    FullHeal,
    DamageUp,
    MaxHealthUp,
    FireRateBoost,
    SpeedBoost,
}

impl ShopItem {
    pub const ALL: [ShopItem; 5] = [
        ShopItem::FullHeal,
        ShopItem::DamageUp,
        ShopItem::MaxHealthUp,
        ShopItem::FireRateBoost,
        ShopItem::SpeedBoost,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ShopItem::FullHeal => "shop_full_heal",
            ShopItem::DamageUp => "shop_perm_damage_up",
            ShopItem::MaxHealthUp => "shop_perm_max_health_up",
            ShopItem::FireRateBoost => "shop_perm_fire_rate_boost",
            ShopItem::SpeedBoost => "shop_perm_speed_boost",
        }
    }

    pub fn from_id(id: &str) -> Option<ShopItem> {
        Self::ALL.into_iter().find(|item| item.id() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShopItem::FullHeal => "Full Heal",
            ShopItem::DamageUp => "Permanent Damage +0.5",
            ShopItem::MaxHealthUp => "Permanent Max Health +2",
            ShopItem::FireRateBoost => "Permanent Fire Rate -5%",
            ShopItem::SpeedBoost => "Permanent Speed +10%",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ShopItem::FullHeal => "Restores all health",
            ShopItem::DamageUp => "Your projectiles deal more damage",
            ShopItem::MaxHealthUp => "+2 max health and heal 2",
            ShopItem::FireRateBoost => "Shorter shot cooldown",
            ShopItem::SpeedBoost => "Faster movement",
        }
    }

    /// Price in gold.
    pub fn cost(&self) -> u32 {
        match self {
            ShopItem::FullHeal => 50,
            ShopItem::DamageUp => 100,
            ShopItem::MaxHealthUp => 75,
            ShopItem::FireRateBoost => 120,
            ShopItem::SpeedBoost => 80,
        }
    }

    pub fn offer(&self, gold: u32) -> ShopOffer {
        ShopOffer {
            id: self.id(),
            name: self.name(),
            description: self.description(),
            cost: self.cost(),
            affordable: gold >= self.cost(),
        }
    }

    pub fn apply(&self, attributes: &mut PlayerAttributes) {
        match self {
            ShopItem::FullHeal => attributes.heal_full(),
            ShopItem::DamageUp => attributes.damage += 0.5,
            ShopItem::MaxHealthUp => attributes.raise_max_health(2.0),
            ShopItem::FireRateBoost => attributes.scale_fire_rate(0.95, MIN_FIRE_RATE_MS),
            ShopItem::SpeedBoost => attributes.speed *= 1.1,
        }
    }

    /// Deduct the cost and apply the item. Returns false, changing nothing,
    /// when the player cannot afford it.
    pub fn purchase(&self, attributes: &mut PlayerAttributes) -> bool {
        let Some(remaining) = attributes.gold.checked_sub(self.cost()) else {
            return false;
        };
        attributes.gold = remaining;
        self.apply(attributes);
        true
    }

    /// Get up to `count` distinct items to put on display.
    pub fn random_selection(rng: &mut impl Rng, count: usize) -> Vec<ShopItem> {
        let mut available = Self::ALL.to_vec();
        available.shuffle(rng);
        available.into_iter().take(count).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn purchase_deducts_cost_and_applies_effect() {
        let mut attributes = PlayerAttributes {
            gold: 130,
            ..Default::default()
        };
        assert!(ShopItem::DamageUp.purchase(&mut attributes));
        assert_eq!(attributes.gold, 30);
        assert_eq!(attributes.damage, 1.5);
    }

    #[test]
    fn insufficient_gold_changes_nothing() {
        let mut attributes = PlayerAttributes {
            gold: 49,
            health: 3.0,
            ..Default::default()
        };
        let before = attributes.clone();
        assert!(!ShopItem::FullHeal.purchase(&mut attributes));
        assert_eq!(attributes, before);
    }

    #[test]
    fn offers_report_affordability() {
        assert!(ShopItem::FullHeal.offer(50).affordable);
        assert!(!ShopItem::FireRateBoost.offer(119).affordable);
    }

    #[test]
    fn selection_is_a_distinct_subset() {
        let mut rng = StdRng::seed_from_u64(11);
        let items = ShopItem::random_selection(&mut rng, 3);
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| items.iter().filter(|other| *other == item).count() == 1));
    }
}
