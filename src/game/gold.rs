//! Gold drops - rolled on every kill and pulled toward the player.

use bevy::prelude::*;
use rand::Rng;

use super::physics::Body;
use crate::config::GoldConfig;

/// Chance of dropping exactly the minimum.
const MIN_GOLD_CHANCE: f32 = 0.40;

/// Cumulative chance of the minimum or the maximum.
const MAX_GOLD_CUMULATIVE_CHANCE: f32 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GoldId(pub u64);

#[derive(Debug, Clone)]
pub struct GoldDrop {
    pub id: GoldId,
    pub body: Body,
    pub value: u32,
}

impl GoldDrop {
    pub fn new(id: GoldId, position: Vec2, value: u32, config: &GoldConfig) -> Self {
        Self {
            id,
            body: Body::new(position, config.pickup_size.to_vec2()),
            value,
        }
    }

    /// Home in on the player inside the magnet radius, rest otherwise.
    pub fn attract(&mut self, player: Vec2, config: &GoldConfig) {
        if self.body.position.distance(player) < config.magnet_radius {
            self.body.move_toward(player, config.magnet_speed);
        } else {
            self.body.velocity = Vec2::ZERO;
        }
    }
}

/// Roll a drop in `[min, max]`: 40% the minimum, 15% the maximum and
/// otherwise uniform strictly between them, falling back to the minimum.
pub fn roll_gold_drop(rng: &mut impl Rng, min: u32, max: u32) -> u32 {
    let roll: f32 = rng.random();
    if roll < MIN_GOLD_CHANCE {
        min
    } else if roll < MAX_GOLD_CUMULATIVE_CHANCE {
        max
    } else if max > min + 1 {
        rng.random_range(min + 1..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn drops_stay_within_bounds_with_expected_weights() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples = 20_000;
        let mut counts = [0u32; 4];
        for _ in 0..samples {
            let value = roll_gold_drop(&mut rng, 0, 3);
            assert!(value <= 3);
            counts[value as usize] += 1;
        }

        let share = |count: u32| count as f32 / samples as f32;
        assert!((share(counts[0]) - 0.40).abs() < 0.02);
        assert!((share(counts[3]) - 0.15).abs() < 0.02);
        assert!((share(counts[1]) - 0.225).abs() < 0.02);
    }

    #[test]
    fn adjacent_bounds_fall_back_to_minimum() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let value = roll_gold_drop(&mut rng, 2, 3);
            assert!(value == 2 || value == 3);
        }
        for _ in 0..100 {
            assert_eq!(roll_gold_drop(&mut rng, 4, 4), 4);
        }
    }

    #[test]
    fn gold_rests_outside_magnet_radius() {
        let config = GoldConfig::default();
        let mut drop = GoldDrop::new(GoldId(0), Vec2::new(0.0, 0.0), 2, &config);

        drop.attract(Vec2::new(100.0, 0.0), &config);
        assert_eq!(drop.body.velocity, Vec2::new(120.0, 0.0));

        drop.attract(Vec2::new(1000.0, 0.0), &config);
        assert_eq!(drop.body.velocity, Vec2::ZERO);
    }
}
