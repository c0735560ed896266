//! Minimal arcade physics: axis-aligned bodies, gravity and arena walls.
//!
//! Bodies are integrated once per tick. Overlaps are found afterwards by a
//! broad-phase pass that yields id pairs for the combat resolvers.

use bevy::prelude::*;

use crate::config::ArenaConfig;

/// Rebounds slower than this come to rest instead of jittering on the ground.
const MIN_BOUNCE_SPEED: f32 = 20.0;

/// An axis-aligned moving body. `position` is the center.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Size used for overlap tests.
    pub hitbox: Vec2,
    /// Size used against the arena walls and ground.
    pub extent: Vec2,
    pub gravity: bool,
    pub bounce: Vec2,
    pub collide_world: bool,
    /// Set when the body rested on the ground during the last step.
    pub blocked_down: bool,
}

impl Body {
    /// A body whose hitbox and wall extent are the same size.
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            hitbox: size,
            extent: size,
            gravity: false,
            bounce: Vec2::ZERO,
            collide_world: false,
            blocked_down: false,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_hitbox(mut self, hitbox: Vec2) -> Self {
        self.hitbox = hitbox;
        self
    }

    pub fn with_gravity(mut self, gravity: bool) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_bounce(mut self, bounce: Vec2) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn colliding_with_world(mut self) -> Self {
        self.collide_world = true;
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.hitbox)
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        overlaps(self.bounds(), other.bounds())
    }

    /// Whether the hitbox lies entirely outside the arena.
    pub fn is_outside(&self, arena: &ArenaConfig) -> bool {
        let bounds = self.bounds();
        bounds.max.x < 0.0
            || bounds.min.x > arena.width
            || bounds.max.y < 0.0
            || bounds.min.y > arena.height
    }

    /// Set the velocity to reach `target` at `speed`.
    pub fn move_toward(&mut self, target: Vec2, speed: f32) {
        self.velocity = (target - self.position).normalize_or_zero() * speed;
    }

    /// Advance the body by `dt` seconds.
    pub fn integrate(&mut self, dt: f32, arena: &ArenaConfig) {
        if self.gravity {
            self.velocity.y += arena.gravity * dt;
        }
        self.position += self.velocity * dt;
        self.blocked_down = false;

        if !self.collide_world {
            return;
        }

        let half = self.extent / 2.0;
        if self.position.x - half.x < 0.0 {
            self.position.x = half.x;
            self.velocity.x = rebound(self.velocity.x, self.bounce.x);
        } else if self.position.x + half.x > arena.width {
            self.position.x = arena.width - half.x;
            self.velocity.x = rebound(self.velocity.x, self.bounce.x);
        }

        if self.position.y - half.y < 0.0 {
            self.position.y = half.y;
            self.velocity.y = rebound(self.velocity.y, self.bounce.y);
        } else if self.position.y + half.y >= arena.ground_top {
            self.position.y = arena.ground_top - half.y;
            if self.velocity.y > 0.0 {
                self.velocity.y = rebound(self.velocity.y, self.bounce.y);
            }
            self.blocked_down = true;
        }
    }
}

fn rebound(velocity: f32, bounce: f32) -> f32 {
    let reflected = -velocity * bounce;
    if reflected.abs() < MIN_BOUNCE_SPEED {
        0.0
    } else {
        reflected
    }
}

/// Strict overlap: touching edges do not count.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    !a.intersect(b).is_empty()
}

/// Broad phase over two id-tagged sets of bounds.
pub fn overlapping_pairs<A: Copy, B: Copy>(left: &[(A, Rect)], right: &[(B, Rect)]) -> Vec<(A, B)> {
    let mut pairs = Vec::new();
    for &(a, a_bounds) in left {
        for &(b, b_bounds) in right {
            if overlaps(a_bounds, b_bounds) {
                pairs.push((a, b));
            }
        }
    }
    pairs
}
