/// Hazards: rolling barrels and projectile fires.
///
/// A hazard's kind selects its movement strategy, a pure function from
/// (position, displacement) to the next position:
///   - `Rolling`    — full displacement, vertical motion from gravity.
///   - `Projectile` — horizontal only, bounces between the world walls.
///
/// Rolling hazards take their horizontal direction from the slope of the
/// last platform they landed on (Right → +, Left → −, Flat → unchanged).

use super::entity::{Body, BoundaryHit, Contact, GravityAffected, Touched};
use super::geometry::{CollisionSide, Position, Vector};
use super::platform::Slope;
use super::rules;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HazardKind {
    Barrel,
    Fire,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MovementStrategy {
    Rolling,
    Projectile,
}

impl MovementStrategy {
    pub fn for_kind(kind: HazardKind) -> Self {
        match kind {
            HazardKind::Barrel => MovementStrategy::Rolling,
            HazardKind::Fire => MovementStrategy::Projectile,
        }
    }

    pub fn next_position(self, position: Position, displacement: Vector) -> Position {
        match self {
            MovementStrategy::Rolling => position + displacement,
            MovementStrategy::Projectile => position + displacement.with_y(0.0),
        }
    }

    pub fn is_gravity_driven(self) -> bool {
        self == MovementStrategy::Rolling
    }
}

/// Horizontal direction after landing on a platform with `slope`.
pub fn roll_direction(slope: Slope, previous: f32) -> f32 {
    match slope {
        Slope::Right => 1.0,
        Slope::Left => -1.0,
        Slope::Flat => previous,
    }
}

/// Did a left edge moving from `prev_x` to `x` cross (or land on) `threshold`?
pub fn crossed_threshold(prev_x: f32, x: f32, threshold: f32) -> bool {
    x == threshold || (prev_x < threshold) != (x < threshold)
}

#[derive(Clone, Debug)]
pub struct Hazard {
    pub kind: HazardKind,
    pub strategy: MovementStrategy,
    pub can_transform_to_fire: bool,
    /// Horizontal speed magnitude.
    pub speed: f32,
    /// +1.0 right, -1.0 left.
    pub direction: f32,
    pub max_fall_speed: f32,
    /// Left edge at the start of the frame, for threshold crossing.
    pub prev_x: f32,
    /// Jump serial that already scored a jump-over on this hazard.
    pub scored_jump: Option<u32>,
}

impl Hazard {
    pub fn new(kind: HazardKind, speed: f32, direction: f32, can_transform_to_fire: bool, max_fall_speed: f32) -> Self {
        Hazard {
            kind,
            strategy: MovementStrategy::for_kind(kind),
            can_transform_to_fire: can_transform_to_fire && kind == HazardKind::Barrel,
            speed: speed.abs(),
            direction: if direction < 0.0 { -1.0 } else { 1.0 },
            max_fall_speed,
            prev_x: 0.0,
            scored_jump: None,
        }
    }

    pub fn barrel(speed: f32, direction: f32, can_transform_to_fire: bool, max_fall_speed: f32) -> Self {
        Hazard::new(HazardKind::Barrel, speed, direction, can_transform_to_fire, max_fall_speed)
    }

    pub fn is_rolling(&self) -> bool {
        self.strategy == MovementStrategy::Rolling
    }

    /// The projectile a transforming barrel becomes. Same body, horizontal
    /// velocity reversed, no vertical motion.
    pub fn into_fire(&self, body: &Body) -> (Hazard, Body) {
        let mut fire = Hazard::new(HazardKind::Fire, self.speed, -self.direction, false, self.max_fall_speed);
        fire.prev_x = body.position.x;
        let mut next = *body;
        next.velocity = Vector::new(-body.velocity.x, 0.0);
        fire.direction = if next.velocity.x < 0.0 {
            -1.0
        } else if next.velocity.x > 0.0 {
            1.0
        } else {
            fire.direction
        };
        (fire, next)
    }

    pub fn begin_frame(&mut self, body: &mut Body) {
        self.prev_x = body.position.x;
        body.velocity = body.velocity.with_x(self.direction * self.speed);
        if self.strategy == MovementStrategy::Projectile {
            body.velocity = body.velocity.with_y(0.0);
        }
    }

    pub fn on_contact(&mut self, body: &mut Body, destroyed: &mut bool, contact: &Contact) {
        match contact.other {
            Touched::Character { state } if rules::smashes_hazards(state) => *destroyed = true,
            Touched::Platform { slope, .. } if self.is_rolling() && contact.side == CollisionSide::Top => {
                if body.velocity.y >= 0.0 {
                    body.set_bottom(contact.other_rect.top);
                    body.velocity = body.velocity.with_y(0.0);
                }
                self.direction = roll_direction(slope, self.direction);
                body.velocity = body.velocity.with_x(self.direction * self.speed);
            }
            _ => {}
        }
    }

    /// Returns true when the hazard should leave the world.
    pub fn on_boundary(&mut self, body: &mut Body, hit: BoundaryHit) -> bool {
        match self.strategy {
            MovementStrategy::Rolling => hit.side() || hit.bottom,
            MovementStrategy::Projectile => {
                if hit.left {
                    self.direction = 1.0;
                } else if hit.right {
                    self.direction = -1.0;
                }
                body.velocity = body.velocity.with_x(self.direction * self.speed);
                hit.bottom
            }
        }
    }
}

impl GravityAffected for Hazard {
    fn is_affected_by_gravity(&self) -> bool {
        self.strategy.is_gravity_driven()
    }

    fn max_falling_speed(&self) -> f32 {
        self.max_fall_speed
    }

    fn on_platform_land(&mut self) {}

    fn on_platform_leave(&mut self) {}
}
