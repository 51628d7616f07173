/// Entities: one concrete record, dispatched by an explicit kind tag.
///
/// Every entity owns a `Body` (position, size, velocity). Behaviour that
/// only some kinds have is exposed through capability traits:
///
///   Collidable     : every entity (AABB overlap, touching counts)
///   GravityAffected: character and hazards
///   Climbable      : ladders
///   Breakable      : platforms (only rivets actually break)
///
/// Collision callbacks never see the other entity directly. Each side gets
/// a `Contact` built from a snapshot of the other side taken before either
/// callback runs, so both observe the same collision.

use super::character::Character;
use super::enemy::{Hazard, HazardKind};
use super::geometry::{BoundingBox, CollisionSide, Position, Rect, Vector};
use super::platform::{Platform, Slope};
use super::rules::{self, StateTag};
use super::spawner::Spawner;
use crate::sim::event::GameEvent;

pub type EntityId = u32;

/// Tolerance for comparing edges that were snapped onto each other.
pub const EDGE_EPSILON: f32 = 0.01;

/// Abstract player command. The core never reads input devices.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Jump,
    Escape,
    Enter,
    #[default]
    None,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CollectibleKind {
    /// Power-up: smashes hazards for a while.
    Hammer,
    /// Plain points item.
    Bonus,
}

/// Spatial state shared by every kind.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Body {
    pub position: Position,
    pub size: BoundingBox,
    pub velocity: Vector,
}

impl Body {
    pub fn new(position: Position, size: BoundingBox) -> Self {
        Body { position, size, velocity: Vector::ZERO }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.h()
    }

    pub fn center_x(&self) -> f32 {
        self.position.x + self.size.w() * 0.5
    }

    /// Move vertically so the bottom edge sits at `y`.
    pub fn set_bottom(&mut self, y: f32) {
        self.position = self.position.with_y(y - self.size.h());
    }
}

/// Vertical extent of a ladder, as seen by a climber.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LadderSpan {
    pub center_x: f32,
    pub top: f32,
    pub bottom: f32,
}

impl LadderSpan {
    pub fn from_rect(rect: &Rect) -> Self {
        LadderSpan { center_x: rect.center_x(), top: rect.top, bottom: rect.bottom }
    }

    /// Is the climber's centre close enough to the rungs to grab them?
    pub fn within_grab(&self, center_x: f32, tolerance: f32) -> bool {
        (center_x - self.center_x).abs() <= tolerance
    }

    /// Does the ladder continue above feet placed at `feet_y`?
    pub fn reaches_above(&self, feet_y: f32) -> bool {
        self.top < feet_y - EDGE_EPSILON
    }

    /// Does the ladder continue below feet placed at `feet_y`?
    pub fn reaches_below(&self, feet_y: f32) -> bool {
        self.bottom > feet_y + EDGE_EPSILON
    }

    /// A platform whose top lies inside the span is one the ladder passes
    /// through (a hatch). The floor at the ladder's foot is not.
    pub fn passes_through(&self, platform_top: f32) -> bool {
        platform_top >= self.top - EDGE_EPSILON && platform_top < self.bottom - EDGE_EPSILON
    }
}

/// Which world edges clamped an entity this frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BoundaryHit {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl BoundaryHit {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }

    pub fn side(&self) -> bool {
        self.left || self.right
    }
}

#[derive(Clone, Debug)]
pub enum EntityKind {
    Character(Character),
    Platform(Platform),
    Ladder,
    Hazard(Hazard),
    Collectible(CollectibleKind),
    Goal,
    Spawner(Spawner),
}

/// What the other side of a contact looked like when the contact was found.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Touched {
    Character { state: StateTag },
    Platform { slope: Slope, friction: f32, can_break: bool },
    Ladder,
    Hazard { kind: HazardKind },
    Collectible(CollectibleKind),
    Goal,
    Spawner,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Contact {
    pub other_id: EntityId,
    pub other: Touched,
    /// Side of the other entity that was touched.
    pub side: CollisionSide,
    pub other_rect: Rect,
}

// ── Capabilities ──

pub trait Collidable {
    fn bounds(&self) -> Rect;

    fn collides_with(&self, other: &dyn Collidable) -> bool {
        self.bounds().overlaps(&other.bounds())
    }
}

pub trait GravityAffected {
    fn is_affected_by_gravity(&self) -> bool;
    fn max_falling_speed(&self) -> f32;
    fn on_platform_land(&mut self);
    fn on_platform_leave(&mut self);
}

pub trait Climbable {
    fn ladder_span(&self) -> Option<LadderSpan>;
}

pub trait Breakable {
    fn can_break(&self) -> bool;
}

impl Breakable for Platform {
    fn can_break(&self) -> bool {
        Platform::can_break(self)
    }
}

// ── Entity record ──

#[derive(Clone, Debug)]
pub struct Entity {
    pub id: EntityId,
    pub body: Body,
    pub kind: EntityKind,
    /// Marked by collision handlers or the cleanup pass; dropped by the Model.
    pub destroyed: bool,
}

impl Collidable for Entity {
    fn bounds(&self) -> Rect {
        self.body.rect()
    }
}

impl Climbable for Entity {
    fn ladder_span(&self) -> Option<LadderSpan> {
        match self.kind {
            EntityKind::Ladder => Some(LadderSpan::from_rect(&self.body.rect())),
            _ => None,
        }
    }
}

impl Entity {
    pub fn new(id: EntityId, body: Body, kind: EntityKind) -> Self {
        Entity { id, body, kind, destroyed: false }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn is_live(&self) -> bool {
        !self.destroyed
    }

    pub fn is_platform(&self) -> bool {
        matches!(self.kind, EntityKind::Platform(_))
    }

    /// Scenery never reacts to other scenery.
    pub fn is_scenery(&self) -> bool {
        matches!(self.kind, EntityKind::Platform(_) | EntityKind::Ladder)
    }

    pub fn as_character(&self) -> Option<&Character> {
        match &self.kind {
            EntityKind::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_character_mut(&mut self) -> Option<&mut Character> {
        match &mut self.kind {
            EntityKind::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_hazard(&self) -> Option<&Hazard> {
        match &self.kind {
            EntityKind::Hazard(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_platform(&self) -> Option<&Platform> {
        match &self.kind {
            EntityKind::Platform(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_breakable(&self) -> Option<&dyn Breakable> {
        match &self.kind {
            EntityKind::Platform(p) => Some(p),
            _ => None,
        }
    }

    pub fn gravity(&self) -> Option<&dyn GravityAffected> {
        match &self.kind {
            EntityKind::Character(c) => Some(c),
            EntityKind::Hazard(h) => Some(h),
            _ => None,
        }
    }

    pub fn gravity_mut(&mut self) -> Option<&mut dyn GravityAffected> {
        match &mut self.kind {
            EntityKind::Character(c) => Some(c),
            EntityKind::Hazard(h) => Some(h),
            _ => None,
        }
    }

    /// Snapshot of this entity as the other side of a contact sees it.
    pub fn touched(&self) -> Touched {
        match &self.kind {
            EntityKind::Character(c) => Touched::Character { state: c.state.tag() },
            EntityKind::Platform(p) => Touched::Platform {
                slope: p.slope,
                friction: p.friction,
                can_break: p.can_break(),
            },
            EntityKind::Ladder => Touched::Ladder,
            EntityKind::Hazard(h) => Touched::Hazard { kind: h.kind },
            EntityKind::Collectible(k) => Touched::Collectible(*k),
            EntityKind::Goal => Touched::Goal,
            EntityKind::Spawner(_) => Touched::Spawner,
        }
    }

    /// Per-frame behaviour that runs before the physics pass.
    pub fn update(&mut self, delta_time: f32, events: &mut Vec<GameEvent>) {
        let Entity { body, kind, .. } = self;
        match kind {
            EntityKind::Character(c) => c.update(body, delta_time, events),
            EntityKind::Platform(p) => {
                p.begin_frame();
                if p.is_movable() {
                    body.velocity = p.elevator_velocity(body.position, body.velocity);
                }
            }
            EntityKind::Hazard(h) => h.begin_frame(body),
            _ => {}
        }
    }

    /// Displacement integration: position += velocity × dt.
    /// Hazards route the displacement through their movement strategy.
    pub fn integrate(&mut self, delta_time: f32) {
        if self.body.velocity.is_zero() {
            return;
        }
        let displacement = self.body.velocity.scale(delta_time);
        self.body.position = match &self.kind {
            EntityKind::Hazard(h) => h.strategy.next_position(self.body.position, displacement),
            _ => self.body.position.translate(displacement),
        };
    }

    pub fn on_collision(&mut self, contact: &Contact, events: &mut Vec<GameEvent>) {
        let Entity { body, kind, destroyed, .. } = self;
        match kind {
            EntityKind::Character(c) => c.on_contact(body, contact, events),
            EntityKind::Platform(p) => {
                // Only a live character standing over this platform counts:
                // its feet on our top, its centre within our span.
                let standing = contact.side == CollisionSide::Bottom && {
                    let (me, other) = (body.rect(), contact.other_rect);
                    let centre = (other.left + other.right) * 0.5;
                    (me.left..=me.right).contains(&centre)
                };
                if standing && matches!(contact.other, Touched::Character { state } if state != StateTag::Dead) {
                    p.occupied = true;
                }
            }
            EntityKind::Hazard(h) => h.on_contact(body, destroyed, contact),
            EntityKind::Collectible(k) => {
                if let Touched::Character { state } = contact.other {
                    if rules::accepts_collectible(state, *k) {
                        *destroyed = true;
                    }
                }
            }
            EntityKind::Ladder | EntityKind::Goal | EntityKind::Spawner(_) => {}
        }
    }

    /// World-edge reaction after the physics clamp.
    pub fn on_boundary(&mut self, hit: BoundaryHit, events: &mut Vec<GameEvent>) {
        let id = self.id;
        let Entity { body, kind, destroyed, .. } = self;
        match kind {
            EntityKind::Character(c) => c.on_boundary(body, hit, events),
            EntityKind::Hazard(h) => {
                if h.on_boundary(body, hit) {
                    *destroyed = true;
                    events.push(GameEvent::HazardLeftWorld { id });
                }
            }
            _ => {
                if hit.side() {
                    body.velocity = body.velocity.with_x(0.0);
                }
                if hit.top || hit.bottom {
                    body.velocity = body.velocity.with_y(0.0);
                }
            }
        }
    }
}
