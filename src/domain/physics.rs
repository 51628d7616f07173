/// Physics pass: one call per frame, single source of truth for motion.
///
/// ## Pipeline
///
/// For every live entity, in collection order:
///   1. SUPPORT  : is it standing on a platform (overlap + TOP side)?
///   2. GRAVITY  : unsupported and gravity-affected: vy += g·dt, capped
///                at the entity's max falling speed. Supported and
///                moving down: vy = 0 and the feet snap to the surface.
///   3. INTEGRATE: position += velocity·dt (through the hazard strategy).
///   4. CLAMP    : keep the box inside the world; report edges hit.
///
/// Then, once for the whole collection:
///   5. CONTACTS : every overlapping live pair (i < j) is dispatched to
///                both sides from snapshots taken before either reacts.
///                Scenery/scenery pairs are skipped: neither reacts.
///   6. EDGES    : support before vs after: land/leave hooks, once each.
///
/// ## Collision side
///
/// `geometry::contact_side`: smallest penetration axis wins, ties are
/// vertical. Each side of a pair gets the side of the *other* box it
/// touched, so a character on a girder sees TOP while the girder sees
/// BOTTOM.
///
/// One override: a body whose feet were at or above a platform's top
/// before this frame's motion has landed on it, whatever the overlap
/// shape. At the seam between two girders the near tile is only grazed,
/// and the penetration test alone would call that a side hit.

use super::entity::{BoundaryHit, Contact, Entity};
use super::geometry::{contact_side, CollisionSide, Position, Rect};
use crate::error::{check_delta, Result, SimError};
use crate::sim::event::GameEvent;

const SURFACE_EPS: f32 = 1e-3;

#[derive(Clone, Debug)]
pub struct PhysicsEngine {
    pub gravity: f32,
    pub world_width: f32,
    pub world_height: f32,
}

impl PhysicsEngine {
    pub fn new(gravity: f32, world_width: f32, world_height: f32) -> Result<Self> {
        let mut engine = PhysicsEngine { gravity, world_width: 0.0, world_height: 0.0 };
        if !gravity.is_finite() {
            return Err(SimError::invalid_argument(format!("gravity must be finite, got {gravity}")));
        }
        engine.set_world_size(world_width, world_height)?;
        Ok(engine)
    }

    pub fn set_world_size(&mut self, width: f32, height: f32) -> Result<()> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(SimError::invalid_argument(format!(
                "world size must be positive, got {width}x{height}"
            )));
        }
        self.world_width = width;
        self.world_height = height;
        Ok(())
    }

    /// Run one frame over `entities`. Returns the number of contacts
    /// dispatched.
    pub fn step(&self, entities: &mut [Entity], delta_time: f32, events: &mut Vec<GameEvent>) -> Result<usize> {
        check_delta(delta_time)?;
        let n = entities.len();

        // ── 1–4: per-entity motion ──
        let mut supported_before = vec![false; n];
        let before: Vec<Rect> = entities.iter().map(Entity::rect).collect();
        for i in 0..n {
            if entities[i].destroyed {
                continue;
            }
            let support_top = support_of(entities, i).map(|j| entities[j].rect().top);
            supported_before[i] = support_top.is_some();

            let gravity = entities[i]
                .gravity()
                .map(|g| (g.is_affected_by_gravity(), g.max_falling_speed()));
            let e = &mut entities[i];
            if let Some((true, max_fall)) = gravity {
                self.apply_gravity(e, support_top, max_fall, delta_time);
            }
            e.integrate(delta_time);
            let hit = self.clamp_to_world(e);
            if hit.any() {
                e.on_boundary(hit, events);
            }
        }

        // ── 5: contacts ──
        let mut contacts = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                if entities[i].destroyed || entities[j].destroyed {
                    continue;
                }
                if entities[i].is_scenery() && entities[j].is_scenery() {
                    continue;
                }
                let (ri, rj) = (entities[i].rect(), entities[j].rect());
                let (Some(mut side_i), Some(mut side_j)) = (contact_side(&ri, &rj), contact_side(&rj, &ri)) else {
                    continue;
                };
                if entities[j].is_platform() && !entities[i].is_platform() && came_from_above(side_i, &before[i], &before[j]) {
                    (side_i, side_j) = (CollisionSide::Top, CollisionSide::Bottom);
                } else if entities[i].is_platform() && !entities[j].is_platform() && came_from_above(side_j, &before[j], &before[i]) {
                    (side_j, side_i) = (CollisionSide::Top, CollisionSide::Bottom);
                }
                let for_i = Contact { other_id: entities[j].id, other: entities[j].touched(), side: side_i, other_rect: rj };
                let for_j = Contact { other_id: entities[i].id, other: entities[i].touched(), side: side_j, other_rect: ri };
                entities[i].on_collision(&for_i, events);
                entities[j].on_collision(&for_j, events);
                contacts += 1;
            }
        }

        // ── 6: landing edges ──
        for i in 0..n {
            if entities[i].destroyed || entities[i].gravity().is_none() {
                continue;
            }
            let now = support_of(entities, i).is_some();
            let before = supported_before[i];
            if let Some(g) = entities[i].gravity_mut() {
                if now && !before {
                    g.on_platform_land();
                } else if before && !now {
                    g.on_platform_leave();
                }
            }
        }

        Ok(contacts)
    }

    fn apply_gravity(&self, e: &mut Entity, support_top: Option<f32>, max_fall: f32, delta_time: f32) {
        let body = &mut e.body;
        match support_top {
            Some(top) => {
                if body.velocity.y > 0.0 {
                    body.velocity = body.velocity.with_y(0.0);
                    body.set_bottom(top);
                }
            }
            None => {
                let vy = (body.velocity.y + self.gravity * delta_time).min(max_fall);
                body.velocity = body.velocity.with_y(vy);
            }
        }
    }

    /// Keep the box inside `[0, width] × [0, height]`.
    fn clamp_to_world(&self, e: &mut Entity) -> BoundaryHit {
        let body = &mut e.body;
        let max_x = (self.world_width - body.size.w()).max(0.0);
        let max_y = (self.world_height - body.size.h()).max(0.0);
        let Position { x, y } = body.position;
        let hit = BoundaryHit {
            left: x < 0.0,
            right: x > max_x,
            top: y < 0.0,
            bottom: y > max_y,
        };
        if hit.any() {
            body.position = Position::new(x.clamp(0.0, max_x), y.clamp(0.0, max_y));
        }
        hit
    }
}

/// A side hit by a mover that started the frame on or above the platform's
/// surface is a landing.
fn came_from_above(side: CollisionSide, mover: &Rect, platform: &Rect) -> bool {
    matches!(side, CollisionSide::Left | CollisionSide::Right) && mover.bottom <= platform.top + SURFACE_EPS
}

/// Index of the platform `idx` stands on, if any. The highest surface wins;
/// ties go to the earlier entity.
pub fn support_of(entities: &[Entity], idx: usize) -> Option<usize> {
    let me = entities[idx].rect();
    let mut best: Option<(usize, f32)> = None;
    for (j, other) in entities.iter().enumerate() {
        if j == idx || other.destroyed || !other.is_platform() {
            continue;
        }
        let r = other.rect();
        if contact_side(&me, &r) != Some(CollisionSide::Top) {
            continue;
        }
        if best.map_or(true, |(_, top)| r.top < top) {
            best = Some((j, r.top));
        }
    }
    best.map(|(j, _)| j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::character::{Character, CharacterTuning};
    use crate::domain::enemy::Hazard;
    use crate::domain::entity::{Body, EntityKind};
    use crate::domain::geometry::{BoundingBox, Vector};
    use crate::domain::platform::{Platform, Slope};

    fn character_at(id: u32, x: f32, y: f32, w: u32, h: u32) -> Entity {
        let body = Body::new(Position::new(x, y), BoundingBox::new(w, h));
        Entity::new(id, body, EntityKind::Character(Character::new(3, CharacterTuning::default())))
    }

    fn girder(id: u32, x: f32, y: f32, slope: Slope) -> Entity {
        let body = Body::new(Position::new(x, y), BoundingBox::new(16, 16));
        Entity::new(id, body, EntityKind::Platform(Platform::girder(slope)))
    }

    fn barrel(id: u32, x: f32, y: f32, dir: f32) -> Entity {
        let body = Body::new(Position::new(x, y), BoundingBox::new(12, 12));
        Entity::new(id, body, EntityKind::Hazard(Hazard::barrel(72.0, dir, false, 320.0)))
    }

    fn engine(gravity: f32) -> PhysicsEngine {
        PhysicsEngine::new(gravity, 448.0, 288.0).unwrap()
    }

    #[test]
    fn free_fall_scenario() {
        let mut es = vec![character_at(1, 10.0, 10.0, 8, 8)];
        engine(25.0).step(&mut es, 0.1, &mut vec![]).unwrap();
        let b = es[0].body;
        assert!((b.velocity.y - 2.5).abs() < 1e-6);
        assert!((b.position.y - 10.25).abs() < 1e-6);
    }

    #[test]
    fn negative_delta_fails_fast() {
        let mut es = vec![character_at(1, 10.0, 10.0, 8, 8)];
        let before = es[0].body;
        assert!(matches!(engine(25.0).step(&mut es, -0.1, &mut vec![]), Err(SimError::InvalidArgument(_))));
        assert_eq!(es[0].body, before);
    }

    #[test]
    fn fall_speed_is_capped() {
        let mut es = vec![character_at(1, 10.0, 0.0, 8, 8)];
        let e = engine(600.0);
        for _ in 0..200 {
            e.step(&mut es, 0.05, &mut vec![]).unwrap();
            assert!(es[0].body.velocity.y <= 320.0);
        }
    }

    #[test]
    fn lands_and_stays() {
        let mut es = vec![character_at(1, 34.0, 40.0, 12, 16), girder(2, 32.0, 64.0, Slope::Flat)];
        let e = engine(600.0);
        for _ in 0..60 {
            e.step(&mut es, 0.016, &mut vec![]).unwrap();
        }
        assert_eq!(es[0].body.bottom(), 64.0);
        assert_eq!(es[0].body.velocity.y, 0.0);
        assert!(es[0].as_character().unwrap().is_on_ground);
        assert_eq!(support_of(&es, 0), Some(1));
    }

    #[test]
    fn landing_across_a_seam_is_not_a_side_hit() {
        let mut x = 20.0;
        while x <= 31.5 {
            for drop in [0.0, 8.0, 24.0, 40.0] {
                let mut es = vec![
                    character_at(1, x, 184.0 - drop, 12, 16),
                    girder(2, 16.0, 200.0, Slope::Flat),
                    girder(3, 32.0, 200.0, Slope::Flat),
                ];
                let e = engine(600.0);
                for _ in 0..120 {
                    e.step(&mut es, 0.016, &mut vec![]).unwrap();
                }
                let b = es[0].body;
                assert_eq!(b.position.x, x, "dropped at x={x} from {drop}");
                assert_eq!(b.bottom(), 200.0, "dropped at x={x} from {drop}");
                assert!(es[0].as_character().unwrap().is_on_ground);
            }
            x += 0.5;
        }
    }

    #[test]
    fn walking_into_a_wall_is_still_a_side_hit() {
        let mut es = vec![character_at(1, 20.0, 48.0, 12, 16), girder(2, 32.0, 48.0, Slope::Flat)];
        es[0].body.velocity = Vector::new(64.0, 0.0);
        engine(0.0).step(&mut es, 0.1, &mut vec![]).unwrap();
        assert_eq!(es[0].body.rect().right, 32.0);
        assert_eq!(es[0].body.velocity.x, 0.0);
    }

    fn e_step(es: &mut [Entity], dt: f32) {
        engine(600.0).step(es, dt, &mut vec![]).unwrap();
    }

    #[test]
    fn walking_off_an_edge_fires_leave() {
        let mut es = vec![character_at(1, 32.0, 48.0, 12, 16), girder(2, 32.0, 64.0, Slope::Flat)];
        es[0].as_character_mut().unwrap().is_on_ground = true;
        es[0].body.velocity = Vector::new(-64.0, 0.0);
        e_step(&mut es, 0.5);
        assert!(!es[0].as_character().unwrap().is_on_ground);
    }

    #[test]
    fn contacts_reach_both_sides() {
        let mut es = vec![barrel(1, 34.0, 52.0, -1.0), girder(2, 32.0, 64.0, Slope::Right)];
        let n = engine(0.0).step(&mut es, 0.0, &mut vec![]).unwrap();
        assert_eq!(n, 1);
        // barrel saw TOP of a right slope
        assert_eq!(es[0].as_hazard().unwrap().direction, 1.0);
    }

    #[test]
    fn scenery_pairs_are_skipped() {
        let mut es = vec![girder(1, 0.0, 64.0, Slope::Flat), girder(2, 16.0, 64.0, Slope::Flat)];
        assert_eq!(engine(600.0).step(&mut es, 0.016, &mut vec![]).unwrap(), 0);
    }

    #[test]
    fn rolling_barrel_leaves_world_sideways() {
        let mut es = vec![barrel(1, 1.0, 100.0, -1.0)];
        es[0].body.velocity = Vector::new(-72.0, 0.0);
        let mut ev = vec![];
        engine(0.0).step(&mut es, 0.1, &mut ev).unwrap();
        assert!(es[0].destroyed);
        assert_eq!(ev, vec![GameEvent::HazardLeftWorld { id: 1 }]);
        assert_eq!(es[0].body.position.x, 0.0);
    }

    #[test]
    fn destroyed_entities_are_inert() {
        let mut es = vec![barrel(1, 34.0, 52.0, -1.0), girder(2, 32.0, 64.0, Slope::Right)];
        es[0].destroyed = true;
        es[0].body.velocity = Vector::new(10.0, 10.0);
        assert_eq!(engine(600.0).step(&mut es, 0.1, &mut vec![]).unwrap(), 0);
        assert_eq!(es[0].body.position, Position::new(34.0, 52.0));
    }

    #[test]
    fn world_size_must_be_positive() {
        assert!(PhysicsEngine::new(600.0, 0.0, 10.0).is_err());
        assert!(PhysicsEngine::new(f32::NAN, 10.0, 10.0).is_err());
    }
}
