/// Geometry primitives: value types only, every operation returns a new value.
///
/// Coordinates are world units with the origin at the top-left corner and
/// `y` growing downward, so a positive vertical velocity means falling.

use std::ops::{Add, Mul};

use crate::error::{Result, SimError};

/// Top-left corner of an entity in world space.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }

    /// Position shifted by a displacement.
    pub fn translate(self, by: Vector) -> Position {
        Position::new(self.x + by.x, self.y + by.y)
    }

    pub fn with_x(self, x: f32) -> Position {
        Position::new(x, self.y)
    }

    pub fn with_y(self, y: f32) -> Position {
        Position::new(self.x, y)
    }
}

impl Add<Vector> for Position {
    type Output = Position;

    fn add(self, rhs: Vector) -> Position {
        self.translate(rhs)
    }
}

/// Displacement or velocity.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Vector { x, y }
    }

    pub fn sum(self, other: Vector) -> Vector {
        Vector::new(self.x + other.x, self.y + other.y)
    }

    pub fn scale(self, factor: f32) -> Vector {
        Vector::new(self.x * factor, self.y * factor)
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn with_x(self, x: f32) -> Vector {
        Vector::new(x, self.y)
    }

    pub fn with_y(self, y: f32) -> Vector {
        Vector::new(self.x, y)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        self.sum(rhs)
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f32) -> Vector {
        self.scale(rhs)
    }
}

/// Axis-aligned extent. Unsigned, so it can never be negative.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BoundingBox {
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(width: u32, height: u32) -> Self {
        BoundingBox { width, height }
    }

    /// Scale both dimensions, rounding to the nearest unit.
    /// A negative or non-finite factor is a caller bug.
    pub fn scale(self, factor: f32) -> Result<BoundingBox> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(SimError::invalid_argument(format!(
                "bounding box scale factor must be finite and >= 0, got {factor}"
            )));
        }
        Ok(BoundingBox::new(
            (self.width as f32 * factor).round() as u32,
            (self.height as f32 * factor).round() as u32,
        ))
    }

    pub fn w(self) -> f32 {
        self.width as f32
    }

    pub fn h(self) -> f32 {
        self.height as f32
    }
}

/// World-space rectangle derived from a position and a bounding box.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(position: Position, size: BoundingBox) -> Self {
        Rect {
            left: position.x,
            top: position.y,
            right: position.x + size.w(),
            bottom: position.y + size.h(),
        }
    }

    pub fn center_x(&self) -> f32 {
        (self.left + self.right) * 0.5
    }

    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) * 0.5
    }

    /// Closed-interval overlap: rectangles that only touch along an edge
    /// (or at a corner) still collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top <= other.bottom
            && other.top <= self.bottom
    }

    /// Penetration depth on each axis, `None` when the rectangles are apart.
    pub fn penetration(&self, other: &Rect) -> Option<(f32, f32)> {
        if !self.overlaps(other) {
            return None;
        }
        let dx = self.right.min(other.right) - self.left.max(other.left);
        let dy = self.bottom.min(other.bottom) - self.top.max(other.top);
        Some((dx, dy))
    }
}

/// Which edge of a surface was contacted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CollisionSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl CollisionSide {
    /// The same contact seen from the other rectangle.
    pub fn opposite(self) -> CollisionSide {
        match self {
            CollisionSide::Top => CollisionSide::Bottom,
            CollisionSide::Bottom => CollisionSide::Top,
            CollisionSide::Left => CollisionSide::Right,
            CollisionSide::Right => CollisionSide::Left,
        }
    }
}

/// Classify which side of `surface` the `mover` touched.
///
/// The axis with the smaller penetration depth is the contact axis; the
/// mover's centre relative to the surface's centre picks the edge on that
/// axis. Equal depths (corner touches included) resolve vertically, so an
/// entity standing across two adjacent tiles lands on both.
pub fn contact_side(mover: &Rect, surface: &Rect) -> Option<CollisionSide> {
    let (dx, dy) = mover.penetration(surface)?;
    let side = if dy <= dx {
        if mover.center_y() <= surface.center_y() {
            CollisionSide::Top
        } else {
            CollisionSide::Bottom
        }
    } else if mover.center_x() <= surface.center_x() {
        CollisionSide::Left
    } else {
        CollisionSide::Right
    };
    Some(side)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: u32, h: u32) -> Rect {
        Rect::new(Position::new(x, y), BoundingBox::new(w, h))
    }

    #[test]
    fn vector_ops() {
        let v = Vector::new(1.0, -2.0);
        assert_eq!(v + Vector::new(0.5, 0.5), Vector::new(1.5, -1.5));
        assert_eq!(v * 2.0, Vector::new(2.0, -4.0));
        assert!(Vector::ZERO.is_zero());
        assert!(!v.is_zero());
    }

    #[test]
    fn position_translate_is_pure() {
        let p = Position::new(10.0, 10.0);
        let q = p + Vector::new(0.0, 0.25);
        assert_eq!(p, Position::new(10.0, 10.0));
        assert_eq!(q, Position::new(10.0, 10.25));
    }

    #[test]
    fn bbox_scale() {
        let b = BoundingBox::new(8, 6);
        assert_eq!(b.scale(2.0).unwrap(), BoundingBox::new(16, 12));
        assert_eq!(b.scale(0.5).unwrap(), BoundingBox::new(4, 3));
        assert_eq!(b.scale(0.0).unwrap(), BoundingBox::new(0, 0));
        assert!(b.scale(-1.0).is_err());
        assert!(b.scale(f32::NAN).is_err());
    }

    #[test]
    fn touching_edges_collide() {
        let a = rect(0.0, 0.0, 8, 8);
        let b = rect(8.0, 0.0, 8, 8);
        let c = rect(8.1, 0.0, 8, 8);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn standing_on_top() {
        let feet = rect(4.0, 0.0, 8, 16);
        let girder = rect(0.0, 16.0, 16, 8);
        assert_eq!(contact_side(&feet, &girder), Some(CollisionSide::Top));
    }

    #[test]
    fn sunk_slightly_is_still_top() {
        let feet = rect(4.0, 2.0, 8, 16);
        let girder = rect(0.0, 16.0, 16, 8);
        assert_eq!(contact_side(&feet, &girder), Some(CollisionSide::Top));
    }

    #[test]
    fn head_bump_is_bottom() {
        let head = rect(4.0, 7.0, 8, 16);
        let girder = rect(0.0, 0.0, 16, 8);
        assert_eq!(contact_side(&head, &girder), Some(CollisionSide::Bottom));
    }

    #[test]
    fn walking_into_a_wall() {
        let body = rect(-6.0, 0.0, 8, 16);
        let wall = rect(0.0, 0.0, 16, 16);
        assert_eq!(contact_side(&body, &wall), Some(CollisionSide::Left));
        let body = rect(14.0, 0.0, 8, 16);
        assert_eq!(contact_side(&body, &wall), Some(CollisionSide::Right));
    }

    #[test]
    fn corner_touch_resolves_vertically() {
        let a = rect(0.0, 0.0, 8, 8);
        let b = rect(8.0, 8.0, 8, 8);
        assert_eq!(contact_side(&a, &b), Some(CollisionSide::Top));
    }

    #[test]
    fn apart_has_no_side() {
        assert_eq!(contact_side(&rect(0.0, 0.0, 4, 4), &rect(10.0, 10.0, 4, 4)), None);
    }

    #[test]
    fn opposite_sides() {
        assert_eq!(CollisionSide::Top.opposite(), CollisionSide::Bottom);
        assert_eq!(CollisionSide::Left.opposite(), CollisionSide::Right);
    }
}
