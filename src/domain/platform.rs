/// Platform surfaces: girders, elevators and rivets.
///
/// A platform is static scenery unless its kind says otherwise:
///   - `Static`   — never moves, never breaks.
///   - `Movable`  — elevator: ping-pongs vertically between two bounds.
///   - `Breakable`— rivet: breaks once the character walks off it.
///
/// `slope` is only a rolling-direction hint for barrels; geometry is always
/// a flat axis-aligned box.

use super::geometry::{Position, Vector};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Slope {
    Left,
    Right,
    Flat,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PlatformKind {
    Static,
    Movable { min_y: f32, max_y: f32, speed: f32 },
    Breakable,
}

#[derive(Clone, Debug)]
pub struct Platform {
    pub kind: PlatformKind,
    pub friction: f32,
    pub slope: Slope,
    /// Touched by the character during the current frame.
    pub occupied: bool,
    /// Touched by the character during the previous frame.
    pub was_occupied: bool,
}

impl Platform {
    pub fn new(kind: PlatformKind, slope: Slope, friction: f32) -> Self {
        Platform {
            kind,
            friction: friction.clamp(0.0, 1.0),
            slope,
            occupied: false,
            was_occupied: false,
        }
    }

    pub fn girder(slope: Slope) -> Self {
        Platform::new(PlatformKind::Static, slope, 1.0)
    }

    pub fn rivet() -> Self {
        Platform::new(PlatformKind::Breakable, Slope::Flat, 1.0)
    }

    pub fn elevator(min_y: f32, max_y: f32, speed: f32) -> Self {
        Platform::new(PlatformKind::Movable { min_y, max_y, speed }, Slope::Flat, 1.0)
    }

    pub fn can_break(&self) -> bool {
        matches!(self.kind, PlatformKind::Breakable)
    }

    pub fn is_movable(&self) -> bool {
        matches!(self.kind, PlatformKind::Movable { .. })
    }

    /// Start of a frame: remember last frame's occupancy, clear this frame's.
    pub fn begin_frame(&mut self) {
        self.was_occupied = self.occupied;
        self.occupied = false;
    }

    /// The character stepped off this frame.
    pub fn just_vacated(&self) -> bool {
        self.was_occupied && !self.occupied
    }

    /// Elevator velocity for the coming frame. Reverses at the bounds so the
    /// platform never leaves `[min_y, max_y]` by more than one step.
    pub fn elevator_velocity(&self, position: Position, velocity: Vector) -> Vector {
        match self.kind {
            PlatformKind::Movable { min_y, max_y, speed } => {
                let dir = if velocity.y < 0.0 { -1.0 } else { 1.0 };
                let dir = if position.y >= max_y {
                    -1.0
                } else if position.y <= min_y {
                    1.0
                } else {
                    dir
                };
                Vector::new(0.0, dir * speed.abs())
            }
            _ => Vector::ZERO,
        }
    }
}
