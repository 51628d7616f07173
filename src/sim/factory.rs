/// Entity construction, keyed on layout symbols.
///
/// The Model only ever asks for a `(Body, EntityKind)` pair and assigns the
/// id itself, so a factory cannot hand out duplicate ids.
/// Positions passed in are the top-left of the layout cell; the factory
/// places the entity inside it (feet on the cell's bottom edge).

use crate::config::GameConfig;
use crate::domain::character::{Character, CharacterTuning};
use crate::domain::enemy::Hazard;
use crate::domain::entity::{Body, CollectibleKind, EntityKind};
use crate::domain::geometry::{BoundingBox, Position};
use crate::domain::platform::{Platform, Slope};
use crate::domain::spawner::{SpawnRequest, Spawner};
use crate::domain::tile::TILE_SIZE;

pub const CHARACTER_SIZE: BoundingBox = BoundingBox::new(12, 16);
pub const BARREL_SIZE: BoundingBox = BoundingBox::new(12, 12);
pub const KONG_SIZE: BoundingBox = BoundingBox::new(32, 32);
pub const GOAL_SIZE: BoundingBox = BoundingBox::new(12, 16);
pub const ITEM_SIZE: BoundingBox = BoundingBox::new(10, 10);
pub const CELL_SIZE: BoundingBox = BoundingBox::new(16, 16);

pub type Spawned = (Body, EntityKind);

pub trait EntityFactory {
    /// A girder `cells` wide starting at `cell`.
    fn create_girder(&self, cell: Position, cells: usize, slope: Slope) -> Spawned;
    fn create_rivet(&self, cell: Position) -> Spawned;
    /// `min_y`/`max_y` bound the lift's top edge.
    fn create_elevator(&self, cell: Position, min_y: f32, max_y: f32) -> Spawned;
    /// A ladder `rungs` cells tall starting at `cell`.
    fn create_ladder(&self, cell: Position, rungs: usize) -> Spawned;
    fn create_character(&self, cell: Position) -> Spawned;
    fn create_kong(&self, cell: Position) -> Spawned;
    fn create_goal(&self, cell: Position) -> Spawned;
    fn create_collectible(&self, cell: Position, kind: CollectibleKind) -> Spawned;
    /// Barrels are not in layouts; spawners request them at run time.
    fn create_barrel(&self, request: &SpawnRequest) -> Spawned;
}

/// Standing on the cell floor, centred horizontally.
fn seat(cell: Position, size: BoundingBox) -> Position {
    Position::new(
        cell.x + (TILE_SIZE - size.w()) * 0.5,
        cell.y + TILE_SIZE - size.h(),
    )
}

/// Builds entities from the game configuration.
#[derive(Clone, Debug)]
pub struct DefaultFactory {
    config: GameConfig,
}

impl DefaultFactory {
    pub fn new(config: &GameConfig) -> Self {
        DefaultFactory { config: config.clone() }
    }
}

impl EntityFactory for DefaultFactory {
    fn create_girder(&self, cell: Position, cells: usize, slope: Slope) -> Spawned {
        let size = BoundingBox::new(TILE_SIZE as u32 * cells.max(1) as u32, TILE_SIZE as u32);
        (Body::new(cell, size), EntityKind::Platform(Platform::girder(slope)))
    }

    fn create_rivet(&self, cell: Position) -> Spawned {
        (Body::new(cell, CELL_SIZE), EntityKind::Platform(Platform::rivet()))
    }

    fn create_elevator(&self, cell: Position, min_y: f32, max_y: f32) -> Spawned {
        let speed = self.config.physics.elevator_speed;
        (Body::new(cell, CELL_SIZE), EntityKind::Platform(Platform::elevator(min_y, max_y, speed)))
    }

    fn create_ladder(&self, cell: Position, rungs: usize) -> Spawned {
        let size = BoundingBox::new(TILE_SIZE as u32, TILE_SIZE as u32 * rungs.max(1) as u32);
        (Body::new(cell, size), EntityKind::Ladder)
    }

    fn create_character(&self, cell: Position) -> Spawned {
        let tuning = CharacterTuning::from_config(&self.config);
        let character = Character::new(self.config.character.lives, tuning);
        (Body::new(seat(cell, CHARACTER_SIZE), CHARACTER_SIZE), EntityKind::Character(character))
    }

    fn create_kong(&self, cell: Position) -> Spawned {
        // anchored on its bottom-left cell
        let pos = Position::new(cell.x, cell.y + TILE_SIZE - KONG_SIZE.h());
        let spawner = Spawner::new(&self.config.hazards, BARREL_SIZE.h());
        (Body::new(pos, KONG_SIZE), EntityKind::Spawner(spawner))
    }

    fn create_goal(&self, cell: Position) -> Spawned {
        (Body::new(seat(cell, GOAL_SIZE), GOAL_SIZE), EntityKind::Goal)
    }

    fn create_collectible(&self, cell: Position, kind: CollectibleKind) -> Spawned {
        (Body::new(seat(cell, ITEM_SIZE), ITEM_SIZE), EntityKind::Collectible(kind))
    }

    fn create_barrel(&self, request: &SpawnRequest) -> Spawned {
        let hazard = Hazard::barrel(
            self.config.hazards.barrel_speed,
            request.direction,
            request.can_transform_to_fire,
            self.config.physics.max_fall_speed,
        );
        let mut body = Body::new(request.position, BARREL_SIZE);
        body.velocity = body.velocity.with_x(hazard.direction * hazard.speed);
        (body, EntityKind::Hazard(hazard))
    }
}
