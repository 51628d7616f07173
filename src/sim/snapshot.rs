/// Read-only view of a frame for the presentation layer.
///
/// Taken after `update`; holds copies only, so a renderer can never reach
/// back into the entity collection.

use crate::domain::enemy::HazardKind;
use crate::domain::entity::{CollectibleKind, Entity, EntityId, EntityKind};
use crate::domain::geometry::{BoundingBox, Position};
use crate::domain::platform::{PlatformKind, Slope};
use crate::domain::rules::StateTag;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderKind {
    Character { state: StateTag, facing_right: bool },
    Girder { slope: Slope },
    Rivet,
    Elevator,
    Ladder,
    Barrel,
    Fire,
    Hammer,
    Bonus,
    Goal,
    Kong,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderItem {
    pub id: EntityId,
    pub position: Position,
    pub size: BoundingBox,
    pub kind: RenderKind,
}

/// Model phase as seen from outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Title,
    Playing,
    Paused,
    GameOver,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub lives: u32,
    pub bonus: u32,
    pub level: usize,
    pub level_name: String,
    pub phase: Phase,
    pub power_remaining: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub world_width: f32,
    pub world_height: f32,
    pub items: Vec<RenderItem>,
    pub hud: Hud,
}

impl RenderKind {
    pub fn of(entity: &Entity) -> RenderKind {
        match &entity.kind {
            EntityKind::Character(c) => RenderKind::Character {
                state: c.state.tag(),
                facing_right: c.is_facing_right,
            },
            EntityKind::Platform(p) => match p.kind {
                PlatformKind::Static => RenderKind::Girder { slope: p.slope },
                PlatformKind::Movable { .. } => RenderKind::Elevator,
                PlatformKind::Breakable => RenderKind::Rivet,
            },
            EntityKind::Ladder => RenderKind::Ladder,
            EntityKind::Hazard(h) => match h.kind {
                HazardKind::Barrel => RenderKind::Barrel,
                HazardKind::Fire => RenderKind::Fire,
            },
            EntityKind::Collectible(CollectibleKind::Hammer) => RenderKind::Hammer,
            EntityKind::Collectible(CollectibleKind::Bonus) => RenderKind::Bonus,
            EntityKind::Goal => RenderKind::Goal,
            EntityKind::Spawner(_) => RenderKind::Kong,
        }
    }

    /// Drawn after everything else.
    pub fn is_actor(self) -> bool {
        matches!(self, RenderKind::Character { .. } | RenderKind::Barrel | RenderKind::Fire)
    }
}

/// Live entities in collection order.
pub fn render_items(entities: &[Entity]) -> Vec<RenderItem> {
    entities
        .iter()
        .filter(|e| e.is_live())
        .map(|e| RenderItem {
            id: e.id,
            position: e.body.position,
            size: e.body.size,
            kind: RenderKind::of(e),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Body;
    use crate::domain::platform::Platform;

    fn entity(id: EntityId, kind: EntityKind) -> Entity {
        Entity::new(id, Body::new(Position::new(id as f32, 0.0), BoundingBox::new(16, 16)), kind)
    }

    #[test]
    fn kinds_are_concrete() {
        let rivet = entity(1, EntityKind::Platform(Platform::rivet()));
        let lift = entity(2, EntityKind::Platform(Platform::elevator(0.0, 64.0, 24.0)));
        let girder = entity(3, EntityKind::Platform(Platform::girder(Slope::Left)));
        assert_eq!(RenderKind::of(&rivet), RenderKind::Rivet);
        assert_eq!(RenderKind::of(&lift), RenderKind::Elevator);
        assert_eq!(RenderKind::of(&girder), RenderKind::Girder { slope: Slope::Left });
    }

    #[test]
    fn destroyed_entities_not_rendered() {
        let mut gone = entity(1, EntityKind::Collectible(CollectibleKind::Bonus));
        gone.destroyed = true;
        let kept = entity(2, EntityKind::Goal);
        let items = render_items(&[gone, kept]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 2);
        assert_eq!(items[0].position, Position::new(2.0, 0.0));
        assert!(!items[0].kind.is_actor());
    }
}
