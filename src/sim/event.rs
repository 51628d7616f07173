/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and HUD flashes.

use crate::domain::entity::{CollectibleKind, EntityId};

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    ClimbStarted,
    ClimbEnded,
    LifeLost { remaining: u32 },
    CharacterDied { score: u32 },
    PowerUpStarted { duration: f32 },
    PowerUpExpired,
    Collected { id: EntityId, kind: CollectibleKind },
    HazardSpawned { id: EntityId, can_transform_to_fire: bool },
    HazardSmashed { id: EntityId },
    HazardTransformed { from: EntityId, to: EntityId },
    HazardLeftWorld { id: EntityId },
    JumpedOver { id: EntityId },
    RivetBroken { id: EntityId },
    PointsEarned { amount: u32 },
    GoalReached,
    LevelRestarted,
    LevelCleared { level: usize, bonus: u32 },
    GameOver { score: u32 },
    Paused,
}
