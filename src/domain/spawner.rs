/// Barrel thrower.
///
/// The Model polls every spawner once per frame; a spawner never touches
/// the entity list itself. It answers with at most one `SpawnRequest`.
///
/// Throw rate follows the level bonus: the interval slides linearly from
/// `interval_max` (full bonus, calm) to `interval_min` (bonus exhausted,
/// angry). Every `fire_every`-th barrel may turn into fire.

use super::geometry::{Position, Rect};
use crate::config::HazardConfig;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SpawnRequest {
    /// Top-left of the new barrel.
    pub position: Position,
    pub direction: f32,
    pub can_transform_to_fire: bool,
}

#[derive(Clone, Debug)]
pub struct Spawner {
    /// Seconds until the next throw.
    pub cooldown: f32,
    pub thrown: u32,
    pub interval_max: f32,
    pub interval_min: f32,
    pub fire_every: u32,
    /// Height of the barrels it throws, to place them on its feet line.
    pub barrel_height: f32,
}

impl Spawner {
    pub fn new(cfg: &HazardConfig, barrel_height: f32) -> Self {
        let interval_max = cfg.spawn_interval_max.max(0.0);
        let interval_min = cfg.spawn_interval_min.clamp(0.0, interval_max);
        Spawner {
            cooldown: interval_max,
            thrown: 0,
            interval_max,
            interval_min,
            fire_every: cfg.fire_barrel_every,
            barrel_height,
        }
    }

    /// Seconds between throws for the given bonus fraction (1.0 = full).
    pub fn interval(&self, bonus_fraction: f32) -> f32 {
        let f = bonus_fraction.clamp(0.0, 1.0);
        self.interval_min + (self.interval_max - self.interval_min) * f
    }

    /// 0.0 calm .. 1.0 furious. Display only.
    pub fn anger(&self, bonus_fraction: f32) -> f32 {
        1.0 - bonus_fraction.clamp(0.0, 1.0)
    }

    /// Advance the cooldown; throw from the right-hand side of `origin`
    /// when it runs out.
    pub fn poll(&mut self, origin: &Rect, delta_time: f32, bonus_fraction: f32) -> Option<SpawnRequest> {
        self.cooldown -= delta_time;
        if self.cooldown > 0.0 {
            return None;
        }
        let interval = self.interval(bonus_fraction);
        // carry the overshoot, but never queue a burst after a long frame
        self.cooldown = (self.cooldown + interval).max(interval * 0.5).max(f32::EPSILON);
        self.thrown += 1;

        let can_transform_to_fire = self.fire_every > 0 && self.thrown % self.fire_every == 0;
        log::debug!("spawner throws barrel #{} (fire: {can_transform_to_fire})", self.thrown);
        Some(SpawnRequest {
            position: Position::new(origin.right + 1.0, origin.bottom - self.barrel_height),
            direction: 1.0,
            can_transform_to_fire,
        })
    }
}
