/// Score and level-bonus bookkeeping.
///
/// The Model only calls through `ScoreSink`; the running total, the bonus
/// countdown and the leaderboard live behind it.
///
/// ## Bonus countdown
///
///   start_level_bonus(v)   bonus = v, timer = 0
///   tick_bonus(dt)         every `interval` seconds: bonus -= step (floor 0)
///   end_level()            bonus added to total, returned, bonus = 0

use std::path::PathBuf;

use crate::config::ScoringConfig;
use crate::error::Result;
use crate::sim::leaderboard::{self, LeaderboardEntry};

pub trait ScoreSink {
    fn earn_points(&mut self, amount: u32);
    fn start_level_bonus(&mut self, value: u32);
    fn tick_bonus(&mut self, delta_time: f32);
    /// Convert the remaining bonus to points; returns the amount awarded.
    fn end_level(&mut self) -> u32;
    fn end_session(&mut self, name: &str) -> Result<()>;
    /// Start a fresh session (score back to zero).
    fn begin_session(&mut self);

    fn total(&self) -> u32;
    fn bonus(&self) -> u32;
    /// Remaining bonus relative to its starting value, in `[0, 1]`.
    fn bonus_fraction(&self) -> f32;
}

#[derive(Clone, Debug)]
pub struct ScoreBoard {
    total: u32,
    bonus: u32,
    bonus_start: u32,
    bonus_step: u32,
    bonus_interval: f32,
    timer: f32,
    levels_cleared: usize,
    session_open: bool,
    leaderboard_path: Option<PathBuf>,
}

impl ScoreBoard {
    /// In-memory only; `end_session` records nothing.
    pub fn new(scoring: &ScoringConfig) -> Self {
        ScoreBoard {
            total: 0,
            bonus: 0,
            bonus_start: 0,
            bonus_step: scoring.bonus_step,
            bonus_interval: scoring.bonus_interval.max(f32::EPSILON),
            timer: 0.0,
            levels_cleared: 0,
            session_open: true,
            leaderboard_path: None,
        }
    }

    /// Sessions are appended to the leaderboard file at `path`.
    pub fn with_leaderboard(scoring: &ScoringConfig, path: PathBuf) -> Self {
        ScoreBoard { leaderboard_path: Some(path), ..ScoreBoard::new(scoring) }
    }

    pub fn levels_cleared(&self) -> usize {
        self.levels_cleared
    }
}

impl ScoreSink for ScoreBoard {
    fn earn_points(&mut self, amount: u32) {
        self.total = self.total.saturating_add(amount);
    }

    fn start_level_bonus(&mut self, value: u32) {
        self.bonus = value;
        self.bonus_start = value;
        self.timer = 0.0;
    }

    fn tick_bonus(&mut self, delta_time: f32) {
        if self.bonus == 0 || delta_time <= 0.0 {
            return;
        }
        self.timer += delta_time;
        while self.timer >= self.bonus_interval && self.bonus > 0 {
            self.timer -= self.bonus_interval;
            self.bonus = self.bonus.saturating_sub(self.bonus_step);
        }
    }

    fn end_level(&mut self) -> u32 {
        let awarded = self.bonus;
        self.earn_points(awarded);
        self.bonus = 0;
        self.timer = 0.0;
        self.levels_cleared += 1;
        awarded
    }

    fn end_session(&mut self, name: &str) -> Result<()> {
        if !self.session_open {
            return Ok(());
        }
        self.session_open = false;
        let Some(path) = &self.leaderboard_path else {
            return Ok(());
        };
        let entry = LeaderboardEntry {
            name: name.to_string(),
            score: self.total,
            level: self.levels_cleared + 1,
        };
        match leaderboard::record(path, entry)? {
            Some(rank) => log::info!("{name} placed #{} with {}", rank + 1, self.total),
            None => log::debug!("{} did not make the leaderboard", self.total),
        }
        Ok(())
    }

    fn begin_session(&mut self) {
        self.total = 0;
        self.bonus = 0;
        self.bonus_start = 0;
        self.timer = 0.0;
        self.levels_cleared = 0;
        self.session_open = true;
    }

    fn total(&self) -> u32 {
        self.total
    }

    fn bonus(&self) -> u32 {
        self.bonus
    }

    fn bonus_fraction(&self) -> f32 {
        if self.bonus_start == 0 {
            0.0
        } else {
            self.bonus as f32 / self.bonus_start as f32
        }
    }
}
