/// Model: the single owner of the live entity collection.
///
/// ## Ownership
///
/// Every entity lives in `entities` and nowhere else. Ids are handed out
/// here (`next_id`), never by the factory, so two entities cannot share
/// one. Collision handlers and the physics pass mutate entities in place;
/// only the Model inserts or removes them.
///
/// ## Phases
///
///   from \ to   Title  Playing  Paused  GameOver
///   Title         ✓       ✓        ·        ·
///   Playing       ·       ·        ✓        ✓
///   Paused        ✓       ✓        ·        ·
///   GameOver      ✓       ·        ·        ·
///
/// `update` only simulates while Playing. Leaving a game for the title
/// (from Paused or GameOver) means the next Title → Playing starts a new
/// session on the first level.

use crate::config::GameConfig;
use crate::domain::character::Character;
use crate::domain::entity::{Action, Body, Entity, EntityId, EntityKind};
use crate::domain::physics::PhysicsEngine;
use crate::domain::tile::TILE_SIZE;
use crate::error::{Result, SimError};
use crate::sim::event::GameEvent;
use crate::sim::factory::{DefaultFactory, EntityFactory};
use crate::sim::leaderboard;
use crate::sim::level::{self, LevelDef};
use crate::sim::score::{ScoreBoard, ScoreSink};
use crate::sim::snapshot::{self, Hud, Snapshot};
use crate::sim::step;

pub use crate::sim::snapshot::Phase;

/// Facts about the loaded level that outlive its entities.
#[derive(Clone, Debug, Default)]
pub struct LevelInfo {
    pub name: String,
    /// Breakable platforms at load time; 0 means the level has none.
    pub breakables: usize,
    pub has_goal: bool,
    pub transform_threshold: f32,
    pub width: f32,
    pub height: f32,
}

pub struct Model {
    pub(crate) entities: Vec<Entity>,
    next_id: EntityId,
    pub(crate) physics: PhysicsEngine,
    pub(crate) config: GameConfig,
    pub(crate) factory: Box<dyn EntityFactory>,
    pub(crate) sink: Box<dyn ScoreSink>,
    levels: Vec<LevelDef>,
    pub(crate) level_index: usize,
    pub(crate) level: LevelInfo,
    pub(crate) phase: Phase,
    pub(crate) pending: Action,
    /// Failures the loop survived (leaderboard I/O and the like).
    pub(crate) degraded: Vec<SimError>,
    /// False once a game has ended or been abandoned.
    session_ready: bool,
}

// ── Construction ──

impl Model {
    pub fn new(
        config: GameConfig,
        levels: Vec<LevelDef>,
        factory: Box<dyn EntityFactory>,
        sink: Box<dyn ScoreSink>,
    ) -> Result<Self> {
        if levels.is_empty() {
            return Err(SimError::invalid_argument("at least one level is required"));
        }
        let physics = PhysicsEngine::new(config.physics.gravity, TILE_SIZE, TILE_SIZE)?;
        let mut model = Model {
            entities: vec![],
            next_id: 1,
            physics,
            config,
            factory,
            sink,
            levels,
            level_index: 0,
            level: LevelInfo::default(),
            phase: Phase::Title,
            pending: Action::None,
            degraded: vec![],
            session_ready: true,
        };
        model.load_level(0, None)?;
        Ok(model)
    }

    /// Levels from the config, the default factory, and a score board that
    /// records sessions in the configured leaderboard file.
    pub fn with_defaults(config: GameConfig) -> Result<Self> {
        let levels = level::load_levels(&config);
        let factory = Box::new(DefaultFactory::new(&config));
        let path = leaderboard::resolve_path(&config.leaderboard_file);
        let sink = Box::new(ScoreBoard::with_leaderboard(&config.scoring, path));
        Model::new(config, levels, factory, sink)
    }
}

// ── Queries ──

impl Model {
    /// Live entities in collection order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn main_character(&self) -> Option<&Character> {
        self.main_character_entity().and_then(Entity::as_character)
    }

    pub fn main_character_entity(&self) -> Option<&Entity> {
        self.character_index().map(|i| &self.entities[i])
    }

    pub(crate) fn character_index(&self) -> Option<usize> {
        self.entities
            .iter()
            .position(|e| e.is_live() && matches!(e.kind, EntityKind::Character(_)))
    }

    pub(crate) fn character_mut(&mut self) -> Option<&mut Character> {
        let i = self.character_index()?;
        self.entities[i].as_character_mut()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level_info(&self) -> &LevelInfo {
        &self.level
    }

    pub fn bonus(&self) -> u32 {
        self.sink.bonus()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Drain the degraded-mode failures collected since the last call.
    pub fn take_degraded_errors(&mut self) -> Vec<SimError> {
        std::mem::take(&mut self.degraded)
    }

    pub fn snapshot(&self) -> Snapshot {
        let character = self.main_character();
        Snapshot {
            world_width: self.level.width,
            world_height: self.level.height,
            items: snapshot::render_items(&self.entities),
            hud: Hud {
                score: character.map_or(0, |c| c.score),
                lives: character.map_or(0, |c| c.lives),
                bonus: self.sink.bonus(),
                level: self.level_index + 1,
                level_name: self.level.name.clone(),
                phase: self.phase,
                power_remaining: character.and_then(|c| c.state.power_remaining()),
            },
        }
    }
}

// ── Commands ──

impl Model {
    /// Advance the simulation by `delta_time` seconds.
    pub fn update(&mut self, delta_time: f32) -> Result<Vec<GameEvent>> {
        step::step(self, delta_time)
    }

    /// The command applied at the start of the next update. A later call
    /// before that update replaces it.
    pub fn queue_command(&mut self, action: Action) {
        self.pending = action;
    }

    /// Insert an entity built outside the factory. The id is assigned here.
    pub fn add_entity(&mut self, body: Body, kind: EntityKind) -> Result<EntityId> {
        let p = body.position;
        let v = body.velocity;
        if !(p.x.is_finite() && p.y.is_finite() && v.x.is_finite() && v.y.is_finite()) {
            return Err(SimError::invalid_argument("entity position and velocity must be finite"));
        }
        if matches!(kind, EntityKind::Character(_)) && self.character_index().is_some() {
            return Err(SimError::invalid_argument("the model already owns a main character"));
        }
        Ok(self.push_entity(body, kind))
    }

    pub(crate) fn push_entity(&mut self, body: Body, kind: EntityKind) -> EntityId {
        let id = self.fresh_id();
        self.entities.push(Entity::new(id, body, kind));
        id
    }

    pub(crate) fn fresh_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    pub fn set_state(&mut self, next: Phase) -> Result<()> {
        use Phase::*;
        let from = self.phase;
        match (from, next) {
            (Title, Title) => {}
            (Title, Playing) => {
                let dead = self.main_character().map_or(true, Character::is_dead);
                if !self.session_ready || dead {
                    self.start_session()?;
                }
            }
            (Playing, Paused) | (Paused, Playing) => {}
            (Paused, Title) | (GameOver, Title) => self.session_ready = false,
            (Playing, GameOver) => {
                let mut events = vec![];
                self.finish_game(&mut events);
                return Ok(());
            }
            _ => return Err(SimError::invalid_state(from, next)),
        }
        log::debug!("phase {from:?} -> {next:?}");
        self.phase = next;
        Ok(())
    }

    /// External reset: a fresh session on the first level, back at the
    /// title. This is the only way a Dead character returns to Normal.
    pub fn reset_game(&mut self) -> Result<()> {
        self.start_session()?;
        self.phase = Phase::Title;
        Ok(())
    }

    fn start_session(&mut self) -> Result<()> {
        self.sink.begin_session();
        self.pending = Action::None;
        let lives = self.config.character.lives;
        let carry = self.main_character().cloned().map(|mut c| {
            c.reset(lives);
            c
        });
        self.load_level(0, carry)?;
        self.session_ready = true;
        log::info!("new game");
        Ok(())
    }
}

// ── Level lifecycle ──

impl Model {
    /// Replace the entity collection with the initial layout of level
    /// `index`. A carried character keeps its lives and score.
    pub(crate) fn load_level(&mut self, index: usize, carry: Option<Character>) -> Result<()> {
        let def = self
            .levels
            .get(index)
            .ok_or_else(|| SimError::invalid_argument(format!("no level {index}")))?;
        let layout = level::populate(def, self.factory.as_ref())?;
        self.physics.set_world_size(layout.width, layout.height)?;

        self.level = LevelInfo {
            name: def.name.clone(),
            breakables: layout.breakables,
            has_goal: layout.has_goal,
            transform_threshold: layout
                .transform_threshold
                .unwrap_or(self.config.hazards.transform_threshold),
            width: layout.width,
            height: layout.height,
        };
        self.level_index = index;

        self.entities.clear();
        for (body, mut kind) in layout.entities {
            if let (EntityKind::Character(fresh), Some(kept)) = (&mut kind, &carry) {
                *fresh = kept.clone();
                fresh.respawn();
            }
            self.push_entity(body, kind);
        }
        self.sink.start_level_bonus(self.config.scoring.bonus_start);
        log::info!("level {} '{}' loaded ({} entities)", index + 1, self.level.name, self.entities.len());
        Ok(())
    }

    /// Back to the level's initial layout after a lost life.
    pub(crate) fn restart_level(&mut self) -> Result<()> {
        let carry = self.main_character().cloned();
        self.load_level(self.level_index, carry)
    }

    /// Next level, wrapping after the last.
    pub(crate) fn advance_level(&mut self) -> Result<()> {
        let carry = self.main_character().cloned();
        let next = (self.level_index + 1) % self.levels.len();
        self.load_level(next, carry)
    }

    /// Enter GameOver and hand the session to the score sink. A sink
    /// failure is kept for the frontend, never raised.
    pub(crate) fn finish_game(&mut self, events: &mut Vec<GameEvent>) {
        let score = self.main_character().map_or(self.sink.total(), |c| c.score);
        self.phase = Phase::GameOver;
        self.session_ready = false;
        log::info!("game over, score {score}");
        events.push(GameEvent::GameOver { score });
        let name = self.config.player_name.clone();
        if let Err(e) = self.sink.end_session(&name) {
            log::warn!("session not recorded: {e}");
            self.degraded.push(e);
        }
    }
}
