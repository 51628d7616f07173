/// The step function: advances the Model by one frame.
///
/// Processing order:
///   a. Player command (ESCAPE pauses and ends the frame)
///   b. Spawner polling: new barrels join the collection
///   c. Entity updates (timers, lifts, hazard steering)
///   d. Physics pass, then jump-over scoring
///   e. Lost a life (and still alive): back to the level's initial layout
///   f. Cleanup: fire transforms, broken rivets, destroyed entities dropped
///   g. Level clear: bonus converted, next level loaded
///   h. Bonus countdown
///   i. Game over check
///
/// Points are awarded from the frame's events between (f) and (g), so a
/// level-clearing frame still scores everything that happened in it.

use crate::domain::entity::{Action, CollectibleKind, Climbable, Entity, EntityKind, LadderSpan};
use crate::domain::enemy::{self, HazardKind};
use crate::error::{check_delta, Result};
use super::event::GameEvent;
use super::world::{Model, Phase};

/// How far above a barrel's top the feet may be for a jump to count.
pub const JUMP_OVER_CLEARANCE: f32 = 24.0;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(model: &mut Model, delta_time: f32) -> Result<Vec<GameEvent>> {
    check_delta(delta_time)?;
    if model.phase != Phase::Playing {
        return Ok(vec![]);
    }
    let mut events: Vec<GameEvent> = Vec::new();

    let action = std::mem::take(&mut model.pending);
    if action == Action::Escape {
        model.phase = Phase::Paused;
        events.push(GameEvent::Paused);
        return Ok(events);
    }

    let lives_before = model.main_character().map(|c| c.lives);

    apply_command(model, action, &mut events);
    spawn_hazards(model, delta_time, &mut events);
    update_entities(model, delta_time, &mut events);
    model.physics.step(&mut model.entities, delta_time, &mut events)?;
    score_jump_overs(model, &mut events);

    let restarted = restart_after_life_lost(model, lives_before, &mut events)?;
    if !restarted {
        transform_hazards(model, &mut events);
        break_vacated_platforms(model, &mut events);
        model.entities.retain(Entity::is_live);
    }
    award_points(model, &mut events);
    if !restarted {
        check_level_clear(model, &mut events)?;
    }

    model.sink.tick_bonus(delta_time);

    if model.main_character().map_or(false, |c| c.is_dead()) {
        model.finish_game(&mut events);
    }

    Ok(events)
}

// ══════════════════════════════════════════════════════════════
// (a) Command
// ══════════════════════════════════════════════════════════════

fn apply_command(model: &mut Model, action: Action, events: &mut Vec<GameEvent>) {
    let Some(idx) = model.character_index() else { return };
    let ladder = ladder_for(&model.entities, idx, action);
    let Entity { body, kind, .. } = &mut model.entities[idx];
    if let EntityKind::Character(c) = kind {
        c.apply_action(body, action, ladder, events);
    }
}

/// The ladder the character would grab: overlapping and within grab
/// range, preferring one that continues in the requested direction, then
/// the nearest.
fn ladder_for(entities: &[Entity], idx: usize, action: Action) -> Option<LadderSpan> {
    let me = &entities[idx];
    let c = me.as_character()?;
    let rect = me.rect();
    let cx = rect.center_x();
    let feet = rect.bottom;
    let tol = c.tuning.grab_tolerance;

    let reaches = |s: &LadderSpan| match action {
        Action::MoveUp => s.reaches_above(feet),
        Action::MoveDown => s.reaches_below(feet),
        _ => true,
    };
    let candidates = entities
        .iter()
        .filter(|e| e.is_live() && e.rect().overlaps(&rect))
        .filter_map(|e| e.ladder_span())
        .filter(|s| s.within_grab(cx, tol));
    candidates.min_by(|a, b| {
        let ka = (!reaches(a), (a.center_x - cx).abs());
        let kb = (!reaches(b), (b.center_x - cx).abs());
        ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal)
    })
}

// ══════════════════════════════════════════════════════════════
// (b) Spawners
// ══════════════════════════════════════════════════════════════

fn spawn_hazards(model: &mut Model, delta_time: f32, events: &mut Vec<GameEvent>) {
    if model.main_character().map_or(true, |c| c.is_dead()) {
        return;
    }
    let bonus_fraction = model.sink.bonus_fraction();
    let mut requests = vec![];
    for e in model.entities.iter_mut().filter(|e| e.is_live()) {
        let origin = e.rect();
        if let EntityKind::Spawner(s) = &mut e.kind {
            if let Some(req) = s.poll(&origin, delta_time, bonus_fraction) {
                requests.push(req);
            }
        }
    }
    for req in requests {
        let (body, kind) = model.factory.create_barrel(&req);
        let id = model.push_entity(body, kind);
        log::debug!("barrel {id} thrown (fire-capable: {})", req.can_transform_to_fire);
        events.push(GameEvent::HazardSpawned { id, can_transform_to_fire: req.can_transform_to_fire });
    }
}

// ══════════════════════════════════════════════════════════════
// (c) Entity updates
// ══════════════════════════════════════════════════════════════

fn update_entities(model: &mut Model, delta_time: f32, events: &mut Vec<GameEvent>) {
    for e in model.entities.iter_mut().filter(|e| e.is_live()) {
        e.update(delta_time, events);
    }
}

// ══════════════════════════════════════════════════════════════
// (d) Jump-over scoring
// ══════════════════════════════════════════════════════════════

/// A barrel passing under a jumping character scores once per jump.
fn score_jump_overs(model: &mut Model, events: &mut Vec<GameEvent>) {
    let Some(idx) = model.character_index() else { return };
    let me = &model.entities[idx];
    let Some(c) = me.as_character() else { return };
    if !c.is_jumping || c.is_dead() {
        return;
    }
    let serial = c.jump_serial;
    let rect = me.rect();

    for e in model.entities.iter_mut().filter(|e| e.is_live()) {
        let barrel = e.rect();
        let EntityKind::Hazard(h) = &mut e.kind else { continue };
        if h.kind != HazardKind::Barrel || h.scored_jump == Some(serial) {
            continue;
        }
        let under = barrel.left <= rect.right && rect.left <= barrel.right;
        let gap = barrel.top - rect.bottom;
        if under && (0.0..=JUMP_OVER_CLEARANCE).contains(&gap) {
            h.scored_jump = Some(serial);
            events.push(GameEvent::JumpedOver { id: e.id });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// (e) Life lost
// ══════════════════════════════════════════════════════════════

/// Returns true if the level was reset.
fn restart_after_life_lost(model: &mut Model, lives_before: Option<u32>, events: &mut Vec<GameEvent>) -> Result<bool> {
    let Some(c) = model.main_character() else { return Ok(false) };
    if lives_before == Some(c.lives) || c.is_dead() {
        return Ok(false);
    }
    log::info!("life lost, {} remaining", c.lives);
    model.restart_level()?;
    events.push(GameEvent::LevelRestarted);
    Ok(true)
}

// ══════════════════════════════════════════════════════════════
// (f) Cleanup
// ══════════════════════════════════════════════════════════════

/// Barrels that crossed the threshold become fire, under a new id.
/// A barrel destroyed this frame stays destroyed.
fn transform_hazards(model: &mut Model, events: &mut Vec<GameEvent>) {
    let threshold = model.level.transform_threshold;
    for i in 0..model.entities.len() {
        let e = &model.entities[i];
        if !e.is_live() {
            continue;
        }
        let Some(h) = e.as_hazard() else { continue };
        if h.kind != HazardKind::Barrel || !h.can_transform_to_fire {
            continue;
        }
        if !enemy::crossed_threshold(h.prev_x, e.body.position.x, threshold) {
            continue;
        }
        let (fire, body) = h.into_fire(&e.body);
        let from = e.id;
        let to = model.fresh_id();
        model.entities[i] = Entity::new(to, body, EntityKind::Hazard(fire));
        log::debug!("barrel {from} became fire {to}");
        events.push(GameEvent::HazardTransformed { from, to });
    }
}

/// Rivets give way once the character steps off them.
fn break_vacated_platforms(model: &mut Model, events: &mut Vec<GameEvent>) {
    for e in model.entities.iter_mut().filter(|e| e.is_live()) {
        let Some(p) = e.as_platform() else { continue };
        if p.can_break() && p.just_vacated() {
            e.destroyed = true;
            events.push(GameEvent::RivetBroken { id: e.id });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Scoring
// ══════════════════════════════════════════════════════════════

fn points_for(model: &Model, event: &GameEvent) -> u32 {
    let scoring = &model.config.scoring;
    match event {
        GameEvent::HazardSmashed { .. } => scoring.smash_points,
        GameEvent::JumpedOver { .. } => scoring.jump_over_points,
        GameEvent::RivetBroken { .. } => scoring.rivet_points,
        GameEvent::Collected { kind: CollectibleKind::Bonus, .. } => scoring.item_points,
        _ => 0,
    }
}

fn award_points(model: &mut Model, events: &mut Vec<GameEvent>) {
    let earned: Vec<u32> = events
        .iter()
        .map(|ev| points_for(model, ev))
        .filter(|&p| p > 0)
        .collect();
    for amount in earned {
        model.sink.earn_points(amount);
        if let Some(c) = model.character_mut() {
            c.score = c.score.saturating_add(amount);
        }
        events.push(GameEvent::PointsEarned { amount });
    }
}

// ══════════════════════════════════════════════════════════════
// (g) Level clear
// ══════════════════════════════════════════════════════════════

fn check_level_clear(model: &mut Model, events: &mut Vec<GameEvent>) -> Result<()> {
    if model.main_character().map_or(true, |c| c.is_dead()) {
        return Ok(());
    }
    let goal = events.iter().any(|e| *e == GameEvent::GoalReached);
    let rivets_gone = model.level.breakables > 0
        && !model
            .entities
            .iter()
            .any(|e| e.is_live() && e.as_platform().map_or(false, |p| p.can_break()));
    if !(goal || rivets_gone) {
        return Ok(());
    }

    let bonus = model.sink.end_level();
    if let Some(c) = model.character_mut() {
        c.score = c.score.saturating_add(bonus);
    }
    let level = model.level_index;
    log::info!("level {} cleared, bonus {bonus}", level + 1);
    events.push(GameEvent::LevelCleared { level, bonus });
    model.advance_level()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::character::Character;
    use crate::domain::enemy::Hazard;
    use crate::domain::entity::Body;
    use crate::domain::geometry::{BoundingBox, Position, Vector};
    use crate::domain::rules::CharacterState;
    use crate::sim::factory::{DefaultFactory, BARREL_SIZE, ITEM_SIZE};
    use crate::sim::level::LevelDef;
    use crate::sim::score::ScoreBoard;
    use crate::sim::snapshot::Phase;

    const DT: f32 = 1.0 / 60.0;

    fn level(name: &str, rows: &[&str]) -> LevelDef {
        LevelDef { name: name.into(), rows: rows.iter().map(|r| r.to_string()).collect() }
    }

    fn model_with(levels: Vec<LevelDef>) -> Model {
        let config = GameConfig::default();
        let factory = Box::new(DefaultFactory::new(&config));
        let sink = Box::new(ScoreBoard::new(&config.scoring));
        let mut m = Model::new(config, levels, factory, sink).unwrap();
        m.set_state(Phase::Playing).unwrap();
        m
    }

    fn flat() -> Model {
        model_with(vec![level("Flat", &["..........", "..M.......", "=========="])])
    }

    /// Let the character settle on the floor.
    fn settle(m: &mut Model) {
        for _ in 0..30 {
            m.update(DT).unwrap();
        }
    }

    fn character(m: &Model) -> &Character {
        m.main_character().unwrap()
    }

    fn character_body(m: &Model) -> Body {
        m.main_character_entity().unwrap().body
    }

    fn hazard_ids(m: &Model, kind: HazardKind) -> Vec<u32> {
        m.entities()
            .iter()
            .filter(|e| e.as_hazard().map_or(false, |h| h.kind == kind))
            .map(|e| e.id)
            .collect()
    }

    #[test]
    fn negative_delta_fails_fast() {
        let mut m = flat();
        assert!(m.update(-0.01).is_err());
    }

    #[test]
    fn character_stands_on_floor() {
        let mut m = flat();
        settle(&mut m);
        assert!(character(&m).is_on_ground);
        assert_eq!(character_body(&m).bottom(), 32.0);
    }

    #[test]
    fn escape_pauses() {
        let mut m = flat();
        m.queue_command(Action::Escape);
        let events = m.update(DT).unwrap();
        assert_eq!(events, vec![GameEvent::Paused]);
        assert_eq!(m.phase(), Phase::Paused);
        assert!(m.update(DT).unwrap().is_empty());
    }

    #[test]
    fn walking_moves_right() {
        let mut m = flat();
        settle(&mut m);
        let x0 = character_body(&m).position.x;
        for _ in 0..10 {
            m.queue_command(Action::MoveRight);
            m.update(DT).unwrap();
        }
        assert!(character_body(&m).position.x > x0);
        assert!(character(&m).is_facing_right);
    }

    #[test]
    fn barrel_becomes_fire_when_crossing_threshold() {
        let mut m = flat();
        m.level.transform_threshold = 110.0;
        let mut barrel = Hazard::barrel(2.0, 1.0, true, 320.0);
        barrel.prev_x = 100.0;
        let mut body = Body::new(Position::new(100.0, 20.0), BARREL_SIZE);
        body.velocity = Vector::new(2.0, 0.0);
        let id = m.add_entity(body, EntityKind::Hazard(barrel)).unwrap();

        let mut transformed = None;
        for _ in 0..5 {
            for ev in m.update(1.0).unwrap() {
                if let GameEvent::HazardTransformed { from, to } = ev {
                    transformed = Some((from, to));
                }
            }
            if transformed.is_some() {
                break;
            }
        }
        let (from, to) = transformed.expect("barrel should turn into fire");
        assert_eq!(from, id);
        assert_ne!(to, id);
        assert!(hazard_ids(&m, HazardKind::Barrel).iter().all(|&b| b != id));
        let fire = m.entities().iter().find(|e| e.id == to).unwrap();
        assert_eq!(fire.as_hazard().map(|h| h.kind), Some(HazardKind::Fire));
        assert!(fire.body.velocity.x < 0.0);
        assert_eq!(fire.body.velocity.y, 0.0);
    }

    #[test]
    fn barrel_without_flag_stays_barrel() {
        let mut m = flat();
        m.level.transform_threshold = 110.0;
        let mut body = Body::new(Position::new(100.0, 20.0), BARREL_SIZE);
        body.velocity = Vector::new(2.0, 0.0);
        let id = m.add_entity(body, EntityKind::Hazard(Hazard::barrel(2.0, 1.0, false, 320.0))).unwrap();
        for _ in 0..10 {
            m.update(1.0).unwrap();
        }
        assert!(hazard_ids(&m, HazardKind::Fire).is_empty());
        assert_eq!(hazard_ids(&m, HazardKind::Barrel), vec![id]);
    }

    #[test]
    fn destroyed_barrel_is_not_transformed() {
        let mut m = flat();
        m.level.transform_threshold = 50.0;
        let mut barrel = Hazard::barrel(2.0, 1.0, true, 320.0);
        barrel.prev_x = 49.0;
        let body = Body::new(Position::new(51.0, 20.0), BARREL_SIZE);
        let id = m.add_entity(body, EntityKind::Hazard(barrel)).unwrap();
        let i = m.entities.iter().position(|e| e.id == id).unwrap();
        m.entities[i].destroyed = true;

        let mut events = vec![];
        transform_hazards(&mut m, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn hazard_contact_costs_a_life_and_restarts() {
        let mut m = flat();
        settle(&mut m);
        let spawn = character_body(&m).position;
        // walk away from the spawn first
        for _ in 0..20 {
            m.queue_command(Action::MoveRight);
            m.update(DT).unwrap();
        }
        let body = character_body(&m);
        let fire = Hazard::new(HazardKind::Fire, 0.0, 1.0, false, 320.0);
        m.add_entity(Body::new(body.position, BARREL_SIZE), EntityKind::Hazard(fire)).unwrap();

        let events = m.update(DT).unwrap();
        assert!(events.contains(&GameEvent::LifeLost { remaining: 2 }));
        assert!(events.contains(&GameEvent::LevelRestarted));
        assert_eq!(character(&m).lives, 2);
        assert!(hazard_ids(&m, HazardKind::Fire).is_empty());
        assert_eq!(character_body(&m).position, spawn);
        assert_eq!(m.phase(), Phase::Playing);
    }

    #[test]
    fn last_life_ends_the_game() {
        let mut m = flat();
        settle(&mut m);
        if let Some(c) = m.character_mut() {
            c.lives = 1;
        }
        let body = character_body(&m);
        let fire = Hazard::new(HazardKind::Fire, 0.0, 1.0, false, 320.0);
        m.add_entity(Body::new(body.position, BARREL_SIZE), EntityKind::Hazard(fire)).unwrap();

        let events = m.update(DT).unwrap();
        assert_eq!(character(&m).lives, 0);
        assert!(character(&m).is_dead());
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
        assert!(!events.contains(&GameEvent::LevelRestarted));
        assert_eq!(m.phase(), Phase::GameOver);
        assert!(m.update(DT).unwrap().is_empty());
    }

    #[test]
    fn powered_up_smashes_and_scores() {
        let mut m = flat();
        settle(&mut m);
        if let Some(c) = m.character_mut() {
            c.state = CharacterState::PoweredUp { remaining: 5.0 };
        }
        let body = character_body(&m);
        let barrel = Hazard::barrel(0.0, 1.0, false, 320.0);
        let mut hb = Body::new(body.position, BARREL_SIZE);
        hb.position = hb.position.with_y(body.bottom() - BARREL_SIZE.h());
        let id = m.add_entity(hb, EntityKind::Hazard(barrel)).unwrap();

        let events = m.update(DT).unwrap();
        assert!(events.contains(&GameEvent::HazardSmashed { id }));
        assert!(events.contains(&GameEvent::PointsEarned { amount: 300 }));
        assert_eq!(character(&m).lives, 3);
        assert_eq!(character(&m).score, 300);
        assert!(m.entities().iter().all(|e| e.id != id));
    }

    #[test]
    fn bonus_item_collected_once() {
        let mut m = flat();
        settle(&mut m);
        let body = character_body(&m);
        let id = m.add_entity(Body::new(body.position, ITEM_SIZE), EntityKind::Collectible(CollectibleKind::Bonus)).unwrap();

        let events = m.update(DT).unwrap();
        assert!(events.contains(&GameEvent::Collected { id, kind: CollectibleKind::Bonus }));
        assert_eq!(character(&m).score, 500);
        assert!(m.entities().iter().all(|e| e.id != id));
        let later = m.update(DT).unwrap();
        assert!(!later.iter().any(|e| matches!(e, GameEvent::Collected { .. })));
    }

    #[test]
    fn jumping_over_a_barrel_scores_once() {
        let mut m = model_with(vec![level("Tall", &[
            "..........",
            "..........",
            "..........",
            "..........",
            "..M.......",
            "==========",
        ])]);
        settle(&mut m);
        m.queue_command(Action::Jump);
        m.update(DT).unwrap();
        for _ in 0..8 {
            m.update(DT).unwrap();
        }
        assert!(character(&m).is_jumping);

        // a barrel resting right under the airborne character
        let body = character_body(&m);
        assert!(body.bottom() < 80.0 - BARREL_SIZE.h());
        let mut hb = Body::new(Position::new(body.position.x, 80.0 - BARREL_SIZE.h()), BARREL_SIZE);
        hb.velocity = Vector::ZERO;
        let barrel = Hazard::barrel(0.0, 1.0, false, 320.0);
        let id = m.add_entity(hb, EntityKind::Hazard(barrel)).unwrap();

        let mut jumped = 0;
        for _ in 0..3 {
            let events = m.update(DT).unwrap();
            jumped += events.iter().filter(|e| **e == GameEvent::JumpedOver { id }).count();
        }
        assert_eq!(jumped, 1);
        assert_eq!(character(&m).score, 100);
    }

    #[test]
    fn reaching_the_goal_advances_and_banks_bonus() {
        let mut m = model_with(vec![
            level("One", &["..........", "..MP......", "=========="]),
            level("Two", &["..........", "..M.......", "=========="]),
        ]);
        let mut cleared = None;
        for _ in 0..30 {
            m.queue_command(Action::MoveRight);
            for ev in m.update(DT).unwrap() {
                if let GameEvent::LevelCleared { level, bonus } = ev {
                    cleared = Some((level, bonus));
                }
            }
            if cleared.is_some() {
                break;
            }
        }
        let (level, bonus) = cleared.expect("goal should clear the level");
        assert_eq!(level, 0);
        assert_eq!(bonus, 5000);
        assert_eq!(m.level_index(), 1);
        assert_eq!(m.level_info().name, "Two");
        assert_eq!(character(&m).score, 5000);
        assert_eq!(character(&m).lives, 3);
        assert_eq!(m.bonus(), 5000);
    }

    #[test]
    fn levels_wrap_after_the_last() {
        let mut m = model_with(vec![level("Only", &["..........", "..MP......", "=========="])]);
        for _ in 0..30 {
            m.queue_command(Action::MoveRight);
            m.update(DT).unwrap();
        }
        assert_eq!(m.level_index(), 0);
        assert!(character(&m).score >= 5000);
    }

    #[test]
    fn walking_off_every_rivet_clears_the_level() {
        let mut m = model_with(vec![
            level("Rivet", &["..........", "...M......", "...#======"]),
            level("Next", &["..........", "..M.......", "=========="]),
        ]);
        settle(&mut m);
        let mut events = vec![];
        for _ in 0..40 {
            m.queue_command(Action::MoveRight);
            events.extend(m.update(DT).unwrap());
            if m.level_index() == 1 {
                break;
            }
        }
        assert!(events.iter().any(|e| matches!(e, GameEvent::RivetBroken { .. })));
        assert!(events.contains(&GameEvent::PointsEarned { amount: 100 }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelCleared { level: 0, .. })));
        assert_eq!(m.level_index(), 1);
    }

    #[test]
    fn spawner_throws_barrels() {
        let mut m = model_with(vec![level("Kong", &[
            "..........",
            "..........",
            "K.........",
            "==========",
            "..M.......",
            "==========",
        ])]);
        let mut spawned = vec![];
        for _ in 0..(5.0 / DT) as usize {
            for ev in m.update(DT).unwrap() {
                if let GameEvent::HazardSpawned { id, .. } = ev {
                    spawned.push(id);
                }
            }
        }
        assert!(!spawned.is_empty());
        let ids: Vec<u32> = m.entities().iter().map(|e| e.id).collect();
        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn climbing_a_ladder() {
        let mut m = model_with(vec![level("Ladder", &[
            "..........",
            "..........",
            "===+======",
            "...H......",
            "...HM.....",
            "==========",
        ])]);
        settle(&mut m);
        // step left onto the ladder column
        for _ in 0..30 {
            m.queue_command(Action::MoveLeft);
            m.update(DT).unwrap();
            if m.main_character().map_or(false, |c| {
                let b = character_body(&m);
                (b.center_x() - 56.0).abs() <= c.tuning.grab_tolerance
            }) {
                break;
            }
        }
        m.queue_command(Action::MoveUp);
        let events = m.update(DT).unwrap();
        assert!(events.contains(&GameEvent::ClimbStarted));
        assert!(character(&m).is_climbing());
        assert_eq!(character_body(&m).center_x(), 56.0);

        let mut ended = false;
        for _ in 0..200 {
            m.queue_command(Action::MoveUp);
            if m.update(DT).unwrap().contains(&GameEvent::ClimbEnded) {
                ended = true;
                break;
            }
        }
        assert!(ended);
        assert!(!character(&m).is_climbing());
        assert_eq!(character_body(&m).bottom(), 32.0);
    }

    #[test]
    fn points_only_for_scoring_events() {
        let m = flat();
        assert_eq!(points_for(&m, &GameEvent::Jumped), 0);
        assert_eq!(points_for(&m, &GameEvent::Collected { id: 1, kind: CollectibleKind::Hammer }), 0);
        assert_eq!(points_for(&m, &GameEvent::HazardSmashed { id: 1 }), 300);
    }

    #[test]
    fn restarting_keeps_score() {
        let mut m = flat();
        settle(&mut m);
        if let Some(c) = m.character_mut() {
            c.score = 1200;
        }
        let body = character_body(&m);
        let fire = Hazard::new(HazardKind::Fire, 0.0, 1.0, false, 320.0);
        m.add_entity(Body::new(body.position, BoundingBox::new(12, 12)), EntityKind::Hazard(fire)).unwrap();
        m.update(DT).unwrap();
        assert_eq!(character(&m).score, 1200);
        assert_eq!(character(&m).lives, 2);
    }
}
