/// The playable character.
///
/// Holds the state machine value plus the flags the frame loop needs
/// (`is_on_ground`, `is_jumping`, facing). Legality comes from `rules`;
/// this module applies the effects: velocities, snapping, life loss.

use super::entity::{
    Action, Body, BoundaryHit, CollectibleKind, Contact, EntityId, GravityAffected, LadderSpan, Touched,
    EDGE_EPSILON,
};
use super::geometry::{CollisionSide, Vector};
use super::rules::{self, CharacterState, StateEvent, StateTag};
use crate::config::GameConfig;
use crate::sim::event::GameEvent;

/// Side contacts this close to a platform's top edge are treated as
/// stepping onto it.
const STEP_UP: f32 = 2.0;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CharacterTuning {
    pub move_speed: f32,
    pub jump_force: f32,
    pub climb_speed: f32,
    pub max_fall_speed: f32,
    pub powerup_duration: f32,
    pub grab_tolerance: f32,
}

impl CharacterTuning {
    pub fn from_config(cfg: &GameConfig) -> Self {
        CharacterTuning {
            move_speed: cfg.character.move_speed,
            jump_force: cfg.character.jump_force,
            climb_speed: cfg.character.climb_speed,
            max_fall_speed: cfg.physics.max_fall_speed,
            powerup_duration: cfg.character.powerup_duration,
            grab_tolerance: cfg.character.ladder_grab_tolerance,
        }
    }
}

impl Default for CharacterTuning {
    fn default() -> Self {
        CharacterTuning::from_config(&GameConfig::default())
    }
}

#[derive(Clone, Debug)]
pub struct Character {
    pub state: CharacterState,
    pub lives: u32,
    pub score: u32,
    pub is_on_ground: bool,
    pub is_jumping: bool,
    pub is_facing_right: bool,
    /// Friction of the platform last stood on.
    pub ground_friction: f32,
    /// Incremented on every honoured jump.
    pub jump_serial: u32,
    pub tuning: CharacterTuning,
    hit_this_frame: bool,
}

impl Character {
    pub fn new(lives: u32, tuning: CharacterTuning) -> Self {
        Character {
            state: if lives == 0 { CharacterState::Dead } else { CharacterState::Normal },
            lives,
            score: 0,
            is_on_ground: false,
            is_jumping: false,
            is_facing_right: true,
            ground_friction: 1.0,
            jump_serial: 0,
            tuning,
            hit_this_frame: false,
        }
    }

    pub fn is_climbing(&self) -> bool {
        matches!(self.state, CharacterState::Climbing(_))
    }

    pub fn is_dead(&self) -> bool {
        self.state == CharacterState::Dead
    }

    /// Back to Normal at the level spawn after a lost life. Lives and score
    /// are kept.
    pub fn respawn(&mut self) {
        if !self.is_dead() {
            self.state = CharacterState::Normal;
        }
        self.is_on_ground = false;
        self.is_jumping = false;
        self.is_facing_right = true;
        self.ground_friction = 1.0;
        self.hit_this_frame = false;
    }

    /// External reset: the only way out of Dead.
    pub fn reset(&mut self, lives: u32) {
        self.state = rules::transition(self.state, StateEvent::Reset);
        self.lives = lives;
        self.score = 0;
        self.jump_serial = 0;
        self.respawn();
    }

    // ── Commands ──

    /// Apply one player command. `ladder` is the ladder within grab range,
    /// if any.
    pub fn apply_action(
        &mut self,
        body: &mut Body,
        action: Action,
        ladder: Option<LadderSpan>,
        events: &mut Vec<GameEvent>,
    ) {
        match self.state {
            CharacterState::Dead => {}
            CharacterState::Climbing(_) => {
                let climb = self.tuning.climb_speed;
                body.velocity = match action {
                    Action::MoveUp => Vector::new(0.0, -climb),
                    Action::MoveDown => Vector::new(0.0, climb),
                    _ => Vector::ZERO,
                };
            }
            CharacterState::Normal | CharacterState::PoweredUp { .. } => {
                let mut steering = false;
                match action {
                    Action::MoveLeft => {
                        body.velocity = body.velocity.with_x(-self.tuning.move_speed);
                        self.is_facing_right = false;
                        steering = true;
                    }
                    Action::MoveRight => {
                        body.velocity = body.velocity.with_x(self.tuning.move_speed);
                        self.is_facing_right = true;
                        steering = true;
                    }
                    Action::MoveUp | Action::MoveDown => {
                        let down = action == Action::MoveDown;
                        if let Some(span) = ladder {
                            if self.try_grab(body, span, down, events) {
                                let climb = self.tuning.climb_speed;
                                body.velocity = Vector::new(0.0, if down { climb } else { -climb });
                                return;
                            }
                        }
                    }
                    Action::Jump => self.jump(body, events),
                    Action::Escape | Action::Enter | Action::None => {}
                }
                if !steering && self.is_on_ground {
                    let keep = 1.0 - self.ground_friction;
                    body.velocity = body.velocity.with_x(body.velocity.x * keep);
                }
            }
        }
    }

    fn jump(&mut self, body: &mut Body, events: &mut Vec<GameEvent>) {
        if !self.state.can_jump() || !self.is_on_ground {
            return;
        }
        body.velocity = body.velocity.with_y(-self.tuning.jump_force);
        self.is_on_ground = false;
        self.is_jumping = true;
        self.jump_serial = self.jump_serial.wrapping_add(1);
        events.push(GameEvent::Jumped);
    }

    fn try_grab(&mut self, body: &mut Body, span: LadderSpan, down: bool, events: &mut Vec<GameEvent>) -> bool {
        if !self.state.can_climb() || !self.is_on_ground {
            return false;
        }
        if !span.within_grab(body.center_x(), self.tuning.grab_tolerance) {
            return false;
        }
        let feet = body.bottom();
        let reaches = if down { span.reaches_below(feet) } else { span.reaches_above(feet) };
        if !reaches {
            return false;
        }
        self.state = rules::transition(self.state, StateEvent::GrabLadder(span));
        if !self.is_climbing() {
            return false;
        }
        body.position = body.position.with_x(span.center_x - body.size.w() * 0.5);
        body.velocity = Vector::ZERO;
        self.is_on_ground = false;
        self.is_jumping = false;
        log::debug!("climb start at x={:.1}", span.center_x);
        events.push(GameEvent::ClimbStarted);
        true
    }

    fn finish_climb(&mut self, body: &mut Body, feet_y: f32, events: &mut Vec<GameEvent>) {
        body.set_bottom(feet_y);
        body.velocity = Vector::ZERO;
        self.state = rules::transition(self.state, StateEvent::LeaveLadder);
        self.is_on_ground = true;
        events.push(GameEvent::ClimbEnded);
    }

    // ── Per-frame ──

    pub fn update(&mut self, body: &mut Body, delta_time: f32, events: &mut Vec<GameEvent>) {
        self.hit_this_frame = false;
        match self.state {
            CharacterState::PoweredUp { .. } => {
                self.state = rules::transition(self.state, StateEvent::Tick(delta_time));
                if self.state == CharacterState::Normal {
                    log::debug!("power-up expired");
                    events.push(GameEvent::PowerUpExpired);
                }
            }
            CharacterState::Climbing(span) => {
                let feet = body.bottom();
                let vy = body.velocity.y;
                if vy <= 0.0 && feet <= span.top + EDGE_EPSILON {
                    self.finish_climb(body, span.top, events);
                } else if vy >= 0.0 && feet >= span.bottom - EDGE_EPSILON {
                    self.finish_climb(body, span.bottom, events);
                }
            }
            CharacterState::Dead => body.velocity = Vector::ZERO,
            CharacterState::Normal => {}
        }
    }

    // ── Contacts ──

    pub fn on_contact(&mut self, body: &mut Body, contact: &Contact, events: &mut Vec<GameEvent>) {
        match contact.other {
            Touched::Platform { friction, .. } => self.platform_contact(body, contact, friction, events),
            Touched::Hazard { .. } => self.hazard_contact(body, contact.other_id, events),
            Touched::Collectible(kind) => self.collect(kind, contact.other_id, events),
            Touched::Goal => {
                if !self.is_dead() {
                    events.push(GameEvent::GoalReached);
                }
            }
            Touched::Character { .. } | Touched::Ladder | Touched::Spawner => {}
        }
    }

    fn land(&mut self, body: &mut Body, contact: &Contact, friction: f32) {
        body.set_bottom(contact.other_rect.top);
        if body.velocity.y > 0.0 {
            body.velocity = body.velocity.with_y(0.0);
        }
        self.is_on_ground = true;
        self.is_jumping = false;
        self.ground_friction = friction;
    }

    fn platform_contact(&mut self, body: &mut Body, contact: &Contact, friction: f32, events: &mut Vec<GameEvent>) {
        let other = contact.other_rect;
        match self.state {
            CharacterState::Dead => {}
            CharacterState::Climbing(span) => {
                if span.passes_through(other.top) {
                    return;
                }
                match contact.side {
                    // Still leaving the floor at the ladder's foot.
                    CollisionSide::Top if body.velocity.y < 0.0 => {}
                    side => {
                        self.state = rules::transition(self.state, StateEvent::LeaveLadder);
                        events.push(GameEvent::ClimbEnded);
                        if side == CollisionSide::Top {
                            self.land(body, contact, friction);
                        }
                    }
                }
            }
            CharacterState::Normal | CharacterState::PoweredUp { .. } => {
                let step = body.bottom() - other.top;
                let stepping = body.velocity.y >= 0.0 && (0.0..=STEP_UP).contains(&step);
                match contact.side {
                    CollisionSide::Top => {
                        if body.velocity.y >= 0.0 {
                            self.land(body, contact, friction);
                        }
                    }
                    CollisionSide::Left | CollisionSide::Right if stepping => {
                        self.land(body, contact, friction);
                    }
                    CollisionSide::Bottom => {
                        if body.velocity.y < 0.0 {
                            body.velocity = body.velocity.with_y(0.0);
                            body.position = body.position.with_y(other.bottom);
                        }
                    }
                    CollisionSide::Left => {
                        body.position = body.position.with_x(other.left - body.size.w());
                        if body.velocity.x > 0.0 {
                            body.velocity = body.velocity.with_x(0.0);
                        }
                    }
                    CollisionSide::Right => {
                        body.position = body.position.with_x(other.right);
                        if body.velocity.x < 0.0 {
                            body.velocity = body.velocity.with_x(0.0);
                        }
                    }
                }
            }
        }
    }

    fn hazard_contact(&mut self, body: &mut Body, hazard: EntityId, events: &mut Vec<GameEvent>) {
        let tag = self.state.tag();
        if rules::smashes_hazards(tag) {
            events.push(GameEvent::HazardSmashed { id: hazard });
        } else if rules::is_vulnerable(tag) && !self.hit_this_frame {
            self.lose_life(body, events);
        }
    }

    fn collect(&mut self, kind: CollectibleKind, id: EntityId, events: &mut Vec<GameEvent>) {
        if !rules::accepts_collectible(self.state.tag(), kind) {
            return;
        }
        if kind == CollectibleKind::Hammer {
            let duration = self.tuning.powerup_duration;
            self.state = rules::transition(self.state, StateEvent::CollectPowerUp { duration });
            events.push(GameEvent::PowerUpStarted { duration });
        }
        events.push(GameEvent::Collected { id, kind });
    }

    /// At most one life per frame, whatever touched us.
    fn lose_life(&mut self, body: &mut Body, events: &mut Vec<GameEvent>) {
        self.hit_this_frame = true;
        self.lives = self.lives.saturating_sub(1);
        log::debug!("life lost, {} left", self.lives);
        events.push(GameEvent::LifeLost { remaining: self.lives });
        if self.lives == 0 {
            self.state = rules::transition(self.state, StateEvent::LivesExhausted);
            body.velocity = Vector::ZERO;
            self.is_jumping = false;
            events.push(GameEvent::CharacterDied { score: self.score });
        }
    }

    pub fn on_boundary(&mut self, body: &mut Body, hit: BoundaryHit, events: &mut Vec<GameEvent>) {
        if hit.side() {
            body.velocity = body.velocity.with_x(0.0);
        }
        if hit.top && body.velocity.y < 0.0 {
            body.velocity = body.velocity.with_y(0.0);
        }
        if hit.bottom && self.state.tag() != StateTag::Dead && !self.hit_this_frame {
            self.lose_life(body, events);
        }
    }
}

impl GravityAffected for Character {
    fn is_affected_by_gravity(&self) -> bool {
        self.state.can_move()
    }

    fn max_falling_speed(&self) -> f32 {
        self.tuning.max_fall_speed
    }

    fn on_platform_land(&mut self) {
        if self.state.can_move() {
            self.is_on_ground = true;
            self.is_jumping = false;
        }
    }

    fn on_platform_leave(&mut self) {
        if !self.is_climbing() {
            self.is_on_ground = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::{BoundingBox, Position, Rect};

    fn setup() -> (Character, Body) {
        let c = Character::new(3, CharacterTuning::default());
        let b = Body::new(Position::new(34.0, 64.0), BoundingBox::new(12, 16));
        (c, b)
    }

    fn grounded() -> (Character, Body) {
        let (mut c, b) = setup();
        c.is_on_ground = true;
        (c, b)
    }

    fn contact(other: Touched, side: CollisionSide, rect: Rect) -> Contact {
        Contact { other_id: 5, other, side, other_rect: rect }
    }

    fn girder_at(x: f32, y: f32) -> Rect {
        Rect::new(Position::new(x, y), BoundingBox::new(16, 16))
    }

    fn platform() -> Touched {
        Touched::Platform { slope: crate::domain::platform::Slope::Flat, friction: 1.0, can_break: false }
    }

    fn barrel() -> Touched {
        Touched::Hazard { kind: crate::domain::enemy::HazardKind::Barrel }
    }

    const SPAN: LadderSpan = LadderSpan { center_x: 40.0, top: 32.0, bottom: 80.0 };

    // ── Jumping ──

    #[test]
    fn jump_only_from_ground() {
        let (mut c, mut b) = grounded();
        let mut ev = vec![];
        c.apply_action(&mut b, Action::Jump, None, &mut ev);
        assert!(c.is_jumping);
        assert!(!c.is_on_ground);
        assert_eq!(b.velocity.y, -c.tuning.jump_force);
        assert_eq!(ev, vec![GameEvent::Jumped]);

        // airborne: second request is a no-op
        b.velocity = b.velocity.with_y(-50.0);
        c.apply_action(&mut b, Action::Jump, None, &mut ev);
        assert_eq!(b.velocity.y, -50.0);
        assert_eq!(c.jump_serial, 1);
        assert_eq!(ev.len(), 1);
    }

    #[test]
    fn landing_clears_jump() {
        let (mut c, mut b) = setup();
        c.is_jumping = true;
        b.position = Position::new(34.0, 66.0);
        b.velocity = Vector::new(0.0, 120.0);
        c.on_contact(&mut b, &contact(platform(), CollisionSide::Top, girder_at(32.0, 80.0)), &mut vec![]);
        assert!(c.is_on_ground);
        assert!(!c.is_jumping);
        assert_eq!(b.bottom(), 80.0);
        assert_eq!(b.velocity.y, 0.0);
    }

    // ── Horizontal ──

    #[test]
    fn move_and_friction() {
        let (mut c, mut b) = grounded();
        let mut ev = vec![];
        c.apply_action(&mut b, Action::MoveLeft, None, &mut ev);
        assert_eq!(b.velocity.x, -c.tuning.move_speed);
        assert!(!c.is_facing_right);

        c.ground_friction = 0.5;
        c.apply_action(&mut b, Action::None, None, &mut ev);
        assert_eq!(b.velocity.x, -c.tuning.move_speed * 0.5);
    }

    #[test]
    fn head_bump_stops_rise() {
        let (mut c, mut b) = setup();
        b.velocity = Vector::new(0.0, -100.0);
        b.position = Position::new(34.0, 46.0);
        c.on_contact(&mut b, &contact(platform(), CollisionSide::Bottom, girder_at(32.0, 32.0)), &mut vec![]);
        assert_eq!(b.velocity.y, 0.0);
        assert_eq!(b.position.y, 48.0);
    }

    #[test]
    fn wall_pushes_out() {
        let (mut c, mut b) = setup();
        b.position = Position::new(22.0, 64.0);
        b.velocity = Vector::new(64.0, 0.0);
        c.on_contact(&mut b, &contact(platform(), CollisionSide::Left, girder_at(32.0, 56.0)), &mut vec![]);
        assert_eq!(b.position.x, 20.0);
        assert_eq!(b.velocity.x, 0.0);
    }

    #[test]
    fn small_ledge_is_stepped_onto() {
        let (mut c, mut b) = grounded();
        // feet 1 unit below the neighbouring platform top
        b.position = Position::new(22.0, 65.0);
        b.velocity = Vector::new(64.0, 0.0);
        c.on_contact(&mut b, &contact(platform(), CollisionSide::Left, girder_at(32.0, 80.0)), &mut vec![]);
        assert_eq!(b.bottom(), 80.0);
        assert_eq!(b.velocity.x, 64.0);
    }

    // ── Hazards ──

    #[test]
    fn hazard_costs_one_life_per_frame() {
        let (mut c, mut b) = setup();
        let mut ev = vec![];
        let hit = contact(barrel(), CollisionSide::Left, girder_at(40.0, 64.0));
        c.update(&mut b, 0.016, &mut ev);
        c.on_contact(&mut b, &hit, &mut ev);
        c.on_contact(&mut b, &hit, &mut ev);
        assert_eq!(c.lives, 2);
        c.update(&mut b, 0.016, &mut ev);
        c.on_contact(&mut b, &hit, &mut ev);
        assert_eq!(c.lives, 1);
    }

    #[test]
    fn last_life_means_dead_in_same_call() {
        let (mut c, mut b) = setup();
        c.lives = 1;
        b.velocity = Vector::new(30.0, 0.0);
        let mut ev = vec![];
        c.on_contact(&mut b, &contact(barrel(), CollisionSide::Left, girder_at(40.0, 64.0)), &mut ev);
        assert_eq!(c.lives, 0);
        assert_eq!(c.state, CharacterState::Dead);
        assert_eq!(b.velocity, Vector::ZERO);
        assert!(ev.contains(&GameEvent::CharacterDied { score: 0 }));
    }

    #[test]
    fn powered_up_smashes_instead() {
        let (mut c, mut b) = setup();
        c.state = CharacterState::PoweredUp { remaining: 5.0 };
        let mut ev = vec![];
        c.on_contact(&mut b, &contact(barrel(), CollisionSide::Left, girder_at(40.0, 64.0)), &mut ev);
        assert_eq!(c.lives, 3);
        assert_eq!(ev, vec![GameEvent::HazardSmashed { id: 5 }]);
    }

    #[test]
    fn dead_is_absorbing() {
        let (mut c, mut b) = setup();
        c.lives = 0;
        c.state = CharacterState::Dead;
        let mut ev = vec![];
        c.update(&mut b, 0.1, &mut ev);
        c.on_contact(&mut b, &contact(barrel(), CollisionSide::Left, girder_at(40.0, 64.0)), &mut ev);
        c.on_contact(
            &mut b,
            &contact(Touched::Collectible(CollectibleKind::Hammer), CollisionSide::Left, girder_at(40.0, 64.0)),
            &mut ev,
        );
        c.on_boundary(&mut b, BoundaryHit { bottom: true, ..Default::default() }, &mut ev);
        for a in [Action::Jump, Action::MoveLeft, Action::MoveUp] {
            c.apply_action(&mut b, a, Some(SPAN), &mut ev);
        }
        assert_eq!(c.state, CharacterState::Dead);
        assert_eq!(c.lives, 0);
        assert!(ev.is_empty());

        c.reset(3);
        assert_eq!(c.state, CharacterState::Normal);
        assert_eq!(c.lives, 3);
    }

    #[test]
    fn falling_out_costs_a_life_even_powered() {
        let (mut c, mut b) = setup();
        c.state = CharacterState::PoweredUp { remaining: 5.0 };
        let mut ev = vec![];
        c.on_boundary(&mut b, BoundaryHit { bottom: true, ..Default::default() }, &mut ev);
        assert_eq!(c.lives, 2);
    }

    // ── Items ──

    #[test]
    fn hammer_powers_up_and_expires() {
        let (mut c, mut b) = setup();
        let mut ev = vec![];
        let hammer = contact(Touched::Collectible(CollectibleKind::Hammer), CollisionSide::Left, girder_at(40.0, 64.0));
        c.on_contact(&mut b, &hammer, &mut ev);
        assert_eq!(c.state, CharacterState::PoweredUp { remaining: c.tuning.powerup_duration });

        let frames = (c.tuning.powerup_duration / 0.5) as usize;
        for _ in 0..frames - 1 {
            c.update(&mut b, 0.5, &mut ev);
            assert_eq!(c.state.tag(), StateTag::PoweredUp);
        }
        c.update(&mut b, 0.5, &mut ev);
        assert_eq!(c.state, CharacterState::Normal);
        assert_eq!(ev.last(), Some(&GameEvent::PowerUpExpired));
    }

    // ── Ladders ──

    #[test]
    fn grab_needs_alignment_and_direction() {
        let (mut c, mut b) = grounded();
        let mut ev = vec![];
        // feet at the ladder foot: down is refused, up is accepted
        b.set_bottom(80.0);
        c.apply_action(&mut b, Action::MoveDown, Some(SPAN), &mut ev);
        assert!(!c.is_climbing());

        b.position = b.position.with_x(10.0);
        c.apply_action(&mut b, Action::MoveUp, Some(SPAN), &mut ev);
        assert!(!c.is_climbing());

        b.position = b.position.with_x(36.0);
        c.apply_action(&mut b, Action::MoveUp, Some(SPAN), &mut ev);
        assert!(c.is_climbing());
        assert_eq!(b.center_x(), 40.0);
        assert_eq!(b.velocity, Vector::new(0.0, -c.tuning.climb_speed));
    }

    #[test]
    fn climbing_blocks_sideways_and_jump() {
        let (mut c, mut b) = setup();
        c.state = CharacterState::Climbing(SPAN);
        let mut ev = vec![];
        c.apply_action(&mut b, Action::MoveLeft, None, &mut ev);
        assert_eq!(b.velocity, Vector::ZERO);
        c.apply_action(&mut b, Action::Jump, None, &mut ev);
        assert_eq!(b.velocity, Vector::ZERO);
        assert!(ev.is_empty());
    }

    #[test]
    fn climb_ends_at_top() {
        let (mut c, mut b) = setup();
        c.state = CharacterState::Climbing(SPAN);
        b.set_bottom(31.5);
        b.velocity = Vector::new(0.0, -40.0);
        let mut ev = vec![];
        c.update(&mut b, 0.016, &mut ev);
        assert_eq!(c.state, CharacterState::Normal);
        assert!(c.is_on_ground);
        assert_eq!(b.bottom(), 32.0);
        assert_eq!(ev, vec![GameEvent::ClimbEnded]);
    }

    #[test]
    fn hatch_is_ignored_while_climbing() {
        let (mut c, mut b) = setup();
        c.state = CharacterState::Climbing(SPAN);
        b.set_bottom(40.0);
        b.velocity = Vector::new(0.0, -40.0);
        c.on_contact(&mut b, &contact(platform(), CollisionSide::Bottom, girder_at(32.0, 32.0)), &mut vec![]);
        assert!(c.is_climbing());

        // a platform outside the span ends the climb
        c.on_contact(&mut b, &contact(platform(), CollisionSide::Bottom, girder_at(32.0, 8.0)), &mut vec![]);
        assert!(!c.is_climbing());
    }

    #[test]
    fn gravity_suspended_while_climbing() {
        let (mut c, _) = setup();
        assert!(c.is_affected_by_gravity());
        c.state = CharacterState::Climbing(SPAN);
        assert!(!c.is_affected_by_gravity());
        c.is_on_ground = true;
        c.on_platform_leave();
        assert!(c.is_on_ground);
    }
}
