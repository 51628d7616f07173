/// Character state rules — truth-table driven.
///
/// Pure functions: `transition` maps (state, event) to the next state and
/// the capability queries answer "what is legal" without performing it.
/// Entry/exit effects (zeroing velocity, snapping onto a ladder) belong to
/// the character, which applies them after asking these rules.
///
/// ## Capability Truth Table
///
/// ┌────────────┬─────────┬─────────┬──────────┬──────────────┐
/// │ State       │ canMove │ canJump │ canClimb │ canUseItem   │
/// ├────────────┼─────────┼─────────┼──────────┼──────────────┤
/// │ Normal      │ yes     │ yes     │ yes      │ no           │
/// │ Climbing    │ no      │ no      │ yes      │ no           │
/// │ PoweredUp   │ yes     │ yes     │ no       │ yes (smash)  │
/// │ Dead        │ no      │ no      │ no       │ no           │
/// └────────────┴─────────┴─────────┴──────────┴──────────────┘
///
/// "Use item" means swinging the hammer. Picking one up is a contact rule
/// (below); a second hammer while PoweredUp restarts the countdown.
///
/// ## Transition Table
///
/// ┌────────────┬──────────────────┬──────────────────────────┐
/// │ From        │ Event            │ To                       │
/// ├────────────┼──────────────────┼──────────────────────────┤
/// │ any live    │ LivesExhausted   │ Dead                     │
/// │ Normal      │ GrabLadder(span) │ Climbing(span)           │
/// │ Climbing    │ LeaveLadder      │ Normal                   │
/// │ Normal      │ CollectPowerUp   │ PoweredUp{duration}      │
/// │ PoweredUp   │ CollectPowerUp   │ PoweredUp{duration}      │
/// │ PoweredUp   │ Tick(dt)         │ PoweredUp{r-dt}, Normal  │
/// │             │                  │ once r-dt <= 0           │
/// │ Dead        │ Reset            │ Normal                   │
/// │ live        │ Reset            │ Normal                   │
/// │ otherwise   │ —                │ unchanged                │
/// └────────────┴──────────────────┴──────────────────────────┘
///
/// Dead is terminal for everything except Reset.
///
/// ## Contact Rules
///
/// ┌────────────┬────────────────┬─────────────────┬──────────────┐
/// │ State       │ Hazard contact │ Hammer contact  │ Bonus item   │
/// ├────────────┼────────────────┼─────────────────┼──────────────┤
/// │ Normal      │ lose a life    │ collect         │ collect      │
/// │ Climbing    │ lose a life    │ ignore          │ collect      │
/// │ PoweredUp   │ smash hazard   │ collect/refresh │ collect      │
/// │ Dead        │ ignore         │ ignore          │ ignore       │
/// └────────────┴────────────────┴─────────────────┴──────────────┘

use super::entity::{CollectibleKind, LadderSpan};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum CharacterState {
    Normal,
    Climbing(LadderSpan),
    PoweredUp { remaining: f32 },
    Dead,
}

/// Payload-free view of the state, for rules tables and render snapshots.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StateTag {
    Normal,
    Climbing,
    PoweredUp,
    Dead,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum StateEvent {
    GrabLadder(LadderSpan),
    LeaveLadder,
    CollectPowerUp { duration: f32 },
    Tick(f32),
    LivesExhausted,
    Reset,
}

impl CharacterState {
    pub fn tag(&self) -> StateTag {
        match self {
            CharacterState::Normal => StateTag::Normal,
            CharacterState::Climbing(_) => StateTag::Climbing,
            CharacterState::PoweredUp { .. } => StateTag::PoweredUp,
            CharacterState::Dead => StateTag::Dead,
        }
    }

    pub fn can_move(&self) -> bool {
        self.tag().can_move()
    }

    pub fn can_jump(&self) -> bool {
        self.tag().can_jump()
    }

    pub fn can_climb(&self) -> bool {
        self.tag().can_climb()
    }

    pub fn can_use_item(&self) -> bool {
        self.tag().can_use_item()
    }

    /// Seconds left on the power-up, if any.
    pub fn power_remaining(&self) -> Option<f32> {
        match self {
            CharacterState::PoweredUp { remaining } => Some(*remaining),
            _ => None,
        }
    }
}

impl StateTag {
    pub fn can_move(self) -> bool {
        matches!(self, StateTag::Normal | StateTag::PoweredUp)
    }

    pub fn can_jump(self) -> bool {
        matches!(self, StateTag::Normal | StateTag::PoweredUp)
    }

    pub fn can_climb(self) -> bool {
        matches!(self, StateTag::Normal | StateTag::Climbing)
    }

    pub fn can_use_item(self) -> bool {
        self == StateTag::PoweredUp
    }

    pub fn is_terminal(self) -> bool {
        self == StateTag::Dead
    }
}

/// Pure state transition. Anything not in the table leaves the state as is.
pub fn transition(state: CharacterState, event: StateEvent) -> CharacterState {
    use CharacterState as S;
    use StateEvent as E;

    match (state, event) {
        (S::Dead, E::Reset) => S::Normal,
        (S::Dead, _) => S::Dead,
        (_, E::LivesExhausted) => S::Dead,
        (_, E::Reset) => S::Normal,
        (S::Normal, E::GrabLadder(span)) => S::Climbing(span),
        (S::Climbing(_), E::LeaveLadder) => S::Normal,
        (S::Normal | S::PoweredUp { .. }, E::CollectPowerUp { duration }) => {
            S::PoweredUp { remaining: duration }
        }
        (S::PoweredUp { remaining }, E::Tick(dt)) => {
            let left = remaining - dt;
            if left <= 0.0 {
                S::Normal
            } else {
                S::PoweredUp { remaining: left }
            }
        }
        (s, _) => s,
    }
}

/// Hazard contact hurts in these states.
pub fn is_vulnerable(state: StateTag) -> bool {
    matches!(state, StateTag::Normal | StateTag::Climbing)
}

/// Hazard contact destroys the hazard in these states.
pub fn smashes_hazards(state: StateTag) -> bool {
    state.can_use_item()
}

/// Shared by both sides of a collectible contact so they always agree.
pub fn accepts_collectible(state: StateTag, kind: CollectibleKind) -> bool {
    match kind {
        CollectibleKind::Hammer => matches!(state, StateTag::Normal | StateTag::PoweredUp),
        CollectibleKind::Bonus => state != StateTag::Dead,
    }
}
