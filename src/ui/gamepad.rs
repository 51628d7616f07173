/// Gamepad → `Action`, through gilrs.
///
/// Default mapping (overridable in `[gamepad]` of config.toml):
///   D-pad / left stick   →  MOVE_*
///   A / B                →  JUMP
///   Start                →  ENTER
///   Select               →  ESCAPE
///
/// Without the `gamepad` feature this compiles to a pad that is never
/// connected and always answers `Action::None`.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use girder_run::config::GamepadConfig;
use girder_run::domain::entity::Action;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Index into `dpad`.
#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
#[derive(Clone, Copy)]
enum Dir {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

struct Bindings {
    jump: Vec<Btn>,
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
}

impl Bindings {
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse(names: &[String], fallback: &[Btn]) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() { fallback.to_vec() } else { parsed }
        }
        Bindings {
            jump: parse(&cfg.jump, &[Btn::A, Btn::B]),
            confirm: parse(&cfg.confirm, &[Btn::Start]),
            cancel: parse(&cfg.cancel, &[Btn::Select]),
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,
    just_pressed: [bool; BTN_COUNT],
    dpad: [bool; 4],
    stick: (f32, f32),
    bindings: Bindings,
    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                log::warn!("gamepad support unavailable: {e}");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            just_pressed: [false; BTN_COUNT],
            dpad: [false; 4],
            stick: (0.0, 0.0),
            bindings: Bindings::from_config(cfg),
            connected,
        }
    }

    /// Drain pad events. Once per frame.
    pub fn update(&mut self) {
        self.just_pressed = [false; BTN_COUNT];

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = &mut self.gilrs else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.stick.0 = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.stick.1 = v,
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, down: bool) {
        let dir = match btn {
            Button::DPadUp => Some(Dir::Up),
            Button::DPadDown => Some(Dir::Down),
            Button::DPadLeft => Some(Dir::Left),
            Button::DPadRight => Some(Dir::Right),
            _ => None,
        };
        if let Some(d) = dir {
            self.dpad[d as usize] = down;
            return;
        }
        if let Some(b) = Btn::from_gilrs(btn) {
            if down {
                self.just_pressed[b as usize] = true;
            }
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.just_pressed = [false; BTN_COUNT];
        self.dpad = [false; 4];
        self.stick = (0.0, 0.0);
    }

    fn pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.just_pressed[b as usize])
    }

    fn direction(&self, d: Dir) -> bool {
        let (x, y) = self.stick;
        let stick = match d {
            Dir::Up => y > STICK_DEADZONE,
            Dir::Down => y < -STICK_DEADZONE,
            Dir::Left => x < -STICK_DEADZONE,
            Dir::Right => x > STICK_DEADZONE,
        };
        self.dpad[d as usize] || stick
    }

    /// Same priority as the keyboard: one-shot buttons first.
    pub fn action(&self) -> Action {
        if self.pressed(&self.bindings.cancel) {
            Action::Escape
        } else if self.pressed(&self.bindings.confirm) {
            Action::Enter
        } else if self.pressed(&self.bindings.jump) {
            Action::Jump
        } else if self.direction(Dir::Up) {
            Action::MoveUp
        } else if self.direction(Dir::Down) {
            Action::MoveDown
        } else if self.direction(Dir::Left) {
            Action::MoveLeft
        } else if self.direction(Dir::Right) {
            Action::MoveRight
        } else {
            Action::None
        }
    }
}
