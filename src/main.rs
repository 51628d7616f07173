/// Entry point and frame loop.
///
/// Input is read every pass through the loop; the model is stepped once per
/// `tick_rate_ms`. One-shot commands (jump, ENTER, ESC) pressed between two
/// ticks are latched so a fast tap is never lost.

mod ui;

use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

use girder_run::config::GameConfig;
use girder_run::domain::entity::Action;
use girder_run::sim::leaderboard::{self, LeaderboardEntry};
use girder_run::{Model, Phase};

use ui::gamepad::GamepadState;
use ui::input::{InputState, KEYS_QUIT};
use ui::renderer::Renderer;
use ui::sound::SoundContext;

const FRAME_SLEEP: Duration = Duration::from_millis(4);

fn main() {
    let config = GameConfig::load();
    init_logging(config.log_file.as_deref());

    let mut model = match Model::with_defaults(config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Could not start: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut model, &mut renderer);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    let score = model.main_character().map_or(0, |c| c.score);
    println!();
    println!("Thanks for playing Girder Run!");
    println!("Last score: {score}");
}

/// The terminal owns stdout and stderr, so logs go to a file or nowhere.
fn init_logging(path: Option<&Path>) {
    let Some(path) = path else { return };
    let Ok(file) = File::create(path) else { return };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn load_board(path: &Path) -> Vec<LeaderboardEntry> {
    match leaderboard::Leaderboard::load(path) {
        Ok(board) => board.entries,
        Err(e) => {
            log::warn!("leaderboard unavailable: {e}");
            Vec::new()
        }
    }
}

fn is_one_shot(action: Action) -> bool {
    matches!(action, Action::Jump | Action::Enter | Action::Escape)
}

fn game_loop(model: &mut Model, renderer: &mut Renderer) -> Result<(), Box<dyn std::error::Error>> {
    let config = model.config().clone();
    let board_path = leaderboard::resolve_path(&config.leaderboard_file);
    let mut board = load_board(&board_path);

    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    if gp.connected {
        log::info!("gamepad detected");
    }
    let mut sound = SoundContext::new();

    let tick_rate = Duration::from_millis(config.tick_rate_ms.max(1));
    let delta_time = tick_rate.as_secs_f32();
    let mut last_tick = Instant::now();
    let mut latched: Option<Action> = None;

    loop {
        kb.drain_events();
        gp.update();
        if kb.ctrl_c_pressed() {
            break;
        }

        let action = match kb.action() {
            Action::None => gp.action(),
            a => a,
        };
        let quit = kb.any_pressed(KEYS_QUIT);

        match model.phase() {
            Phase::Title => {
                if quit || action == Action::Escape {
                    break;
                }
                if action == Action::Enter {
                    model.set_state(Phase::Playing)?;
                    if let Err(e) = sound.load() {
                        log::warn!("sound disabled: {e}");
                    }
                    latched = None;
                    last_tick = Instant::now();
                }
            }
            Phase::Playing => {
                if is_one_shot(action) {
                    latched = Some(action);
                }
                if last_tick.elapsed() >= tick_rate {
                    last_tick = Instant::now();
                    model.queue_command(latched.take().unwrap_or(action));
                    let events = model.update(delta_time)?;
                    sound.play_events(&events);
                    if model.phase() == Phase::GameOver {
                        board = load_board(&board_path);
                    }
                }
            }
            Phase::Paused => {
                if quit {
                    model.set_state(Phase::Title)?;
                    sound.release();
                    board = load_board(&board_path);
                } else if matches!(action, Action::Enter | Action::Escape) {
                    model.set_state(Phase::Playing)?;
                    last_tick = Instant::now();
                }
            }
            Phase::GameOver => {
                if action == Action::Enter {
                    model.set_state(Phase::Title)?;
                    sound.release();
                }
            }
        }

        for e in model.take_degraded_errors() {
            log::warn!("degraded: {e}");
        }

        renderer.render(&model.snapshot(), &board)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    sound.release();
    Ok(())
}
