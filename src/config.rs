/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// The numeric defaults are representative tuning values, not verified
/// game balance.

use serde::Deserialize;
use std::path::PathBuf;

use crate::error::Result;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub character: CharacterConfig,
    pub hazards: HazardConfig,
    pub scoring: ScoringConfig,
    pub gamepad: GamepadConfig,
    pub tick_rate_ms: u64,
    pub levels_dir: PathBuf,
    pub leaderboard_file: PathBuf,
    pub player_name: String,
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    pub gravity: f32,        // units / s²
    pub max_fall_speed: f32, // units / s
    pub elevator_speed: f32,
}

#[derive(Clone, Debug)]
pub struct CharacterConfig {
    pub move_speed: f32,
    pub jump_force: f32,
    pub climb_speed: f32,
    pub lives: u32,
    pub powerup_duration: f32, // seconds
    pub ladder_grab_tolerance: f32,
}

#[derive(Clone, Debug)]
pub struct HazardConfig {
    pub barrel_speed: f32,
    pub spawn_interval_max: f32, // seconds between throws at full bonus
    pub spawn_interval_min: f32, // seconds between throws once bonus is gone
    pub fire_barrel_every: u32,
    pub transform_threshold: f32,
}

#[derive(Clone, Debug)]
pub struct ScoringConfig {
    pub bonus_start: u32,
    pub bonus_step: u32,
    pub bonus_interval: f32,
    pub smash_points: u32,
    pub jump_over_points: u32,
    pub rivet_points: u32,
    pub item_points: u32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    character: TomlCharacter,
    #[serde(default)]
    hazards: TomlHazards,
    #[serde(default)]
    scoring: TomlScoring,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_max_fall")]
    max_fall_speed: f32,
    #[serde(default = "default_elevator_speed")]
    elevator_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlCharacter {
    #[serde(default = "default_move_speed")]
    move_speed: f32,
    #[serde(default = "default_jump_force")]
    jump_force: f32,
    #[serde(default = "default_climb_speed")]
    climb_speed: f32,
    #[serde(default = "default_lives")]
    lives: u32,
    #[serde(default = "default_powerup_duration")]
    powerup_duration: f32,
    #[serde(default = "default_grab_tolerance")]
    ladder_grab_tolerance: f32,
}

#[derive(Deserialize, Debug)]
struct TomlHazards {
    #[serde(default = "default_barrel_speed")]
    barrel_speed: f32,
    #[serde(default = "default_spawn_max")]
    spawn_interval_max: f32,
    #[serde(default = "default_spawn_min")]
    spawn_interval_min: f32,
    #[serde(default = "default_fire_every")]
    fire_barrel_every: u32,
    #[serde(default = "default_threshold")]
    transform_threshold: f32,
}

#[derive(Deserialize, Debug)]
struct TomlScoring {
    #[serde(default = "default_bonus_start")]
    bonus_start: u32,
    #[serde(default = "default_bonus_step")]
    bonus_step: u32,
    #[serde(default = "default_bonus_interval")]
    bonus_interval: f32,
    #[serde(default = "default_smash_points")]
    smash_points: u32,
    #[serde(default = "default_jump_over_points")]
    jump_over_points: u32,
    #[serde(default = "default_rivet_points")]
    rivet_points: u32,
    #[serde(default = "default_item_points")]
    item_points: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_pad_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_leaderboard_file")]
    leaderboard_file: String,
    #[serde(default = "default_player_name")]
    player_name: String,
    #[serde(default)]
    log_file: Option<String>,
}

// ── Defaults ──

fn default_gravity() -> f32 { 600.0 }
fn default_max_fall() -> f32 { 320.0 }
fn default_elevator_speed() -> f32 { 24.0 }
fn default_move_speed() -> f32 { 64.0 }
fn default_jump_force() -> f32 { 190.0 }   // ~30 units apex at default gravity
fn default_climb_speed() -> f32 { 40.0 }
fn default_lives() -> u32 { 3 }
fn default_powerup_duration() -> f32 { 10.0 }
fn default_grab_tolerance() -> f32 { 6.0 }
fn default_barrel_speed() -> f32 { 72.0 }
fn default_spawn_max() -> f32 { 4.0 }
fn default_spawn_min() -> f32 { 1.5 }
fn default_fire_every() -> u32 { 3 }
fn default_threshold() -> f32 { 40.0 }
fn default_bonus_start() -> u32 { 5000 }
fn default_bonus_step() -> u32 { 100 }
fn default_bonus_interval() -> f32 { 2.0 }
fn default_smash_points() -> u32 { 300 }
fn default_jump_over_points() -> u32 { 100 }
fn default_rivet_points() -> u32 { 100 }
fn default_item_points() -> u32 { 500 }
fn default_pad_jump() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_pad_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_pad_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_tick_rate() -> u64 { 16 }
fn default_levels_dir() -> String { "levels".into() }
fn default_leaderboard_file() -> String { "leaderboard.toml".into() }
fn default_player_name() -> String { "PLAYER".into() }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            max_fall_speed: default_max_fall(),
            elevator_speed: default_elevator_speed(),
        }
    }
}

impl Default for TomlCharacter {
    fn default() -> Self {
        TomlCharacter {
            move_speed: default_move_speed(),
            jump_force: default_jump_force(),
            climb_speed: default_climb_speed(),
            lives: default_lives(),
            powerup_duration: default_powerup_duration(),
            ladder_grab_tolerance: default_grab_tolerance(),
        }
    }
}

impl Default for TomlHazards {
    fn default() -> Self {
        TomlHazards {
            barrel_speed: default_barrel_speed(),
            spawn_interval_max: default_spawn_max(),
            spawn_interval_min: default_spawn_min(),
            fire_barrel_every: default_fire_every(),
            transform_threshold: default_threshold(),
        }
    }
}

impl Default for TomlScoring {
    fn default() -> Self {
        TomlScoring {
            bonus_start: default_bonus_start(),
            bonus_step: default_bonus_step(),
            bonus_interval: default_bonus_interval(),
            smash_points: default_smash_points(),
            jump_over_points: default_jump_over_points(),
            rivet_points: default_rivet_points(),
            item_points: default_item_points(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            confirm: default_pad_confirm(),
            cancel: default_pad_cancel(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            tick_rate_ms: default_tick_rate(),
            levels_dir: default_levels_dir(),
            leaderboard_file: default_leaderboard_file(),
            player_name: default_player_name(),
            log_file: None,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/girder-run`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config text directly. Unlike `load`, a malformed document is
    /// reported to the caller.
    pub fn parse(text: &str) -> Result<Self> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(toml_cfg, &[]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let general = toml_cfg.general;

        // Resolve levels directory against the search dirs
        let levels_dir = if PathBuf::from(&general.levels_dir).is_absolute() {
            PathBuf::from(&general.levels_dir)
        } else {
            search_dirs.iter()
                .map(|d| d.join(&general.levels_dir))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(&general.levels_dir))
        };

        GameConfig {
            physics: PhysicsConfig {
                gravity: toml_cfg.physics.gravity,
                max_fall_speed: toml_cfg.physics.max_fall_speed,
                elevator_speed: toml_cfg.physics.elevator_speed,
            },
            character: CharacterConfig {
                move_speed: toml_cfg.character.move_speed,
                jump_force: toml_cfg.character.jump_force,
                climb_speed: toml_cfg.character.climb_speed,
                lives: toml_cfg.character.lives,
                powerup_duration: toml_cfg.character.powerup_duration,
                ladder_grab_tolerance: toml_cfg.character.ladder_grab_tolerance,
            },
            hazards: HazardConfig {
                barrel_speed: toml_cfg.hazards.barrel_speed,
                spawn_interval_max: toml_cfg.hazards.spawn_interval_max,
                spawn_interval_min: toml_cfg.hazards.spawn_interval_min,
                fire_barrel_every: toml_cfg.hazards.fire_barrel_every,
                transform_threshold: toml_cfg.hazards.transform_threshold,
            },
            scoring: ScoringConfig {
                bonus_start: toml_cfg.scoring.bonus_start,
                bonus_step: toml_cfg.scoring.bonus_step,
                bonus_interval: toml_cfg.scoring.bonus_interval,
                smash_points: toml_cfg.scoring.smash_points,
                jump_over_points: toml_cfg.scoring.jump_over_points,
                rivet_points: toml_cfg.scoring.rivet_points,
                item_points: toml_cfg.scoring.item_points,
            },
            gamepad: GamepadConfig {
                jump: toml_cfg.gamepad.jump,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
            tick_rate_ms: general.tick_rate_ms.max(1),
            levels_dir,
            leaderboard_file: PathBuf::from(general.leaderboard_file),
            player_name: general.player_name,
            log_file: general.log_file.map(PathBuf::from),
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/girder-run)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/girder-run");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => {
                        log::info!("loaded {}", path.display());
                        return cfg;
                    }
                    Err(e) => {
                        log::warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
