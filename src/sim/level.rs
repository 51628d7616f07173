/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files, sorted by filename)
///   2. Built-in embedded levels
///
/// ## Single-level format (`.txt`):
///   Line 1: `# Level Name`
///   Lines: layout rows, one character per 16-unit cell
///
/// ## Symbol legend:
///   '=' = Girder (flat)          '>' / '<' = Girder rolling right / left
///   '+' = Girder with ladder     '#' = Rivet (breaks when walked off)
///   'H' = Ladder                 'E' = Elevator, '|' = its shaft
///   'M' = Character spawn        'K' = Barrel thrower (2×2, bottom-left)
///   'P' = Goal                   'h' = Hammer, '$' = Bonus item
///   'O' = Oil drum (fire threshold column)
///   ' ' or '.' = Empty
///
/// A level is cleared by touching the goal, or, when it has rivets, by
/// breaking every one of them.

use std::path::Path;

use crate::config::GameConfig;
use crate::domain::entity::CollectibleKind;
use crate::domain::geometry::Position;
use crate::domain::platform::Slope;
use crate::domain::tile::{Tile, TILE_SIZE};
use crate::error::{Result, SimError};
use crate::sim::factory::{EntityFactory, Spawned};

/// Runtime level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
}

/// A populated level: entities in creation order plus level-wide facts.
#[derive(Debug)]
pub struct LevelLayout {
    pub entities: Vec<Spawned>,
    pub width: f32,
    pub height: f32,
    pub transform_threshold: Option<f32>,
    pub breakables: usize,
    pub has_goal: bool,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// All playable levels: the configured directory if it holds any, else
/// the embedded set.
pub fn load_levels(config: &GameConfig) -> Vec<LevelDef> {
    let dir = &config.levels_dir;
    if dir.is_dir() {
        let mut levels = load_from_directory(dir);
        if !levels.is_empty() {
            levels.sort_by(|a, b| a.0.cmp(&b.0));
            log::info!("loaded {} levels from {}", levels.len(), dir.display());
            return levels.into_iter().map(|(_, def)| def).collect();
        }
    }
    embedded_levels()
}

/// Symbol grid of a level, validated.
pub fn parse_grid(def: &LevelDef) -> Result<Vec<Vec<Tile>>> {
    if def.rows.is_empty() {
        return Err(SimError::Level(format!("'{}' has no rows", def.name)));
    }
    let mut grid = Vec::with_capacity(def.rows.len());
    for (y, row) in def.rows.iter().enumerate() {
        let mut cells = Vec::with_capacity(row.len());
        for (x, ch) in row.chars().enumerate() {
            let tile = Tile::from_char(ch).ok_or_else(|| {
                SimError::Level(format!("'{}': unknown symbol '{ch}' at row {y}, column {x}", def.name))
            })?;
            cells.push(tile);
        }
        grid.push(cells);
    }
    let spawns = grid.iter().flatten().filter(|t| **t == Tile::Spawn).count();
    if spawns != 1 {
        return Err(SimError::Level(format!(
            "'{}' needs exactly one character spawn, found {spawns}",
            def.name
        )));
    }
    Ok(grid)
}

/// Build every layout entity through `factory`.
///
/// Order: platforms, ladders, items and goal, throwers, character. Scenery
/// first means lifts move before anything standing on them.
pub fn populate(def: &LevelDef, factory: &dyn EntityFactory) -> Result<LevelLayout> {
    let grid = parse_grid(def)?;
    let height_cells = grid.len();
    let width_cells = grid.iter().map(|r| r.len()).max().unwrap_or(0);
    let at = |x: usize, y: usize| grid.get(y).and_then(|r| r.get(x)).copied().unwrap_or_default();
    let cell = |x: usize, y: usize| Position::new(x as f32 * TILE_SIZE, y as f32 * TILE_SIZE);

    let mut entities = vec![];
    let mut breakables = 0;
    let mut transform_threshold = None;
    let mut has_goal = false;

    // ── Platforms: one girder per horizontal run of one slope ──
    for y in 0..height_cells {
        let mut x = 0;
        while x < width_cells {
            if girder_slope(at(x, y)).is_none() {
                x += 1;
                continue;
            }
            let start = x;
            // A hatch takes the slope of the run it sits in.
            let mut slope = None;
            while x < width_cells {
                match girder_slope(at(x, y)) {
                    Some(None) => {}
                    Some(Some(s)) if slope.map_or(true, |run| run == s) => slope = Some(s),
                    _ => break,
                }
                x += 1;
            }
            entities.push(factory.create_girder(cell(start, y), x - start, slope.unwrap_or(Slope::Flat)));
        }
    }
    for y in 0..height_cells {
        for x in 0..width_cells {
            match at(x, y) {
                Tile::Rivet => {
                    breakables += 1;
                    entities.push(factory.create_rivet(cell(x, y)));
                }
                Tile::Elevator => {
                    let mut top = y;
                    while top > 0 && at(x, top - 1).is_shaft() {
                        top -= 1;
                    }
                    let mut bottom = y;
                    while bottom + 1 < height_cells && at(x, bottom + 1).is_shaft() {
                        bottom += 1;
                    }
                    let min_y = top as f32 * TILE_SIZE;
                    let max_y = bottom as f32 * TILE_SIZE;
                    entities.push(factory.create_elevator(cell(x, y), min_y, max_y));
                }
                _ => {}
            }
        }
    }

    // ── Ladders: one entity per vertical run ──
    for x in 0..width_cells {
        let mut y = 0;
        while y < height_cells {
            if !at(x, y).is_ladder() {
                y += 1;
                continue;
            }
            let start = y;
            while y < height_cells && at(x, y).is_ladder() {
                y += 1;
            }
            entities.push(factory.create_ladder(cell(x, start), y - start));
        }
    }

    // ── Items, goal, markers ──
    for y in 0..height_cells {
        for x in 0..width_cells {
            match at(x, y) {
                Tile::Hammer => entities.push(factory.create_collectible(cell(x, y), CollectibleKind::Hammer)),
                Tile::Bonus => entities.push(factory.create_collectible(cell(x, y), CollectibleKind::Bonus)),
                Tile::Princess => {
                    has_goal = true;
                    entities.push(factory.create_goal(cell(x, y)));
                }
                Tile::OilDrum => transform_threshold = Some((x as f32 + 0.5) * TILE_SIZE),
                _ => {}
            }
        }
    }

    // ── Throwers, then the character ──
    for y in 0..height_cells {
        for x in 0..width_cells {
            if at(x, y) == Tile::Kong {
                entities.push(factory.create_kong(cell(x, y)));
            }
        }
    }
    for y in 0..height_cells {
        for x in 0..width_cells {
            if at(x, y) == Tile::Spawn {
                entities.push(factory.create_character(cell(x, y)));
            }
        }
    }

    Ok(LevelLayout {
        entities,
        width: width_cells as f32 * TILE_SIZE,
        height: height_cells as f32 * TILE_SIZE,
        transform_threshold,
        breakables,
        has_goal,
    })
}

/// `Some(None)` for a hatch: a girder whose slope comes from its run.
fn girder_slope(tile: Tile) -> Option<Option<Slope>> {
    match tile {
        Tile::Girder(slope) => Some(Some(slope)),
        Tile::Hatch => Some(None),
        _ => None,
    }
}

// ══════════════════════════════════════════════════════════════
// Single-level file parsing
// ══════════════════════════════════════════════════════════════

/// Parse a single level from text content.
pub fn parse_level_file(content: &str) -> Option<LevelDef> {
    let mut name = String::new();
    let mut rows = vec![];

    for line in content.lines() {
        if line.starts_with('#') && name.is_empty() && rows.is_empty() && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else {
            rows.push(line.trim_end_matches('\r').to_string());
        }
    }

    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }

    if rows.is_empty() {
        return None;
    }

    let max_width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    for row in &mut rows {
        let len = row.chars().count();
        if len < max_width {
            row.extend(std::iter::repeat(' ').take(max_width - len));
        }
    }

    if name.is_empty() {
        name = "Unnamed Stage".to_string();
    }

    Some(LevelDef { name, rows })
}

/// Distinguish `# Level Name` from a row of rivets (`####`).
/// A name line starts with `#` and contains at least one letter.
fn is_name_line(line: &str) -> bool {
    line[1..].chars().any(|c| c.is_alphabetic())
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<(String, LevelDef)> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            log::warn!("could not list {}: {e}", dir.display());
            return results;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    if let Some(def) = parse_level_file(&content) {
                        let filename = path.file_name()
                            .unwrap_or_default()
                            .to_string_lossy()
                            .to_string();
                        results.push((filename, def));
                    }
                }
                Err(e) => log::warn!("skipping level {}: {e}", path.display()),
            }
        }
    }

    results
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Stage 1 - Girders", &[
            "                            ",
            "   K      P                 ",
            ">>>>>>>>>>>+>>>>>>>>>       ",
            "           H                ",
            "           H                ",
            "      <<<<<<<<<<<<<<<+<<<<<<",
            "                     H      ",
            "  h                  H      ",
            ">>>>>>>+>>>>>>>>>>>>>>>     ",
            "       H                    ",
            "       H              $     ",
            "     <<<<<<<<<<<<<<<<<<+<<<<",
            "                       H    ",
            "                       H    ",
            ">>>>>>>>>>>>+>>>>>>>>>>>    ",
            "            H               ",
            " O          H     h     M   ",
            "<<<<<<<<<<<<<<<<<<<<<<<<<<<<",
        ]),
        make_embedded("Stage 2 - Rivets", &[
            "                            ",
            "            K               ",
            "   ======#========#==+==    ",
            "                     H      ",
            "                     H      ",
            "   =+===#========#======    ",
            "    H                       ",
            "    H    h                  ",
            "   ===#===+=====#=====      ",
            "          H                 ",
            "      $   H          M      ",
            "============================",
        ]),
        make_embedded("Stage 3 - Elevators", &[
            "                            ",
            "  K         P               ",
            ">>>>>>>>>>>>>>>>>>>|        ",
            "                   |        ",
            "                   |        ",
            "                   |        ",
            "                   E        ",
            "                   |        ",
            "                   |        ",
            "                   |        ",
            "     h             |     M  ",
            "<<<<<<<<<<<<<<<<<<<|<<<<<<<<",
        ]),
    ]
}

fn make_embedded(name: &str, map: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        rows: map.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::EntityKind;
    use crate::sim::factory::DefaultFactory;

    fn factory() -> DefaultFactory {
        DefaultFactory::new(&GameConfig::default())
    }

    #[test]
    fn embedded_levels_populate() {
        for def in embedded_levels() {
            let layout = populate(&def, &factory()).unwrap();
            let characters = layout
                .entities
                .iter()
                .filter(|(_, k)| matches!(k, EntityKind::Character(_)))
                .count();
            assert_eq!(characters, 1, "{}", def.name);
            assert_eq!(layout.width, 28.0 * TILE_SIZE, "{}", def.name);
            assert!(layout.has_goal || layout.breakables > 0, "{} cannot be cleared", def.name);
        }
    }

    #[test]
    fn ladders_are_vertical_runs() {
        let def = make_embedded("t", &[
            "==+==",
            "  H  ",
            "  H M",
            "=====",
        ]);
        let layout = populate(&def, &factory()).unwrap();
        let ladders: Vec<_> = layout
            .entities
            .iter()
            .filter(|(_, k)| matches!(k, EntityKind::Ladder))
            .map(|(b, _)| b.rect())
            .collect();
        assert_eq!(ladders.len(), 1);
        assert_eq!(ladders[0].top, 0.0);
        assert_eq!(ladders[0].bottom, 48.0);
        assert_eq!(ladders[0].left, 32.0);
    }

    #[test]
    fn girder_runs_become_one_platform() {
        let def = make_embedded("t", &[
            "    H   M ",
            ">>>>+>><<=",
        ]);
        let layout = populate(&def, &factory()).unwrap();
        let girders: Vec<_> = layout
            .entities
            .iter()
            .filter_map(|(b, k)| match k {
                EntityKind::Platform(p) => Some((b.rect().left, b.rect().right, p.slope)),
                _ => None,
            })
            .collect();
        assert_eq!(girders, vec![
            (0.0, 112.0, Slope::Right),
            (112.0, 144.0, Slope::Left),
            (144.0, 160.0, Slope::Flat),
        ]);
    }

    #[test]
    fn rivets_split_girder_runs() {
        let def = make_embedded("t", &[
            "   M  ",
            "==#===",
        ]);
        let layout = populate(&def, &factory()).unwrap();
        let spans: Vec<_> = layout
            .entities
            .iter()
            .filter(|(_, k)| matches!(k, EntityKind::Platform(_)))
            .map(|(b, _)| (b.rect().left, b.rect().right))
            .collect();
        assert_eq!(spans, vec![(0.0, 32.0), (48.0, 96.0), (32.0, 48.0)]);
    }

    #[test]
    fn elevator_spans_its_shaft() {
        let def = make_embedded("t", &[
            " |  ",
            " E  ",
            " | M",
            "= ==",
        ]);
        let layout = populate(&def, &factory()).unwrap();
        let lift = layout
            .entities
            .iter()
            .find_map(|(b, k)| match k {
                EntityKind::Platform(p) if p.is_movable() => Some((b.position, p.kind)),
                _ => None,
            })
            .unwrap();
        assert_eq!(lift.0, Position::new(16.0, 16.0));
        assert_eq!(
            lift.1,
            crate::domain::platform::PlatformKind::Movable { min_y: 0.0, max_y: 32.0, speed: 24.0 }
        );
    }

    #[test]
    fn oil_drum_sets_threshold_and_rivets_count() {
        let def = make_embedded("t", &[
            " O  M ",
            "==##==",
        ]);
        let layout = populate(&def, &factory()).unwrap();
        assert_eq!(layout.transform_threshold, Some(24.0));
        assert_eq!(layout.breakables, 2);
        assert!(!layout.has_goal);
    }

    #[test]
    fn bad_layouts_are_rejected() {
        let no_spawn = make_embedded("a", &["====="]);
        assert!(matches!(populate(&no_spawn, &factory()), Err(SimError::Level(_))));
        let two = make_embedded("b", &["M  M", "===="]);
        assert!(populate(&two, &factory()).is_err());
        let junk = make_embedded("c", &["M ?", "==="]);
        assert!(populate(&junk, &factory()).is_err());
    }

    #[test]
    fn parse_file_with_name() {
        let def = parse_level_file("# Test Stage\n  M\n====\n\n").unwrap();
        assert_eq!(def.name, "Test Stage");
        assert_eq!(def.rows, vec!["  M ".to_string(), "====".to_string()]);
    }

    #[test]
    fn rivet_row_is_not_a_name() {
        let def = parse_level_file("####\n M  \n").unwrap();
        assert_eq!(def.name, "Unnamed Stage");
        assert_eq!(def.rows.len(), 2);
    }
}
