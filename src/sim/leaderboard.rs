/// High score table persisted as TOML.
///
/// ## File format:
///   An array of `[[entries]]` tables, best score first.
///
///   ```toml
///   [[entries]]
///   name = "PLAYER"
///   score = 12300
///   level = 3
///   ```
///
/// At most `CAPACITY` entries are kept. A missing file is an empty table;
/// an unreadable or malformed one is an error the caller may degrade on.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

pub const CAPACITY: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    /// Levels cleared during the session (1-based: the level reached).
    pub level: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    #[serde(default)]
    pub entries: Vec<LeaderboardEntry>,
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

/// Writable directory for the score file.
fn data_dir() -> PathBuf {
    // 1. Exe directory (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let probe = parent.join(".write_test_girder_run");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/girder-run");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Absolute paths are used as given; relative ones land in the data dir.
pub fn resolve_path(file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        data_dir().join(file)
    }
}

// ══════════════════════════════════════════════════════════════
// Table operations
// ══════════════════════════════════════════════════════════════

impl Leaderboard {
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Leaderboard::default()),
            Err(source) => return Err(SimError::Persistence { path: path.to_path_buf(), source }),
        };
        let mut board: Leaderboard = toml::from_str(&text)?;
        board.normalize();
        Ok(board)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|source| SimError::Persistence { path: parent.to_path_buf(), source })?;
        }
        std::fs::write(path, text)
            .map_err(|source| SimError::Persistence { path: path.to_path_buf(), source })
    }

    /// Would this score make the table?
    pub fn qualifies(&self, score: u32) -> bool {
        score > 0
            && (self.entries.len() < CAPACITY
                || self.entries.last().map_or(true, |e| score > e.score))
    }

    /// Insert keeping the table sorted and capped. Returns the 0-based rank,
    /// or `None` if the score did not make the table.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        // Ties go below existing entries
        let rank = self.entries.iter().position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(rank, entry);
        self.entries.truncate(CAPACITY);
        Some(rank)
    }

    pub fn best(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }

    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(CAPACITY);
    }
}

/// Record a finished session in the file at `path`.
pub fn record(path: &Path, entry: LeaderboardEntry) -> Result<Option<usize>> {
    let mut board = Leaderboard::load(path)?;
    let rank = board.insert(entry);
    if rank.is_some() {
        board.save(path)?;
    }
    Ok(rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u32) -> LeaderboardEntry {
        LeaderboardEntry { name: name.into(), score, level: 1 }
    }

    fn temp_file(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("girder_run_test_{}_{}", std::process::id(), tag))
            .join("scores.toml")
    }

    #[test]
    fn insert_keeps_order_and_cap() {
        let mut board = Leaderboard::default();
        for i in 0..12 {
            board.insert(entry("p", 100 * (i + 1)));
        }
        assert_eq!(board.entries.len(), CAPACITY);
        assert_eq!(board.best().map(|e| e.score), Some(1200));
        assert_eq!(board.entries.last().map(|e| e.score), Some(300));
        assert_eq!(board.insert(entry("low", 200)), None);
        assert_eq!(board.insert(entry("mid", 650)), Some(6));
    }

    #[test]
    fn zero_score_never_recorded() {
        let mut board = Leaderboard::default();
        assert_eq!(board.insert(entry("p", 0)), None);
    }

    #[test]
    fn ties_rank_below() {
        let mut board = Leaderboard::default();
        board.insert(entry("first", 500));
        assert_eq!(board.insert(entry("second", 500)), Some(1));
        assert_eq!(board.entries[0].name, "first");
    }

    #[test]
    fn missing_file_is_empty() {
        let board = Leaderboard::load(&temp_file("missing")).unwrap();
        assert!(board.entries.is_empty());
    }

    #[test]
    fn save_and_reload() {
        let path = temp_file("reload");
        let rank = record(&path, entry("ann", 4200)).unwrap();
        assert_eq!(rank, Some(0));
        record(&path, entry("bob", 9000)).unwrap();

        let board = Leaderboard::load(&path).unwrap();
        assert_eq!(board.entries.len(), 2);
        assert_eq!(board.entries[0].name, "bob");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let path = temp_file("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "entries = 7").unwrap();
        let err = Leaderboard::load(&path).unwrap_err();
        assert!(matches!(err, SimError::Parse(_)));
        assert!(err.is_degradable());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn unreadable_path_is_persistence_error() {
        // a directory cannot be read as a file
        let dir = std::env::temp_dir();
        let err = Leaderboard::load(&dir).unwrap_err();
        assert!(matches!(err, SimError::Persistence { .. }));
    }
}
