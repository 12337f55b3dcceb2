/// Ranked list of best scores, persisted as JSON.
///
/// ## File format:
///   `[{"name": "Ann", "score": 50}, ...]`, highest first, at most 10.
///
/// Loading never fails: a missing or unreadable file is an empty board.
/// Saving writes a sibling temp file and renames it over the target, so a
/// crash mid-write leaves the previous board intact. Save errors are logged
/// and dropped; the in-memory board stays authoritative.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_ENTRIES: usize = 10;
pub const MAX_NAME_CHARS: usize = 12;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("score file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("score file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

impl ScoreEntry {
    /// Names are cut to 12 visible characters.
    pub fn new(name: &str, score: u32) -> Self {
        ScoreEntry {
            name: name.chars().take(MAX_NAME_CHARS).collect(),
            score,
        }
    }
}

/// Descending by score, ties in insertion order, never more than 10.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreBoard {
    entries: Vec<ScoreEntry>,
}

impl ScoreBoard {
    pub fn from_entries(entries: Vec<ScoreEntry>) -> Self {
        let mut board = ScoreBoard { entries };
        board.normalize();
        board
    }

    /// Insert and return the 1-based rank, or `None` if it fell off.
    pub fn insert(&mut self, entry: ScoreEntry) -> Option<usize> {
        self.entries.push(entry);
        let idx = self.entries.len() - 1;
        // Stable sort keeps earlier entries ahead of later equal scores,
        // so the new entry lands after every existing tie.
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| self.entries[b].score.cmp(&self.entries[a].score));
        let rank = order.iter().position(|&i| i == idx);
        self.normalize();
        rank.filter(|&r| r < MAX_ENTRIES).map(|r| r + 1)
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn top_score(&self) -> u32 {
        self.entries.first().map_or(0, |e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }
}

pub struct ScoreStore {
    path: PathBuf,
    board: ScoreBoard,
}

impl ScoreStore {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let board = match read_board(&path) {
            Ok(Some(board)) => {
                tracing::info!(path = %path.display(), entries = board.entries().len(), "loaded scores");
                board
            }
            Ok(None) => ScoreBoard::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable score file");
                ScoreBoard::default()
            }
        };
        ScoreStore { path, board }
    }

    /// Record a finished game and persist right away.
    pub fn add_score(&mut self, name: &str, score: u32) -> Option<usize> {
        let rank = self.board.insert(ScoreEntry::new(name, score));
        if let Err(e) = self.save() {
            tracing::warn!(path = %self.path.display(), error = %e, "could not save scores");
        }
        rank
    }

    pub fn save(&self) -> Result<(), ScoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_vec_pretty(self.board.entries())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            if let Err(rm) = fs::remove_file(&tmp) {
                tracing::debug!(path = %tmp.display(), error = %rm, "could not remove temp score file");
            }
            return Err(e.into());
        }
        Ok(())
    }

    pub fn board(&self) -> &ScoreBoard {
        &self.board
    }

    pub fn top_score(&self) -> u32 {
        self.board.top_score()
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_board(path: &Path) -> Result<Option<ScoreBoard>, ScoreError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let entries: Vec<ScoreEntry> = serde_json::from_str(&text)?;
    let entries = entries
        .into_iter()
        .map(|e| ScoreEntry::new(&e.name, e.score))
        .collect();
    Ok(Some(ScoreBoard::from_entries(entries)))
}
