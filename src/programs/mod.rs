/// Launchable programs and the registry the launcher picks from.

pub mod matrix;
pub mod snake;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::GameConfig;

/// Process-wide state shared with a running program. Configuration is
/// handed over once, when the registry builds the program.
pub struct Context {
    pub interrupt: Arc<AtomicBool>,
}

impl Context {
    pub fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }
}

pub trait Program {
    /// Runs until the player leaves or the process is interrupted. The
    /// terminal must be back in cooked mode when this returns.
    fn run(&mut self, ctx: &Context) -> anyhow::Result<()>;
}

pub struct Entry {
    pub name: &'static str,
    pub about: &'static str,
    pub build: fn(&GameConfig) -> Box<dyn Program>,
}

pub static REGISTRY: &[Entry] = &[
    Entry {
        name: "snake",
        about: "classic snake with a top-10 scoreboard",
        build: snake::build,
    },
    Entry {
        name: "matrix",
        about: "falling green glyphs",
        build: matrix::build,
    },
];

/// Case-insensitive lookup by name.
pub fn lookup(name: &str) -> Option<&'static Entry> {
    let name = name.trim();
    REGISTRY.iter().find(|e| e.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_programs_are_registered() {
        let names: Vec<_> = REGISTRY.iter().map(|e| e.name).collect();
        assert_eq!(names, ["snake", "matrix"]);
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        assert_eq!(lookup("  Snake ").map(|e| e.name), Some("snake"));
        assert_eq!(lookup("MATRIX").map(|e| e.name), Some("matrix"));
        assert!(lookup("tetris").is_none());
    }
}
