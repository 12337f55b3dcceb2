/// Line-based screens around the snake game (cooked terminal mode).
///
/// Every read returns `None` on end of input; callers treat that as quit.

use std::io::{self, BufRead, Write};

use crate::sim::scores::{ScoreBoard, MAX_NAME_CHARS};
use crate::sim::session::GameSummary;
use crate::ui::style::{self, BOLD, CYAN, GREEN, RED, YELLOW};
use crate::ui::term;

pub const DEFAULT_NAME: &str = "Anonymous";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuChoice {
    Play,
    Scores,
    Quit,
}

/// Keep letters, digits and spaces; trim; cap at 12 chars; default when
/// nothing is left.
pub fn sanitize_name(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .take(MAX_NAME_CHARS)
        .collect();
    let trimmed = kept.trim();
    if trimmed.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

pub struct Screen<R, W> {
    input: R,
    out: W,
    ansi: bool,
}

impl<R: BufRead, W: Write> Screen<R, W> {
    pub fn new(input: R, out: W, ansi: bool) -> Self {
        Screen { input, out, ansi }
    }

    pub fn menu(&mut self) -> io::Result<MenuChoice> {
        loop {
            self.title("SNAKE GAME")?;
            for item in ["1. Play Game", "2. View Scoreboard", "3. Quit"] {
                self.line(&style::painted(&[CYAN], item))?;
            }
            self.line("")?;
            write!(self.out, "Choose option (1-3): ")?;
            self.out.flush()?;

            let Some(choice) = self.read_line()? else {
                return Ok(MenuChoice::Quit);
            };
            match choice.trim() {
                "1" => return Ok(MenuChoice::Play),
                "2" => return Ok(MenuChoice::Scores),
                "3" => return Ok(MenuChoice::Quit),
                other => {
                    tracing::debug!(input = other, "invalid menu choice");
                    self.line("")?;
                    self.line(&style::painted(&[RED], "Invalid choice! Please press 1, 2, or 3."))?;
                    if !self.pause()? {
                        return Ok(MenuChoice::Quit);
                    }
                }
            }
        }
    }

    /// `None` when input ended before a name was given.
    pub fn ask_name(&mut self) -> io::Result<Option<String>> {
        self.title("SNAKE GAME")?;
        write!(self.out, "Enter your name (max {MAX_NAME_CHARS} chars): ")?;
        self.out.flush()?;
        Ok(self.read_line()?.map(|raw| sanitize_name(&raw)))
    }

    pub fn scoreboard(&mut self, board: &ScoreBoard) -> io::Result<()> {
        self.clear()?;
        self.line(&style::painted(&[BOLD, YELLOW], "TOP 10 SCOREBOARD"))?;
        self.line(&"=".repeat(30))?;
        self.line("")?;
        if board.is_empty() {
            self.line(&style::painted(&[CYAN], "No scores yet!"))?;
        } else {
            self.line(&format!("{:<5} {:<15} {:<6}", "Rank", "Name", "Score"))?;
            self.line(&"-".repeat(30))?;
            for (i, e) in board.entries().iter().enumerate() {
                let color = if i < 3 { YELLOW } else { CYAN };
                let row = format!("{:<5} {:<15} {:<6}", i + 1, e.name, e.score);
                self.line(&style::painted(&[color], row))?;
            }
        }
        self.line("")?;
        self.pause()?;
        Ok(())
    }

    /// Report the result; `true` if the player wants another round.
    pub fn game_over(&mut self, summary: &GameSummary) -> io::Result<bool> {
        self.clear()?;
        self.line(&style::painted(&[BOLD, RED], "GAME OVER!"))?;
        self.line("")?;
        self.line(&format!("Player: {}", style::painted(&[CYAN], &summary.player)))?;
        self.line(&format!("Final Score: {}", style::painted(&[YELLOW], summary.score)))?;
        if summary.new_high {
            self.line(&style::painted(&[BOLD, YELLOW], "NEW HIGH SCORE!"))?;
        } else if let Some(rank) = summary.rank {
            self.line(&format!("Rank #{rank} on the scoreboard"))?;
        }
        self.line("")?;
        write!(self.out, "Play again? (y/N): ")?;
        self.out.flush()?;
        Ok(self
            .read_line()?
            .is_some_and(|a| a.trim().eq_ignore_ascii_case("y")))
    }

    /// Wait for Enter. `false` if input ended instead.
    pub fn pause(&mut self) -> io::Result<bool> {
        write!(self.out, "Press Enter to continue...")?;
        self.out.flush()?;
        Ok(self.read_line()?.is_some())
    }

    fn title(&mut self, text: &str) -> io::Result<()> {
        self.clear()?;
        self.line(&style::painted(&[BOLD, GREEN], text))?;
        self.line(&"=".repeat(20))?;
        self.line("")
    }

    fn clear(&mut self) -> io::Result<()> {
        if self.ansi {
            term::clear_screen(&mut self.out)?;
        }
        Ok(())
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        match self.input.read_line(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string())),
            // A signal landed mid-read; the caller checks the interrupt flag.
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e),
        }
    }
}
