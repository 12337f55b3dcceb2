/// Terminal mode, cursor and screen control.
///
/// Raw mode is a process-wide resource. `RawMode` is the only way to take
/// it: a scoped guard that gives it back on drop, so every exit path
/// (return, `?`, panic unwinding) restores line-buffered input and a
/// visible cursor. Only one guard can be live at a time.

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::ResetColor,
    terminal::{self, Clear, ClearType},
};
use thiserror::Error;

pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

#[derive(Debug, Error)]
pub enum TermError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("raw mode is already held")]
    RawModeBusy,
}

static RAW_HELD: AtomicBool = AtomicBool::new(false);

/// Scoped hold on raw (non-canonical, non-echoing) terminal mode.
pub struct RawMode {
    active: bool,
}

impl RawMode {
    pub fn acquire() -> Result<RawMode, TermError> {
        if RAW_HELD
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(TermError::RawModeBusy);
        }
        if let Err(e) = terminal::enable_raw_mode() {
            RAW_HELD.store(false, Ordering::SeqCst);
            return Err(e.into());
        }
        Ok(RawMode { active: true })
    }

    /// Take raw mode if the terminal allows it; otherwise hand back an
    /// inert guard and let the caller run with reduced capabilities.
    pub fn acquire_or_degrade() -> RawMode {
        match RawMode::acquire() {
            Ok(guard) => {
                tracing::debug!("raw mode acquired");
                guard
            }
            Err(e) => {
                tracing::warn!(error = %e, "raw mode unavailable, running degraded");
                RawMode { active: false }
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Restore cooked mode and the cursor. Safe to call more than once.
    pub fn exit(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!(error = %e, "failed to leave raw mode");
        }
        if let Err(e) = execute!(io::stdout(), ResetColor, cursor::Show) {
            tracing::debug!(error = %e, "failed to restore cursor");
        }
        RAW_HELD.store(false, Ordering::SeqCst);
        tracing::debug!("raw mode released");
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        self.exit();
    }
}

/// Whether some guard currently holds raw mode.
pub fn raw_mode_held() -> bool {
    RAW_HELD.load(Ordering::SeqCst)
}

/// Last-resort restoration for panic hooks and signal paths.
pub fn restore_best_effort() {
    let _ = terminal::disable_raw_mode();
    let mut out = io::stdout();
    let _ = execute!(out, ResetColor, cursor::Show);
    let _ = out.flush();
}

/// Whether stdout can take full-screen control sequences.
pub fn supports_ansi() -> bool {
    io::stdout().is_terminal()
}

/// Columns × rows of the terminal, or 80×24 when it cannot be read.
pub fn detect_size() -> (u16, u16) {
    match terminal::size() {
        Ok((c, r)) if c > 0 && r > 0 => (c, r),
        _ => FALLBACK_SIZE,
    }
}

pub fn hide_cursor(out: &mut impl Write) -> io::Result<()> {
    queue!(out, cursor::Hide)
}

pub fn show_cursor(out: &mut impl Write) -> io::Result<()> {
    queue!(out, cursor::Show)
}

pub fn move_cursor_home(out: &mut impl Write) -> io::Result<()> {
    queue!(out, MoveTo(0, 0))
}

pub fn clear_to_end_of_screen(out: &mut impl Write) -> io::Result<()> {
    queue!(out, Clear(ClearType::FromCursorDown))
}

pub fn clear_screen(out: &mut impl Write) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))
}

/// Overwrite the previous frame in place: home, frame, then wipe whatever
/// a taller earlier frame left below. Without ANSI support the frame is
/// simply appended.
pub fn present(out: &mut impl Write, frame: &str, ansi: bool) -> io::Result<()> {
    if ansi {
        move_cursor_home(out)?;
        out.write_all(frame.as_bytes())?;
        clear_to_end_of_screen(out)?;
    } else {
        out.write_all(frame.as_bytes())?;
        out.write_all(b"\r\n")?;
    }
    out.flush()
}
