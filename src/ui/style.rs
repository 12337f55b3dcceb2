/// 8-color ANSI SGR codes used by the frame composers.
///
/// Frames are built as plain strings so they can be inspected in tests and
/// written in one go. Colors are spliced in as the basic `ESC[3Xm` forms;
/// crossterm's `SetForegroundColor` writes named colors as `ESC[38;5;Nm`,
/// which 8-color terminals don't understand.

use std::fmt::Write as _;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";
pub const WHITE: &str = "\x1b[37m";

/// Append `text` wrapped in the given codes and a reset.
pub fn paint(buf: &mut String, codes: &[&str], text: impl std::fmt::Display) {
    for c in codes {
        buf.push_str(c);
    }
    let _ = write!(buf, "{text}");
    buf.push_str(RESET);
}

pub fn painted(codes: &[&str], text: impl std::fmt::Display) -> String {
    let mut s = String::new();
    paint(&mut s, codes, text);
    s
}

/// Strip SGR sequences, leaving the visible text.
#[cfg(test)]
pub fn visible(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_wraps_and_resets() {
        assert_eq!(painted(&[BOLD, RED], '*'), "\x1b[1m\x1b[31m*\x1b[0m");
    }

    #[test]
    fn colors_are_basic_foreground_codes() {
        for (code, n) in [(RED, 1), (GREEN, 2), (YELLOW, 3), (BLUE, 4), (CYAN, 6), (WHITE, 7)] {
            assert_eq!(code, format!("\x1b[3{n}m"));
        }
    }

    #[test]
    fn visible_strips_codes() {
        assert_eq!(visible(&painted(&[GREEN], "abc")), "abc");
    }
}
