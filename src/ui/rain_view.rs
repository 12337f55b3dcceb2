/// Matrix rain frame: every painted cell gets a fresh random glyph.

use crate::sim::rain::{Rain, RainCell};
use crate::ui::style::{self, BOLD, GREEN, WHITE};

pub const INTRO: &str = "ENTERING THE MATRIX...";
pub const HINT: &str = "Press Q to exit";
pub const OUTRO: &str = "Exiting the Matrix...";

pub fn compose(rain: &mut Rain) -> String {
    let (cols, rows) = (rain.cols(), rain.rows());
    let mut frame = String::with_capacity(cols * rows * 4);
    for row in 0..rows {
        if row > 0 {
            frame.push_str("\r\n");
        }
        for col in 0..cols {
            match rain.cell(col, row) {
                RainCell::Blank => frame.push(' '),
                RainCell::Head => {
                    let g = rain.glyph();
                    style::paint(&mut frame, &[BOLD, WHITE], g);
                }
                RainCell::Trail => {
                    let g = rain.glyph();
                    style::paint(&mut frame, &[GREEN], g);
                }
            }
        }
    }
    frame
}

/// Centered two-line intro shown before the rain starts.
pub fn intro(cols: u16, rows: u16) -> String {
    let mut out = String::new();
    let top = (rows / 2).saturating_sub(1);
    for _ in 0..top {
        out.push_str("\r\n");
    }
    out.push_str(&centered(&style::painted(&[BOLD, GREEN], INTRO), INTRO.len(), cols));
    out.push_str("\r\n");
    out.push_str(&centered(&style::painted(&[GREEN], HINT), HINT.len(), cols));
    out
}

fn centered(text: &str, visible_len: usize, cols: u16) -> String {
    let pad = (cols as usize).saturating_sub(visible_len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}
