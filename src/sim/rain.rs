/// Falling-column ("matrix rain") state.
///
/// One `Drop` per terminal column. Per tick, per column: a drop whose head
/// is off-screen (above the top or past the bottom), or whose random draw
/// beats its fall probability, is reseeded at a random offset in
/// `-max_start_offset..=0` with a fresh probability; any other drop falls
/// one row. Offsets include 0, so a reseeded column turns visible within a
/// few ticks.

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::RainConfig;

pub const GLYPHS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!@#$%^&*()";

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Drop {
    pub column: usize,
    /// Row of the leading glyph; negative means not visible yet.
    pub head_row: i32,
    pub fall_probability: f64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RainCell {
    Blank,
    Trail,
    Head,
}

pub struct Rain {
    drops: Vec<Drop>,
    cols: usize,
    rows: usize,
    cfg: RainConfig,
    rng: StdRng,
}

impl Rain {
    pub fn new(cols: usize, rows: usize, cfg: RainConfig, rng: StdRng) -> Self {
        let mut rain = Rain { drops: Vec::new(), cols: 0, rows, cfg, rng };
        rain.resize(cols, rows);
        rain
    }

    pub fn cols(&self) -> usize { self.cols }
    pub fn rows(&self) -> usize { self.rows }
    #[cfg(test)]
    pub fn drops(&self) -> &[Drop] { &self.drops }

    /// Match a new terminal size. Surviving columns keep their drops.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        self.rows = rows;
        if cols < self.drops.len() {
            self.drops.truncate(cols);
        }
        while self.drops.len() < cols {
            let column = self.drops.len();
            let drop = self.seeded(column);
            self.drops.push(drop);
        }
        self.cols = cols;
    }

    pub fn is_active(&self, d: &Drop) -> bool {
        d.head_row >= 0 && (d.head_row as usize) < self.rows
    }

    pub fn tick(&mut self) {
        for i in 0..self.drops.len() {
            let d = self.drops[i];
            let inactive = !self.is_active(&d);
            if inactive || self.rng.gen::<f64>() > d.fall_probability {
                self.drops[i] = self.seeded(d.column);
            } else {
                self.drops[i].head_row += 1;
            }
        }
    }

    /// What belongs at `(col, row)`: the head row is bright, up to
    /// `trail_len - head_len` rows above it are trail.
    pub fn cell(&self, col: usize, row: usize) -> RainCell {
        let Some(d) = self.drops.get(col) else {
            return RainCell::Blank;
        };
        let dist = d.head_row - row as i32;
        if dist < 0 || dist >= self.cfg.trail_len {
            RainCell::Blank
        } else if dist < self.cfg.head_len {
            RainCell::Head
        } else {
            RainCell::Trail
        }
    }

    /// A random glyph; called per painted cell, every tick.
    pub fn glyph(&mut self) -> char {
        GLYPHS[self.rng.gen_range(0..GLYPHS.len())] as char
    }

    fn seeded(&mut self, column: usize) -> Drop {
        Drop {
            column,
            head_row: -self.rng.gen_range(0..=self.cfg.max_start_offset),
            fall_probability: self.rng.gen_range(self.cfg.fall_prob_min..=self.cfg.fall_prob_max),
        }
    }
}
