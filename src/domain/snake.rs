/// The snake body: an ordered run of cells, head first.
///
/// Invariants: never empty, never holds the same cell twice.
/// Callers check `contains` before `push_head`; the body itself only
/// guards the invariant in debug builds.

use std::collections::VecDeque;

use super::grid::Position;

#[derive(Clone, Debug, PartialEq)]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    /// A one-cell snake.
    pub fn new(head: Position) -> Self {
        let mut body = VecDeque::with_capacity(64);
        body.push_back(head);
        Snake { body }
    }

    /// Build from explicit cells, head first. Returns `None` for an empty
    /// list or one that repeats a cell.
    #[cfg(test)]
    pub fn from_cells(cells: &[Position]) -> Option<Self> {
        if cells.is_empty() {
            return None;
        }
        for (i, c) in cells.iter().enumerate() {
            if cells[..i].contains(c) {
                return None;
            }
        }
        Some(Snake { body: cells.iter().copied().collect() })
    }

    pub fn head(&self) -> Position {
        // Non-empty by construction.
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn contains(&self, p: Position) -> bool {
        self.body.contains(&p)
    }

    #[cfg(test)]
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub fn push_head(&mut self, p: Position) {
        debug_assert!(!self.contains(p), "snake cell {p:?} duplicated");
        self.body.push_front(p);
    }

    /// Drop the tail cell. A one-cell snake keeps its only cell.
    pub fn pop_tail(&mut self) -> Option<Position> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }
}
