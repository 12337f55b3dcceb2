/// Grid coordinates and movement directions.

/// A cell on the playfield. `(0, 0)` is the top-left corner.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The neighbouring cell one step in `dir`. May lie outside any grid.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Position { x: self.x + dx, y: self.y + dy }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_reverse_of(self, other: Direction) -> bool {
        self.reverse() == other
    }
}

/// Playfield bounds. Valid cells are `0..width` × `0..height`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Grid { width, height }
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_moves_one_cell() {
        let p = Position::new(15, 7);
        assert_eq!(p.step(Direction::Right), Position::new(16, 7));
        assert_eq!(p.step(Direction::Up), Position::new(15, 6));
        assert_eq!(p.step(Direction::Left), Position::new(14, 7));
        assert_eq!(p.step(Direction::Down), Position::new(15, 8));
    }

    #[test]
    fn reverse_pairs() {
        assert!(Direction::Left.is_reverse_of(Direction::Right));
        assert!(Direction::Up.is_reverse_of(Direction::Down));
        assert!(!Direction::Up.is_reverse_of(Direction::Left));
        assert!(!Direction::Up.is_reverse_of(Direction::Up));
    }

    #[test]
    fn grid_bounds_are_exclusive() {
        let g = Grid::new(30, 15);
        assert!(g.contains(Position::new(0, 0)));
        assert!(g.contains(Position::new(29, 14)));
        assert!(!g.contains(Position::new(30, 7)));
        assert!(!g.contains(Position::new(-1, 7)));
        assert!(!g.contains(Position::new(5, 15)));
        assert_eq!(g.center(), Position::new(15, 7));
    }
}
