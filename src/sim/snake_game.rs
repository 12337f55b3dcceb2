/// Snake rules: one `step()` per tick.
///
/// Per step:
///   1. Commit the queued direction unless it reverses the current one
///   2. Offset the head one cell
///   3. Wall or body hit → game over, nothing else changes
///   4. Push the new head
///   5. On food: +10, respawn food on a free cell, speed up (bounded)
///   6. Otherwise drop the tail

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::SnakeConfig;
use crate::domain::grid::{Direction, Grid, Position};
use crate::domain::snake::Snake;

pub const FOOD_POINTS: u32 = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameOverCause {
    Wall,
    SelfHit,
    /// No free cell left for food.
    BoardFull,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepOutcome {
    Moved,
    Ate,
    Over(GameOverCause),
}

/// Tick pacing: starts at `start`, shrinks by `decrement` per food, never
/// below `floor`.
#[derive(Clone, Copy, Debug)]
pub struct Pace {
    pub start: Duration,
    pub decrement: Duration,
    pub floor: Duration,
}

impl From<&SnakeConfig> for Pace {
    fn from(cfg: &SnakeConfig) -> Self {
        Pace { start: cfg.tick, decrement: cfg.tick_decrement, floor: cfg.tick_floor }
    }
}

pub struct SnakeGame {
    grid: Grid,
    snake: Snake,
    food: Position,
    direction: Direction,
    next_direction: Direction,
    score: u32,
    pace: Pace,
    tick_interval: Duration,
    over: Option<GameOverCause>,
    rng: StdRng,
}

impl SnakeGame {
    /// Fresh game: one-cell snake at the centre heading right.
    pub fn new(cfg: &SnakeConfig, rng: StdRng) -> Self {
        let grid = Grid::new(cfg.width, cfg.height);
        let snake = Snake::new(grid.center());
        SnakeGame::with_state(grid, snake, Direction::Right, None, Pace::from(cfg), rng)
    }

    /// Start from an explicit position. `food: None` places it randomly.
    pub fn with_state(
        grid: Grid,
        snake: Snake,
        direction: Direction,
        food: Option<Position>,
        pace: Pace,
        rng: StdRng,
    ) -> Self {
        let tick_interval = pace.start.max(pace.floor);
        let mut game = SnakeGame {
            grid,
            snake,
            food: Position::new(0, 0),
            direction,
            next_direction: direction,
            score: 0,
            pace,
            tick_interval,
            over: None,
            rng,
        };
        match food {
            Some(f) if !game.snake.contains(f) => game.food = f,
            _ => match game.random_free_cell() {
                Some(f) => game.food = f,
                None => game.over = Some(GameOverCause::BoardFull),
            },
        }
        game
    }

    pub fn grid(&self) -> Grid { self.grid }
    pub fn snake(&self) -> &Snake { &self.snake }
    pub fn food(&self) -> Position { self.food }
    #[cfg(test)]
    pub fn direction(&self) -> Direction { self.direction }
    pub fn score(&self) -> u32 { self.score }
    pub fn tick_interval(&self) -> Duration { self.tick_interval }
    pub fn over(&self) -> Option<GameOverCause> { self.over }

    /// Remember a direction for the next tick. The latest valid request
    /// wins; reversing the committed direction is ignored.
    pub fn queue_direction(&mut self, dir: Direction) {
        if self.over.is_some() || dir.is_reverse_of(self.direction) {
            return;
        }
        self.next_direction = dir;
    }

    pub fn step(&mut self) -> StepOutcome {
        if let Some(cause) = self.over {
            return StepOutcome::Over(cause);
        }

        if !self.next_direction.is_reverse_of(self.direction) {
            self.direction = self.next_direction;
        }

        let new_head = self.snake.head().step(self.direction);

        if !self.grid.contains(new_head) {
            return self.finish(GameOverCause::Wall);
        }
        if self.snake.contains(new_head) {
            return self.finish(GameOverCause::SelfHit);
        }

        self.snake.push_head(new_head);

        if new_head == self.food {
            self.score += FOOD_POINTS;
            self.tick_interval = self
                .tick_interval
                .saturating_sub(self.pace.decrement)
                .max(self.pace.floor);
            match self.random_free_cell() {
                Some(f) => self.food = f,
                None => return self.finish(GameOverCause::BoardFull),
            }
            StepOutcome::Ate
        } else {
            self.snake.pop_tail();
            StepOutcome::Moved
        }
    }

    fn finish(&mut self, cause: GameOverCause) -> StepOutcome {
        self.over = Some(cause);
        StepOutcome::Over(cause)
    }

    /// Uniform over the grid, retried until the cell is off the snake.
    fn random_free_cell(&mut self) -> Option<Position> {
        if self.snake.len() >= self.grid.cell_count() {
            return None;
        }
        loop {
            let p = Position::new(
                self.rng.gen_range(0..self.grid.width),
                self.rng.gen_range(0..self.grid.height),
            );
            if !self.snake.contains(p) {
                return Some(p);
            }
        }
    }
}
