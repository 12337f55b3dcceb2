/// Snake playfield frame.
///
/// Layout:
///   SNAKE GAME - <player>
///   Score: N | High Score: M
///   WASD/Arrows: move   Q: quit
///   (blank)
///   ##########   border row, blue
///   #O o  *  #   grid rows framed by walls
///   ##########

use crate::domain::grid::Position;
use crate::sim::snake_game::SnakeGame;
use crate::ui::style::{self, BLUE, BOLD, GREEN, RED};

pub const HEAD: char = 'O';
pub const BODY: char = 'o';
pub const FOOD: char = '*';
pub const WALL: char = '#';

/// Text shown above the board.
pub struct Hud<'a> {
    pub player: &'a str,
    /// Best stored score before this game started.
    pub high_score: u32,
}

pub fn compose(game: &SnakeGame, hud: &Hud) -> String {
    let grid = game.grid();
    let head = game.snake().head();
    let mut lines: Vec<String> = Vec::with_capacity(grid.height as usize + 6);

    lines.push(style::painted(&[BOLD, GREEN], format!("SNAKE GAME - {}", hud.player)));
    lines.push(format!(
        "Score: {} | High Score: {}",
        game.score(),
        hud.high_score.max(game.score())
    ));
    lines.push("WASD/Arrows: move   Q: quit".to_string());
    lines.push(String::new());

    let border = style::painted(&[BLUE], WALL.to_string().repeat(grid.width as usize + 2));
    lines.push(border.clone());
    for y in 0..grid.height {
        let mut row = style::painted(&[BLUE], WALL);
        for x in 0..grid.width {
            let p = Position::new(x, y);
            if p == head {
                style::paint(&mut row, &[BOLD, GREEN], HEAD);
            } else if game.snake().contains(p) {
                style::paint(&mut row, &[GREEN], BODY);
            } else if p == game.food() {
                style::paint(&mut row, &[BOLD, RED], FOOD);
            } else {
                row.push(' ');
            }
        }
        style::paint(&mut row, &[BLUE], WALL);
        lines.push(row);
    }
    lines.push(border);

    lines.join("\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::{Direction, Grid};
    use crate::domain::snake::Snake;
    use crate::sim::snake_game::Pace;
    use crate::ui::style::visible;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn game() -> SnakeGame {
        let snake = Snake::from_cells(&[Position::new(2, 1), Position::new(1, 1)]).unwrap();
        let pace = Pace {
            start: Duration::from_millis(250),
            decrement: Duration::from_millis(3),
            floor: Duration::from_millis(100),
        };
        SnakeGame::with_state(
            Grid::new(5, 3),
            snake,
            Direction::Right,
            Some(Position::new(4, 2)),
            pace,
            StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn board_is_framed_and_marked() {
        let frame = compose(&game(), &Hud { player: "Ann", high_score: 40 });
        let lines: Vec<String> = frame.split("\r\n").map(visible).collect();
        assert_eq!(lines[0], "SNAKE GAME - Ann");
        assert_eq!(lines[1], "Score: 0 | High Score: 40");
        assert_eq!(lines[4], "#######");
        assert_eq!(lines[5], "#     #");
        assert_eq!(lines[6], "# oO  #");
        assert_eq!(lines[7], "#    *#");
        assert_eq!(lines[8], "#######");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn glyphs_are_colored() {
        let frame = compose(&game(), &Hud { player: "Ann", high_score: 0 });
        assert!(frame.contains(&style::painted(&[BOLD, GREEN], HEAD)));
        assert!(frame.contains(&style::painted(&[GREEN], BODY)));
        assert!(frame.contains(&style::painted(&[BOLD, RED], FOOD)));
    }

    #[test]
    fn live_score_lifts_high_score() {
        let mut g = game();
        g.queue_direction(Direction::Down);
        g.step();
        g.queue_direction(Direction::Right);
        g.step();
        g.step();
        assert_eq!(g.score(), 10);
        let frame = compose(&g, &Hud { player: "Ann", high_score: 0 });
        assert!(visible(&frame).contains("Score: 10 | High Score: 10"));
    }
}
