/// Snake front-end: menu, name entry, play, game over, scoreboard.

use std::io::{self, BufWriter, Write};

use anyhow::Context as _;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::programs::{Context, Program};
use crate::sim::frame_loop::{Activity, FrameLoop, LoopExit, SystemClock, TickOutcome};
use crate::sim::scores::ScoreStore;
use crate::sim::session::{GamePhase, GameSummary, PhaseEvent, Transition};
use crate::sim::snake_game::{SnakeGame, StepOutcome};
use crate::ui::input::{Key, Keys};
use crate::ui::prompt::{MenuChoice, Screen, DEFAULT_NAME};
use crate::ui::snake_view::{self, Hud};
use crate::ui::term::{self, RawMode};

pub fn build(config: &GameConfig) -> Box<dyn Program> {
    Box::new(SnakeProgram::new(config.clone()))
}

pub struct SnakeProgram {
    cfg: GameConfig,
    store: ScoreStore,
    player: String,
    last: Option<GameSummary>,
}

impl SnakeProgram {
    pub fn new(cfg: GameConfig) -> Self {
        let store = ScoreStore::load(&cfg.scores_path);
        SnakeProgram { cfg, store, player: DEFAULT_NAME.to_string(), last: None }
    }

    /// One round in raw mode. The score is recorded however the round
    /// ended, including quit and interrupt.
    fn play(&mut self, ctx: &Context) -> anyhow::Result<LoopExit> {
        let ansi = term::supports_ansi();
        let mut raw = RawMode::acquire_or_degrade();
        let mut keys = Keys::open(raw.is_active(), &self.cfg.gamepad);

        let mut field = PlayField {
            game: SnakeGame::new(&self.cfg.snake, StdRng::from_entropy()),
            hud: Hud { player: &self.player, high_score: self.store.top_score() },
            ansi,
        };
        tracing::info!(player = %self.player, "round started");

        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        let result = FrameLoop::new(&self.cfg.frame).run(
            &mut SystemClock::new(),
            &mut keys,
            &mut field,
            &mut out,
            &ctx.interrupt,
        );
        keys.discard_typeahead();
        if let Err(e) = out.flush() {
            tracing::debug!(error = %e, "final frame flush failed");
        }
        drop(out);
        raw.exit();

        self.last = Some(finish_round(&mut self.store, &field.game, &self.player));
        let exit = result.context("snake playfield I/O failed")?;
        tracing::debug!(?exit, "playfield closed");
        Ok(exit)
    }
}

/// Persist the round's score and summarize it for the game-over screen.
fn finish_round(store: &mut ScoreStore, game: &SnakeGame, player: &str) -> GameSummary {
    let score = game.score();
    let rank = store.add_score(player, score);
    tracing::info!(player, score, cause = ?game.over(), ?rank, "round over");
    GameSummary::new(player, score, rank, store.top_score())
}

impl Program for SnakeProgram {
    fn run(&mut self, ctx: &Context) -> anyhow::Result<()> {
        let ansi = term::supports_ansi();
        let mut phase = GamePhase::Menu;

        loop {
            if ctx.interrupted() {
                tracing::info!(?phase, "interrupted");
                return Ok(());
            }
            let mut screen = Screen::new(io::stdin().lock(), io::stdout(), ansi);

            let event = match phase {
                GamePhase::Menu => match screen.menu()? {
                    MenuChoice::Play => PhaseEvent::Play,
                    MenuChoice::Scores => PhaseEvent::ShowScores,
                    MenuChoice::Quit => PhaseEvent::Quit,
                },
                GamePhase::Naming => match screen.ask_name()? {
                    Some(name) => {
                        self.player = name;
                        PhaseEvent::NameEntered
                    }
                    None => PhaseEvent::Quit,
                },
                GamePhase::Playing => {
                    drop(screen);
                    match self.play(ctx)? {
                        LoopExit::Quit => PhaseEvent::Quit,
                        LoopExit::Finished | LoopExit::Interrupted => PhaseEvent::GameEnded,
                    }
                }
                GamePhase::GameOver => match &self.last {
                    Some(summary) if screen.game_over(summary)? => PhaseEvent::PlayAgain,
                    _ => PhaseEvent::Acknowledge,
                },
                GamePhase::Scoreboard => {
                    screen.scoreboard(self.store.board())?;
                    PhaseEvent::Acknowledge
                }
            };

            match phase.on(event) {
                Some(Transition::To(next)) => {
                    tracing::debug!(from = ?phase, to = ?next, "phase change");
                    phase = next;
                }
                Some(Transition::Exit) => return Ok(()),
                None => {
                    tracing::warn!(?phase, ?event, "unexpected event, back to menu");
                    phase = GamePhase::Menu;
                }
            }
        }
    }
}

/// The real-time part of a round.
struct PlayField<'a> {
    game: SnakeGame,
    hud: Hud<'a>,
    ansi: bool,
}

impl Activity for PlayField<'_> {
    fn start(&mut self, mut out: &mut dyn Write) -> io::Result<()> {
        if self.ansi {
            term::clear_screen(&mut out)?;
            term::hide_cursor(&mut out)?;
        }
        Ok(())
    }

    fn on_key(&mut self, key: Key) {
        if let Some(dir) = key.direction() {
            self.game.queue_direction(dir);
        }
    }

    fn tick(&mut self) -> TickOutcome {
        match self.game.step() {
            StepOutcome::Over(cause) => {
                tracing::debug!(?cause, score = self.game.score(), "snake stopped");
                TickOutcome::Finished
            }
            StepOutcome::Ate => {
                tracing::trace!(score = self.game.score(), interval = ?self.game.tick_interval(), "food eaten");
                TickOutcome::Continue
            }
            StepOutcome::Moved => TickOutcome::Continue,
        }
    }

    fn tick_interval(&self) -> std::time::Duration {
        self.game.tick_interval()
    }

    fn render(&mut self, mut out: &mut dyn Write) -> io::Result<()> {
        let frame = snake_view::compose(&self.game, &self.hud);
        term::present(&mut out, &frame, self.ansi)
    }

    fn stop(&mut self, mut out: &mut dyn Write) -> io::Result<()> {
        if self.ansi {
            term::show_cursor(&mut out)?;
        }
        out.write_all(b"\r\n")?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::{Direction, Grid, Position};
    use crate::domain::snake::Snake;
    use crate::sim::frame_loop::FakeClock;
    use crate::sim::snake_game::{GameOverCause, Pace};
    use crate::ui::input::ScriptedKeys;
    use crate::ui::style::visible;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    fn field(hud: Hud<'_>) -> PlayField<'_> {
        let pace = Pace {
            start: Duration::from_millis(100),
            decrement: Duration::from_millis(3),
            floor: Duration::from_millis(50),
        };
        let game = SnakeGame::with_state(
            Grid::new(10, 5),
            Snake::new(Position::new(5, 2)),
            Direction::Right,
            Some(Position::new(0, 0)),
            pace,
            StdRng::seed_from_u64(11),
        );
        PlayField { game, hud, ansi: false }
    }

    #[test]
    fn round_runs_until_the_wall() {
        let mut f = field(Hud { player: "Ann", high_score: 0 });
        let mut out = Vec::new();
        let exit = FrameLoop::new(&GameConfig::default().frame)
            .run(
                &mut FakeClock::new(),
                &mut ScriptedKeys::new([]),
                &mut f,
                &mut out,
                &AtomicBool::new(false),
            )
            .unwrap();
        assert_eq!(exit, LoopExit::Finished);
        assert_eq!(f.game.snake().head(), Position::new(9, 2));
        let text = visible(&String::from_utf8_lossy(&out));
        assert!(text.contains("SNAKE GAME - Ann"));
    }

    #[test]
    fn keys_steer_the_snake() {
        let mut f = field(Hud { player: "Ann", high_score: 0 });
        f.on_key(Key::Up);
        f.on_key(Key::Other);
        assert_eq!(f.tick(), TickOutcome::Continue);
        assert_eq!(f.game.snake().head(), Position::new(5, 1));
    }

    #[test]
    fn quit_key_ends_the_round_early() {
        let mut f = field(Hud { player: "Ann", high_score: 0 });
        let mut out = Vec::new();
        let exit = FrameLoop::new(&GameConfig::default().frame)
            .run(
                &mut FakeClock::new(),
                &mut ScriptedKeys::new([Some(Key::Quit)]),
                &mut f,
                &mut out,
                &AtomicBool::new(false),
            )
            .unwrap();
        assert_eq!(exit, LoopExit::Quit);
        assert_eq!(f.game.over(), None);
    }

    #[test]
    fn wall_hit_records_the_score_before_the_collision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snake_scores.json");
        let mut store = ScoreStore::load(&path);

        let mut game = SnakeGame::with_state(
            Grid::new(30, 15),
            Snake::new(Position::new(27, 7)),
            Direction::Right,
            Some(Position::new(28, 7)),
            Pace::from(&GameConfig::default().snake),
            StdRng::seed_from_u64(5),
        );
        let mut before = game.score();
        while game.over().is_none() {
            before = game.score();
            game.step();
        }
        assert_eq!(game.over(), Some(GameOverCause::Wall));
        assert_eq!(game.snake().head(), Position::new(29, 7));
        assert!(before >= 10);

        let summary = finish_round(&mut store, &game, "Ann");
        assert_eq!(summary.score, before);
        assert_eq!(summary.rank, Some(1));
        assert!(summary.new_high);
        assert_eq!(store.top_score(), before);

        let reloaded = ScoreStore::load(&path);
        assert_eq!(reloaded.top_score(), before);
        assert_eq!(reloaded.board().entries()[0].name, "Ann");
    }

    #[test]
    fn lower_score_is_not_a_new_high() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ScoreStore::load(dir.path().join("snake_scores.json"));
        store.add_score("Bob", 500);

        let f = field(Hud { player: "Ann", high_score: 500 });
        let summary = finish_round(&mut store, &f.game, "Ann");
        assert_eq!(summary.score, 0);
        assert_eq!(summary.rank, Some(2));
        assert!(!summary.new_high);
    }
}
