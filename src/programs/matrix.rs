/// Matrix rain: full-screen falling glyphs until Q.

use std::io::{self, BufWriter, Write};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{GameConfig, RainConfig};
use crate::programs::{Context, Program};
use crate::sim::frame_loop::{Activity, FrameLoop, SystemClock, TickOutcome};
use crate::sim::rain::Rain;
use crate::ui::input::{Key, Keys};
use crate::ui::rain_view;
use crate::ui::term::{self, RawMode};

const INTRO_PAUSE: Duration = Duration::from_secs(1);

pub fn build(config: &GameConfig) -> Box<dyn Program> {
    Box::new(MatrixProgram { cfg: config.clone() })
}

pub struct MatrixProgram {
    cfg: GameConfig,
}

impl Program for MatrixProgram {
    fn run(&mut self, ctx: &Context) -> anyhow::Result<()> {
        let ansi = term::supports_ansi();
        let (cols, rows) = term::detect_size();
        tracing::info!(cols, rows, "matrix starting");

        {
            let mut out = io::stdout();
            if ansi {
                term::clear_screen(&mut out)?;
            }
            write!(out, "{}\r\n", rain_view::intro(cols, rows))?;
            out.flush()?;
        }
        let until = Instant::now() + INTRO_PAUSE;
        while Instant::now() < until && !ctx.interrupted() {
            std::thread::sleep(Duration::from_millis(20));
        }

        let mut raw = RawMode::acquire_or_degrade();
        let mut keys = Keys::open(raw.is_active(), &self.cfg.gamepad);
        let mut activity = RainActivity::new(&self.cfg.rain, term::detect_size, ansi);

        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        let result = FrameLoop::new(&self.cfg.frame).run(
            &mut SystemClock::new(),
            &mut keys,
            &mut activity,
            &mut out,
            &ctx.interrupt,
        );
        keys.discard_typeahead();
        if let Err(e) = out.flush() {
            tracing::debug!(error = %e, "final frame flush failed");
        }
        drop(out);
        raw.exit();

        let exit = result.context("matrix rain I/O failed")?;
        tracing::info!(?exit, "matrix stopped");
        Ok(())
    }
}

struct RainActivity {
    rain: Rain,
    tick: Duration,
    size: fn() -> (u16, u16),
    ansi: bool,
}

impl RainActivity {
    fn new(cfg: &RainConfig, size: fn() -> (u16, u16), ansi: bool) -> Self {
        let (cols, rows) = rain_area(size());
        RainActivity {
            rain: Rain::new(cols, rows, cfg.clone(), StdRng::from_entropy()),
            tick: cfg.tick,
            size,
            ansi,
        }
    }
}

/// The bottom terminal row stays empty so the last line never scrolls.
fn rain_area((cols, rows): (u16, u16)) -> (usize, usize) {
    (cols.max(1) as usize, (rows as usize).saturating_sub(1).max(1))
}

impl Activity for RainActivity {
    fn start(&mut self, mut out: &mut dyn Write) -> io::Result<()> {
        if self.ansi {
            term::clear_screen(&mut out)?;
            term::hide_cursor(&mut out)?;
        }
        Ok(())
    }

    fn on_key(&mut self, _key: Key) {}

    fn tick(&mut self) -> TickOutcome {
        let (cols, rows) = rain_area((self.size)());
        if (cols, rows) != (self.rain.cols(), self.rain.rows()) {
            tracing::debug!(cols, rows, "terminal resized");
            self.rain.resize(cols, rows);
        }
        self.rain.tick();
        TickOutcome::Continue
    }

    fn tick_interval(&self) -> Duration {
        self.tick
    }

    fn render(&mut self, mut out: &mut dyn Write) -> io::Result<()> {
        let frame = rain_view::compose(&mut self.rain);
        term::present(&mut out, &frame, self.ansi)
    }

    fn stop(&mut self, mut out: &mut dyn Write) -> io::Result<()> {
        if self.ansi {
            term::clear_screen(&mut out)?;
            term::show_cursor(&mut out)?;
        }
        write!(out, "{}\r\n", rain_view::OUTRO)?;
        out.flush()
    }
}
