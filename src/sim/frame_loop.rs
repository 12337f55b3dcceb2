/// Fixed-tick scheduler.
///
/// Input is sampled several times per loop iteration; state advances only
/// when a full tick interval has elapsed on a monotonic clock. The clock is
/// injected so tick timing can be tested without real sleeping.
///
/// Per iteration:
///   1. Stop if a quit/interrupt was seen last iteration
///   2. Poll keys `polls_per_frame` times with a short delay between polls
///   3. If `elapsed >= tick_interval`: tick once, reset the clock, redraw
///   4. Sleep a little to bound CPU use
///
/// A late iteration still produces a single tick: missed intervals are
/// dropped, never replayed as a burst.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::config::FrameConfig;
use crate::ui::input::{Key, KeySource};

/// What a tick asks of the loop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    Continue,
    Finished,
}

/// Why the loop returned.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LoopExit {
    /// The player pressed the quit key.
    Quit,
    /// A tick reported the activity is over.
    Finished,
    /// The process was asked to stop.
    Interrupted,
}

/// A full-screen real-time activity driven by `FrameLoop`.
pub trait Activity {
    fn start(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    /// A non-quit key arrived between ticks.
    fn on_key(&mut self, key: Key);

    fn tick(&mut self) -> TickOutcome;

    /// Read every iteration, so activities may change pace mid-run.
    fn tick_interval(&self) -> Duration;

    fn render(&mut self, out: &mut dyn Write) -> io::Result<()>;

    fn stop(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

/// Monotonic time source.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
    fn sleep(&mut self, d: Duration);
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { origin: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, d: Duration) {
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}

pub struct FrameLoop {
    polls_per_frame: u32,
    poll_delay: Duration,
    residual_sleep: Duration,
}

impl FrameLoop {
    pub fn new(cfg: &FrameConfig) -> Self {
        FrameLoop {
            polls_per_frame: cfg.polls_per_frame.max(1),
            poll_delay: cfg.poll_delay,
            residual_sleep: cfg.residual_sleep,
        }
    }

    pub fn run(
        &self,
        clock: &mut dyn Clock,
        keys: &mut dyn KeySource,
        activity: &mut dyn Activity,
        out: &mut dyn Write,
        interrupt: &AtomicBool,
    ) -> io::Result<LoopExit> {
        activity.start(out)?;
        activity.render(out)?;

        let mut last_tick = clock.now();
        let mut stop: Option<LoopExit> = None;

        let exit = loop {
            if let Some(why) = stop {
                break why;
            }
            if interrupt.load(Ordering::SeqCst) {
                break LoopExit::Interrupted;
            }

            for _ in 0..self.polls_per_frame {
                match keys.poll_key() {
                    Some(Key::Quit) => {
                        stop = Some(LoopExit::Quit);
                        break;
                    }
                    Some(k) => activity.on_key(k),
                    None => {}
                }
                clock.sleep(self.poll_delay);
            }
            if stop.is_some() {
                continue;
            }

            let now = clock.now();
            if now.saturating_sub(last_tick) >= activity.tick_interval() {
                let outcome = activity.tick();
                last_tick = now;
                activity.render(out)?;
                if outcome == TickOutcome::Finished {
                    stop = Some(LoopExit::Finished);
                    continue;
                }
            }

            clock.sleep(self.residual_sleep);
        };

        activity.stop(out)?;
        Ok(exit)
    }
}

/// Clock that only moves when slept on. `jump` simulates a stalled process.
#[cfg(test)]
pub struct FakeClock {
    now: Duration,
    pub jumps: Vec<(Duration, Duration)>,
}

#[cfg(test)]
impl FakeClock {
    pub fn new() -> Self {
        FakeClock { now: Duration::ZERO, jumps: vec![] }
    }
}

#[cfg(test)]
impl Clock for FakeClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, d: Duration) {
        self.now += d;
        // Apply any stall scheduled at or before the new time, once.
        if let Some(i) = self.jumps.iter().position(|(at, _)| *at <= self.now) {
            let (_, extra) = self.jumps.remove(i);
            self.now += extra;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::input::ScriptedKeys;

    /// Records tick times; finishes after `limit` ticks.
    struct Recorder {
        interval: Duration,
        limit: usize,
        ticks: Vec<Duration>,
        keys: Vec<Key>,
        clock_now: std::rc::Rc<std::cell::Cell<Duration>>,
        renders: usize,
    }

    impl Recorder {
        fn new(interval_ms: u64, limit: usize) -> Self {
            Recorder {
                interval: Duration::from_millis(interval_ms),
                limit,
                ticks: vec![],
                keys: vec![],
                clock_now: Default::default(),
                renders: 0,
            }
        }
    }

    impl Activity for Recorder {
        fn on_key(&mut self, key: Key) {
            self.keys.push(key);
        }

        fn tick(&mut self) -> TickOutcome {
            self.ticks.push(self.clock_now.get());
            if self.ticks.len() >= self.limit {
                TickOutcome::Finished
            } else {
                TickOutcome::Continue
            }
        }

        fn tick_interval(&self) -> Duration {
            self.interval
        }

        fn render(&mut self, _out: &mut dyn Write) -> io::Result<()> {
            self.renders += 1;
            Ok(())
        }
    }

    /// Wraps FakeClock so the activity can see the current time.
    struct SharedClock {
        inner: FakeClock,
        mirror: std::rc::Rc<std::cell::Cell<Duration>>,
    }

    impl Clock for SharedClock {
        fn now(&self) -> Duration {
            self.inner.now()
        }
        fn sleep(&mut self, d: Duration) {
            self.inner.sleep(d);
            self.mirror.set(self.inner.now());
        }
    }

    fn frame_cfg() -> FrameConfig {
        FrameConfig {
            polls_per_frame: 5,
            poll_delay: Duration::from_millis(2),
            residual_sleep: Duration::from_millis(10),
        }
    }

    fn run(rec: &mut Recorder, keys: &mut dyn KeySource, jumps: Vec<(Duration, Duration)>) -> LoopExit {
        let mut clock = SharedClock { inner: FakeClock::new(), mirror: rec.clock_now.clone() };
        clock.inner.jumps = jumps;
        let flag = AtomicBool::new(false);
        let mut sink = Vec::new();
        FrameLoop::new(&frame_cfg()).run(&mut clock, keys, rec, &mut sink, &flag).unwrap()
    }

    #[test]
    fn ticks_once_per_interval() {
        // Each iteration costs 5*2 + 10 = 20ms of fake time.
        let mut rec = Recorder::new(100, 3);
        let exit = run(&mut rec, &mut ScriptedKeys::new([]), vec![]);
        assert_eq!(exit, LoopExit::Finished);
        assert_eq!(rec.ticks.len(), 3);
        for pair in rec.ticks.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= Duration::from_millis(100), "gap {gap:?}");
            assert!(gap < Duration::from_millis(120), "gap {gap:?}");
        }
    }

    #[test]
    fn stall_produces_one_tick_not_a_burst() {
        // A 1s stall covers ten intervals but may only yield one tick.
        let mut rec = Recorder::new(100, 3);
        let stall = vec![(Duration::from_millis(30), Duration::from_secs(1))];
        run(&mut rec, &mut ScriptedKeys::new([]), stall);
        assert!(rec.ticks[0] >= Duration::from_secs(1));
        let gap = rec.ticks[1] - rec.ticks[0];
        assert!(gap >= Duration::from_millis(100), "burst tick after stall: {gap:?}");
    }

    #[test]
    fn quit_key_stops_before_next_tick() {
        let mut rec = Recorder::new(100, 10);
        let mut keys = ScriptedKeys::new([None, Some(Key::Left), Some(Key::Quit), Some(Key::Right)]);
        let exit = run(&mut rec, &mut keys, vec![]);
        assert_eq!(exit, LoopExit::Quit);
        assert!(rec.ticks.is_empty());
        // Keys after quit are never delivered.
        assert_eq!(rec.keys, vec![Key::Left]);
    }

    #[test]
    fn interrupt_flag_stops_loop() {
        let mut rec = Recorder::new(100, 10);
        let mut clock = FakeClock::new();
        let flag = AtomicBool::new(true);
        let mut sink = Vec::new();
        let exit = FrameLoop::new(&frame_cfg())
            .run(&mut clock, &mut ScriptedKeys::new([]), &mut rec, &mut sink, &flag)
            .unwrap();
        assert_eq!(exit, LoopExit::Interrupted);
        assert!(rec.ticks.is_empty());
        // Initial frame is still drawn.
        assert_eq!(rec.renders, 1);
    }

    #[test]
    fn every_tick_is_rendered() {
        let mut rec = Recorder::new(50, 4);
        run(&mut rec, &mut ScriptedKeys::new([]), vec![]);
        assert_eq!(rec.renders, 1 + 4);
    }
}
