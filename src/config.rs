/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub snake: SnakeConfig,
    pub frame: FrameConfig,
    pub rain: RainConfig,
    pub gamepad: GamepadConfig,
    pub scores_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: String,
}

#[derive(Clone, Debug)]
pub struct SnakeConfig {
    pub width: i32,
    pub height: i32,
    pub tick: Duration,
    pub tick_decrement: Duration,
    pub tick_floor: Duration,
}

#[derive(Clone, Debug)]
pub struct FrameConfig {
    pub polls_per_frame: u32,
    pub poll_delay: Duration,
    pub residual_sleep: Duration,
}

#[derive(Clone, Debug)]
pub struct RainConfig {
    pub tick: Duration,
    pub trail_len: i32,
    pub head_len: i32,
    pub fall_prob_min: f64,
    pub fall_prob_max: f64,
    pub max_start_offset: i32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    snake: TomlSnake,
    #[serde(default)]
    frame: TomlFrame,
    #[serde(default)]
    rain: TomlRain,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSnake {
    #[serde(default = "default_width")]
    width: i32,
    #[serde(default = "default_height")]
    height: i32,
    #[serde(default = "default_tick_secs")]
    tick_secs: f64,
    #[serde(default = "default_tick_decrement")]
    tick_decrement_secs: f64,
    #[serde(default = "default_tick_floor")]
    tick_floor_secs: f64,
}

#[derive(Deserialize, Debug)]
struct TomlFrame {
    #[serde(default = "default_polls")]
    polls_per_frame: u32,
    #[serde(default = "default_poll_delay")]
    poll_delay_ms: u64,
    #[serde(default = "default_residual_sleep")]
    residual_sleep_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlRain {
    #[serde(default = "default_rain_tick")]
    tick_ms: u64,
    #[serde(default = "default_trail_len")]
    trail_len: i32,
    #[serde(default = "default_head_len")]
    head_len: i32,
    #[serde(default = "default_prob_min")]
    fall_prob_min: f64,
    #[serde(default = "default_prob_max")]
    fall_prob_max: f64,
    #[serde(default = "default_start_offset")]
    max_start_offset: i32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_scores_path")]
    scores_path: String,
    #[serde(default = "default_log_path")]
    log_path: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_width() -> i32 { 30 }
fn default_height() -> i32 { 15 }
fn default_tick_secs() -> f64 { 0.25 }
fn default_tick_decrement() -> f64 { 0.003 }
fn default_tick_floor() -> f64 { 0.1 }

fn default_polls() -> u32 { 5 }
fn default_poll_delay() -> u64 { 2 }
fn default_residual_sleep() -> u64 { 10 }

fn default_rain_tick() -> u64 { 50 }
fn default_trail_len() -> i32 { 10 }
fn default_head_len() -> i32 { 1 }
fn default_prob_min() -> f64 { 0.95 }
fn default_prob_max() -> f64 { 0.99 }
fn default_start_offset() -> i32 { 5 }

fn default_quit() -> Vec<String> { vec!["Select".into()] }

fn default_scores_path() -> String { "data/snake_scores.json".into() }
fn default_log_path() -> String { "data/termarcade.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlSnake {
    fn default() -> Self {
        TomlSnake {
            width: default_width(),
            height: default_height(),
            tick_secs: default_tick_secs(),
            tick_decrement_secs: default_tick_decrement(),
            tick_floor_secs: default_tick_floor(),
        }
    }
}

impl Default for TomlFrame {
    fn default() -> Self {
        TomlFrame {
            polls_per_frame: default_polls(),
            poll_delay_ms: default_poll_delay(),
            residual_sleep_ms: default_residual_sleep(),
        }
    }
}

impl Default for TomlRain {
    fn default() -> Self {
        TomlRain {
            tick_ms: default_rain_tick(),
            trail_len: default_trail_len(),
            head_len: default_head_len(),
            fall_prob_min: default_prob_min(),
            fall_prob_max: default_prob_max(),
            max_start_offset: default_start_offset(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            scores_path: default_scores_path(),
            log_path: default_log_path(),
            log_level: default_log_level(),
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        GameConfig::load_from(&candidate_dirs())
    }

    /// First `config.toml` found in `search_dirs` wins.
    fn load_from(search_dirs: &[PathBuf]) -> Self {
        let Some(path) = search_dirs
            .iter()
            .map(|d| d.join("config.toml"))
            .find(|p| p.exists())
        else {
            return GameConfig::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => GameConfig::parse(&text),
            Err(e) => {
                eprintln!("Warning: could not read {}: {e}", path.display());
                GameConfig::default()
            }
        }
    }

    /// Parse a config document. Any parse error yields the defaults.
    fn parse(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => GameConfig::from_toml(cfg),
            Err(e) => {
                eprintln!("Warning: config.toml parse error: {e}");
                eprintln!("Using default settings.");
                GameConfig::default()
            }
        }
    }

    fn from_toml(t: TomlConfig) -> Self {
        let floor = secs(t.snake.tick_floor_secs, default_tick_floor());
        let tick = secs(t.snake.tick_secs, default_tick_secs()).max(floor);

        // Keep the fall-probability band inside (0, 1] and ordered.
        let pmin = clamp_prob(t.rain.fall_prob_min, default_prob_min());
        let pmax = clamp_prob(t.rain.fall_prob_max, default_prob_max());
        let (pmin, pmax) = if pmin <= pmax { (pmin, pmax) } else { (pmax, pmin) };

        GameConfig {
            snake: SnakeConfig {
                width: t.snake.width.max(4),
                height: t.snake.height.max(4),
                tick,
                tick_decrement: secs_or_zero(t.snake.tick_decrement_secs),
                tick_floor: floor,
            },
            frame: FrameConfig {
                polls_per_frame: t.frame.polls_per_frame.max(1),
                poll_delay: Duration::from_millis(t.frame.poll_delay_ms),
                residual_sleep: Duration::from_millis(t.frame.residual_sleep_ms),
            },
            rain: RainConfig {
                tick: Duration::from_millis(t.rain.tick_ms.max(1)),
                trail_len: t.rain.trail_len.max(1),
                head_len: t.rain.head_len.clamp(1, t.rain.trail_len.max(1)),
                fall_prob_min: pmin,
                fall_prob_max: pmax,
                max_start_offset: t.rain.max_start_offset.max(0),
            },
            gamepad: GamepadConfig {
                quit: t.gamepad.quit,
            },
            scores_path: PathBuf::from(t.general.scores_path),
            log_path: PathBuf::from(t.general.log_path),
            log_level: t.general.log_level,
        }
    }
}

/// Longest accepted tick; anything above is treated as a typo.
const MAX_SECS: f64 = 60.0;

fn secs(v: f64, fallback: f64) -> Duration {
    let v = if v > 0.0 && v <= MAX_SECS { v } else { fallback };
    Duration::try_from_secs_f64(v).unwrap_or(Duration::ZERO)
}

fn secs_or_zero(v: f64) -> Duration {
    secs(v, 0.0)
}

fn clamp_prob(v: f64, fallback: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v.min(1.0) } else { fallback }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = GameConfig::parse("");
        assert_eq!(cfg.snake.width, 30);
        assert_eq!(cfg.snake.height, 15);
        assert_eq!(cfg.snake.tick, Duration::from_millis(250));
        assert_eq!(cfg.snake.tick_floor, Duration::from_millis(100));
        assert_eq!(cfg.frame.polls_per_frame, 5);
        assert_eq!(cfg.scores_path, PathBuf::from("data/snake_scores.json"));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = GameConfig::parse("[snake]\nwidth = 40\n");
        assert_eq!(cfg.snake.width, 40);
        assert_eq!(cfg.snake.height, 15);
        assert_eq!(cfg.rain.trail_len, 10);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let cfg = GameConfig::parse("this is [not toml");
        assert_eq!(cfg.snake.width, 30);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = GameConfig::parse(
            "[snake]\nwidth = 1\ntick_secs = 0.05\ntick_floor_secs = 0.2\n\
             [rain]\nfall_prob_min = 0.99\nfall_prob_max = 0.5\n",
        );
        assert_eq!(cfg.snake.width, 4);
        // Starting interval never sits below the floor.
        assert_eq!(cfg.snake.tick, Duration::from_millis(200));
        assert!(cfg.rain.fall_prob_min <= cfg.rain.fall_prob_max);
        assert_eq!(cfg.rain.fall_prob_max, 0.99);
    }

    #[test]
    fn huge_or_odd_durations_fall_back() {
        let cfg = GameConfig::parse(
            "[snake]\ntick_secs = 1e30\ntick_decrement_secs = 1e300\ntick_floor_secs = -3.0\n\
             [rain]\ntick_ms = 0\n",
        );
        assert_eq!(cfg.snake.tick, Duration::from_millis(250));
        assert_eq!(cfg.snake.tick_decrement, Duration::ZERO);
        assert_eq!(cfg.snake.tick_floor, Duration::from_millis(100));
        assert_eq!(cfg.rain.tick, Duration::from_millis(1));
    }

    #[test]
    fn first_config_on_the_search_path_wins() {
        let exe_dir = tempfile::tempdir().unwrap();
        let cwd = tempfile::tempdir().unwrap();
        std::fs::write(cwd.path().join("config.toml"), "[snake]\nwidth = 50\n").unwrap();

        let dirs = [exe_dir.path().to_path_buf(), cwd.path().to_path_buf()];
        assert_eq!(GameConfig::load_from(&dirs).snake.width, 50);

        std::fs::write(exe_dir.path().join("config.toml"), "[snake]\nwidth = 20\n").unwrap();
        assert_eq!(GameConfig::load_from(&dirs).snake.width, 20);
    }

    #[test]
    fn no_config_anywhere_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = GameConfig::load_from(&[dir.path().to_path_buf()]);
        assert_eq!(cfg.snake.width, 30);
        assert_eq!(cfg.gamepad.quit, vec!["Select".to_string()]);
    }
}
