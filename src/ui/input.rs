/// Non-blocking key polling.
///
/// Every backend normalizes its raw input into the small `Key` vocabulary
/// the activities understand. Arrow keys and WASD both map to directions;
/// `q`, `Q` and Ctrl+C map to `Quit`. Without raw mode the same backend
/// still works, but the terminal hands keys over a line at a time.

use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::GamepadConfig;
use crate::domain::grid::Direction;
use crate::ui::gamepad::GamepadState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Quit,
    Other,
}

impl Key {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::Up => Some(Direction::Up),
            Key::Down => Some(Direction::Down),
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            Key::Quit | Key::Other => None,
        }
    }

    /// Normalize a crossterm key event. Release events carry no input.
    pub fn from_event(key: &KeyEvent) -> Option<Key> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('C') => Some(Key::Quit),
                _ => Some(Key::Other),
            };
        }
        let k = match key.code {
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Key::Up,
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Key::Down,
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Key::Left,
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Key::Right,
            KeyCode::Char('q') | KeyCode::Char('Q') => Key::Quit,
            _ => Key::Other,
        };
        Some(k)
    }
}

/// A source of normalized key presses. `poll_key` never blocks.
pub trait KeySource {
    fn poll_key(&mut self) -> Option<Key>;
}

/// Keyboard backend over crossterm's event queue, in either terminal mode.
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn poll_key(&mut self) -> Option<Key> {
        // Skip mouse/resize/focus events and undecodable input until a key
        // turns up or the queue is empty.
        while poll(Duration::ZERO) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if let Some(k) = Key::from_event(&key) {
                        return Some(k);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "dropping undecodable input");
                    return None;
                }
            }
        }
        None
    }
}

fn poll(timeout: Duration) -> bool {
    event::poll(timeout).unwrap_or(false)
}

/// How keystrokes reach `TerminalKeys`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyboardMode {
    /// Raw mode: every key arrives as it is pressed.
    Immediate,
    /// Cooked mode: keys are echoed and arrive after Enter.
    LineBuffered,
}

impl KeyboardMode {
    pub fn for_terminal(raw_mode: bool) -> Self {
        if raw_mode { KeyboardMode::Immediate } else { KeyboardMode::LineBuffered }
    }
}

/// Keyboard input merged with gamepad presses. Keyboard wins ties.
pub struct Keys {
    keyboard: Box<dyn KeySource>,
    pad: GamepadState,
    pending: VecDeque<Key>,
}

impl Keys {
    pub fn open(raw_mode: bool, pad_cfg: &GamepadConfig) -> Self {
        let mode = KeyboardMode::for_terminal(raw_mode);
        if mode == KeyboardMode::LineBuffered {
            tracing::info!("raw mode unavailable, keys arrive after Enter");
        }
        let mut pad = GamepadState::new();
        pad.load_button_config(pad_cfg);
        tracing::debug!(?mode, gamepad = pad.connected, "input opened");
        Keys::with_backend(Box::new(TerminalKeys), pad)
    }

    pub fn with_backend(keyboard: Box<dyn KeySource>, pad: GamepadState) -> Self {
        Keys { keyboard, pad, pending: VecDeque::with_capacity(4) }
    }

    /// Throw away buffered keystrokes so they don't leak into the next
    /// line prompt once cooked mode is back.
    pub fn discard_typeahead(&mut self) {
        while self.keyboard.poll_key().is_some() {}
        self.pending.clear();
    }
}

impl KeySource for Keys {
    fn poll_key(&mut self) -> Option<Key> {
        if let Some(k) = self.keyboard.poll_key() {
            return Some(k);
        }
        if self.pending.is_empty() {
            self.pad.update();
            self.pad.drain_keys(&mut self.pending);
        }
        self.pending.pop_front()
    }
}

/// Replays a fixed list of polls; `None` entries model "nothing pending".
#[cfg(test)]
pub struct ScriptedKeys {
    script: VecDeque<Option<Key>>,
}

#[cfg(test)]
impl ScriptedKeys {
    pub fn new(script: impl IntoIterator<Item = Option<Key>>) -> Self {
        ScriptedKeys { script: script.into_iter().collect() }
    }
}

#[cfg(test)]
impl KeySource for ScriptedKeys {
    fn poll_key(&mut self) -> Option<Key> {
        self.script.pop_front().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_agree() {
        let pairs = [
            (KeyCode::Up, KeyCode::Char('w'), Key::Up),
            (KeyCode::Down, KeyCode::Char('s'), Key::Down),
            (KeyCode::Left, KeyCode::Char('a'), Key::Left),
            (KeyCode::Right, KeyCode::Char('d'), Key::Right),
        ];
        for (arrow, letter, want) in pairs {
            assert_eq!(Key::from_event(&press(arrow)), Some(want));
            assert_eq!(Key::from_event(&press(letter)), Some(want));
        }
    }

    #[test]
    fn quit_keys() {
        assert_eq!(Key::from_event(&press(KeyCode::Char('q'))), Some(Key::Quit));
        assert_eq!(Key::from_event(&press(KeyCode::Char('Q'))), Some(Key::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Key::from_event(&ctrl_c), Some(Key::Quit));
    }

    #[test]
    fn unrecognized_keys_are_other() {
        assert_eq!(Key::from_event(&press(KeyCode::Char('x'))), Some(Key::Other));
        assert_eq!(Key::from_event(&press(KeyCode::Esc)), Some(Key::Other));
        assert_eq!(Key::Other.direction(), None);
    }

    #[test]
    fn release_events_are_dropped() {
        let mut ev = press(KeyCode::Up);
        ev.kind = KeyEventKind::Release;
        assert_eq!(Key::from_event(&ev), None);
    }

    #[test]
    fn keyboard_stays_on_without_raw_mode() {
        assert_eq!(KeyboardMode::for_terminal(true), KeyboardMode::Immediate);
        assert_eq!(KeyboardMode::for_terminal(false), KeyboardMode::LineBuffered);
    }

    #[test]
    fn line_buffered_input_still_steers_and_quits() {
        // A cooked terminal delivers "dq\n" in one burst after Enter.
        let line = [KeyCode::Char('d'), KeyCode::Char('q'), KeyCode::Enter];
        let keys: Vec<_> = line.into_iter().filter_map(|c| Key::from_event(&press(c))).collect();
        assert_eq!(keys, [Key::Right, Key::Quit, Key::Other]);
    }

    #[test]
    fn merged_source_prefers_keyboard() {
        let kb = ScriptedKeys::new([Some(Key::Left), None]);
        let mut keys = Keys::with_backend(Box::new(kb), GamepadState::disconnected());
        assert_eq!(keys.poll_key(), Some(Key::Left));
        assert_eq!(keys.poll_key(), None);
    }

    #[test]
    fn typeahead_is_discarded() {
        let kb = ScriptedKeys::new([Some(Key::Up), Some(Key::Down)]);
        let mut keys = Keys::with_backend(Box::new(kb), GamepadState::disconnected());
        keys.discard_typeahead();
        assert_eq!(keys.poll_key(), None);
    }
}
