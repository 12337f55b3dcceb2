/// Gamepad input using gilrs, folded into the keyboard `Key` vocabulary.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Up / Down / Left / Right
///   Select                →  Quit

use std::collections::VecDeque;

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::ui::input::Key;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER" => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    held: bool,
    just_pressed: bool,
}

struct ActionMap {
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            quit: vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],

    dpad_up: BtnState,
    dpad_down: BtnState,
    dpad_left: BtnState,
    dpad_right: BtnState,

    stick_up: BtnState,
    stick_down: BtnState,
    stick_left: BtnState,
    stick_right: BtnState,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut state = GamepadState::disconnected();

        #[cfg(feature = "gamepad")]
        match Gilrs::new() {
            Ok(g) => {
                state.connected = g.gamepads().next().is_some();
                state.gilrs = Some(g);
            }
            Err(e) => {
                tracing::debug!(error = %e, "gamepad support unavailable");
            }
        }

        state
    }

    /// A pad that never reports input.
    pub fn disconnected() -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad_up: BtnState::default(),
            dpad_down: BtnState::default(),
            dpad_left: BtnState::default(),
            dpad_right: BtnState::default(),
            stick_up: BtnState::default(),
            stick_down: BtnState::default(),
            stick_left: BtnState::default(),
            stick_right: BtnState::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected: false,
        }
    }

    /// Load button mapping from config.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let qt = parse_list(&cfg.quit);
        if !qt.is_empty() { self.action_map.quit = qt; }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    /// Translate this frame's fresh presses into keys, quit first.
    pub fn drain_keys(&self, out: &mut VecDeque<Key>) {
        if self.any_just_pressed(&self.action_map.quit) {
            out.push_back(Key::Quit);
            return;
        }
        if self.dpad_up.just_pressed || self.stick_up.just_pressed {
            out.push_back(Key::Up);
        }
        if self.dpad_down.just_pressed || self.stick_down.just_pressed {
            out.push_back(Key::Down);
        }
        if self.dpad_left.just_pressed || self.stick_left.just_pressed {
            out.push_back(Key::Left);
        }
        if self.dpad_right.just_pressed || self.stick_right.just_pressed {
            out.push_back(Key::Right);
        }
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.update_axis(axis, value);
                }
                EventType::Connected => {
                    tracing::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    tracing::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        // Derive stick digital states
        let prev_left = self.stick_left.held;
        let prev_right = self.stick_right.held;
        let prev_up = self.stick_up.held;
        let prev_down = self.stick_down.held;

        self.stick_left.held = self.stick_x < -STICK_DEADZONE;
        self.stick_right.held = self.stick_x > STICK_DEADZONE;
        self.stick_up.held = self.stick_y > STICK_DEADZONE;
        self.stick_down.held = self.stick_y < -STICK_DEADZONE;

        if self.stick_left.held && !prev_left { self.stick_left.just_pressed = true; }
        if self.stick_right.held && !prev_right { self.stick_right.just_pressed = true; }
        if self.stick_up.held && !prev_up { self.stick_up.just_pressed = true; }
        if self.stick_down.held && !prev_down { self.stick_down.just_pressed = true; }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool, just_pressed: bool) {
        let dpad = match gilrs_btn {
            Button::DPadUp => Some(&mut self.dpad_up),
            Button::DPadDown => Some(&mut self.dpad_down),
            Button::DPadLeft => Some(&mut self.dpad_left),
            Button::DPadRight => Some(&mut self.dpad_right),
            _ => None,
        };
        if let Some(state) = dpad {
            state.held = held;
            if just_pressed { state.just_pressed = true; }
            return;
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            let idx = btn_index(btn);
            self.buttons[idx].held = held;
            if just_pressed {
                self.buttons[idx].just_pressed = true;
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::LeftStickX => self.stick_x = value,
            Axis::LeftStickY => self.stick_y = value,
            _ => {}
        }
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        for s in [
            &mut self.dpad_up, &mut self.dpad_down, &mut self.dpad_left, &mut self.dpad_right,
            &mut self.stick_up, &mut self.stick_down, &mut self.stick_left, &mut self.stick_right,
        ] {
            s.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in &mut self.buttons { *b = BtnState::default(); }
        for s in [
            &mut self.dpad_up, &mut self.dpad_down, &mut self.dpad_left, &mut self.dpad_right,
            &mut self.stick_up, &mut self.stick_down, &mut self.stick_left, &mut self.stick_right,
        ] {
            *s = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("select"), Some(Btn::Select));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("lb"), Some(Btn::L1));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn quit_press_beats_directions() {
        let mut pad = GamepadState::disconnected();
        pad.buttons[btn_index(Btn::Select)].just_pressed = true;
        pad.dpad_left.just_pressed = true;
        let mut out = VecDeque::new();
        pad.drain_keys(&mut out);
        assert_eq!(out, VecDeque::from([Key::Quit]));
    }

    #[test]
    fn config_remaps_quit() {
        let mut pad = GamepadState::disconnected();
        pad.load_button_config(&GamepadConfig { quit: vec!["B".into()] });
        pad.buttons[btn_index(Btn::B)].just_pressed = true;
        let mut out = VecDeque::new();
        pad.drain_keys(&mut out);
        assert_eq!(out.pop_front(), Some(Key::Quit));
    }

    #[test]
    fn start_button_emits_nothing() {
        let mut pad = GamepadState::disconnected();
        pad.load_button_config(&GamepadConfig { quit: vec!["Select".into()] });
        pad.buttons[btn_index(Btn::Start)].just_pressed = true;
        let mut out = VecDeque::new();
        pad.drain_keys(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn stick_and_dpad_map_to_directions() {
        let mut pad = GamepadState::disconnected();
        pad.stick_up.just_pressed = true;
        pad.dpad_right.just_pressed = true;
        let mut out = VecDeque::new();
        pad.drain_keys(&mut out);
        assert_eq!(out, VecDeque::from([Key::Up, Key::Right]));
    }
}
