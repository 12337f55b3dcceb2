pub mod gamepad;
pub mod input;
pub mod prompt;
pub mod rain_view;
pub mod snake_view;
pub mod style;
pub mod term;
