pub mod frame_loop;
pub mod rain;
pub mod scores;
pub mod session;
pub mod snake_game;
