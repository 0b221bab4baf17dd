pub mod backend_scratch_game;
pub mod backend_wheel_game;
