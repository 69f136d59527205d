//! CLI command handlers.

pub mod game;
pub mod play;
pub mod story;
