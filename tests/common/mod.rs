#![allow(dead_code)]

pub mod builders;
pub mod harness;

// Re-export commonly used test utilities
pub use harness::{start_manor_game, upload_story, TestHarness};
