pub mod config;
pub mod sanitize;

pub use config::read_toml_file;
pub use sanitize::{slugify, validate_story_id};
