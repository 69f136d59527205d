pub mod cli;
pub mod db;
pub mod error;
pub mod init;
pub mod llm;
pub mod models;
pub mod repository;
pub mod services;
pub mod session;
pub mod utils;

pub use error::EnigmaError;
