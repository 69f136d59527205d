pub mod content;
pub mod progress;

pub use content::{ContentRepository, SurrealContentRepository, CONTENT_TABLES};
pub use progress::{ProgressRepository, SurrealProgressRepository};
