use thiserror::Error;

/// Everything the library can fail with. Game refusals (a locked door, a
/// missing key) are not errors; they come back as unsuccessful outcomes.
#[derive(Debug, Error)]
pub enum EnigmaError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },

    /// Bad story id, bad command argument, malformed upload.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The story id is taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A story content file could not be read or parsed.
    #[error("Content error in {path}: {message}")]
    Content { path: String, message: String },

    /// A text-generation provider failed or answered with something unusable.
    #[error("LLM provider '{provider}' failed: {message}")]
    Llm { provider: String, message: String },

    /// A schema or query statement was rejected.
    #[error("Query error: {message}")]
    Query {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl EnigmaError {
    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        EnigmaError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<surrealdb::Error> for EnigmaError {
    fn from(err: surrealdb::Error) -> Self {
        EnigmaError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for EnigmaError {
    fn from(err: serde_json::Error) -> Self {
        EnigmaError::Database(format!("JSON: {err}"))
    }
}

impl From<std::io::Error> for EnigmaError {
    fn from(err: std::io::Error) -> Self {
        EnigmaError::Database(format!("I/O: {err}"))
    }
}

impl From<reqwest::Error> for EnigmaError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        EnigmaError::Llm {
            provider: err
                .url()
                .and_then(|u| u.host_str().map(String::from))
                .unwrap_or_else(|| "http".to_string()),
            message,
        }
    }
}
