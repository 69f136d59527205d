use crate::db::connection::GameDb;
use crate::EnigmaError;

/// Story content tables (story, location, character, game_object, clue, qr_code, prompt_template)
const SCHEMA_001: &str = include_str!("migrations/001_content.surql");

/// Player progress tables (player_session, dialogue_entry)
const SCHEMA_002: &str = include_str!("migrations/002_progress.surql");

/// Apply the database schema to an initialized database connection.
///
/// Every statement uses `IF NOT EXISTS`, so it's safe to call on each start.
///
/// # Example
///
/// ```no_run
/// # use enigma_hunter::db::{connection::{init_db, DbConfig}, schema::apply_schema};
/// # use std::path::Path;
/// # async fn example() -> Result<(), enigma_hunter::EnigmaError> {
/// let config = DbConfig::Embedded { path: Some("./data/game.db".into()) };
/// let db = init_db(&config, Path::new("./data")).await?;
/// apply_schema(&db).await?;
/// # Ok(())
/// # }
/// ```
pub async fn apply_schema(db: &GameDb) -> Result<(), EnigmaError> {
    for (name, schema) in [("001_content", SCHEMA_001), ("002_progress", SCHEMA_002)] {
        let applied = match db.query(schema).await {
            Ok(response) => response.check().map(|_| ()),
            Err(e) => Err(e),
        };
        applied.map_err(|e| EnigmaError::Query {
            message: format!("schema {name} failed"),
            source: Some(Box::new(e)),
        })?;
    }
    Ok(())
}
