use serde::{Deserialize, Serialize};
use surrealdb::{Datetime, RecordId};

use crate::db::connection::GameDb;
use crate::EnigmaError;

/// One exchange between the player and a character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueEntry {
    pub id: RecordId,
    pub session_id: String,
    pub character_id: i64,
    /// Empty for greetings and system notes.
    pub player_statement: String,
    pub character_response: String,
    #[serde(default)]
    pub detected_keywords: Vec<String>,
    pub character_level: u32,
    pub created_at: Datetime,
}

#[derive(Debug, Clone, Serialize)]
pub struct DialogueEntryCreate {
    pub session_id: String,
    pub character_id: i64,
    pub player_statement: String,
    pub character_response: String,
    pub detected_keywords: Vec<String>,
    pub character_level: u32,
}

pub async fn create_dialogue_entry(
    db: &GameDb,
    data: DialogueEntryCreate,
) -> Result<DialogueEntry, EnigmaError> {
    let result: Option<DialogueEntry> = db.create("dialogue_entry").content(data).await?;
    result.ok_or_else(|| EnigmaError::Database("Failed to create dialogue entry".into()))
}

/// The most recent `limit` entries of a conversation, oldest first.
pub async fn get_dialogue_history(
    db: &GameDb,
    session_id: &str,
    character_id: i64,
    limit: usize,
) -> Result<Vec<DialogueEntry>, EnigmaError> {
    let mut result = db
        .query(
            "SELECT * FROM dialogue_entry \
             WHERE session_id = $session AND character_id = $character \
             ORDER BY created_at DESC LIMIT $limit",
        )
        .bind(("session", session_id.to_string()))
        .bind(("character", character_id))
        .bind(("limit", limit))
        .await?;
    let mut entries: Vec<DialogueEntry> = result.take(0)?;
    entries.reverse();
    Ok(entries)
}

/// Remove every dialogue entry of a session.
pub async fn delete_dialogue_for_session(db: &GameDb, session_id: &str) -> Result<(), EnigmaError> {
    db.query("DELETE dialogue_entry WHERE session_id = $session")
        .bind(("session", session_id.to_string()))
        .await?
        .check()?;
    Ok(())
}
