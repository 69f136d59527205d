use std::sync::Arc;

use async_trait::async_trait;

use crate::db::connection::GameDb;
use crate::models::dialogue::{
    create_dialogue_entry, delete_dialogue_for_session, get_dialogue_history,
};
use crate::models::session::{delete_session, get_session, list_sessions, save_session};
use crate::models::{DialogueEntry, DialogueEntryCreate, PlayerSession};
use crate::EnigmaError;

/// Repository trait for player sessions and their dialogue history.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn get_session(&self, session_id: &str) -> Result<Option<PlayerSession>, EnigmaError>;
    async fn save_session(&self, session: PlayerSession) -> Result<PlayerSession, EnigmaError>;
    async fn list_sessions(
        &self,
        story_id: Option<&str>,
    ) -> Result<Vec<PlayerSession>, EnigmaError>;
    /// Delete a session together with its dialogue history.
    async fn delete_session(&self, session_id: &str) -> Result<bool, EnigmaError>;

    async fn add_dialogue_entry(
        &self,
        entry: DialogueEntryCreate,
    ) -> Result<DialogueEntry, EnigmaError>;
    async fn dialogue_history(
        &self,
        session_id: &str,
        character_id: i64,
        limit: usize,
    ) -> Result<Vec<DialogueEntry>, EnigmaError>;
}

/// SurrealDB implementation of ProgressRepository.
pub struct SurrealProgressRepository {
    db: Arc<GameDb>,
}

impl SurrealProgressRepository {
    pub fn new(db: Arc<GameDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProgressRepository for SurrealProgressRepository {
    async fn get_session(&self, session_id: &str) -> Result<Option<PlayerSession>, EnigmaError> {
        get_session(&self.db, session_id).await
    }

    async fn save_session(&self, session: PlayerSession) -> Result<PlayerSession, EnigmaError> {
        save_session(&self.db, session).await
    }

    async fn list_sessions(
        &self,
        story_id: Option<&str>,
    ) -> Result<Vec<PlayerSession>, EnigmaError> {
        list_sessions(&self.db, story_id).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool, EnigmaError> {
        delete_dialogue_for_session(&self.db, session_id).await?;
        Ok(delete_session(&self.db, session_id).await?.is_some())
    }

    async fn add_dialogue_entry(
        &self,
        entry: DialogueEntryCreate,
    ) -> Result<DialogueEntry, EnigmaError> {
        create_dialogue_entry(&self.db, entry).await
    }

    async fn dialogue_history(
        &self,
        session_id: &str,
        character_id: i64,
        limit: usize,
    ) -> Result<Vec<DialogueEntry>, EnigmaError> {
        get_dialogue_history(&self.db, session_id, character_id, limit).await
    }
}
