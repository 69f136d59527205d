pub mod character;
pub mod clue;
pub mod dialogue;
pub mod location;
pub mod object;
pub mod prompt;
pub mod qrcode;
pub mod session;
pub mod specialization;
pub mod story;

pub use character::{
    Character, CharacterLevel, EvolutionTrigger, RequirementType, TriggerRequirement,
};
pub use clue::{Clue, ClueDiscoveryConditions, SkillRequirement};
pub use dialogue::{DialogueEntry, DialogueEntryCreate};
pub use location::{Area, AreaDetail, Location};
pub use object::{GameObject, ObjectLevel};
pub use prompt::PromptTemplate;
pub use qrcode::{AccessRequirements, QrAction, QrCode};
pub use session::{
    ActionRecord, GameStatus, PendingChallenge, PlayerSession, SolutionAttempt, TriggerRef,
};
pub use specialization::{InteractionRequirement, SpecializationCategory, SpecializationConfig};
pub use story::{SolutionCriteria, Story, StoryContent, StoryHeader};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::connection::GameDb;
use crate::EnigmaError;

/// Record key for a story-scoped document: `{story_id}_{local_id}`.
pub fn content_key(story_id: &str, local_id: impl std::fmt::Display) -> String {
    format!("{story_id}_{local_id}")
}

/// Write a story-scoped document under a deterministic key.
///
/// Uses `upsert` so re-uploading a story with `replace` overwrites in place.
pub(crate) async fn put_content<T>(
    db: &GameDb,
    table: &'static str,
    key: String,
    data: T,
) -> Result<T, EnigmaError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let result: Option<T> = db.upsert((table, key.as_str())).content(data).await?;
    result.ok_or_else(|| EnigmaError::Database(format!("Failed to write {table}:{key}")))
}

/// List every document of a story in a table, ordered by its local id field.
pub(crate) async fn list_story_content<T>(
    db: &GameDb,
    table: &'static str,
    order_field: &'static str,
    story_id: &str,
) -> Result<Vec<T>, EnigmaError>
where
    T: DeserializeOwned,
{
    let query = format!("SELECT * FROM {table} WHERE story_id = $story ORDER BY {order_field} ASC");
    let mut result = db
        .query(query)
        .bind(("story", story_id.to_string()))
        .await?;
    let items: Vec<T> = result.take(0)?;
    Ok(items)
}

/// Count the documents of a story in a table.
pub(crate) async fn count_story_content(
    db: &GameDb,
    table: &'static str,
    story_id: &str,
) -> Result<usize, EnigmaError> {
    let query = format!("SELECT count() AS total FROM {table} WHERE story_id = $story GROUP ALL");
    let mut result = db
        .query(query)
        .bind(("story", story_id.to_string()))
        .await?;
    let total: Option<usize> = result.take("total")?;
    Ok(total.unwrap_or(0))
}

/// Delete every document of a story in a table.
pub(crate) async fn delete_story_content(
    db: &GameDb,
    table: &'static str,
    story_id: &str,
) -> Result<(), EnigmaError> {
    let query = format!("DELETE {table} WHERE story_id = $story");
    db.query(query)
        .bind(("story", story_id.to_string()))
        .await?
        .check()?;
    Ok(())
}
