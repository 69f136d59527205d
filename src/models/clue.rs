use serde::{Deserialize, Serialize};

use crate::db::connection::GameDb;
use crate::models::{content_key, list_story_content, put_content};
use crate::EnigmaError;

/// Minimum level in one specialization category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SkillRequirement {
    pub category: String,
    pub level: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClueDiscoveryConditions {
    #[serde(default)]
    pub specialization_required: Option<SkillRequirement>,
    #[serde(default)]
    pub required_objects: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Clue {
    #[serde(default)]
    pub story_id: String,
    pub clue_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub clue_type: Option<String>,
    #[serde(default)]
    pub relevance: Option<u32>,
    #[serde(default)]
    pub is_key_evidence: bool,
    #[serde(default)]
    pub related_aspect: Option<String>,
    #[serde(default)]
    pub discovery_conditions: ClueDiscoveryConditions,
}

/// Write a clue document for its story.
pub async fn create_clue(db: &GameDb, data: Clue) -> Result<Clue, EnigmaError> {
    let key = content_key(&data.story_id, data.clue_id);
    put_content(db, "clue", key, data).await
}

/// All clues of a story ordered by clue id.
pub async fn list_clues(db: &GameDb, story_id: &str) -> Result<Vec<Clue>, EnigmaError> {
    list_story_content(db, "clue", "clue_id", story_id).await
}
