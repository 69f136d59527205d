use serde::{Deserialize, Deserializer, Serialize};

use crate::db::connection::GameDb;
use crate::models::{content_key, list_story_content, put_content};
use crate::EnigmaError;

/// Kind of proof a trigger asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementType {
    #[default]
    Object,
    Knowledge,
}

/// Authors write object references as an int, a numeric string, or a list
/// of candidates. A list keeps its first element.
#[derive(Deserialize)]
#[serde(untagged)]
enum ObjectRef {
    Id(i64),
    Text(String),
    List(Vec<ObjectRef>),
}

impl ObjectRef {
    fn into_id(self) -> Option<i64> {
        match self {
            ObjectRef::Id(id) => Some(id),
            ObjectRef::Text(text) => text.trim().parse().ok(),
            ObjectRef::List(items) => items.into_iter().next().and_then(ObjectRef::into_id),
        }
    }
}

fn deserialize_object_ref<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<ObjectRef>::deserialize(deserializer)?;
    Ok(raw.and_then(ObjectRef::into_id))
}

/// One condition a player must satisfy to get past a trigger challenge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TriggerRequirement {
    #[serde(default)]
    pub requirement_type: RequirementType,
    #[serde(default, deserialize_with = "deserialize_object_ref")]
    pub required_object_id: Option<i64>,
    #[serde(default)]
    pub required_knowledge: Option<String>,
    #[serde(default)]
    pub verification_method: Option<String>,
    #[serde(default)]
    pub hint_if_incorrect: Option<String>,
    #[serde(default)]
    pub minimum_presentation_level: u32,
}

/// Keyword that puts a character on the defensive and opens a challenge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EvolutionTrigger {
    pub trigger_keyword: String,
    #[serde(default)]
    pub contextual_condition: Option<String>,
    #[serde(default)]
    pub defensive_response: Option<String>,
    #[serde(default)]
    pub challenge_question: Option<String>,
    #[serde(default)]
    pub success_response: String,
    #[serde(default)]
    pub fail_response: String,
    #[serde(default)]
    pub multi_step_verification: bool,
    #[serde(default)]
    pub requirements: Vec<TriggerRequirement>,
}

/// What a character knows and how they behave at one relationship stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CharacterLevel {
    pub level_number: u32,
    #[serde(default)]
    pub knowledge_scope: String,
    #[serde(default)]
    pub narrative_stance: String,
    #[serde(default)]
    pub is_defensive: bool,
    #[serde(default)]
    pub dialogue_parameters: Option<serde_json::Value>,
    #[serde(default)]
    pub ia_instruction_set: Option<String>,
    #[serde(default)]
    pub triggers: Vec<EvolutionTrigger>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Character {
    #[serde(default)]
    pub story_id: String,
    pub character_id: i64,
    pub name: String,
    #[serde(default)]
    pub base_description: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub appearance: String,
    #[serde(default)]
    pub is_culprit: bool,
    #[serde(default)]
    pub motive: Option<String>,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub area_id: Option<i64>,
    #[serde(default)]
    pub location_schedule: Option<serde_json::Value>,
    #[serde(default)]
    pub levels: Vec<CharacterLevel>,
}

impl Character {
    /// Level data for a session level, clamped to the last authored level.
    ///
    /// Levels are addressed by position, matching how stages are authored
    /// in ascending order starting at 0.
    pub fn level_data(&self, level: u32) -> Option<(u32, &CharacterLevel)> {
        if self.levels.is_empty() {
            return None;
        }
        let max = (self.levels.len() - 1) as u32;
        let clamped = level.min(max);
        self.levels
            .get(clamped as usize)
            .map(|data| (clamped, data))
    }

    /// Present in the given location/area.
    ///
    /// A character pinned to an area is only met there; one pinned only to a
    /// location is met anywhere inside it.
    pub fn is_present(&self, location_id: i64, area_id: Option<i64>) -> bool {
        match (self.area_id, area_id) {
            (Some(own), Some(current)) => own == current,
            (Some(_), None) => false,
            (None, _) => self.location_id == Some(location_id),
        }
    }
}

/// Write a character document for its story.
pub async fn create_character(db: &GameDb, data: Character) -> Result<Character, EnigmaError> {
    let key = content_key(&data.story_id, data.character_id);
    put_content(db, "character", key, data).await
}

/// All characters of a story ordered by character id.
pub async fn list_characters(db: &GameDb, story_id: &str) -> Result<Vec<Character>, EnigmaError> {
    list_story_content(db, "character", "character_id", story_id).await
}
