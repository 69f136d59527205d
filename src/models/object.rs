use serde::{Deserialize, Serialize};

use crate::db::connection::GameDb;
use crate::models::{content_key, list_story_content, put_content};
use crate::EnigmaError;

/// What the player learns about an object at one level of scrutiny.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObjectLevel {
    pub level_number: u32,
    #[serde(default)]
    pub level_description: String,
    #[serde(default)]
    pub level_attributes: Option<serde_json::Value>,
    #[serde(default)]
    pub evolution_trigger: Option<String>,
    #[serde(default)]
    pub related_clue_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GameObject {
    #[serde(default)]
    pub story_id: String,
    pub object_id: i64,
    pub name: String,
    #[serde(default)]
    pub base_description: String,
    #[serde(default)]
    pub is_collectible: bool,
    #[serde(default)]
    pub initial_location_id: Option<i64>,
    #[serde(default)]
    pub initial_area_id: Option<i64>,
    #[serde(default)]
    pub discovery_condition: Option<String>,
    #[serde(default)]
    pub levels: Vec<ObjectLevel>,
}

impl GameObject {
    pub fn level(&self, level_number: u32) -> Option<&ObjectLevel> {
        self.levels.iter().find(|l| l.level_number == level_number)
    }

    /// Description the player sees at a knowledge level, falling back to the base text.
    pub fn description_at(&self, level_number: u32) -> &str {
        self.level(level_number)
            .map(|l| l.level_description.as_str())
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.base_description)
    }

    /// Next level reachable from `current`, if the trigger allows it.
    ///
    /// A level without an evolution trigger opens on any examination; one with
    /// a trigger opens only when the same trigger is supplied.
    pub fn next_level(&self, current: u32, trigger: Option<&str>) -> Option<&ObjectLevel> {
        let next = self.level(current + 1)?;
        match next.evolution_trigger.as_deref() {
            None | Some("") => Some(next),
            Some(required) if trigger.is_some_and(|t| t.eq_ignore_ascii_case(required)) => {
                Some(next)
            }
            Some(_) => None,
        }
    }

    /// Placed in the given location/area.
    pub fn is_placed_in(&self, location_id: i64, area_id: Option<i64>) -> bool {
        match (self.initial_area_id, area_id) {
            (Some(own), Some(current)) => own == current,
            (Some(_), None) => false,
            (None, _) => self.initial_location_id == Some(location_id),
        }
    }
}

/// Write an object document for its story.
pub async fn create_object(db: &GameDb, data: GameObject) -> Result<GameObject, EnigmaError> {
    let key = content_key(&data.story_id, data.object_id);
    put_content(db, "game_object", key, data).await
}

/// All objects of a story ordered by object id.
pub async fn list_objects(db: &GameDb, story_id: &str) -> Result<Vec<GameObject>, EnigmaError> {
    list_story_content(db, "game_object", "object_id", story_id).await
}
