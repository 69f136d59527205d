use serde::{Deserialize, Serialize};

use crate::db::connection::GameDb;
use crate::models::{content_key, list_story_content, put_content};
use crate::EnigmaError;

fn default_true() -> bool {
    true
}

/// A point of interest inside an area, revealed by exploration level.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AreaDetail {
    pub detail_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discovery_level_required: u32,
    #[serde(default)]
    pub has_clue: bool,
    #[serde(default)]
    pub clue_id: Option<i64>,
}

/// A sub-space of a location the player can move into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Area {
    pub area_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub initially_visible: bool,
    #[serde(default)]
    pub connected_areas: Vec<i64>,
    #[serde(default)]
    pub discovery_level_required: u32,
    #[serde(default)]
    pub details: Vec<AreaDetail>,
}

impl Area {
    /// Visible at the given location exploration level.
    pub fn is_visible_at(&self, level: u32) -> bool {
        self.initially_visible && self.discovery_level_required <= level
    }
}

/// Location with its areas, stored as one document per location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    #[serde(default)]
    pub story_id: String,
    pub location_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub unlock_condition: Option<String>,
    #[serde(default)]
    pub navigation_map: Option<serde_json::Value>,
    #[serde(default)]
    pub is_starting_location: bool,
    #[serde(default)]
    pub areas: Vec<Area>,
}

impl Location {
    pub fn area(&self, area_id: i64) -> Option<&Area> {
        self.areas.iter().find(|a| a.area_id == area_id)
    }
}

/// Write a location document for its story.
pub async fn create_location(db: &GameDb, data: Location) -> Result<Location, EnigmaError> {
    let key = content_key(&data.story_id, data.location_id);
    put_content(db, "location", key, data).await
}

/// All locations of a story ordered by location id.
pub async fn list_locations(db: &GameDb, story_id: &str) -> Result<Vec<Location>, EnigmaError> {
    list_story_content(db, "location", "location_id", story_id).await
}
