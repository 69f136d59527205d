use serde::{Deserialize, Serialize};
use surrealdb::{Datetime, RecordId};

use crate::db::connection::GameDb;
use crate::models::specialization::SpecializationConfig;
use crate::models::{Area, Character, Clue, GameObject, Location, PromptTemplate, QrCode};
use crate::EnigmaError;

fn default_title() -> String {
    "Untitled story".to_string()
}

fn default_difficulty() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// What the player must establish to close the case.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SolutionCriteria {
    #[serde(default)]
    pub culprit_id: Option<i64>,
    #[serde(default)]
    pub method_keywords: Vec<String>,
    #[serde(default)]
    pub motive_keywords: Vec<String>,
}

/// Story as stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: RecordId,
    pub story_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub conclusion: String,
    pub difficulty_level: u32,
    #[serde(default)]
    pub solution_criteria: SolutionCriteria,
    #[serde(default)]
    pub specialization_config: SpecializationConfig,
    pub is_active: bool,
    pub created_at: Datetime,
    pub updated_at: Datetime,
}

/// Story header as authored in `historia_base.json`.
///
/// `story_id` and `specialization_config` are filled in by the uploader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryHeader {
    #[serde(default)]
    pub story_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub conclusion: String,
    #[serde(default = "default_difficulty")]
    pub difficulty_level: u32,
    #[serde(default)]
    pub solution_criteria: SolutionCriteria,
    #[serde(default)]
    pub specialization_config: SpecializationConfig,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Default for StoryHeader {
    fn default() -> Self {
        Self {
            story_id: String::new(),
            title: default_title(),
            description: String::new(),
            introduction: String::new(),
            conclusion: String::new(),
            difficulty_level: default_difficulty(),
            solution_criteria: SolutionCriteria::default(),
            specialization_config: SpecializationConfig::default(),
            is_active: true,
        }
    }
}

/// A whole story held in memory: header plus every content document.
///
/// Built from disk by the uploader and from the database by the content
/// repository; gameplay rules only ever read it.
#[derive(Debug, Clone, Default)]
pub struct StoryContent {
    pub header: StoryHeader,
    pub locations: Vec<Location>,
    pub characters: Vec<Character>,
    pub objects: Vec<GameObject>,
    pub clues: Vec<Clue>,
    pub qr_codes: Vec<QrCode>,
    pub templates: Vec<PromptTemplate>,
}

impl StoryContent {
    pub fn story_id(&self) -> &str {
        &self.header.story_id
    }

    pub fn location(&self, location_id: i64) -> Option<&Location> {
        self.locations.iter().find(|l| l.location_id == location_id)
    }

    /// Area and the location that owns it.
    pub fn area(&self, area_id: i64) -> Option<(&Location, &Area)> {
        self.locations
            .iter()
            .find_map(|l| l.area(area_id).map(|a| (l, a)))
    }

    pub fn character(&self, character_id: i64) -> Option<&Character> {
        self.characters
            .iter()
            .find(|c| c.character_id == character_id)
    }

    pub fn object(&self, object_id: i64) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.object_id == object_id)
    }

    pub fn clue(&self, clue_id: i64) -> Option<&Clue> {
        self.clues.iter().find(|c| c.clue_id == clue_id)
    }

    pub fn qr_code(&self, uuid: &str) -> Option<&QrCode> {
        self.qr_codes.iter().find(|q| q.uuid == uuid)
    }

    /// Story override if present, otherwise the built-in template.
    pub fn template(&self, name: &str) -> Option<PromptTemplate> {
        self.templates
            .iter()
            .find(|t| t.template_name == name)
            .cloned()
            .or_else(|| crate::models::prompt::builtin_template(name))
    }

    /// The location flagged as the start, else the first one.
    pub fn starting_location(&self) -> Option<&Location> {
        self.locations
            .iter()
            .find(|l| l.is_starting_location)
            .or_else(|| self.locations.first())
    }

    pub fn characters_in(&self, location_id: i64, area_id: Option<i64>) -> Vec<&Character> {
        self.characters
            .iter()
            .filter(|c| c.is_present(location_id, area_id))
            .collect()
    }

    pub fn objects_in(&self, location_id: i64, area_id: Option<i64>) -> Vec<&GameObject> {
        self.objects
            .iter()
            .filter(|o| o.is_placed_in(location_id, area_id))
            .collect()
    }

    pub fn key_evidence(&self) -> impl Iterator<Item = &Clue> {
        self.clues.iter().filter(|c| c.is_key_evidence)
    }

    /// Document counts per content type, in upload order.
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("story", 1),
            ("location", self.locations.len()),
            ("character", self.characters.len()),
            ("game_object", self.objects.len()),
            ("clue", self.clues.len()),
            ("qr_code", self.qr_codes.len()),
            ("prompt_template", self.templates.len()),
        ]
    }
}

/// Create (or overwrite) a story header keyed by its story id.
pub async fn create_story(db: &GameDb, data: StoryHeader) -> Result<Story, EnigmaError> {
    let key = data.story_id.clone();
    let result: Option<Story> = db.upsert(("story", key.as_str())).content(data).await?;
    result.ok_or_else(|| EnigmaError::Database(format!("Failed to create story '{key}'")))
}

/// Story header without record metadata.
pub async fn get_story_header(
    db: &GameDb,
    story_id: &str,
) -> Result<Option<StoryHeader>, EnigmaError> {
    let result: Option<StoryHeader> = db.select(("story", story_id)).await?;
    Ok(result)
}

/// Get a story by its story id.
pub async fn get_story(db: &GameDb, story_id: &str) -> Result<Option<Story>, EnigmaError> {
    let result: Option<Story> = db.select(("story", story_id)).await?;
    Ok(result)
}

/// List all uploaded stories, most recently uploaded first.
pub async fn list_stories(db: &GameDb) -> Result<Vec<Story>, EnigmaError> {
    let mut result = db
        .query("SELECT * FROM story ORDER BY created_at DESC")
        .await?;
    let stories: Vec<Story> = result.take(0)?;
    Ok(stories)
}

/// Delete a story header. Content documents are removed separately.
pub async fn delete_story(db: &GameDb, story_id: &str) -> Result<Option<Story>, EnigmaError> {
    let result: Option<Story> = db.delete(("story", story_id)).await?;
    Ok(result)
}
