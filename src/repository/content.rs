use std::sync::Arc;

use async_trait::async_trait;

use crate::db::connection::GameDb;
use crate::models::character::{create_character, list_characters};
use crate::models::clue::{create_clue, list_clues};
use crate::models::location::{create_location, list_locations};
use crate::models::object::{create_object, list_objects};
use crate::models::prompt::{create_template, list_templates};
use crate::models::qrcode::{create_qr_code, list_qr_codes};
use crate::models::story::{create_story, delete_story, get_story, get_story_header, list_stories};
use crate::models::{
    count_story_content, delete_story_content, Character, Clue, GameObject, Location,
    PromptTemplate, QrCode, Story, StoryContent, StoryHeader,
};
use crate::EnigmaError;

/// Tables holding story-scoped content documents, in upload order.
pub const CONTENT_TABLES: &[&str] = &[
    "location",
    "character",
    "game_object",
    "clue",
    "qr_code",
    "prompt_template",
];

/// Repository trait for uploaded story content.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn get_story(&self, story_id: &str) -> Result<Option<Story>, EnigmaError>;
    async fn list_stories(&self) -> Result<Vec<Story>, EnigmaError>;
    async fn put_story(&self, header: StoryHeader) -> Result<Story, EnigmaError>;

    async fn put_location(&self, data: Location) -> Result<Location, EnigmaError>;
    async fn put_character(&self, data: Character) -> Result<Character, EnigmaError>;
    async fn put_object(&self, data: GameObject) -> Result<GameObject, EnigmaError>;
    async fn put_clue(&self, data: Clue) -> Result<Clue, EnigmaError>;
    async fn put_qr_code(&self, data: QrCode) -> Result<QrCode, EnigmaError>;
    async fn put_template(&self, data: PromptTemplate) -> Result<PromptTemplate, EnigmaError>;

    /// Load the whole story into memory. `None` when the story was never uploaded.
    async fn load_story(&self, story_id: &str) -> Result<Option<StoryContent>, EnigmaError>;

    /// Number of documents per content table for a story.
    async fn count_documents(&self, story_id: &str)
        -> Result<Vec<(&'static str, usize)>, EnigmaError>;

    /// Remove the story header and every content document of the story.
    async fn delete_story(&self, story_id: &str) -> Result<bool, EnigmaError>;
}

/// SurrealDB implementation of ContentRepository.
///
/// Wraps the database connection and delegates to model functions.
pub struct SurrealContentRepository {
    db: Arc<GameDb>,
}

impl SurrealContentRepository {
    pub fn new(db: Arc<GameDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContentRepository for SurrealContentRepository {
    async fn get_story(&self, story_id: &str) -> Result<Option<Story>, EnigmaError> {
        get_story(&self.db, story_id).await
    }

    async fn list_stories(&self) -> Result<Vec<Story>, EnigmaError> {
        list_stories(&self.db).await
    }

    async fn put_story(&self, header: StoryHeader) -> Result<Story, EnigmaError> {
        create_story(&self.db, header).await
    }

    async fn put_location(&self, data: Location) -> Result<Location, EnigmaError> {
        create_location(&self.db, data).await
    }

    async fn put_character(&self, data: Character) -> Result<Character, EnigmaError> {
        create_character(&self.db, data).await
    }

    async fn put_object(&self, data: GameObject) -> Result<GameObject, EnigmaError> {
        create_object(&self.db, data).await
    }

    async fn put_clue(&self, data: Clue) -> Result<Clue, EnigmaError> {
        create_clue(&self.db, data).await
    }

    async fn put_qr_code(&self, data: QrCode) -> Result<QrCode, EnigmaError> {
        create_qr_code(&self.db, data).await
    }

    async fn put_template(&self, data: PromptTemplate) -> Result<PromptTemplate, EnigmaError> {
        create_template(&self.db, data).await
    }

    async fn load_story(&self, story_id: &str) -> Result<Option<StoryContent>, EnigmaError> {
        let Some(header) = get_story_header(&self.db, story_id).await? else {
            return Ok(None);
        };

        let (locations, characters, objects, clues, qr_codes, templates) = futures::try_join!(
            list_locations(&self.db, story_id),
            list_characters(&self.db, story_id),
            list_objects(&self.db, story_id),
            list_clues(&self.db, story_id),
            list_qr_codes(&self.db, story_id),
            list_templates(&self.db, story_id),
        )?;

        Ok(Some(StoryContent {
            header,
            locations,
            characters,
            objects,
            clues,
            qr_codes,
            templates,
        }))
    }

    async fn count_documents(
        &self,
        story_id: &str,
    ) -> Result<Vec<(&'static str, usize)>, EnigmaError> {
        let mut counts = Vec::with_capacity(CONTENT_TABLES.len());
        for table in CONTENT_TABLES {
            counts.push((*table, count_story_content(&self.db, table, story_id).await?));
        }
        Ok(counts)
    }

    async fn delete_story(&self, story_id: &str) -> Result<bool, EnigmaError> {
        for table in CONTENT_TABLES {
            delete_story_content(&self.db, table, story_id).await?;
        }
        let deleted = delete_story(&self.db, story_id).await?;
        Ok(deleted.is_some())
    }
}
