use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use crate::models::{Story, StoryContent};
use crate::repository::ContentRepository;
use crate::EnigmaError;

/// Seconds a loaded story stays cached.
pub const CONTENT_CACHE_TTL_SECS: u64 = 600;

/// Read side of uploaded stories.
///
/// Stories are loaded whole and cached per story id; gameplay reads the
/// cached `Arc<StoryContent>` and never touches the content tables directly.
pub struct ContentService {
    repo: Arc<dyn ContentRepository>,
    cache: Cache<String, Arc<StoryContent>>,
}

impl ContentService {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self::with_ttl(repo, Duration::from_secs(CONTENT_CACHE_TTL_SECS))
    }

    pub fn with_ttl(repo: Arc<dyn ContentRepository>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(ttl)
            .build();
        Self { repo, cache }
    }

    /// The whole story, from cache when possible.
    pub async fn story(&self, story_id: &str) -> Result<Arc<StoryContent>, EnigmaError> {
        if let Some(cached) = self.cache.get(story_id).await {
            return Ok(cached);
        }

        let content = self
            .repo
            .load_story(story_id)
            .await?
            .ok_or_else(|| EnigmaError::not_found("story", story_id))?;
        debug!(
            "Loaded story '{}' ({} locations, {} characters)",
            story_id,
            content.locations.len(),
            content.characters.len()
        );
        let content = Arc::new(content);
        self.cache
            .insert(story_id.to_string(), content.clone())
            .await;
        Ok(content)
    }

    pub async fn list_stories(&self) -> Result<Vec<Story>, EnigmaError> {
        self.repo.list_stories().await
    }

    pub async fn document_counts(
        &self,
        story_id: &str,
    ) -> Result<Vec<(&'static str, usize)>, EnigmaError> {
        self.repo.count_documents(story_id).await
    }

    /// Drop the cached copy after the story was uploaded again or deleted.
    pub async fn invalidate(&self, story_id: &str) {
        self.cache.invalidate(story_id).await;
    }
}
