//! One throwaway game database per test.

use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use enigma_hunter::db::connection::{init_db, DbConfig, GameDb};
use enigma_hunter::db::schema::apply_schema;
use enigma_hunter::init::AppContext;
use enigma_hunter::llm::{LlmProvider, NoopLlmProvider, OllamaProvider};
use enigma_hunter::models::{PlayerSession, StoryContent};
use enigma_hunter::services::{noop_progress, ConflictMode, UploadResult};
use enigma_hunter::session::SessionStateManager;

/// Embedded RocksDB under a temp dir; removed when the harness drops.
pub struct TestHarness {
    pub db: Arc<GameDb>,
    pub temp_dir: TempDir,
}

impl TestHarness {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let config = DbConfig::Embedded {
            path: Some(temp_dir.path().join("game.db").to_string_lossy().into_owned()),
        };
        let db = init_db(&config, temp_dir.path()).await.expect("open test db");
        apply_schema(&db).await.expect("apply schema");

        Self {
            db: Arc::new(db),
            temp_dir,
        }
    }

    /// Doubles as the data directory, so `session.json` lands here too.
    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Wire an application context over this database with the given LLM.
    pub fn context_with(&self, llm: Arc<dyn LlmProvider>) -> AppContext {
        let session_path = self.temp_path().join("session.json");
        let session_manager = Arc::new(
            SessionStateManager::load_or_create(&session_path)
                .expect("Failed to create session manager"),
        );
        AppContext::from_parts(
            self.db.clone(),
            self.temp_path().to_path_buf(),
            session_manager,
            llm,
        )
    }

    /// Application context with text generation switched off.
    pub fn context(&self) -> AppContext {
        self.context_with(Arc::new(NoopLlmProvider))
    }

    /// Application context whose dialogue goes to an Ollama mock.
    pub fn context_with_ollama(&self, base_url: &str) -> AppContext {
        self.context_with(Arc::new(OllamaProvider::new(base_url, "test-model")))
    }
}

/// Upload a story, failing the test on any per-document error.
pub async fn upload_story(ctx: &AppContext, content: StoryContent, story_id: &str) -> UploadResult {
    let result = ctx
        .upload
        .upload(
            content,
            story_id,
            ConflictMode::Error,
            noop_progress().as_ref(),
        )
        .await
        .expect("upload failed");
    assert_eq!(result.total_errors, 0, "upload errors: {:?}", result.by_type);
    result
}

/// Upload the manor fixture and start a game in it.
pub async fn start_manor_game(ctx: &AppContext) -> PlayerSession {
    upload_story(ctx, super::builders::manor_story(), "manor").await;
    let (session, _) = ctx
        .game
        .new_game("manor", "Holmes")
        .await
        .expect("new game failed");
    session
}
