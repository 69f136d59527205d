//! Shared initialization for every CLI command.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::db::connection::{init_db, DbConfig, GameDb};
use crate::db::schema::apply_schema;
use crate::llm::{create_llm_provider, load_provider_config, LlmProvider, NoopLlmProvider};
use crate::repository::{
    ContentRepository, ProgressRepository, SurrealContentRepository, SurrealProgressRepository,
};
use crate::services::{ContentService, DialogueService, GameService, UploadService};
use crate::session::SessionStateManager;

/// Application context holding all services and repositories.
pub struct AppContext {
    pub db: Arc<GameDb>,
    pub data_path: PathBuf,
    pub session_manager: Arc<SessionStateManager>,
    pub content_repo: Arc<dyn ContentRepository>,
    pub progress_repo: Arc<dyn ProgressRepository>,
    pub llm: Arc<dyn LlmProvider>,
    pub content: Arc<ContentService>,
    pub upload: Arc<UploadService>,
    pub game: Arc<GameService>,
}

/// Data path priority: explicit path > ENIGMA_DATA_PATH env > ./.enigma-hunter
/// (if exists) > ~/.enigma-hunter
pub fn resolve_data_path(explicit_path: Option<PathBuf>) -> PathBuf {
    explicit_path
        .or_else(|| std::env::var("ENIGMA_DATA_PATH").ok().map(PathBuf::from))
        .or_else(|| {
            let local_path = Path::new(".enigma-hunter");
            if local_path.is_dir() {
                Some(local_path.to_path_buf())
            } else {
                None
            }
        })
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".enigma-hunter"))
                .unwrap_or_else(|| PathBuf::from(".enigma-hunter"))
        })
}

impl AppContext {
    pub async fn new(explicit_path: Option<PathBuf>) -> Result<Self> {
        let data_path = resolve_data_path(explicit_path);
        tracing::info!("Using data path: {}", data_path.display());
        std::fs::create_dir_all(&data_path)?;

        let db_config = DbConfig::load(&data_path);
        let db = init_db(&db_config, &data_path).await?;
        tracing::info!("Database connected");

        apply_schema(&db).await?;
        tracing::info!("Schema applied");

        let llm = match create_llm_provider(&load_provider_config(&data_path)) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!("LLM provider unavailable, dialogue will fall back: {}", e);
                Arc::new(NoopLlmProvider) as Arc<dyn LlmProvider>
            }
        };
        tracing::info!("Text generation: {} ({})", llm.id(), llm.model());

        let session_manager = Arc::new(SessionStateManager::load_or_create(
            &data_path.join("session.json"),
        )?);

        Ok(Self::from_parts(Arc::new(db), data_path, session_manager, llm))
    }

    /// Wire services over an already open database.
    pub fn from_parts(
        db: Arc<GameDb>,
        data_path: PathBuf,
        session_manager: Arc<SessionStateManager>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let content_repo: Arc<dyn ContentRepository> =
            Arc::new(SurrealContentRepository::new(db.clone()));
        let progress_repo: Arc<dyn ProgressRepository> =
            Arc::new(SurrealProgressRepository::new(db.clone()));

        let content = Arc::new(ContentService::new(content_repo.clone()));
        let upload = Arc::new(UploadService::new(content_repo.clone()));
        let dialogue = Arc::new(DialogueService::new(progress_repo.clone(), llm.clone()));
        let game = Arc::new(GameService::new(
            content.clone(),
            progress_repo.clone(),
            dialogue,
        ));

        Self {
            db,
            data_path,
            session_manager,
            content_repo,
            progress_repo,
            llm,
            content,
            upload,
            game,
        }
    }
}
