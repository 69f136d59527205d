use crate::error::EnigmaError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Most recently played sessions kept for `sessions`.
const RECENT_LIMIT: usize = 10;

/// What the CLI remembers between invocations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionState {
    /// Game session commands act on when `--session` is omitted.
    pub active_session_id: Option<String>,
    /// Story of the active session.
    pub story_id: Option<String>,
    /// Recently played session ids, most recent first.
    #[serde(default)]
    pub recent_sessions: Vec<String>,
    pub last_played: Option<DateTime<Utc>>,
}

/// Manages the CLI state file.
pub struct SessionStateManager {
    state_path: PathBuf,
    state: Arc<RwLock<SessionState>>,
}

impl SessionStateManager {
    /// Load state from disk or start empty.
    pub fn load_or_create(path: &Path) -> Result<Self, EnigmaError> {
        let state = if path.exists() {
            let json = std::fs::read_to_string(path).map_err(|e| {
                EnigmaError::Database(format!("Failed to read session state: {}", e))
            })?;

            serde_json::from_str(&json).map_err(|e| {
                EnigmaError::Database(format!("Failed to parse session state: {}", e))
            })?
        } else {
            SessionState::default()
        };

        Ok(Self {
            state_path: path.to_path_buf(),
            state: Arc::new(RwLock::new(state)),
        })
    }

    pub async fn save(&self) -> Result<(), EnigmaError> {
        let state = self.state.read().await;
        let json = serde_json::to_string_pretty(&*state).map_err(|e| {
            EnigmaError::Database(format!("Failed to serialize session state: {}", e))
        })?;

        if let Some(parent) = self.state_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EnigmaError::Database(format!("Failed to create session directory: {}", e))
            })?;
        }

        std::fs::write(&self.state_path, json)
            .map_err(|e| EnigmaError::Database(format!("Failed to write session state: {}", e)))?;

        Ok(())
    }

    /// Make a game session the default target of later commands.
    pub async fn set_active(&self, session_id: &str, story_id: &str) {
        let mut state = self.state.write().await;
        state.active_session_id = Some(session_id.to_string());
        state.story_id = Some(story_id.to_string());
        state.last_played = Some(Utc::now());

        state.recent_sessions.retain(|s| s != session_id);
        state.recent_sessions.insert(0, session_id.to_string());
        state.recent_sessions.truncate(RECENT_LIMIT);
    }

    pub async fn active_session(&self) -> Option<String> {
        self.state.read().await.active_session_id.clone()
    }

    pub async fn active_story(&self) -> Option<String> {
        self.state.read().await.story_id.clone()
    }

    pub async fn recent_sessions(&self) -> Vec<String> {
        self.state.read().await.recent_sessions.clone()
    }

    /// Forget a session, e.g. after it was deleted.
    pub async fn forget(&self, session_id: &str) {
        let mut state = self.state.write().await;
        state.recent_sessions.retain(|s| s != session_id);
        if state.active_session_id.as_deref() == Some(session_id) {
            state.active_session_id = None;
            state.story_id = None;
        }
    }

    /// Forget every session of a deleted story.
    pub async fn forget_story(&self, story_id: &str) {
        let mut state = self.state.write().await;
        if state.story_id.as_deref() == Some(story_id) {
            state.active_session_id = None;
            state.story_id = None;
        }
    }
}
