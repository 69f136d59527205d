use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::db::connection::GameDb;
use crate::EnigmaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Active,
    Solved,
    Abandoned,
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::Active => write!(f, "active"),
            GameStatus::Solved => write!(f, "solved"),
            GameStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// Position of a trigger inside a character's authored levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRef {
    pub level: u32,
    pub index: usize,
}

impl std::fmt::Display for TriggerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.level, self.index)
    }
}

/// A challenge the player must answer before talking on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChallenge {
    pub character_id: i64,
    pub trigger: TriggerRef,
    pub keyword: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolutionAttempt {
    pub accused_character_id: i64,
    pub method: String,
    pub motive: String,
    pub evidence: Vec<i64>,
    pub is_correct: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRecord {
    pub action: String,
    pub details: serde_json::Value,
    pub at: DateTime<Utc>,
}

/// Everything a player has done in one playthrough of a story.
///
/// Integer-keyed maps are stored as lists of pairs since document keys must
/// be strings.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSession {
    pub session_id: String,
    pub player_name: String,
    pub story_id: String,
    #[serde(default)]
    pub game_status: GameStatus,
    #[serde(default)]
    pub current_location_id: Option<i64>,
    #[serde(default)]
    pub current_area_id: Option<i64>,
    /// location → exploration level
    #[serde_as(as = "Vec<(_, _)>")]
    #[serde(default)]
    pub discovered_locations: BTreeMap<i64, u32>,
    /// area → visit count
    #[serde_as(as = "Vec<(_, _)>")]
    #[serde(default)]
    pub area_visits: BTreeMap<i64, u32>,
    /// area → exploration level
    #[serde_as(as = "Vec<(_, _)>")]
    #[serde(default)]
    pub area_levels: BTreeMap<i64, u32>,
    #[serde(default)]
    pub inventory: Vec<i64>,
    /// object → knowledge level
    #[serde_as(as = "Vec<(_, _)>")]
    #[serde(default)]
    pub object_levels: BTreeMap<i64, u32>,
    #[serde(default)]
    pub discovered_clues: Vec<i64>,
    #[serde(default)]
    pub scanned_qr_codes: Vec<String>,
    /// character → relationship level
    #[serde_as(as = "Vec<(_, _)>")]
    #[serde(default)]
    pub character_levels: BTreeMap<i64, u32>,
    #[serde(default)]
    pub specialization_points: BTreeMap<String, u32>,
    #[serde(default)]
    pub specialization_levels: BTreeMap<String, u32>,
    /// interaction type → interaction ids already rewarded
    #[serde(default)]
    pub completed_interactions: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub pending_challenge: Option<PendingChallenge>,
    #[serde(default)]
    pub solutions: Vec<SolutionAttempt>,
    #[serde(default)]
    pub action_history: Vec<ActionRecord>,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl PlayerSession {
    pub fn new(story_id: &str, player_name: &str) -> Self {
        let now = Utc::now();
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            player_name: player_name.to_string(),
            story_id: story_id.to_string(),
            game_status: GameStatus::Active,
            current_location_id: None,
            current_area_id: None,
            discovered_locations: BTreeMap::new(),
            area_visits: BTreeMap::new(),
            area_levels: BTreeMap::new(),
            inventory: Vec::new(),
            object_levels: BTreeMap::new(),
            discovered_clues: Vec::new(),
            scanned_qr_codes: Vec::new(),
            character_levels: BTreeMap::new(),
            specialization_points: BTreeMap::new(),
            specialization_levels: BTreeMap::new(),
            completed_interactions: BTreeMap::new(),
            pending_challenge: None,
            solutions: Vec::new(),
            action_history: Vec::new(),
            started_at: now,
            last_activity: now,
        }
    }

    pub fn has_object(&self, object_id: i64) -> bool {
        self.inventory.contains(&object_id)
    }

    pub fn has_clue(&self, clue_id: i64) -> bool {
        self.discovered_clues.contains(&clue_id)
    }

    pub fn exploration_level(&self, location_id: i64) -> u32 {
        self.discovered_locations
            .get(&location_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn area_level(&self, area_id: i64) -> u32 {
        self.area_levels.get(&area_id).copied().unwrap_or(0)
    }

    pub fn object_level(&self, object_id: i64) -> u32 {
        self.object_levels.get(&object_id).copied().unwrap_or(0)
    }

    pub fn character_level(&self, character_id: i64) -> u32 {
        self.character_levels
            .get(&character_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn skill_level(&self, category: &str) -> u32 {
        self.specialization_levels
            .get(category)
            .copied()
            .unwrap_or(0)
    }

    /// Append to the action history and bump `last_activity`.
    pub fn log_action(&mut self, action: &str, details: serde_json::Value) {
        let now = Utc::now();
        self.action_history.push(ActionRecord {
            action: action.to_string(),
            details,
            at: now,
        });
        self.last_activity = now;
    }
}

/// Insert or overwrite a session document keyed by its session id.
pub async fn save_session(
    db: &GameDb,
    session: PlayerSession,
) -> Result<PlayerSession, EnigmaError> {
    let key = session.session_id.clone();
    let result: Option<PlayerSession> = db
        .upsert(("player_session", key.as_str()))
        .content(session)
        .await?;
    result.ok_or_else(|| EnigmaError::Database(format!("Failed to save session '{key}'")))
}

pub async fn get_session(
    db: &GameDb,
    session_id: &str,
) -> Result<Option<PlayerSession>, EnigmaError> {
    let result: Option<PlayerSession> = db.select(("player_session", session_id)).await?;
    Ok(result)
}

/// Sessions, most recently active first. Optionally limited to one story.
pub async fn list_sessions(
    db: &GameDb,
    story_id: Option<&str>,
) -> Result<Vec<PlayerSession>, EnigmaError> {
    let mut result = match story_id {
        Some(story) => {
            db.query(
                "SELECT * FROM player_session WHERE story_id = $story ORDER BY last_activity DESC",
            )
            .bind(("story", story.to_string()))
            .await?
        }
        None => {
            db.query("SELECT * FROM player_session ORDER BY last_activity DESC")
                .await?
        }
    };
    let sessions: Vec<PlayerSession> = result.take(0)?;
    Ok(sessions)
}

pub async fn delete_session(
    db: &GameDb,
    session_id: &str,
) -> Result<Option<PlayerSession>, EnigmaError> {
    let result: Option<PlayerSession> = db.delete(("player_session", session_id)).await?;
    Ok(result)
}
