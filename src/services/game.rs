//! Session orchestration: one method per player action.
//!
//! Every action loads the story through the content cache, applies the rule
//! functions to the session and persists it before returning.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::info;

use super::content::ContentService;
use super::dialogue::{DialogueReply, DialogueService};
use super::exploration::{self, within_reach};
use super::hints::{self, Hint, ProgressReport};
use super::qrcode::{self, ScanOutcome};
use super::skills;
use super::solution::{self, Accusation, Verdict};
use super::Outcome;
use crate::models::{Character, GameObject, PlayerSession, StoryContent};
use crate::repository::ProgressRepository;
use crate::EnigmaError;

/// Points for combining two objects from the REPL.
pub const COMBINE_POINTS: u32 = 15;

/// Snapshot of the player's standing, for `status`.
#[derive(Debug, Clone, Serialize)]
pub struct GameStatusView {
    pub session_id: String,
    pub player_name: String,
    pub story_id: String,
    pub story_title: String,
    pub status: String,
    pub location: Option<String>,
    pub area: Option<String>,
    pub inventory: Vec<String>,
    pub clues: Vec<String>,
    pub skills: Vec<(String, u32, u32)>,
    pub characters_here: Vec<String>,
    pub objects_here: Vec<String>,
}

pub struct GameService {
    content: Arc<ContentService>,
    progress: Arc<dyn ProgressRepository>,
    dialogue: Arc<DialogueService>,
}

impl GameService {
    pub fn new(
        content: Arc<ContentService>,
        progress: Arc<dyn ProgressRepository>,
        dialogue: Arc<DialogueService>,
    ) -> Self {
        Self {
            content,
            progress,
            dialogue,
        }
    }

    pub fn dialogue(&self) -> &DialogueService {
        &self.dialogue
    }

    /// The story a session plays.
    pub async fn story(&self, session: &PlayerSession) -> Result<Arc<StoryContent>, EnigmaError> {
        self.content.story(&session.story_id).await
    }

    /// Start a playthrough at the story's starting location.
    pub async fn new_game(
        &self,
        story_id: &str,
        player_name: &str,
    ) -> Result<(PlayerSession, Outcome), EnigmaError> {
        let content = self.content.story(story_id).await?;
        if !content.header.is_active {
            return Err(EnigmaError::Validation(format!(
                "Story '{story_id}' is not active"
            )));
        }
        let start = content.starting_location().ok_or_else(|| {
            EnigmaError::Validation(format!("Story '{story_id}' has no locations"))
        })?;

        let mut session = PlayerSession::new(story_id, player_name);
        session.log_action("new_game", json!({ "story_id": story_id }));
        let outcome = exploration::discover_location(&mut session, &content, start.location_id);
        let outcome = if content.header.introduction.trim().is_empty() {
            outcome
        } else {
            Outcome {
                description: Some(content.header.introduction.clone()),
                ..outcome
            }
        };

        let session = self.progress.save_session(session).await?;
        info!(
            "New game {} for '{}' in story '{}'",
            session.session_id, player_name, story_id
        );
        Ok((session, outcome))
    }

    pub async fn load(&self, session_id: &str) -> Result<PlayerSession, EnigmaError> {
        self.progress
            .get_session(session_id)
            .await?
            .ok_or_else(|| EnigmaError::not_found("session", session_id))
    }

    pub async fn save(&self, session: &PlayerSession) -> Result<(), EnigmaError> {
        self.progress.save_session(session.clone()).await?;
        Ok(())
    }

    pub async fn list_sessions(
        &self,
        story_id: Option<&str>,
    ) -> Result<Vec<PlayerSession>, EnigmaError> {
        self.progress.list_sessions(story_id).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<bool, EnigmaError> {
        self.progress.delete_session(session_id).await
    }

    /// Apply a synchronous rule to the session and persist the result.
    async fn apply<T>(
        &self,
        session: &mut PlayerSession,
        rule: impl FnOnce(&mut PlayerSession, &StoryContent) -> T,
    ) -> Result<T, EnigmaError> {
        let content = self.story(session).await?;
        let result = rule(session, &content);
        self.save(session).await?;
        Ok(result)
    }

    pub async fn enter(
        &self,
        session: &mut PlayerSession,
        location_id: i64,
    ) -> Result<Outcome, EnigmaError> {
        self.apply(session, |s, c| exploration::enter_location(s, c, location_id))
            .await
    }

    pub async fn go(
        &self,
        session: &mut PlayerSession,
        area_id: i64,
    ) -> Result<Outcome, EnigmaError> {
        self.apply(session, |s, c| exploration::move_to_area(s, c, area_id))
            .await
    }

    /// Look around the current area.
    pub async fn explore(&self, session: &mut PlayerSession) -> Result<Outcome, EnigmaError> {
        self.apply(session, |s, c| match s.current_area_id {
            Some(area_id) => exploration::examine_area(s, c, area_id),
            None => Outcome::refused("Move into an area first."),
        })
        .await
    }

    pub async fn examine_object(
        &self,
        session: &mut PlayerSession,
        object_id: i64,
    ) -> Result<Outcome, EnigmaError> {
        self.apply(session, |s, c| match c.object(object_id) {
            Some(object) if !within_reach(s, object) => {
                Outcome::refused(format!("{} is not within reach.", object.name))
            }
            _ => exploration::examine_object(s, c, object_id, None),
        })
        .await
    }

    pub async fn take(
        &self,
        session: &mut PlayerSession,
        object_id: i64,
    ) -> Result<Outcome, EnigmaError> {
        self.apply(session, |s, c| match c.object(object_id) {
            Some(object) if !within_reach(s, object) => {
                Outcome::refused(format!("{} is not within reach.", object.name))
            }
            _ => exploration::collect_object(s, c, object_id),
        })
        .await
    }

    /// Combine two held objects under the id `{low}_{high}`.
    pub async fn combine(
        &self,
        session: &mut PlayerSession,
        first: i64,
        second: i64,
    ) -> Result<Outcome, EnigmaError> {
        let combination_id = format!("{}_{}", first.min(second), first.max(second));
        self.apply(session, |s, c| {
            exploration::combine_objects(
                s,
                c,
                &[first, second],
                &combination_id,
                skills::ANALYSIS,
                COMBINE_POINTS,
            )
        })
        .await
    }

    /// Scan a code. `talk` codes open the conversation right away.
    pub async fn scan(
        &self,
        session: &mut PlayerSession,
        uuid: &str,
    ) -> Result<(ScanOutcome, Option<DialogueReply>), EnigmaError> {
        let content = self.story(session).await?;
        let scanned = qrcode::scan(session, &content, uuid);
        let reply = match scanned.start_dialogue {
            Some(character_id) => Some(
                self.dialogue
                    .start_conversation(session, &content, character_id)
                    .await?,
            ),
            None => None,
        };
        self.save(session).await?;
        Ok((scanned, reply))
    }

    pub async fn talk(
        &self,
        session: &mut PlayerSession,
        character_id: i64,
    ) -> Result<DialogueReply, EnigmaError> {
        let content = self.story(session).await?;
        let reply = self
            .dialogue
            .start_conversation(session, &content, character_id)
            .await?;
        self.save(session).await?;
        Ok(reply)
    }

    pub async fn say(
        &self,
        session: &mut PlayerSession,
        character_id: i64,
        message: &str,
    ) -> Result<DialogueReply, EnigmaError> {
        let content = self.story(session).await?;
        let reply = self
            .dialogue
            .send_message(session, &content, character_id, message)
            .await?;
        self.save(session).await?;
        Ok(reply)
    }

    pub async fn accuse(
        &self,
        session: &mut PlayerSession,
        accusation: Accusation,
    ) -> Result<Verdict, EnigmaError> {
        let content = self.story(session).await?;
        let verdict = solution::submit_solution(session, &content, accusation)?;
        self.save(session).await?;
        if verdict.correct {
            info!("Session {} solved the case", session.session_id);
        }
        Ok(verdict)
    }

    pub async fn progress(&self, session: &PlayerSession) -> Result<ProgressReport, EnigmaError> {
        let content = self.story(session).await?;
        Ok(hints::progress(session, &content))
    }

    pub async fn hints(&self, session: &PlayerSession) -> Result<Vec<Hint>, EnigmaError> {
        let content = self.story(session).await?;
        Ok(hints::hints(session, &content))
    }

    pub async fn describe(&self, session: &PlayerSession) -> Result<String, EnigmaError> {
        let content = self.story(session).await?;
        Ok(self.dialogue.describe_location(session, &content).await)
    }

    pub async fn describe_object(
        &self,
        session: &PlayerSession,
        object_id: i64,
    ) -> Result<String, EnigmaError> {
        let content = self.story(session).await?;
        self.dialogue
            .describe_object(session, &content, object_id)
            .await
    }

    pub async fn status(&self, session: &PlayerSession) -> Result<GameStatusView, EnigmaError> {
        let content = self.story(session).await?;
        let config = &content.header.specialization_config;
        let location = exploration::current_location(session, &content);

        Ok(GameStatusView {
            session_id: session.session_id.clone(),
            player_name: session.player_name.clone(),
            story_id: session.story_id.clone(),
            story_title: content.header.title.clone(),
            status: session.game_status.to_string(),
            location: location.map(|l| l.name.clone()),
            area: exploration::current_area(session, &content).map(|a| a.name.clone()),
            inventory: held_objects(session, &content)
                .iter()
                .map(|o| o.name.clone())
                .collect(),
            clues: session
                .discovered_clues
                .iter()
                .filter_map(|id| content.clue(*id))
                .map(|c| c.name.clone())
                .collect(),
            skills: session
                .specialization_points
                .iter()
                .map(|(category, points)| {
                    (
                        category.clone(),
                        skills::level_for(config, category, *points),
                        *points,
                    )
                })
                .collect(),
            characters_here: characters_here(session, &content)
                .iter()
                .map(|c| c.name.clone())
                .collect(),
            objects_here: objects_here(session, &content)
                .iter()
                .map(|o| o.name.clone())
                .collect(),
        })
    }
}

/// Inventory in pickup order.
pub fn held_objects<'a>(
    session: &PlayerSession,
    content: &'a StoryContent,
) -> Vec<&'a GameObject> {
    session
        .inventory
        .iter()
        .filter_map(|id| content.object(*id))
        .collect()
}

/// Characters the player can talk to from where they stand.
pub fn characters_here<'a>(
    session: &PlayerSession,
    content: &'a StoryContent,
) -> Vec<&'a Character> {
    match session.current_location_id {
        Some(location_id) => content.characters_in(location_id, session.current_area_id),
        None => Vec::new(),
    }
}

/// Objects lying around the current position that the player does not hold.
pub fn objects_here<'a>(
    session: &PlayerSession,
    content: &'a StoryContent,
) -> Vec<&'a GameObject> {
    match session.current_location_id {
        Some(location_id) => content
            .objects_in(location_id, session.current_area_id)
            .into_iter()
            .filter(|o| !session.has_object(o.object_id))
            .collect(),
        None => Vec::new(),
    }
}
