//! Character conversations.
//!
//! A message goes through three gates in order: an open challenge is judged
//! first, then keyword triggers, and only when neither applies is the
//! character voiced by the LLM. Every exchange is written to the dialogue
//! log so prompts can carry the recent history.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::exploration::{current_area, current_location, visible_areas, visible_details};
use super::triggers::{self, MissingRequirement};
use crate::llm::{GenerationRequest, LlmProvider};
use crate::models::prompt::{CHARACTER_DIALOGUE, LOCATION_DESCRIPTION, OBJECT_EXAMINATION};
use crate::models::{
    Character, DialogueEntry, DialogueEntryCreate, PendingChallenge, PlayerSession, StoryContent,
};
use crate::repository::ProgressRepository;
use crate::EnigmaError;

/// Dialogue entries fed back into the prompt.
pub const HISTORY_LIMIT: usize = 20;

pub const APOLOGY: &str = "I'm sorry, I can't answer that right now.";

const DEFENSIVE_STANCE: &str =
    "You are wary and defensive. Answer briefly and avoid volunteering information.";
const OPEN_STANCE: &str = "You are open and willing to help, within what you know.";
const NARRATOR: &str = "You narrate a mystery investigation game. Describe only what is given.";

/// System instruction sent with every line a character speaks.
pub fn character_system(character: &Character) -> String {
    format!(
        "You are {}, a character in a mystery investigation. Stay in character and never mention being an AI.",
        character.name
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Greeting,
    Answer,
    /// A trigger fired; the next message answers the challenge.
    Challenge,
    ChallengePassed,
    ChallengeFailed,
    /// Generation failed and the character apologised.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueReply {
    pub character_id: i64,
    pub character_name: String,
    pub kind: ReplyKind,
    pub text: String,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evolution: Option<(u32, u32)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<MissingRequirement>,
}

/// Strip stage directions in `(...)` or `[...]` and tidy whitespace.
///
/// Only closed spans are removed; an opener that never closes is kept as
/// text. Line breaks survive; runs of blank lines collapse to one.
pub fn clean_response(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    // (closer we wait for, length of `stripped` before the opener)
    let mut open: Vec<(char, usize)> = Vec::new();
    for c in text.chars() {
        match c {
            '(' => open.push((')', stripped.len())),
            '[' => open.push((']', stripped.len())),
            ')' | ']' if open.last().is_some_and(|(closer, _)| *closer == c) => {
                if let Some((_, start)) = open.pop() {
                    stripped.truncate(start);
                }
                continue;
            }
            _ => {}
        }
        stripped.push(c);
    }

    let mut lines: Vec<String> = Vec::new();
    for line in stripped.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() && lines.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

pub struct DialogueService {
    progress: Arc<dyn ProgressRepository>,
    llm: Arc<dyn LlmProvider>,
}

impl DialogueService {
    pub fn new(progress: Arc<dyn ProgressRepository>, llm: Arc<dyn LlmProvider>) -> Self {
        Self { progress, llm }
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.llm.as_ref()
    }

    fn character<'a>(
        content: &'a StoryContent,
        character_id: i64,
    ) -> Result<&'a Character, EnigmaError> {
        content
            .character(character_id)
            .ok_or_else(|| EnigmaError::not_found("character", character_id.to_string()))
    }

    async fn record(
        &self,
        session: &PlayerSession,
        character_id: i64,
        statement: &str,
        response: &str,
        keywords: Vec<String>,
    ) -> Result<(), EnigmaError> {
        self.progress
            .add_dialogue_entry(DialogueEntryCreate {
                session_id: session.session_id.clone(),
                character_id,
                player_statement: statement.to_string(),
                character_response: response.to_string(),
                detected_keywords: keywords,
                character_level: session.character_level(character_id),
            })
            .await?;
        Ok(())
    }

    pub async fn start_conversation(
        &self,
        session: &mut PlayerSession,
        content: &StoryContent,
        character_id: i64,
    ) -> Result<DialogueReply, EnigmaError> {
        let character = Self::character(content, character_id)?;
        let stored = session.character_level(character_id);
        let (level, defensive) = match character.level_data(stored) {
            Some((level, data)) => (level, data.is_defensive),
            None => (0, false),
        };
        session.character_levels.insert(character_id, level);

        let text = if defensive {
            format!("Hello. I'm {}. What do you want?", character.name)
        } else {
            format!("Hello! I'm {}. How can I help you?", character.name)
        };
        session.log_action(
            "start_dialogue",
            serde_json::json!({ "character_id": character_id, "level": level }),
        );
        self.record(session, character_id, "", &text, Vec::new())
            .await?;

        Ok(DialogueReply {
            character_id,
            character_name: character.name.clone(),
            kind: ReplyKind::Greeting,
            text,
            level,
            evolution: None,
            missing: Vec::new(),
        })
    }

    pub async fn send_message(
        &self,
        session: &mut PlayerSession,
        content: &StoryContent,
        character_id: i64,
        message: &str,
    ) -> Result<DialogueReply, EnigmaError> {
        let character = Self::character(content, character_id)?;

        let pending = session
            .pending_challenge
            .clone()
            .filter(|p| p.character_id == character_id);
        if let Some(pending) = pending {
            return self
                .answer_challenge(session, content, character, pending, message)
                .await;
        }

        let level = session.character_level(character_id);
        if let Some(found) = triggers::check_triggers(character, level, message) {
            debug!(
                character = %character.name,
                keyword = %found.keyword,
                "Trigger fired"
            );
            let text = match &found.challenge_question {
                Some(question) => format!("{}\n\n{}", found.defensive_response, question),
                None => found.defensive_response.clone(),
            };
            session.pending_challenge = Some(PendingChallenge {
                character_id,
                trigger: found.trigger,
                keyword: found.keyword.clone(),
            });
            session.log_action(
                "trigger_fired",
                serde_json::json!({
                    "character_id": character_id,
                    "keyword": found.keyword,
                    "trigger": found.trigger.to_string(),
                }),
            );
            self.record(session, character_id, message, &text, vec![found.keyword])
                .await?;
            return Ok(DialogueReply {
                character_id,
                character_name: character.name.clone(),
                kind: ReplyKind::Challenge,
                text,
                level,
                evolution: None,
                missing: Vec::new(),
            });
        }

        let history = self
            .progress
            .dialogue_history(&session.session_id, character_id, HISTORY_LIMIT)
            .await?;
        let prompt = build_prompt(content, character, level, &history, message);

        let request = GenerationRequest::new(prompt).with_system(character_system(character));
        let generated = if self.llm.is_available() {
            Some(self.llm.generate(request).await)
        } else {
            None
        };
        let (kind, text) = match generated {
            Some(Ok(raw)) => {
                let cleaned = clean_response(&raw);
                if cleaned.is_empty() {
                    (ReplyKind::Fallback, APOLOGY.to_string())
                } else {
                    (ReplyKind::Answer, cleaned)
                }
            }
            Some(Err(e)) => {
                warn!(
                    provider = self.llm.id(),
                    character = %character.name,
                    "Dialogue generation failed: {}",
                    e
                );
                (ReplyKind::Fallback, APOLOGY.to_string())
            }
            None => (ReplyKind::Fallback, APOLOGY.to_string()),
        };

        session.log_action(
            "dialogue",
            serde_json::json!({ "character_id": character_id }),
        );
        self.record(session, character_id, message, &text, Vec::new())
            .await?;

        Ok(DialogueReply {
            character_id,
            character_name: character.name.clone(),
            kind,
            text,
            level,
            evolution: None,
            missing: Vec::new(),
        })
    }

    async fn answer_challenge(
        &self,
        session: &mut PlayerSession,
        content: &StoryContent,
        character: &Character,
        pending: PendingChallenge,
        message: &str,
    ) -> Result<DialogueReply, EnigmaError> {
        let resolution =
            triggers::resolve_challenge(session, content, character, pending.trigger, message);

        let mut text = resolution.response.clone();
        if let Some((from, to)) = resolution.evolution {
            text.push_str(&format!(
                "\n[{} evolved from level {from} to {to}]",
                character.name
            ));
        }
        for missing in &resolution.missing {
            text.push_str(&format!("\n- {}", missing.description));
            if let Some(hint) = &missing.hint {
                text.push_str(&format!(" ({hint})"));
            }
        }

        self.record(
            session,
            character.character_id,
            message,
            &text,
            vec![pending.keyword],
        )
        .await?;

        Ok(DialogueReply {
            character_id: character.character_id,
            character_name: character.name.clone(),
            kind: if resolution.success {
                ReplyKind::ChallengePassed
            } else {
                ReplyKind::ChallengeFailed
            },
            text,
            level: session.character_level(character.character_id),
            evolution: resolution.evolution,
            missing: resolution.missing,
        })
    }

    /// Narrated description of where the player stands. Falls back to the
    /// authored text when generation is unavailable.
    pub async fn describe_location(&self, session: &PlayerSession, content: &StoryContent) -> String {
        let Some(location) = current_location(session, content) else {
            return "You are nowhere yet.".to_string();
        };
        let level = session.exploration_level(location.location_id);

        let mut visible = Vec::new();
        for area in visible_areas(location, level) {
            visible.push(format!("- {}: {}", area.name, area.description));
        }
        if let Some(area) = current_area(session, content) {
            for detail in visible_details(area, session.area_level(area.area_id)) {
                visible.push(format!("- {}: {}", detail.name, detail.description));
            }
        }
        let notable: Vec<String> = content
            .characters_in(location.location_id, session.current_area_id)
            .iter()
            .map(|c| c.name.clone())
            .chain(
                content
                    .objects_in(location.location_id, session.current_area_id)
                    .iter()
                    .filter(|o| !session.has_object(o.object_id))
                    .map(|o| o.name.clone()),
            )
            .collect();

        let vars = HashMap::from([
            ("location_name", location.name.clone()),
            ("location_description", location.description.clone()),
            ("exploration_level", level.to_string()),
            ("visible_details", visible.join("\n")),
            ("atmosphere", String::new()),
            ("notable_elements", notable.join(", ")),
        ]);
        self.narrate(content, LOCATION_DESCRIPTION, &vars, &location.description)
            .await
    }

    pub async fn describe_object(
        &self,
        session: &PlayerSession,
        content: &StoryContent,
        object_id: i64,
    ) -> Result<String, EnigmaError> {
        let object = content
            .object(object_id)
            .ok_or_else(|| EnigmaError::not_found("object", object_id.to_string()))?;
        let level = session.object_level(object_id);
        let known: Vec<String> = object
            .levels
            .iter()
            .filter(|l| l.level_number <= level)
            .map(|l| l.level_description.clone())
            .filter(|d| !d.is_empty())
            .collect();

        let vars = HashMap::from([
            ("object_name", object.name.clone()),
            ("object_description", object.base_description.clone()),
            ("object_level", level.to_string()),
            ("level_knowledge", object.description_at(level).to_string()),
            ("observable_details", known.join("\n")),
            ("known_context", String::new()),
        ]);
        Ok(self
            .narrate(content, OBJECT_EXAMINATION, &vars, object.description_at(level))
            .await)
    }

    async fn narrate(
        &self,
        content: &StoryContent,
        template: &str,
        vars: &HashMap<&str, String>,
        fallback: &str,
    ) -> String {
        let Some(template) = content.template(template) else {
            return fallback.to_string();
        };
        if !self.llm.is_available() {
            return fallback.to_string();
        }
        let request = GenerationRequest::new(template.render(vars))
            .with_system(NARRATOR)
            .with_max_tokens(400);
        match self.llm.generate(request).await {
            Ok(text) => {
                let cleaned = clean_response(&text);
                if cleaned.is_empty() {
                    fallback.to_string()
                } else {
                    cleaned
                }
            }
            Err(e) => {
                debug!("Narration unavailable: {}", e);
                fallback.to_string()
            }
        }
    }
}

/// Fill the character dialogue template for the next line.
pub fn build_prompt(
    content: &StoryContent,
    character: &Character,
    level: u32,
    history: &[DialogueEntry],
    message: &str,
) -> String {
    let (level, data) = match character.level_data(level) {
        Some((level, data)) => (level, Some(data)),
        None => (0, None),
    };

    let mut conversation = String::new();
    let start = history.len().saturating_sub(HISTORY_LIMIT);
    for entry in &history[start..] {
        if !entry.player_statement.is_empty() {
            conversation.push_str(&format!("\nPlayer: {}", entry.player_statement));
        }
        conversation.push_str(&format!("\n{}: {}", character.name, entry.character_response));
    }

    let defensive = data.is_some_and(|d| d.is_defensive);
    let vars = HashMap::from([
        ("character_name", character.name.clone()),
        ("character_description", character.base_description.clone()),
        ("character_level", level.to_string()),
        (
            "available_knowledge",
            data.map(|d| d.knowledge_scope.clone()).unwrap_or_default(),
        ),
        ("character_personality", character.personality.clone()),
        (
            "narrative_stance",
            data.map(|d| d.narrative_stance.clone()).unwrap_or_default(),
        ),
        (
            "stance_line",
            if defensive { DEFENSIVE_STANCE } else { OPEN_STANCE }.to_string(),
        ),
        (
            "special_instructions",
            data.and_then(|d| d.ia_instruction_set.clone())
                .unwrap_or_default(),
        ),
        ("conversation_history", conversation),
        ("player_input", message.to_string()),
    ]);

    match content.template(CHARACTER_DIALOGUE) {
        Some(template) => template.render(&vars),
        None => format!("{}: {}", character.name, message),
    }
}
