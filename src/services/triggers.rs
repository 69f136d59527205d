//! Keyword triggers that gate character evolution.
//!
//! Each character level lists triggers. When the player's message mentions a
//! trigger keyword the character turns defensive and asks a challenge
//! question; the player's next message answers it. If the trigger's
//! requirements hold, the character moves up a level.

use serde::Serialize;

use crate::models::{
    Character, EvolutionTrigger, PlayerSession, RequirementType, StoryContent, TriggerRef,
};

pub const DEFAULT_DEFENSIVE_RESPONSE: &str = "Interesting... why do you ask that?";

/// A trigger fired by the player's message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerMatch {
    pub keyword: String,
    pub defensive_response: String,
    pub challenge_question: Option<String>,
    pub trigger: TriggerRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingRequirement {
    pub description: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequirementCheck {
    pub met: bool,
    pub missing: Vec<MissingRequirement>,
}

/// How a challenge answer was judged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeResolution {
    pub success: bool,
    pub response: String,
    pub missing: Vec<MissingRequirement>,
    /// `(from, to)` when the character moved up a level.
    pub evolution: Option<(u32, u32)>,
}

/// First trigger of the character's current level whose keyword appears in
/// `message`, compared case-insensitively.
pub fn check_triggers(character: &Character, level: u32, message: &str) -> Option<TriggerMatch> {
    let (level, data) = character.level_data(level)?;
    let message = message.to_lowercase();

    data.triggers.iter().enumerate().find_map(|(index, trigger)| {
        let keyword = trigger.trigger_keyword.trim().to_lowercase();
        if keyword.is_empty() || !message.contains(&keyword) {
            return None;
        }
        Some(TriggerMatch {
            keyword: trigger.trigger_keyword.clone(),
            defensive_response: trigger
                .defensive_response
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DEFENSIVE_RESPONSE.to_string()),
            challenge_question: trigger
                .challenge_question
                .clone()
                .filter(|q| !q.trim().is_empty()),
            trigger: TriggerRef { level, index },
        })
    })
}

pub fn trigger_at(character: &Character, trigger: TriggerRef) -> Option<&EvolutionTrigger> {
    character
        .levels
        .get(trigger.level as usize)
        .and_then(|l| l.triggers.get(trigger.index))
}

pub fn check_requirements(
    session: &PlayerSession,
    content: &StoryContent,
    trigger: &EvolutionTrigger,
    response: &str,
) -> RequirementCheck {
    let response = response.to_lowercase();
    let mut missing = Vec::new();

    for requirement in &trigger.requirements {
        let hint = requirement.hint_if_incorrect.clone();
        match requirement.requirement_type {
            RequirementType::Object => {
                let Some(object_id) = requirement.required_object_id else {
                    continue;
                };
                let name = content
                    .object(object_id)
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| format!("object {object_id}"));
                if !session.has_object(object_id) {
                    missing.push(MissingRequirement {
                        description: format!("You need to present {name}."),
                        hint,
                    });
                } else if requirement.minimum_presentation_level > 0
                    && session.object_level(object_id) < requirement.minimum_presentation_level
                {
                    missing.push(MissingRequirement {
                        description: format!("You need to understand {name} better."),
                        hint,
                    });
                }
            }
            RequirementType::Knowledge => {
                let Some(knowledge) = requirement
                    .required_knowledge
                    .as_deref()
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                else {
                    continue;
                };
                if !response.contains(&knowledge.to_lowercase()) {
                    missing.push(MissingRequirement {
                        description: "Your answer is missing something important.".to_string(),
                        hint,
                    });
                }
            }
        }
    }

    RequirementCheck {
        met: missing.is_empty(),
        missing,
    }
}

/// Judge the player's answer to a pending challenge.
///
/// Clears the pending challenge either way. On success the character goes
/// up one level, capped at its last authored level.
pub fn resolve_challenge(
    session: &mut PlayerSession,
    content: &StoryContent,
    character: &Character,
    trigger_ref: TriggerRef,
    response: &str,
) -> ChallengeResolution {
    session.pending_challenge = None;

    let Some(trigger) = trigger_at(character, trigger_ref) else {
        return ChallengeResolution {
            success: false,
            response: DEFAULT_DEFENSIVE_RESPONSE.to_string(),
            missing: Vec::new(),
            evolution: None,
        };
    };

    let check = check_requirements(session, content, trigger, response);
    if !check.met {
        session.log_action(
            "challenge_failed",
            serde_json::json!({
                "character_id": character.character_id,
                "trigger": trigger_ref.to_string(),
            }),
        );
        return ChallengeResolution {
            success: false,
            response: trigger.fail_response.clone(),
            missing: check.missing,
            evolution: None,
        };
    }

    let from = session.character_level(character.character_id);
    let max = character.levels.len().saturating_sub(1) as u32;
    let to = (from + 1).min(max).max(from);
    session.character_levels.insert(character.character_id, to);
    session.log_action(
        "character_evolved",
        serde_json::json!({
            "character_id": character.character_id,
            "trigger": trigger_ref.to_string(),
            "from": from,
            "to": to,
        }),
    );

    ChallengeResolution {
        success: true,
        response: trigger.success_response.clone(),
        missing: Vec::new(),
        evolution: (to > from).then_some((from, to)),
    }
}
