//! Accusations.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{GameStatus, PlayerSession, SolutionAttempt, StoryContent};
use crate::EnigmaError;

/// The player's theory of the case.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Accusation {
    pub accused_character_id: i64,
    pub method: String,
    pub motive: String,
    #[serde(default)]
    pub evidence: Vec<i64>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Verdict {
    pub correct: bool,
    pub culprit_correct: bool,
    pub method_correct: bool,
    pub motive_correct: bool,
    pub evidence_correct: bool,
    pub feedback: Vec<String>,
    /// Story conclusion, revealed once the case is solved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
}

/// Any keyword present in `text`. An empty keyword list accepts anything.
fn mentions_any(text: &str, keywords: &[String]) -> bool {
    let text = text.to_lowercase();
    let mut keywords = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .peekable();
    keywords.peek().is_none() || keywords.any(|k| text.contains(&k.to_lowercase()))
}

/// Judge an accusation and record it in the session.
///
/// Key evidence only counts once discovered: the player must present every
/// key clue they have found, not every key clue in the story.
pub fn submit_solution(
    session: &mut PlayerSession,
    content: &StoryContent,
    accusation: Accusation,
) -> Result<Verdict, EnigmaError> {
    let criteria = &content.header.solution_criteria;
    let Some(culprit_id) = criteria.culprit_id else {
        return Err(EnigmaError::Validation(format!(
            "Story '{}' has no solution criteria",
            content.story_id()
        )));
    };

    let culprit_correct = accusation.accused_character_id == culprit_id;
    let method_correct = mentions_any(&accusation.method, &criteria.method_keywords);
    let motive_correct = mentions_any(&accusation.motive, &criteria.motive_keywords);
    let evidence_correct = content
        .key_evidence()
        .filter(|c| session.has_clue(c.clue_id))
        .all(|c| accusation.evidence.contains(&c.clue_id));
    let correct = culprit_correct && method_correct && motive_correct && evidence_correct;

    let mut feedback = Vec::new();
    if correct {
        feedback.push("Congratulations! Your solution is correct in every respect.".to_string());
    } else {
        if !culprit_correct {
            feedback.push("You did not identify the culprit.".to_string());
        }
        if !method_correct {
            feedback.push("Your account of how the crime was committed is off.".to_string());
        }
        if !motive_correct {
            feedback.push("Your motive misses the heart of the case.".to_string());
        }
        if !evidence_correct {
            feedback.push(
                "You did not present all the key evidence needed to back your theory.".to_string(),
            );
        }
        feedback.push("Keep investigating and review the clues you found.".to_string());
    }

    session.solutions.push(SolutionAttempt {
        accused_character_id: accusation.accused_character_id,
        method: accusation.method.clone(),
        motive: accusation.motive.clone(),
        evidence: accusation.evidence.clone(),
        is_correct: correct,
        submitted_at: Utc::now(),
    });
    session.log_action(
        "submit_solution",
        serde_json::json!({
            "accused_character_id": accusation.accused_character_id,
            "culprit_correct": culprit_correct,
            "method_correct": method_correct,
            "motive_correct": motive_correct,
            "evidence_correct": evidence_correct,
        }),
    );
    if correct {
        session.game_status = GameStatus::Solved;
    }

    Ok(Verdict {
        correct,
        culprit_correct,
        method_correct,
        motive_correct,
        evidence_correct,
        feedback,
        conclusion: correct
            .then(|| content.header.conclusion.clone())
            .filter(|c| !c.is_empty()),
    })
}
