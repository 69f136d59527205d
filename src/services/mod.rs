pub mod content;
pub mod dialogue;
pub mod exploration;
pub mod game;
pub mod hints;
pub mod progress;
pub mod qrcode;
pub mod skills;
pub mod solution;
pub mod triggers;
pub mod upload;

pub use content::{ContentService, CONTENT_CACHE_TTL_SECS};
pub use dialogue::{clean_response, DialogueReply, DialogueService, ReplyKind};
pub use game::{characters_here, held_objects, objects_here, GameService, GameStatusView};
pub use hints::{hints, progress, Hint, HintType, ProgressReport};
pub use progress::{noop_progress, NoopProgressReporter, ProgressReporter};
pub use qrcode::{scan, ScanOutcome};
pub use skills::{add_points, can_interact, check_requirement, level_for, PointsAward};
pub use solution::{submit_solution, Accusation, Verdict};
pub use triggers::{check_requirements, check_triggers, RequirementCheck, TriggerMatch};
pub use upload::{load_story_dir, ConflictMode, UploadResult, UploadService, UploadTypeResult};

use serde::Serialize;

/// Result of a player action.
///
/// Refusals ("that door is locked") are ordinary outcomes with
/// `success == false`, not errors. `notes` carries side effects worth
/// telling the player about: points earned, clues found, levels reached.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Outcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        if !description.trim().is_empty() {
            self.description = Some(description);
        }
        self
    }

    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Fold another outcome's notes into this one.
    pub fn absorb(&mut self, other: Outcome) {
        self.notes.extend(other.notes);
    }
}
