//! QR code scans.
//!
//! A printed code stands for physical presence: scanning one skips the
//! lock and visibility checks the REPL applies, but each code can carry its
//! own access requirements.

use serde::Serialize;
use serde_json::json;

use super::exploration::{
    collect_object, discover_clue, discover_location, examine_area, examine_object, visit_area,
};
use super::skills::{self, shortfalls};
use super::Outcome;
use crate::models::{PlayerSession, QrAction, QrCode, StoryContent};

const EXPLORE_POINTS: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanOutcome {
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Set by `talk` codes: the character to open a conversation with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_dialogue: Option<i64>,
}

impl From<Outcome> for ScanOutcome {
    fn from(outcome: Outcome) -> Self {
        Self {
            outcome,
            start_dialogue: None,
        }
    }
}

/// Reason the scan is refused, if any.
fn check_access(session: &PlayerSession, content: &StoryContent, qr: &QrCode) -> Option<String> {
    let requirements = &qr.access_requirements;

    let required_location = requirements
        .current_location_id
        .or(qr.location_requirement);
    if let Some(location_id) = required_location {
        if session.current_location_id != Some(location_id) {
            let name = content
                .location(location_id)
                .map(|l| l.name.as_str())
                .unwrap_or("another location");
            return Some(format!("You need to be in {name} to use this code."));
        }
    }

    if let Some((category, required, _)) = shortfalls(session, &requirements.specialization_required)
        .into_iter()
        .next()
    {
        return Some(format!(
            "You need {category} level {required} to use this code."
        ));
    }

    if let Some(missing) = requirements
        .required_objects
        .iter()
        .find(|id| !session.has_object(**id))
    {
        let name = content
            .object(*missing)
            .map(|o| o.name.clone())
            .unwrap_or_else(|| format!("object {missing}"));
        return Some(format!("You need {name} to use this code."));
    }

    None
}

pub fn scan(session: &mut PlayerSession, content: &StoryContent, uuid: &str) -> ScanOutcome {
    let Some(qr) = content.qr_code(uuid.trim()) else {
        return Outcome::refused("Invalid QR code.").into();
    };
    if let Some(reason) = check_access(session, content, qr) {
        return Outcome::refused(reason).into();
    }

    if !session.scanned_qr_codes.iter().any(|s| s == &qr.uuid) {
        session.scanned_qr_codes.push(qr.uuid.clone());
    }
    session.log_action(
        "scan_qr",
        json!({
            "uuid": qr.uuid,
            "action": qr.action,
            "target_type": qr.target_type,
            "target_id": qr.target_id,
        }),
    );

    match &qr.action {
        QrAction::Enter => discover_location(session, content, qr.target_id).into(),
        QrAction::Explore => explore(session, content, qr.target_id).into(),
        QrAction::Talk => match content.character(qr.target_id) {
            Some(character) => ScanOutcome {
                outcome: Outcome::ok(format!("You approach {}.", character.name)),
                start_dialogue: Some(character.character_id),
            },
            None => Outcome::refused("Character not found.").into(),
        },
        QrAction::Collect => collect_object(session, content, qr.target_id).into(),
        QrAction::Examine => match qr.target_type.as_str() {
            "object" => examine_object(session, content, qr.target_id, None).into(),
            "area" => examine_area(session, content, qr.target_id).into(),
            "clue" => discover_clue(session, content, qr.target_id).into(),
            other => Outcome::refused(format!("Unsupported examination target: {other}")).into(),
        },
        QrAction::Other(action) => Outcome::refused(format!("Unsupported action: {action}")).into(),
    }
}

fn explore(session: &mut PlayerSession, content: &StoryContent, area_id: i64) -> Outcome {
    let Some((location, _)) = content.area(area_id) else {
        return Outcome::refused("Area not found.");
    };
    let mut notes = Vec::new();
    if session.current_location_id != Some(location.location_id) {
        notes = discover_location(session, content, location.location_id).notes;
    }

    let mut outcome = visit_area(session, content, area_id);
    notes.append(&mut outcome.notes);
    outcome.notes = notes;

    if let Some(award) = skills::add_points(
        session,
        &content.header.specialization_config,
        skills::EXPLORATION,
        EXPLORE_POINTS,
        skills::AREAS,
        area_id,
    ) {
        outcome.note(award.to_string());
    }
    outcome
}
