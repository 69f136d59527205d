//! Specialization points and levels.
//!
//! Players earn points in a category (`coleta`, `analise`, `exploracao`, ...)
//! by interacting with the story. Each `(interaction type, interaction id)`
//! pair pays out once per session; levels follow from the story's
//! thresholds.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::models::{PlayerSession, SpecializationConfig};

pub const COLLECTION: &str = "coleta";
pub const ANALYSIS: &str = "analise";
pub const EXPLORATION: &str = "exploracao";

pub const OBJECTS: &str = "objetos";
pub const OBJECT_EXAMINATION: &str = "exame_objeto";
pub const AREA_EXAMINATION: &str = "exame_area";
pub const AREAS: &str = "areas";
pub const CLUES: &str = "pistas";
pub const COMBINATIONS: &str = "combinacoes";

/// `(level, min_points)` used for categories the story does not configure.
const FALLBACK_THRESHOLDS: [(u32, u32); 5] = [(1, 0), (2, 20), (3, 50), (4, 100), (5, 200)];

/// Points granted for one interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointsAward {
    pub category: String,
    pub points: u32,
    pub total: u32,
    pub level: u32,
    pub evolved: bool,
}

impl fmt::Display for PointsAward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{} {}", self.points, self.category)?;
        if self.evolved {
            write!(f, " (level {} reached)", self.level)?;
        }
        Ok(())
    }
}

/// Level earned by `points` in `category`.
///
/// The highest configured level whose threshold is at or below `points`,
/// 0 if none is. Categories missing from the config use
/// [`FALLBACK_THRESHOLDS`].
pub fn level_for(config: &SpecializationConfig, category: &str, points: u32) -> u32 {
    let highest = |thresholds: &[(u32, u32)]| {
        thresholds
            .iter()
            .filter(|(_, min)| points >= *min)
            .map(|(level, _)| *level)
            .max()
            .unwrap_or(0)
    };

    match config.category(category) {
        Some(cat) => highest(&cat.thresholds()),
        None => highest(&FALLBACK_THRESHOLDS),
    }
}

/// Award points for an interaction unless it already paid out.
///
/// Returns `None` when the `(interaction_type, interaction_id)` pair was
/// rewarded before.
pub fn add_points(
    session: &mut PlayerSession,
    config: &SpecializationConfig,
    category: &str,
    points: u32,
    interaction_type: &str,
    interaction_id: impl fmt::Display,
) -> Option<PointsAward> {
    let interaction_id = interaction_id.to_string();
    let completed = session
        .completed_interactions
        .entry(interaction_type.to_string())
        .or_default();
    if !completed.insert(interaction_id.clone()) {
        return None;
    }

    let previous_level = session.skill_level(category);
    let total = session
        .specialization_points
        .entry(category.to_string())
        .or_insert(0);
    *total += points;
    let total = *total;

    let level = level_for(config, category, total);
    session
        .specialization_levels
        .insert(category.to_string(), level);

    session.log_action(
        "add_specialization",
        serde_json::json!({
            "category_id": category,
            "points_added": points,
            "new_points": total,
            "previous_level": previous_level,
            "new_level": level,
            "interaction_type": interaction_type,
            "interaction_id": interaction_id,
        }),
    );

    Some(PointsAward {
        category: category.to_string(),
        points,
        total,
        level,
        evolved: level > previous_level,
    })
}

/// Categories below the required level, as `(category, required, current)`.
pub fn shortfalls(
    session: &PlayerSession,
    requirements: &BTreeMap<String, u32>,
) -> Vec<(String, u32, u32)> {
    requirements
        .iter()
        .filter_map(|(category, required)| {
            let current = session.skill_level(category);
            (current < *required).then(|| (category.clone(), *required, current))
        })
        .collect()
}

pub fn check_requirement(session: &PlayerSession, requirements: &BTreeMap<String, u32>) -> bool {
    shortfalls(session, requirements).is_empty()
}

/// Whether the story's `interacoes` table lets the player do this.
pub fn can_interact(
    session: &PlayerSession,
    config: &SpecializationConfig,
    interaction_type: &str,
    interaction_id: &str,
) -> bool {
    config
        .interaction_requirement(interaction_type, interaction_id)
        .is_none_or(|req| check_requirement(session, req))
}
