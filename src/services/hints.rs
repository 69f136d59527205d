//! Completion percentage and contextual hints.

use serde::Serialize;

use super::exploration::current_visible_areas;
use crate::models::{PlayerSession, StoryContent};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProgressReport {
    pub locations_discovered: usize,
    pub locations_total: usize,
    pub clues_discovered: usize,
    pub clues_total: usize,
    pub locations_percent: f64,
    pub clues_percent: f64,
    /// Mean of the two percentages.
    pub overall_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HintType {
    Exploration,
    Object,
    Character,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hint {
    pub hint_type: HintType,
    pub hint_level: u32,
    pub hint_text: String,
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub fn progress(session: &PlayerSession, content: &StoryContent) -> ProgressReport {
    let locations_discovered = session
        .discovered_locations
        .keys()
        .filter(|id| content.location(**id).is_some())
        .count();
    let clues_discovered = session
        .discovered_clues
        .iter()
        .filter(|id| content.clue(**id).is_some())
        .count();
    let locations_percent = percent(locations_discovered, content.locations.len());
    let clues_percent = percent(clues_discovered, content.clues.len());

    ProgressReport {
        locations_discovered,
        locations_total: content.locations.len(),
        clues_discovered,
        clues_total: content.clues.len(),
        locations_percent,
        clues_percent,
        overall_percent: (locations_percent + clues_percent) / 2.0,
    }
}

pub fn hints(session: &PlayerSession, content: &StoryContent) -> Vec<Hint> {
    let mut hints = Vec::new();

    let unexplored = current_visible_areas(session, content)
        .into_iter()
        .filter(|a| !session.area_visits.contains_key(&a.area_id))
        .count();
    if unexplored > 0 {
        hints.push(Hint {
            hint_type: HintType::Exploration,
            hint_level: 1,
            hint_text: format!(
                "There {} {unexplored} area{} here you have not explored yet.",
                if unexplored == 1 { "is" } else { "are" },
                if unexplored == 1 { "" } else { "s" },
            ),
        });
    }

    if let (Some(location_id), Some(area_id)) = (session.current_location_id, session.current_area_id)
    {
        let loose = content
            .objects_in(location_id, Some(area_id))
            .into_iter()
            .filter(|o| o.is_collectible && !session.has_object(o.object_id))
            .count();
        if loose > 0 {
            hints.push(Hint {
                hint_type: HintType::Object,
                hint_level: 1,
                hint_text: format!(
                    "There {} {loose} object{} worth a closer look in this area.",
                    if loose == 1 { "is" } else { "are" },
                    if loose == 1 { "" } else { "s" },
                ),
            });
        }
    }

    if session.character_levels.values().any(|level| *level < 2) {
        hints.push(Hint {
            hint_type: HintType::Character,
            hint_level: 2,
            hint_text: "Some characters may know more than they have told you. Try presenting \
                        relevant evidence during your conversations."
                .to_string(),
        });
    }

    hints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Area, Clue, GameObject, Location};

    fn content() -> StoryContent {
        let mut content = StoryContent::default();
        let area = |id: i64| Area {
            area_id: id,
            name: format!("Area {id}"),
            description: String::new(),
            initially_visible: true,
            connected_areas: Vec::new(),
            discovery_level_required: 0,
            details: Vec::new(),
        };
        content.locations = (1..=4)
            .map(|id| Location {
                story_id: "manor".into(),
                location_id: id,
                name: format!("Location {id}"),
                description: String::new(),
                is_locked: false,
                unlock_condition: None,
                navigation_map: None,
                is_starting_location: id == 1,
                areas: if id == 1 { vec![area(10), area(11)] } else { Vec::new() },
            })
            .collect();
        content.clues = (1..=2)
            .map(|id| Clue {
                clue_id: id,
                name: format!("Clue {id}"),
                ..Default::default()
            })
            .collect();
        content.objects = vec![GameObject {
            object_id: 8,
            name: "Glove".into(),
            is_collectible: true,
            initial_location_id: Some(1),
            initial_area_id: Some(10),
            ..Default::default()
        }];
        content
    }

    #[test]
    fn test_progress_averages_locations_and_clues() {
        let content = content();
        let mut session = PlayerSession::new("manor", "Ana");
        session.discovered_locations.insert(1, 1);
        session.discovered_clues.push(2);

        let report = progress(&session, &content);
        assert_eq!(report.locations_percent, 25.0);
        assert_eq!(report.clues_percent, 50.0);
        assert_eq!(report.overall_percent, 37.5);
        assert_eq!(progress(&session, &StoryContent::default()).overall_percent, 0.0);
    }

    #[test]
    fn test_hints_follow_player_position() {
        let content = content();
        let mut session = PlayerSession::new("manor", "Ana");
        assert!(hints(&session, &content).is_empty());

        session.current_location_id = Some(1);
        session.discovered_locations.insert(1, 1);
        session.current_area_id = Some(10);
        session.area_visits.insert(10, 1);
        session.character_levels.insert(3, 0);

        let found = hints(&session, &content);
        let types: Vec<HintType> = found.iter().map(|h| h.hint_type).collect();
        assert_eq!(
            types,
            vec![HintType::Exploration, HintType::Object, HintType::Character]
        );
        assert_eq!(
            found[0].hint_text,
            "There is 1 area here you have not explored yet."
        );

        session.inventory.push(8);
        session.area_visits.insert(11, 1);
        session.character_levels.insert(3, 2);
        assert!(hints(&session, &content).is_empty());
    }
}
