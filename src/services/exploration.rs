//! Walking the location graph.
//!
//! Locations hold areas, areas hold details. What the player can see is
//! gated by exploration levels kept in the session: one per location and
//! one per area. Every function here mutates the session in place and
//! reports back with an [`Outcome`]; persisting is the caller's job.

use std::collections::BTreeSet;

use serde_json::json;

use super::skills::{self, PointsAward};
use super::Outcome;
use crate::models::{Area, AreaDetail, GameObject, Location, PlayerSession, StoryContent};

pub const MAX_EXPLORATION_LEVEL: u32 = 5;

/// Visits after the first that raise an area's level.
const VISITS_PER_LEVEL: u32 = 3;

const COLLECT_POINTS: u32 = 10;
const EXAMINE_POINTS: u32 = 5;
const CLUE_POINTS: u32 = 10;

fn push_award(outcome: &mut Outcome, award: Option<PointsAward>) {
    if let Some(award) = award {
        outcome.note(award.to_string());
    }
}

pub fn is_location_accessible(location: &Location, player_level: u32) -> bool {
    !location.is_locked || player_level >= 1
}

pub fn visible_areas(location: &Location, level: u32) -> Vec<&Area> {
    location
        .areas
        .iter()
        .filter(|a| a.is_visible_at(level))
        .collect()
}

pub fn visible_details(area: &Area, level: u32) -> Vec<&AreaDetail> {
    area.details
        .iter()
        .filter(|d| d.discovery_level_required <= level)
        .collect()
}

pub fn current_location<'a>(
    session: &PlayerSession,
    content: &'a StoryContent,
) -> Option<&'a Location> {
    session
        .current_location_id
        .and_then(|id| content.location(id))
}

pub fn current_area<'a>(session: &PlayerSession, content: &'a StoryContent) -> Option<&'a Area> {
    let location = current_location(session, content)?;
    session.current_area_id.and_then(|id| location.area(id))
}

/// Areas of the current location the player can see right now.
pub fn current_visible_areas<'a>(
    session: &PlayerSession,
    content: &'a StoryContent,
) -> Vec<&'a Area> {
    current_location(session, content)
        .map(|l| visible_areas(l, session.exploration_level(l.location_id)))
        .unwrap_or_default()
}

/// In the inventory, or lying where the player stands.
pub fn within_reach(session: &PlayerSession, object: &GameObject) -> bool {
    if session.has_object(object.object_id) {
        return true;
    }
    session
        .current_location_id
        .is_some_and(|loc| object.is_placed_in(loc, session.current_area_id))
}

/// Move into a location without checking its lock.
pub fn discover_location(
    session: &mut PlayerSession,
    content: &StoryContent,
    location_id: i64,
) -> Outcome {
    let Some(location) = content.location(location_id) else {
        return Outcome::refused("Location not found.");
    };

    session.current_location_id = Some(location_id);
    session.current_area_id = None;
    let is_new = !session.discovered_locations.contains_key(&location_id);
    if is_new {
        session.discovered_locations.insert(location_id, 1);
    }
    session.log_action(
        "discover_location",
        json!({ "location_id": location_id, "is_new": is_new }),
    );

    let mut outcome = Outcome::ok(format!("You enter {}.", location.name))
        .with_description(&location.description);
    if is_new {
        outcome.note(format!("New location discovered: {}", location.name));
    }
    outcome
}

/// Player-initiated move into a location. Locked locations stay shut until
/// the player has some exploration level there.
pub fn enter_location(
    session: &mut PlayerSession,
    content: &StoryContent,
    location_id: i64,
) -> Outcome {
    let Some(location) = content.location(location_id) else {
        return Outcome::refused("Location not found.");
    };
    if !is_location_accessible(location, session.exploration_level(location_id)) {
        let outcome = Outcome::refused(format!("{} is locked.", location.name));
        return match &location.unlock_condition {
            Some(condition) => outcome.with_description(condition),
            None => outcome,
        };
    }
    discover_location(session, content, location_id)
}

pub fn move_to_area(session: &mut PlayerSession, content: &StoryContent, area_id: i64) -> Outcome {
    let Some(location) = current_location(session, content) else {
        return Outcome::refused("You are not in any location.");
    };
    let Some(area) = location.area(area_id) else {
        return Outcome::refused("That area is not part of this location.");
    };
    if !area.is_visible_at(session.exploration_level(location.location_id)) {
        return Outcome::refused("You have not found a way there yet.");
    }
    visit_area(session, content, area_id)
}

/// Stand in an area and count the visit, skipping reachability checks.
///
/// The first visit gives the area level 1; after that every third visit
/// raises it. The owning location's level follows its best area.
pub fn visit_area(session: &mut PlayerSession, content: &StoryContent, area_id: i64) -> Outcome {
    let Some((location, area)) = content.area(area_id) else {
        return Outcome::refused("Area not found.");
    };
    let location_id = location.location_id;

    let visits = session.area_visits.entry(area_id).or_insert(0);
    *visits += 1;
    let visits = *visits;

    let previous = session.area_level(area_id);
    let level = if visits == 1 {
        previous.max(1)
    } else if visits % VISITS_PER_LEVEL == 0 {
        (previous + 1).min(MAX_EXPLORATION_LEVEL)
    } else {
        previous
    };
    session.area_levels.insert(area_id, level);

    let location_level = session.exploration_level(location_id).max(level).max(1);
    session
        .discovered_locations
        .insert(location_id, location_level);
    session.current_location_id = Some(location_id);
    session.current_area_id = Some(area_id);
    session.log_action(
        "enter_area",
        json!({ "location_id": location_id, "area_id": area_id, "visits": visits }),
    );

    let mut outcome =
        Outcome::ok(format!("You move to {}.", area.name)).with_description(&area.description);
    if level > previous && previous > 0 {
        outcome.note(format!(
            "You know {} better now (exploration level {level}).",
            area.name
        ));
    }
    outcome
}

pub fn collect_object(
    session: &mut PlayerSession,
    content: &StoryContent,
    object_id: i64,
) -> Outcome {
    let Some(object) = content.object(object_id) else {
        return Outcome::refused("Object not found.");
    };
    if session.has_object(object_id) {
        return Outcome::ok(format!("You already have {}.", object.name));
    }
    if !object.is_collectible {
        return Outcome::refused(format!("You can't take {}.", object.name));
    }
    let config = &content.header.specialization_config;
    if !skills::can_interact(session, config, skills::OBJECTS, &object_id.to_string()) {
        return Outcome::refused(format!(
            "You don't know how to handle {} yet.",
            object.name
        ));
    }

    session.inventory.push(object_id);
    session.object_levels.entry(object_id).or_insert(0);
    session.log_action("collect_object", json!({ "object_id": object_id }));

    let mut outcome = Outcome::ok(format!("You take {}.", object.name));
    let award = skills::add_points(
        session,
        config,
        skills::COLLECTION,
        COLLECT_POINTS,
        skills::OBJECTS,
        object_id,
    );
    push_award(&mut outcome, award);
    outcome
}

/// Raise an object's level if its next level opens with `trigger`.
/// Returns whether it evolved.
fn evolve_object(
    session: &mut PlayerSession,
    content: &StoryContent,
    object: &GameObject,
    trigger: Option<&str>,
    outcome: &mut Outcome,
) -> bool {
    let current = session.object_level(object.object_id);
    let Some(next) = object.next_level(current, trigger) else {
        return false;
    };
    let level = next.level_number;
    session.object_levels.insert(object.object_id, level);
    session.log_action(
        "object_evolved",
        json!({ "object_id": object.object_id, "from": current, "to": level }),
    );
    outcome.note(format!("You learn more about {} (level {level}).", object.name));

    if let Some(clue_id) = next.related_clue_id {
        let found = discover_clue(session, content, clue_id);
        if found.success {
            outcome.note(found.message.clone());
        }
        outcome.absorb(found);
    }
    true
}

pub fn examine_object(
    session: &mut PlayerSession,
    content: &StoryContent,
    object_id: i64,
    trigger: Option<&str>,
) -> Outcome {
    let Some(object) = content.object(object_id) else {
        return Outcome::refused("Object not found.");
    };

    let mut outcome = Outcome::ok(format!("You examine {}.", object.name));
    evolve_object(session, content, object, trigger, &mut outcome);
    session.log_action(
        "examine_object",
        json!({ "object_id": object_id, "trigger": trigger }),
    );

    let award = skills::add_points(
        session,
        &content.header.specialization_config,
        skills::ANALYSIS,
        EXAMINE_POINTS,
        skills::OBJECT_EXAMINATION,
        object_id,
    );
    push_award(&mut outcome, award);

    outcome.with_description(object.description_at(session.object_level(object_id)))
}

pub fn examine_area(session: &mut PlayerSession, content: &StoryContent, area_id: i64) -> Outcome {
    let Some((location, area)) = content.area(area_id) else {
        return Outcome::refused("Area not found.");
    };

    let location_level = session.exploration_level(location.location_id).max(1);
    session
        .discovered_locations
        .insert(location.location_id, location_level);

    let details = visible_details(area, session.area_level(area_id));
    let mut description = area.description.clone();
    for detail in &details {
        if !description.is_empty() {
            description.push('\n');
        }
        description.push_str(&format!("- {}: {}", detail.name, detail.description));
    }

    let mut outcome = Outcome::ok(format!("You examine {}.", area.name)).with_description(description);
    session.log_action("examine_area", json!({ "area_id": area_id }));

    let award = skills::add_points(
        session,
        &content.header.specialization_config,
        skills::EXPLORATION,
        EXAMINE_POINTS,
        skills::AREA_EXAMINATION,
        area_id,
    );
    push_award(&mut outcome, award);

    let clue_ids: Vec<i64> = details
        .iter()
        .filter(|d| d.has_clue)
        .filter_map(|d| d.clue_id)
        .collect();
    for clue_id in clue_ids {
        if session.has_clue(clue_id) {
            continue;
        }
        let found = discover_clue(session, content, clue_id);
        if found.success {
            outcome.note(found.message.clone());
        }
        outcome.absorb(found);
    }
    outcome
}

pub fn discover_clue(session: &mut PlayerSession, content: &StoryContent, clue_id: i64) -> Outcome {
    let Some(clue) = content.clue(clue_id) else {
        return Outcome::refused("Clue not found.");
    };
    if session.has_clue(clue_id) {
        return Outcome::ok(format!("You already found this clue: {}", clue.name));
    }

    let conditions = &clue.discovery_conditions;
    if let Some(required) = &conditions.specialization_required {
        if session.skill_level(&required.category) < required.level {
            return Outcome::refused(format!(
                "You need {} level {} to make sense of this.",
                required.category, required.level
            ));
        }
    }
    if !conditions
        .required_objects
        .iter()
        .all(|id| session.has_object(*id))
    {
        return Outcome::refused("Something is still missing to understand this clue.");
    }

    session.discovered_clues.push(clue_id);
    session.log_action("discover_clue", json!({ "clue_id": clue_id }));

    let mut outcome =
        Outcome::ok(format!("Clue discovered: {}", clue.name)).with_description(&clue.description);
    let award = skills::add_points(
        session,
        &content.header.specialization_config,
        skills::ANALYSIS,
        CLUE_POINTS,
        skills::CLUES,
        clue_id,
    );
    push_award(&mut outcome, award);
    outcome
}

pub fn combine_objects(
    session: &mut PlayerSession,
    content: &StoryContent,
    object_ids: &[i64],
    combination_id: &str,
    category: &str,
    points: u32,
) -> Outcome {
    if object_ids.len() < 2 {
        return Outcome::refused("You need at least two objects to combine.");
    }
    let distinct: BTreeSet<i64> = object_ids.iter().copied().collect();
    if distinct.len() != object_ids.len() {
        return Outcome::refused("You need two different objects to combine.");
    }
    let mut objects = Vec::with_capacity(object_ids.len());
    for id in object_ids {
        match content.object(*id) {
            Some(object) if session.has_object(*id) => objects.push(object),
            Some(object) => {
                return Outcome::refused(format!("You don't have {}.", object.name));
            }
            None => return Outcome::refused("Object not found."),
        }
    }

    let names: Vec<&str> = objects.iter().map(|o| o.name.as_str()).collect();
    let mut outcome = Outcome::ok(format!("You combine {}.", names.join(" and ")));

    let mut evolved = false;
    for object in &objects {
        for other in objects.iter().filter(|o| o.object_id != object.object_id) {
            let trigger = other.name.to_lowercase();
            if evolve_object(session, content, object, Some(&trigger), &mut outcome) {
                evolved = true;
                break;
            }
        }
    }

    session.log_action(
        "combine_objects",
        json!({
            "object_ids": object_ids,
            "combination_id": combination_id,
            "category_id": category,
            "points": points,
        }),
    );
    let award = skills::add_points(
        session,
        &content.header.specialization_config,
        category,
        points,
        skills::COMBINATIONS,
        combination_id,
    );
    if award.is_none() && !evolved {
        outcome.description = Some("Nothing new comes of it.".to_string());
    }
    push_award(&mut outcome, award);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Clue, ClueDiscoveryConditions, ObjectLevel, SkillRequirement};

    fn area(id: i64, required: u32) -> Area {
        Area {
            area_id: id,
            name: format!("Area {id}"),
            description: String::new(),
            initially_visible: true,
            connected_areas: Vec::new(),
            discovery_level_required: required,
            details: vec![
                AreaDetail {
                    detail_id: id * 10,
                    name: "Scratches".into(),
                    description: "Fresh scratches on the floor".into(),
                    discovery_level_required: 0,
                    has_clue: true,
                    clue_id: Some(1),
                },
                AreaDetail {
                    detail_id: id * 10 + 1,
                    name: "Loose board".into(),
                    description: "A board that moves".into(),
                    discovery_level_required: 2,
                    has_clue: false,
                    clue_id: None,
                },
            ],
        }
    }

    fn content() -> StoryContent {
        let mut content = StoryContent::default();
        content.header.story_id = "manor".into();
        content.locations = vec![
            Location {
                story_id: "manor".into(),
                location_id: 1,
                name: "Hall".into(),
                description: "A dusty hall".into(),
                is_locked: false,
                unlock_condition: None,
                navigation_map: None,
                is_starting_location: true,
                areas: vec![area(10, 0), area(11, 2)],
            },
            Location {
                story_id: "manor".into(),
                location_id: 2,
                name: "Cellar".into(),
                description: String::new(),
                is_locked: true,
                unlock_condition: Some("Find the cellar key".into()),
                navigation_map: None,
                is_starting_location: false,
                areas: Vec::new(),
            },
        ];
        content.objects = vec![GameObject {
            object_id: 5,
            name: "Letter".into(),
            base_description: "A sealed letter".into(),
            is_collectible: true,
            initial_location_id: Some(1),
            initial_area_id: Some(10),
            levels: vec![
                ObjectLevel {
                    level_number: 1,
                    level_description: "The seal is broken".into(),
                    ..Default::default()
                },
                ObjectLevel {
                    level_number: 2,
                    level_description: "Written in a shaky hand".into(),
                    evolution_trigger: Some("candle".into()),
                    related_clue_id: Some(2),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }];
        content.clues = vec![
            Clue {
                clue_id: 1,
                name: "Scratches".into(),
                ..Default::default()
            },
            Clue {
                clue_id: 2,
                name: "Shaky hand".into(),
                discovery_conditions: ClueDiscoveryConditions {
                    specialization_required: Some(SkillRequirement {
                        category: skills::ANALYSIS.into(),
                        level: 1,
                    }),
                    required_objects: vec![5],
                },
                ..Default::default()
            },
        ];
        content
    }

    #[test]
    fn test_locked_location_refuses_until_explored() {
        let content = content();
        let mut session = PlayerSession::new("manor", "Ana");

        let outcome = enter_location(&mut session, &content, 2);
        assert!(!outcome.success);
        assert_eq!(outcome.description.as_deref(), Some("Find the cellar key"));

        let outcome = discover_location(&mut session, &content, 2);
        assert!(outcome.success);
        assert_eq!(session.current_location_id, Some(2));

        discover_location(&mut session, &content, 1);
        assert!(enter_location(&mut session, &content, 2).success);
    }

    #[test]
    fn test_unknown_location_is_refused() {
        let mut session = PlayerSession::new("manor", "Ana");
        let outcome = discover_location(&mut session, &content(), 99);
        assert!(!outcome.success);
        assert_eq!(session.current_location_id, None);
    }

    #[test]
    fn test_revisits_raise_area_and_location_levels() {
        let content = content();
        let mut session = PlayerSession::new("manor", "Ana");
        discover_location(&mut session, &content, 1);

        assert!(!move_to_area(&mut session, &content, 11).success);

        assert!(move_to_area(&mut session, &content, 10).success);
        assert_eq!(session.area_level(10), 1);
        move_to_area(&mut session, &content, 10);
        assert_eq!(session.area_level(10), 1);
        let outcome = move_to_area(&mut session, &content, 10);
        assert_eq!(session.area_level(10), 2);
        assert_eq!(outcome.notes.len(), 1);
        assert_eq!(session.exploration_level(1), 2);

        assert!(move_to_area(&mut session, &content, 11).success);
    }

    #[test]
    fn test_area_level_caps_at_max() {
        let content = content();
        let mut session = PlayerSession::new("manor", "Ana");
        discover_location(&mut session, &content, 1);
        for _ in 0..40 {
            move_to_area(&mut session, &content, 10);
        }
        assert_eq!(session.area_level(10), MAX_EXPLORATION_LEVEL);
    }

    #[test]
    fn test_collect_awards_points_once() {
        let content = content();
        let mut session = PlayerSession::new("manor", "Ana");

        let outcome = collect_object(&mut session, &content, 5);
        assert!(outcome.success);
        assert_eq!(outcome.notes, vec!["+10 coleta (level 1 reached)".to_string()]);

        let again = collect_object(&mut session, &content, 5);
        assert!(again.success);
        assert!(again.message.contains("already have"));
        assert!(again.notes.is_empty());
        assert_eq!(session.inventory, vec![5]);
    }

    #[test]
    fn test_within_reach_uses_area_pin() {
        let content = content();
        let mut session = PlayerSession::new("manor", "Ana");
        let letter = content.object(5).unwrap();
        discover_location(&mut session, &content, 1);
        assert!(!within_reach(&session, letter));
        move_to_area(&mut session, &content, 10);
        assert!(within_reach(&session, letter));
    }

    #[test]
    fn test_examine_object_evolves_and_reveals_clue() {
        let content = content();
        let mut session = PlayerSession::new("manor", "Ana");
        collect_object(&mut session, &content, 5);

        let outcome = examine_object(&mut session, &content, 5, None);
        assert_eq!(session.object_level(5), 1);
        assert_eq!(outcome.description.as_deref(), Some("The seal is broken"));

        examine_object(&mut session, &content, 5, Some("salt"));
        assert_eq!(session.object_level(5), 1);

        let outcome = examine_object(&mut session, &content, 5, Some("Candle"));
        assert_eq!(session.object_level(5), 2);
        assert!(session.has_clue(2));
        assert!(outcome.notes.iter().any(|n| n == "Clue discovered: Shaky hand"));
    }

    #[test]
    fn test_clue_conditions_are_checked() {
        let content = content();
        let mut session = PlayerSession::new("manor", "Ana");
        assert!(!discover_clue(&mut session, &content, 2).success);

        session.specialization_levels.insert(skills::ANALYSIS.into(), 1);
        assert!(!discover_clue(&mut session, &content, 2).success);

        session.inventory.push(5);
        assert!(discover_clue(&mut session, &content, 2).success);
        assert_eq!(session.specialization_points[skills::ANALYSIS], 10);
    }

    #[test]
    fn test_examine_area_reveals_visible_detail_clues() {
        let content = content();
        let mut session = PlayerSession::new("manor", "Ana");
        let outcome = examine_area(&mut session, &content, 10);
        assert!(outcome.success);
        assert!(session.has_clue(1));
        let description = outcome.description.unwrap();
        assert!(description.contains("Scratches"));
        assert!(!description.contains("Loose board"));
        assert_eq!(session.exploration_level(1), 1);
    }

    #[test]
    fn test_combine_requires_inventory() {
        let mut content = content();
        content.objects.push(GameObject {
            object_id: 6,
            name: "Candle".into(),
            is_collectible: true,
            ..Default::default()
        });
        let mut session = PlayerSession::new("manor", "Ana");
        session.inventory.push(5);
        assert!(!combine_objects(&mut session, &content, &[5, 6], "5_6", skills::ANALYSIS, 15).success);

        let same = combine_objects(&mut session, &content, &[5, 5], "5_5", skills::ANALYSIS, 15);
        assert!(!same.success);
        assert_eq!(same.message, "You need two different objects to combine.");
        assert!(session.specialization_points.get(skills::ANALYSIS).is_none());

        session.inventory.push(6);
        session.object_levels.insert(5, 1);
        let outcome = combine_objects(&mut session, &content, &[5, 6], "5_6", skills::ANALYSIS, 15);
        assert!(outcome.success);
        assert_eq!(session.object_level(5), 2);

        let again = combine_objects(&mut session, &content, &[5, 6], "5_6", skills::ANALYSIS, 15);
        assert_eq!(again.description.as_deref(), Some("Nothing new comes of it."));
    }
}
