//! Test data builders for story content.
//!
//! Provides fluent API for creating test documents with sensible defaults,
//! plus the "manor" fixture most integration tests play through.

use std::path::Path;

use enigma_hunter::models::{
    AccessRequirements, Area, AreaDetail, Character, CharacterLevel, Clue, EvolutionTrigger,
    GameObject, Location, ObjectLevel, QrAction, QrCode, RequirementType, SolutionCriteria,
    StoryContent, StoryHeader, TriggerRequirement,
};

/// Builder for creating test locations.
pub struct LocationBuilder {
    location: Location,
}

impl LocationBuilder {
    pub fn new(location_id: i64, name: impl Into<String>) -> Self {
        Self {
            location: Location {
                story_id: String::new(),
                location_id,
                name: name.into(),
                description: String::new(),
                is_locked: false,
                unlock_condition: None,
                navigation_map: None,
                is_starting_location: false,
                areas: Vec::new(),
            },
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.location.description = desc.into();
        self
    }

    pub fn starting(mut self) -> Self {
        self.location.is_starting_location = true;
        self
    }

    /// Lock the location, with the text shown when the player is turned away.
    pub fn locked(mut self, condition: impl Into<String>) -> Self {
        self.location.is_locked = true;
        self.location.unlock_condition = Some(condition.into());
        self
    }

    pub fn area(mut self, area: Area) -> Self {
        self.location.areas.push(area);
        self
    }

    pub fn build(self) -> Location {
        self.location
    }
}

/// Builder for creating test areas.
pub struct AreaBuilder {
    area: Area,
}

impl AreaBuilder {
    pub fn new(area_id: i64, name: impl Into<String>) -> Self {
        Self {
            area: Area {
                area_id,
                name: name.into(),
                description: String::new(),
                initially_visible: true,
                connected_areas: Vec::new(),
                discovery_level_required: 0,
                details: Vec::new(),
            },
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.area.description = desc.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.area.initially_visible = false;
        self
    }

    /// Add a detail visible from level 0 that may reveal a clue.
    pub fn detail(mut self, detail_id: i64, name: impl Into<String>, clue_id: Option<i64>) -> Self {
        self.area.details.push(AreaDetail {
            detail_id,
            name: name.into(),
            description: String::new(),
            discovery_level_required: 0,
            has_clue: clue_id.is_some(),
            clue_id,
        });
        self
    }

    pub fn build(self) -> Area {
        self.area
    }
}

/// Builder for creating test characters.
pub struct CharacterBuilder {
    character: Character,
}

impl CharacterBuilder {
    pub fn new(character_id: i64, name: impl Into<String>) -> Self {
        Self {
            character: Character {
                character_id,
                name: name.into(),
                ..Default::default()
            },
        }
    }

    /// Place the character in a location, optionally pinned to an area.
    pub fn at(mut self, location_id: i64, area_id: Option<i64>) -> Self {
        self.character.location_id = Some(location_id);
        self.character.area_id = area_id;
        self
    }

    pub fn culprit(mut self, motive: impl Into<String>) -> Self {
        self.character.is_culprit = true;
        self.character.motive = Some(motive.into());
        self
    }

    pub fn level(mut self, defensive: bool, triggers: Vec<EvolutionTrigger>) -> Self {
        let level_number = self.character.levels.len() as u32;
        self.character.levels.push(CharacterLevel {
            level_number,
            knowledge_scope: format!("What {} knows at stage {level_number}", self.character.name),
            narrative_stance: if defensive { "guarded" } else { "open" }.to_string(),
            is_defensive: defensive,
            triggers,
            ..Default::default()
        });
        self
    }

    pub fn build(self) -> Character {
        self.character
    }
}

/// Builder for creating test objects.
pub struct ObjectBuilder {
    object: GameObject,
}

impl ObjectBuilder {
    pub fn new(object_id: i64, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            object: GameObject {
                object_id,
                base_description: format!("A plain {}", name.to_lowercase()),
                name,
                ..Default::default()
            },
        }
    }

    pub fn collectible(mut self) -> Self {
        self.object.is_collectible = true;
        self
    }

    pub fn at(mut self, location_id: i64, area_id: Option<i64>) -> Self {
        self.object.initial_location_id = Some(location_id);
        self.object.initial_area_id = area_id;
        self
    }

    /// Add the next knowledge level, opened by `trigger` if given.
    pub fn level(
        mut self,
        description: impl Into<String>,
        trigger: Option<&str>,
        clue_id: Option<i64>,
    ) -> Self {
        let level_number = self.object.levels.len() as u32 + 1;
        self.object.levels.push(ObjectLevel {
            level_number,
            level_description: description.into(),
            evolution_trigger: trigger.map(String::from),
            related_clue_id: clue_id,
            ..Default::default()
        });
        self
    }

    pub fn build(self) -> GameObject {
        self.object
    }
}

pub fn clue(clue_id: i64, name: &str, key_evidence: bool) -> Clue {
    Clue {
        clue_id,
        name: name.to_string(),
        description: format!("{name}, noted in your casebook"),
        is_key_evidence: key_evidence,
        ..Default::default()
    }
}

pub fn qr(uuid: &str, action: QrAction, target_type: &str, target_id: i64) -> QrCode {
    QrCode {
        story_id: String::new(),
        uuid: uuid.to_string(),
        target_type: target_type.to_string(),
        target_id,
        action,
        parameters: None,
        access_requirements: AccessRequirements::default(),
        location_requirement: None,
    }
}

/// Trigger that asks the player to show an object.
pub fn object_trigger(keyword: &str, question: &str, object_id: i64) -> EvolutionTrigger {
    EvolutionTrigger {
        trigger_keyword: keyword.to_string(),
        defensive_response: Some("I'd rather not talk about that.".to_string()),
        challenge_question: Some(question.to_string()),
        success_response: "Fine. I wrote it myself.".to_string(),
        fail_response: "I know nothing about it.".to_string(),
        requirements: vec![TriggerRequirement {
            requirement_type: RequirementType::Object,
            required_object_id: Some(object_id),
            hint_if_incorrect: Some("Maybe there is something to show".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    }
}

/// A two-room mystery.
///
/// - Foyer (1, start): Hall (10) with the coat rack clue, Hidden Closet (11)
///   never visible on foot.
/// - Study (2, locked): Desk (20) where Lady Agatha waits.
/// - Sebastian (1) roams the Foyer and gets defensive about the letter.
/// - Letter (3) in the Hall reveals the rewritten will when examined.
/// - Vase (4) is fixed in place; Magnifier (5) lies anywhere in the Foyer.
pub fn manor_story() -> StoryContent {
    let mut guarded = qr("qr-magnifier", QrAction::Collect, "object", 5);
    guarded.access_requirements.required_objects = vec![3];

    StoryContent {
        header: StoryHeader {
            title: "The Manor Affair".to_string(),
            description: "Murder at Blackwood Manor".to_string(),
            introduction: "Thunder rolls over Blackwood Manor.".to_string(),
            conclusion: "Lady Agatha is led away in the rain.".to_string(),
            difficulty_level: 2,
            solution_criteria: SolutionCriteria {
                culprit_id: Some(2),
                method_keywords: vec!["poison".to_string()],
                motive_keywords: vec!["inheritance".to_string(), "will".to_string()],
            },
            ..Default::default()
        },
        locations: vec![
            LocationBuilder::new(1, "Foyer")
                .starting()
                .description("A cold marble foyer.")
                .area(
                    AreaBuilder::new(10, "Hall")
                        .description("Portraits line the walls.")
                        .detail(100, "Coat rack", Some(1))
                        .build(),
                )
                .area(AreaBuilder::new(11, "Hidden Closet").hidden().build())
                .build(),
            LocationBuilder::new(2, "Study")
                .locked("The study door needs a key.")
                .area(AreaBuilder::new(20, "Desk").build())
                .build(),
        ],
        characters: vec![
            CharacterBuilder::new(1, "Sebastian")
                .at(1, None)
                .level(
                    true,
                    vec![object_trigger("letter", "What letter do you mean?", 3)],
                )
                .level(false, Vec::new())
                .build(),
            CharacterBuilder::new(2, "Lady Agatha")
                .at(2, Some(20))
                .culprit("The inheritance")
                .level(true, Vec::new())
                .build(),
        ],
        objects: vec![
            ObjectBuilder::new(3, "Letter")
                .collectible()
                .at(1, Some(10))
                .level("The letter mentions a new will.", None, Some(2))
                .build(),
            ObjectBuilder::new(4, "Vase").at(1, Some(10)).build(),
            ObjectBuilder::new(5, "Magnifier").collectible().at(1, None).build(),
        ],
        clues: vec![
            clue(1, "Muddy coat", true),
            clue(2, "Rewritten will", true),
            clue(3, "Broken glass", false),
        ],
        qr_codes: vec![
            qr("qr-study", QrAction::Enter, "location", 2),
            qr("qr-agatha", QrAction::Talk, "character", 2),
            qr("qr-closet", QrAction::Explore, "area", 11),
            guarded,
        ],
        templates: Vec::new(),
    }
}

fn write_json(path: &Path, value: &impl serde::Serialize) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create story directory");
    }
    let text = serde_json::to_string_pretty(value).expect("serialize fixture");
    std::fs::write(path, text).expect("write fixture file");
}

/// Lay a story out on disk the way authors ship it.
pub fn write_story_dir(dir: &Path, content: &StoryContent) {
    write_json(&dir.join("historia_base.json"), &content.header);
    for location in &content.locations {
        write_json(
            &dir.join(format!("ambientes/Ambiente_{}.json", location.location_id)),
            location,
        );
    }
    for character in &content.characters {
        write_json(
            &dir.join(format!("personagens/Personagem_{}.json", character.character_id)),
            character,
        );
    }
    write_json(&dir.join("data/objetos.json"), &content.objects);
    write_json(&dir.join("data/pistas.json"), &content.clues);
    write_json(&dir.join("data/qrcodes.json"), &content.qr_codes);
    write_json(
        &dir.join("data/sistema-especializacao.json"),
        &content.header.specialization_config,
    );
}
