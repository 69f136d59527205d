//! Prompt templates for generated dialogue and narration.
//!
//! Templates use `{variable}` placeholders. Every story gets the built-in
//! templates at upload time; a story may override one by shipping a file in
//! `prompts/` with the same `template_name`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::db::connection::GameDb;
use crate::models::{content_key, list_story_content, put_content};
use crate::EnigmaError;

pub const CHARACTER_DIALOGUE: &str = "character_dialogue_base";
pub const LOCATION_DESCRIPTION: &str = "location_description";
pub const OBJECT_EXAMINATION: &str = "object_examination";

const CHARACTER_DIALOGUE_TEXT: &str = "You are {character_name}, {character_description}. Answer as this character.

CHARACTER CONTEXT (LEVEL {character_level}):
{available_knowledge}

PERSONALITY:
{character_personality}

HOW TO BEHAVE:
{narrative_stance}
{stance_line}

SPECIAL INSTRUCTIONS:
1. Stay true to the character and their current stage of knowledge.
2. Do not reveal information beyond what the character knows at this stage.
3. Answer naturally and conversationally, keeping the character's way of speaking.
4. Keep your answers to at most 3 paragraphs.
5. Do not use stage directions such as (smiling), (pause) or [action].
6. Do not repeat an answer you have already given.
{special_instructions}

CONVERSATION HISTORY:{conversation_history}
Player: {player_input}

{character_name}:";

const LOCATION_DESCRIPTION_TEXT: &str = "Describe the following location to the player:

LOCATION: {location_name}

BASE DESCRIPTION:
{location_description}

DETAILS VISIBLE AT LEVEL {exploration_level}:
{visible_details}

ATMOSPHERE:
{atmosphere}

NOTABLE ELEMENTS:
{notable_elements}

INSTRUCTIONS:
1. Describe the location in an immersive, atmospheric way.
2. Only highlight elements visible at the current exploration level.
3. Do not mention areas or objects that need a higher exploration level.
4. Use engaging language that stimulates the senses.
5. Keep the description to at most 4 paragraphs.

RESULT:";

const OBJECT_EXAMINATION_TEXT: &str = "Describe the following object to the player:

OBJECT: {object_name}

BASE DESCRIPTION:
{object_description}

KNOWLEDGE AT LEVEL {object_level}:
{level_knowledge}

OBSERVABLE DETAILS:
{observable_details}

KNOWN HISTORY/CONTEXT:
{known_context}

INSTRUCTIONS:
1. Describe the object in a detailed, tangible way.
2. Only reveal information appropriate to the current knowledge level.
3. Do not mention properties or uses that need a higher level.
4. Use precise, descriptive language.
5. Keep the description to at most 3 paragraphs.

RESULT:";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromptTemplate {
    #[serde(default)]
    pub story_id: String,
    pub template_name: String,
    #[serde(default)]
    pub template_type: String,
    pub prompt_structure: String,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub purpose: Option<String>,
}

impl PromptTemplate {
    /// Substitute `{name}` placeholders. Unknown placeholders are left as written.
    pub fn render(&self, vars: &HashMap<&str, String>) -> String {
        render_template(&self.prompt_structure, vars)
    }
}

/// Substitute `{name}` placeholders in `template`.
///
/// Only identifiers made of ASCII letters, digits and `_` are treated as
/// placeholders, so literal braces in prose survive.
pub fn render_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                let is_ident = !name.is_empty()
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                match vars.get(name) {
                    Some(value) if is_ident => out.push_str(value),
                    _ => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn builtin(name: &str, template_type: &str, text: &str, variables: &[&str]) -> PromptTemplate {
    PromptTemplate {
        story_id: String::new(),
        template_name: name.to_string(),
        template_type: template_type.to_string(),
        prompt_structure: text.to_string(),
        variables: variables.iter().map(|v| v.to_string()).collect(),
        purpose: None,
    }
}

/// Templates every story starts with.
pub fn builtin_templates() -> Vec<PromptTemplate> {
    vec![
        builtin(
            CHARACTER_DIALOGUE,
            "character",
            CHARACTER_DIALOGUE_TEXT,
            &[
                "character_name",
                "character_description",
                "character_level",
                "available_knowledge",
                "character_personality",
                "narrative_stance",
                "stance_line",
                "special_instructions",
                "conversation_history",
                "player_input",
            ],
        ),
        builtin(
            LOCATION_DESCRIPTION,
            "location",
            LOCATION_DESCRIPTION_TEXT,
            &[
                "location_name",
                "location_description",
                "exploration_level",
                "visible_details",
                "atmosphere",
                "notable_elements",
            ],
        ),
        builtin(
            OBJECT_EXAMINATION,
            "object",
            OBJECT_EXAMINATION_TEXT,
            &[
                "object_name",
                "object_description",
                "object_level",
                "level_knowledge",
                "observable_details",
                "known_context",
            ],
        ),
    ]
}

/// Built-in template by name.
pub fn builtin_template(name: &str) -> Option<PromptTemplate> {
    builtin_templates()
        .into_iter()
        .find(|t| t.template_name == name)
}

/// Write a prompt template for its story.
pub async fn create_template(
    db: &GameDb,
    data: PromptTemplate,
) -> Result<PromptTemplate, EnigmaError> {
    let key = content_key(&data.story_id, &data.template_name);
    put_content(db, "prompt_template", key, data).await
}

/// All prompt templates of a story.
pub async fn list_templates(
    db: &GameDb,
    story_id: &str,
) -> Result<Vec<PromptTemplate>, EnigmaError> {
    list_story_content(db, "prompt_template", "template_name", story_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_substitutes_known_and_keeps_unknown() {
        let mut vars = HashMap::new();
        vars.insert("name", "Clara".to_string());
        let out = render_template("Hi {name}, see {missing} and {not valid}.", &vars);
        assert_eq!(out, "Hi Clara, see {missing} and {not valid}.");
    }

    #[test]
    fn test_render_handles_unclosed_brace() {
        let vars = HashMap::new();
        assert_eq!(render_template("a { b", &vars), "a { b");
    }

    #[test]
    fn test_builtins_declare_their_variables() {
        for template in builtin_templates() {
            for var in &template.variables {
                assert!(
                    template.prompt_structure.contains(&format!("{{{var}}}")),
                    "{} does not use {}",
                    template.template_name,
                    var
                );
            }
        }
    }
}
