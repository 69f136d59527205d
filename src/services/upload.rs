//! Story upload: authored JSON files on disk into the content tables.
//!
//! ```text
//! <story_dir>/
//!   historia_base.json
//!   ambientes/Ambiente_*.json
//!   personagens/Personagem_*.json
//!   data/{objetos,pistas,qrcodes,sistema-especializacao}.json
//!   prompts/*.json
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::progress::ProgressReporter;
use crate::models::prompt::builtin_templates;
use crate::models::{SpecializationConfig, StoryContent, StoryHeader};
use crate::repository::ContentRepository;
use crate::utils::validate_story_id;
use crate::EnigmaError;

/// What to do when the story id is already taken.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ConflictMode {
    /// Report an error and write nothing.
    #[default]
    Error,
    /// Leave the stored story alone.
    Skip,
    /// Delete every document of the stored story, then write.
    Replace,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UploadTypeResult {
    pub content_type: String,
    pub created: usize,
    pub skipped: usize,
    pub replaced: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UploadResult {
    pub story_id: String,
    pub dry_run: bool,
    pub total_created: usize,
    pub total_skipped: usize,
    pub total_replaced: usize,
    pub total_errors: usize,
    pub by_type: Vec<UploadTypeResult>,
}

impl UploadResult {
    fn tally(&mut self) {
        self.total_created = self.by_type.iter().map(|t| t.created).sum();
        self.total_skipped = self.by_type.iter().map(|t| t.skipped).sum();
        self.total_replaced = self.by_type.iter().map(|t| t.replaced).sum();
        self.total_errors = self.by_type.iter().map(|t| t.errors.len()).sum();
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, EnigmaError> {
    let raw = std::fs::read_to_string(path).map_err(|e| EnigmaError::Content {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| EnigmaError::Content {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read a file holding either one record or a list of them.
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, EnigmaError> {
    Ok(match read_json::<OneOrMany<T>>(path)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

/// `*.json` files in `dir` whose name starts with `prefix`, sorted by name.
fn json_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, EnigmaError> {
    if !dir.is_dir() {
        warn!("Directory not found, skipping: {}", dir.display());
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "json")
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(prefix))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn read_dir_records<T: DeserializeOwned>(dir: &Path, prefix: &str) -> Result<Vec<T>, EnigmaError> {
    let mut records = Vec::new();
    for file in json_files(dir, prefix)? {
        records.extend(read_records(&file)?);
    }
    Ok(records)
}

fn read_optional_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, EnigmaError> {
    if !path.is_file() {
        warn!("File not found, skipping: {}", path.display());
        return Ok(Vec::new());
    }
    read_records(path)
}

/// Read a story directory into memory. Only `historia_base.json` is
/// mandatory; parse errors name the offending file.
pub fn load_story_dir(dir: &Path) -> Result<StoryContent, EnigmaError> {
    let base = dir.join("historia_base.json");
    if !base.is_file() {
        return Err(EnigmaError::Content {
            path: base.display().to_string(),
            message: "story header file is missing".to_string(),
        });
    }
    let mut header: StoryHeader = read_json(&base)?;

    let data = dir.join("data");
    let specialization = data.join("sistema-especializacao.json");
    if specialization.is_file() {
        header.specialization_config = read_json::<SpecializationConfig>(&specialization)?;
    } else {
        warn!("File not found, skipping: {}", specialization.display());
    }

    let content = StoryContent {
        header,
        locations: read_dir_records(&dir.join("ambientes"), "Ambiente_")?,
        characters: read_dir_records(&dir.join("personagens"), "Personagem_")?,
        objects: read_optional_records(&data.join("objetos.json"))?,
        clues: read_optional_records(&data.join("pistas.json"))?,
        qr_codes: read_optional_records(&data.join("qrcodes.json"))?,
        templates: if dir.join("prompts").is_dir() {
            read_dir_records(&dir.join("prompts"), "")?
        } else {
            Vec::new()
        },
    };

    info!(
        "Read story '{}' from {}: {} locations, {} characters, {} objects, {} clues, {} QR codes",
        content.header.title,
        dir.display(),
        content.locations.len(),
        content.characters.len(),
        content.objects.len(),
        content.clues.len(),
        content.qr_codes.len()
    );
    Ok(content)
}

/// Tag every document with the story id and add the built-in prompt
/// templates the story does not override.
pub fn prepare(content: &mut StoryContent, story_id: &str) {
    content.header.story_id = story_id.to_string();
    for l in &mut content.locations {
        l.story_id = story_id.to_string();
    }
    for c in &mut content.characters {
        c.story_id = story_id.to_string();
    }
    for o in &mut content.objects {
        o.story_id = story_id.to_string();
    }
    for c in &mut content.clues {
        c.story_id = story_id.to_string();
    }
    for q in &mut content.qr_codes {
        q.story_id = story_id.to_string();
    }
    for builtin in builtin_templates() {
        if !content
            .templates
            .iter()
            .any(|t| t.template_name == builtin.template_name)
        {
            content.templates.push(builtin);
        }
    }
    for t in &mut content.templates {
        t.story_id = story_id.to_string();
    }
}

/// Write each item, counting successes and collecting per-item errors.
async fn write_all<T, F, Fut>(
    content_type: &str,
    items: Vec<T>,
    replacing: bool,
    label: impl Fn(&T) -> String,
    write: F,
) -> UploadTypeResult
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<T, EnigmaError>>,
{
    let mut result = UploadTypeResult {
        content_type: content_type.to_string(),
        ..Default::default()
    };
    for item in items {
        let name = label(&item);
        match write(item).await {
            Ok(_) if replacing => result.replaced += 1,
            Ok(_) => result.created += 1,
            Err(e) => result.errors.push(format!("{content_type} {name}: {e}")),
        }
    }
    result
}

pub struct UploadService {
    repo: Arc<dyn ContentRepository>,
}

impl UploadService {
    pub fn new(repo: Arc<dyn ContentRepository>) -> Self {
        Self { repo }
    }

    /// Counts what an upload would write, touching nothing.
    pub fn dry_run(mut content: StoryContent, story_id: &str) -> Result<UploadResult, EnigmaError> {
        validate_story_id(story_id)?;
        prepare(&mut content, story_id);
        let mut result = UploadResult {
            story_id: story_id.to_string(),
            dry_run: true,
            by_type: content
                .counts()
                .into_iter()
                .map(|(content_type, created)| UploadTypeResult {
                    content_type: content_type.to_string(),
                    created,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        result.tally();
        Ok(result)
    }

    pub async fn upload(
        &self,
        mut content: StoryContent,
        story_id: &str,
        mode: ConflictMode,
        progress: &dyn ProgressReporter,
    ) -> Result<UploadResult, EnigmaError> {
        validate_story_id(story_id)?;
        prepare(&mut content, story_id);

        let mut result = UploadResult {
            story_id: story_id.to_string(),
            ..Default::default()
        };

        let existing = self.repo.get_story(story_id).await?;
        let replacing = existing.is_some();
        if replacing {
            match mode {
                ConflictMode::Error => {
                    result.by_type.push(UploadTypeResult {
                        content_type: "story".to_string(),
                        errors: vec![EnigmaError::Conflict(format!(
                            "story '{story_id}' already exists"
                        ))
                        .to_string()],
                        ..Default::default()
                    });
                    result.tally();
                    return Ok(result);
                }
                ConflictMode::Skip => {
                    result.by_type = content
                        .counts()
                        .into_iter()
                        .map(|(content_type, skipped)| UploadTypeResult {
                            content_type: content_type.to_string(),
                            skipped,
                            ..Default::default()
                        })
                        .collect();
                    result.tally();
                    info!("Story '{}' exists, skipped", story_id);
                    return Ok(result);
                }
                ConflictMode::Replace => {
                    info!("Replacing story '{}'", story_id);
                    self.repo.delete_story(story_id).await?;
                }
            }
        }

        const STEPS: usize = 7;
        let StoryContent {
            header,
            locations,
            characters,
            objects,
            clues,
            qr_codes,
            templates,
        } = content;
        let repo = &self.repo;

        progress.step(0, STEPS, "story").await;
        let story = write_all(
            "story",
            vec![header],
            replacing,
            |h| h.story_id.clone(),
            |h| async move { repo.put_story(h.clone()).await.map(|_| h) },
        )
        .await;
        let story_failed = !story.errors.is_empty();
        result.by_type.push(story);
        if story_failed {
            progress.finish().await;
            result.tally();
            return Ok(result);
        }

        progress.step(1, STEPS, "locations").await;
        result.by_type.push(
            write_all(
                "location",
                locations,
                replacing,
                |l| l.location_id.to_string(),
                |l| repo.put_location(l),
            )
            .await,
        );

        progress.step(2, STEPS, "characters").await;
        result.by_type.push(
            write_all(
                "character",
                characters,
                replacing,
                |c| c.character_id.to_string(),
                |c| repo.put_character(c),
            )
            .await,
        );

        progress.step(3, STEPS, "objects").await;
        result.by_type.push(
            write_all(
                "game_object",
                objects,
                replacing,
                |o| o.object_id.to_string(),
                |o| repo.put_object(o),
            )
            .await,
        );

        progress.step(4, STEPS, "clues").await;
        result.by_type.push(
            write_all(
                "clue",
                clues,
                replacing,
                |c| c.clue_id.to_string(),
                |c| repo.put_clue(c),
            )
            .await,
        );

        progress.step(5, STEPS, "QR codes").await;
        result.by_type.push(
            write_all(
                "qr_code",
                qr_codes,
                replacing,
                |q| q.uuid.clone(),
                |q| repo.put_qr_code(q),
            )
            .await,
        );

        progress.step(6, STEPS, "prompt templates").await;
        result.by_type.push(
            write_all(
                "prompt_template",
                templates,
                replacing,
                |t| t.template_name.clone(),
                |t| repo.put_template(t),
            )
            .await,
        );

        progress.step(STEPS, STEPS, "done").await;
        progress.finish().await;
        result.tally();
        info!(
            "Uploaded story '{}': {} created, {} replaced, {} errors",
            story_id, result.total_created, result.total_replaced, result.total_errors
        );
        Ok(result)
    }

    pub async fn delete_story(&self, story_id: &str) -> Result<bool, EnigmaError> {
        validate_story_id(story_id)?;
        self.repo.delete_story(story_id).await
    }
}
