//! Story management: upload, list, delete.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::output::{
    output_json, print_error, print_hint, print_rows, print_success, OutputMode,
};
use crate::init::AppContext;
use crate::services::{
    load_story_dir, noop_progress, ConflictMode, ProgressReporter, UploadResult, UploadService,
};
use crate::utils::slugify;

const BAR_LENGTH: u64 = 100;

/// Upload progress drawn as an `indicatif` bar.
struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    fn new() -> Self {
        let bar = ProgressBar::new(BAR_LENGTH);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {percent}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }
}

#[async_trait]
impl ProgressReporter for BarReporter {
    async fn report(&self, current: f64, total: f64, message: Option<String>) {
        let fraction = if total > 0.0 { current / total } else { 1.0 };
        self.bar
            .set_position((fraction.clamp(0.0, 1.0) * BAR_LENGTH as f64) as u64);
        if let Some(message) = message {
            self.bar.set_message(message);
        }
    }

    async fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn print_upload_result(result: &UploadResult, mode: OutputMode) {
    if mode == OutputMode::Json {
        output_json(result);
        return;
    }

    let rows: Vec<Vec<String>> = result
        .by_type
        .iter()
        .filter(|t| t.created > 0 || t.skipped > 0 || t.replaced > 0 || !t.errors.is_empty())
        .map(|t| {
            vec![
                t.content_type.clone(),
                t.created.to_string(),
                t.skipped.to_string(),
                t.replaced.to_string(),
                t.errors.len().to_string(),
            ]
        })
        .collect();
    print_rows(
        mode,
        &["Content Type", "Created", "Skipped", "Replaced", "Errors"],
        rows,
    );

    for type_result in &result.by_type {
        for err in &type_result.errors {
            print_error(&format!("[{}] {}", type_result.content_type, err));
        }
    }
}

pub async fn handle_upload(
    ctx: &AppContext,
    dir: &Path,
    story_id: Option<&str>,
    on_conflict: ConflictMode,
    dry_run: bool,
    mode: OutputMode,
) -> Result<()> {
    let story_id = match story_id {
        Some(id) => id.to_string(),
        None => {
            let name = dir
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_default();
            slugify(&name)
        }
    };
    let content = load_story_dir(dir)?;

    if dry_run {
        let result = UploadService::dry_run(content, &story_id)?;
        if mode != OutputMode::Json {
            println!("Dry run: no changes will be made\n");
        }
        print_upload_result(&result, mode);
        if mode != OutputMode::Json {
            println!("\nTotal: {} documents for story '{}'", result.total_created, story_id);
        }
        return Ok(());
    }

    let result = if mode == OutputMode::Human {
        let bar = BarReporter::new();
        ctx.upload
            .upload(content, &story_id, on_conflict, &bar)
            .await?
    } else {
        ctx.upload
            .upload(content, &story_id, on_conflict, noop_progress().as_ref())
            .await?
    };
    ctx.content.invalidate(&story_id).await;

    print_upload_result(&result, mode);
    if mode != OutputMode::Json {
        print_success(&format!(
            "Upload of '{}' complete: {} created, {} skipped, {} replaced, {} errors",
            story_id,
            result.total_created,
            result.total_skipped,
            result.total_replaced,
            result.total_errors,
        ));
        if result.total_errors == 0 && result.total_skipped == 0 {
            print_hint(&format!("Start playing with 'enigma-hunter new-game {story_id}'."));
        }
    }
    Ok(())
}

pub async fn handle_stories(ctx: &AppContext, mode: OutputMode) -> Result<()> {
    let stories = ctx.content.list_stories().await?;

    if mode == OutputMode::Json {
        output_json(&stories);
        return Ok(());
    }

    let rows = stories
        .iter()
        .map(|s| {
            vec![
                s.story_id.clone(),
                s.title.clone(),
                s.difficulty_level.to_string(),
                if s.is_active { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    print_rows(mode, &["Story", "Title", "Difficulty", "Active"], rows);
    Ok(())
}

pub async fn handle_delete_story(ctx: &AppContext, story_id: &str, mode: OutputMode) -> Result<()> {
    let counts = ctx.content.document_counts(story_id).await?;
    let deleted = ctx.upload.delete_story(story_id).await?;
    ctx.content.invalidate(story_id).await;
    ctx.session_manager.forget_story(story_id).await;
    ctx.session_manager.save().await?;

    let documents: usize = counts.iter().map(|(_, n)| n).sum();
    if mode == OutputMode::Json {
        output_json(&serde_json::json!({
            "story_id": story_id,
            "deleted": deleted,
            "documents": documents,
        }));
    } else if deleted {
        print_success(&format!(
            "Deleted story '{}' and {} content documents",
            story_id, documents
        ));
    } else {
        print_error(&format!("Story '{}' not found", story_id));
    }
    Ok(())
}
