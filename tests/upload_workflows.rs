//! Story upload, reload and deletion against an embedded database.

mod common;

use common::builders::{manor_story, write_story_dir};
use common::{upload_story, TestHarness};
use enigma_hunter::services::{load_story_dir, noop_progress, ConflictMode, UploadService};
use enigma_hunter::EnigmaError;
use pretty_assertions::assert_eq;

fn count(result: &enigma_hunter::services::UploadResult, content_type: &str) -> usize {
    result
        .by_type
        .iter()
        .find(|t| t.content_type == content_type)
        .map(|t| t.created + t.replaced + t.skipped)
        .unwrap_or(0)
}

#[tokio::test]
async fn test_upload_from_directory_and_reload() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();

    let story_dir = harness.temp_path().join("blackwood");
    write_story_dir(&story_dir, &manor_story());
    let content = load_story_dir(&story_dir).expect("story directory should load");
    assert_eq!(content.locations.len(), 2);
    assert_eq!(content.characters.len(), 2);

    let result = upload_story(&ctx, content, "blackwood").await;
    assert_eq!(count(&result, "location"), 2);
    assert_eq!(count(&result, "character"), 2);
    assert_eq!(count(&result, "game_object"), 3);
    assert_eq!(count(&result, "clue"), 3);
    assert_eq!(count(&result, "qr_code"), 4);
    assert_eq!(count(&result, "prompt_template"), 3);
    assert_eq!(result.total_created, 18);

    let story = ctx.content.story("blackwood").await.expect("story loads");
    assert_eq!(story.header.title, "The Manor Affair");
    assert_eq!(story.header.solution_criteria.culprit_id, Some(2));
    assert_eq!(story.starting_location().map(|l| l.location_id), Some(1));
    assert_eq!(story.location(1).map(|l| l.areas.len()), Some(2));
    assert!(story.characters.iter().all(|c| c.story_id == "blackwood"));
    assert_eq!(
        story.character(1).map(|c| c.levels[0].triggers[0].trigger_keyword.as_str()),
        Some("letter")
    );
    assert!(story.qr_code("qr-magnifier").is_some());
    assert!(story.template("character_dialogue_base").is_some());

    let stories = ctx.content.list_stories().await.unwrap();
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].story_id, "blackwood");
}

#[tokio::test]
async fn test_conflict_modes() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    upload_story(&ctx, manor_story(), "manor").await;
    let progress = noop_progress();

    let refused = ctx
        .upload
        .upload(manor_story(), "manor", ConflictMode::Error, progress.as_ref())
        .await
        .unwrap();
    assert_eq!(refused.total_errors, 1);
    assert_eq!(refused.total_created, 0);
    assert!(refused.by_type[0].errors[0].contains("already exists"));

    let skipped = ctx
        .upload
        .upload(manor_story(), "manor", ConflictMode::Skip, progress.as_ref())
        .await
        .unwrap();
    assert_eq!(skipped.total_skipped, 18);
    assert_eq!(skipped.total_created, 0);

    let mut renamed = manor_story();
    renamed.header.title = "The Manor Affair, revised".to_string();
    renamed.clues.truncate(1);
    let replaced = ctx
        .upload
        .upload(renamed, "manor", ConflictMode::Replace, progress.as_ref())
        .await
        .unwrap();
    assert_eq!(replaced.total_errors, 0);
    assert_eq!(count(&replaced, "clue"), 1);
    assert!(replaced.total_replaced > 0);

    ctx.content.invalidate("manor").await;
    let story = ctx.content.story("manor").await.unwrap();
    assert_eq!(story.header.title, "The Manor Affair, revised");
    assert_eq!(story.clues.len(), 1, "replace must drop stale documents");
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();

    let result = UploadService::dry_run(manor_story(), "manor").unwrap();
    assert!(result.dry_run);
    assert_eq!(result.total_created, 18);

    let err = ctx.content.story("manor").await.unwrap_err();
    assert!(matches!(err, EnigmaError::NotFound { .. }));
}

#[tokio::test]
async fn test_delete_story_removes_content() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    upload_story(&ctx, manor_story(), "manor").await;
    upload_story(&ctx, manor_story(), "other").await;

    let counts = ctx.content.document_counts("manor").await.unwrap();
    assert!(counts.iter().any(|(t, n)| *t == "location" && *n == 2));

    assert!(ctx.upload.delete_story("manor").await.unwrap());
    ctx.content.invalidate("manor").await;
    assert!(ctx.content.story("manor").await.is_err());
    assert!(!ctx.upload.delete_story("manor").await.unwrap());

    let other = ctx.content.story("other").await.unwrap();
    assert_eq!(other.locations.len(), 2, "other stories are untouched");
}

#[tokio::test]
async fn test_invalid_story_id_is_rejected() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();

    let err = ctx
        .upload
        .upload(
            manor_story(),
            "no spaces allowed",
            ConflictMode::Error,
            noop_progress().as_ref(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EnigmaError::Validation(_)));
}
