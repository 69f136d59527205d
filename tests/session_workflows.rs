//! Saved games and the remembered active session.

mod common;

use common::builders::manor_story;
use common::{start_manor_game, upload_story, TestHarness};
use enigma_hunter::cli::handlers::game::{
    handle_delete_session, handle_new_game, handle_status, load_session,
};
use enigma_hunter::cli::handlers::story::handle_delete_story;
use enigma_hunter::cli::output::OutputMode;
use enigma_hunter::services::dialogue::HISTORY_LIMIT;
use enigma_hunter::EnigmaError;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_session_round_trips_through_database() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;

    ctx.game.go(&mut session, 10).await.unwrap();
    ctx.game.explore(&mut session).await.unwrap();
    ctx.game.take(&mut session, 3).await.unwrap();
    ctx.game.talk(&mut session, 1).await.unwrap();
    ctx.game.say(&mut session, 1, "the letter").await.unwrap();

    let saved = ctx.game.load(&session.session_id).await.unwrap();
    assert_eq!(saved.inventory, session.inventory);
    assert_eq!(saved.discovered_clues, session.discovered_clues);
    assert_eq!(saved.character_levels, session.character_levels);
    assert_eq!(saved.completed_interactions, session.completed_interactions);
    assert_eq!(saved.specialization_points, session.specialization_points);
    assert_eq!(saved.pending_challenge, session.pending_challenge);
    assert!(saved.pending_challenge.is_some());
    assert_eq!(saved.action_history.len(), session.action_history.len());
    assert_eq!(saved.area_levels.get(&10), Some(&1));
    assert!(!saved.action_history.is_empty());
}

#[tokio::test]
async fn test_list_and_delete_sessions() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let first = start_manor_game(&ctx).await;
    let (second, _) = ctx.game.new_game("manor", "Watson").await.unwrap();
    upload_story(&ctx, manor_story(), "sequel").await;
    ctx.game.new_game("sequel", "Holmes").await.unwrap();

    assert_eq!(ctx.game.list_sessions(None).await.unwrap().len(), 3);
    let manor = ctx.game.list_sessions(Some("manor")).await.unwrap();
    assert_eq!(manor.len(), 2);
    assert!(manor.iter().all(|s| s.story_id == "manor"));

    let mut talking = second.clone();
    ctx.game.talk(&mut talking, 1).await.unwrap();
    assert!(ctx.game.delete_session(&second.session_id).await.unwrap());
    assert!(!ctx.game.delete_session(&second.session_id).await.unwrap());

    let history = ctx
        .progress_repo
        .dialogue_history(&second.session_id, 1, HISTORY_LIMIT)
        .await
        .unwrap();
    assert!(history.is_empty(), "dialogue goes with its session");

    let err = ctx.game.load(&second.session_id).await.unwrap_err();
    assert!(matches!(err, EnigmaError::NotFound { .. }));
    assert!(ctx.game.load(&first.session_id).await.is_ok());
}

#[tokio::test]
async fn test_cli_remembers_active_session() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    upload_story(&ctx, manor_story(), "manor").await;

    assert!(load_session(&ctx, None).await.is_err());

    handle_new_game(&ctx, "manor", "Holmes", OutputMode::Json)
        .await
        .unwrap();
    let active = ctx.session_manager.active_session().await.expect("active");
    assert_eq!(ctx.session_manager.active_story().await.as_deref(), Some("manor"));

    let session = load_session(&ctx, None).await.unwrap();
    assert_eq!(session.session_id, active);
    handle_status(&ctx, None, OutputMode::Json).await.unwrap();

    // A second context over the same directory reads the saved state file.
    let reopened = harness.context();
    assert_eq!(reopened.session_manager.active_session().await, Some(active.clone()));

    handle_delete_session(&ctx, &active, OutputMode::Json)
        .await
        .unwrap();
    assert!(ctx.session_manager.active_session().await.is_none());
    assert!(ctx.session_manager.recent_sessions().await.is_empty());
}

#[tokio::test]
async fn test_deleting_story_forgets_its_active_session() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    upload_story(&ctx, manor_story(), "manor").await;
    handle_new_game(&ctx, "manor", "Holmes", OutputMode::Json)
        .await
        .unwrap();

    handle_delete_story(&ctx, "manor", OutputMode::Json)
        .await
        .unwrap();
    assert!(ctx.session_manager.active_session().await.is_none());
    assert!(ctx.content.story("manor").await.is_err());
}
