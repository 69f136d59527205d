//! Exploration, inventory and accusation through `GameService`.

mod common;

use common::builders::manor_story;
use common::{start_manor_game, upload_story, TestHarness};
use enigma_hunter::models::GameStatus;
use enigma_hunter::services::{Accusation, HintType};
use enigma_hunter::EnigmaError;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_new_game_starts_at_starting_location() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    upload_story(&ctx, manor_story(), "manor").await;

    let (session, outcome) = ctx.game.new_game("manor", "Holmes").await.unwrap();
    assert!(outcome.success);
    assert_eq!(
        outcome.description.as_deref(),
        Some("Thunder rolls over Blackwood Manor.")
    );
    assert_eq!(session.current_location_id, Some(1));
    assert_eq!(session.current_area_id, None);
    assert_eq!(session.exploration_level(1), 1);
    assert_eq!(session.game_status, GameStatus::Active);

    let loaded = ctx.game.load(&session.session_id).await.unwrap();
    assert_eq!(loaded.player_name, "Holmes");
    assert_eq!(loaded.discovered_locations, session.discovered_locations);
}

#[tokio::test]
async fn test_new_game_requires_an_uploaded_story() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();

    let err = ctx.game.new_game("nowhere", "Holmes").await.unwrap_err();
    assert!(matches!(err, EnigmaError::NotFound { .. }));
}

#[tokio::test]
async fn test_locked_location_and_hidden_area_are_refused() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;

    let locked = ctx.game.enter(&mut session, 2).await.unwrap();
    assert!(!locked.success);
    assert_eq!(locked.message, "Study is locked.");
    assert_eq!(
        locked.description.as_deref(),
        Some("The study door needs a key.")
    );
    assert_eq!(session.current_location_id, Some(1));

    let hidden = ctx.game.go(&mut session, 11).await.unwrap();
    assert!(!hidden.success);

    let elsewhere = ctx.game.go(&mut session, 20).await.unwrap();
    assert_eq!(elsewhere.message, "That area is not part of this location.");
}

#[tokio::test]
async fn test_explore_take_and_examine() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;

    let nowhere = ctx.game.explore(&mut session).await.unwrap();
    assert!(!nowhere.success);

    let moved = ctx.game.go(&mut session, 10).await.unwrap();
    assert_eq!(moved.message, "You move to Hall.");
    assert_eq!(session.area_level(10), 1);

    let explored = ctx.game.explore(&mut session).await.unwrap();
    assert!(explored.success);
    assert!(session.has_clue(1), "coat rack detail reveals the muddy coat");
    assert!(explored
        .notes
        .iter()
        .any(|n| n == "Clue discovered: Muddy coat"));

    let vase = ctx.game.take(&mut session, 4).await.unwrap();
    assert_eq!(vase.message, "You can't take Vase.");

    let letter = ctx.game.take(&mut session, 3).await.unwrap();
    assert!(letter.success);
    assert!(session.has_object(3));

    let examined = ctx.game.examine_object(&mut session, 3).await.unwrap();
    assert!(examined.success);
    assert_eq!(session.object_level(3), 1);
    assert!(session.has_clue(2), "the letter's first level reveals the will");
    assert_eq!(
        examined.description.as_deref(),
        Some("The letter mentions a new will.")
    );

    let saved = ctx.game.load(&session.session_id).await.unwrap();
    assert_eq!(saved.inventory, vec![3]);
    assert_eq!(saved.discovered_clues, vec![1, 2]);
}

#[tokio::test]
async fn test_objects_must_be_within_reach() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;

    // Letter is pinned to the Hall; standing in the Foyer is not enough.
    let far = ctx.game.take(&mut session, 3).await.unwrap();
    assert_eq!(far.message, "Letter is not within reach.");
    let far = ctx.game.examine_object(&mut session, 3).await.unwrap();
    assert!(!far.success);

    // Magnifier lies loose in the Foyer.
    let near = ctx.game.take(&mut session, 5).await.unwrap();
    assert!(near.success);

    // Held objects stay within reach after leaving.
    ctx.game.go(&mut session, 10).await.unwrap();
    ctx.game.take(&mut session, 3).await.unwrap();
    ctx.game.enter(&mut session, 1).await.unwrap();
    assert_eq!(session.current_area_id, None);
    let held = ctx.game.examine_object(&mut session, 3).await.unwrap();
    assert!(held.success);
}

#[tokio::test]
async fn test_points_are_awarded_once() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;
    ctx.game.go(&mut session, 10).await.unwrap();

    let first = ctx.game.explore(&mut session).await.unwrap();
    let points = session.specialization_points.get("exploracao").copied();
    assert!(first.notes.iter().any(|n| n.starts_with("+5 exploracao")));

    let second = ctx.game.explore(&mut session).await.unwrap();
    assert!(second.success);
    assert!(!second.notes.iter().any(|n| n.contains("exploracao")));
    assert_eq!(session.specialization_points.get("exploracao").copied(), points);
}

#[tokio::test]
async fn test_combine_requires_both_objects() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;

    ctx.game.take(&mut session, 5).await.unwrap();
    let missing = ctx.game.combine(&mut session, 5, 3).await.unwrap();
    assert_eq!(missing.message, "You don't have Letter.");

    ctx.game.go(&mut session, 10).await.unwrap();
    ctx.game.take(&mut session, 3).await.unwrap();
    let analise_before = session
        .specialization_points
        .get("analise")
        .copied()
        .unwrap_or(0);
    let combined = ctx.game.combine(&mut session, 5, 3).await.unwrap();
    assert!(combined.success);
    assert_eq!(combined.message, "You combine Magnifier and Letter.");
    assert!(session.completed_interactions["combinacoes"].contains("3_5"));
    assert!(session.specialization_points["analise"] >= analise_before + 15);
}

#[tokio::test]
async fn test_accusation_checks_every_part() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;

    ctx.game.go(&mut session, 10).await.unwrap();
    ctx.game.explore(&mut session).await.unwrap();

    let wrong = ctx
        .game
        .accuse(
            &mut session,
            Accusation {
                accused_character_id: 1,
                method: "a candlestick".to_string(),
                motive: "jealousy".to_string(),
                evidence: Vec::new(),
            },
        )
        .await
        .unwrap();
    assert!(!wrong.correct);
    assert!(!wrong.culprit_correct);
    assert!(!wrong.method_correct);
    assert!(!wrong.motive_correct);
    assert!(!wrong.evidence_correct, "muddy coat was found but not shown");
    assert!(wrong.conclusion.is_none());
    assert_eq!(session.game_status, GameStatus::Active);

    let right = ctx
        .game
        .accuse(
            &mut session,
            Accusation {
                accused_character_id: 2,
                method: "Poison in the evening tea".to_string(),
                motive: "She wanted the inheritance".to_string(),
                evidence: vec![1],
            },
        )
        .await
        .unwrap();
    assert!(right.correct);
    assert_eq!(
        right.conclusion.as_deref(),
        Some("Lady Agatha is led away in the rain.")
    );

    let saved = ctx.game.load(&session.session_id).await.unwrap();
    assert_eq!(saved.game_status, GameStatus::Solved);
    assert_eq!(saved.solutions.len(), 2);
    assert!(saved.solutions[1].is_correct);
}

#[tokio::test]
async fn test_progress_and_hints() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;

    let report = ctx.game.progress(&session).await.unwrap();
    assert_eq!(report.locations_discovered, 1);
    assert_eq!(report.locations_total, 2);
    assert_eq!(report.clues_discovered, 0);
    assert_eq!(report.locations_percent, 50.0);
    assert_eq!(report.overall_percent, 25.0);

    let hints = ctx.game.hints(&session).await.unwrap();
    assert!(hints.iter().any(|h| h.hint_type == HintType::Exploration));

    ctx.game.go(&mut session, 10).await.unwrap();
    ctx.game.explore(&mut session).await.unwrap();
    let report = ctx.game.progress(&session).await.unwrap();
    assert_eq!(report.clues_discovered, 1);
}

#[tokio::test]
async fn test_status_view() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;
    ctx.game.go(&mut session, 10).await.unwrap();

    let view = ctx.game.status(&session).await.unwrap();
    assert_eq!(view.story_title, "The Manor Affair");
    assert_eq!(view.location.as_deref(), Some("Foyer"));
    assert_eq!(view.area.as_deref(), Some("Hall"));
    assert_eq!(view.characters_here, vec!["Sebastian".to_string()]);
    // Magnifier is placed in the Foyer without an area, so it is seen everywhere there.
    assert_eq!(
        view.objects_here,
        vec![
            "Letter".to_string(),
            "Vase".to_string(),
            "Magnifier".to_string()
        ]
    );
    assert!(view.inventory.is_empty());
}
