//! Scanning printed codes.

mod common;

use common::{start_manor_game, TestHarness};
use enigma_hunter::services::ReplyKind;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_enter_code_opens_locked_location() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;

    let (scanned, reply) = ctx.game.scan(&mut session, "qr-study").await.unwrap();
    assert!(scanned.outcome.success);
    assert_eq!(scanned.outcome.message, "You enter Study.");
    assert!(reply.is_none());
    assert_eq!(session.current_location_id, Some(2));

    // Once discovered the lock no longer applies on foot.
    ctx.game.enter(&mut session, 1).await.unwrap();
    let back = ctx.game.enter(&mut session, 2).await.unwrap();
    assert!(back.success);
}

#[tokio::test]
async fn test_talk_code_starts_conversation() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;

    let (scanned, reply) = ctx.game.scan(&mut session, "qr-agatha").await.unwrap();
    assert_eq!(scanned.start_dialogue, Some(2));
    let reply = reply.expect("talk codes greet right away");
    assert_eq!(reply.kind, ReplyKind::Greeting);
    assert_eq!(reply.character_name, "Lady Agatha");
    assert_eq!(session.character_levels.get(&2), Some(&0));
}

#[tokio::test]
async fn test_explore_code_reaches_hidden_area() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;

    let refused = ctx.game.go(&mut session, 11).await.unwrap();
    assert!(!refused.success);

    let (scanned, _) = ctx.game.scan(&mut session, "qr-closet").await.unwrap();
    assert!(scanned.outcome.success);
    assert_eq!(session.current_area_id, Some(11));
    assert_eq!(session.area_visits.get(&11), Some(&1));
    assert!(session.completed_interactions["areas"].contains("11"));
}

#[tokio::test]
async fn test_access_requirements_and_unknown_codes() {
    let harness = TestHarness::new().await;
    let ctx = harness.context();
    let mut session = start_manor_game(&ctx).await;

    let (denied, _) = ctx.game.scan(&mut session, "qr-magnifier").await.unwrap();
    assert!(!denied.outcome.success);
    assert_eq!(denied.outcome.message, "You need Letter to use this code.");
    assert!(session.scanned_qr_codes.is_empty());

    ctx.game.go(&mut session, 10).await.unwrap();
    ctx.game.take(&mut session, 3).await.unwrap();
    let (granted, _) = ctx.game.scan(&mut session, "qr-magnifier").await.unwrap();
    assert!(granted.outcome.success);
    assert!(session.has_object(5));

    ctx.game.scan(&mut session, " qr-magnifier ").await.unwrap();
    assert_eq!(session.scanned_qr_codes, vec!["qr-magnifier".to_string()]);

    let (invalid, _) = ctx.game.scan(&mut session, "qr-nothing").await.unwrap();
    assert_eq!(invalid.outcome.message, "Invalid QR code.");

    let saved = ctx.game.load(&session.session_id).await.unwrap();
    assert_eq!(saved.scanned_qr_codes, vec!["qr-magnifier".to_string()]);
}
