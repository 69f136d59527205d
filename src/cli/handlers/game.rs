//! One-shot game commands acting on the active session.

use anyhow::{anyhow, Result};
use colored::Colorize;

use crate::cli::output::{
    output_json, print_error, print_header, print_hint, print_kv, print_outcome, print_reply,
    print_rows, print_success, OutputMode,
};
use crate::cli::resolve::{resolve, Resolved};
use crate::init::AppContext;
use crate::models::PlayerSession;
use crate::services::{characters_here, GameStatusView, Hint, ProgressReport};

/// The session named on the command line, else the remembered one.
pub async fn load_session(ctx: &AppContext, explicit: Option<&str>) -> Result<PlayerSession> {
    let session_id = match explicit {
        Some(id) => id.to_string(),
        None => ctx.session_manager.active_session().await.ok_or_else(|| {
            anyhow!("No active game. Start one with 'enigma-hunter new-game <story>'.")
        })?,
    };
    Ok(ctx.game.load(&session_id).await?)
}

async fn remember(ctx: &AppContext, session: &PlayerSession) -> Result<()> {
    ctx.session_manager
        .set_active(&session.session_id, &session.story_id)
        .await;
    ctx.session_manager.save().await?;
    Ok(())
}

pub async fn handle_new_game(
    ctx: &AppContext,
    story_id: &str,
    player: &str,
    mode: OutputMode,
) -> Result<()> {
    let (session, outcome) = ctx.game.new_game(story_id, player).await?;
    remember(ctx, &session).await?;

    if mode == OutputMode::Json {
        output_json(&serde_json::json!({
            "session_id": session.session_id,
            "story_id": session.story_id,
            "outcome": outcome,
        }));
        return Ok(());
    }
    let content = ctx.game.story(&session).await?;
    print_header(&content.header.title);
    print_outcome(mode, &outcome);
    println!();
    print_success(&format!("Game {} started", session.session_id));
    print_hint("Continue with 'enigma-hunter play'.");
    Ok(())
}

pub async fn handle_sessions(ctx: &AppContext, story: Option<&str>, mode: OutputMode) -> Result<()> {
    let sessions = ctx.game.list_sessions(story).await?;
    let active = ctx.session_manager.active_session().await;

    if mode == OutputMode::Json {
        output_json(&sessions);
        return Ok(());
    }

    let rows = sessions
        .iter()
        .map(|s| {
            let marker = if active.as_deref() == Some(s.session_id.as_str()) {
                "*"
            } else {
                ""
            };
            vec![
                format!("{marker}{}", s.session_id),
                s.player_name.clone(),
                s.story_id.clone(),
                s.game_status.to_string(),
                s.last_activity.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();
    print_rows(mode, &["Session", "Player", "Story", "Status", "Last played"], rows);
    Ok(())
}

pub fn print_status(view: &GameStatusView, mode: OutputMode) {
    if mode == OutputMode::Json {
        output_json(view);
        return;
    }
    print_header(&format!("{} ({})", view.story_title, view.status));
    print_kv("Player", &view.player_name);
    print_kv("Location", view.location.as_deref().unwrap_or("-"));
    print_kv("Area", view.area.as_deref().unwrap_or("-"));
    let list = |items: &[String]| {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    };
    print_kv("People here", &list(&view.characters_here));
    print_kv("Objects here", &list(&view.objects_here));
    print_kv("Inventory", &list(&view.inventory));
    print_kv("Clues", &list(&view.clues));
}

pub fn print_progress(report: &ProgressReport, mode: OutputMode) {
    if mode == OutputMode::Json {
        output_json(report);
        return;
    }
    print_kv(
        "Locations",
        &format!(
            "{}/{} ({:.0}%)",
            report.locations_discovered, report.locations_total, report.locations_percent
        ),
    );
    print_kv(
        "Clues",
        &format!(
            "{}/{} ({:.0}%)",
            report.clues_discovered, report.clues_total, report.clues_percent
        ),
    );
    print_kv("Overall", &format!("{:.0}%", report.overall_percent));
}

pub fn print_hints(hints: &[Hint], mode: OutputMode) {
    if mode == OutputMode::Json {
        output_json(&hints);
        return;
    }
    if hints.is_empty() {
        print_hint("No hints right now. Keep investigating.");
    }
    for hint in hints {
        println!("{} {}", "Hint:".cyan().bold(), hint.hint_text);
    }
}

pub async fn handle_status(ctx: &AppContext, session: Option<&str>, mode: OutputMode) -> Result<()> {
    let session = load_session(ctx, session).await?;
    print_status(&ctx.game.status(&session).await?, mode);
    Ok(())
}

pub async fn handle_progress(
    ctx: &AppContext,
    session: Option<&str>,
    mode: OutputMode,
) -> Result<()> {
    let session = load_session(ctx, session).await?;
    print_progress(&ctx.game.progress(&session).await?, mode);
    Ok(())
}

pub async fn handle_hints(ctx: &AppContext, session: Option<&str>, mode: OutputMode) -> Result<()> {
    let session = load_session(ctx, session).await?;
    print_hints(&ctx.game.hints(&session).await?, mode);
    Ok(())
}

pub async fn handle_scan(
    ctx: &AppContext,
    uuid: &str,
    session: Option<&str>,
    mode: OutputMode,
) -> Result<()> {
    let mut session = load_session(ctx, session).await?;
    let (scanned, reply) = ctx.game.scan(&mut session, uuid).await?;
    remember(ctx, &session).await?;

    if mode == OutputMode::Json {
        output_json(&serde_json::json!({ "scan": scanned, "reply": reply }));
        return Ok(());
    }
    print_outcome(mode, &scanned.outcome);
    if let Some(reply) = reply {
        print_reply(mode, &reply);
    }
    Ok(())
}

/// Say one line to a character present in the player's location.
pub async fn handle_talk(
    ctx: &AppContext,
    character: &str,
    message: &str,
    session: Option<&str>,
    mode: OutputMode,
) -> Result<()> {
    let mut session = load_session(ctx, session).await?;
    let content = ctx.game.story(&session).await?;
    let present = characters_here(&session, &content);
    let character_id = match resolve(character, &present, |c| c.name.as_str()) {
        Resolved::Found(c) => c.character_id,
        Resolved::Guessed(c) => {
            if mode != OutputMode::Json {
                print_hint(&format!("(talking to {})", c.name));
            }
            c.character_id
        }
        Resolved::NotFound => {
            print_error(&format!("There is no '{}' here to talk to.", character));
            return Ok(());
        }
    };

    if !session.character_levels.contains_key(&character_id) {
        let greeting = ctx.game.talk(&mut session, character_id).await?;
        if mode != OutputMode::Json {
            print_reply(mode, &greeting);
        }
    }
    let reply = ctx.game.say(&mut session, character_id, message).await?;
    remember(ctx, &session).await?;
    print_reply(mode, &reply);
    Ok(())
}

pub async fn handle_delete_session(
    ctx: &AppContext,
    session_id: &str,
    mode: OutputMode,
) -> Result<()> {
    let deleted = ctx.game.delete_session(session_id).await?;
    ctx.session_manager.forget(session_id).await;
    ctx.session_manager.save().await?;

    if mode == OutputMode::Json {
        output_json(&serde_json::json!({ "session_id": session_id, "deleted": deleted }));
    } else if deleted {
        print_success(&format!("Deleted session {}", session_id));
    } else {
        print_error(&format!("Session '{}' not found", session_id));
    }
    Ok(())
}
