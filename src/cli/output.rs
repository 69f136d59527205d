//! Terminal rendering of game results.

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Attribute, Cell, Table};
use serde::Serialize;

use crate::services::{DialogueReply, Outcome, ReplyKind};

/// How command results are rendered, picked from the global `--json` and
/// `--md` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Markdown,
}

impl OutputMode {
    pub fn from_flags(json: bool, md: bool) -> Self {
        match (json, md) {
            (true, _) => OutputMode::Json,
            (false, true) => OutputMode::Markdown,
            (false, false) => OutputMode::Human,
        }
    }
}

pub fn output_json<T: Serialize>(item: &T) {
    match serde_json::to_string_pretty(item) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("Could not encode result as JSON: {e}")),
    }
}

fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let escape = |cell: &str| cell.replace('|', "\\|");
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!("| {} |", headers.join(" | ")));
    lines.push(format!("|{}|", vec!["---"; headers.len()].join("|")));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| escape(c)).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
    lines.join("\n")
}

/// Rows as a rounded terminal table, or Markdown with `--md`.
///
/// JSON callers serialize their own data instead.
pub fn print_rows(mode: OutputMode, headers: &[&str], rows: Vec<Vec<String>>) {
    if rows.is_empty() {
        println!("{}", "Nothing to show.".dimmed());
        return;
    }
    if mode == OutputMode::Markdown {
        println!("{}", markdown_table(headers, &rows));
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(headers.iter().map(|h| Cell::new(h).add_attribute(Attribute::Bold)));
    for row in rows {
        table.add_row(row);
    }
    println!("{table}");
}

pub fn print_success(msg: &str) {
    println!("{} {}", "OK".green().bold(), msg);
}

/// To stderr.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_header(title: &str) {
    println!("\n{}\n", title.bold());
}

pub fn print_kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.bold().underline());
    println!("{}", content);
}

pub fn print_hint(msg: &str) {
    println!("{}", msg.dimmed());
}

/// Print the result of a player action.
pub fn print_outcome(mode: OutputMode, outcome: &Outcome) {
    if mode == OutputMode::Json {
        output_json(outcome);
        return;
    }
    if outcome.success {
        println!("{}", outcome.message);
    } else {
        println!("{}", outcome.message.yellow());
    }
    if let Some(description) = &outcome.description {
        println!("{}", description.italic());
    }
    for note in &outcome.notes {
        println!("  {} {}", "*".cyan(), note.cyan());
    }
}

/// Print a character's line.
pub fn print_reply(mode: OutputMode, reply: &DialogueReply) {
    if mode == OutputMode::Json {
        output_json(reply);
        return;
    }
    let name = format!("{}:", reply.character_name).bold();
    match reply.kind {
        ReplyKind::Challenge => println!("{} {}", name, reply.text.yellow()),
        ReplyKind::ChallengePassed => println!("{} {}", name, reply.text.green()),
        ReplyKind::ChallengeFailed => println!("{} {}", name, reply.text.red()),
        ReplyKind::Fallback => println!("{} {}", name, reply.text.dimmed()),
        ReplyKind::Greeting | ReplyKind::Answer => println!("{} {}", name, reply.text),
    }
}
