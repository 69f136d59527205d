//! Interactive game loop.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::game::{load_session, print_hints, print_progress, print_status};
use crate::cli::output::{
    output_json, print_error, print_header, print_hint, print_outcome, print_reply, print_rows,
    print_section, print_success, OutputMode,
};
use crate::cli::repl::{is_farewell, pair_candidates, parse, ReplCommand, HELP};
use crate::cli::resolve::{resolve, Resolved};
use crate::init::AppContext;
use crate::models::{GameObject, PlayerSession, StoryContent};
use crate::services::exploration::current_visible_areas;
use crate::services::skills::level_for;
use crate::services::{characters_here, held_objects, objects_here, Accusation, ReplyKind};

/// Line reader over stdin.
struct Input {
    lines: Lines<BufReader<Stdin>>,
}

impl Input {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` at end of input.
    async fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}

/// Pick from `items` by what the player typed, echoing fuzzy guesses.
fn pick<'a, T>(
    input: &str,
    items: &[&'a T],
    name: impl Fn(&T) -> &str,
    what: &str,
) -> Option<&'a T> {
    match resolve(input, items, &name) {
        Resolved::Found(item) => Some(item),
        Resolved::Guessed(item) => {
            print_hint(&format!("({})", name(item)));
            Some(item)
        }
        Resolved::NotFound => {
            println!("{}", format!("You don't see any {what} called '{input}'.").yellow());
            None
        }
    }
}

fn object_name(object: &GameObject) -> &str {
    &object.name
}

/// Two held objects named in `rest`.
///
/// The first reading where both names match exactly wins; failing that the
/// most likely reading is resolved loosely, with the usual messages.
fn pick_pair<'a>(rest: &str, held: &[&'a GameObject]) -> Option<(&'a GameObject, &'a GameObject)> {
    let candidates = pair_candidates(rest);
    let exact = candidates.iter().find_map(|(a, b)| {
        match (resolve(a, held, object_name), resolve(b, held, object_name)) {
            (Resolved::Found(a), Resolved::Found(b)) => Some((a, b)),
            _ => None,
        }
    });
    if exact.is_some() {
        return exact;
    }
    let (first, second) = candidates.first()?;
    let a = pick(first, held, object_name, "object you hold");
    let b = pick(second, held, object_name, "object you hold");
    a.zip(b)
}

/// Objects the player can point at: held ones first, then those lying here.
fn reachable_objects<'a>(session: &PlayerSession, content: &'a StoryContent) -> Vec<&'a GameObject> {
    let mut objects = held_objects(session, content);
    objects.extend(objects_here(session, content));
    objects
}

struct Repl<'a> {
    ctx: &'a AppContext,
    session: PlayerSession,
    content: Arc<StoryContent>,
    input: Input,
    mode: OutputMode,
}

impl Repl<'_> {
    async fn converse(&mut self, character_id: i64) -> Result<()> {
        loop {
            let Some(line) = self.input.ask(&format!("{} ", "You>".bold())).await? else {
                return Ok(());
            };
            if is_farewell(&line) {
                println!("{}", "You end the conversation.".dimmed());
                return Ok(());
            }
            let reply = self
                .ctx
                .game
                .say(&mut self.session, character_id, &line)
                .await?;
            print_reply(self.mode, &reply);
            if reply.kind == ReplyKind::Challenge {
                print_hint("(Answer carefully. Mention any object you want to present.)");
            }
        }
    }

    async fn talk(&mut self, character_id: i64) -> Result<()> {
        let greeting = self.ctx.game.talk(&mut self.session, character_id).await?;
        print_reply(self.mode, &greeting);
        print_hint("(Say 'bye' to end the conversation.)");
        self.converse(character_id).await
    }

    fn print_inventory(&self) {
        let rows: Vec<Vec<String>> = held_objects(&self.session, &self.content)
            .iter()
            .enumerate()
            .map(|(i, o)| {
                let level = self.session.object_level(o.object_id);
                vec![
                    (i + 1).to_string(),
                    o.name.clone(),
                    level.to_string(),
                    o.description_at(level).to_string(),
                ]
            })
            .collect();
        if rows.is_empty() {
            print_hint("Your pockets are empty.");
        } else {
            print_rows(self.mode, &["#", "Object", "Level", "What you know"], rows);
        }
    }

    fn print_skills(&self) {
        let config = &self.content.header.specialization_config;
        let mut categories: Vec<String> = config.categorias.iter().map(|c| c.id.clone()).collect();
        for category in self.session.specialization_points.keys() {
            if !categories.contains(category) {
                categories.push(category.clone());
            }
        }
        let rows = categories
            .iter()
            .map(|category| {
                let points = self
                    .session
                    .specialization_points
                    .get(category)
                    .copied()
                    .unwrap_or(0);
                let label = config
                    .category(category)
                    .and_then(|c| c.nome.clone())
                    .unwrap_or_else(|| category.clone());
                vec![
                    label,
                    level_for(config, category, points).to_string(),
                    points.to_string(),
                ]
            })
            .collect();
        print_rows(self.mode, &["Skill", "Level", "Points"], rows);
    }

    fn print_areas(&self) {
        let rows = current_visible_areas(&self.session, &self.content)
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let here = self.session.current_area_id == Some(a.area_id);
                vec![
                    (i + 1).to_string(),
                    if here {
                        format!("{} (here)", a.name)
                    } else {
                        a.name.clone()
                    },
                    match self.session.area_visits.get(&a.area_id) {
                        Some(visits) => format!("level {}, {visits} visits", self.session.area_level(a.area_id)),
                        None => "unexplored".to_string(),
                    },
                ]
            })
            .collect();
        print_rows(self.mode, &["#", "Area", "Explored"], rows);
    }

    fn print_theory(&self) {
        let rows = self
            .session
            .discovered_clues
            .iter()
            .filter_map(|id| self.content.clue(*id))
            .enumerate()
            .map(|(i, c)| {
                vec![
                    (i + 1).to_string(),
                    c.name.clone(),
                    c.description.clone(),
                    if c.is_key_evidence { "key" } else { "" }.to_string(),
                ]
            })
            .collect();
        print_section("Clues", "");
        print_rows(self.mode, &["#", "Clue", "Description", ""], rows);

        let suspects = self
            .session
            .character_levels
            .iter()
            .filter_map(|(id, level)| self.content.character(*id).map(|c| (c, level)))
            .map(|(c, level)| vec![c.name.clone(), level.to_string()])
            .collect();
        print_section("People you spoke to", "");
        print_rows(self.mode, &["Character", "Trust level"], suspects);
    }

    async fn accuse(&mut self) -> Result<()> {
        let content = self.content.clone();
        let characters: Vec<_> = content.characters.iter().collect();
        for (i, c) in characters.iter().enumerate() {
            println!("  {}. {}", i + 1, c.name);
        }
        let Some(answer) = self.input.ask("Who is the culprit? ").await? else {
            return Ok(());
        };
        let Some(accused) = pick(&answer, &characters, |c| c.name.as_str(), "character") else {
            return Ok(());
        };
        let Some(method) = self.input.ask("How was the crime committed? ").await? else {
            return Ok(());
        };
        let Some(motive) = self.input.ask("Why? ").await? else {
            return Ok(());
        };

        let clues: Vec<_> = self
            .session
            .discovered_clues
            .iter()
            .filter_map(|id| content.clue(*id))
            .collect();
        let mut evidence = Vec::new();
        if !clues.is_empty() {
            for (i, c) in clues.iter().enumerate() {
                println!("  {}. {}", i + 1, c.name);
            }
            let Some(answer) = self
                .input
                .ask("Evidence to present (numbers, comma separated): ")
                .await?
            else {
                return Ok(());
            };
            for part in answer.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                if let Some(clue) = pick(part, &clues, |c| c.name.as_str(), "clue") {
                    evidence.push(clue.clue_id);
                }
            }
        }

        let verdict = self
            .ctx
            .game
            .accuse(
                &mut self.session,
                Accusation {
                    accused_character_id: accused.character_id,
                    method,
                    motive,
                    evidence,
                },
            )
            .await?;
        if self.mode == OutputMode::Json {
            output_json(&verdict);
            return Ok(());
        }
        for line in &verdict.feedback {
            if verdict.correct {
                println!("{}", line.green().bold());
            } else {
                println!("{}", line.yellow());
            }
        }
        if let Some(conclusion) = &verdict.conclusion {
            print_section("Conclusion", conclusion);
        }
        Ok(())
    }

    /// Run one command. Returns `false` when the player leaves.
    async fn run(&mut self, command: ReplCommand) -> Result<bool> {
        let mode = self.mode;
        let content = self.content.clone();
        match command {
            ReplCommand::Empty => {}
            ReplCommand::Help => {
                let rows = HELP
                    .iter()
                    .map(|(cmd, what)| vec![cmd.to_string(), what.to_string()])
                    .collect();
                print_rows(mode, &["Command", "Description"], rows);
            }
            ReplCommand::Exit => {
                self.ctx.game.save(&self.session).await?;
                print_success("Game saved. See you soon, detective.");
                return Ok(false);
            }
            ReplCommand::Go(target) => {
                let areas = current_visible_areas(&self.session, &content);
                if let Some(area) = pick(&target, &areas, |a| a.name.as_str(), "area") {
                    let outcome = self.ctx.game.go(&mut self.session, area.area_id).await?;
                    print_outcome(mode, &outcome);
                }
            }
            ReplCommand::Enter(target) => {
                let locations: Vec<_> = content.locations.iter().collect();
                if let Some(location) = pick(&target, &locations, |l| l.name.as_str(), "place") {
                    let outcome = self
                        .ctx
                        .game
                        .enter(&mut self.session, location.location_id)
                        .await?;
                    print_outcome(mode, &outcome);
                }
            }
            ReplCommand::Talk(target) => {
                let present = characters_here(&self.session, &content);
                if let Some(character) = pick(&target, &present, |c| c.name.as_str(), "one") {
                    self.talk(character.character_id).await?;
                }
            }
            ReplCommand::Examine(None) | ReplCommand::Explore => {
                let outcome = self.ctx.game.explore(&mut self.session).await?;
                print_outcome(mode, &outcome);
            }
            ReplCommand::Examine(Some(target)) => {
                let objects = reachable_objects(&self.session, &content);
                if let Some(object) = pick(&target, &objects, |o| o.name.as_str(), "object") {
                    let outcome = self
                        .ctx
                        .game
                        .examine_object(&mut self.session, object.object_id)
                        .await?;
                    print_outcome(mode, &outcome);
                }
            }
            ReplCommand::Take(target) => {
                let objects = objects_here(&self.session, &content);
                if let Some(object) = pick(&target, &objects, |o| o.name.as_str(), "object") {
                    let outcome = self.ctx.game.take(&mut self.session, object.object_id).await?;
                    print_outcome(mode, &outcome);
                }
            }
            ReplCommand::Combine(rest) => {
                let held = held_objects(&self.session, &content);
                if let Some((a, b)) = pick_pair(&rest, &held) {
                    let outcome = self
                        .ctx
                        .game
                        .combine(&mut self.session, a.object_id, b.object_id)
                        .await?;
                    print_outcome(mode, &outcome);
                }
            }
            ReplCommand::Inventory => self.print_inventory(),
            ReplCommand::Skills => self.print_skills(),
            ReplCommand::Areas => self.print_areas(),
            ReplCommand::Theory => self.print_theory(),
            ReplCommand::Accuse => self.accuse().await?,
            ReplCommand::Save => {
                self.ctx.game.save(&self.session).await?;
                print_success("Game saved.");
            }
            ReplCommand::Progress => {
                print_progress(&self.ctx.game.progress(&self.session).await?, mode)
            }
            ReplCommand::Hints => print_hints(&self.ctx.game.hints(&self.session).await?, mode),
            ReplCommand::Scan(uuid) => {
                let (scanned, reply) = self.ctx.game.scan(&mut self.session, &uuid).await?;
                print_outcome(mode, &scanned.outcome);
                if let Some(reply) = reply {
                    print_reply(mode, &reply);
                    print_hint("(Say 'bye' to end the conversation.)");
                    self.converse(reply.character_id).await?;
                }
            }
            ReplCommand::Debug => output_json(&self.session),
            ReplCommand::Describe(None) => {
                let text = self.ctx.game.describe(&self.session).await?;
                println!("{}", text.italic());
            }
            ReplCommand::Describe(Some(target)) => {
                let objects = reachable_objects(&self.session, &content);
                if let Some(object) = pick(&target, &objects, |o| o.name.as_str(), "object") {
                    let text = self
                        .ctx
                        .game
                        .describe_object(&self.session, object.object_id)
                        .await?;
                    println!("{}", text.italic());
                }
            }
            ReplCommand::Status => print_status(&self.ctx.game.status(&self.session).await?, mode),
            ReplCommand::Usage(usage) => print_hint(&format!("Usage: {usage}")),
            ReplCommand::Unknown(word) => {
                print_error(&format!("Unknown command '{word}'. Type 'help' for the list."))
            }
        }
        Ok(true)
    }
}

pub async fn handle_play(ctx: &AppContext, session: Option<&str>, mode: OutputMode) -> Result<()> {
    let session = load_session(ctx, session).await?;
    ctx.session_manager
        .set_active(&session.session_id, &session.story_id)
        .await;
    ctx.session_manager.save().await?;
    let content = ctx.game.story(&session).await?;

    print_header(&content.header.title);
    if !content.header.introduction.is_empty() && session.action_history.len() <= 2 {
        println!("{}\n", content.header.introduction.italic());
    }
    print_status(&ctx.game.status(&session).await?, mode);
    print_hint("\nType 'help' for commands.");

    let mut repl = Repl {
        ctx,
        session,
        content,
        input: Input::new(),
        mode,
    };
    loop {
        let Some(line) = repl.input.ask(&format!("\n{} ", ">".bold())).await? else {
            repl.ctx.game.save(&repl.session).await?;
            break;
        };
        match repl.run(parse(&line)).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => print_error(&e.to_string()),
        }
    }
    Ok(())
}
