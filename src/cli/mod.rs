//! CLI interface for Enigma Hunter.

pub mod handlers;
pub mod output;
pub mod repl;
pub mod resolve;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::services::ConflictMode;
use output::OutputMode;

/// Enigma Hunter - mystery investigation game
#[derive(Parser)]
#[command(name = "enigma-hunter", version, about, long_about = None)]
pub struct Cli {
    /// Override data directory (default: ~/.enigma-hunter)
    #[arg(long, env = "ENIGMA_DATA_PATH", global = true)]
    pub data_path: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    /// Output as Markdown
    #[arg(long, global = true)]
    pub md: bool,

    /// Game session to act on (default: the last one played)
    #[arg(long, global = true)]
    pub session: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a story directory (historia_base.json, ambientes/, personagens/, data/, prompts/)
    Upload {
        /// Story directory
        dir: PathBuf,
        /// Story id (default: slug of the directory name)
        #[arg(long)]
        story_id: Option<String>,
        /// What to do when the story already exists
        #[arg(long, value_enum, default_value_t = ConflictMode::Error)]
        on_conflict: ConflictMode,
        /// Count documents without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List uploaded stories
    Stories,

    /// Delete a story and all its content
    DeleteStory {
        story_id: String,
    },

    /// Start a new game
    NewGame {
        /// Story id
        story: String,
        /// Detective name
        #[arg(long, default_value = "Detective")]
        player: String,
    },

    /// List game sessions
    Sessions {
        /// Only sessions of this story
        #[arg(long)]
        story: Option<String>,
    },

    /// Delete a game session and its dialogue history
    DeleteSession {
        session_id: String,
    },

    /// Play interactively
    Play,

    /// Scan a QR code
    Scan {
        /// Code uuid
        uuid: String,
    },

    /// Say something to a character in your location
    Talk {
        /// Character name or number
        character: String,
        /// What to say
        message: String,
    },

    /// Where you are and what you carry
    Status,

    /// Completion percentage
    Progress,

    /// Contextual hints
    Hints,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, elvish, powershell)
        shell: clap_complete::Shell,
    },
}

/// Print shell completions to stdout.
pub fn print_completions(shell: clap_complete::Shell) {
    clap_complete::generate(
        shell,
        &mut Cli::command(),
        "enigma-hunter",
        &mut std::io::stdout(),
    );
}

/// Execute a CLI command.
pub async fn execute(
    command: &Commands,
    ctx: &crate::init::AppContext,
    session: Option<&str>,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match command {
        Commands::Upload {
            dir,
            story_id,
            on_conflict,
            dry_run,
        } => {
            handlers::story::handle_upload(
                ctx,
                dir,
                story_id.as_deref(),
                *on_conflict,
                *dry_run,
                mode,
            )
            .await?
        }
        Commands::Stories => handlers::story::handle_stories(ctx, mode).await?,
        Commands::DeleteStory { story_id } => {
            handlers::story::handle_delete_story(ctx, story_id, mode).await?
        }

        Commands::NewGame { story, player } => {
            handlers::game::handle_new_game(ctx, story, player, mode).await?
        }
        Commands::Sessions { story } => {
            handlers::game::handle_sessions(ctx, story.as_deref(), mode).await?
        }
        Commands::DeleteSession { session_id } => {
            handlers::game::handle_delete_session(ctx, session_id, mode).await?
        }
        Commands::Play => handlers::play::handle_play(ctx, session, mode).await?,
        Commands::Scan { uuid } => handlers::game::handle_scan(ctx, uuid, session, mode).await?,
        Commands::Talk { character, message } => {
            handlers::game::handle_talk(ctx, character, message, session, mode).await?
        }
        Commands::Status => handlers::game::handle_status(ctx, session, mode).await?,
        Commands::Progress => handlers::game::handle_progress(ctx, session, mode).await?,
        Commands::Hints => handlers::game::handle_hints(ctx, session, mode).await?,

        Commands::Completions { shell } => print_completions(*shell),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upload_flags() {
        let cli = Cli::try_parse_from([
            "enigma-hunter",
            "upload",
            "stories/manor",
            "--on-conflict",
            "replace",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Upload {
                on_conflict,
                dry_run,
                story_id,
                ..
            } => {
                assert_eq!(on_conflict, ConflictMode::Replace);
                assert!(dry_run);
                assert!(story_id.is_none());
            }
            _ => panic!("expected upload"),
        }
    }

    #[test]
    fn test_session_flag_is_global() {
        let cli =
            Cli::try_parse_from(["enigma-hunter", "status", "--session", "abc"]).unwrap();
        assert_eq!(cli.session.as_deref(), Some("abc"));
        assert!(matches!(cli.command, Commands::Status));
    }
}
