mod app;
use flashcards_app::*;

use app::{App, Outcome};
use clap::{Parser, Subcommand};
use config::{AppConfig, DEFAULT_CONFIG_FILE};
use models::{GroupColor, GroupScope};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flashcards", about = "Study flashcards and track your progress", version)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage flashcard groups
    #[command(subcommand)]
    Group(GroupCommand),

    /// Manage flashcards
    #[command(subcommand)]
    Card(CardCommand),

    /// Record the outcome of reviewing a card
    Review {
        card: i64,
        outcome: Outcome,
    },

    /// Start or finish a study session
    #[command(subcommand)]
    Session(SessionCommand),

    /// Show study statistics
    Stats {
        /// Restrict to one group
        #[arg(long)]
        group: Option<i64>,
    },

    /// Rank all users by mastered cards
    Leaderboard,

    /// Write a group and its cards to a JSON file
    Export { group: i64, path: PathBuf },

    /// Create a group from a JSON file
    Import { path: PathBuf },
}

#[derive(Subcommand)]
enum GroupCommand {
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "blue")]
        color: GroupColor,
    },
    List,
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<GroupColor>,
    },
    /// Delete a group together with its cards
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum CardCommand {
    Add {
        group: i64,
        front: String,
        back: String,
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,
    },
    /// List cards, newest first
    List {
        #[arg(long)]
        group: Option<i64>,
    },
    /// List cards whose review date has come
    Due {
        #[arg(long)]
        group: Option<i64>,
    },
    Edit {
        id: i64,
        #[arg(long)]
        front: Option<String>,
        #[arg(long)]
        back: Option<String>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum SessionCommand {
    Start {
        /// Study one group instead of all of them
        #[arg(long)]
        group: Option<i64>,
    },
    End {
        id: i64,
        #[arg(long)]
        studied: u32,
        #[arg(long)]
        correct: u32,
    },
    List,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    let app = App::new(config, cli.json)?;

    match cli.command {
        Command::Group(GroupCommand::Add {
            name,
            description,
            color,
        }) => app.add_group(&name, &description, color),
        Command::Group(GroupCommand::List) => app.list_groups(),
        Command::Group(GroupCommand::Edit {
            id,
            name,
            description,
            color,
        }) => app.edit_group(id, name, description, color),
        Command::Group(GroupCommand::Delete { id }) => app.delete_group(id),

        Command::Card(CardCommand::Add {
            group,
            front,
            back,
            difficulty,
        }) => app.add_card(group, &front, &back, difficulty),
        Command::Card(CardCommand::List { group }) => app.list_cards(group),
        Command::Card(CardCommand::Due { group }) => app.due_cards(group),
        Command::Card(CardCommand::Edit {
            id,
            front,
            back,
            difficulty,
        }) => app.edit_card(id, front, back, difficulty),
        Command::Card(CardCommand::Delete { id }) => app.delete_card(id),

        Command::Review { card, outcome } => app.review(card, outcome),

        Command::Session(SessionCommand::Start { group }) => {
            app.start_session(GroupScope::from_group(group))
        }
        Command::Session(SessionCommand::End {
            id,
            studied,
            correct,
        }) => app.end_session(id, studied, correct),
        Command::Session(SessionCommand::List) => app.list_sessions(),

        Command::Stats { group } => app.stats(group),
        Command::Leaderboard => app.leaderboard(),
        Command::Export { group, path } => app.export(group, &path),
        Command::Import { path } => app.import(&path),
    }
}
