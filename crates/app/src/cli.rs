use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quiz_core::PolicyKind;

pub const DEFAULT_DB_URL: &str = "sqlite://quiz_scores.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "quizmaster", version, about = "Terminal quiz runner with per-category high scores")]
#[command(after_help = "ENVIRONMENT VARIABLES:
    QUIZ_DB_URL   Score database (same as --db)
    QUIZ_LOG      Log filter, e.g. info or services=debug (same as --log)

EXAMPLES:
    quizmaster play                                  # built-in bank, all questions
    quizmaster play --questions bank.json --count 10 --time-limit 30
    quizmaster scores --category Geography
    quizmaster init-bank bank.json")]
pub struct Cli {
    /// SQLite database holding the score boards
    #[arg(long, global = true, env = "QUIZ_DB_URL", default_value = DEFAULT_DB_URL)]
    pub db: String,

    /// tracing filter directive
    #[arg(long, global = true, env = "QUIZ_LOG", default_value = "warn")]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a quiz in the terminal
    Play(PlayArgs),

    /// List the categories of a question bank
    Categories {
        /// Question file (defaults to the built-in bank)
        #[arg(long)]
        questions: Option<PathBuf>,
    },

    /// Show the high score boards
    Scores {
        /// Only this category
        #[arg(long)]
        category: Option<String>,

        /// Print the boards as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the built-in bank to a file as a starting point
    InitBank {
        path: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct PlayArgs {
    /// Question file (defaults to the built-in bank)
    #[arg(long)]
    pub questions: Option<PathBuf>,

    /// Only ask questions from this category
    #[arg(long)]
    pub category: Option<String>,

    /// Number of questions to ask [default: all]
    #[arg(long)]
    pub count: Option<usize>,

    /// Keep file order
    #[arg(long)]
    pub no_shuffle: bool,

    /// Seed for a reproducible order
    #[arg(long)]
    pub seed: Option<u64>,

    /// exact, case-insensitive, choice-index or partial
    #[arg(long, default_value_t = PolicyKind::default())]
    pub policy: PolicyKind,

    /// Seconds allowed per question
    #[arg(long)]
    pub time_limit: Option<u32>,

    /// Print the result as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn play_flags_parse() {
        let cli = Cli::try_parse_from([
            "quizmaster",
            "--db",
            "sqlite::memory:",
            "play",
            "--count",
            "2",
            "--policy",
            "choice_index",
            "--no-shuffle",
            "--time-limit",
            "30",
        ])
        .unwrap();
        assert_eq!(cli.db, "sqlite::memory:");
        let Command::Play(args) = cli.command else {
            panic!("expected play");
        };
        assert_eq!(args.count, Some(2));
        assert_eq!(args.policy, PolicyKind::ChoiceIndex);
        assert!(args.no_shuffle);
        assert_eq!(args.time_limit, Some(30));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = Cli::try_parse_from(["quizmaster", "play", "--policy", "fuzzy"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
