mod cli;
mod db;
mod terminal;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use chrono::Duration;
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use quiz_core::model::SessionResult;
use quiz_core::{Clock, shape};
use services::{
    CategoryBoard, HighScoreError, HighScoreService, QuizEngine, SessionError, SessionOptions,
};
use storage::defaults::default_store;
use storage::sqlite::SqliteInitError;
use storage::{QuestionStore, QuestionStoreError, Storage};

use cli::{Cli, Command, PlayArgs};
use terminal::Terminal;

/// Board name for sessions played without a category filter.
const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid --db value: {0}")]
    InvalidDbUrl(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Questions(#[from] QuestionStoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    HighScores(#[from] HighScoreError),

    #[error(transparent)]
    Database(#[from] SqliteInitError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_questions(path: Option<&Path>) -> Result<QuestionStore, AppError> {
    let store = match path {
        Some(path) => QuestionStore::load_path(path)?,
        None => default_store()?,
    };
    Ok(store)
}

async fn open_storage(raw_url: &str) -> Result<Storage, AppError> {
    // Open + migrate SQLite lazily. Only commands that touch scores pay for it.
    let url = db::normalize_sqlite_url(raw_url);
    db::prepare_sqlite_file(&url)?;
    Ok(Storage::sqlite(&url).await?)
}

async fn play(args: PlayArgs, db_url: &str) -> Result<(), AppError> {
    let store = load_questions(args.questions.as_deref())?;
    let mut engine = QuizEngine::new(Arc::new(store))
        .with_clock(Clock::system())
        .with_policy(args.policy.build());

    let options = SessionOptions::new()
        .with_selection_size(args.count)
        .with_shuffle(!args.no_shuffle)
        .with_seed(args.seed)
        .with_category(args.category.clone())
        .with_time_limit(args.time_limit.map(|secs| Duration::seconds(i64::from(secs))));
    engine.start(&options)?;

    let result = {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut terminal = Terminal::new(stdin.lock(), stdout.lock());
        let result = terminal.run(&mut engine)?;
        if args.json {
            let mut out = terminal.into_output();
            serde_json::to_writer_pretty(&mut out, &result)?;
            writeln!(out)?;
        } else {
            terminal.show_result(&result)?;
        }
        result
    };

    if !result.is_completed() {
        return Ok(());
    }
    let category = args.category.as_deref().unwrap_or(ALL_CATEGORIES);
    let rank = record(&result, category, db_url).await?;
    if let (false, Some(rank)) = (args.json, rank) {
        println!("New high score for {}: #{rank}", shape(category));
    }
    Ok(())
}

async fn record(
    result: &SessionResult,
    category: &str,
    db_url: &str,
) -> Result<Option<usize>, AppError> {
    let storage = open_storage(db_url).await?;
    let scores = HighScoreService::new(Clock::system(), storage.high_scores);
    Ok(scores.record(category, result).await?)
}

fn categories(path: Option<&Path>) -> Result<(), AppError> {
    let store = load_questions(path)?;
    let mut out = io::stdout().lock();
    for category in store.categories() {
        let count = store.in_category(category).count();
        writeln!(out, "{} ({count})", shape(category))?;
    }
    let uncategorised = store.iter().filter(|q| q.category().is_none()).count();
    if uncategorised > 0 {
        writeln!(out, "(no category) ({uncategorised})")?;
    }
    Ok(())
}

async fn scores(category: Option<String>, json: bool, db_url: &str) -> Result<(), AppError> {
    let storage = open_storage(db_url).await?;
    let service = HighScoreService::new(Clock::system(), storage.high_scores);
    let boards = match category {
        Some(category) => {
            let scores = service.top(&category).await?;
            vec![CategoryBoard { category, scores }]
        }
        None => service.board().await?,
    };

    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &boards)?;
        writeln!(out)?;
        return Ok(());
    }
    if boards.is_empty() {
        writeln!(out, "No high scores yet.")?;
    }
    for board in boards {
        writeln!(out, "{}", shape(&board.category))?;
        for (rank, score) in board.scores.iter().enumerate() {
            writeln!(
                out,
                "  {}. {}/{}  {:.1}%  {}",
                rank + 1,
                score.correct(),
                score.total(),
                score.score_value() * 100.0,
                score.achieved_at().format("%Y-%m-%d %H:%M")
            )?;
        }
    }
    Ok(())
}

fn init_bank(path: &Path) -> Result<(), AppError> {
    let store = default_store()?;
    let mut writer = BufWriter::new(File::create(path)?);
    store.write_json(&mut writer)?;
    writer.flush()?;
    tracing::info!(path = %path.display(), questions = store.count(), "question bank written");
    Ok(())
}

async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    match cli.command {
        Command::Play(args) => play(args, &cli.db).await,
        Command::Categories { questions } => categories(questions.as_deref()),
        Command::Scores { category, json } => scores(category, json, &cli.db).await,
        Command::InitBank { path } => init_bank(&path),
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
