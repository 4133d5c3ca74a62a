use std::sync::Arc;

use quiz_core::time::fixed_clock;
use services::{HighScoreError, HighScoreService, QuizEngine, SessionOptions};
use storage::Storage;
use storage::defaults::default_store;

#[tokio::test]
async fn finished_quiz_lands_on_the_sqlite_board() {
    let storage = Storage::sqlite("sqlite:file:memdb_services_board?mode=memory&cache=shared")
        .await
        .expect("storage");
    let scores = HighScoreService::new(fixed_clock(), Arc::clone(&storage.high_scores));

    let mut engine = QuizEngine::new(Arc::new(default_store().unwrap())).with_clock(fixed_clock());
    engine
        .start(&SessionOptions::new().with_category(Some("Geography".into())))
        .unwrap();
    for text in ["Paris", "Nile", "Pacific"] {
        engine.submit_answer(text).unwrap();
    }
    let result = engine.result().unwrap();
    assert_eq!(result.correct_count(), 2);

    let rank = scores.record("Geography", &result).await.unwrap();
    assert_eq!(rank, Some(1));

    let board = scores.board().await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].scores[0].correct(), 2);
    assert_eq!(board[0].scores[0].total(), 3);
}

#[tokio::test]
async fn abandoned_quiz_is_refused() {
    let storage = Storage::in_memory();
    let scores = HighScoreService::new(fixed_clock(), storage.high_scores);

    let mut engine = QuizEngine::new(Arc::new(default_store().unwrap())).with_clock(fixed_clock());
    engine.start(&SessionOptions::new()).unwrap();
    engine.abandon();

    let err = scores
        .record("Geography", &engine.result().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, HighScoreError::Incomplete));
}
