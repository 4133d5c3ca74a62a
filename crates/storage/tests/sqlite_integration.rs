use chrono::Duration;
use quiz_core::model::HighScore;
use quiz_core::time::fixed_now;
use storage::repository::{HighScoreRepository, Storage};
use storage::sqlite::SqliteRepository;

fn score(category: &str, correct: u32, total: u32, minutes: i64) -> HighScore {
    HighScore::from_persisted(
        category,
        correct,
        total,
        f64::from(correct) / f64::from(total),
        fixed_now() + Duration::minutes(minutes),
    )
    .unwrap()
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrips_high_scores_in_rank_order() {
    let repo = connect("memdb_scores_roundtrip").await;

    let first = repo.append_score(&score("Geography", 2, 3, 0)).await.unwrap();
    let second = repo.append_score(&score("Geography", 3, 3, 1)).await.unwrap();
    repo.append_score(&score("Geography", 2, 3, 2)).await.unwrap();
    assert!(second > first);

    let top = repo.top_scores("Geography", 10).await.unwrap();
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].id, second);
    assert_eq!(top[0].score.correct(), 3);
    assert_eq!(top[1].id, first);
    assert_eq!(top[1].score.achieved_at(), fixed_now());
    assert!((top[2].score.score_value() - 2.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn sqlite_prunes_per_category() {
    let repo = connect("memdb_scores_prune").await;

    for correct in 0..=6 {
        repo.append_score(&score("تشريح عصبي", correct, 6, 0)).await.unwrap();
    }
    repo.append_score(&score("Geography", 1, 3, 0)).await.unwrap();

    let deleted = repo.prune_category("تشريح عصبي", 5).await.unwrap();
    assert_eq!(deleted, 2);

    let kept: Vec<u32> = repo
        .top_scores("تشريح عصبي", 10)
        .await
        .unwrap()
        .iter()
        .map(|row| row.score.correct())
        .collect();
    assert_eq!(kept, vec![6, 5, 4, 3, 2]);
    assert_eq!(repo.top_scores("Geography", 10).await.unwrap().len(), 1);

    let categories = repo.categories().await.unwrap();
    assert_eq!(categories, vec!["Geography".to_owned(), "تشريح عصبي".to_owned()]);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_scores_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    assert!(repo.categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn storage_facade_uses_sqlite_backend() {
    let storage = Storage::sqlite("sqlite:file:memdb_scores_facade?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage
        .high_scores
        .append_score(&score("Geography", 1, 1, 0))
        .await
        .unwrap();
    let top = storage.high_scores.top_scores("Geography", 5).await.unwrap();
    assert_eq!(top.len(), 1);
}
