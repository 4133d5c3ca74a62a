use async_trait::async_trait;
use quiz_core::model::HighScore;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted high score together with its storage id.
#[derive(Debug, Clone, PartialEq)]
pub struct HighScoreRow {
    pub id: i64,
    pub score: HighScore,
}

impl HighScoreRow {
    #[must_use]
    pub fn new(id: i64, score: HighScore) -> Self {
        Self { id, score }
    }
}

/// Repository contract for per-category score boards.
#[async_trait]
pub trait HighScoreRepository: Send + Sync {
    /// Append a score and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the score cannot be stored.
    async fn append_score(&self, score: &HighScore) -> Result<i64, StorageError>;

    /// Best scores for a category, best first (see `HighScore::rank_cmp`),
    /// ties broken by insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the scores cannot be read.
    async fn top_scores(&self, category: &str, limit: u32)
    -> Result<Vec<HighScoreRow>, StorageError>;

    /// Categories that have at least one score, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the categories cannot be read.
    async fn categories(&self) -> Result<Vec<String>, StorageError>;

    /// Delete everything but the best `keep` scores of a category.
    /// Returns the number of deleted rows.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the deletion fails.
    async fn prune_category(&self, category: &str, keep: u32) -> Result<u64, StorageError>;
}

#[derive(Debug, Default)]
struct ScoreTable {
    next_id: i64,
    rows: Vec<HighScoreRow>,
}

impl ScoreTable {
    fn ranked(&self, category: &str) -> Vec<HighScoreRow> {
        let mut rows: Vec<HighScoreRow> = self
            .rows
            .iter()
            .filter(|row| row.score.category() == category)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.score.rank_cmp(&b.score).then_with(|| a.id.cmp(&b.id)));
        rows
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    scores: Arc<Mutex<ScoreTable>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> Result<std::sync::MutexGuard<'_, ScoreTable>, StorageError> {
        self.scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl HighScoreRepository for InMemoryRepository {
    async fn append_score(&self, score: &HighScore) -> Result<i64, StorageError> {
        let mut table = self.table()?;
        table.next_id += 1;
        let id = table.next_id;
        table.rows.push(HighScoreRow::new(id, score.clone()));
        Ok(id)
    }

    async fn top_scores(
        &self,
        category: &str,
        limit: u32,
    ) -> Result<Vec<HighScoreRow>, StorageError> {
        let table = self.table()?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut rows = table.ranked(category);
        rows.truncate(limit);
        Ok(rows)
    }

    async fn categories(&self) -> Result<Vec<String>, StorageError> {
        let table = self.table()?;
        let categories: BTreeSet<String> = table
            .rows
            .iter()
            .map(|row| row.score.category().to_owned())
            .collect();
        Ok(categories.into_iter().collect())
    }

    async fn prune_category(&self, category: &str, keep: u32) -> Result<u64, StorageError> {
        let mut table = self.table()?;
        let keep = usize::try_from(keep).unwrap_or(usize::MAX);
        let doomed: Vec<i64> = table
            .ranked(category)
            .into_iter()
            .skip(keep)
            .map(|row| row.id)
            .collect();
        table.rows.retain(|row| !doomed.contains(&row.id));
        Ok(doomed.len() as u64)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub high_scores: Arc<dyn HighScoreRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo: Arc<dyn HighScoreRepository> = Arc::new(InMemoryRepository::new());
        Self { high_scores: repo }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::fixed_now;

    fn score(category: &str, correct: u32, minutes: i64) -> HighScore {
        HighScore::from_persisted(
            category,
            correct,
            5,
            f64::from(correct) / 5.0,
            fixed_now() + Duration::minutes(minutes),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn top_scores_are_ranked_and_limited() {
        let repo = InMemoryRepository::new();
        for (correct, minute) in [(2, 0), (5, 1), (3, 2), (5, 3)] {
            repo.append_score(&score("Geo", correct, minute)).await.unwrap();
        }
        repo.append_score(&score("Space", 4, 0)).await.unwrap();

        let top = repo.top_scores("Geo", 3).await.unwrap();
        let corrects: Vec<u32> = top.iter().map(|r| r.score.correct()).collect();
        assert_eq!(corrects, vec![5, 5, 3]);
        assert!(top[0].score.achieved_at() < top[1].score.achieved_at());
    }

    #[tokio::test]
    async fn prune_keeps_only_the_best() {
        let repo = InMemoryRepository::new();
        for correct in 0..=5 {
            repo.append_score(&score("Geo", correct, 0)).await.unwrap();
        }
        repo.append_score(&score("Space", 1, 0)).await.unwrap();

        let deleted = repo.prune_category("Geo", 2).await.unwrap();
        assert_eq!(deleted, 4);

        let remaining = repo.top_scores("Geo", 10).await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].score.correct(), 5);
        assert_eq!(repo.top_scores("Space", 10).await.unwrap().len(), 1);
        assert_eq!(repo.categories().await.unwrap(), vec!["Geo", "Space"]);
    }
}
