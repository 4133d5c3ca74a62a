use serde::Serialize;
use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{HighScore, SessionResult};
use storage::HighScoreRepository;

use crate::error::HighScoreError;

/// Entries kept per category.
pub const DEFAULT_BOARD_SIZE: u32 = 5;

/// Best scores of one category, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBoard {
    pub category: String,
    pub scores: Vec<HighScore>,
}

/// Records finished quizzes on per-category score boards.
#[derive(Clone)]
pub struct HighScoreService {
    clock: Clock,
    repo: Arc<dyn HighScoreRepository>,
    keep: u32,
}

impl HighScoreService {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn HighScoreRepository>) -> Self {
        Self {
            clock,
            repo,
            keep: DEFAULT_BOARD_SIZE,
        }
    }

    /// Board size per category.
    #[must_use]
    pub fn with_keep(mut self, keep: u32) -> Self {
        self.keep = keep;
        self
    }

    #[must_use]
    pub fn keep(&self) -> u32 {
        self.keep
    }

    /// Store a completed result and trim the category board.
    ///
    /// Returns the one-based rank of the new entry, or `None` if it did not
    /// make the board.
    ///
    /// # Errors
    ///
    /// Returns `HighScoreError::Incomplete` for abandoned sessions, and
    /// `HighScoreError::Storage` if persistence fails.
    pub async fn record(
        &self,
        category: &str,
        result: &SessionResult,
    ) -> Result<Option<usize>, HighScoreError> {
        if !result.is_completed() {
            return Err(HighScoreError::Incomplete);
        }
        let score = HighScore::from_result(category, result, self.clock.now())?;
        let id = self.repo.append_score(&score).await?;
        let pruned = self.repo.prune_category(category, self.keep).await?;
        let board = self.repo.top_scores(category, self.keep).await?;
        let rank = board.iter().position(|row| row.id == id).map(|pos| pos + 1);

        tracing::info!(
            category,
            correct = score.correct(),
            total = score.total(),
            rank,
            pruned,
            "high score recorded"
        );
        Ok(rank)
    }

    /// Best scores of `category`, best first.
    ///
    /// # Errors
    ///
    /// Returns `HighScoreError::Storage` if the board cannot be read.
    pub async fn top(&self, category: &str) -> Result<Vec<HighScore>, HighScoreError> {
        let rows = self.repo.top_scores(category, self.keep).await?;
        Ok(rows.into_iter().map(|row| row.score).collect())
    }

    /// Every category board, categories in ascending order.
    ///
    /// # Errors
    ///
    /// Returns `HighScoreError::Storage` if a board cannot be read.
    pub async fn board(&self) -> Result<Vec<CategoryBoard>, HighScoreError> {
        let mut boards = Vec::new();
        for category in self.repo.categories().await? {
            let scores = self.top(&category).await?;
            boards.push(CategoryBoard { category, scores });
        }
        Ok(boards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionId, QuestionOutcome, SessionId, SessionOutcome};
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::InMemoryRepository;

    fn result(outcome: SessionOutcome, correct: usize, total: usize) -> SessionResult {
        let breakdown = (0..total)
            .map(|i| {
                let is_correct = i < correct;
                QuestionOutcome {
                    question_id: QuestionId::new(i as u64 + 1),
                    submitted: "x".into(),
                    correct_answers: vec!["x".into()],
                    is_correct,
                    credit: if is_correct { 1.0 } else { 0.0 },
                    timed_out: false,
                }
            })
            .collect();
        SessionResult::from_breakdown(SessionId::generate(), outcome, total, breakdown)
    }

    fn service() -> HighScoreService {
        HighScoreService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn abandoned_results_are_not_recorded() {
        let svc = service();
        let err = svc
            .record("Geo", &result(SessionOutcome::Abandoned, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, HighScoreError::Incomplete));
        assert!(svc.board().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn record_returns_rank_and_keeps_five() {
        let svc = service();
        for correct in [1, 3, 2, 5, 4] {
            svc.record("Geo", &result(SessionOutcome::Completed, correct, 5))
                .await
                .unwrap();
        }

        let rank = svc
            .record("Geo", &result(SessionOutcome::Completed, 4, 5))
            .await
            .unwrap();
        // Ties rank behind the earlier entry.
        assert_eq!(rank, Some(3));

        let worst = svc
            .record("Geo", &result(SessionOutcome::Completed, 0, 5))
            .await
            .unwrap();
        assert_eq!(worst, None);

        let top: Vec<u32> = svc
            .top("Geo")
            .await
            .unwrap()
            .iter()
            .map(HighScore::correct)
            .collect();
        assert_eq!(top, vec![5, 4, 4, 3, 2]);
        assert!(svc.top("Geo").await.unwrap().iter().all(|s| s.achieved_at() == fixed_now()));
    }

    #[tokio::test]
    async fn board_lists_each_category() {
        let svc = service().with_keep(2);
        svc.record("Space", &result(SessionOutcome::Completed, 1, 2))
            .await
            .unwrap();
        svc.record("Geo", &result(SessionOutcome::Completed, 2, 2))
            .await
            .unwrap();

        let board = svc.board().await.unwrap();
        let names: Vec<&str> = board.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(names, vec!["Geo", "Space"]);
        assert_eq!(board[0].scores[0].correct(), 2);
    }
}
