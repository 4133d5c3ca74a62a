use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

use crate::model::result::SessionResult;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum HighScoreError {
    #[error("category cannot be empty")]
    EmptyCategory,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("score value {0} is outside [0, 1]")]
    ScoreOutOfRange(f64),

    #[error("too many questions for a score entry: {0}")]
    TooManyQuestions(usize),
}

/// One entry on a category's score board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScore {
    category: String,
    correct: u32,
    total: u32,
    score_value: f64,
    achieved_at: DateTime<Utc>,
}

impl HighScore {
    /// Rehydrate an entry from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `HighScoreError` when the stored values are inconsistent.
    pub fn from_persisted(
        category: impl Into<String>,
        correct: u32,
        total: u32,
        score_value: f64,
        achieved_at: DateTime<Utc>,
    ) -> Result<Self, HighScoreError> {
        let category = category.into();
        if category.trim().is_empty() {
            return Err(HighScoreError::EmptyCategory);
        }
        if correct > total {
            return Err(HighScoreError::CorrectExceedsTotal { correct, total });
        }
        if !(0.0..=1.0).contains(&score_value) {
            return Err(HighScoreError::ScoreOutOfRange(score_value));
        }
        Ok(Self {
            category,
            correct,
            total,
            score_value,
            achieved_at,
        })
    }

    /// Build an entry for a finished session.
    ///
    /// # Errors
    ///
    /// Returns `HighScoreError` for an empty category or oversized sessions.
    pub fn from_result(
        category: impl Into<String>,
        result: &SessionResult,
        achieved_at: DateTime<Utc>,
    ) -> Result<Self, HighScoreError> {
        let to_u32 = |n: usize| u32::try_from(n).map_err(|_| HighScoreError::TooManyQuestions(n));
        Self::from_persisted(
            category,
            to_u32(result.correct_count())?,
            to_u32(result.total_questions())?,
            result.score_value(),
            achieved_at,
        )
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn score_value(&self) -> f64 {
        self.score_value
    }

    #[must_use]
    pub fn achieved_at(&self) -> DateTime<Utc> {
        self.achieved_at
    }

    /// Board ordering: more correct answers first, then higher score, then
    /// the earlier achievement.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .correct
            .cmp(&self.correct)
            .then_with(|| other.score_value.total_cmp(&self.score_value))
            .then_with(|| self.achieved_at.cmp(&other.achieved_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_inconsistent_entries() {
        let now = fixed_now();
        assert_eq!(
            HighScore::from_persisted("", 1, 2, 0.5, now).unwrap_err(),
            HighScoreError::EmptyCategory
        );
        assert_eq!(
            HighScore::from_persisted("Geo", 3, 2, 1.0, now).unwrap_err(),
            HighScoreError::CorrectExceedsTotal { correct: 3, total: 2 }
        );
        assert!(matches!(
            HighScore::from_persisted("Geo", 1, 2, 1.5, now).unwrap_err(),
            HighScoreError::ScoreOutOfRange(_)
        ));
    }

    #[test]
    fn ranks_by_correct_then_score_then_date() {
        let now = fixed_now();
        let later = now + chrono::Duration::minutes(5);
        let best = HighScore::from_persisted("Geo", 3, 3, 1.0, later).unwrap();
        let early = HighScore::from_persisted("Geo", 2, 3, 0.66, now).unwrap();
        let late = HighScore::from_persisted("Geo", 2, 3, 0.66, later).unwrap();

        let mut board = vec![late.clone(), best.clone(), early.clone()];
        board.sort_by(HighScore::rank_cmp);
        assert_eq!(board, vec![best, early, late]);
    }
}
