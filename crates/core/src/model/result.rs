use serde::Serialize;

use crate::model::ids::{QuestionId, SessionId};
use crate::model::session::SessionOutcome;
use crate::scoring;

/// Per-question line of a session result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub submitted: String,
    pub correct_answers: Vec<String>,
    pub is_correct: bool,
    pub credit: f64,
    pub timed_out: bool,
}

/// Summary of a finished (completed or abandoned) session.
///
/// Derived from the submission log; holds no state of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResult {
    session_id: SessionId,
    outcome: SessionOutcome,
    total_questions: usize,
    answered: usize,
    correct_count: usize,
    score_value: f64,
    breakdown: Vec<QuestionOutcome>,
}

impl SessionResult {
    /// Build a result from the scored breakdown of answered questions.
    ///
    /// `score_value` is the mean credit over answered questions, which equals
    /// the mean over all questions for a completed session.
    #[must_use]
    pub fn from_breakdown(
        session_id: SessionId,
        outcome: SessionOutcome,
        total_questions: usize,
        breakdown: Vec<QuestionOutcome>,
    ) -> Self {
        let answered = breakdown.len();
        let correct_count = breakdown.iter().filter(|o| o.is_correct).count();
        let score_value = scoring::aggregate(breakdown.iter().map(|o| o.credit), answered);
        Self {
            session_id,
            outcome,
            total_questions,
            answered,
            correct_count,
            score_value,
            breakdown,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn outcome(&self) -> SessionOutcome {
        self.outcome
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.outcome == SessionOutcome::Completed
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn answered(&self) -> usize {
        self.answered
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    /// Number of answered questions that were not fully correct.
    #[must_use]
    pub fn wrong_count(&self) -> usize {
        self.answered - self.correct_count
    }

    /// Fraction in `[0, 1]`; display formatting is up to the caller.
    #[must_use]
    pub fn score_value(&self) -> f64 {
        self.score_value
    }

    #[must_use]
    pub fn breakdown(&self) -> &[QuestionOutcome] {
        &self.breakdown
    }
}
