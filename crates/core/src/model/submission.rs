use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// One recorded answer. Created once per presented question and never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    question_id: QuestionId,
    submitted_text: String,
    submitted_at: DateTime<Utc>,
    timed_out: bool,
}

impl AnswerSubmission {
    #[must_use]
    pub fn new(
        question_id: QuestionId,
        submitted_text: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            question_id,
            submitted_text: submitted_text.into(),
            submitted_at,
            timed_out: false,
        }
    }

    /// A submission that arrived after the question's time limit.
    #[must_use]
    pub fn timed_out(
        question_id: QuestionId,
        submitted_text: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            timed_out: true,
            ..Self::new(question_id, submitted_text, submitted_at)
        }
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn submitted_text(&self) -> &str {
        &self.submitted_text
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        self.timed_out
    }
}
