//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{HighScoreError as HighScoreEntryError, QuestionId, SessionState};
use storage::StorageError;

/// Errors emitted by quiz sessions and the engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("not enough questions: requested {requested}, available {available}")]
    EmptyQuestionSet { requested: usize, available: usize },

    #[error("cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("question {0} appears more than once in the session")]
    DuplicateQuestion(QuestionId),
}

impl SessionError {
    pub(crate) fn invalid(operation: &'static str, state: SessionState) -> Self {
        Self::InvalidState { operation, state }
    }
}

/// Errors emitted by `HighScoreService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HighScoreError {
    #[error("only completed sessions are recorded")]
    Incomplete,

    #[error(transparent)]
    Entry(#[from] HighScoreEntryError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
