use thiserror::Error;

use crate::model::{HighScoreError, QuestionError};
use crate::scoring::UnknownPolicy;

/// Umbrella error for domain validation in `quiz-core`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    HighScore(#[from] HighScoreError),
    #[error(transparent)]
    Policy(#[from] UnknownPolicy),
}
