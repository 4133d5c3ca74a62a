#![forbid(unsafe_code)]

pub mod error;
pub mod high_scores;
pub mod sessions;

pub use quiz_core::Clock;

pub use error::{HighScoreError, SessionError};
pub use high_scores::{CategoryBoard, DEFAULT_BOARD_SIZE, HighScoreService};
pub use sessions::{
    AnswerResult, QuizEngine, QuizSession, SessionOptions, SessionPlan, SessionPlanner,
    SessionProgress,
};
