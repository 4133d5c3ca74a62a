mod engine;
mod plan;
mod progress;
mod session;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use engine::QuizEngine;
pub use plan::{SessionOptions, SessionPlan, SessionPlanner};
pub use progress::SessionProgress;
pub use session::{AnswerResult, QuizSession};
