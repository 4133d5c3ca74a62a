mod high_score;
mod ids;
mod question;
mod result;
mod session;
mod submission;

pub use high_score::{HighScore, HighScoreError};
pub use ids::{ParseIdError, QuestionId, SessionId};
pub use question::{CorrectAnswer, Difficulty, Question, QuestionError, QuestionMeta};
pub use result::{QuestionOutcome, SessionResult};
pub use session::{SessionOutcome, SessionState};
pub use submission::AnswerSubmission;
