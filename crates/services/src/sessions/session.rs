use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use quiz_core::model::{
    AnswerSubmission, Question, QuestionId, QuestionOutcome, SessionId, SessionOutcome,
    SessionResult, SessionState,
};
use quiz_core::{Score, ScoringPolicy};
use storage::QuestionStore;

use super::plan::{SessionOptions, SessionPlanner};
use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── ANSWER RESULT ─────────────────────────────────────────────────────────────
//

/// Immediate feedback for one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    pub question_id: QuestionId,
    /// Zero-based position of the answered question.
    pub index: usize,
    pub submitted: String,
    pub is_correct: bool,
    pub credit: f64,
    pub timed_out: bool,
    pub correct_answers: Vec<String>,
    /// State after the submission was recorded.
    pub state: SessionState,
}

impl AnswerResult {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Completed
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One run through a fixed, ordered snapshot of questions.
///
/// The session owns its questions, so later changes to the store never
/// affect it. Submissions are append-only and every score is recomputed
/// from them with the policy the session was started with.
pub struct QuizSession {
    id: SessionId,
    category: Option<String>,
    questions: Vec<Question>,
    current: usize,
    submissions: Vec<AnswerSubmission>,
    state: SessionState,
    policy: Arc<dyn ScoringPolicy>,
    time_limit: Option<Duration>,
    started_at: DateTime<Utc>,
    presented_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Draw questions from `store` and start a session at `now`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQuestionSet` if the options select nothing
    /// or more questions than the store holds.
    pub fn start(
        store: &QuestionStore,
        options: &SessionOptions,
        policy: Arc<dyn ScoringPolicy>,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let plan = SessionPlanner::new(store, options).build()?;
        let session = Self::from_questions(
            plan.questions,
            options.category().map(str::to_owned),
            policy,
            options.time_limit(),
            now,
        )?;
        tracing::info!(
            session_id = %session.id,
            questions = session.total_questions(),
            available = plan.available,
            policy = session.policy.name(),
            "quiz session started"
        );
        Ok(session)
    }

    /// Start a session over an explicit question list.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQuestionSet` if `questions` is empty and
    /// `SessionError::DuplicateQuestion` if an id repeats.
    pub fn from_questions(
        questions: Vec<Question>,
        category: Option<String>,
        policy: Arc<dyn ScoringPolicy>,
        time_limit: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyQuestionSet {
                requested: 0,
                available: 0,
            });
        }
        let mut seen = HashSet::with_capacity(questions.len());
        if let Some(dup) = questions.iter().find(|q| !seen.insert(q.id())) {
            return Err(SessionError::DuplicateQuestion(dup.id()));
        }

        Ok(Self {
            id: SessionId::generate(),
            category,
            questions,
            current: 0,
            submissions: Vec::new(),
            state: SessionState::InProgress,
            policy,
            time_limit,
            started_at: now,
            presented_at: now,
            ended_at: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Zero-based index of the question on screen; equals the question count
    /// once the session is completed.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn submissions(&self) -> &[AnswerSubmission] {
        &self.submissions
    }

    /// The question awaiting an answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` once the session has ended.
    pub fn current_question(&self) -> Result<&Question, SessionError> {
        self.current_question_for("read the current question")
    }

    /// Time left to answer the current question, clamped at zero.
    /// `None` without a time limit or outside `InProgress`.
    #[must_use]
    pub fn remaining_time(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.state != SessionState::InProgress {
            return None;
        }
        let limit = self.time_limit?;
        let left = self.presented_at + limit - now;
        Some(left.max(Duration::zero()))
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.time_limit
            .is_some_and(|limit| now > self.presented_at + limit)
    }

    /// Record an answer for the current question and advance.
    ///
    /// An answer arriving after the time limit is recorded as timed out and
    /// earns no credit.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` if there is no current question.
    pub fn submit_answer(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<AnswerResult, SessionError> {
        let question_id = self.current_question_for("submit an answer")?.id();
        let submission = if self.is_expired(now) {
            AnswerSubmission::timed_out(question_id, text, now)
        } else {
            AnswerSubmission::new(question_id, text, now)
        };
        Ok(self.record(submission))
    }

    /// Record that the current question ran out of time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` if there is no current question.
    pub fn time_out(&mut self, now: DateTime<Utc>) -> Result<AnswerResult, SessionError> {
        let question_id = self.current_question_for("time out a question")?.id();
        Ok(self.record(AnswerSubmission::timed_out(question_id, "", now)))
    }

    /// Stop the session early. Returns whether anything changed; outside
    /// `InProgress` this is a no-op.
    pub fn abandon(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != SessionState::InProgress {
            return false;
        }
        self.state = SessionState::Abandoned;
        self.ended_at = Some(now);
        tracing::info!(
            session_id = %self.id,
            answered = self.submissions.len(),
            total = self.questions.len(),
            "quiz session abandoned"
        );
        true
    }

    /// Final result, rebuilt from the submission log on every call.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` while the session is in progress.
    pub fn result(&self) -> Result<SessionResult, SessionError> {
        let outcome = SessionOutcome::from_state(self.state)
            .ok_or_else(|| SessionError::invalid("produce a result", self.state))?;
        let breakdown = self
            .questions
            .iter()
            .zip(&self.submissions)
            .map(|(question, submission)| self.outcome_for(question, submission))
            .collect();
        Ok(SessionResult::from_breakdown(
            self.id,
            outcome,
            self.questions.len(),
            breakdown,
        ))
    }

    /// Credit earned so far.
    #[must_use]
    pub fn running_score(&self) -> f64 {
        self.questions
            .iter()
            .zip(&self.submissions)
            .map(|(question, submission)| self.score(question, submission).credit)
            .sum()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(self.questions.len(), self.submissions.len())
    }

    fn ensure_in_progress(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.state == SessionState::InProgress {
            Ok(())
        } else {
            Err(SessionError::invalid(operation, self.state))
        }
    }

    fn current_question_for(&self, operation: &'static str) -> Result<&Question, SessionError> {
        self.ensure_in_progress(operation)?;
        self.questions
            .get(self.current)
            .ok_or_else(|| SessionError::invalid(operation, self.state))
    }

    fn score(&self, question: &Question, submission: &AnswerSubmission) -> Score {
        if submission.is_timed_out() {
            Score::incorrect()
        } else {
            self.policy.score(question, submission.submitted_text())
        }
    }

    fn outcome_for(&self, question: &Question, submission: &AnswerSubmission) -> QuestionOutcome {
        let score = self.score(question, submission);
        QuestionOutcome {
            question_id: question.id(),
            submitted: submission.submitted_text().to_owned(),
            correct_answers: question.accepted_answers().to_vec(),
            is_correct: score.is_correct,
            credit: score.credit,
            timed_out: submission.is_timed_out(),
        }
    }

    fn record(&mut self, submission: AnswerSubmission) -> AnswerResult {
        let index = self.current;
        let question = &self.questions[index];
        let outcome = self.outcome_for(question, &submission);
        let now = submission.submitted_at();

        self.submissions.push(submission);
        self.current += 1;
        self.presented_at = now;

        tracing::debug!(
            session_id = %self.id,
            question_id = %outcome.question_id,
            index,
            is_correct = outcome.is_correct,
            timed_out = outcome.timed_out,
            "answer recorded"
        );

        if self.current == self.questions.len() {
            self.state = SessionState::Completed;
            self.ended_at = Some(now);
            tracing::info!(
                session_id = %self.id,
                total = self.questions.len(),
                "quiz session completed"
            );
        }

        AnswerResult {
            question_id: outcome.question_id,
            index,
            submitted: outcome.submitted,
            is_correct: outcome.is_correct,
            credit: outcome.credit,
            timed_out: outcome.timed_out,
            correct_answers: outcome.correct_answers,
            state: self.state,
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("current", &self.current)
            .field("total", &self.questions.len())
            .field("policy", &self.policy.name())
            .finish_non_exhaustive()
    }
}
