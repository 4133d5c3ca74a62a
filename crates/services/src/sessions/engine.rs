use chrono::Duration;
use std::sync::Arc;

use quiz_core::model::{Question, SessionResult, SessionState};
use quiz_core::{Clock, PolicyKind, ScoringPolicy};
use storage::QuestionStore;

use super::plan::SessionOptions;
use super::progress::SessionProgress;
use super::session::{AnswerResult, QuizSession};
use crate::error::SessionError;

/// Presentation-facing entry point: one store, one clock, at most one session.
///
/// Reports `NotStarted` until the first `start`. A finished session stays
/// readable until the next `start` replaces it.
#[derive(Debug)]
pub struct QuizEngine {
    store: Arc<QuestionStore>,
    clock: Clock,
    policy: Arc<dyn ScoringPolicy>,
    session: Option<QuizSession>,
}

impl QuizEngine {
    #[must_use]
    pub fn new(store: Arc<QuestionStore>) -> Self {
        Self {
            store,
            clock: Clock::default(),
            policy: PolicyKind::default().build(),
            session: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Policy used by sessions started from now on.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn ScoringPolicy>) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn store(&self) -> &QuestionStore {
        &self.store
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Mutable access for callers that drive a fixed clock.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::NotStarted, QuizSession::state)
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    /// Start a new session, replacing a finished one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` while a session is in progress and
    /// `SessionError::EmptyQuestionSet` when the options select nothing.
    pub fn start(&mut self, options: &SessionOptions) -> Result<&QuizSession, SessionError> {
        if self.state() == SessionState::InProgress {
            return Err(SessionError::invalid(
                "start a new session",
                SessionState::InProgress,
            ));
        }
        let session = QuizSession::start(
            &self.store,
            options,
            Arc::clone(&self.policy),
            self.clock.now(),
        )?;
        Ok(&*self.session.insert(session))
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` when no session is in progress.
    pub fn current_question(&self) -> Result<&Question, SessionError> {
        self.active("read the current question")?.current_question()
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` when no session is in progress.
    pub fn submit_answer(&mut self, text: &str) -> Result<AnswerResult, SessionError> {
        let now = self.clock.now();
        self.active_mut("submit an answer")?.submit_answer(text, now)
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` when no session is in progress.
    pub fn time_out(&mut self) -> Result<AnswerResult, SessionError> {
        let now = self.clock.now();
        self.active_mut("time out a question")?.time_out(now)
    }

    #[must_use]
    pub fn remaining_time(&self) -> Option<Duration> {
        self.session
            .as_ref()
            .and_then(|session| session.remaining_time(self.clock.now()))
    }

    /// Abandon the running session. Never fails; returns whether a session
    /// was actually abandoned.
    pub fn abandon(&mut self) -> bool {
        let now = self.clock.now();
        self.session
            .as_mut()
            .is_some_and(|session| session.abandon(now))
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` before the first session or while
    /// it is still in progress.
    pub fn result(&self) -> Result<SessionResult, SessionError> {
        self.active("produce a result")?.result()
    }

    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        self.session.as_ref().map(QuizSession::progress)
    }

    #[must_use]
    pub fn running_score(&self) -> f64 {
        self.session.as_ref().map_or(0.0, QuizSession::running_score)
    }

    fn active(&self, operation: &'static str) -> Result<&QuizSession, SessionError> {
        self.session
            .as_ref()
            .ok_or_else(|| SessionError::invalid(operation, SessionState::NotStarted))
    }

    fn active_mut(&mut self, operation: &'static str) -> Result<&mut QuizSession, SessionError> {
        self.session
            .as_mut()
            .ok_or_else(|| SessionError::invalid(operation, SessionState::NotStarted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{CorrectAnswer, QuestionId, QuestionMeta};
    use quiz_core::time::fixed_clock;

    fn engine() -> QuizEngine {
        let questions = (1..=2)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    format!("Q{id}"),
                    Vec::new(),
                    CorrectAnswer::from("yes"),
                    QuestionMeta::default(),
                )
                .unwrap()
            })
            .collect();
        let store = QuestionStore::from_questions(questions).unwrap();
        QuizEngine::new(Arc::new(store)).with_clock(fixed_clock())
    }

    #[test]
    fn reports_not_started_before_first_session() {
        let mut engine = engine();
        assert_eq!(engine.state(), SessionState::NotStarted);
        assert!(engine.progress().is_none());
        assert!(!engine.abandon());
        assert!(matches!(
            engine.submit_answer("yes"),
            Err(SessionError::InvalidState {
                state: SessionState::NotStarted,
                ..
            })
        ));
        assert!(engine.result().is_err());
    }

    #[test]
    fn refuses_to_start_over_a_running_session() {
        let mut engine = engine();
        engine.start(&SessionOptions::new()).unwrap();
        let err = engine.start(&SessionOptions::new()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidState {
                operation: "start a new session",
                state: SessionState::InProgress
            }
        ));

        assert!(engine.abandon());
        assert_eq!(engine.state(), SessionState::Abandoned);
        let restarted = engine.start(&SessionOptions::new()).unwrap();
        assert_eq!(restarted.state(), SessionState::InProgress);
    }

    #[test]
    fn timer_uses_the_engine_clock() {
        let mut engine = engine();
        let options = SessionOptions::new().with_time_limit(Some(Duration::seconds(30)));
        engine.start(&options).unwrap();
        assert_eq!(engine.remaining_time(), Some(Duration::seconds(30)));

        engine.clock_mut().advance(Duration::seconds(31));
        assert_eq!(engine.remaining_time(), Some(Duration::zero()));
        let late = engine.submit_answer("yes").unwrap();
        assert!(late.timed_out);
        assert_eq!(engine.running_score(), 0.0);
    }

    #[test]
    fn policy_follows_the_engine() {
        let mut engine = engine().with_policy(PolicyKind::Exact.build());
        let session = engine.start(&SessionOptions::new()).unwrap();
        assert_eq!(session.policy_name(), "exact");
        assert!(!engine.submit_answer("YES").unwrap().is_correct);
    }
}
