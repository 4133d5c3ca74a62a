use chrono::Duration;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{SeedableRng, rng};

use quiz_core::model::Question;
use storage::QuestionStore;

use crate::error::SessionError;

//
// ─── OPTIONS ───────────────────────────────────────────────────────────────────
//

/// How a session draws its questions from a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    selection_size: Option<usize>,
    shuffle: bool,
    seed: Option<u64>,
    category: Option<String>,
    time_limit: Option<Duration>,
}

impl SessionOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of questions to draw. `None` draws every candidate.
    #[must_use]
    pub fn with_selection_size(mut self, size: Option<usize>) -> Self {
        self.selection_size = size;
        self
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Seed for a reproducible shuffle. Ignored when shuffling is off.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Per-question answer window.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    #[must_use]
    pub fn selection_size(&self) -> Option<usize> {
        self.selection_size
    }

    #[must_use]
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }
}

//
// ─── PLAN ──────────────────────────────────────────────────────────────────────
//

/// Questions selected for a session, in presentation order.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub questions: Vec<Question>,
    /// Candidates left after the category filter.
    pub available: usize,
}

impl SessionPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }
}

/// Picks the questions of a session from a store.
pub struct SessionPlanner<'a> {
    store: &'a QuestionStore,
    options: &'a SessionOptions,
}

impl<'a> SessionPlanner<'a> {
    #[must_use]
    pub fn new(store: &'a QuestionStore, options: &'a SessionOptions) -> Self {
        Self { store, options }
    }

    /// Filter by category, optionally shuffle, then take `selection_size`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyQuestionSet` when no question matches, when
    /// `selection_size` is zero, or when it exceeds the candidates.
    pub fn build(self) -> Result<SessionPlan, SessionError> {
        let mut candidates: Vec<Question> = match self.options.category() {
            Some(category) => self.store.in_category(category).cloned().collect(),
            None => self.store.questions().to_vec(),
        };
        let available = candidates.len();
        let requested = self.options.selection_size().unwrap_or(available);

        if available == 0 || requested == 0 || requested > available {
            return Err(SessionError::EmptyQuestionSet {
                requested,
                available,
            });
        }

        if self.options.shuffle() {
            match self.options.seed() {
                Some(seed) => candidates.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => candidates.shuffle(&mut rng()),
            }
        }
        candidates.truncate(requested);

        Ok(SessionPlan {
            questions: candidates,
            available,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{CorrectAnswer, QuestionId, QuestionMeta};

    fn question(id: u64, category: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            Vec::new(),
            CorrectAnswer::from("a"),
            QuestionMeta::in_category(category),
        )
        .unwrap()
    }

    fn store() -> QuestionStore {
        QuestionStore::from_questions(vec![
            question(1, "Geo"),
            question(2, "Space"),
            question(3, "Geo"),
            question(4, "Geo"),
            question(5, "Space"),
        ])
        .unwrap()
    }

    fn ids(plan: &SessionPlan) -> Vec<u64> {
        plan.questions.iter().map(|q| q.id().value()).collect()
    }

    #[test]
    fn default_options_take_everything_in_file_order() {
        let store = store();
        let options = SessionOptions::new();
        let plan = SessionPlanner::new(&store, &options).build().unwrap();
        assert_eq!(ids(&plan), vec![1, 2, 3, 4, 5]);
        assert_eq!(plan.available, 5);
    }

    #[test]
    fn category_filter_runs_before_selection() {
        let store = store();
        let options = SessionOptions::new()
            .with_category(Some("Geo".into()))
            .with_selection_size(Some(2));
        let plan = SessionPlanner::new(&store, &options).build().unwrap();
        assert_eq!(ids(&plan), vec![1, 3]);
        assert_eq!(plan.available, 3);
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let store = store();
        let options = SessionOptions::new().with_shuffle(true).with_seed(Some(42));
        let first = SessionPlanner::new(&store, &options).build().unwrap();
        let second = SessionPlanner::new(&store, &options).build().unwrap();
        assert_eq!(ids(&first), ids(&second));

        let mut sorted = ids(&first);
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn oversized_selection_is_rejected() {
        let store = store();
        let options = SessionOptions::new()
            .with_category(Some("Space".into()))
            .with_selection_size(Some(3));
        let err = SessionPlanner::new(&store, &options).build().unwrap_err();
        assert!(matches!(
            err,
            SessionError::EmptyQuestionSet {
                requested: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn zero_selection_and_unknown_category_are_empty() {
        let store = store();
        let zero = SessionOptions::new().with_selection_size(Some(0));
        assert!(matches!(
            SessionPlanner::new(&store, &zero).build(),
            Err(SessionError::EmptyQuestionSet { requested: 0, .. })
        ));

        let missing = SessionOptions::new().with_category(Some("History".into()));
        assert!(matches!(
            SessionPlanner::new(&store, &missing).build(),
            Err(SessionError::EmptyQuestionSet { available: 0, .. })
        ));
    }
}
