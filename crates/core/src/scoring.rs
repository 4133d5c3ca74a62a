//! Answer scoring policies.
//!
//! A policy judges one submission against one question. It always sees the
//! raw text as typed; display shaping never reaches this module.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::model::Question;

/// Verdict for a single submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub is_correct: bool,
    /// Partial credit in `[0, 1]`.
    pub credit: f64,
}

impl Score {
    #[must_use]
    pub fn correct() -> Self {
        Self {
            is_correct: true,
            credit: 1.0,
        }
    }

    #[must_use]
    pub fn incorrect() -> Self {
        Self {
            is_correct: false,
            credit: 0.0,
        }
    }

    #[must_use]
    pub fn from_match(matched: bool) -> Self {
        if matched {
            Self::correct()
        } else {
            Self::incorrect()
        }
    }

    /// Partial credit, clamped to `[0, 1]`; correct only at full credit.
    #[must_use]
    pub fn partial(credit: f64) -> Self {
        let credit = if credit.is_nan() { 0.0 } else { credit.clamp(0.0, 1.0) };
        Self {
            is_correct: credit >= 1.0,
            credit,
        }
    }
}

/// Strategy used by a session to grade each answer.
pub trait ScoringPolicy: Send + Sync + fmt::Debug {
    /// Short stable name, matching `PolicyKind`'s string form.
    fn name(&self) -> &'static str;

    /// Grade `submitted` against `question`.
    ///
    /// Implementations must treat blank submissions as incorrect.
    fn score(&self, question: &Question, submitted: &str) -> Score;
}

/// Mean credit over `count` answers, `0.0` when nothing was answered.
#[must_use]
pub fn aggregate(credits: impl IntoIterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = credits.into_iter().sum::<f64>() / count as f64;
    mean.clamp(0.0, 1.0)
}

fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

//
// ─── BUILT-IN POLICIES ─────────────────────────────────────────────────────────
//

/// Case-sensitive equality with any accepted answer (surrounding whitespace ignored).
#[derive(Debug, Clone, Copy, Default)]
pub struct Exact;

impl ScoringPolicy for Exact {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn score(&self, question: &Question, submitted: &str) -> Score {
        let submitted = submitted.trim();
        if submitted.is_empty() {
            return Score::incorrect();
        }
        Score::from_match(
            question
                .accepted_answers()
                .iter()
                .any(|a| a.trim() == submitted),
        )
    }
}

/// Case-folded equality with any accepted answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitive;

impl ScoringPolicy for CaseInsensitive {
    fn name(&self) -> &'static str {
        "case-insensitive"
    }

    fn score(&self, question: &Question, submitted: &str) -> Score {
        let submitted = fold(submitted);
        if submitted.is_empty() {
            return Score::incorrect();
        }
        Score::from_match(
            question
                .accepted_answers()
                .iter()
                .any(|a| fold(a) == submitted),
        )
    }
}

/// Multiple-choice grading against the accepted choices.
///
/// A submission is first matched against the choice texts, so numeric
/// choices grade by text. Only when no choice matches is it read as a
/// zero-based choice index. Free-text questions fall back to `Exact`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceIndex;

impl ScoringPolicy for ChoiceIndex {
    fn name(&self) -> &'static str {
        "choice-index"
    }

    fn score(&self, question: &Question, submitted: &str) -> Score {
        let submitted = submitted.trim();
        if submitted.is_empty() {
            return Score::incorrect();
        }
        if question.correct_choice().is_none() {
            return Exact.score(question, submitted);
        }
        let is_accepted = |choice: &str| {
            question
                .accepted_answers()
                .iter()
                .any(|a| a.trim() == choice.trim())
        };

        let choices = question.choices();
        let picked = choices
            .iter()
            .find(|choice| choice.trim() == submitted)
            .or_else(|| {
                submitted
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| choices.get(index))
            });
        Score::from_match(picked.is_some_and(|choice| is_accepted(choice)))
    }
}

/// Word-overlap partial credit.
///
/// Credit is the share of an accepted answer's words that appear in the
/// submission, taking the best accepted answer. Only full credit is correct.
#[derive(Debug, Clone, Copy, Default)]
pub struct Partial;

impl Partial {
    #[allow(clippy::cast_precision_loss)]
    fn overlap(accepted: &str, submitted: &HashSet<String>) -> f64 {
        let words: HashSet<String> = accepted.split_whitespace().map(fold).collect();
        if words.is_empty() {
            return 0.0;
        }
        let hits = words.iter().filter(|w| submitted.contains(*w)).count();
        hits as f64 / words.len() as f64
    }
}

impl ScoringPolicy for Partial {
    fn name(&self) -> &'static str {
        "partial"
    }

    fn score(&self, question: &Question, submitted: &str) -> Score {
        let words: HashSet<String> = submitted.split_whitespace().map(fold).collect();
        if words.is_empty() {
            return Score::incorrect();
        }
        let best = question
            .accepted_answers()
            .iter()
            .map(|a| Self::overlap(a, &words))
            .fold(0.0_f64, f64::max);
        Score::partial(best)
    }
}

//
// ─── SELECTION BY NAME ─────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown scoring policy: {0}")]
pub struct UnknownPolicy(pub String);

/// Names the built-in policies for configuration surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    Exact,
    #[default]
    CaseInsensitive,
    ChoiceIndex,
    Partial,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Exact,
        PolicyKind::CaseInsensitive,
        PolicyKind::ChoiceIndex,
        PolicyKind::Partial,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Exact => "exact",
            PolicyKind::CaseInsensitive => "case-insensitive",
            PolicyKind::ChoiceIndex => "choice-index",
            PolicyKind::Partial => "partial",
        }
    }

    #[must_use]
    pub fn build(self) -> Arc<dyn ScoringPolicy> {
        match self {
            PolicyKind::Exact => Arc::new(Exact),
            PolicyKind::CaseInsensitive => Arc::new(CaseInsensitive),
            PolicyKind::ChoiceIndex => Arc::new(ChoiceIndex),
            PolicyKind::Partial => Arc::new(Partial),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| UnknownPolicy(s.to_owned()))
    }
}
