use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("choice {index} is blank")]
    BlankChoice { index: usize },

    #[error("choice {index} repeats an earlier choice")]
    DuplicateChoice { index: usize },

    #[error("question needs at least one accepted answer")]
    NoAcceptedAnswer,

    #[error("accepted answers cannot be blank")]
    BlankAnswer,

    #[error("correct choice index {index} is out of range for {len} choices")]
    ChoiceIndexOutOfRange { index: usize, len: usize },

    #[error("correct answer is given as a choice index but the question has no choices")]
    ChoiceIndexWithoutChoices,

    #[error("correct answer {answer:?} is not one of the choices")]
    AnswerNotAChoice { answer: String },

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── METADATA ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(s)
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(QuestionError::UnknownDifficulty(other.to_owned())),
        }
    }
}

/// Optional descriptive data attached to a question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionMeta {
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl QuestionMeta {
    #[must_use]
    pub fn in_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            difficulty: None,
        }
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }
}

//
// ─── CORRECT ANSWER ────────────────────────────────────────────────────────────
//

/// How a question's correct answer is written in a question source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    /// A single accepted text.
    Text(String),
    /// Any of several accepted texts.
    AnyOf(Vec<String>),
    /// Zero-based index into the question's choices.
    ChoiceIndex(usize),
}

impl From<&str> for CorrectAnswer {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single quiz question. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    choices: Vec<String>,
    accepted: Vec<String>,
    correct_choice: Option<usize>,
    meta: QuestionMeta,
}

impl Question {
    /// Build and validate a question.
    ///
    /// For multiple-choice questions every accepted answer must be one of the
    /// choices; the first matching choice becomes `correct_choice`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt, choices or answer are invalid.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        choices: Vec<String>,
        correct: CorrectAnswer,
        meta: QuestionMeta,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if let Some(index) = choices.iter().position(|c| c.trim().is_empty()) {
            return Err(QuestionError::BlankChoice { index });
        }
        for (index, choice) in choices.iter().enumerate() {
            if choices[..index].iter().any(|c| c.trim() == choice.trim()) {
                return Err(QuestionError::DuplicateChoice { index });
            }
        }

        let (accepted, correct_choice) = match correct {
            CorrectAnswer::ChoiceIndex(index) => {
                if choices.is_empty() {
                    return Err(QuestionError::ChoiceIndexWithoutChoices);
                }
                let choice = choices
                    .get(index)
                    .ok_or(QuestionError::ChoiceIndexOutOfRange {
                        index,
                        len: choices.len(),
                    })?;
                (vec![choice.clone()], Some(index))
            }
            CorrectAnswer::Text(text) => Self::accepted_with_choice(vec![text], &choices)?,
            CorrectAnswer::AnyOf(texts) => Self::accepted_with_choice(texts, &choices)?,
        };

        Ok(Self {
            id,
            prompt,
            choices,
            accepted,
            correct_choice,
            meta,
        })
    }

    fn accepted_with_choice(
        accepted: Vec<String>,
        choices: &[String],
    ) -> Result<(Vec<String>, Option<usize>), QuestionError> {
        if accepted.is_empty() {
            return Err(QuestionError::NoAcceptedAnswer);
        }
        if accepted.iter().any(|a| a.trim().is_empty()) {
            return Err(QuestionError::BlankAnswer);
        }
        if choices.is_empty() {
            return Ok((accepted, None));
        }

        let position = |answer: &str| choices.iter().position(|c| c.trim() == answer.trim());
        for answer in &accepted {
            if position(answer).is_none() {
                return Err(QuestionError::AnswerNotAChoice {
                    answer: answer.clone(),
                });
            }
        }
        let correct_choice = position(&accepted[0]);
        Ok((accepted, correct_choice))
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Choices in display order; empty for free-text questions.
    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn is_multiple_choice(&self) -> bool {
        !self.choices.is_empty()
    }

    /// Every text accepted as correct.
    #[must_use]
    pub fn accepted_answers(&self) -> &[String] {
        &self.accepted
    }

    /// Zero-based index of the correct choice for multiple-choice questions.
    #[must_use]
    pub fn correct_choice(&self) -> Option<usize> {
        self.correct_choice
    }

    #[must_use]
    pub fn meta(&self) -> &QuestionMeta {
        &self.meta
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.meta.category.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.meta.difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn free_text_question_keeps_all_accepted_answers() {
        let q = Question::new(
            QuestionId::new(1),
            "Name a primary colour",
            Vec::new(),
            CorrectAnswer::AnyOf(choices(&["red", "blue", "yellow"])),
            QuestionMeta::default(),
        )
        .unwrap();

        assert!(!q.is_multiple_choice());
        assert_eq!(q.accepted_answers().len(), 3);
        assert_eq!(q.correct_choice(), None);
    }

    #[test]
    fn choice_index_resolves_to_choice_text() {
        let q = Question::new(
            QuestionId::new(2),
            "Largest part of the brain?",
            choices(&["Cerebrum", "Cerebellum", "Brainstem"]),
            CorrectAnswer::ChoiceIndex(0),
            QuestionMeta::in_category("Neuro").with_difficulty(Difficulty::Easy),
        )
        .unwrap();

        assert_eq!(q.accepted_answers(), ["Cerebrum".to_owned()]);
        assert_eq!(q.correct_choice(), Some(0));
        assert_eq!(q.category(), Some("Neuro"));
        assert_eq!(q.difficulty(), Some(Difficulty::Easy));
    }

    #[test]
    fn text_answer_locates_its_choice() {
        let q = Question::new(
            QuestionId::new(3),
            "2 + 2?",
            choices(&["3", "4", "5"]),
            CorrectAnswer::from("4"),
            QuestionMeta::default(),
        )
        .unwrap();
        assert_eq!(q.correct_choice(), Some(1));
    }

    #[test]
    fn rejects_invalid_questions() {
        let id = QuestionId::new(9);
        let err = Question::new(id, "  ", Vec::new(), "x".into(), QuestionMeta::default())
            .unwrap_err();
        assert_eq!(err, QuestionError::EmptyPrompt);

        let err = Question::new(
            id,
            "Q",
            choices(&["a", "b"]),
            CorrectAnswer::ChoiceIndex(2),
            QuestionMeta::default(),
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::ChoiceIndexOutOfRange { index: 2, len: 2 });

        let err = Question::new(
            id,
            "Q",
            choices(&["a", "b"]),
            "c".into(),
            QuestionMeta::default(),
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::AnswerNotAChoice { .. }));

        let err = Question::new(
            id,
            "Q",
            Vec::new(),
            CorrectAnswer::AnyOf(Vec::new()),
            QuestionMeta::default(),
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::NoAcceptedAnswer);

        let err = Question::new(id, "Q", choices(&["a", " "]), "a".into(), QuestionMeta::default())
            .unwrap_err();
        assert_eq!(err, QuestionError::BlankChoice { index: 1 });
    }

    #[test]
    fn repeated_choices_are_rejected() {
        let err = Question::new(
            QuestionId::new(9),
            "Q",
            choices(&["A", "B", " A"]),
            CorrectAnswer::ChoiceIndex(2),
            QuestionMeta::default(),
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::DuplicateChoice { index: 2 });
    }

    #[test]
    fn correct_answer_deserializes_all_shapes() {
        let text: CorrectAnswer = serde_json::from_str(r#""Paris""#).unwrap();
        assert_eq!(text, CorrectAnswer::Text("Paris".into()));
        let many: CorrectAnswer = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(many, CorrectAnswer::AnyOf(vec!["a".into(), "b".into()]));
        let index: CorrectAnswer = serde_json::from_str("1").unwrap();
        assert_eq!(index, CorrectAnswer::ChoiceIndex(1));
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("brutal".parse::<Difficulty>().is_err());
    }
}
