//! Read-only question store loaded from JSON.
//!
//! Two document shapes are accepted:
//!
//! - an array of records:
//!   `[{"id": 1, "prompt": "…", "choices": ["…"], "correct_answer": "…"}]`
//! - a category bank, as written by the desktop app:
//!   `{"Category": [{"question": "…", "options": ["…"], "answer": 0}]}`
//!
//! Bank entries carry no ids; they are numbered from 1 in file order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;

use quiz_core::model::{
    CorrectAnswer, Difficulty, Question, QuestionError, QuestionId, QuestionMeta,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a question source is rejected as a whole.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MalformedData {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected an array of question records or an object of categories")]
    UnexpectedShape,

    #[error("duplicate question id {0}")]
    DuplicateId(QuestionId),

    #[error("record {index}: {source}")]
    InvalidRecord {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionStoreError {
    #[error("failed to read question source: {0}")]
    Io(#[from] io::Error),

    #[error("malformed question data: {0}")]
    Malformed(#[from] MalformedData),

    #[error("question {0} not found")]
    NotFound(QuestionId),
}

impl From<serde_json::Error> for QuestionStoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(MalformedData::Json(e))
    }
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Serialized shape of one question in the record-array format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    pub correct_answer: CorrectAnswer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        let accepted = question.accepted_answers();
        let correct_answer = match accepted {
            [single] => CorrectAnswer::Text(single.clone()),
            many => CorrectAnswer::AnyOf(many.to_vec()),
        };
        Self {
            id: question.id(),
            prompt: question.prompt().to_owned(),
            choices: question.choices().to_vec(),
            correct_answer,
            category: question.category().map(str::to_owned),
            difficulty: question.difficulty(),
        }
    }

    /// Validate the record into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the record does not describe a valid question.
    pub fn into_question(self) -> Result<Question, QuestionError> {
        Question::new(
            self.id,
            self.prompt,
            self.choices,
            self.correct_answer,
            QuestionMeta {
                category: self.category,
                difficulty: self.difficulty,
            },
        )
    }
}

/// One entry of the category-bank format.
#[derive(Debug, Deserialize)]
struct BankEntry {
    question: String,
    #[serde(default)]
    options: Vec<String>,
    answer: CorrectAnswer,
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

/// Ordered, read-only collection of questions with unique ids.
#[derive(Debug, Clone, Default)]
pub struct QuestionStore {
    questions: Vec<Question>,
    index: HashMap<QuestionId, usize>,
}

impl QuestionStore {
    /// Build a store from already-validated questions.
    ///
    /// # Errors
    ///
    /// Returns `MalformedData::DuplicateId` if two questions share an id.
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, QuestionStoreError> {
        let mut index = HashMap::with_capacity(questions.len());
        for (pos, question) in questions.iter().enumerate() {
            if index.insert(question.id(), pos).is_some() {
                return Err(MalformedData::DuplicateId(question.id()).into());
            }
        }
        Ok(Self { questions, index })
    }

    /// Load questions from a JSON reader.
    ///
    /// # Errors
    ///
    /// Returns `QuestionStoreError::Io` if reading fails and
    /// `QuestionStoreError::Malformed` if the document is rejected.
    pub fn load(mut reader: impl Read) -> Result<Self, QuestionStoreError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Self::load_str(&raw)
    }

    /// Load questions from a JSON document held in memory.
    ///
    /// # Errors
    ///
    /// Returns `QuestionStoreError::Malformed` if the document is rejected.
    pub fn load_str(json: &str) -> Result<Self, QuestionStoreError> {
        let value: Value = serde_json::from_str(json)?;
        let questions = match value {
            Value::Array(_) => Self::parse_records(value)?,
            Value::Object(_) => Self::parse_bank(value)?,
            _ => return Err(MalformedData::UnexpectedShape.into()),
        };
        let store = Self::from_questions(questions)?;
        tracing::debug!(count = store.count(), "loaded question store");
        Ok(store)
    }

    /// Load questions from a file. The file is closed before returning.
    ///
    /// # Errors
    ///
    /// See [`QuestionStore::load`].
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self, QuestionStoreError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let store = Self::load(io::BufReader::new(file))?;
        tracing::info!(path = %path.display(), count = store.count(), "question file loaded");
        Ok(store)
    }

    fn parse_records(value: Value) -> Result<Vec<Question>, QuestionStoreError> {
        let records: Vec<QuestionRecord> = serde_json::from_value(value)?;
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                record.into_question().map_err(|source| {
                    QuestionStoreError::from(MalformedData::InvalidRecord { index, source })
                })
            })
            .collect()
    }

    fn parse_bank(value: Value) -> Result<Vec<Question>, QuestionStoreError> {
        let bank: serde_json::Map<String, Value> = serde_json::from_value(value)?;
        let mut questions = Vec::new();
        for (category, entries) in bank {
            let entries: Vec<BankEntry> = serde_json::from_value(entries)?;
            for entry in entries {
                let index = questions.len();
                let id = QuestionId::new(u64::try_from(index + 1).unwrap_or(u64::MAX));
                let question = Question::new(
                    id,
                    entry.question,
                    entry.options,
                    entry.answer,
                    QuestionMeta::in_category(category.clone()),
                )
                .map_err(|source| MalformedData::InvalidRecord { index, source })?;
                questions.push(question);
            }
        }
        Ok(questions)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Look up a question by id.
    ///
    /// # Errors
    ///
    /// Returns `QuestionStoreError::NotFound` if no question has this id.
    pub fn get(&self, id: QuestionId) -> Result<&Question, QuestionStoreError> {
        self.index
            .get(&id)
            .map(|&pos| &self.questions[pos])
            .ok_or(QuestionStoreError::NotFound(id))
    }

    /// All questions in source order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Distinct categories in order of first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for category in self.questions.iter().filter_map(Question::category) {
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }

    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Question> {
        self.questions
            .iter()
            .filter(move |q| q.category() == Some(category))
    }

    /// Write the store as a pretty-printed record array.
    ///
    /// # Errors
    ///
    /// Returns `QuestionStoreError::Io` if writing fails.
    pub fn write_json(&self, mut writer: impl Write) -> Result<(), QuestionStoreError> {
        let records: Vec<QuestionRecord> =
            self.questions.iter().map(QuestionRecord::from_question).collect();
        serde_json::to_writer_pretty(&mut writer, &records).map_err(io::Error::from)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDS: &str = r#"[
        {"id": 1, "prompt": "Capital of France?", "correct_answer": "Paris", "category": "Geography"},
        {"id": 2, "prompt": "6 * 7?", "correct_answer": ["42", "forty-two"], "difficulty": "easy"},
        {"id": 3, "prompt": "Language with a gopher?", "choices": ["Rust", "Go"], "correct_answer": 1, "category": "Tech"}
    ]"#;

    const BANK: &str = r#"{
        "تشريح عصبي": [
            {"question": "أكبر جزء في الدماغ؟", "options": ["المخ", "المخيخ"], "answer": 0}
        ],
        "Space": [
            {"question": "Closest planet to the sun?", "options": ["Venus", "Mercury"], "answer": 1},
            {"question": "Red planet?", "options": ["Mars", "Jupiter"], "answer": 0}
        ]
    }"#;

    #[test]
    fn loads_record_array() {
        let store = QuestionStore::load_str(RECORDS).unwrap();
        assert_eq!(store.count(), 3);

        let q2 = store.get(QuestionId::new(2)).unwrap();
        assert_eq!(q2.accepted_answers().len(), 2);
        assert_eq!(q2.difficulty(), Some(Difficulty::Easy));

        let q3 = store.get(QuestionId::new(3)).unwrap();
        assert_eq!(q3.correct_choice(), Some(1));
        assert_eq!(store.categories(), vec!["Geography", "Tech"]);
    }

    #[test]
    fn loads_category_bank_in_file_order() {
        let store = QuestionStore::load(BANK.as_bytes()).unwrap();
        assert_eq!(store.count(), 3);
        assert_eq!(store.categories(), vec!["تشريح عصبي", "Space"]);

        let ids: Vec<u64> = store.iter().map(|q| q.id().value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(store.in_category("Space").count(), 2);
        assert_eq!(
            store.get(QuestionId::new(2)).unwrap().accepted_answers(),
            ["Mercury".to_owned()]
        );
    }

    #[test]
    fn missing_field_is_malformed() {
        let err = QuestionStore::load_str(r#"[{"id": 1, "correct_answer": "x"}]"#).unwrap_err();
        assert!(matches!(
            err,
            QuestionStoreError::Malformed(MalformedData::Json(_))
        ));
    }

    #[test]
    fn duplicate_ids_are_malformed() {
        let json = r#"[
            {"id": 1, "prompt": "A", "correct_answer": "a"},
            {"id": 1, "prompt": "B", "correct_answer": "b"}
        ]"#;
        let err = QuestionStore::load_str(json).unwrap_err();
        assert!(matches!(
            err,
            QuestionStoreError::Malformed(MalformedData::DuplicateId(id)) if id == QuestionId::new(1)
        ));
    }

    #[test]
    fn invalid_record_reports_its_index() {
        let json = r#"[
            {"id": 1, "prompt": "A", "correct_answer": "a"},
            {"id": 2, "prompt": "B", "choices": ["x"], "correct_answer": 4}
        ]"#;
        let err = QuestionStore::load_str(json).unwrap_err();
        assert!(matches!(
            err,
            QuestionStoreError::Malformed(MalformedData::InvalidRecord { index: 1, .. })
        ));
    }

    #[test]
    fn scalar_document_is_rejected() {
        let err = QuestionStore::load_str("42").unwrap_err();
        assert!(matches!(
            err,
            QuestionStoreError::Malformed(MalformedData::UnexpectedShape)
        ));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = QuestionStore::load_str(RECORDS).unwrap();
        let err = store.get(QuestionId::new(99)).unwrap_err();
        assert!(matches!(err, QuestionStoreError::NotFound(id) if id.value() == 99));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = QuestionStore::load_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, QuestionStoreError::Io(_)));
    }

    #[test]
    fn exported_json_loads_back_identically() {
        let store = QuestionStore::load_str(BANK).unwrap();
        let mut buf = Vec::new();
        store.write_json(&mut buf).unwrap();

        let reloaded = QuestionStore::load(buf.as_slice()).unwrap();
        assert_eq!(reloaded.questions(), store.questions());

        let records = QuestionStore::load_str(RECORDS).unwrap();
        let mut buf = Vec::new();
        records.write_json(&mut buf).unwrap();
        let reloaded = QuestionStore::load(buf.as_slice()).unwrap();
        assert_eq!(reloaded.questions(), records.questions());
        assert_eq!(
            reloaded.get(QuestionId::new(3)).unwrap().correct_choice(),
            Some(1)
        );
    }

    #[test]
    fn repeated_choices_are_rejected_on_load() {
        let json = r#"[{"id": 1, "prompt": "Pick", "choices": ["A", "A"], "correct_answer": 1}]"#;
        let err = QuestionStore::load_str(json).unwrap_err();
        assert!(matches!(
            err,
            QuestionStoreError::Malformed(MalformedData::InvalidRecord {
                index: 0,
                source: QuestionError::DuplicateChoice { index: 1 },
            })
        ));
    }
}
