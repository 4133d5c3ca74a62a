//! Built-in question bank used when no question file is supplied.

use crate::questions::{QuestionStore, QuestionStoreError};

/// Default bank in the category format: an Arabic neuro-anatomy set and a
/// short English geography set.
pub const DEFAULT_BANK_JSON: &str = r#"{
  "تشريح عصبي": [
    {
      "question": "اين مركز تنظيم التنفس وضربات القلب في الدماغ؟",
      "options": ["القشرة الدماغية", "النخاع المستطيل", "المخيخ", "الجسر"],
      "answer": 1
    },
    {
      "question": "أكبر جزء في الدماغ؟",
      "options": ["المخ", "المخيخ", "الجذع الدماغي", "البصلة السيسائية"],
      "answer": 0
    },
    {
      "question": "المادة البيضاء في الدماغ هي؟",
      "options": ["أجسام الخلايا العصبية", "محاور الخلايا العصبية", "المشابك العصبية", "النهايات العصبية"],
      "answer": 1
    }
  ],
  "Geography": [
    {
      "question": "What is the capital of France?",
      "options": ["Lyon", "Paris", "Marseille", "Nice"],
      "answer": 1
    },
    {
      "question": "Which is the longest river in Africa?",
      "options": ["Congo", "Niger", "Nile", "Zambezi"],
      "answer": 2
    },
    {
      "question": "Which ocean lies between Africa and Australia?",
      "options": ["Indian", "Atlantic", "Pacific", "Arctic"],
      "answer": 0
    }
  ]
}"#;

/// Parse the built-in bank.
///
/// # Errors
///
/// Returns `QuestionStoreError` only if the embedded document is broken.
pub fn default_store() -> Result<QuestionStore, QuestionStoreError> {
    QuestionStore::load_str(DEFAULT_BANK_JSON)
}
