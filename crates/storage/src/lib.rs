#![forbid(unsafe_code)]

pub mod defaults;
pub mod questions;
pub mod repository;
pub mod sqlite;

pub use questions::{MalformedData, QuestionRecord, QuestionStore, QuestionStoreError};
pub use repository::{HighScoreRepository, HighScoreRow, InMemoryRepository, Storage, StorageError};
