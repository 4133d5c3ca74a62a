use quiz_core::model::HighScore;
use sqlx::Row;

use crate::repository::{HighScoreRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_high_score_row(row: &sqlx::sqlite::SqliteRow) -> Result<HighScoreRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let category: String = row.try_get("category").map_err(ser)?;
    let correct = u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?;
    let total = u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?;
    let score_value: f64 = row.try_get("score_value").map_err(ser)?;
    let achieved_at = row.try_get("achieved_at").map_err(ser)?;

    let score = HighScore::from_persisted(category, correct, total, score_value, achieved_at)
        .map_err(ser)?;
    Ok(HighScoreRow::new(id, score))
}
