use async_trait::async_trait;
use quiz_core::model::HighScore;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{map_high_score_row, ser};
use crate::repository::{HighScoreRepository, HighScoreRow, StorageError};

const RANK_ORDER: &str = "ORDER BY correct DESC, score_value DESC, achieved_at ASC, id ASC";

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl HighScoreRepository for SqliteRepository {
    async fn append_score(&self, score: &HighScore) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO high_scores (category, correct, total, score_value, achieved_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(score.category())
        .bind(i64::from(score.correct()))
        .bind(i64::from(score.total()))
        .bind(score.score_value())
        .bind(score.achieved_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn top_scores(
        &self,
        category: &str,
        limit: u32,
    ) -> Result<Vec<HighScoreRow>, StorageError> {
        let sql = format!(
            "SELECT id, category, correct, total, score_value, achieved_at
             FROM high_scores WHERE category = ?1 {RANK_ORDER} LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(category)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_high_score_row).collect()
    }

    async fn categories(&self) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query("SELECT DISTINCT category FROM high_scores ORDER BY category ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("category").map_err(ser))
            .collect()
    }

    async fn prune_category(&self, category: &str, keep: u32) -> Result<u64, StorageError> {
        let sql = format!(
            "DELETE FROM high_scores
             WHERE category = ?1
               AND id NOT IN (
                   SELECT id FROM high_scores WHERE category = ?1 {RANK_ORDER} LIMIT ?2
               )"
        );
        let res = sqlx::query(&sql)
            .bind(category)
            .bind(i64::from(keep))
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        Ok(res.rows_affected())
    }
}
