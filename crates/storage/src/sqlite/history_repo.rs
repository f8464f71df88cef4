use async_trait::async_trait;
use chrono::NaiveDate;
use quiz_core::model::{
    CategoryId, DAILY_CATEGORY_TITLE, DAILY_DIFFICULTY_LABEL, DailyQuizRecord, QuizHistoryRecord,
    UserId,
};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, encode_review_data, i64_from_u64, map_history_row, ser};
use crate::repository::{DailyUpsert, HistoryRow, QuizHistoryRepository, StorageError};

const HISTORY_COLUMNS: &str = r"
    id, user_id, category_id, category_title, quiz_title, difficulty,
    score, xp, time_taken_seconds, review_data, quiz_set_id,
    date_taken, completed_at, is_daily
";

#[async_trait]
impl QuizHistoryRepository for SqliteRepository {
    async fn insert_attempt(&self, record: &QuizHistoryRecord) -> Result<i64, StorageError> {
        let review_data = encode_review_data(&record.review_data)?;

        let res = sqlx::query(
            r"
                INSERT INTO quiz_history (
                    user_id, category_id, category_title, quiz_title, difficulty,
                    score, xp, time_taken_seconds, review_data, quiz_set_id,
                    date_taken, completed_at, is_daily
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 0)
            ",
        )
        .bind(record.user_id.to_string())
        .bind(i64::from(record.category_id.value()))
        .bind(&record.category_title)
        .bind(&record.quiz_title)
        .bind(record.difficulty.as_str())
        .bind(i64::from(record.score))
        .bind(i64::from(record.xp))
        .bind(i64_from_u64("time_taken_seconds", record.time_taken_seconds)?)
        .bind(review_data)
        .bind(record.quiz_set_id.as_str())
        .bind(record.completed_at.date_naive())
        .bind(record.completed_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn upsert_daily(&self, record: &DailyQuizRecord) -> Result<DailyUpsert, StorageError> {
        let review_data = encode_review_data(&record.review_data)?;
        let time_taken = i64_from_u64("time_taken_seconds", record.time_taken_seconds)?;
        let user_id = record.user_id.to_string();

        let mut tx = self.pool.begin().await.map_err(conn)?;

        let existing = sqlx::query(
            r"
                SELECT id, score
                FROM quiz_history
                WHERE user_id = ?1 AND date_taken = ?2 AND is_daily = 1
            ",
        )
        .bind(&user_id)
        .bind(record.date)
        .fetch_optional(&mut *tx)
        .await
        .map_err(conn)?;

        let outcome = match existing {
            Some(row) => {
                let id: i64 = row.try_get("id").map_err(ser)?;
                let score: i64 = row.try_get("score").map_err(ser)?;
                if i64::from(record.score) <= score {
                    DailyUpsert::KeptExisting(id)
                } else {
                    sqlx::query(
                        r"
                            UPDATE quiz_history
                            SET score = ?1,
                                xp = ?2,
                                time_taken_seconds = ?3,
                                review_data = ?4,
                                completed_at = ?5
                            WHERE id = ?6
                        ",
                    )
                    .bind(i64::from(record.score))
                    .bind(i64::from(record.xp))
                    .bind(time_taken)
                    .bind(&review_data)
                    .bind(record.completed_at)
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(conn)?;
                    DailyUpsert::Improved(id)
                }
            }
            None => {
                let res = sqlx::query(
                    r"
                        INSERT INTO quiz_history (
                            user_id, category_id, category_title, quiz_title, difficulty,
                            score, xp, time_taken_seconds, review_data, quiz_set_id,
                            date_taken, completed_at, is_daily
                        )
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, ?10, ?11, 1)
                    ",
                )
                .bind(&user_id)
                .bind(i64::from(CategoryId::MIXED.value()))
                .bind(DAILY_CATEGORY_TITLE)
                .bind(record.quiz_title())
                .bind(DAILY_DIFFICULTY_LABEL)
                .bind(i64::from(record.score))
                .bind(i64::from(record.xp))
                .bind(time_taken)
                .bind(&review_data)
                .bind(record.date)
                .bind(record.completed_at)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
                DailyUpsert::Inserted(res.last_insert_rowid())
            }
        };

        tx.commit().await.map_err(conn)?;
        Ok(outcome)
    }

    async fn get_daily(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Option<HistoryRow>, StorageError> {
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM quiz_history \
             WHERE user_id = ?1 AND date_taken = ?2 AND is_daily = 1"
        );
        let row = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_history_row).transpose()
    }

    async fn list_history(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<HistoryRow>, StorageError> {
        let sql = format!(
            "SELECT {HISTORY_COLUMNS} FROM quiz_history \
             WHERE user_id = ?1 \
             ORDER BY completed_at DESC, id DESC \
             LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_history_row(&row)?);
        }
        Ok(out)
    }
}
