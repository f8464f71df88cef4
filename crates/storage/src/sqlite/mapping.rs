use chrono::{DateTime, NaiveDate, Utc};
use quiz_core::model::{CategoryId, QuizSetId, ReviewEntry, UserId};
use sqlx::Row;

use crate::repository::{HistoryRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn encode_review_data(entries: &[ReviewEntry]) -> Result<String, StorageError> {
    serde_json::to_string(entries).map_err(ser)
}

pub(crate) fn decode_review_data(raw: &str) -> Result<Vec<ReviewEntry>, StorageError> {
    serde_json::from_str(raw).map_err(ser)
}

pub(crate) fn category_id_from_i64(v: i64) -> Result<CategoryId, StorageError> {
    u32::try_from(v)
        .map(CategoryId::new)
        .map_err(|_| StorageError::Serialization(format!("invalid category_id: {v}")))
}

fn u8_from_i64(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn i64_from_u64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn map_history_row(row: &sqlx::sqlite::SqliteRow) -> Result<HistoryRow, StorageError> {
    let user_id: String = row.try_get("user_id").map_err(ser)?;
    let user_id: UserId = user_id.parse().map_err(ser)?;
    let review_data: String = row.try_get("review_data").map_err(ser)?;
    let quiz_set_id: Option<String> = row.try_get("quiz_set_id").map_err(ser)?;
    let date_taken: NaiveDate = row.try_get("date_taken").map_err(ser)?;
    let completed_at: DateTime<Utc> = row.try_get("completed_at").map_err(ser)?;

    Ok(HistoryRow {
        id: row.try_get("id").map_err(ser)?,
        user_id,
        category_id: category_id_from_i64(row.try_get::<i64, _>("category_id").map_err(ser)?)?,
        category_title: row.try_get("category_title").map_err(ser)?,
        quiz_title: row.try_get("quiz_title").map_err(ser)?,
        difficulty: row.try_get("difficulty").map_err(ser)?,
        score: u8_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?,
        xp: u32_from_i64("xp", row.try_get::<i64, _>("xp").map_err(ser)?)?,
        time_taken_seconds: u64_from_i64(
            "time_taken_seconds",
            row.try_get::<i64, _>("time_taken_seconds").map_err(ser)?,
        )?,
        review_data: decode_review_data(&review_data)?,
        quiz_set_id: quiz_set_id.map(QuizSetId::new),
        date_taken,
        completed_at,
        is_daily: row.try_get::<i64, _>("is_daily").map_err(ser)? != 0,
    })
}
