use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use quiz_core::model::{
    CategoryId, DAILY_CATEGORY_TITLE, DAILY_DIFFICULTY_LABEL, DailyQuizRecord, QuizHistoryRecord,
    QuizSetId, ReviewEntry, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Keys of the local key/value settings table.
pub mod settings_keys {
    pub const SOUND_ENABLED: &str = "sound_enabled";
    pub const HAPTICS_ENABLED: &str = "haptics_enabled";
    pub const LAST_DAILY_QUIZ_DATE: &str = "last_daily_quiz_date";
    pub const DAILY_REMINDER_PENDING: &str = "daily_reminder_pending";
    pub const LOCAL_USER_ID: &str = "local_user_id";
}

//
// ─── ROWS ──────────────────────────────────────────────────────────────────────
//

/// Persisted shape of one history row (regular or daily attempt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: i64,
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub category_title: String,
    pub quiz_title: String,
    pub difficulty: String,
    pub score: u8,
    pub xp: u32,
    pub time_taken_seconds: u64,
    pub review_data: Vec<ReviewEntry>,
    pub quiz_set_id: Option<QuizSetId>,
    pub date_taken: NaiveDate,
    pub completed_at: DateTime<Utc>,
    pub is_daily: bool,
}

impl HistoryRow {
    #[must_use]
    pub fn from_attempt(id: i64, record: &QuizHistoryRecord) -> Self {
        Self {
            id,
            user_id: record.user_id,
            category_id: record.category_id,
            category_title: record.category_title.clone(),
            quiz_title: record.quiz_title.clone(),
            difficulty: record.difficulty.as_str().to_owned(),
            score: record.score,
            xp: record.xp,
            time_taken_seconds: record.time_taken_seconds,
            review_data: record.review_data.clone(),
            quiz_set_id: Some(record.quiz_set_id.clone()),
            date_taken: record.completed_at.date_naive(),
            completed_at: record.completed_at,
            is_daily: false,
        }
    }

    #[must_use]
    pub fn from_daily(id: i64, record: &DailyQuizRecord) -> Self {
        Self {
            id,
            user_id: record.user_id,
            category_id: CategoryId::MIXED,
            category_title: DAILY_CATEGORY_TITLE.to_owned(),
            quiz_title: record.quiz_title(),
            difficulty: DAILY_DIFFICULTY_LABEL.to_owned(),
            score: record.score,
            xp: record.xp,
            time_taken_seconds: record.time_taken_seconds,
            review_data: record.review_data.clone(),
            quiz_set_id: None,
            date_taken: record.date,
            completed_at: record.completed_at,
            is_daily: true,
        }
    }
}

/// What `upsert_daily` did with the submitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyUpsert {
    /// No attempt existed for the day.
    Inserted(i64),
    /// The new score beat the stored one and replaced it.
    Improved(i64),
    /// The stored attempt scored at least as high and was kept.
    KeptExisting(i64),
}

impl DailyUpsert {
    #[must_use]
    pub fn id(self) -> i64 {
        match self {
            Self::Inserted(id) | Self::Improved(id) | Self::KeptExisting(id) => id,
        }
    }
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Repository contract for completed quiz attempts.
#[async_trait]
pub trait QuizHistoryRepository: Send + Sync {
    /// Append a regular attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn insert_attempt(&self, record: &QuizHistoryRecord) -> Result<i64, StorageError>;

    /// Store the daily attempt for `(user, date)`, keeping the higher score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup or write fails.
    async fn upsert_daily(&self, record: &DailyQuizRecord) -> Result<DailyUpsert, StorageError>;

    /// Fetch the daily attempt for a user and day, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn get_daily(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Option<HistoryRow>, StorageError>;

    /// Most recent attempts of a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn list_history(&self, user_id: UserId, limit: u32)
    -> Result<Vec<HistoryRow>, StorageError>;
}

/// Local key/value settings (preferences and device-local markers).
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    history: Arc<Mutex<Vec<HistoryRow>>>,
    settings: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn next_id(rows: &[HistoryRow]) -> i64 {
    rows.iter().map(|r| r.id).max().unwrap_or(0) + 1
}

#[async_trait]
impl QuizHistoryRepository for InMemoryRepository {
    async fn insert_attempt(&self, record: &QuizHistoryRecord) -> Result<i64, StorageError> {
        let mut guard = self.history.lock().map_err(poisoned)?;
        let id = next_id(&guard);
        guard.push(HistoryRow::from_attempt(id, record));
        Ok(id)
    }

    async fn upsert_daily(&self, record: &DailyQuizRecord) -> Result<DailyUpsert, StorageError> {
        let mut guard = self.history.lock().map_err(poisoned)?;
        let existing = guard
            .iter_mut()
            .find(|r| r.is_daily && r.user_id == record.user_id && r.date_taken == record.date);

        match existing {
            Some(row) if record.score > row.score => {
                let id = row.id;
                *row = HistoryRow::from_daily(id, record);
                Ok(DailyUpsert::Improved(id))
            }
            Some(row) => Ok(DailyUpsert::KeptExisting(row.id)),
            None => {
                let id = next_id(&guard);
                guard.push(HistoryRow::from_daily(id, record));
                Ok(DailyUpsert::Inserted(id))
            }
        }
    }

    async fn get_daily(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> Result<Option<HistoryRow>, StorageError> {
        let guard = self.history.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .find(|r| r.is_daily && r.user_id == user_id && r.date_taken == date)
            .cloned())
    }

    async fn list_history(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<HistoryRow>, StorageError> {
        let guard = self.history.lock().map_err(poisoned)?;
        let mut rows: Vec<HistoryRow> = guard
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.completed_at, b.id).cmp(&(a.completed_at, a.id)));
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.settings.lock().map_err(poisoned)?;
        Ok(guard.get(key).cloned())
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.settings.lock().map_err(poisoned)?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Aggregates history and settings repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub history: Arc<dyn QuizHistoryRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let history: Arc<dyn QuizHistoryRepository> = Arc::new(repo.clone());
        let settings: Arc<dyn SettingsRepository> = Arc::new(repo);
        Self { history, settings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Difficulty, ReviewStatus};
    use quiz_core::time::fixed_now;

    fn user() -> UserId {
        UserId::new(uuid_from(7))
    }

    fn uuid_from(n: u128) -> uuid::Uuid {
        uuid::Uuid::from_u128(n)
    }

    fn daily(score: u8, xp: u32) -> DailyQuizRecord {
        DailyQuizRecord {
            user_id: user(),
            date: fixed_now().date_naive(),
            score,
            xp,
            time_taken_seconds: 42,
            review_data: vec![ReviewEntry {
                number: 1,
                question: "Q".into(),
                correct_answer: "A".into(),
                selected_answer: Some("A".into()),
                status: ReviewStatus::Correct,
            }],
            completed_at: fixed_now(),
        }
    }

    fn attempt(score: u8) -> QuizHistoryRecord {
        QuizHistoryRecord {
            user_id: user(),
            category_id: CategoryId::new(9),
            category_title: "General".into(),
            quiz_title: "#1 General".into(),
            difficulty: Difficulty::Easy,
            score,
            xp: 80,
            time_taken_seconds: 12,
            review_data: Vec::new(),
            quiz_set_id: QuizSetId::new("cat9_easy_1"),
            completed_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn daily_upsert_keeps_best_score() {
        let repo = InMemoryRepository::new();

        let first = repo.upsert_daily(&daily(60, 100)).await.unwrap();
        assert!(matches!(first, DailyUpsert::Inserted(_)));

        let worse = repo.upsert_daily(&daily(40, 300)).await.unwrap();
        assert_eq!(worse, DailyUpsert::KeptExisting(first.id()));

        let equal = repo.upsert_daily(&daily(60, 500)).await.unwrap();
        assert_eq!(equal, DailyUpsert::KeptExisting(first.id()));

        let better = repo.upsert_daily(&daily(90, 200)).await.unwrap();
        assert_eq!(better, DailyUpsert::Improved(first.id()));

        let stored = repo
            .get_daily(user(), fixed_now().date_naive())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.score, 90);
        assert_eq!(stored.xp, 200);
        assert_eq!(stored.quiz_title, "Daily Quiz - 2023-11-14");
        assert_eq!(stored.category_id, CategoryId::MIXED);
    }

    #[tokio::test]
    async fn attempts_are_listed_per_user() {
        let repo = InMemoryRepository::new();
        repo.insert_attempt(&attempt(50)).await.unwrap();
        let second = repo.insert_attempt(&attempt(70)).await.unwrap();

        let rows = repo.list_history(user(), 10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, second);
        assert_eq!(rows[0].difficulty, "easy");

        let other = repo.list_history(UserId::new(uuid_from(8)), 10).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn settings_round_trip() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_value(settings_keys::SOUND_ENABLED).await.unwrap(), None);
        repo.set_value(settings_keys::SOUND_ENABLED, "false").await.unwrap();
        assert_eq!(
            repo.get_value(settings_keys::SOUND_ENABLED).await.unwrap().as_deref(),
            Some("false")
        );
    }
}
