use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::difficulty::Difficulty;
use crate::model::ids::{CategoryId, QuizSetId, UserId};
use crate::model::review::ReviewEntry;
use crate::model::session::DAILY_TITLE_PREFIX;

/// Category title stored for daily rows.
pub const DAILY_CATEGORY_TITLE: &str = "Mixed";

/// Difficulty label stored for daily rows (questions come from mixed sets).
pub const DAILY_DIFFICULTY_LABEL: &str = "random";

/// Title under which the daily attempt for `date` is stored, e.g. `Daily Quiz - 2024-05-01`.
#[must_use]
pub fn daily_title(date: NaiveDate) -> String {
    format!("{DAILY_TITLE_PREFIX}{}", date.format("%Y-%m-%d"))
}

/// A completed regular (category) attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizHistoryRecord {
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub category_title: String,
    pub quiz_title: String,
    pub difficulty: Difficulty,
    /// Percentage, 0..=100.
    pub score: u8,
    pub xp: u32,
    pub time_taken_seconds: u64,
    pub review_data: Vec<ReviewEntry>,
    pub quiz_set_id: QuizSetId,
    pub completed_at: DateTime<Utc>,
}

/// A completed daily attempt; at most one is kept per user and calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuizRecord {
    pub user_id: UserId,
    pub date: NaiveDate,
    /// Percentage, 0..=100.
    pub score: u8,
    pub xp: u32,
    pub time_taken_seconds: u64,
    pub review_data: Vec<ReviewEntry>,
    pub completed_at: DateTime<Utc>,
}

impl DailyQuizRecord {
    #[must_use]
    pub fn quiz_title(&self) -> String {
        daily_title(self.date)
    }
}
