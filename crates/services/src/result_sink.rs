use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{DailyQuizRecord, QuizHistoryRecord, ReviewEntry, UserId};
use quiz_core::time::Clock;
use storage::repository::{DailyUpsert, QuizHistoryRepository};

use crate::error::SinkError;
use crate::ports::ResultSink;

/// `ResultSink` writing into the quiz history repository.
///
/// Daily attempts are keyed by the clock's calendar day.
#[derive(Clone)]
pub struct HistoryResultSink {
    history: Arc<dyn QuizHistoryRepository>,
    clock: Clock,
}

impl HistoryResultSink {
    #[must_use]
    pub fn new(history: Arc<dyn QuizHistoryRepository>, clock: Clock) -> Self {
        Self { history, clock }
    }
}

#[async_trait]
impl ResultSink for HistoryResultSink {
    async fn record_attempt(&self, record: &QuizHistoryRecord) -> Result<(), SinkError> {
        let id = self.history.insert_attempt(record).await?;
        tracing::info!(
            attempt_id = id,
            quiz_set_id = %record.quiz_set_id,
            score = record.score,
            xp = record.xp,
            "quiz attempt recorded"
        );
        Ok(())
    }

    async fn record_daily(
        &self,
        user_id: UserId,
        score: u8,
        xp: u32,
        review_data: &[ReviewEntry],
        time_taken_seconds: u64,
    ) -> Result<(), SinkError> {
        let record = DailyQuizRecord {
            user_id,
            date: self.clock.today(),
            score,
            xp,
            time_taken_seconds,
            review_data: review_data.to_vec(),
            completed_at: self.clock.now(),
        };

        match self.history.upsert_daily(&record).await? {
            DailyUpsert::Inserted(id) => {
                tracing::info!(attempt_id = id, score, date = %record.date, "daily quiz recorded");
            }
            DailyUpsert::Improved(id) => {
                tracing::info!(attempt_id = id, score, date = %record.date, "daily quiz best score improved");
            }
            DailyUpsert::KeptExisting(id) => {
                tracing::debug!(attempt_id = id, score, date = %record.date, "daily quiz kept earlier, better score");
            }
        }
        Ok(())
    }
}
