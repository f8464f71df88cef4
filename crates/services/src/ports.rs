//! Collaborators the quiz session talks to.
//!
//! All of them are injected at construction so tests substitute fakes instead of
//! patching globals.

use async_trait::async_trait;
use chrono::NaiveDate;
use quiz_core::model::{QuizHistoryRecord, ReviewEntry, UserId};

use crate::error::{FeedbackError, NotificationError, SinkError};
use crate::feedback::{FeedbackCue, FeedbackPreferences};
use crate::sessions::{ExitPrompt, QuizResult};

/// Who is playing.
#[async_trait]
pub trait CurrentUserProvider: Send + Sync {
    /// `None` when nobody is signed in.
    async fn current_user_id(&self) -> Option<UserId>;
}

/// Whether sound and haptic feedback are enabled.
#[async_trait]
pub trait PreferenceReader: Send + Sync {
    /// # Errors
    ///
    /// Returns `FeedbackError` if the preferences cannot be read.
    async fn feedback_preferences(&self) -> Result<FeedbackPreferences, FeedbackError>;
}

/// Audio and haptic output, best-effort.
#[async_trait]
pub trait FeedbackDevice: Send + Sync {
    /// # Errors
    ///
    /// Returns `FeedbackError::Device` when the sound cannot be played.
    async fn play_sound(&self, cue: FeedbackCue) -> Result<(), FeedbackError>;

    /// # Errors
    ///
    /// Returns `FeedbackError::Device` when the vibration cannot be triggered.
    async fn vibrate(&self, cue: FeedbackCue) -> Result<(), FeedbackError>;
}

/// Persistence of finished attempts.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Record a completed regular attempt.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the backend rejects the write.
    async fn record_attempt(&self, record: &QuizHistoryRecord) -> Result<(), SinkError>;

    /// Record today's daily attempt, keeping the best score of the day.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the backend rejects the write.
    async fn record_daily(
        &self,
        user_id: UserId,
        score: u8,
        xp: u32,
        review_data: &[ReviewEntry],
        time_taken_seconds: u64,
    ) -> Result<(), SinkError>;
}

/// Daily reminder bookkeeping run after a daily quiz.
#[async_trait]
pub trait NotificationCanceler: Send + Sync {
    /// Cancel every pending reminder.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError` when the platform call fails.
    async fn cancel_all(&self) -> Result<(), NotificationError>;

    /// Remember locally that the daily quiz was completed on `date`.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError` when the marker cannot be stored.
    async fn record_completion_date(&self, date: NaiveDate) -> Result<(), NotificationError>;
}

/// Receives the final summary exactly once per completed session.
#[async_trait]
pub trait ResultPresenter: Send + Sync {
    async fn present(&self, result: QuizResult);
}

/// Asks the player whether to abandon a running quiz.
#[async_trait]
pub trait ExitConfirmer: Send + Sync {
    /// `true` to leave (progress lost), `false` to stay.
    async fn confirm_exit(&self, prompt: &ExitPrompt) -> bool;
}
