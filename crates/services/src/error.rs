//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::daily::DailyQuizError;
use quiz_core::model::ConfigError;
use storage::repository::StorageError;

/// Errors emitted by the quiz session and its runtime handle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("answer already submitted for this question")]
    AlreadySubmitted,
    #[error("session is not accepting input")]
    NotAccepting,
    #[error("option {0:?} is not offered for the current question")]
    UnknownOption(String),
    #[error("session runtime has stopped")]
    Closed,
}

/// Errors from sound/haptic feedback. Always swallowed by the caller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedbackError {
    #[error("feedback device failed: {0}")]
    Device(String),
    #[error(transparent)]
    Preferences(#[from] StorageError),
}

/// Errors emitted by `ResultSink` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SinkError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `NotificationCanceler` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NotificationError {
    #[error("notification platform failed: {0}")]
    Platform(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DailyQuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DailyServiceError {
    #[error(transparent)]
    Daily(#[from] DailyQuizError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
