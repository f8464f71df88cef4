#![forbid(unsafe_code)]

pub mod daily_service;
pub mod error;
pub mod feedback;
pub mod ports;
pub mod preferences;
pub mod reminders;
pub mod result_sink;
pub mod sessions;
pub mod user;

pub use quiz_core::Clock;
pub use sessions as session;

pub use daily_service::DailyQuizService;
pub use error::{DailyServiceError, FeedbackError, NotificationError, SessionError, SinkError};
pub use feedback::{FeedbackCue, FeedbackPreferences, play_feedback};
pub use preferences::StoredPreferences;
pub use reminders::StoredReminderCanceler;
pub use result_sink::HistoryResultSink;
pub use user::{StaticUser, local_user_id};

pub use sessions::{
    ExitPrompt, NavigationDecision, QuizResult, QuizSession, QuizSessionHandle, SessionDeps,
    SessionEnd, SessionPhase, SessionSnapshot, SubmitOutcome, spawn_session, start_session,
};
