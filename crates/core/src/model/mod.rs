mod difficulty;
mod history;
mod ids;
mod question;
mod review;
mod session;

pub use difficulty::Difficulty;
pub use history::{
    DAILY_CATEGORY_TITLE, DAILY_DIFFICULTY_LABEL, DailyQuizRecord, QuizHistoryRecord, daily_title,
};
pub use ids::{CategoryId, QuizSetId, UserId};
pub use question::{PreparedQuestion, QuestionError, QuestionRecord};
pub use review::{ReviewEntry, ReviewStatus};
pub use session::{
    ConfigError, DAILY_TITLE_PREFIX, QuizSessionConfig, SessionKind, SessionKindError,
    SessionParams, strip_rank_prefix,
};
