use thiserror::Error;

use crate::daily::DailyQuizError;
use crate::model::{ConfigError, QuestionError, SessionKindError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    SessionKind(#[from] SessionKindError),
    #[error(transparent)]
    Daily(#[from] DailyQuizError),
}
