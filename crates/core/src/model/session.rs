use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::difficulty::Difficulty;
use crate::model::ids::{CategoryId, QuizSetId};
use crate::model::question::{QuestionError, QuestionRecord};

/// Title prefix that marks a daily session.
pub const DAILY_TITLE_PREFIX: &str = "Daily Quiz - ";

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionKindError {
    #[error("quiz set id {quiz_set_id:?} does not embed a category (expected cat<digits>_)")]
    MissingCategory { quiz_set_id: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("quiz has no questions")]
    EmptyQuestions,
    #[error("question {index} is invalid: {source}")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
    #[error(transparent)]
    Kind(#[from] SessionKindError),
}

//
// ─── SESSION KIND ─────────────────────────────────────────────────────────────
//

/// Whether a session records into the regular history or the per-day daily slot.
///
/// Decided once when the session is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKind {
    Normal {
        category_id: CategoryId,
        category_title: String,
    },
    Daily,
}

impl SessionKind {
    /// Classify a session from its navigation identifiers.
    ///
    /// # Errors
    ///
    /// Returns `SessionKindError::MissingCategory` for a non-daily title whose set id
    /// does not carry a category.
    pub fn classify(quiz_set_id: &QuizSetId, quiz_title: &str) -> Result<Self, SessionKindError> {
        if quiz_title.starts_with(DAILY_TITLE_PREFIX) {
            return Ok(Self::Daily);
        }

        let category_id =
            quiz_set_id
                .category_id()
                .ok_or_else(|| SessionKindError::MissingCategory {
                    quiz_set_id: quiz_set_id.as_str().to_owned(),
                })?;

        Ok(Self::Normal {
            category_id,
            category_title: strip_rank_prefix(quiz_title).to_owned(),
        })
    }

    #[must_use]
    pub fn is_daily(&self) -> bool {
        matches!(self, Self::Daily)
    }
}

/// Drop a leading `#<digits>` marker and the whitespace after it ("#3 Science" → "Science").
#[must_use]
pub fn strip_rank_prefix(title: &str) -> &str {
    let Some(rest) = title.strip_prefix('#') else {
        return title;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return title;
    }
    rest[digits..].trim_start()
}

//
// ─── NAVIGATION PARAMS ────────────────────────────────────────────────────────
//

/// Parameters a quiz screen is opened with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParams {
    pub quiz_set_id: String,
    pub quiz_title: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub questions: Vec<QuestionRecord>,
}

//
// ─── CONFIG ───────────────────────────────────────────────────────────────────
//

/// Validated, immutable input of one quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSessionConfig {
    quiz_set_id: QuizSetId,
    quiz_title: String,
    difficulty: Difficulty,
    questions: Vec<QuestionRecord>,
    kind: SessionKind,
}

impl QuizSessionConfig {
    /// Validate navigation parameters.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an empty question list, an unplayable question,
    /// or a normal session whose set id has no category.
    pub fn new(params: SessionParams) -> Result<Self, ConfigError> {
        let SessionParams {
            quiz_set_id,
            quiz_title,
            difficulty,
            questions,
        } = params;

        if questions.is_empty() {
            return Err(ConfigError::EmptyQuestions);
        }
        for (index, question) in questions.iter().enumerate() {
            question
                .validate()
                .map_err(|source| ConfigError::InvalidQuestion { index, source })?;
        }

        let quiz_set_id = QuizSetId::new(quiz_set_id);
        let kind = SessionKind::classify(&quiz_set_id, &quiz_title)?;

        Ok(Self {
            quiz_set_id,
            quiz_title,
            difficulty: Difficulty::from_optional_label(difficulty.as_deref()),
            questions,
            kind,
        })
    }

    #[must_use]
    pub fn quiz_set_id(&self) -> &QuizSetId {
        &self.quiz_set_id
    }

    #[must_use]
    pub fn quiz_title(&self) -> &str {
        &self.quiz_title
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn kind(&self) -> &SessionKind {
        &self.kind
    }

    /// Seconds on the clock for each question.
    #[must_use]
    pub fn time_budget_secs(&self) -> u32 {
        self.difficulty.time_budget_secs()
    }
}
