use serde::{Deserialize, Serialize};

//
// ─── REVIEW STATUS ────────────────────────────────────────────────────────────
//

/// Outcome of a single question. Exactly one holds per completed question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Correct,
    Incorrect,
    Unanswered,
}

impl ReviewStatus {
    /// Classify a (decoded) selection against the (decoded) correct answer.
    #[must_use]
    pub fn classify(selected: Option<&str>, correct_answer: &str) -> Self {
        match selected {
            None => Self::Unanswered,
            Some(answer) if answer == correct_answer => Self::Correct,
            Some(_) => Self::Incorrect,
        }
    }

    #[must_use]
    pub fn is_answered(self) -> bool {
        !matches!(self, Self::Unanswered)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
            Self::Unanswered => "unanswered",
        }
    }
}

//
// ─── REVIEW ENTRY ─────────────────────────────────────────────────────────────
//

/// Per-question record shown on the post-quiz review screen and persisted with the attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    /// 1-based position in presentation order.
    pub number: u32,
    pub question: String,
    pub correct_answer: String,
    pub selected_answer: Option<String>,
    pub status: ReviewStatus,
}
