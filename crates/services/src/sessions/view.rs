use quiz_core::model::ReviewStatus;

use super::progress::{SessionPhase, SessionProgress};

/// Outcome of the question currently shown as locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub status: ReviewStatus,
    pub correct_answer: String,
    pub xp_gained: u32,
    pub timed_out: bool,
}

/// Presentation-agnostic picture of a session at one instant.
///
/// Published after every transition; the UI renders it and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub quiz_title: String,
    pub question_number: usize,
    pub progress: SessionProgress,

    pub prompt: String,
    pub options: Vec<String>,
    pub selected_answer: Option<String>,
    pub eliminated_option: Option<String>,
    pub hint_used: bool,

    pub remaining_secs: u32,
    pub time_budget_secs: u32,

    pub feedback: Option<AnswerFeedback>,
}

impl SessionSnapshot {
    /// Input (select, hint, submit) is accepted.
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        matches!(self.phase, SessionPhase::AwaitingAnswer { .. })
    }

    /// Whether manual submission makes sense; timeouts submit regardless.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.accepts_input() && self.selected_answer.is_some()
    }

    /// Hint button state: available once per question while answering.
    #[must_use]
    pub fn can_request_hint(&self) -> bool {
        self.accepts_input() && !self.hint_used
    }
}
