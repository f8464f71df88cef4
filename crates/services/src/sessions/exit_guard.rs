/// Confirmation shown when leaving a running quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitPrompt {
    pub title: &'static str,
    pub message: &'static str,
}

impl ExitPrompt {
    pub const LOSE_PROGRESS: ExitPrompt = ExitPrompt {
        title: "Exit Quiz?",
        message: "Progress will be lost. Exit?",
    };
}

impl Default for ExitPrompt {
    fn default() -> Self {
        Self::LOSE_PROGRESS
    }
}

/// What the surrounding navigation should do with a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Proceed,
    Suppress,
}

impl NavigationDecision {
    #[must_use]
    pub fn from_confirmation(confirmed: bool) -> Self {
        if confirmed { Self::Proceed } else { Self::Suppress }
    }
}
