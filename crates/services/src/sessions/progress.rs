/// Where a session is in its lifecycle.
///
/// Per question: `AwaitingAnswer(i)` → `Locked(i)` → next question or `Finalizing`;
/// `Finalizing` → `Completed`. `Abandoned` is reached only through the exit guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingAnswer { index: usize },
    Locked { index: usize },
    Finalizing,
    Completed,
    Abandoned,
}

impl SessionPhase {
    /// Question index for the two per-question phases.
    #[must_use]
    pub fn question_index(self) -> Option<usize> {
        match self {
            Self::AwaitingAnswer { index } | Self::Locked { index } => Some(index),
            _ => None,
        }
    }

    /// Leaving the screen in this phase loses progress.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::AwaitingAnswer { .. } | Self::Locked { .. } | Self::Finalizing
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }
}

/// Aggregated counters of a running session, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub correct: u32,
    pub incorrect: u32,
    pub xp: u32,
}
