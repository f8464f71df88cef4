mod completion;
mod exit_guard;
mod progress;
mod result;
mod runtime;
mod service;
mod timers;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use completion::CompletionDispatcher;
pub use exit_guard::{ExitPrompt, NavigationDecision};
pub use progress::{SessionPhase, SessionProgress};
pub use result::QuizResult;
pub use runtime::{QuizSessionHandle, SessionDeps, SessionEnd, spawn_session, start_session};
pub use service::{AdvanceOutcome, FinalTally, QuizSession, SubmitOutcome, TickOutcome};
pub use timers::{ADVANCE_DELAY, TICK_INTERVAL, TimerEvent};
pub use view::{AnswerFeedback, SessionSnapshot};
