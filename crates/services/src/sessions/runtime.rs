use std::sync::Arc;

use quiz_core::model::{QuizSessionConfig, SessionParams};
use quiz_core::time::Clock;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;

use super::completion::CompletionDispatcher;
use super::exit_guard::{ExitPrompt, NavigationDecision};
use super::result::QuizResult;
use super::service::{AdvanceOutcome, QuizSession, SubmitOutcome, TickOutcome};
use super::timers::{SessionTimers, TimerEvent};
use super::view::SessionSnapshot;
use crate::error::SessionError;
use crate::feedback::play_feedback;
use crate::ports::{
    CurrentUserProvider, ExitConfirmer, FeedbackDevice, NotificationCanceler, PreferenceReader,
    ResultPresenter, ResultSink,
};

/// Collaborators of a running session, injected at start.
#[derive(Clone)]
pub struct SessionDeps {
    pub clock: Clock,
    pub user: Arc<dyn CurrentUserProvider>,
    pub preferences: Arc<dyn PreferenceReader>,
    pub feedback: Arc<dyn FeedbackDevice>,
    pub sink: Arc<dyn ResultSink>,
    pub notifications: Arc<dyn NotificationCanceler>,
    pub presenter: Arc<dyn ResultPresenter>,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Completed(QuizResult),
    Abandoned,
}

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

pub(crate) enum Command {
    Select {
        option: String,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Hint {
        reply: oneshot::Sender<Result<Option<String>, SessionError>>,
    },
    Submit {
        reply: oneshot::Sender<Result<SubmitOutcome, SessionError>>,
    },
    IsExitGuarded {
        reply: oneshot::Sender<bool>,
    },
    Abandon {
        reply: oneshot::Sender<bool>,
    },
}

/// Everything the event loop reacts to, in arrival order.
pub(crate) enum SessionEvent {
    Command(Command),
    Timer(TimerEvent),
}

//
// ─── START ─────────────────────────────────────────────────────────────────────
//

/// Validate navigation parameters and start a session.
///
/// # Errors
///
/// Returns `SessionError::Config` if the parameters do not describe a playable quiz.
pub fn start_session(
    params: SessionParams,
    deps: SessionDeps,
) -> Result<QuizSessionHandle, SessionError> {
    let config = QuizSessionConfig::new(params)?;
    Ok(spawn_session(QuizSession::new(config), deps))
}

/// Move `session` onto its own task and return a handle to drive it.
///
/// The task exclusively owns the session; all input and timer events are processed
/// one at a time from a single channel. Must be called within a tokio runtime.
/// Dropping every handle abandons the session.
#[must_use]
pub fn spawn_session(session: QuizSession, deps: SessionDeps) -> QuizSessionHandle {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
    let (end_tx, end_rx) = watch::channel(None);

    tracing::info!(
        quiz_set_id = %session.config().quiz_set_id(),
        quiz_title = session.config().quiz_title(),
        difficulty = %session.config().difficulty(),
        questions = session.config().total_questions(),
        daily = session.config().kind().is_daily(),
        "quiz session started"
    );

    let runtime = SessionRuntime {
        timers: SessionTimers::new(&events_tx),
        session,
        deps,
        started_at: Instant::now(),
        snapshots: snapshot_tx,
        end: end_tx,
    };
    tokio::spawn(runtime.run(events_rx));

    QuizSessionHandle {
        events: events_tx,
        snapshots: snapshot_rx,
        end: end_rx,
    }
}

//
// ─── EVENT LOOP ────────────────────────────────────────────────────────────────
//

struct SessionRuntime {
    session: QuizSession,
    deps: SessionDeps,
    timers: SessionTimers,
    started_at: Instant,
    snapshots: watch::Sender<SessionSnapshot>,
    end: watch::Sender<Option<SessionEnd>>,
}

impl SessionRuntime {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        self.timers.start_countdown(self.session.epoch());

        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::Command(command) => self.handle_command(command),
                SessionEvent::Timer(TimerEvent::Tick { epoch }) => match self.session.tick(epoch) {
                    TickOutcome::Stale => {}
                    TickOutcome::Running { .. } => self.publish(),
                    TickOutcome::TimedOut(outcome) => {
                        tracing::debug!(index = outcome.index, "question timed out");
                        self.on_locked(&outcome);
                    }
                },
                SessionEvent::Timer(TimerEvent::AdvanceDue { epoch }) => {
                    match self.session.advance(epoch) {
                        AdvanceOutcome::Stale => {}
                        AdvanceOutcome::NextQuestion { .. } => {
                            self.timers.start_countdown(self.session.epoch());
                            self.publish();
                        }
                        AdvanceOutcome::ReadyToFinalize => {
                            self.publish();
                            self.complete().await;
                        }
                    }
                }
            }

            if self.session.phase().is_terminal() {
                return;
            }
        }

        // Every handle is gone.
        self.timers.cancel_all();
        if self.session.abandon() {
            tracing::info!(
                quiz_set_id = %self.session.config().quiz_set_id(),
                "quiz session dropped by its owner"
            );
            self.publish();
            self.end.send_replace(Some(SessionEnd::Abandoned));
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Select { option, reply } => {
                let result = self.session.select_answer(&option);
                if result.is_ok() {
                    self.publish();
                }
                let _ = reply.send(result);
            }
            Command::Hint { reply } => {
                let result = self.session.request_hint();
                if matches!(result, Ok(Some(_))) {
                    self.publish();
                }
                let _ = reply.send(result);
            }
            Command::Submit { reply } => {
                let result = self.session.submit();
                if let Ok(outcome) = &result {
                    self.on_locked(outcome);
                }
                let _ = reply.send(result);
            }
            Command::IsExitGuarded { reply } => {
                let _ = reply.send(self.session.is_exit_guarded());
            }
            Command::Abandon { reply } => {
                let abandoned = self.session.abandon();
                if abandoned {
                    self.timers.cancel_all();
                    tracing::info!(
                        quiz_set_id = %self.session.config().quiz_set_id(),
                        answered = self.session.review_log().len(),
                        "quiz session abandoned"
                    );
                    self.publish();
                    self.end.send_replace(Some(SessionEnd::Abandoned));
                }
                let _ = reply.send(abandoned);
            }
        }
    }

    fn on_locked(&mut self, outcome: &SubmitOutcome) {
        // The delay starts now; feedback runs beside it and is never awaited.
        self.timers.schedule_advance(self.session.epoch());

        if let Some(cue) = outcome.feedback_cue() {
            let preferences = Arc::clone(&self.deps.preferences);
            let device = Arc::clone(&self.deps.feedback);
            tokio::spawn(async move {
                play_feedback(preferences.as_ref(), device.as_ref(), cue).await;
            });
        }

        tracing::debug!(
            index = outcome.index,
            status = outcome.status.as_str(),
            xp = outcome.xp_gained,
            timed_out = outcome.timed_out,
            "question locked"
        );
        self.publish();
    }

    async fn complete(&mut self) {
        self.timers.cancel_all();
        let tally = match self.session.finalize(self.started_at.elapsed()) {
            Ok(tally) => tally,
            Err(err) => {
                tracing::error!(error = %err, "quiz session could not be finalized");
                return;
            }
        };
        self.publish();

        let result = CompletionDispatcher::new(&self.deps)
            .dispatch(self.session.config(), &tally)
            .await;

        tracing::info!(
            quiz_set_id = %self.session.config().quiz_set_id(),
            score = tally.score,
            xp = tally.xp,
            correct = tally.correct,
            total = tally.total_questions,
            "quiz session completed"
        );
        self.end.send_replace(Some(SessionEnd::Completed(result)));
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }
}

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Cloneable handle to a running session.
#[derive(Clone)]
pub struct QuizSessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
    snapshots: watch::Receiver<SessionSnapshot>,
    end: watch::Receiver<Option<SessionEnd>>,
}

impl QuizSessionHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.events
            .send(SessionEvent::Command(command(reply)))
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }

    /// # Errors
    ///
    /// See `QuizSession::select_answer`; `SessionError::Closed` once the session ended.
    pub async fn select_answer(&self, option: impl Into<String>) -> Result<(), SessionError> {
        let option = option.into();
        self.request(|reply| Command::Select { option, reply }).await?
    }

    /// # Errors
    ///
    /// See `QuizSession::request_hint`; `SessionError::Closed` once the session ended.
    pub async fn request_hint(&self) -> Result<Option<String>, SessionError> {
        self.request(|reply| Command::Hint { reply }).await?
    }

    /// # Errors
    ///
    /// See `QuizSession::submit`; `SessionError::Closed` once the session ended.
    pub async fn submit(&self) -> Result<SubmitOutcome, SessionError> {
        self.request(|reply| Command::Submit { reply }).await?
    }

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every transition and countdown tick.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Guard a request to leave the quiz screen.
    ///
    /// While the session is running the player is asked through `confirmer`; the
    /// session keeps running during the question. Confirming abandons it without
    /// persisting anything. Once the session has ended, leaving is always allowed.
    pub async fn request_exit(&self, confirmer: &dyn ExitConfirmer) -> NavigationDecision {
        let guarded = self
            .request(|reply| Command::IsExitGuarded { reply })
            .await
            .unwrap_or(false);
        if !guarded {
            return NavigationDecision::Proceed;
        }

        let decision =
            NavigationDecision::from_confirmation(confirmer.confirm_exit(&ExitPrompt::LOSE_PROGRESS).await);
        if decision == NavigationDecision::Proceed {
            self.abandon().await;
        }
        decision
    }

    /// Abandon without asking. Returns `false` if the session had already ended.
    pub async fn abandon(&self) -> bool {
        self.request(|reply| Command::Abandon { reply })
            .await
            .unwrap_or(false)
    }

    /// How the session ended, if it has.
    #[must_use]
    pub fn outcome(&self) -> Option<SessionEnd> {
        self.end.borrow().clone()
    }

    /// Wait until the session completes or is abandoned.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the runtime stopped without reporting an end.
    pub async fn wait_completed(&self) -> Result<SessionEnd, SessionError> {
        let mut end = self.end.clone();
        let reached = end
            .wait_for(Option::is_some)
            .await
            .map_err(|_| SessionError::Closed)?;
        (*reached).clone().ok_or(SessionError::Closed)
    }
}
