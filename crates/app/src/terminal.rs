use std::io::{BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::ReviewStatus;
use services::error::FeedbackError;
use services::ports::{ExitConfirmer, FeedbackDevice, ResultPresenter};
use services::{
    ExitPrompt, FeedbackCue, NavigationDecision, QuizResult, QuizSessionHandle, SessionEnd,
    SessionError, SessionPhase, SessionSnapshot,
};
use tokio::sync::{Mutex, mpsc};

//
// ─── INPUT ─────────────────────────────────────────────────────────────────────
//

/// One line of player input, interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// 1-based option number as displayed.
    Choose(usize),
    Hint,
    Submit,
    Quit,
}

#[must_use]
pub fn parse_input(line: &str) -> Option<PlayerInput> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "h" | "hint" => Some(PlayerInput::Hint),
        "s" | "submit" => Some(PlayerInput::Submit),
        "q" | "quit" | "exit" => Some(PlayerInput::Quit),
        _ => line
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(PlayerInput::Choose),
    }
}

/// Lines read from stdin on a dedicated thread.
///
/// Shared between the play loop and the exit confirmation.
pub struct TerminalInput {
    lines: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl TerminalInput {
    #[must_use]
    pub fn from_stdin() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Arc::new(Self {
            lines: Mutex::new(rx),
        })
    }

    /// `None` once stdin is closed.
    pub async fn next_line(&self) -> Option<String> {
        self.lines.lock().await.recv().await
    }
}

//
// ─── COLLABORATORS ─────────────────────────────────────────────────────────────
//

/// Asks on the terminal; anything but `y`/`yes` stays in the quiz.
pub struct TerminalConfirmer {
    input: Arc<TerminalInput>,
}

impl TerminalConfirmer {
    #[must_use]
    pub fn new(input: Arc<TerminalInput>) -> Self {
        Self { input }
    }
}

#[async_trait]
impl ExitConfirmer for TerminalConfirmer {
    async fn confirm_exit(&self, prompt: &ExitPrompt) -> bool {
        println!("{} {} [y/N]", prompt.title, prompt.message);
        match self.input.next_line().await {
            Some(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            None => true,
        }
    }
}

/// Terminal bell for sound; there is no haptic device.
pub struct TerminalFeedback;

#[async_trait]
impl FeedbackDevice for TerminalFeedback {
    async fn play_sound(&self, cue: FeedbackCue) -> Result<(), FeedbackError> {
        let mut err = std::io::stderr();
        let bell: &[u8] = match cue {
            FeedbackCue::Success => b"\x07",
            FeedbackCue::Failure => b"\x07\x07",
        };
        err.write_all(bell)
            .and_then(|()| err.flush())
            .map_err(|e| FeedbackError::Device(e.to_string()))
    }

    async fn vibrate(&self, cue: FeedbackCue) -> Result<(), FeedbackError> {
        tracing::trace!(?cue, "no haptic device on a terminal");
        Ok(())
    }
}

/// Prints the result screen.
pub struct TerminalPresenter;

#[async_trait]
impl ResultPresenter for TerminalPresenter {
    async fn present(&self, result: QuizResult) {
        println!();
        println!("=== {} ===", result.category_title);
        println!(
            "Score {}%  |  correct {}  incorrect {}  unanswered {}",
            result.score_percent(),
            result.correct,
            result.incorrect,
            result.unanswered
        );
        println!(
            "Time {}  |  XP earned {}",
            result.time_taken_display(),
            result.xp_earned
        );
        println!();
        for entry in &result.review_data {
            let mark = match entry.status {
                ReviewStatus::Correct => "ok",
                ReviewStatus::Incorrect => "x ",
                ReviewStatus::Unanswered => "--",
            };
            let picked = entry.selected_answer.as_deref().unwrap_or("(no answer)");
            println!("{mark} {:>2}. {}", entry.number, entry.question);
            println!("       you: {picked}  |  answer: {}", entry.correct_answer);
        }
        println!();
        println!("{}", result.share_message());
    }
}

//
// ─── PLAY LOOP ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct Renderer {
    question: Option<usize>,
    feedback_for: Option<usize>,
    selected: Option<String>,
    eliminated: Option<String>,
    last_warning: Option<u32>,
}

impl Renderer {
    fn render(&mut self, snapshot: &SessionSnapshot) {
        match snapshot.phase {
            SessionPhase::AwaitingAnswer { index } => {
                if self.question != Some(index) {
                    self.question = Some(index);
                    self.selected = None;
                    self.eliminated = None;
                    self.last_warning = None;
                    print_question(snapshot);
                }
                if snapshot.eliminated_option != self.eliminated {
                    self.eliminated.clone_from(&snapshot.eliminated_option);
                    if let Some(option) = &snapshot.eliminated_option {
                        println!("Hint: \"{option}\" is not the answer (XP halved).");
                    }
                }
                if snapshot.selected_answer != self.selected {
                    self.selected.clone_from(&snapshot.selected_answer);
                    if let Some(option) = &snapshot.selected_answer {
                        println!("Selected \"{option}\". Press s to submit.");
                    }
                }
                let remaining = snapshot.remaining_secs;
                if (remaining == 10 || remaining <= 5) && self.last_warning != Some(remaining) {
                    self.last_warning = Some(remaining);
                    println!("{remaining} s left");
                }
            }
            SessionPhase::Locked { index } => {
                if self.feedback_for == Some(index) {
                    return;
                }
                self.feedback_for = Some(index);
                if let Some(feedback) = &snapshot.feedback {
                    match (feedback.status, feedback.timed_out) {
                        (ReviewStatus::Correct, _) => {
                            println!("Correct! +{} XP", feedback.xp_gained);
                        }
                        (_, true) => println!("Time's up! Answer: {}", feedback.correct_answer),
                        (ReviewStatus::Incorrect, false) => {
                            println!("Wrong. Answer: {}", feedback.correct_answer);
                        }
                        (ReviewStatus::Unanswered, false) => {
                            println!("Skipped. Answer: {}", feedback.correct_answer);
                        }
                    }
                }
            }
            SessionPhase::Finalizing | SessionPhase::Completed => {}
            SessionPhase::Abandoned => println!("Quiz abandoned; nothing was saved."),
        }
    }
}

fn print_question(snapshot: &SessionSnapshot) {
    println!();
    println!(
        "[{}] Question {}/{}  ({} s)",
        snapshot.quiz_title,
        snapshot.question_number,
        snapshot.progress.total,
        snapshot.time_budget_secs
    );
    println!("{}", snapshot.prompt);
    for (n, option) in snapshot.options.iter().enumerate() {
        println!("  {}) {option}", n + 1);
    }
    println!("Enter a number to choose, h for a hint, s to submit, q to quit.");
}

async fn apply_input(
    handle: &QuizSessionHandle,
    confirmer: &TerminalConfirmer,
    line: &str,
) -> Result<(), SessionError> {
    let Some(input) = parse_input(line) else {
        println!("Enter 1-4, h, s or q.");
        return Ok(());
    };

    match input {
        PlayerInput::Choose(n) => {
            let snapshot = handle.snapshot();
            match snapshot.options.get(n - 1) {
                Some(option) => handle.select_answer(option.clone()).await?,
                None => println!("There is no option {n}."),
            }
        }
        PlayerInput::Hint => {
            if handle.request_hint().await?.is_none() {
                println!("Only one hint per question.");
            }
        }
        PlayerInput::Submit => {
            handle.submit().await?;
        }
        PlayerInput::Quit => {
            if handle.request_exit(confirmer).await == NavigationDecision::Suppress {
                println!("Back to the quiz.");
            }
        }
    }
    Ok(())
}

/// Drive a session from the terminal until it completes or is abandoned.
///
/// # Errors
///
/// Returns `SessionError::Closed` if the session runtime stops without an outcome.
pub async fn play(
    handle: &QuizSessionHandle,
    input: &TerminalInput,
    confirmer: &TerminalConfirmer,
) -> Result<SessionEnd, SessionError> {
    let mut snapshots = handle.subscribe();
    let mut renderer = Renderer::default();
    renderer.render(&snapshots.borrow_and_update());

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                renderer.render(&snapshot);
                if snapshot.phase.is_terminal() {
                    break;
                }
            }
            line = input.next_line() => {
                let Some(line) = line else {
                    handle.abandon().await;
                    break;
                };
                match apply_input(handle, confirmer, &line).await {
                    Ok(()) => {}
                    Err(SessionError::AlreadySubmitted | SessionError::NotAccepting) => {
                        println!("Wait for the next question.");
                    }
                    Err(SessionError::Closed) => break,
                    Err(err) => println!("{err}"),
                }
            }
        }
    }

    handle.wait_completed().await
}
