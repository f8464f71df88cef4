use std::time::Duration;

use quiz_core::model::{PreparedQuestion, QuizSessionConfig, ReviewEntry, ReviewStatus};
use quiz_core::scoring::{score_percent, xp_for_answer};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use super::progress::{SessionPhase, SessionProgress};
use super::view::{AnswerFeedback, SessionSnapshot};
use crate::error::SessionError;
use crate::feedback::FeedbackCue;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Result of locking in the current question, by the player or by the countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub index: usize,
    pub status: ReviewStatus,
    pub xp_gained: u32,
    pub correct_answer: String,
    pub selected_answer: Option<String>,
    pub is_last: bool,
    pub timed_out: bool,
}

impl SubmitOutcome {
    /// Feedback to play; unanswered questions stay silent.
    #[must_use]
    pub fn feedback_cue(&self) -> Option<FeedbackCue> {
        match self.status {
            ReviewStatus::Correct => Some(FeedbackCue::Success),
            ReviewStatus::Incorrect => Some(FeedbackCue::Failure),
            ReviewStatus::Unanswered => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick from a superseded question, or the countdown is not running.
    Stale,
    Running { remaining_secs: u32 },
    TimedOut(SubmitOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Stale,
    NextQuestion { index: usize },
    ReadyToFinalize,
}

/// Final numbers of a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalTally {
    pub total_questions: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
    /// Percentage, 0..=100.
    pub score: u8,
    pub xp: u32,
    pub time_taken_secs: u64,
    pub review_log: Vec<ReviewEntry>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One timed attempt at a quiz.
///
/// Purely synchronous: time enters through `tick`, `advance` and `finalize`, which
/// the runtime drives from its timers. Every question load bumps the epoch, so a
/// timer event carrying an older epoch is ignored.
pub struct QuizSession {
    config: QuizSessionConfig,
    rng: StdRng,
    phase: SessionPhase,
    epoch: u64,

    question: PreparedQuestion,
    remaining_secs: u32,
    selected_answer: Option<String>,
    hint_used: bool,
    eliminated_option: Option<String>,
    last_outcome: Option<SubmitOutcome>,

    correct: u32,
    incorrect: u32,
    total_xp: u32,
    review_log: Vec<ReviewEntry>,
}

impl QuizSession {
    /// Start a session at the first question with an entropy-seeded RNG.
    #[must_use]
    pub fn new(config: QuizSessionConfig) -> Self {
        Self::with_rng(config, StdRng::from_rng(&mut rand::rng()))
    }

    /// Start a session with a caller-provided RNG (option shuffles and hint picks).
    #[must_use]
    pub fn with_rng(config: QuizSessionConfig, mut rng: StdRng) -> Self {
        // `QuizSessionConfig` guarantees at least one question.
        let question = PreparedQuestion::prepare(&config.questions()[0], &mut rng);
        let remaining_secs = config.time_budget_secs();
        let review_log = Vec::with_capacity(config.total_questions());

        Self {
            config,
            rng,
            phase: SessionPhase::AwaitingAnswer { index: 0 },
            epoch: 0,
            question,
            remaining_secs,
            selected_answer: None,
            hint_used: false,
            eliminated_option: None,
            last_outcome: None,
            correct: 0,
            incorrect: 0,
            total_xp: 0,
            review_log,
        }
    }

    #[must_use]
    pub fn config(&self) -> &QuizSessionConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn current_question(&self) -> &PreparedQuestion {
        &self.question
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    #[must_use]
    pub fn eliminated_option(&self) -> Option<&str> {
        self.eliminated_option.as_deref()
    }

    #[must_use]
    pub fn hint_used(&self) -> bool {
        self.hint_used
    }

    #[must_use]
    pub fn review_log(&self) -> &[ReviewEntry] {
        &self.review_log
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.config.total_questions(),
            answered: self.review_log.len(),
            correct: self.correct,
            incorrect: self.incorrect,
            xp: self.total_xp,
        }
    }

    /// Leaving the screen now needs confirmation.
    #[must_use]
    pub fn is_exit_guarded(&self) -> bool {
        self.phase.is_active()
    }

    fn awaiting_index(&self) -> Result<usize, SessionError> {
        match self.phase {
            SessionPhase::AwaitingAnswer { index } => Ok(index),
            SessionPhase::Locked { .. } => Err(SessionError::AlreadySubmitted),
            _ => Err(SessionError::NotAccepting),
        }
    }

    /// Pick an option for the current question. Changing the pick is allowed until submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` once the question is locked,
    /// `SessionError::NotAccepting` outside a question and
    /// `SessionError::UnknownOption` for a string that is not one of the displayed options.
    pub fn select_answer(&mut self, option: &str) -> Result<(), SessionError> {
        self.awaiting_index()?;
        if !self.question.has_option(option) {
            return Err(SessionError::UnknownOption(option.to_owned()));
        }
        self.selected_answer = Some(option.to_owned());
        Ok(())
    }

    /// Eliminate one incorrect option, once per question.
    ///
    /// Returns the eliminated option, or `None` when the hint was already used.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` or `SessionError::NotAccepting` when the
    /// current question no longer takes input.
    pub fn request_hint(&mut self) -> Result<Option<String>, SessionError> {
        self.awaiting_index()?;
        if self.hint_used {
            return Ok(None);
        }

        let candidates: Vec<&str> = self.question.incorrect_options().collect();
        let Some(choice) = candidates.choose(&mut self.rng) else {
            return Ok(None);
        };
        let eliminated = (*choice).to_owned();

        self.hint_used = true;
        self.eliminated_option = Some(eliminated.clone());
        Ok(Some(eliminated))
    }

    /// Lock in the current selection (possibly none).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadySubmitted` for a second submission of the same
    /// question and `SessionError::NotAccepting` outside a question.
    pub fn submit(&mut self) -> Result<SubmitOutcome, SessionError> {
        let index = self.awaiting_index()?;
        Ok(self.lock(index, false))
    }

    /// One second of countdown elapsed for the question loaded at `epoch`.
    ///
    /// Reaching zero submits whatever is selected.
    pub fn tick(&mut self, epoch: u64) -> TickOutcome {
        if epoch != self.epoch {
            return TickOutcome::Stale;
        }
        let SessionPhase::AwaitingAnswer { index } = self.phase else {
            return TickOutcome::Stale;
        };

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            TickOutcome::TimedOut(self.lock(index, true))
        } else {
            TickOutcome::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }

    fn lock(&mut self, index: usize, timed_out: bool) -> SubmitOutcome {
        let correct_answer = self.question.correct_answer().to_owned();
        // Single derivation: the status drives counters, XP and the review entry alike.
        let status = ReviewStatus::classify(self.selected_answer.as_deref(), &correct_answer);
        let xp_gained = xp_for_answer(
            status,
            self.remaining_secs,
            self.config.time_budget_secs(),
            self.hint_used,
        );

        match status {
            ReviewStatus::Correct => self.correct += 1,
            ReviewStatus::Incorrect => self.incorrect += 1,
            ReviewStatus::Unanswered => {}
        }
        self.total_xp = self.total_xp.saturating_add(xp_gained);
        self.review_log.push(ReviewEntry {
            number: u32::try_from(index + 1).unwrap_or(u32::MAX),
            question: self.question.prompt().to_owned(),
            correct_answer: correct_answer.clone(),
            selected_answer: self.selected_answer.clone(),
            status,
        });

        self.phase = SessionPhase::Locked { index };
        let outcome = SubmitOutcome {
            index,
            status,
            xp_gained,
            correct_answer,
            selected_answer: self.selected_answer.clone(),
            is_last: index + 1 >= self.config.total_questions(),
            timed_out,
        };
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    /// The post-submission delay for the question loaded at `epoch` has elapsed.
    pub fn advance(&mut self, epoch: u64) -> AdvanceOutcome {
        if epoch != self.epoch {
            return AdvanceOutcome::Stale;
        }
        let SessionPhase::Locked { index } = self.phase else {
            return AdvanceOutcome::Stale;
        };

        let next = index + 1;
        let Some(record) = self.config.questions().get(next) else {
            self.phase = SessionPhase::Finalizing;
            return AdvanceOutcome::ReadyToFinalize;
        };

        self.question = PreparedQuestion::prepare(record, &mut self.rng);
        self.remaining_secs = self.config.time_budget_secs();
        self.selected_answer = None;
        self.hint_used = false;
        self.eliminated_option = None;
        self.last_outcome = None;
        self.epoch += 1;
        self.phase = SessionPhase::AwaitingAnswer { index: next };
        AdvanceOutcome::NextQuestion { index: next }
    }

    /// Compute the final numbers and mark the session completed.
    ///
    /// `elapsed` is the time since the session started; it is truncated to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAccepting` unless the session is `Finalizing`.
    pub fn finalize(&mut self, elapsed: Duration) -> Result<FinalTally, SessionError> {
        if self.phase != SessionPhase::Finalizing {
            return Err(SessionError::NotAccepting);
        }

        let total_questions = u32::try_from(self.config.total_questions()).unwrap_or(u32::MAX);
        let unanswered = total_questions
            .saturating_sub(self.correct)
            .saturating_sub(self.incorrect);

        self.phase = SessionPhase::Completed;
        self.epoch += 1;
        Ok(FinalTally {
            total_questions,
            correct: self.correct,
            incorrect: self.incorrect,
            unanswered,
            score: score_percent(self.correct, total_questions),
            xp: self.total_xp,
            time_taken_secs: elapsed.as_secs(),
            review_log: self.review_log.clone(),
        })
    }

    /// Drop the attempt. Returns `false` if it had already ended.
    pub fn abandon(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = SessionPhase::Abandoned;
        self.epoch += 1;
        true
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let question_number = self
            .phase
            .question_index()
            .map_or(self.review_log.len(), |index| index + 1);

        SessionSnapshot {
            phase: self.phase,
            quiz_title: self.config.quiz_title().to_owned(),
            question_number,
            progress: self.progress(),
            prompt: self.question.prompt().to_owned(),
            options: self.question.options().to_vec(),
            selected_answer: self.selected_answer.clone(),
            eliminated_option: self.eliminated_option.clone(),
            hint_used: self.hint_used,
            remaining_secs: self.remaining_secs,
            time_budget_secs: self.config.time_budget_secs(),
            feedback: self.last_outcome.as_ref().map(|outcome| AnswerFeedback {
                status: outcome.status,
                correct_answer: outcome.correct_answer.clone(),
                xp_gained: outcome.xp_gained,
                timed_out: outcome.timed_out,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionRecord, SessionParams};

    fn config(title: &str, difficulty: Option<&str>, questions: Vec<QuestionRecord>) -> QuizSessionConfig {
        QuizSessionConfig::new(SessionParams {
            quiz_set_id: "cat9_medium_2".into(),
            quiz_title: title.into(),
            difficulty: difficulty.map(str::to_owned),
            questions,
        })
        .unwrap()
    }

    fn question(n: usize) -> QuestionRecord {
        QuestionRecord::new(format!("Question {n}?"), "Right", ["Wrong 1", "Wrong 2", "Wrong 3"])
    }

    fn session(n: usize, seed: u64) -> QuizSession {
        let questions = (0..n).map(question).collect();
        QuizSession::with_rng(config("#2 General", None, questions), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn starts_on_first_question_with_full_budget() {
        let session = session(3, 1);
        assert_eq!(session.phase(), SessionPhase::AwaitingAnswer { index: 0 });
        assert_eq!(session.remaining_secs(), 30);
        assert_eq!(session.current_question().options().len(), 4);
        assert!(session.is_exit_guarded());
    }

    #[test]
    fn immediate_correct_answer_scores_full_xp() {
        let mut session = session(1, 2);
        session.select_answer("Right").unwrap();
        let outcome = session.submit().unwrap();

        assert_eq!(outcome.status, ReviewStatus::Correct);
        assert_eq!(outcome.xp_gained, 100);
        assert!(outcome.is_last);
        assert_eq!(outcome.feedback_cue(), Some(FeedbackCue::Success));
    }

    #[test]
    fn hint_never_eliminates_correct_answer() {
        for seed in 0..200 {
            let mut session = session(1, seed);
            let eliminated = session.request_hint().unwrap().unwrap();
            assert_ne!(eliminated, "Right");
            assert!(session.current_question().has_option(&eliminated));
        }
    }

    #[test]
    fn second_hint_is_a_no_op() {
        let mut session = session(1, 5);
        let first = session.request_hint().unwrap();
        let snapshot = session.snapshot();

        assert_eq!(session.request_hint().unwrap(), None);
        assert_eq!(session.snapshot(), snapshot);
        assert_eq!(session.eliminated_option(), first.as_deref());
    }

    #[test]
    fn hint_halves_xp() {
        let mut session = session(1, 6);
        session.request_hint().unwrap();
        session.select_answer("Right").unwrap();
        assert_eq!(session.submit().unwrap().xp_gained, 50);
    }

    #[test]
    fn selection_is_frozen_after_submit() {
        let mut session = session(2, 7);
        session.select_answer("Wrong 1").unwrap();
        session.submit().unwrap();

        assert_eq!(session.select_answer("Right"), Err(SessionError::AlreadySubmitted));
        assert_eq!(session.submit(), Err(SessionError::AlreadySubmitted));
        assert_eq!(session.request_hint(), Err(SessionError::AlreadySubmitted));
        assert_eq!(session.selected_answer(), Some("Wrong 1"));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut session = session(1, 8);
        assert_eq!(
            session.select_answer("Nope"),
            Err(SessionError::UnknownOption("Nope".into()))
        );
        assert_eq!(session.selected_answer(), None);
    }

    #[test]
    fn countdown_times_out_into_unanswered() {
        let mut session = session(1, 9);
        let epoch = session.epoch();
        for expected in (1..30).rev() {
            assert_eq!(
                session.tick(epoch),
                TickOutcome::Running { remaining_secs: expected }
            );
        }
        let TickOutcome::TimedOut(outcome) = session.tick(epoch) else {
            panic!("expected timeout");
        };
        assert_eq!(outcome.status, ReviewStatus::Unanswered);
        assert_eq!(outcome.xp_gained, 0);
        assert!(outcome.timed_out);
        assert_eq!(outcome.feedback_cue(), None);
        assert_eq!(session.tick(epoch), TickOutcome::Stale);
        assert_eq!(session.remaining_secs(), 0);
    }

    #[test]
    fn timeout_keeps_pending_selection() {
        let questions = vec![question(0)];
        let mut session = QuizSession::with_rng(
            config("General", Some("easy"), questions),
            StdRng::seed_from_u64(10),
        );
        session.select_answer("Right").unwrap();
        let epoch = session.epoch();
        let mut last = TickOutcome::Stale;
        for _ in 0..60 {
            last = session.tick(epoch);
        }
        let TickOutcome::TimedOut(outcome) = last else {
            panic!("expected timeout");
        };
        // Correct, but no time left.
        assert_eq!(outcome.status, ReviewStatus::Correct);
        assert_eq!(outcome.xp_gained, 0);
    }

    #[test]
    fn stale_epoch_is_ignored_after_advance() {
        let mut session = session(2, 11);
        let first_epoch = session.epoch();
        session.submit().unwrap();
        assert_eq!(
            session.advance(first_epoch),
            AdvanceOutcome::NextQuestion { index: 1 }
        );

        assert_eq!(session.tick(first_epoch), TickOutcome::Stale);
        assert_eq!(session.advance(first_epoch), AdvanceOutcome::Stale);
        assert_eq!(session.remaining_secs(), 30);
        assert_eq!(session.phase(), SessionPhase::AwaitingAnswer { index: 1 });
    }

    #[test]
    fn advance_resets_per_question_state() {
        let mut session = session(2, 12);
        session.request_hint().unwrap();
        session.select_answer("Right").unwrap();
        session.tick(session.epoch());
        session.submit().unwrap();
        session.advance(session.epoch());

        assert_eq!(session.selected_answer(), None);
        assert!(!session.hint_used());
        assert_eq!(session.eliminated_option(), None);
        assert_eq!(session.remaining_secs(), 30);
        assert_eq!(session.review_log().len(), 1);
        assert_eq!(session.snapshot().feedback, None);
    }

    #[test]
    fn finalize_derives_unanswered_and_score() {
        let mut session = session(3, 13);

        session.select_answer("Right").unwrap();
        session.submit().unwrap();
        session.advance(session.epoch());

        session.select_answer("Wrong 2").unwrap();
        session.submit().unwrap();
        session.advance(session.epoch());

        session.submit().unwrap();
        assert_eq!(session.advance(session.epoch()), AdvanceOutcome::ReadyToFinalize);
        assert_eq!(session.phase(), SessionPhase::Finalizing);
        assert!(session.is_exit_guarded());

        let tally = session.finalize(Duration::from_millis(12_900)).unwrap();
        assert_eq!(tally.total_questions, 3);
        assert_eq!((tally.correct, tally.incorrect, tally.unanswered), (1, 1, 1));
        assert_eq!(tally.score, 33);
        assert_eq!(tally.xp, 100);
        assert_eq!(tally.time_taken_secs, 12);
        let statuses: Vec<_> = tally.review_log.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            [ReviewStatus::Correct, ReviewStatus::Incorrect, ReviewStatus::Unanswered]
        );
        assert_eq!(
            tally.review_log.iter().map(|e| e.number).collect::<Vec<_>>(),
            [1, 2, 3]
        );

        assert_eq!(session.phase(), SessionPhase::Completed);
        assert!(!session.is_exit_guarded());
        assert!(session.finalize(Duration::ZERO).is_err());
    }

    #[test]
    fn review_log_tracks_current_index() {
        let mut session = session(4, 14);
        for index in 0..4 {
            assert_eq!(session.review_log().len(), index);
            session.submit().unwrap();
            session.advance(session.epoch());
        }
        assert_eq!(session.review_log().len(), 4);
    }

    #[test]
    fn abandon_is_terminal() {
        let mut session = session(2, 15);
        let epoch = session.epoch();
        assert!(session.abandon());
        assert!(!session.abandon());
        assert_eq!(session.tick(epoch), TickOutcome::Stale);
        assert_eq!(session.submit(), Err(SessionError::NotAccepting));
        assert!(!session.is_exit_guarded());
    }

    #[test]
    fn decoded_strings_are_compared() {
        let record = QuestionRecord::new(
            "Who wrote &quot;Faust&quot;?",
            "Johann Wolfgang von Go&euml;the",
            ["Schiller", "Kafka", "Rilke"],
        );
        let mut session = QuizSession::with_rng(
            config("General", None, vec![record]),
            StdRng::seed_from_u64(16),
        );
        assert_eq!(session.current_question().prompt(), "Who wrote \"Faust\"?");
        session.select_answer("Johann Wolfgang von Goëthe").unwrap();
        assert_eq!(session.submit().unwrap().status, ReviewStatus::Correct);
    }
}
