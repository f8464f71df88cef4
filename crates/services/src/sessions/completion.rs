use quiz_core::model::{QuizHistoryRecord, QuizSessionConfig, SessionKind, UserId};

use super::result::QuizResult;
use super::runtime::SessionDeps;
use super::service::FinalTally;

/// Runs the side effects of a finished session: persistence, reminder bookkeeping
/// for daily quizzes, then the hand-off to the presenter.
///
/// Each side effect is isolated; a failure is logged and the next one still runs.
/// The presenter is always called exactly once.
pub struct CompletionDispatcher<'a> {
    deps: &'a SessionDeps,
}

impl<'a> CompletionDispatcher<'a> {
    #[must_use]
    pub fn new(deps: &'a SessionDeps) -> Self {
        Self { deps }
    }

    pub async fn dispatch(&self, config: &QuizSessionConfig, tally: &FinalTally) -> QuizResult {
        let user_id = self.deps.user.current_user_id().await;
        if user_id.is_none() {
            tracing::error!(
                quiz_set_id = %config.quiz_set_id(),
                "no signed-in user; quiz result is not persisted"
            );
        }

        match config.kind() {
            SessionKind::Daily => self.finish_daily(user_id, tally).await,
            SessionKind::Normal {
                category_id,
                category_title,
            } => {
                if let Some(user_id) = user_id {
                    let record = QuizHistoryRecord {
                        user_id,
                        category_id: *category_id,
                        category_title: category_title.clone(),
                        quiz_title: config.quiz_title().to_owned(),
                        difficulty: config.difficulty(),
                        score: tally.score,
                        xp: tally.xp,
                        time_taken_seconds: tally.time_taken_secs,
                        review_data: tally.review_log.clone(),
                        quiz_set_id: config.quiz_set_id().clone(),
                        completed_at: self.deps.clock.now(),
                    };
                    if let Err(err) = self.deps.sink.record_attempt(&record).await {
                        tracing::error!(error = %err, quiz_set_id = %record.quiz_set_id, "failed to save quiz attempt");
                    }
                }
            }
        }

        let result = QuizResult::from_tally(tally, config.quiz_title());
        self.deps.presenter.present(result.clone()).await;
        result
    }

    async fn finish_daily(&self, user_id: Option<UserId>, tally: &FinalTally) {
        if let Some(user_id) = user_id {
            if let Err(err) = self
                .deps
                .sink
                .record_daily(
                    user_id,
                    tally.score,
                    tally.xp,
                    &tally.review_log,
                    tally.time_taken_secs,
                )
                .await
            {
                tracing::error!(error = %err, "failed to save daily quiz result");
            }
        }

        // Reminder bookkeeping is device-local and does not depend on the write above.
        if let Err(err) = self.deps.notifications.cancel_all().await {
            tracing::warn!(error = %err, "failed to cancel daily reminders");
        }
        let today = self.deps.clock.today();
        if let Err(err) = self.deps.notifications.record_completion_date(today).await {
            tracing::warn!(error = %err, date = %today, "failed to store daily completion date");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FeedbackError, NotificationError, SinkError};
    use crate::feedback::{FeedbackCue, FeedbackPreferences};
    use crate::ports::{
        CurrentUserProvider, FeedbackDevice, NotificationCanceler, PreferenceReader,
        ResultPresenter, ResultSink,
    };
    use crate::user::StaticUser;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use quiz_core::model::{CategoryId, Difficulty, QuestionRecord, ReviewEntry, SessionParams};
    use quiz_core::time::fixed_clock;
    use std::sync::{Arc, Mutex};
    use storage::repository::StorageError;

    #[derive(Default)]
    struct Recorder {
        fail_writes: bool,
        fail_cancel: bool,
        attempts: Mutex<Vec<QuizHistoryRecord>>,
        dailies: Mutex<Vec<(UserId, u8, u32, usize, u64)>>,
        cancels: Mutex<u32>,
        dates: Mutex<Vec<NaiveDate>>,
        presented: Mutex<Vec<QuizResult>>,
    }

    #[async_trait]
    impl ResultSink for Recorder {
        async fn record_attempt(&self, record: &QuizHistoryRecord) -> Result<(), SinkError> {
            self.attempts.lock().unwrap().push(record.clone());
            if self.fail_writes {
                return Err(StorageError::Connection("offline".into()).into());
            }
            Ok(())
        }

        async fn record_daily(
            &self,
            user_id: UserId,
            score: u8,
            xp: u32,
            review_data: &[ReviewEntry],
            time_taken_seconds: u64,
        ) -> Result<(), SinkError> {
            self.dailies.lock().unwrap().push((
                user_id,
                score,
                xp,
                review_data.len(),
                time_taken_seconds,
            ));
            if self.fail_writes {
                return Err(StorageError::Connection("offline".into()).into());
            }
            Ok(())
        }
    }

    #[async_trait]
    impl NotificationCanceler for Recorder {
        async fn cancel_all(&self) -> Result<(), NotificationError> {
            *self.cancels.lock().unwrap() += 1;
            if self.fail_cancel {
                return Err(NotificationError::Platform("denied".into()));
            }
            Ok(())
        }

        async fn record_completion_date(&self, date: NaiveDate) -> Result<(), NotificationError> {
            self.dates.lock().unwrap().push(date);
            Ok(())
        }
    }

    #[async_trait]
    impl ResultPresenter for Recorder {
        async fn present(&self, result: QuizResult) {
            self.presented.lock().unwrap().push(result);
        }
    }

    #[async_trait]
    impl PreferenceReader for Recorder {
        async fn feedback_preferences(&self) -> Result<FeedbackPreferences, FeedbackError> {
            Ok(FeedbackPreferences::default())
        }
    }

    #[async_trait]
    impl FeedbackDevice for Recorder {
        async fn play_sound(&self, _cue: FeedbackCue) -> Result<(), FeedbackError> {
            Ok(())
        }

        async fn vibrate(&self, _cue: FeedbackCue) -> Result<(), FeedbackError> {
            Ok(())
        }
    }

    fn deps(recorder: &Arc<Recorder>, user: Arc<dyn CurrentUserProvider>) -> SessionDeps {
        SessionDeps {
            clock: fixed_clock(),
            user,
            preferences: recorder.clone(),
            feedback: recorder.clone(),
            sink: recorder.clone(),
            notifications: recorder.clone(),
            presenter: recorder.clone(),
        }
    }

    fn config(set_id: &str, title: &str) -> QuizSessionConfig {
        QuizSessionConfig::new(SessionParams {
            quiz_set_id: set_id.into(),
            quiz_title: title.into(),
            difficulty: Some("medium".into()),
            questions: vec![QuestionRecord::new("Q", "A", ["B", "C", "D"])],
        })
        .unwrap()
    }

    fn tally() -> FinalTally {
        FinalTally {
            total_questions: 4,
            correct: 3,
            incorrect: 1,
            unanswered: 0,
            score: 75,
            xp: 210,
            time_taken_secs: 95,
            review_log: Vec::new(),
        }
    }

    #[tokio::test]
    async fn normal_session_writes_history_record_only() {
        let recorder = Arc::new(Recorder::default());
        let user = UserId::generate();
        let deps = deps(&recorder, Arc::new(StaticUser::signed_in(user)));

        let result = CompletionDispatcher::new(&deps)
            .dispatch(&config("cat17_medium_4", "#4 Science: Computers"), &tally())
            .await;

        let attempts = recorder.attempts.lock().unwrap();
        assert_eq!(attempts.len(), 1);
        let record = &attempts[0];
        assert_eq!(record.user_id, user);
        assert_eq!(record.category_id, CategoryId::new(17));
        assert_eq!(record.category_title, "Science: Computers");
        assert_eq!(record.quiz_title, "#4 Science: Computers");
        assert_eq!(record.difficulty, Difficulty::Medium);
        assert_eq!((record.score, record.xp, record.time_taken_seconds), (75, 210, 95));
        assert_eq!(record.quiz_set_id.as_str(), "cat17_medium_4");

        assert!(recorder.dailies.lock().unwrap().is_empty());
        assert_eq!(*recorder.cancels.lock().unwrap(), 0);
        assert!(recorder.dates.lock().unwrap().is_empty());
        assert_eq!(*recorder.presented.lock().unwrap(), vec![result]);
    }

    #[tokio::test]
    async fn daily_session_upserts_and_cancels_reminders() {
        let recorder = Arc::new(Recorder::default());
        let user = UserId::generate();
        let deps = deps(&recorder, Arc::new(StaticUser::signed_in(user)));

        CompletionDispatcher::new(&deps)
            .dispatch(&config("daily-2023-11-14", "Daily Quiz - 2023-11-14"), &tally())
            .await;

        assert_eq!(*recorder.dailies.lock().unwrap(), vec![(user, 75, 210, 0, 95)]);
        assert!(recorder.attempts.lock().unwrap().is_empty());
        assert_eq!(*recorder.cancels.lock().unwrap(), 1);
        assert_eq!(*recorder.dates.lock().unwrap(), vec![fixed_clock().today()]);
        assert_eq!(recorder.presented.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failures_do_not_block_presentation() {
        let recorder = Arc::new(Recorder {
            fail_writes: true,
            fail_cancel: true,
            ..Recorder::default()
        });
        let deps = deps(&recorder, Arc::new(StaticUser::signed_in(UserId::generate())));

        CompletionDispatcher::new(&deps)
            .dispatch(&config("daily-2023-11-14", "Daily Quiz - 2023-11-14"), &tally())
            .await;

        // The completion date is still stored after the failed write and failed cancel.
        assert_eq!(recorder.dates.lock().unwrap().len(), 1);
        let presented = recorder.presented.lock().unwrap();
        assert_eq!(presented.len(), 1);
        assert_eq!(presented[0].time_taken, 95_000);
    }

    #[tokio::test]
    async fn missing_user_skips_persistence_but_presents() {
        let recorder = Arc::new(Recorder::default());
        let deps = deps(&recorder, Arc::new(StaticUser::anonymous()));

        CompletionDispatcher::new(&deps)
            .dispatch(&config("cat9_easy_1", "General"), &tally())
            .await;

        assert!(recorder.attempts.lock().unwrap().is_empty());
        assert_eq!(recorder.presented.lock().unwrap().len(), 1);
    }
}
