use std::sync::Arc;

use quiz_core::daily::{QuizSet, day_seed, generate_daily_quiz};
use quiz_core::model::{QuizSessionConfig, UserId};
use quiz_core::time::Clock;
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::repository::QuizHistoryRepository;

use crate::error::DailyServiceError;

/// Builds today's daily quiz and answers "already played today?".
#[derive(Clone)]
pub struct DailyQuizService {
    history: Arc<dyn QuizHistoryRepository>,
    clock: Clock,
}

impl DailyQuizService {
    #[must_use]
    pub fn new(history: Arc<dyn QuizHistoryRepository>, clock: Clock) -> Self {
        Self { history, clock }
    }

    /// Whether `user_id` already has a daily row for the clock's current day.
    ///
    /// # Errors
    ///
    /// Returns `DailyServiceError::Storage` if the lookup fails.
    pub async fn is_completed_today(&self, user_id: UserId) -> Result<bool, DailyServiceError> {
        let row = self.history.get_daily(user_id, self.clock.today()).await?;
        Ok(row.is_some())
    }

    /// Today's quiz with a per-process random question order.
    ///
    /// # Errors
    ///
    /// Returns `DailyServiceError` if the catalog cannot produce a valid session.
    pub fn prepare_today(&self, catalog: &[QuizSet]) -> Result<QuizSessionConfig, DailyServiceError> {
        let mut rng = StdRng::from_rng(&mut rand::rng());
        self.prepare_with(catalog, &mut rng)
    }

    /// Today's quiz with question order fixed by the day itself.
    ///
    /// # Errors
    ///
    /// Returns `DailyServiceError` if the catalog cannot produce a valid session.
    pub fn prepare_seeded(&self, catalog: &[QuizSet]) -> Result<QuizSessionConfig, DailyServiceError> {
        let mut rng = StdRng::seed_from_u64(day_seed(self.clock.today()));
        self.prepare_with(catalog, &mut rng)
    }

    fn prepare_with(
        &self,
        catalog: &[QuizSet],
        rng: &mut StdRng,
    ) -> Result<QuizSessionConfig, DailyServiceError> {
        let today = self.clock.today();
        let params = generate_daily_quiz(catalog, today, rng)?;
        tracing::info!(
            date = %today,
            quiz_set_id = %params.quiz_set_id,
            questions = params.questions.len(),
            "prepared daily quiz"
        );
        Ok(QuizSessionConfig::new(params)?)
    }
}
