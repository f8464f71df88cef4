//! Daily quiz selection.
//!
//! Every player gets questions from the same set on a given calendar day; only the
//! question order (and therefore which ten questions) is randomised per player.

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{DAILY_DIFFICULTY_LABEL, QuestionRecord, SessionParams, daily_title};

/// Questions per daily quiz.
pub const DAILY_QUESTION_COUNT: usize = 10;

/// Prefix of daily quiz set ids (`daily-YYYY-MM-DD`).
pub const DAILY_SET_ID_PREFIX: &str = "daily-";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DailyQuizError {
    #[error("quiz catalog is empty")]
    EmptyCatalog,
    #[error("quiz set {set_id:?} has no questions")]
    EmptySet { set_id: String },
}

/// A named set of questions from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSet {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "results")]
    pub questions: Vec<QuestionRecord>,
}

/// Day seed: sum of the character codes of `YYYY-MM-DD`.
#[must_use]
pub fn day_seed(date: NaiveDate) -> u64 {
    date.format("%Y-%m-%d")
        .to_string()
        .chars()
        .map(|ch| u64::from(u32::from(ch)))
        .sum()
}

/// Build today's daily quiz from the catalog.
///
/// # Errors
///
/// Returns `DailyQuizError::EmptyCatalog` if there are no sets and
/// `DailyQuizError::EmptySet` if the set picked for the day has no questions.
pub fn generate_daily_quiz<R: Rng + ?Sized>(
    catalog: &[QuizSet],
    date: NaiveDate,
    rng: &mut R,
) -> Result<SessionParams, DailyQuizError> {
    if catalog.is_empty() {
        return Err(DailyQuizError::EmptyCatalog);
    }

    let len = u64::try_from(catalog.len()).unwrap_or(u64::MAX);
    let index = usize::try_from(day_seed(date) % len).unwrap_or(0);
    let chosen = &catalog[index];
    if chosen.questions.is_empty() {
        return Err(DailyQuizError::EmptySet {
            set_id: chosen.id.clone(),
        });
    }

    let mut questions = chosen.questions.clone();
    questions.shuffle(rng);
    questions.truncate(DAILY_QUESTION_COUNT);

    Ok(SessionParams {
        quiz_set_id: format!("{DAILY_SET_ID_PREFIX}{}", date.format("%Y-%m-%d")),
        quiz_title: daily_title(date),
        difficulty: Some(DAILY_DIFFICULTY_LABEL.to_owned()),
        questions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn set(id: &str, n: usize) -> QuizSet {
        QuizSet {
            id: id.into(),
            title: id.into(),
            questions: (0..n)
                .map(|i| QuestionRecord::new(format!("{id}-{i}"), "A", ["B", "C", "D"]))
                .collect(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn seed_sums_character_codes() {
        // "2024-05-01": digits 2,0,2,4,0,5,0,1 and two dashes
        let expected: u64 = "2024-05-01".bytes().map(u64::from).sum();
        assert_eq!(day_seed(date()), expected);
    }

    #[test]
    fn same_day_picks_same_set() {
        let catalog = vec![set("a", 12), set("b", 12), set("c", 12)];
        let expected = &catalog[(day_seed(date()) % 3) as usize].id;

        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let params = generate_daily_quiz(&catalog, date(), &mut rng).unwrap();
            assert!(params.questions.iter().all(|q| q.question.starts_with(expected.as_str())));
            assert_eq!(params.questions.len(), DAILY_QUESTION_COUNT);
        }
    }

    #[test]
    fn builds_daily_navigation_params() {
        let mut rng = StdRng::seed_from_u64(1);
        let params = generate_daily_quiz(&[set("only", 3)], date(), &mut rng).unwrap();
        assert_eq!(params.quiz_title, "Daily Quiz - 2024-05-01");
        assert_eq!(params.quiz_set_id, "daily-2024-05-01");
        assert_eq!(params.difficulty.as_deref(), Some("random"));
        assert_eq!(params.questions.len(), 3);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            generate_daily_quiz(&[], date(), &mut rng),
            Err(DailyQuizError::EmptyCatalog)
        );
        assert!(matches!(
            generate_daily_quiz(&[set("none", 0)], date(), &mut rng),
            Err(DailyQuizError::EmptySet { .. })
        ));
    }
}
