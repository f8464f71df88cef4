use quiz_core::model::ReviewEntry;
use quiz_core::scoring::score_percent;
use serde::{Deserialize, Serialize};

use super::service::FinalTally;

/// Summary handed to the result screen once a session completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub total_questions: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
    /// Milliseconds.
    pub time_taken: u64,
    pub xp_earned: u32,
    pub review_data: Vec<ReviewEntry>,
    pub category_title: String,
}

impl QuizResult {
    #[must_use]
    pub fn from_tally(tally: &FinalTally, quiz_title: &str) -> Self {
        Self {
            total_questions: tally.total_questions,
            correct: tally.correct,
            incorrect: tally.incorrect,
            unanswered: tally.unanswered,
            time_taken: tally.time_taken_secs.saturating_mul(1000),
            xp_earned: tally.xp,
            review_data: tally.review_log.clone(),
            category_title: quiz_title.to_owned(),
        }
    }

    #[must_use]
    pub fn score_percent(&self) -> u8 {
        score_percent(self.correct, self.total_questions)
    }

    /// Elapsed time as `"<minutes> m <seconds> s"`.
    #[must_use]
    pub fn time_taken_display(&self) -> String {
        let minutes = self.time_taken / 60_000;
        let seconds = (self.time_taken % 60_000) / 1000;
        format!("{minutes} m {seconds} s")
    }

    /// Text for sharing the result outside the app.
    #[must_use]
    pub fn share_message(&self) -> String {
        format!(
            "I just completed a quiz!\n\nScore: {}%\nTime Taken: {}\nXP Earned: {}\n\nCan you beat my score?",
            self.score_percent(),
            self.time_taken_display(),
            self.xp_earned
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(correct: u32, total: u32, time_taken: u64) -> QuizResult {
        QuizResult {
            total_questions: total,
            correct,
            incorrect: total - correct,
            unanswered: 0,
            time_taken,
            xp_earned: 140,
            review_data: Vec::new(),
            category_title: "#1 Science".into(),
        }
    }

    #[test]
    fn time_is_formatted_in_minutes_and_seconds() {
        assert_eq!(result(1, 1, 0).time_taken_display(), "0 m 0 s");
        assert_eq!(result(1, 1, 125_000).time_taken_display(), "2 m 5 s");
    }

    #[test]
    fn share_message_mentions_score_time_and_xp() {
        let message = result(2, 3, 61_000).share_message();
        assert!(message.contains("Score: 67%"));
        assert!(message.contains("Time Taken: 1 m 1 s"));
        assert!(message.contains("XP Earned: 140"));
    }

    #[test]
    fn serialises_with_camel_case_keys() {
        let json = serde_json::to_value(result(1, 2, 3000)).unwrap();
        assert_eq!(json["totalQuestions"], 2);
        assert_eq!(json["timeTaken"], 3000);
        assert_eq!(json["xpEarned"], 140);
        assert_eq!(json["categoryTitle"], "#1 Science");
    }

    #[test]
    fn tally_seconds_become_milliseconds() {
        let tally = FinalTally {
            total_questions: 2,
            correct: 1,
            incorrect: 0,
            unanswered: 1,
            score: 50,
            xp: 80,
            time_taken_secs: 42,
            review_log: Vec::new(),
        };
        let result = QuizResult::from_tally(&tally, "Daily Quiz - 2024-01-01");
        assert_eq!(result.time_taken, 42_000);
        assert_eq!(result.unanswered, 1);
        assert_eq!(result.category_title, "Daily Quiz - 2024-01-01");
    }
}
