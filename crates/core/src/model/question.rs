use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::html::decode_entities;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyPrompt,
    #[error("correct answer is empty")]
    EmptyCorrectAnswer,
    #[error("question has no distractor distinct from the correct answer")]
    NoDistractors,
}

//
// ─── RAW RECORD ───────────────────────────────────────────────────────────────
//

/// A question as supplied by the question source, possibly HTML-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    #[serde(alias = "correctAnswer")]
    pub correct_answer: String,
    #[serde(alias = "incorrectAnswers", default)]
    pub incorrect_answers: Vec<String>,
}

impl QuestionRecord {
    #[must_use]
    pub fn new(
        question: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            question: question.into(),
            correct_answer: correct_answer.into(),
            incorrect_answers: incorrect_answers.into_iter().map(Into::into).collect(),
        }
    }

    /// Check that the record can be played as a multiple-choice question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt or correct answer is blank, or when
    /// no distractor survives decoding as distinct from the correct answer.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if decode_entities(&self.question).trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let correct = decode_entities(&self.correct_answer);
        if correct.trim().is_empty() {
            return Err(QuestionError::EmptyCorrectAnswer);
        }
        if distinct_distractors(&correct, &self.incorrect_answers).is_empty() {
            return Err(QuestionError::NoDistractors);
        }
        Ok(())
    }
}

fn distinct_distractors(correct: &str, raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for answer in raw {
        let decoded = decode_entities(answer);
        if decoded == correct || decoded.trim().is_empty() || out.contains(&decoded) {
            continue;
        }
        out.push(decoded);
    }
    out
}

//
// ─── PREPARED QUESTION ────────────────────────────────────────────────────────
//

/// A question loaded for presentation: decoded once, options shuffled once.
///
/// All strings are canonical decoded text, so answer comparison is plain equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuestion {
    prompt: String,
    correct_answer: String,
    options: Vec<String>,
}

impl PreparedQuestion {
    /// Decode a record and shuffle its options uniformly.
    pub fn prepare<R: Rng + ?Sized>(record: &QuestionRecord, rng: &mut R) -> Self {
        let prompt = decode_entities(&record.question);
        let correct_answer = decode_entities(&record.correct_answer);

        let mut options = distinct_distractors(&correct_answer, &record.incorrect_answers);
        options.push(correct_answer.clone());
        options.shuffle(rng);

        Self {
            prompt,
            correct_answer,
            options,
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Options in display order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// Displayed options other than the correct answer.
    pub fn incorrect_options(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .map(String::as_str)
            .filter(|o| *o != self.correct_answer)
    }
}
