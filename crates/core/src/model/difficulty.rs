use serde::{Deserialize, Serialize};
use std::fmt;

/// Question difficulty; decides the per-question countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    #[default]
    Hard,
}

impl Difficulty {
    /// Parse a navigation label. Case and surrounding whitespace are ignored;
    /// anything unrecognised falls back to `Hard`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            _ => Self::Hard,
        }
    }

    /// Like [`Difficulty::from_label`], treating a missing label as `Hard`.
    #[must_use]
    pub fn from_optional_label(label: Option<&str>) -> Self {
        label.map_or(Self::Hard, Self::from_label)
    }

    /// Seconds available for each question.
    #[must_use]
    pub fn time_budget_secs(self) -> u32 {
        match self {
            Self::Easy => 60,
            Self::Medium => 45,
            Self::Hard => 30,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
