use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of an authenticated player.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new `UserId`
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a fresh random id (used for local, unauthenticated profiles).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID
    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Numeric category identifier embedded in quiz set ids (`cat<digits>_...`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(u32);

impl CategoryId {
    /// Category id used for mixed (daily) quizzes.
    pub const MIXED: CategoryId = CategoryId(0);

    /// Creates a new `CategoryId`
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Opaque identifier of a question set as handed over by navigation.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizSetId(String);

impl QuizSetId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the category from the first `cat<digits>_` occurrence.
    ///
    /// Returns `None` when no such occurrence exists or the digits overflow.
    #[must_use]
    pub fn category_id(&self) -> Option<CategoryId> {
        let raw = self.0.as_str();
        for (start, _) in raw.match_indices("cat") {
            let after = &raw[start + 3..];
            let digits_len = after.bytes().take_while(u8::is_ascii_digit).count();
            if digits_len == 0 || after.as_bytes().get(digits_len) != Some(&b'_') {
                continue;
            }
            return after[..digits_len].parse::<u32>().ok().map(CategoryId::new);
        }
        None
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({})", self.0)
    }
}

impl fmt::Debug for QuizSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuizSetId({:?})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for QuizSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_from_set_id() {
        let id = QuizSetId::new("cat9_easy_3");
        assert_eq!(id.category_id(), Some(CategoryId::new(9)));
    }

    #[test]
    fn uses_first_matching_occurrence() {
        let id = QuizSetId::new("catalog_cat21_medium_cat5_x");
        assert_eq!(id.category_id(), Some(CategoryId::new(21)));
    }

    #[test]
    fn rejects_set_ids_without_category_pattern() {
        assert_eq!(QuizSetId::new("daily-2024-01-01").category_id(), None);
        assert_eq!(QuizSetId::new("cat_12").category_id(), None);
        assert_eq!(QuizSetId::new("cat12").category_id(), None);
        assert_eq!(QuizSetId::new("cat99999999999_x").category_id(), None);
    }

    #[test]
    fn user_id_round_trips_through_strings() {
        let id = UserId::generate();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }
}
