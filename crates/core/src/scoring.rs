//! XP and percentage score math.
//!
//! Everything is integer arithmetic: `floor(r / t * 100)` is computed as `r * 100 / t`
//! so results never drift on floating point representation.

use crate::model::ReviewStatus;

/// XP earned for one question.
///
/// Only correct answers score. The award is the share of the countdown still
/// left at submission, scaled to 100 and floored; a used hint halves it (floored again).
#[must_use]
pub fn xp_for_answer(
    status: ReviewStatus,
    remaining_secs: u32,
    total_secs: u32,
    hint_used: bool,
) -> u32 {
    if status != ReviewStatus::Correct || total_secs == 0 {
        return 0;
    }
    let remaining = u64::from(remaining_secs.min(total_secs));
    let full = remaining * 100 / u64::from(total_secs);
    let xp = if hint_used { full / 2 } else { full };
    u32::try_from(xp).unwrap_or(u32::MAX)
}

/// Percentage of correct answers, rounded half up.
#[must_use]
pub fn score_percent(correct: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = u64::from(correct.min(total));
    let total = u64::from(total);
    let rounded = (correct * 200 + total) / (total * 2);
    u8::try_from(rounded).unwrap_or(100)
}
