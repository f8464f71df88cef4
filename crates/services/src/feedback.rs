use crate::ports::{FeedbackDevice, PreferenceReader};

/// Which feedback variant to play after an answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCue {
    Success,
    Failure,
}

/// Enabled feedback channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackPreferences {
    pub sound: bool,
    pub haptics: bool,
}

impl Default for FeedbackPreferences {
    fn default() -> Self {
        Self {
            sound: true,
            haptics: true,
        }
    }
}

/// Play the cue on every enabled channel.
///
/// Each failure is logged and dropped; one failing channel does not stop the other.
pub async fn play_feedback(
    preferences: &dyn PreferenceReader,
    device: &dyn FeedbackDevice,
    cue: FeedbackCue,
) {
    let prefs = match preferences.feedback_preferences().await {
        Ok(prefs) => prefs,
        Err(err) => {
            tracing::warn!(error = %err, "could not read feedback preferences");
            return;
        }
    };

    if prefs.sound {
        if let Err(err) = device.play_sound(cue).await {
            tracing::warn!(error = %err, ?cue, "sound feedback failed");
        }
    }
    if prefs.haptics {
        if let Err(err) = device.vibrate(cue).await {
            tracing::warn!(error = %err, ?cue, "haptic feedback failed");
        }
    }
}
