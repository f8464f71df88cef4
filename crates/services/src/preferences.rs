use std::sync::Arc;

use async_trait::async_trait;
use storage::repository::{SettingsRepository, StorageError, settings_keys};

use crate::error::FeedbackError;
use crate::feedback::FeedbackPreferences;
use crate::ports::PreferenceReader;

/// Feedback preferences kept in the local settings table.
///
/// A flag that was never written counts as enabled.
#[derive(Clone)]
pub struct StoredPreferences {
    settings: Arc<dyn SettingsRepository>,
}

impl StoredPreferences {
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsRepository>) -> Self {
        Self { settings }
    }

    async fn flag(&self, key: &str) -> Result<bool, StorageError> {
        let value = self.settings.get_value(key).await?;
        Ok(value.is_none_or(|v| v == "true"))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the setting cannot be written.
    pub async fn set_sound_enabled(&self, enabled: bool) -> Result<(), StorageError> {
        self.settings
            .set_value(settings_keys::SOUND_ENABLED, bool_str(enabled))
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the setting cannot be written.
    pub async fn set_haptics_enabled(&self, enabled: bool) -> Result<(), StorageError> {
        self.settings
            .set_value(settings_keys::HAPTICS_ENABLED, bool_str(enabled))
            .await
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[async_trait]
impl PreferenceReader for StoredPreferences {
    async fn feedback_preferences(&self) -> Result<FeedbackPreferences, FeedbackError> {
        Ok(FeedbackPreferences {
            sound: self.flag(settings_keys::SOUND_ENABLED).await?,
            haptics: self.flag(settings_keys::HAPTICS_ENABLED).await?,
        })
    }
}
