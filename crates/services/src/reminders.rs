use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use storage::repository::{SettingsRepository, settings_keys};

use crate::error::NotificationError;
use crate::ports::NotificationCanceler;

/// Reminder bookkeeping kept in local settings.
///
/// Cancelling clears the pending-reminder flag; the completion date is stored as
/// `YYYY-MM-DD` so the scheduler can skip today's reminder.
#[derive(Clone)]
pub struct StoredReminderCanceler {
    settings: Arc<dyn SettingsRepository>,
}

impl StoredReminderCanceler {
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsRepository>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl NotificationCanceler for StoredReminderCanceler {
    async fn cancel_all(&self) -> Result<(), NotificationError> {
        self.settings
            .set_value(settings_keys::DAILY_REMINDER_PENDING, "false")
            .await?;
        tracing::debug!("daily reminders cancelled");
        Ok(())
    }

    async fn record_completion_date(&self, date: NaiveDate) -> Result<(), NotificationError> {
        let iso = date.format("%Y-%m-%d").to_string();
        self.settings
            .set_value(settings_keys::LAST_DAILY_QUIZ_DATE, &iso)
            .await?;
        Ok(())
    }
}
