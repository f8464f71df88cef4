use async_trait::async_trait;
use quiz_core::model::UserId;
use storage::repository::{SettingsRepository, StorageError, settings_keys};

use crate::ports::CurrentUserProvider;

/// A fixed user for the lifetime of the process (or nobody).
#[derive(Debug, Clone, Copy)]
pub struct StaticUser(Option<UserId>);

impl StaticUser {
    #[must_use]
    pub fn signed_in(user_id: UserId) -> Self {
        Self(Some(user_id))
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }
}

#[async_trait]
impl CurrentUserProvider for StaticUser {
    async fn current_user_id(&self) -> Option<UserId> {
        self.0
    }
}

/// Id of the local player, generated and stored on first use.
///
/// A stored value that no longer parses is replaced.
///
/// # Errors
///
/// Returns `StorageError` if the settings table cannot be read or written.
pub async fn local_user_id(settings: &dyn SettingsRepository) -> Result<UserId, StorageError> {
    if let Some(raw) = settings.get_value(settings_keys::LOCAL_USER_ID).await? {
        match raw.parse::<UserId>() {
            Ok(id) => return Ok(id),
            Err(err) => tracing::warn!(error = %err, "stored local user id is invalid; regenerating"),
        }
    }

    let id = UserId::generate();
    settings
        .set_value(settings_keys::LOCAL_USER_ID, &id.to_string())
        .await?;
    tracing::info!(user_id = %id, "created local user id");
    Ok(id)
}
