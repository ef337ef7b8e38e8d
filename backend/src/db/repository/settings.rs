use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::Setting;

/// Repository trait for key/value dashboard settings.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// All settings, ordered by key.
    async fn list_settings(&self) -> RepositoryResult<Vec<Setting>>;

    /// A single setting. Unknown keys are `NotFound`.
    async fn get_setting(&self, key: &str) -> RepositoryResult<Setting>;

    /// Create or replace a setting. `updated_at` is refreshed by the store.
    async fn put_setting(&self, setting: Setting) -> RepositoryResult<Setting>;
}
