//! JSON-document repository.
//!
//! Keeps the working set in a [`LocalRepository`] and rewrites a single JSON
//! document after every successful mutation. Writes are serialized by an
//! async mutex and go to a temporary file first, which is then renamed over
//! the data file. If persisting fails the in-memory state is rolled back, so
//! memory never runs ahead of disk.

use async_trait::async_trait;
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::local::{LocalRepository, StoreSnapshot};
use crate::db::config::JsonFileConfig;
use crate::db::models::{SessionFilter, SmcFilter, StartupFilter};
use crate::db::repository::{
    ErrorContext, RepositoryError, RepositoryResult, ScheduleRepository, SettingsRepository,
    StartupRepository,
};
use crate::models::{
    OneOnOneSession, SessionId, Setting, SmcSchedule, SmcScheduleId, Startup, StartupId,
};

/// File-backed repository storing the whole dataset in one JSON document.
pub struct JsonFileRepository {
    inner: LocalRepository,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRepository {
    /// Open the data file, or start empty when it does not exist yet.
    pub async fn open(config: &JsonFileConfig) -> RepositoryResult<Self> {
        let path = config.path.clone();
        let inner = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)
                    .map_err(|e| RepositoryError::from(e).with_operation("open_data_file"))?;
                let repo = LocalRepository::from_snapshot(snapshot)?;
                info!(
                    "Loaded {} startups from {}",
                    repo.startup_count(),
                    path.display()
                );
                repo
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Data file {} not found, starting empty", path.display());
                LocalRepository::new()
            }
            Err(e) => return Err(RepositoryError::from(e).with_operation("open_data_file")),
        };

        Ok(Self {
            inner,
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forward to the in-memory store's outage switch.
    pub fn set_healthy(&self, healthy: bool) {
        self.inner.set_healthy(healthy);
    }

    async fn persist(&self, snapshot: &StoreSnapshot) -> RepositoryResult<()> {
        let context = || ErrorContext::new("persist").with_details(self.path.display().to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RepositoryError::storage_with_context(e.to_string(), context().retryable())
            })?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(|e| {
            RepositoryError::storage_with_context(e.to_string(), context().retryable())
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            RepositoryError::storage_with_context(e.to_string(), context().retryable())
        })?;

        debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    /// Persist a successful mutation, or undo it when the write fails.
    ///
    /// Must be called with `write_lock` held; `before` is the state captured
    /// under that lock prior to the mutation.
    async fn commit<T>(&self, before: StoreSnapshot, result: RepositoryResult<T>) -> RepositoryResult<T> {
        let value = result?;
        if let Err(e) = self.persist(&self.inner.snapshot()).await {
            error!("Failed to persist {}: {}", self.path.display(), e);
            self.inner.restore(before)?;
            return Err(e);
        }
        Ok(value)
    }
}

#[async_trait]
impl StartupRepository for JsonFileRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.inner.health_check().await
    }

    fn storage_kind(&self) -> &'static str {
        "json"
    }

    async fn insert_startup(&self, startup: Startup) -> RepositoryResult<Startup> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot();
        let result = self.inner.insert_startup(startup).await;
        self.commit(before, result).await
    }

    async fn get_startup(&self, id: StartupId) -> RepositoryResult<Startup> {
        self.inner.get_startup(id).await
    }

    async fn list_startups(&self, filter: &StartupFilter) -> RepositoryResult<Vec<Startup>> {
        self.inner.list_startups(filter).await
    }

    async fn update_startup(&self, startup: &Startup) -> RepositoryResult<Startup> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot();
        let result = self.inner.update_startup(startup).await;
        self.commit(before, result).await
    }

    async fn delete_startup(&self, id: StartupId) -> RepositoryResult<()> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot();
        let result = self.inner.delete_startup(id).await;
        self.commit(before, result).await
    }

    async fn find_startup_by_email(&self, email: &str) -> RepositoryResult<Option<Startup>> {
        self.inner.find_startup_by_email(email).await
    }

    async fn registration_count(&self) -> RepositoryResult<u64> {
        self.inner.registration_count().await
    }
}

#[async_trait]
impl ScheduleRepository for JsonFileRepository {
    async fn insert_smc_schedule(&self, schedule: SmcSchedule) -> RepositoryResult<SmcSchedule> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot();
        let result = self.inner.insert_smc_schedule(schedule).await;
        self.commit(before, result).await
    }

    async fn get_smc_schedule(&self, id: SmcScheduleId) -> RepositoryResult<SmcSchedule> {
        self.inner.get_smc_schedule(id).await
    }

    async fn list_smc_schedules(&self, filter: &SmcFilter) -> RepositoryResult<Vec<SmcSchedule>> {
        self.inner.list_smc_schedules(filter).await
    }

    async fn update_smc_schedule(&self, schedule: &SmcSchedule) -> RepositoryResult<SmcSchedule> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot();
        let result = self.inner.update_smc_schedule(schedule).await;
        self.commit(before, result).await
    }

    async fn commit_smc_completion(
        &self,
        schedule: &SmcSchedule,
        startup: &Startup,
    ) -> RepositoryResult<(SmcSchedule, Startup)> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot();
        let result = self.inner.commit_smc_completion(schedule, startup).await;
        self.commit(before, result).await
    }

    async fn delete_smc_schedule(&self, id: SmcScheduleId) -> RepositoryResult<()> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot();
        let result = self.inner.delete_smc_schedule(id).await;
        self.commit(before, result).await
    }

    async fn insert_one_on_one(
        &self,
        session: OneOnOneSession,
        startup: &Startup,
    ) -> RepositoryResult<(OneOnOneSession, Startup)> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot();
        let result = self.inner.insert_one_on_one(session, startup).await;
        self.commit(before, result).await
    }

    async fn get_session(&self, id: SessionId) -> RepositoryResult<OneOnOneSession> {
        self.inner.get_session(id).await
    }

    async fn list_sessions(&self, filter: &SessionFilter) -> RepositoryResult<Vec<OneOnOneSession>> {
        self.inner.list_sessions(filter).await
    }

    async fn commit_session_completion(
        &self,
        session: &OneOnOneSession,
        startup: &Startup,
    ) -> RepositoryResult<(OneOnOneSession, Startup)> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot();
        let result = self.inner.commit_session_completion(session, startup).await;
        self.commit(before, result).await
    }

    async fn delete_session(&self, id: SessionId) -> RepositoryResult<()> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot();
        let result = self.inner.delete_session(id).await;
        self.commit(before, result).await
    }
}

#[async_trait]
impl SettingsRepository for JsonFileRepository {
    async fn list_settings(&self) -> RepositoryResult<Vec<Setting>> {
        self.inner.list_settings().await
    }

    async fn get_setting(&self, key: &str) -> RepositoryResult<Setting> {
        self.inner.get_setting(key).await
    }

    async fn put_setting(&self, setting: Setting) -> RepositoryResult<Setting> {
        let _guard = self.write_lock.lock().await;
        let before = self.inner.snapshot();
        let result = self.inner.put_setting(setting).await;
        self.commit(before, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StartupProfile;
    use chrono::Utc;

    fn new_startup(email: &str, sequence: u64) -> Startup {
        let profile = StartupProfile {
            company_name: "Acme".to_string(),
            email: email.to_string(),
            mobile: "123".to_string(),
            founder_name: "J".to_string(),
            city: "Pune".to_string(),
            sector: "Tech".to_string(),
            ..Default::default()
        };
        crate::lifecycle::register(profile, None, sequence, false, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = JsonFileConfig::new(dir.path().join("nested").join("db.json"));
        let repo = JsonFileRepository::open(&config).await.unwrap();

        assert_eq!(repo.registration_count().await.unwrap(), 0);
        assert!(!config.path.exists());
    }

    #[tokio::test]
    async fn test_mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = JsonFileConfig::new(dir.path().join("data").join("incubator.json"));

        {
            let repo = JsonFileRepository::open(&config).await.unwrap();
            repo.insert_startup(new_startup("a@x.com", 0)).await.unwrap();
            repo.insert_startup(new_startup("b@x.com", 1)).await.unwrap();
            repo.put_setting(Setting::new("theme", serde_json::json!("dark")))
                .await
                .unwrap();
        }

        let reopened = JsonFileRepository::open(&config).await.unwrap();
        let startups = reopened.list_startups(&StartupFilter::default()).await.unwrap();
        assert_eq!(startups.len(), 2);
        assert_eq!(startups[1].magic_code, "MAGIC002");
        assert_eq!(reopened.registration_count().await.unwrap(), 2);
        assert_eq!(reopened.get_setting("theme").await.unwrap().value, "dark");
        assert!(!config.path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_mutation_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = JsonFileConfig::new(dir.path().join("incubator.json"));
        let repo = JsonFileRepository::open(&config).await.unwrap();

        repo.insert_startup(new_startup("a@x.com", 0)).await.unwrap();
        let written = std::fs::read_to_string(&config.path).unwrap();

        assert!(repo.insert_startup(new_startup("a@x.com", 1)).await.is_err());
        assert_eq!(std::fs::read_to_string(&config.path).unwrap(), written);
    }

    #[tokio::test]
    async fn test_failed_persist_rolls_back_memory() {
        let dir = tempfile::tempdir().unwrap();
        let config = JsonFileConfig::new(dir.path().join("incubator.json"));
        let repo = JsonFileRepository::open(&config).await.unwrap();
        repo.insert_startup(new_startup("a@x.com", 0)).await.unwrap();
        let written = std::fs::read_to_string(&config.path).unwrap();

        // A directory squatting on the temp file path makes the write fail.
        let tmp = config.path.with_extension("json.tmp");
        std::fs::create_dir(&tmp).unwrap();

        let err = repo.insert_startup(new_startup("b@x.com", 1)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::StorageError { .. }));
        assert!(err.is_retryable());
        assert_eq!(repo.registration_count().await.unwrap(), 1);
        assert_eq!(repo.list_startups(&StartupFilter::default()).await.unwrap().len(), 1);
        assert!(repo.find_startup_by_email("b@x.com").await.unwrap().is_none());
        assert_eq!(std::fs::read_to_string(&config.path).unwrap(), written);

        std::fs::remove_dir(&tmp).unwrap();
        let retried = repo.insert_startup(new_startup("b@x.com", 1)).await.unwrap();
        assert_eq!(retried.magic_code, "MAGIC002");
        assert_eq!(retried.id, Some(StartupId::new(2)));
    }

    #[tokio::test]
    async fn test_malformed_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("incubator.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileRepository::open(&JsonFileConfig::new(path))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RepositoryError::StorageError { .. }));
    }
}
