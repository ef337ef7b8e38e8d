//! In-memory repository.
//!
//! Used for unit tests, local development and as the working set behind
//! [`JsonFileRepository`](super::JsonFileRepository). All records live behind
//! a single `parking_lot::RwLock`, so every check-then-write below (slot
//! exclusivity, email and magic code uniqueness) is atomic.
//!
//! Startup writes are optimistic: the record handed back must carry the
//! `updated_at` of the stored version it was derived from, otherwise the
//! write is refused with `ConflictError`. Bookings can only be completed or
//! cancelled while the stored copy is still `Scheduled`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::db::models::{SessionFilter, SmcFilter, StartupFilter};
use crate::db::repository::{
    ErrorContext, RepositoryError, RepositoryResult, ScheduleRepository, SettingsRepository,
    StartupRepository,
};
use crate::lifecycle::magic_code;
use crate::models::{
    BookingStatus, OneOnOneSession, SessionId, Setting, SmcSchedule, SmcScheduleId, Startup,
    StartupId,
};

/// Serializable image of the whole store, including id counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSnapshot {
    pub startups: Vec<Startup>,
    pub smc_schedules: Vec<SmcSchedule>,
    pub one_on_one_sessions: Vec<OneOnOneSession>,
    pub settings: Vec<Setting>,
    /// Registrations ever accepted; drives magic code numbering.
    pub registrations: u64,
    pub next_startup_id: i64,
    pub next_smc_schedule_id: i64,
    pub next_session_id: i64,
}

#[derive(Debug)]
struct LocalData {
    startups: BTreeMap<StartupId, Startup>,
    smc_schedules: BTreeMap<SmcScheduleId, SmcSchedule>,
    sessions: BTreeMap<SessionId, OneOnOneSession>,
    settings: BTreeMap<String, Setting>,
    registrations: u64,
    next_startup_id: i64,
    next_smc_schedule_id: i64,
    next_session_id: i64,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            startups: BTreeMap::new(),
            smc_schedules: BTreeMap::new(),
            sessions: BTreeMap::new(),
            settings: BTreeMap::new(),
            registrations: 0,
            next_startup_id: 1,
            next_smc_schedule_id: 1,
            next_session_id: 1,
        }
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require_id<T: Copy>(id: Option<T>, operation: &str, entity: &str) -> RepositoryResult<T> {
    id.ok_or_else(|| {
        RepositoryError::validation_with_context(
            format!("{} has no id", entity),
            ErrorContext::new(operation).with_entity(entity),
        )
    })
}

fn reject_id<T: ToString>(id: &Option<T>, operation: &str, entity: &str) -> RepositoryResult<()> {
    match id {
        Some(id) => Err(RepositoryError::validation_with_context(
            format!("New {} must not carry an id", entity),
            ErrorContext::new(operation).with_entity(entity).with_entity_id(id.to_string()),
        )),
        None => Ok(()),
    }
}

/// Revision stamp for a rewrite of a record last stamped `previous`.
/// Strictly increasing even when the clock has not moved.
fn next_revision(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(previous) if now <= previous => previous + Duration::microseconds(1),
        _ => now,
    }
}

fn stale_record(operation: &str, entity: &str, id: impl ToString) -> RepositoryError {
    let id = id.to_string();
    RepositoryError::conflict_with_context(
        format!("{} {} was modified concurrently, reload and retry", entity, id),
        ErrorContext::new(operation)
            .with_entity(entity)
            .with_entity_id(id)
            .with_details("stale"),
    )
}

fn ensure_scheduled(
    status: BookingStatus,
    operation: &str,
    entity: &str,
    id: impl ToString,
) -> RepositoryResult<()> {
    if status == BookingStatus::Scheduled {
        return Ok(());
    }
    let id = id.to_string();
    Err(RepositoryError::conflict_with_context(
        format!("{} {} is already {}", entity, id, status),
        ErrorContext::new(operation)
            .with_entity(entity)
            .with_entity_id(id)
            .with_details("status"),
    ))
}

impl LocalData {
    fn startup(&self, id: StartupId, operation: &str) -> RepositoryResult<&Startup> {
        self.startups.get(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Startup {} not found", id),
                ErrorContext::new(operation).with_entity("startup").with_entity_id(id),
            )
        })
    }

    fn smc_schedule(&self, id: SmcScheduleId, operation: &str) -> RepositoryResult<&SmcSchedule> {
        self.smc_schedules.get(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("SMC schedule {} not found", id),
                ErrorContext::new(operation).with_entity("smc_schedule").with_entity_id(id),
            )
        })
    }

    fn session(&self, id: SessionId, operation: &str) -> RepositoryResult<&OneOnOneSession> {
        self.sessions.get(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("One-on-One session {} not found", id),
                ErrorContext::new(operation).with_entity("one_on_one_session").with_entity_id(id),
            )
        })
    }

    fn ensure_email_free(
        &self,
        email: &str,
        owner: Option<StartupId>,
        operation: &str,
    ) -> RepositoryResult<()> {
        let key = email_key(email);
        let taken = self
            .startups
            .values()
            .any(|s| s.id != owner && email_key(&s.profile.email) == key);
        if taken {
            return Err(RepositoryError::conflict_with_context(
                format!("Startup with email {} already exists", email.trim()),
                ErrorContext::new(operation).with_entity("startup").with_details("email"),
            ));
        }
        Ok(())
    }

    fn ensure_slot_free(&self, schedule: &SmcSchedule, operation: &str) -> RepositoryResult<()> {
        if schedule.status != BookingStatus::Scheduled {
            return Ok(());
        }
        let taken = self
            .smc_schedules
            .values()
            .any(|s| s.id != schedule.id && s.occupies(schedule.date, schedule.time_slot));
        if taken {
            return Err(RepositoryError::conflict_with_context(
                format!(
                    "SMC slot {} on {} is already booked",
                    schedule.time_slot, schedule.date
                ),
                ErrorContext::new(operation).with_entity("smc_schedule").with_details("slot"),
            ));
        }
        Ok(())
    }

    fn store_startup(&mut self, startup: &Startup, operation: &str) -> RepositoryResult<Startup> {
        let id = require_id(startup.id, operation, "startup")?;
        let current = self.startup(id, operation)?.updated_at;
        if current != startup.updated_at {
            return Err(stale_record(operation, "Startup", id));
        }
        let mut stored = startup.clone();
        stored.updated_at = Some(next_revision(current));
        self.startups.insert(id, stored.clone());
        Ok(stored)
    }

    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            startups: self.startups.values().cloned().collect(),
            smc_schedules: self.smc_schedules.values().cloned().collect(),
            one_on_one_sessions: self.sessions.values().cloned().collect(),
            settings: self.settings.values().cloned().collect(),
            registrations: self.registrations,
            next_startup_id: self.next_startup_id,
            next_smc_schedule_id: self.next_smc_schedule_id,
            next_session_id: self.next_session_id,
        }
    }

    fn from_snapshot(snapshot: StoreSnapshot) -> RepositoryResult<Self> {
        let operation = "load_snapshot";
        let mut data = LocalData::default();

        for startup in snapshot.startups {
            let id = require_id(startup.id, operation, "startup")?;
            if data.startups.insert(id, startup).is_some() {
                return Err(duplicate_id(operation, "startup", id));
            }
        }
        for schedule in snapshot.smc_schedules {
            let id = require_id(schedule.id, operation, "smc_schedule")?;
            if data.smc_schedules.insert(id, schedule).is_some() {
                return Err(duplicate_id(operation, "smc_schedule", id));
            }
        }
        for session in snapshot.one_on_one_sessions {
            let id = require_id(session.id, operation, "one_on_one_session")?;
            if data.sessions.insert(id, session).is_some() {
                return Err(duplicate_id(operation, "one_on_one_session", id));
            }
        }
        for setting in snapshot.settings {
            data.settings.insert(setting.key.clone(), setting);
        }

        let next = |stored: i64, max_id: Option<i64>| stored.max(max_id.map_or(1, |id| id + 1)).max(1);
        data.next_startup_id = next(
            snapshot.next_startup_id,
            data.startups.keys().next_back().map(|id| id.value()),
        );
        data.next_smc_schedule_id = next(
            snapshot.next_smc_schedule_id,
            data.smc_schedules.keys().next_back().map(|id| id.value()),
        );
        data.next_session_id = next(
            snapshot.next_session_id,
            data.sessions.keys().next_back().map(|id| id.value()),
        );
        data.registrations = snapshot.registrations.max(data.startups.len() as u64);
        Ok(data)
    }
}

fn duplicate_id(operation: &str, entity: &str, id: impl ToString) -> RepositoryError {
    RepositoryError::validation_with_context(
        format!("Duplicate {} id", entity),
        ErrorContext::new(operation).with_entity(entity).with_entity_id(id),
    )
}

fn mismatched_startup(operation: &str, entity: &str) -> RepositoryError {
    RepositoryError::validation_with_context(
        "Booking and startup do not match",
        ErrorContext::new(operation).with_entity(entity),
    )
}

/// In-memory repository implementation.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    healthy: Arc<AtomicBool>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Rebuild a repository from a snapshot. Id counters resume past the
    /// highest stored id.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> RepositoryResult<Self> {
        let data = LocalData::from_snapshot(snapshot)?;
        Ok(Self {
            data: Arc::new(RwLock::new(data)),
            healthy: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Copy of the complete store contents.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.data.read().snapshot()
    }

    /// Swap the whole store for `snapshot`.
    pub(crate) fn restore(&self, snapshot: StoreSnapshot) -> RepositoryResult<()> {
        let data = LocalData::from_snapshot(snapshot)?;
        *self.data.write() = data;
        Ok(())
    }

    /// Simulate an outage: while unhealthy every operation fails with a
    /// connection error and `health_check` reports `false`.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Remove every record and reset the counters.
    pub fn clear(&self) {
        *self.data.write() = LocalData::default();
    }

    pub fn startup_count(&self) -> usize {
        self.data.read().startups.len()
    }

    pub fn smc_schedule_count(&self) -> usize {
        self.data.read().smc_schedules.len()
    }

    pub fn session_count(&self) -> usize {
        self.data.read().sessions.len()
    }

    fn ensure_healthy(&self, operation: &str) -> RepositoryResult<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "Local repository is unhealthy",
                ErrorContext::new(operation),
            ))
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StartupRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.healthy.load(Ordering::SeqCst))
    }

    fn storage_kind(&self) -> &'static str {
        "local"
    }

    async fn insert_startup(&self, startup: Startup) -> RepositoryResult<Startup> {
        let operation = "insert_startup";
        self.ensure_healthy(operation)?;
        reject_id(&startup.id, operation, "startup")?;

        let mut data = self.data.write();
        data.ensure_email_free(&startup.profile.email, None, operation)?;

        // Codes come from the registration counter; skip any held by a
        // record that predates the counter.
        let mut sequence = data.registrations;
        while data
            .startups
            .values()
            .any(|s| s.magic_code == magic_code(sequence))
        {
            sequence += 1;
        }

        let id = StartupId::new(data.next_startup_id);
        data.next_startup_id += 1;
        data.registrations = sequence + 1;

        let mut stored = startup;
        stored.id = Some(id);
        stored.magic_code = magic_code(sequence);
        data.startups.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_startup(&self, id: StartupId) -> RepositoryResult<Startup> {
        self.ensure_healthy("get_startup")?;
        self.data.read().startup(id, "get_startup").cloned()
    }

    async fn list_startups(&self, filter: &StartupFilter) -> RepositoryResult<Vec<Startup>> {
        self.ensure_healthy("list_startups")?;
        Ok(self
            .data
            .read()
            .startups
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn update_startup(&self, startup: &Startup) -> RepositoryResult<Startup> {
        let operation = "update_startup";
        self.ensure_healthy(operation)?;
        let mut data = self.data.write();
        data.ensure_email_free(&startup.profile.email, startup.id, operation)?;
        data.store_startup(startup, operation)
    }

    async fn delete_startup(&self, id: StartupId) -> RepositoryResult<()> {
        let operation = "delete_startup";
        self.ensure_healthy(operation)?;
        let mut data = self.data.write();
        data.startup(id, operation)?;
        data.startups.remove(&id);
        data.smc_schedules.retain(|_, s| s.startup_id != id);
        data.sessions.retain(|_, s| s.startup_id != id);
        Ok(())
    }

    async fn find_startup_by_email(&self, email: &str) -> RepositoryResult<Option<Startup>> {
        self.ensure_healthy("find_startup_by_email")?;
        let key = email_key(email);
        Ok(self
            .data
            .read()
            .startups
            .values()
            .find(|s| email_key(&s.profile.email) == key)
            .cloned())
    }

    async fn registration_count(&self) -> RepositoryResult<u64> {
        self.ensure_healthy("registration_count")?;
        Ok(self.data.read().registrations)
    }
}

#[async_trait]
impl ScheduleRepository for LocalRepository {
    async fn insert_smc_schedule(&self, schedule: SmcSchedule) -> RepositoryResult<SmcSchedule> {
        let operation = "insert_smc_schedule";
        self.ensure_healthy(operation)?;
        reject_id(&schedule.id, operation, "smc_schedule")?;

        let mut data = self.data.write();
        data.startup(schedule.startup_id, operation)?;
        data.ensure_slot_free(&schedule, operation)?;

        let id = SmcScheduleId::new(data.next_smc_schedule_id);
        data.next_smc_schedule_id += 1;

        let mut stored = schedule;
        stored.id = Some(id);
        data.smc_schedules.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_smc_schedule(&self, id: SmcScheduleId) -> RepositoryResult<SmcSchedule> {
        self.ensure_healthy("get_smc_schedule")?;
        self.data.read().smc_schedule(id, "get_smc_schedule").cloned()
    }

    async fn list_smc_schedules(&self, filter: &SmcFilter) -> RepositoryResult<Vec<SmcSchedule>> {
        self.ensure_healthy("list_smc_schedules")?;
        Ok(self
            .data
            .read()
            .smc_schedules
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn update_smc_schedule(&self, schedule: &SmcSchedule) -> RepositoryResult<SmcSchedule> {
        let operation = "update_smc_schedule";
        self.ensure_healthy(operation)?;
        let id = require_id(schedule.id, operation, "smc_schedule")?;

        let mut data = self.data.write();
        let current = data.smc_schedule(id, operation)?;
        ensure_scheduled(current.status, operation, "SMC schedule", id)?;
        data.ensure_slot_free(schedule, operation)?;
        data.smc_schedules.insert(id, schedule.clone());
        Ok(schedule.clone())
    }

    async fn commit_smc_completion(
        &self,
        schedule: &SmcSchedule,
        startup: &Startup,
    ) -> RepositoryResult<(SmcSchedule, Startup)> {
        let operation = "commit_smc_completion";
        self.ensure_healthy(operation)?;
        let id = require_id(schedule.id, operation, "smc_schedule")?;

        let mut data = self.data.write();
        let current = data.smc_schedule(id, operation)?;
        ensure_scheduled(current.status, operation, "SMC schedule", id)?;
        if startup.id != Some(current.startup_id) {
            return Err(mismatched_startup(operation, "smc_schedule"));
        }
        let stored_startup = data.store_startup(startup, operation)?;
        data.smc_schedules.insert(id, schedule.clone());
        Ok((schedule.clone(), stored_startup))
    }

    async fn delete_smc_schedule(&self, id: SmcScheduleId) -> RepositoryResult<()> {
        let operation = "delete_smc_schedule";
        self.ensure_healthy(operation)?;
        let mut data = self.data.write();
        data.smc_schedule(id, operation)?;
        data.smc_schedules.remove(&id);
        Ok(())
    }

    async fn insert_one_on_one(
        &self,
        session: OneOnOneSession,
        startup: &Startup,
    ) -> RepositoryResult<(OneOnOneSession, Startup)> {
        let operation = "insert_one_on_one";
        self.ensure_healthy(operation)?;
        reject_id(&session.id, operation, "one_on_one_session")?;
        if startup.id != Some(session.startup_id) {
            return Err(mismatched_startup(operation, "one_on_one_session"));
        }

        let mut data = self.data.write();
        let stored_startup = data.store_startup(startup, operation)?;

        let id = SessionId::new(data.next_session_id);
        data.next_session_id += 1;

        let mut stored = session;
        stored.id = Some(id);
        data.sessions.insert(id, stored.clone());
        Ok((stored, stored_startup))
    }

    async fn get_session(&self, id: SessionId) -> RepositoryResult<OneOnOneSession> {
        self.ensure_healthy("get_session")?;
        self.data.read().session(id, "get_session").cloned()
    }

    async fn list_sessions(&self, filter: &SessionFilter) -> RepositoryResult<Vec<OneOnOneSession>> {
        self.ensure_healthy("list_sessions")?;
        Ok(self
            .data
            .read()
            .sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn commit_session_completion(
        &self,
        session: &OneOnOneSession,
        startup: &Startup,
    ) -> RepositoryResult<(OneOnOneSession, Startup)> {
        let operation = "commit_session_completion";
        self.ensure_healthy(operation)?;
        let id = require_id(session.id, operation, "one_on_one_session")?;

        let mut data = self.data.write();
        let current = data.session(id, operation)?;
        ensure_scheduled(current.status, operation, "One-on-One session", id)?;
        if startup.id != Some(current.startup_id) {
            return Err(mismatched_startup(operation, "one_on_one_session"));
        }
        let stored_startup = data.store_startup(startup, operation)?;
        data.sessions.insert(id, session.clone());
        Ok((session.clone(), stored_startup))
    }

    async fn delete_session(&self, id: SessionId) -> RepositoryResult<()> {
        let operation = "delete_session";
        self.ensure_healthy(operation)?;
        let mut data = self.data.write();
        data.session(id, operation)?;
        data.sessions.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for LocalRepository {
    async fn list_settings(&self) -> RepositoryResult<Vec<Setting>> {
        self.ensure_healthy("list_settings")?;
        Ok(self.data.read().settings.values().cloned().collect())
    }

    async fn get_setting(&self, key: &str) -> RepositoryResult<Setting> {
        self.ensure_healthy("get_setting")?;
        self.data.read().settings.get(key).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Setting {} not found", key),
                ErrorContext::new("get_setting").with_entity("setting").with_entity_id(key),
            )
        })
    }

    async fn put_setting(&self, setting: Setting) -> RepositoryResult<Setting> {
        let operation = "put_setting";
        self.ensure_healthy(operation)?;
        if setting.key.trim().is_empty() {
            return Err(RepositoryError::validation_with_context(
                "Setting key must not be empty",
                ErrorContext::new(operation).with_entity("setting"),
            ));
        }
        let mut stored = setting;
        stored.updated_at = Some(Utc::now());
        self.data.write().settings.insert(stored.key.clone(), stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StartupProfile, TimeSlot};
    use chrono::NaiveDate;

    fn new_startup(email: &str, magic_code: &str) -> Startup {
        let profile = StartupProfile {
            company_name: "Acme".to_string(),
            email: email.to_string(),
            mobile: "123".to_string(),
            founder_name: "J".to_string(),
            city: "Pune".to_string(),
            sector: "Tech".to_string(),
            ..Default::default()
        };
        let mut startup = crate::lifecycle::register(profile, None, 0, false, Utc::now()).unwrap();
        startup.magic_code = magic_code.to_string();
        startup
    }

    fn smc(startup_id: StartupId, date: NaiveDate, slot: TimeSlot) -> SmcSchedule {
        SmcSchedule {
            id: None,
            startup_id,
            date,
            time_slot: slot,
            status: BookingStatus::Scheduled,
            panelist_name: String::new(),
            feedback: String::new(),
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_counts_registrations() {
        let repo = LocalRepository::new();
        let a = repo.insert_startup(new_startup("a@x.com", "MAGIC001")).await.unwrap();
        let b = repo.insert_startup(new_startup("b@x.com", "MAGIC002")).await.unwrap();

        assert_eq!(a.id, Some(StartupId::new(1)));
        assert_eq!(b.id, Some(StartupId::new(2)));
        assert_eq!(repo.registration_count().await.unwrap(), 2);

        repo.delete_startup(StartupId::new(1)).await.unwrap();
        assert_eq!(repo.registration_count().await.unwrap(), 2);
        assert_eq!(repo.startup_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = LocalRepository::new();
        repo.insert_startup(new_startup("a@x.com", "MAGIC001")).await.unwrap();

        let err = repo
            .insert_startup(new_startup(" A@X.com ", "MAGIC002"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ConflictError { .. }));
        assert_eq!(repo.registration_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_assigns_magic_codes_from_counter() {
        let repo = LocalRepository::new();
        // Both callers saw the same registration count.
        let a = repo.insert_startup(new_startup("a@x.com", "MAGIC001")).await.unwrap();
        let b = repo.insert_startup(new_startup("b@x.com", "MAGIC001")).await.unwrap();

        assert_eq!(a.magic_code, "MAGIC001");
        assert_eq!(b.magic_code, "MAGIC002");
    }

    #[tokio::test]
    async fn test_magic_code_skips_codes_held_by_legacy_records() {
        let mut legacy = new_startup("old@x.com", "MAGIC002");
        legacy.id = Some(StartupId::new(7));
        let repo = LocalRepository::from_snapshot(StoreSnapshot {
            startups: vec![legacy],
            registrations: 0,
            ..Default::default()
        })
        .unwrap();

        let fresh = repo.insert_startup(new_startup("new@x.com", "MAGIC001")).await.unwrap();
        assert_eq!(fresh.magic_code, "MAGIC003");
        assert_eq!(repo.registration_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_stale_startup_write_is_refused() {
        let repo = LocalRepository::new();
        let loaded = repo.insert_startup(new_startup("a@x.com", "MAGIC001")).await.unwrap();

        let mut onboarded = loaded.clone();
        onboarded.status = crate::models::StartupStatus::Onboarded;
        let stored = repo.update_startup(&onboarded).await.unwrap();
        assert!(stored.updated_at > loaded.updated_at);

        let mut advanced = loaded.clone();
        advanced.stage = crate::models::Stage::S1;
        let err = repo.update_startup(&advanced).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConflictError { .. }));
        assert_eq!(err.context().details.as_deref(), Some("stale"));

        let current = repo.get_startup(loaded.id.unwrap()).await.unwrap();
        assert_eq!(current.status, crate::models::StartupStatus::Onboarded);
        assert_eq!(current.stage, crate::models::Stage::S0);
    }

    #[tokio::test]
    async fn test_completed_booking_cannot_be_rewritten() {
        let repo = LocalRepository::new();
        let startup = repo.insert_startup(new_startup("a@x.com", "MAGIC001")).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 12, 6).unwrap();
        let booked = repo
            .insert_smc_schedule(smc(startup.id.unwrap(), date, TimeSlot::TenAm))
            .await
            .unwrap();

        let mut completed = booked.clone();
        completed.status = BookingStatus::Completed;
        let (_, after) = repo.commit_smc_completion(&completed, &startup).await.unwrap();

        let err = repo.commit_smc_completion(&completed, &after).await.unwrap_err();
        assert_eq!(err.context().details.as_deref(), Some("status"));

        let mut cancelled = booked;
        cancelled.status = BookingStatus::Cancelled;
        assert!(repo.update_smc_schedule(&cancelled).await.is_err());
        assert_eq!(
            repo.get_smc_schedule(completed.id.unwrap()).await.unwrap().status,
            BookingStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_slot_is_exclusive_until_cancelled() {
        let repo = LocalRepository::new();
        let a = repo.insert_startup(new_startup("a@x.com", "MAGIC001")).await.unwrap();
        let id = a.id.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 12, 6).unwrap();

        let first = repo.insert_smc_schedule(smc(id, date, TimeSlot::TenAm)).await.unwrap();
        let err = repo
            .insert_smc_schedule(smc(id, date, TimeSlot::TenAm))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ConflictError { .. }));

        let mut cancelled = first.clone();
        cancelled.status = BookingStatus::Cancelled;
        repo.update_smc_schedule(&cancelled).await.unwrap();
        assert!(repo.insert_smc_schedule(smc(id, date, TimeSlot::TenAm)).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_startup_cascades_bookings() {
        let repo = LocalRepository::new();
        let a = repo.insert_startup(new_startup("a@x.com", "MAGIC001")).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 12, 6).unwrap();
        repo.insert_smc_schedule(smc(a.id.unwrap(), date, TimeSlot::TwoPm))
            .await
            .unwrap();

        repo.delete_startup(a.id.unwrap()).await.unwrap();
        assert_eq!(repo.smc_schedule_count(), 0);
        assert!(matches!(
            repo.get_startup(a.id.unwrap()).await.unwrap_err(),
            RepositoryError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_unhealthy_repository_rejects_operations() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.list_startups(&StartupFilter::default()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
        repo.set_healthy(true);
        assert!(repo.list_startups(&StartupFilter::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip_keeps_counters() {
        let repo = LocalRepository::new();
        repo.insert_startup(new_startup("a@x.com", "MAGIC001")).await.unwrap();
        repo.insert_startup(new_startup("b@x.com", "MAGIC002")).await.unwrap();
        repo.delete_startup(StartupId::new(2)).await.unwrap();

        let restored = LocalRepository::from_snapshot(repo.snapshot()).unwrap();
        assert_eq!(restored.registration_count().await.unwrap(), 2);
        let c = restored
            .insert_startup(new_startup("c@x.com", "MAGIC003"))
            .await
            .unwrap();
        assert_eq!(c.id, Some(StartupId::new(3)));
    }

    #[test]
    fn test_snapshot_rejects_records_without_ids() {
        let snapshot = StoreSnapshot {
            startups: vec![new_startup("a@x.com", "MAGIC001")],
            ..Default::default()
        };
        assert!(LocalRepository::from_snapshot(snapshot).is_err());
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let repo = LocalRepository::new();
        repo.put_setting(Setting::new("smcPanel", serde_json::json!(["Dr. X", "Dr. Y"])))
            .await
            .unwrap();
        let setting = repo.get_setting("smcPanel").await.unwrap();
        assert_eq!(setting.value[1], "Dr. Y");
        assert!(setting.updated_at.is_some());
        assert!(repo.get_setting("missing").await.is_err());
    }
}
