//! Service layer: repository-agnostic orchestration.
//!
//! Each function loads the records it needs, applies one lifecycle
//! operation and stores the result. All business rules live in
//! [`crate::lifecycle`]; this module only translates store outcomes into
//! lifecycle errors (unknown ids become `NotFound`, a store-detected slot
//! clash becomes `SlotConflict`, a write against a record changed since it
//! was loaded becomes `Conflict`) and sorts listings for presentation.

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::cmp::Reverse;

use super::models::{SessionFilter, SmcFilter, StartupFilter};
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::lifecycle::{self, DaysSinceActivity, InactivityReport, LifecycleError, LifecycleResult};
use crate::models::{
    Achievement, BookingStatus, OneOnOneSession, RevenueEntry, SessionId, Setting, SmcSchedule,
    SmcScheduleId, Stage, Startup, StartupId, StartupProfile, StartupStatus, TimeSlot,
};

/// Errors surfaced by service functions.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A business rule rejected the request.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// The store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

fn not_found_as(entity: &'static str, id: impl ToString, err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound { .. } => LifecycleError::not_found(entity, id).into(),
        other => other.into(),
    }
}

fn conflict_as_lifecycle(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::ConflictError { message, .. } => LifecycleError::Conflict(message).into(),
        other => other.into(),
    }
}

async fn load_startup<R: FullRepository + ?Sized>(
    repo: &R,
    id: StartupId,
) -> ServiceResult<Startup> {
    repo.get_startup(id)
        .await
        .map_err(|e| not_found_as("Startup", id, e))
}

async fn load_smc_schedule<R: FullRepository + ?Sized>(
    repo: &R,
    id: SmcScheduleId,
) -> ServiceResult<SmcSchedule> {
    repo.get_smc_schedule(id)
        .await
        .map_err(|e| not_found_as("SMC schedule", id, e))
}

async fn load_session<R: FullRepository + ?Sized>(
    repo: &R,
    id: SessionId,
) -> ServiceResult<OneOnOneSession> {
    repo.get_session(id)
        .await
        .map_err(|e| not_found_as("One-on-One session", id, e))
}

async fn store_startup<R: FullRepository + ?Sized>(
    repo: &R,
    startup: &Startup,
) -> ServiceResult<Startup> {
    repo.update_startup(startup).await.map_err(conflict_as_lifecycle)
}

/// Achievements and revenue of graduated startups are read-only.
fn ensure_editable(startup: &Startup, operation: &'static str) -> LifecycleResult<()> {
    if startup.status == StartupStatus::Graduated {
        return Err(LifecycleError::invalid_status(operation, startup.status));
    }
    Ok(())
}

// =============================================================================
// Health
// =============================================================================

/// Check store connectivity.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// =============================================================================
// Startups
// =============================================================================

/// Register a new startup and assign its magic code.
pub async fn register_startup<R: FullRepository + ?Sized>(
    repo: &R,
    profile: StartupProfile,
    registered_date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> ServiceResult<Startup> {
    let email_taken = repo.find_startup_by_email(&profile.email).await?.is_some();
    // Provisional; the store assigns the final code atomically.
    let sequence = repo.registration_count().await?;
    let startup = lifecycle::register(profile, registered_date, sequence, email_taken, now)?;

    let stored = repo
        .insert_startup(startup)
        .await
        .map_err(conflict_as_lifecycle)?;
    info!(
        "Registered startup '{}' as {}",
        stored.profile.company_name, stored.magic_code
    );
    Ok(stored)
}

pub async fn get_startup<R: FullRepository + ?Sized>(
    repo: &R,
    id: StartupId,
) -> ServiceResult<Startup> {
    load_startup(repo, id).await
}

/// List startups matching `filter`, newest first.
pub async fn list_startups<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &StartupFilter,
) -> ServiceResult<Vec<Startup>> {
    let mut startups = repo.list_startups(filter).await?;
    startups.sort_by_key(|s| Reverse((s.created_at, s.id)));
    debug!("Listed {} startups", startups.len());
    Ok(startups)
}

/// Replace the profile fields of a startup. Lifecycle fields are untouched.
pub async fn update_profile<R: FullRepository + ?Sized>(
    repo: &R,
    id: StartupId,
    mut profile: StartupProfile,
) -> ServiceResult<Startup> {
    lifecycle::validate_profile(&profile)?;
    profile.email = profile.email.trim().to_string();

    let mut startup = load_startup(repo, id).await?;
    if let Some(other) = repo.find_startup_by_email(&profile.email).await? {
        if other.id != Some(id) {
            return Err(LifecycleError::Conflict(format!(
                "Startup with email {} already exists",
                profile.email
            ))
            .into());
        }
    }

    startup.profile = profile;
    let stored = store_startup(repo, &startup).await?;
    info!("Updated profile of {}", stored.magic_code);
    Ok(stored)
}

pub async fn delete_startup<R: FullRepository + ?Sized>(
    repo: &R,
    id: StartupId,
) -> ServiceResult<()> {
    repo.delete_startup(id)
        .await
        .map_err(|e| not_found_as("Startup", id, e))?;
    info!("Deleted startup {}", id);
    Ok(())
}

pub async fn onboard_startup<R: FullRepository + ?Sized>(
    repo: &R,
    id: StartupId,
    now: DateTime<Utc>,
) -> ServiceResult<Startup> {
    let startup = load_startup(repo, id).await?;
    let updated = lifecycle::onboard(&startup, now)?;
    let stored = store_startup(repo, &updated).await?;
    info!("Onboarded {} at stage {}", stored.magic_code, stored.stage);
    Ok(stored)
}

pub async fn reject_startup<R: FullRepository + ?Sized>(
    repo: &R,
    id: StartupId,
    remark: &str,
    now: DateTime<Utc>,
) -> ServiceResult<Startup> {
    let startup = load_startup(repo, id).await?;
    let updated = lifecycle::reject(&startup, remark, now)?;
    let stored = store_startup(repo, &updated).await?;
    info!("Rejected {} from stage {}", stored.magic_code, stored.stage);
    Ok(stored)
}

pub async fn graduate_startup<R: FullRepository + ?Sized>(
    repo: &R,
    id: StartupId,
    now: DateTime<Utc>,
) -> ServiceResult<Startup> {
    let startup = load_startup(repo, id).await?;
    let updated = lifecycle::graduate(&startup, now)?;
    let stored = store_startup(repo, &updated).await?;
    info!("Graduated {}", stored.magic_code);
    Ok(stored)
}

// =============================================================================
// Achievements & Revenue
// =============================================================================

pub async fn add_achievement<R: FullRepository + ?Sized>(
    repo: &R,
    startup_id: StartupId,
    achievement: Achievement,
) -> ServiceResult<Startup> {
    let startup = load_startup(repo, startup_id).await?;
    ensure_editable(&startup, "add an achievement to")?;
    let updated = lifecycle::add_achievement(&startup, achievement)?;
    store_startup(repo, &updated).await
}

pub async fn remove_achievement<R: FullRepository + ?Sized>(
    repo: &R,
    startup_id: StartupId,
    achievement_id: &str,
) -> ServiceResult<Startup> {
    let startup = load_startup(repo, startup_id).await?;
    ensure_editable(&startup, "remove an achievement from")?;
    let updated = lifecycle::remove_achievement(&startup, achievement_id)?;
    store_startup(repo, &updated).await
}

pub async fn add_revenue<R: FullRepository + ?Sized>(
    repo: &R,
    startup_id: StartupId,
    entry: RevenueEntry,
) -> ServiceResult<Startup> {
    let startup = load_startup(repo, startup_id).await?;
    let updated = lifecycle::add_revenue(&startup, entry)?;
    let stored = store_startup(repo, &updated).await?;
    debug!(
        "Revenue of {} now totals {}",
        stored.magic_code, stored.total_revenue
    );
    Ok(stored)
}

// =============================================================================
// SMC Scheduling
// =============================================================================

/// Book an SMC slot. The store re-checks the slot atomically, so of two
/// concurrent bookings for the same slot exactly one succeeds.
pub async fn schedule_smc<R: FullRepository + ?Sized>(
    repo: &R,
    startup_id: StartupId,
    date: NaiveDate,
    time_slot: TimeSlot,
    now: DateTime<Utc>,
) -> ServiceResult<SmcSchedule> {
    let startup = load_startup(repo, startup_id).await?;
    let booked = repo
        .list_smc_schedules(&SmcFilter {
            date: Some(date),
            status: Some(BookingStatus::Scheduled),
            startup_id: None,
        })
        .await?;
    let schedule = lifecycle::schedule_smc(&startup, date, time_slot, &booked, now)?;

    let stored = repo.insert_smc_schedule(schedule).await.map_err(|err| match err {
        RepositoryError::ConflictError { .. } => {
            warn!("SMC slot {} on {} was taken concurrently", time_slot, date);
            LifecycleError::SlotConflict {
                date,
                slot: time_slot,
            }
            .into()
        }
        other => not_found_as("Startup", startup_id, other),
    })?;
    info!(
        "Scheduled SMC for {} on {} at {}",
        startup.magic_code, date, time_slot
    );
    Ok(stored)
}

pub async fn complete_smc<R: FullRepository + ?Sized>(
    repo: &R,
    schedule_id: SmcScheduleId,
    panelist_name: &str,
    feedback: &str,
    now: DateTime<Utc>,
) -> ServiceResult<(SmcSchedule, Startup)> {
    let schedule = load_smc_schedule(repo, schedule_id).await?;
    let startup = load_startup(repo, schedule.startup_id).await?;
    let (completed, updated) =
        lifecycle::complete_smc(&schedule, &startup, panelist_name, feedback, now)?;

    let (completed, stored) = repo
        .commit_smc_completion(&completed, &updated)
        .await
        .map_err(conflict_as_lifecycle)?;
    info!(
        "Completed SMC {} for {}: {} -> {}",
        schedule_id, stored.magic_code, startup.stage, stored.stage
    );
    Ok((completed, stored))
}

pub async fn cancel_smc<R: FullRepository + ?Sized>(
    repo: &R,
    schedule_id: SmcScheduleId,
) -> ServiceResult<SmcSchedule> {
    let schedule = load_smc_schedule(repo, schedule_id).await?;
    let cancelled = lifecycle::cancel_smc(&schedule)?;
    let stored = repo
        .update_smc_schedule(&cancelled)
        .await
        .map_err(conflict_as_lifecycle)?;
    info!("Cancelled SMC {}", schedule_id);
    Ok(stored)
}

pub async fn delete_smc<R: FullRepository + ?Sized>(
    repo: &R,
    schedule_id: SmcScheduleId,
) -> ServiceResult<()> {
    repo.delete_smc_schedule(schedule_id)
        .await
        .map_err(|e| not_found_as("SMC schedule", schedule_id, e))
}

/// SMC bookings matching `filter`, by date then slot order.
pub async fn list_smc<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &SmcFilter,
) -> ServiceResult<Vec<SmcSchedule>> {
    let mut schedules = repo.list_smc_schedules(filter).await?;
    schedules.sort_by_key(|s| (s.date, s.time_slot, s.id));
    Ok(schedules)
}

// =============================================================================
// One-on-One Sessions
// =============================================================================

pub async fn schedule_one_on_one<R: FullRepository + ?Sized>(
    repo: &R,
    startup_id: StartupId,
    date: NaiveDate,
    time: &str,
    mentor_name: &str,
    now: DateTime<Utc>,
) -> ServiceResult<(OneOnOneSession, Startup)> {
    let startup = load_startup(repo, startup_id).await?;
    let (session, updated) =
        lifecycle::schedule_one_on_one(&startup, date, time, mentor_name, now)?;

    let (session, stored) = repo
        .insert_one_on_one(session, &updated)
        .await
        .map_err(conflict_as_lifecycle)?;
    info!(
        "Scheduled One-on-One for {} with {} on {}",
        stored.magic_code, session.mentor_name, date
    );
    Ok((session, stored))
}

pub async fn complete_one_on_one<R: FullRepository + ?Sized>(
    repo: &R,
    session_id: SessionId,
    mentor_name: &str,
    feedback: &str,
    progress: &str,
    now: DateTime<Utc>,
) -> ServiceResult<(OneOnOneSession, Startup)> {
    let session = load_session(repo, session_id).await?;
    let startup = load_startup(repo, session.startup_id).await?;
    let (completed, updated) =
        lifecycle::complete_one_on_one(&session, &startup, mentor_name, feedback, progress, now)?;

    let result = repo
        .commit_session_completion(&completed, &updated)
        .await
        .map_err(conflict_as_lifecycle)?;
    info!("Completed One-on-One {}", session_id);
    Ok(result)
}

pub async fn delete_one_on_one<R: FullRepository + ?Sized>(
    repo: &R,
    session_id: SessionId,
) -> ServiceResult<()> {
    repo.delete_session(session_id)
        .await
        .map_err(|e| not_found_as("One-on-One session", session_id, e))
}

/// Sessions matching `filter`, by date then time.
pub async fn list_one_on_one<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &SessionFilter,
) -> ServiceResult<Vec<OneOnOneSession>> {
    let mut sessions = repo.list_sessions(filter).await?;
    sessions.sort_by(|a, b| (a.date, &a.time, a.id).cmp(&(b.date, &b.time, b.id)));
    Ok(sessions)
}

// =============================================================================
// Inactivity
// =============================================================================

/// An inactive startup together with its activity report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InactiveStartup {
    pub id: StartupId,
    pub magic_code: String,
    pub company_name: String,
    pub founder_name: String,
    pub email: String,
    pub stage: Stage,
    #[serde(flatten)]
    pub activity: InactivityReport,
}

/// Inactivity report for one startup; `None` when it is not in the pipeline.
pub async fn startup_inactivity<R: FullRepository + ?Sized>(
    repo: &R,
    id: StartupId,
    as_of: DateTime<Utc>,
) -> ServiceResult<Option<InactivityReport>> {
    let startup = load_startup(repo, id).await?;
    let schedules = repo.list_smc_schedules(&SmcFilter::for_startup(id)).await?;
    let sessions = repo.list_sessions(&SessionFilter::for_startup(id)).await?;
    Ok(lifecycle::compute_inactivity(
        &startup, &schedules, &sessions, as_of,
    ))
}

/// Every active startup idle past the threshold, longest idle first.
pub async fn inactive_startups<R: FullRepository + ?Sized>(
    repo: &R,
    stage: Option<Stage>,
    as_of: DateTime<Utc>,
) -> ServiceResult<Vec<InactiveStartup>> {
    let startups = repo
        .list_startups(&StartupFilter {
            stage,
            status: Some(StartupStatus::Active),
            search: None,
        })
        .await?;
    let schedules = repo
        .list_smc_schedules(&SmcFilter {
            status: Some(BookingStatus::Completed),
            ..Default::default()
        })
        .await?;
    let sessions = repo
        .list_sessions(&SessionFilter {
            status: Some(BookingStatus::Completed),
            ..Default::default()
        })
        .await?;

    let mut inactive: Vec<InactiveStartup> = startups
        .into_iter()
        .filter_map(|startup| {
            let report = lifecycle::compute_inactivity(&startup, &schedules, &sessions, as_of)?;
            if !report.is_inactive {
                return None;
            }
            Some(InactiveStartup {
                id: startup.id?,
                magic_code: startup.magic_code,
                company_name: startup.profile.company_name,
                founder_name: startup.profile.founder_name,
                email: startup.profile.email,
                stage: startup.stage,
                activity: report,
            })
        })
        .collect();

    inactive.sort_by_key(|entry| {
        Reverse(match entry.activity.days_since_activity {
            DaysSinceActivity::Days(days) => days,
            DaysSinceActivity::Unknown => i64::MAX,
        })
    });
    debug!("{} inactive startups as of {}", inactive.len(), as_of);
    Ok(inactive)
}

// =============================================================================
// Statistics
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountEntry {
    pub key: String,
    pub count: usize,
}

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOverview {
    pub total: usize,
    pub active: usize,
    pub onboarded: usize,
    pub graduated: usize,
    pub rejected: usize,
    /// Non-zero stage counts, in pipeline order
    pub stage_stats: Vec<CountEntry>,
    pub status_stats: Vec<CountEntry>,
    pub total_revenue: f64,
    pub scheduled_smc: usize,
    pub scheduled_one_on_one: usize,
}

pub async fn stats_overview<R: FullRepository + ?Sized>(repo: &R) -> ServiceResult<StatsOverview> {
    let startups = repo.list_startups(&StartupFilter::default()).await?;
    let scheduled_smc = repo
        .list_smc_schedules(&SmcFilter {
            status: Some(BookingStatus::Scheduled),
            ..Default::default()
        })
        .await?
        .len();
    let scheduled_one_on_one = repo
        .list_sessions(&SessionFilter {
            status: Some(BookingStatus::Scheduled),
            ..Default::default()
        })
        .await?
        .len();

    let count_status = |status: StartupStatus| startups.iter().filter(|s| s.status == status).count();
    let stage_stats = Stage::ALL
        .iter()
        .map(|stage| CountEntry {
            key: stage.to_string(),
            count: startups.iter().filter(|s| s.stage == *stage).count(),
        })
        .filter(|entry| entry.count > 0)
        .collect();
    let status_stats = StartupStatus::ALL
        .iter()
        .map(|status| CountEntry {
            key: status.to_string(),
            count: count_status(*status),
        })
        .filter(|entry| entry.count > 0)
        .collect();

    Ok(StatsOverview {
        total: startups.len(),
        active: count_status(StartupStatus::Active),
        onboarded: count_status(StartupStatus::Onboarded),
        graduated: count_status(StartupStatus::Graduated),
        rejected: count_status(StartupStatus::Rejected),
        stage_stats,
        status_stats,
        total_revenue: startups.iter().map(|s| s.total_revenue).sum(),
        scheduled_smc,
        scheduled_one_on_one,
    })
}

// =============================================================================
// Settings
// =============================================================================

pub async fn list_settings<R: FullRepository + ?Sized>(repo: &R) -> ServiceResult<Vec<Setting>> {
    Ok(repo.list_settings().await?)
}

pub async fn get_setting<R: FullRepository + ?Sized>(repo: &R, key: &str) -> ServiceResult<Setting> {
    repo.get_setting(key)
        .await
        .map_err(|e| not_found_as("Setting", key, e))
}

pub async fn put_setting<R: FullRepository + ?Sized>(
    repo: &R,
    key: &str,
    value: serde_json::Value,
    description: Option<String>,
) -> ServiceResult<Setting> {
    if key.trim().is_empty() {
        return Err(LifecycleError::invalid_field("key", "Setting key is required").into());
    }
    let setting = Setting {
        key: key.trim().to_string(),
        value,
        description,
        updated_at: None,
    };
    let stored = repo.put_setting(setting).await?;
    debug!("Stored setting {}", stored.key);
    Ok(stored)
}
