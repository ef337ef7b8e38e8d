//! SMC schedule and One-on-One session storage.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::db::models::{SessionFilter, SmcFilter};
use crate::models::{OneOnOneSession, SessionId, SmcSchedule, SmcScheduleId, Startup};

/// Repository trait for bookings.
///
/// Operations that produce both a booking and an updated startup take both
/// records and write them in a single critical section, so readers never
/// observe one without the other. The startup write follows the optimistic
/// rule of [`StartupRepository::update_startup`](super::StartupRepository::update_startup),
/// and a booking may only be completed or cancelled while the stored copy is
/// still `Scheduled`; both violations are `ConflictError`.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    // ==================== SMC Schedules ====================

    /// Insert a new SMC booking.
    ///
    /// Checking that no other `Scheduled` booking holds the same
    /// `(date, time_slot)` and inserting happen atomically; a taken slot is a
    /// `ConflictError`.
    async fn insert_smc_schedule(&self, schedule: SmcSchedule) -> RepositoryResult<SmcSchedule>;

    async fn get_smc_schedule(&self, id: SmcScheduleId) -> RepositoryResult<SmcSchedule>;

    /// List SMC bookings matching `filter`, in id order.
    async fn list_smc_schedules(&self, filter: &SmcFilter) -> RepositoryResult<Vec<SmcSchedule>>;

    /// Replace a stored `Scheduled` SMC booking (used for cancellation).
    async fn update_smc_schedule(&self, schedule: &SmcSchedule) -> RepositoryResult<SmcSchedule>;

    /// Store a completed booking and the startup it advanced.
    async fn commit_smc_completion(
        &self,
        schedule: &SmcSchedule,
        startup: &Startup,
    ) -> RepositoryResult<(SmcSchedule, Startup)>;

    async fn delete_smc_schedule(&self, id: SmcScheduleId) -> RepositoryResult<()>;

    // ==================== One-on-One Sessions ====================

    /// Insert a new session and store the startup's updated stage.
    async fn insert_one_on_one(
        &self,
        session: OneOnOneSession,
        startup: &Startup,
    ) -> RepositoryResult<(OneOnOneSession, Startup)>;

    async fn get_session(&self, id: SessionId) -> RepositoryResult<OneOnOneSession>;

    /// List sessions matching `filter`, in id order.
    async fn list_sessions(&self, filter: &SessionFilter) -> RepositoryResult<Vec<OneOnOneSession>>;

    /// Store a completed session and the startup whose history it extended.
    async fn commit_session_completion(
        &self,
        session: &OneOnOneSession,
        startup: &Startup,
    ) -> RepositoryResult<(OneOnOneSession, Startup)>;

    async fn delete_session(&self, id: SessionId) -> RepositoryResult<()>;
}
