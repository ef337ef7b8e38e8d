//! Startup record storage.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::db::models::StartupFilter;
use crate::models::{Startup, StartupId};

/// Repository trait for startup records.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait StartupRepository: Send + Sync {
    /// Check whether the store is reachable.
    ///
    /// # Returns
    /// * `Ok(true)` - Store is healthy
    /// * `Ok(false)` - Store is reachable but not accepting work
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Human-readable name of the backing storage ("local", "json").
    fn storage_kind(&self) -> &'static str;

    /// Insert a newly registered startup.
    ///
    /// The store assigns the id and the final magic code from its
    /// registration counter in the same critical section as the duplicate
    /// email check, so concurrent registrations never share a code. A
    /// duplicate email is a `ConflictError`.
    ///
    /// # Returns
    /// * `Ok(Startup)` - The stored record with its id set
    /// * `Err(RepositoryError)` - If the record conflicts or the store fails
    async fn insert_startup(&self, startup: Startup) -> RepositoryResult<Startup>;

    /// Fetch a startup by id. Unknown ids are `NotFound`.
    async fn get_startup(&self, id: StartupId) -> RepositoryResult<Startup>;

    /// List startups matching `filter`, in id order.
    async fn list_startups(&self, filter: &StartupFilter) -> RepositoryResult<Vec<Startup>>;

    /// Replace a stored startup. `updated_at` is refreshed by the store.
    ///
    /// `startup.updated_at` must match the stored record's; a write derived
    /// from an older version is a `ConflictError`, as is an email that now
    /// collides with another startup. Unknown ids are `NotFound`.
    async fn update_startup(&self, startup: &Startup) -> RepositoryResult<Startup>;

    /// Remove a startup together with its bookings.
    async fn delete_startup(&self, id: StartupId) -> RepositoryResult<()>;

    /// Look up a startup by email, ignoring case and surrounding whitespace.
    async fn find_startup_by_email(&self, email: &str) -> RepositoryResult<Option<Startup>>;

    /// Number of registrations ever accepted, deleted startups included.
    async fn registration_count(&self) -> RepositoryResult<u64>;
}
