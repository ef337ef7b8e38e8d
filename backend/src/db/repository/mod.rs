//! Record-store interface.
//!
//! The store is split into one trait per record family. [`FullRepository`]
//! is implemented automatically for any type that implements all of them,
//! which is what the service and HTTP layers depend on.

pub mod error;
pub mod schedule;
pub mod settings;
pub mod startup;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use schedule::ScheduleRepository;
pub use settings::SettingsRepository;
pub use startup::StartupRepository;

/// Everything the application needs from a store.
pub trait FullRepository: StartupRepository + ScheduleRepository + SettingsRepository {}

impl<T> FullRepository for T where T: StartupRepository + ScheduleRepository + SettingsRepository {}
