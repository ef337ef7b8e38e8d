//! Record storage for startups, bookings and settings.
//!
//! This module provides abstractions for storage via the Repository pattern,
//! allowing different backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, tests)                    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - load → lifecycle operation → store                   │
//! │  - store errors mapped to lifecycle errors              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │                              │
//! ┌───▼──────────────┐   ┌───────────▼──────────────┐
//! │ LocalRepository  │◄──┤ JsonFileRepository       │
//! │ (in-memory)      │   │ (one JSON document)      │
//! └──────────────────┘   └──────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! ```ignore
//! use magic_incubator::db::{services, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let overview = services::stats_overview(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```

#[cfg(not(feature = "local-repo"))]
compile_error!("The local-repo feature is required; every backend builds on it.");

pub mod config;
pub mod factory;
pub mod models;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;


pub use config::{JsonFileConfig, DEFAULT_DATA_FILE};
pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use models::{SessionFilter, SmcFilter, StartupFilter};
pub use repo_config::RepositoryConfig;
#[cfg(feature = "json-repo")]
pub use repositories::JsonFileRepository;
pub use repositories::{LocalRepository, StoreSnapshot};
pub use repository::{
    ErrorContext, FullRepository, RepositoryError, RepositoryResult, ScheduleRepository,
    SettingsRepository, StartupRepository,
};
pub use services::{ServiceError, ServiceResult};
