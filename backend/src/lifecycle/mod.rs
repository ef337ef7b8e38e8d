//! Startup lifecycle engine.
//!
//! Owns the stage/status state machine and the SMC double-booking rule. Every
//! operation takes fully loaded records plus an explicit `now`, validates its
//! preconditions and returns new record values. Nothing here performs I/O or
//! mutates its inputs, so a failed operation leaves no partial state behind.
//!
//! ```text
//! S0 --CompleteSMC--> S1 --CompleteSMC--> S2 --CompleteSMC--> S3
//! any active stage --ScheduleOneOnOne--> One-on-One
//! Active --Onboard--> Onboarded --Graduate--> Graduated
//! Active --Reject--> Rejected
//! ```
//!
//! Persistence is the caller's job; see [`crate::db::services`] for the
//! load → apply → store orchestration.

pub mod error;
pub mod inactivity;
pub mod one_on_one;
pub mod records;
pub mod registration;
pub mod smc;
pub mod stage;
pub mod status;

pub use error::{FieldIssue, LifecycleError, LifecycleResult};
pub use inactivity::{
    compute_inactivity, ActivityKind, DaysSinceActivity, InactivityReport,
    INACTIVITY_THRESHOLD_DAYS,
};
pub use one_on_one::{complete_one_on_one, schedule_one_on_one};
pub use records::{add_achievement, add_revenue, remove_achievement};
pub use registration::{is_valid_email, magic_code, register, validate_profile};
pub use smc::{cancel_smc, complete_smc, schedule_smc};
pub use stage::{accepts_smc_booking, next_stage};
pub use status::{graduate, onboard, reject};

use crate::models::{Startup, StartupId};

/// Id of a startup that is expected to have been stored already.
fn startup_id(startup: &Startup) -> LifecycleResult<StartupId> {
    startup
        .id
        .ok_or_else(|| LifecycleError::invalid_field("startupId", "Startup has not been stored yet"))
}
