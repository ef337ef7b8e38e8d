//! Terminal status transitions. Each one freezes the stage where it stands.

use chrono::{DateTime, Utc};

use super::error::{LifecycleError, LifecycleResult};
use crate::models::{Startup, StartupStatus};

pub fn onboard(startup: &Startup, now: DateTime<Utc>) -> LifecycleResult<Startup> {
    if startup.status != StartupStatus::Active {
        return Err(LifecycleError::invalid_status("onboard", startup.status));
    }
    let mut updated = startup.clone();
    updated.status = StartupStatus::Onboarded;
    updated.onboarded_date = Some(now);
    Ok(updated)
}

/// Reject an active startup, remembering the stage it was rejected from.
pub fn reject(startup: &Startup, remark: &str, now: DateTime<Utc>) -> LifecycleResult<Startup> {
    if remark.trim().is_empty() {
        return Err(LifecycleError::invalid_field("remark", "Rejection remark is required"));
    }
    if startup.status != StartupStatus::Active {
        return Err(LifecycleError::invalid_status("reject", startup.status));
    }
    let mut updated = startup.clone();
    updated.rejected_from_stage = Some(startup.stage);
    updated.status = StartupStatus::Rejected;
    updated.rejection_remark = Some(remark.trim().to_string());
    updated.rejected_date = Some(now);
    Ok(updated)
}

/// Graduate an onboarded startup. Its achievements and revenue become
/// read-only from here on; callers enforce that.
pub fn graduate(startup: &Startup, now: DateTime<Utc>) -> LifecycleResult<Startup> {
    if startup.status != StartupStatus::Onboarded {
        return Err(LifecycleError::invalid_status("graduate", startup.status));
    }
    let mut updated = startup.clone();
    updated.status = StartupStatus::Graduated;
    updated.graduated_date = Some(now);
    Ok(updated)
}
