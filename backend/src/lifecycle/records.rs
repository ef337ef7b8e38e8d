//! Achievement and revenue bookkeeping.

use super::error::{FieldCheck, LifecycleError, LifecycleResult};
use crate::models::{Achievement, RevenueEntry, Startup, StartupStatus};

pub fn add_achievement(startup: &Startup, achievement: Achievement) -> LifecycleResult<Startup> {
    FieldCheck::new()
        .require("id", &achievement.id, "Achievement id is required")
        .require("title", &achievement.title, "Title is required")
        .require("description", &achievement.description, "Description is required")
        .finish()?;

    if startup.achievements.iter().any(|a| a.id == achievement.id) {
        return Err(LifecycleError::Conflict(format!(
            "Achievement {} already exists",
            achievement.id
        )));
    }

    let mut updated = startup.clone();
    updated.achievements.push(achievement);
    Ok(updated)
}

pub fn remove_achievement(startup: &Startup, achievement_id: &str) -> LifecycleResult<Startup> {
    if !startup.achievements.iter().any(|a| a.id == achievement_id) {
        return Err(LifecycleError::not_found("Achievement", achievement_id));
    }
    let mut updated = startup.clone();
    updated.achievements.retain(|a| a.id != achievement_id);
    Ok(updated)
}

/// Append revenue for an onboarded startup and refresh `total_revenue`.
pub fn add_revenue(startup: &Startup, entry: RevenueEntry) -> LifecycleResult<Startup> {
    if startup.status != StartupStatus::Onboarded {
        return Err(LifecycleError::invalid_status("add revenue", startup.status));
    }

    FieldCheck::new()
        .ensure(
            entry.amount.is_finite() && entry.amount > 0.0,
            "amount",
            "Amount must be a positive number",
        )
        .require("source", &entry.source, "Source is required")
        .finish()?;

    let mut updated = startup.clone();
    updated.revenue_history.push(entry);
    updated.recompute_total_revenue();
    Ok(updated)
}
