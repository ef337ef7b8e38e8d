//! Mentor sessions.

use chrono::{DateTime, NaiveDate, Utc};

use super::error::{FieldCheck, LifecycleError, LifecycleResult};
use super::startup_id;
use crate::models::{BookingStatus, MentorshipEntry, OneOnOneSession, Stage, Startup, StartupStatus};

/// Book a mentor session. The startup enters `One-on-One` at booking time,
/// not when the session completes.
pub fn schedule_one_on_one(
    startup: &Startup,
    date: NaiveDate,
    time: &str,
    mentor_name: &str,
    now: DateTime<Utc>,
) -> LifecycleResult<(OneOnOneSession, Startup)> {
    FieldCheck::new()
        .require("time", time, "Time is required")
        .require("mentorName", mentor_name, "Mentor name is required")
        .finish()?;

    let startup_id = startup_id(startup)?;
    if startup.status != StartupStatus::Active {
        return Err(LifecycleError::invalid_status("schedule a One-on-One", startup.status));
    }

    let session = OneOnOneSession {
        id: None,
        startup_id,
        date,
        time: time.trim().to_string(),
        mentor_name: mentor_name.trim().to_string(),
        status: BookingStatus::Scheduled,
        feedback: String::new(),
        progress: String::new(),
        completed_at: None,
        created_at: now,
    };

    let mut updated = startup.clone();
    updated.stage = Stage::OneOnOne;

    Ok((session, updated))
}

/// Close a mentor session and append it to the startup's history. The stage
/// is left alone. A blank `mentor_name` keeps the mentor named at booking.
pub fn complete_one_on_one(
    session: &OneOnOneSession,
    startup: &Startup,
    mentor_name: &str,
    feedback: &str,
    progress: &str,
    now: DateTime<Utc>,
) -> LifecycleResult<(OneOnOneSession, Startup)> {
    if session.status != BookingStatus::Scheduled {
        return Err(LifecycleError::invalid_status("complete a One-on-One", session.status));
    }

    FieldCheck::new()
        .require("feedback", feedback, "Feedback is required")
        .require("progress", progress, "Progress is required")
        .finish()?;

    if startup_id(startup)? != session.startup_id {
        return Err(LifecycleError::invalid_field(
            "startupId",
            "Session belongs to a different startup",
        ));
    }

    let mut completed = session.clone();
    if !mentor_name.trim().is_empty() {
        completed.mentor_name = mentor_name.trim().to_string();
    }
    completed.status = BookingStatus::Completed;
    completed.feedback = feedback.trim().to_string();
    completed.progress = progress.trim().to_string();
    completed.completed_at = Some(now);

    let mut updated = startup.clone();
    updated.one_on_one_history.push(MentorshipEntry {
        date: completed.date,
        time: completed.time.clone(),
        mentor_name: completed.mentor_name.clone(),
        feedback: completed.feedback.clone(),
        progress: completed.progress.clone(),
        completed_at: Some(now),
    });

    Ok((completed, updated))
}
