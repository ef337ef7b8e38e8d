//! SMC panel bookings: scheduling, completion and cancellation.

use chrono::{DateTime, NaiveDate, Utc};

use super::error::{FieldCheck, LifecycleError, LifecycleResult};
use super::stage::{accepts_smc_booking, next_stage};
use super::startup_id;
use crate::models::{BookingStatus, PitchEntry, SmcSchedule, Startup, StartupStatus, TimeSlot};

/// Book an SMC slot for `startup`.
///
/// `existing` must contain every schedule that could occupy the slot; the
/// store repeats the check atomically on insert.
pub fn schedule_smc(
    startup: &Startup,
    date: NaiveDate,
    time_slot: TimeSlot,
    existing: &[SmcSchedule],
    now: DateTime<Utc>,
) -> LifecycleResult<SmcSchedule> {
    let startup_id = startup_id(startup)?;

    if startup.status != StartupStatus::Active {
        return Err(LifecycleError::invalid_status("schedule an SMC pitch", startup.status));
    }
    if !accepts_smc_booking(startup.stage) {
        return Err(LifecycleError::InvalidStage {
            operation: "schedule an SMC pitch for",
            stage: startup.stage,
        });
    }
    if existing.iter().any(|schedule| schedule.occupies(date, time_slot)) {
        return Err(LifecycleError::SlotConflict {
            date,
            slot: time_slot,
        });
    }

    Ok(SmcSchedule {
        id: None,
        startup_id,
        date,
        time_slot,
        status: BookingStatus::Scheduled,
        panelist_name: String::new(),
        feedback: String::new(),
        completed_at: None,
        created_at: now,
    })
}

/// Record the outcome of a pitch and advance the startup one stage.
///
/// The stage moves along `S0 -> S1 -> S2 -> S3` only while the startup is
/// active; the pitch entry is appended either way and carries the resulting
/// stage.
pub fn complete_smc(
    schedule: &SmcSchedule,
    startup: &Startup,
    panelist_name: &str,
    feedback: &str,
    now: DateTime<Utc>,
) -> LifecycleResult<(SmcSchedule, Startup)> {
    if schedule.status != BookingStatus::Scheduled {
        return Err(LifecycleError::invalid_status("complete an SMC pitch", schedule.status));
    }

    FieldCheck::new()
        .require("panelistName", panelist_name, "Panelist name is required")
        .require("feedback", feedback, "Feedback is required")
        .finish()?;

    if startup_id(startup)? != schedule.startup_id {
        return Err(LifecycleError::invalid_field(
            "startupId",
            "Schedule belongs to a different startup",
        ));
    }

    let mut completed = schedule.clone();
    completed.status = BookingStatus::Completed;
    completed.panelist_name = panelist_name.trim().to_string();
    completed.feedback = feedback.trim().to_string();
    completed.completed_at = Some(now);

    let mut updated = startup.clone();
    if !updated.is_frozen() {
        updated.stage = next_stage(updated.stage);
    }
    updated.pitch_history.push(PitchEntry {
        stage: updated.stage,
        date: schedule.date,
        time: schedule.time_slot.as_str().to_string(),
        panelist_name: completed.panelist_name.clone(),
        feedback: completed.feedback.clone(),
    });

    Ok((completed, updated))
}

/// Release a booked slot. Completed and cancelled bookings are immutable.
pub fn cancel_smc(schedule: &SmcSchedule) -> LifecycleResult<SmcSchedule> {
    if schedule.status != BookingStatus::Scheduled {
        return Err(LifecycleError::invalid_status("cancel an SMC pitch", schedule.status));
    }
    let mut cancelled = schedule.clone();
    cancelled.status = BookingStatus::Cancelled;
    Ok(cancelled)
}
