//! Inactivity projection for startups still in the pipeline.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::models::{BookingStatus, OneOnOneSession, SmcSchedule, Startup, StartupStatus};

/// A startup is inactive after this many days without activity.
pub const INACTIVITY_THRESHOLD_DAYS: i64 = 30;

/// Source of the most recent activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityKind {
    Registration,
    #[serde(rename = "SMC Meeting")]
    SmcMeeting,
    #[serde(rename = "One-on-One Meeting")]
    OneOnOneMeeting,
    #[serde(rename = "Pitch Session")]
    PitchSession,
    #[serde(rename = "Mentorship Session")]
    MentorshipSession,
}

/// Whole days since the last activity, or `Unknown` when no date exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaysSinceActivity {
    Days(i64),
    Unknown,
}

impl Serialize for DaysSinceActivity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DaysSinceActivity::Days(days) => serializer.serialize_i64(*days),
            DaysSinceActivity::Unknown => serializer.serialize_str("Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InactivityReport {
    pub is_inactive: bool,
    pub days_since_activity: DaysSinceActivity,
    pub last_activity_type: ActivityKind,
    pub last_activity_date: Option<DateTime<Utc>>,
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// Compute how long `startup` has been idle as of `as_of`.
///
/// Returns `None` for startups the projection does not apply to (anything
/// not `Active` in a pipeline stage). `smc_schedules` and `sessions` may hold
/// records of other startups; they are filtered here.
pub fn compute_inactivity(
    startup: &Startup,
    smc_schedules: &[SmcSchedule],
    sessions: &[OneOnOneSession],
    as_of: DateTime<Utc>,
) -> Option<InactivityReport> {
    if startup.status != StartupStatus::Active || !startup.stage.is_pipeline() {
        return None;
    }

    let latest_smc = smc_schedules
        .iter()
        .filter(|s| Some(s.startup_id) == startup.id && s.status == BookingStatus::Completed)
        .map(|s| s.date)
        .max();
    let latest_session = sessions
        .iter()
        .filter(|s| Some(s.startup_id) == startup.id && s.status == BookingStatus::Completed)
        .map(|s| s.date)
        .max();
    let last_pitch = startup.pitch_history.last().map(|p| p.date);
    let last_mentorship = startup.one_on_one_history.last().and_then(|m| m.completed_at);

    // Earlier candidates win ties.
    let candidates = [
        (latest_smc.map(start_of_day), ActivityKind::SmcMeeting),
        (latest_session.map(start_of_day), ActivityKind::OneOnOneMeeting),
        (last_pitch.map(start_of_day), ActivityKind::PitchSession),
        (last_mentorship, ActivityKind::MentorshipSession),
    ];

    let mut last: Option<(DateTime<Utc>, ActivityKind)> = None;
    for (date, kind) in candidates {
        if let Some(date) = date {
            if last.map_or(true, |(current, _)| date > current) {
                last = Some((date, kind));
            }
        }
    }

    let (last_activity_date, last_activity_type) = match last {
        Some((date, kind)) => (Some(date), kind),
        None => (
            startup
                .created_at
                .or_else(|| startup.registered_date.map(start_of_day)),
            ActivityKind::Registration,
        ),
    };

    Some(match last_activity_date {
        Some(date) => {
            let idle = as_of - date;
            InactivityReport {
                is_inactive: idle > Duration::days(INACTIVITY_THRESHOLD_DAYS),
                days_since_activity: DaysSinceActivity::Days(idle.num_seconds().div_euclid(86_400)),
                last_activity_type,
                last_activity_date: Some(date),
            }
        }
        None => InactivityReport {
            is_inactive: true,
            days_since_activity: DaysSinceActivity::Unknown,
            last_activity_type,
            last_activity_date: None,
        },
    })
}
