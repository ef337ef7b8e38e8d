//! SMC panel slots and One-on-One mentor sessions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::startup::StartupId;
use crate::define_record_id;

define_record_id!(i64, SmcScheduleId);
define_record_id!(i64, SessionId);

/// Fixed SMC panel slots, in the order they run during the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "10 AM")]
    TenAm,
    #[serde(rename = "11 AM")]
    ElevenAm,
    #[serde(rename = "2 PM")]
    TwoPm,
    #[serde(rename = "3 PM")]
    ThreePm,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 4] = [
        TimeSlot::TenAm,
        TimeSlot::ElevenAm,
        TimeSlot::TwoPm,
        TimeSlot::ThreePm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::TenAm => "10 AM",
            TimeSlot::ElevenAm => "11 AM",
            TimeSlot::TwoPm => "2 PM",
            TimeSlot::ThreePm => "3 PM",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid time slot: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "Scheduled",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            BookingStatus::Scheduled,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ]
        .into_iter()
        .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| format!("Unknown booking status: {}", s))
    }
}

/// Panel pitch booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmcSchedule {
    #[serde(default)]
    pub id: Option<SmcScheduleId>,
    pub startup_id: StartupId,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub status: BookingStatus,
    #[serde(default)]
    pub panelist_name: String,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SmcSchedule {
    /// Whether this booking currently holds `(date, slot)`.
    pub fn occupies(&self, date: NaiveDate, slot: TimeSlot) -> bool {
        self.status == BookingStatus::Scheduled && self.date == date && self.time_slot == slot
    }
}

/// Mentor session booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneOnOneSession {
    #[serde(default)]
    pub id: Option<SessionId>,
    pub startup_id: StartupId,
    pub date: NaiveDate,
    pub time: String,
    pub mentor_name: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub progress: String,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
