//! Query filters understood by every repository implementation.

use chrono::NaiveDate;

use crate::models::{
    BookingStatus, OneOnOneSession, SmcSchedule, Stage, Startup, StartupId, StartupStatus,
};

/// Startup listing filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupFilter {
    pub stage: Option<Stage>,
    pub status: Option<StartupStatus>,
    /// Case-insensitive substring of company name, magic code or founder name.
    pub search: Option<String>,
}

impl StartupFilter {
    pub fn matches(&self, startup: &Startup) -> bool {
        self.stage.map_or(true, |stage| startup.stage == stage)
            && self.status.map_or(true, |status| startup.status == status)
            && self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|needle| !needle.is_empty())
                .map_or(true, |needle| startup.matches_search(needle))
    }
}

/// SMC schedule listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmcFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
    pub startup_id: Option<StartupId>,
}

impl SmcFilter {
    pub fn for_startup(startup_id: StartupId) -> Self {
        Self {
            startup_id: Some(startup_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, schedule: &SmcSchedule) -> bool {
        self.date.map_or(true, |date| schedule.date == date)
            && self.status.map_or(true, |status| schedule.status == status)
            && self.startup_id.map_or(true, |id| schedule.startup_id == id)
    }
}

/// One-on-One session listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionFilter {
    pub status: Option<BookingStatus>,
    pub startup_id: Option<StartupId>,
}

impl SessionFilter {
    pub fn for_startup(startup_id: StartupId) -> Self {
        Self {
            startup_id: Some(startup_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, session: &OneOnOneSession) -> bool {
        self.status.map_or(true, |status| session.status == status)
            && self.startup_id.map_or(true, |id| session.startup_id == id)
    }
}
