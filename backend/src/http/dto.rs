//! Data Transfer Objects for the HTTP API.
//!
//! Field names are camelCase on the wire. Booking requests take dates and
//! slots as plain strings so that malformed values come back as field-level
//! validation errors instead of extractor rejections.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::AppError;
use crate::db::models::{SessionFilter, SmcFilter, StartupFilter};
use crate::lifecycle::{FieldIssue, InactivityReport, LifecycleError};
use crate::models::{
    Achievement, AchievementKind, BookingStatus, OneOnOneSession, RevenueEntry, SmcSchedule,
    Stage, Startup, StartupId, StartupProfile, StartupStatus, TimeSlot,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub storage: String,
}

/// Plain acknowledgement, used by deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Startups
// =============================================================================

/// Registration form: the profile fields plus an optional registration date.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub profile: StartupProfile,
    #[serde(default)]
    pub registered_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub remark: String,
}

/// `GET /api/startups` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartupListQuery {
    pub stage: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl StartupListQuery {
    pub fn into_filter(self) -> Result<StartupFilter, AppError> {
        Ok(StartupFilter {
            stage: parse_param("stage", self.stage.as_deref())?,
            status: parse_param::<StartupStatus>("status", self.status.as_deref())?,
            search: self.search,
        })
    }
}

/// `GET /api/inactive-startups` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InactiveStartupsQuery {
    pub stage: Option<String>,
}

impl InactiveStartupsQuery {
    pub fn stage(&self) -> Result<Option<Stage>, AppError> {
        parse_param("stage", self.stage.as_deref())
    }
}

/// `GET /api/startups/{id}/inactivity` query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InactivityQuery {
    /// RFC 3339 timestamp or calendar date; defaults to now.
    pub as_of: Option<String>,
}

impl InactivityQuery {
    pub fn as_of(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
        let Some(raw) = self.as_of.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(now);
        };
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDate::from_str(raw)
            .map(|date| date.and_time(chrono::NaiveTime::default()).and_utc())
            .map_err(|_| AppError::BadRequest(format!("Invalid asOf: {}", raw)))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InactivityResponse {
    pub startup_id: StartupId,
    /// False for startups outside the active pipeline.
    pub applicable: bool,
    #[serde(flatten)]
    pub report: Option<InactivityReport>,
}

// =============================================================================
// Achievements & Revenue
// =============================================================================

/// New achievement. A missing `id` is generated server-side.
#[derive(Debug, Clone, Deserialize)]
pub struct AchievementRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub kind: AchievementKind,
}

impl From<AchievementRequest> for Achievement {
    fn from(req: AchievementRequest) -> Self {
        Achievement {
            id: req.id.filter(|id| !id.trim().is_empty()).unwrap_or_else(new_record_id),
            title: req.title,
            description: req.description,
            date: req.date,
            kind: req.kind,
        }
    }
}

/// New revenue entry. A missing `id` is generated server-side.
///
/// `amount` may be a number or a numeric string (dashboard forms post the
/// raw input). Anything else is left for the engine to report as an invalid
/// `amount` field.
#[derive(Debug, Clone, Deserialize)]
pub struct RevenueRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
}

impl From<RevenueRequest> for RevenueEntry {
    fn from(req: RevenueRequest) -> Self {
        RevenueEntry {
            id: req.id.filter(|id| !id.trim().is_empty()).unwrap_or_else(new_record_id),
            amount: revenue_amount(req.amount.as_ref()),
            source: req.source,
            date: req.date,
            description: req.description,
        }
    }
}

fn revenue_amount(value: Option<&serde_json::Value>) -> f64 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// SMC
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSmcRequest {
    pub startup_id: Option<StartupId>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time_slot: String,
}

impl ScheduleSmcRequest {
    /// Parsed `(startupId, date, timeSlot)`; every bad field is reported.
    pub fn parse(&self) -> Result<(StartupId, NaiveDate, TimeSlot), LifecycleError> {
        let mut issues = Vec::new();
        if self.startup_id.is_none() {
            issues.push(FieldIssue::new("startupId", "Startup is required"));
        }
        let date = parse_date("date", &self.date, &mut issues);
        let slot = match TimeSlot::from_str(&self.time_slot) {
            Ok(slot) => Some(slot),
            Err(e) => {
                issues.push(FieldIssue::new("timeSlot", e));
                None
            }
        };
        match (self.startup_id, date, slot) {
            (Some(id), Some(date), Some(slot)) if issues.is_empty() => Ok((id, date, slot)),
            _ => Err(LifecycleError::Validation(issues)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompleteSmcRequest {
    pub panelist_name: String,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmcCompletionResponse {
    pub schedule: SmcSchedule,
    pub startup: Startup,
}

/// `GET /api/smc` query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmcListQuery {
    pub date: Option<String>,
    pub status: Option<String>,
    pub startup_id: Option<String>,
}

impl SmcListQuery {
    pub fn into_filter(self) -> Result<SmcFilter, AppError> {
        Ok(SmcFilter {
            date: parse_param("date", self.date.as_deref())?,
            status: parse_param::<BookingStatus>("status", self.status.as_deref())?,
            startup_id: parse_param("startupId", self.startup_id.as_deref())?,
        })
    }
}

// =============================================================================
// One-on-One
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOneOnOneRequest {
    pub startup_id: Option<StartupId>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub mentor_name: String,
}

impl ScheduleOneOnOneRequest {
    /// Parsed `(startupId, date)`. Text fields are checked by the engine.
    pub fn parse(&self) -> Result<(StartupId, NaiveDate), LifecycleError> {
        let mut issues = Vec::new();
        if self.startup_id.is_none() {
            issues.push(FieldIssue::new("startupId", "Startup is required"));
        }
        let date = parse_date("date", &self.date, &mut issues);
        match (self.startup_id, date) {
            (Some(id), Some(date)) if issues.is_empty() => Ok((id, date)),
            _ => Err(LifecycleError::Validation(issues)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompleteOneOnOneRequest {
    pub mentor_name: String,
    pub feedback: String,
    pub progress: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OneOnOneResponse {
    pub session: OneOnOneSession,
    pub startup: Startup,
}

/// `GET /api/one-on-one` query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListQuery {
    pub status: Option<String>,
    pub startup_id: Option<String>,
}

impl SessionListQuery {
    pub fn into_filter(self) -> Result<SessionFilter, AppError> {
        Ok(SessionFilter {
            status: parse_param::<BookingStatus>("status", self.status.as_deref())?,
            startup_id: parse_param("startupId", self.startup_id.as_deref())?,
        })
    }
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SettingUpdate {
    pub value: serde_json::Value,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Parsing helpers
// =============================================================================

/// Parse an optional query parameter; blank means "not given".
fn parse_param<T>(name: &str, raw: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|e| AppError::BadRequest(format!("Invalid {} '{}': {}", name, value, e))),
    }
}

fn parse_date(field: &str, raw: &str, issues: &mut Vec<FieldIssue>) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        issues.push(FieldIssue::new(field, "Date is required"));
        return None;
    }
    match NaiveDate::from_str(raw) {
        Ok(date) => Some(date),
        Err(_) => {
            issues.push(FieldIssue::new(field, "Expected a YYYY-MM-DD date"));
            None
        }
    }
}
