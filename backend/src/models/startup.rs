//! Startup record and its lifecycle-owned sub-records.
//!
//! Field names serialize in camelCase so persisted documents and HTTP bodies
//! keep the dashboard's established JSON shape.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::define_record_id;

define_record_id!(i64, StartupId);

/// Position of a startup in the incubation pipeline.
///
/// `Onboarded`, `Graduated` and `Rejected` exist only so that legacy records
/// written by older tooling still load; the lifecycle engine never assigns them
/// (the terminal outcome lives in [`StartupStatus`] and the stage is frozen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    S0,
    S1,
    S2,
    S3,
    #[serde(rename = "One-on-One")]
    OneOnOne,
    Onboarded,
    Graduated,
    Rejected,
}

impl Stage {
    /// Stages an active startup may hold.
    pub const PIPELINE: [Stage; 5] = [Stage::S0, Stage::S1, Stage::S2, Stage::S3, Stage::OneOnOne];

    pub const ALL: [Stage; 8] = [
        Stage::S0,
        Stage::S1,
        Stage::S2,
        Stage::S3,
        Stage::OneOnOne,
        Stage::Onboarded,
        Stage::Graduated,
        Stage::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::S0 => "S0",
            Stage::S1 => "S1",
            Stage::S2 => "S2",
            Stage::S3 => "S3",
            Stage::OneOnOne => "One-on-One",
            Stage::Onboarded => "Onboarded",
            Stage::Graduated => "Graduated",
            Stage::Rejected => "Rejected",
        }
    }

    pub fn is_pipeline(&self) -> bool {
        Self::PIPELINE.contains(self)
    }

    /// Rank along the SMC pitch sequence `S0 < S1 < S2 < S3`.
    pub fn pitch_rank(&self) -> Option<u8> {
        match self {
            Stage::S0 => Some(0),
            Stage::S1 => Some(1),
            Stage::S2 => Some(2),
            Stage::S3 => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "S0" | "s0" => Ok(Stage::S0),
            "S1" | "s1" => Ok(Stage::S1),
            "S2" | "s2" => Ok(Stage::S2),
            "S3" | "s3" => Ok(Stage::S3),
            "One-on-One" | "one-on-one" | "oneOnOne" => Ok(Stage::OneOnOne),
            "Onboarded" => Ok(Stage::Onboarded),
            "Graduated" => Ok(Stage::Graduated),
            "Rejected" => Ok(Stage::Rejected),
            other => Err(format!("Unknown stage: {}", other)),
        }
    }
}

/// Overarching lifecycle bucket, orthogonal to [`Stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StartupStatus {
    Active,
    Onboarded,
    Graduated,
    Rejected,
}

impl StartupStatus {
    pub const ALL: [StartupStatus; 4] = [
        StartupStatus::Active,
        StartupStatus::Onboarded,
        StartupStatus::Graduated,
        StartupStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StartupStatus::Active => "Active",
            StartupStatus::Onboarded => "Onboarded",
            StartupStatus::Graduated => "Graduated",
            StartupStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for StartupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StartupStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StartupStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown status: {}", s))
    }
}

/// One completed SMC panel pitch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PitchEntry {
    /// Stage the startup held after the pitch was recorded
    pub stage: Stage,
    pub date: NaiveDate,
    pub time: String,
    pub panelist_name: String,
    pub feedback: String,
}

/// One completed mentor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorshipEntry {
    pub date: NaiveDate,
    pub time: String,
    pub mentor_name: String,
    pub feedback: String,
    pub progress: String,
    /// Absent on entries imported from older documents
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Recorded milestone. Only the fields of the matching [`AchievementKind`]
/// are carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub kind: AchievementKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AchievementKind {
    #[serde(rename_all = "camelCase")]
    Patent {
        #[serde(default)]
        patent_number: String,
        #[serde(default)]
        patent_status: String,
        #[serde(default)]
        filing_date: Option<NaiveDate>,
    },
    #[serde(rename_all = "camelCase")]
    Award {
        #[serde(default)]
        award_name: String,
        #[serde(default)]
        awarding_organization: String,
        #[serde(default)]
        award_category: String,
    },
    #[serde(rename = "Success Goal", rename_all = "camelCase")]
    SuccessGoal {
        #[serde(default)]
        goal_type: String,
        #[serde(default)]
        target_value: String,
        #[serde(default)]
        achieved_value: String,
    },
    #[serde(rename_all = "camelCase")]
    Upgrade {
        #[serde(default)]
        upgrade_type: String,
        #[serde(default)]
        previous_version: String,
        #[serde(default)]
        new_version: String,
    },
    Update,
}

impl AchievementKind {
    pub fn label(&self) -> &'static str {
        match self {
            AchievementKind::Patent { .. } => "Patent",
            AchievementKind::Award { .. } => "Award",
            AchievementKind::SuccessGoal { .. } => "Success Goal",
            AchievementKind::Upgrade { .. } => "Upgrade",
            AchievementKind::Update => "Update",
        }
    }
}

/// Revenue booked by an onboarded startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueEntry {
    pub id: String,
    pub amount: f64,
    pub source: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
}

/// Founder/contact/classification fields. Opaque to the engine apart from the
/// required-field checks at registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartupProfile {
    pub company_name: String,
    pub email: String,
    pub mobile: String,
    pub founder_name: String,
    pub city: String,
    pub sector: String,
    pub stage_of_idea: String,
    pub problem_solving: String,
    pub solution: String,
    pub has_patent: String,
    pub patent_number: String,
    pub is_registered: String,
    pub website: String,
    pub social_media: String,
    pub team_size: String,
    pub founder_age: String,
    pub founder_gender: String,
    pub college: String,
    pub address: String,
    pub referred_from: String,
    pub follow_up_remark: String,
}

/// Startup record as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Startup {
    /// Store-assigned identifier (absent until first insert)
    #[serde(default)]
    pub id: Option<StartupId>,
    pub magic_code: String,
    #[serde(flatten)]
    pub profile: StartupProfile,
    #[serde(default)]
    pub registered_date: Option<NaiveDate>,
    pub stage: Stage,
    pub status: StartupStatus,
    #[serde(default)]
    pub pitch_history: Vec<PitchEntry>,
    #[serde(default)]
    pub one_on_one_history: Vec<MentorshipEntry>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub revenue_history: Vec<RevenueEntry>,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarded_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduated_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_from_stage: Option<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_remark: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Startup {
    /// True once onboarding, rejection or graduation froze the stage.
    pub fn is_frozen(&self) -> bool {
        self.status != StartupStatus::Active
    }

    pub fn recompute_total_revenue(&mut self) {
        self.total_revenue = self.revenue_history.iter().map(|entry| entry.amount).sum();
    }

    /// Case-insensitive match on company name, magic code or founder name.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [
            self.profile.company_name.as_str(),
            self.magic_code.as_str(),
            self.profile.founder_name.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}
