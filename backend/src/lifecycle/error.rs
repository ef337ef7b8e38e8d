//! Error taxonomy for lifecycle operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Stage, TimeSlot};

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// A single missing or malformed input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Business-rule violation raised by the lifecycle engine.
///
/// Every variant is raised before any record is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    /// One or more required fields are missing or malformed.
    #[error("Validation failed: {}", describe_issues(.0))]
    Validation(Vec<FieldIssue>),

    /// Uniqueness violation (e.g. duplicate email at registration).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The SMC slot already holds a scheduled booking.
    #[error("Time slot {slot} on {date} is already booked")]
    SlotConflict { date: NaiveDate, slot: TimeSlot },

    /// The startup's stage does not permit the operation.
    #[error("Cannot {operation} a startup at stage {stage}")]
    InvalidStage {
        operation: &'static str,
        stage: Stage,
    },

    /// The startup's (or booking's) status does not permit the operation.
    #[error("Cannot {operation} while status is {status}")]
    InvalidStatus {
        operation: &'static str,
        status: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
}

impl LifecycleError {
    /// Shorthand for a validation failure on a single field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldIssue::new(field, message)])
    }

    pub fn invalid_status(operation: &'static str, status: impl ToString) -> Self {
        Self::InvalidStatus {
            operation,
            status: status.to_string(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code for transports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::SlotConflict { .. } => "SLOT_CONFLICT",
            Self::InvalidStage { .. } => "INVALID_STAGE",
            Self::InvalidStatus { .. } => "INVALID_STATUS",
            Self::NotFound { .. } => "NOT_FOUND",
        }
    }

    /// Field issues carried by a validation failure.
    pub fn field_issues(&self) -> &[FieldIssue] {
        match self {
            Self::Validation(issues) => issues,
            _ => &[],
        }
    }
}

fn describe_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.field, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects every failing field before reporting, so callers see the whole
/// list rather than the first problem.
#[derive(Debug, Default)]
pub(crate) struct FieldCheck {
    issues: Vec<FieldIssue>,
}

impl FieldCheck {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record an issue when `value` is empty after trimming.
    pub(crate) fn require(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.issues.push(FieldIssue::new(field, message));
        }
        self
    }

    /// Record an issue when `ok` is false.
    pub(crate) fn ensure(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.issues.push(FieldIssue::new(field, message));
        }
        self
    }

    pub(crate) fn finish(&mut self) -> LifecycleResult<()> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(LifecycleError::Validation(std::mem::take(&mut self.issues)))
        }
    }
}
