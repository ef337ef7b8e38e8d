//! HTTP error handling and response types.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::db::services::ServiceError;
use crate::lifecycle::{FieldIssue, LifecycleError};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Offending input fields of a validation failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldIssue>>,
    /// Set when the same request may succeed if simply sent again
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            fields: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldIssue>) -> Self {
        if !fields.is_empty() {
            self.fields = Some(fields);
        }
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Business-rule violation from the lifecycle engine
    Lifecycle(LifecycleError),
    /// Repository error
    Repository(RepositoryError),
    /// Resource not found
    NotFound(String),
    /// Invalid request (malformed path or query parameter)
    BadRequest(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Lifecycle(LifecycleError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Lifecycle(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Repository(RepositoryError::NotFound { .. }) | AppError::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::Repository(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::Lifecycle(e) => {
                let fields = e.field_issues().to_vec();
                ApiError::new(e.code(), e.to_string()).with_fields(fields)
            }
            AppError::Repository(e) => {
                let code = match &e {
                    RepositoryError::NotFound { .. } => "NOT_FOUND",
                    _ => "REPOSITORY_ERROR",
                };
                if e.is_retryable() {
                    tracing::warn!("Transient repository failure: {}", e);
                } else {
                    tracing::error!("Repository failure: {}", e);
                }
                ApiError::new(code, e.message())
                    .with_details(e.to_string())
                    .retryable(e.is_retryable())
            }
            AppError::NotFound(msg) => ApiError::new("NOT_FOUND", msg),
            AppError::BadRequest(msg) => ApiError::new("BAD_REQUEST", msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ApiError::new("INTERNAL_ERROR", msg)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Lifecycle(e) => AppError::Lifecycle(e),
            ServiceError::Repository(e) => AppError::Repository(e),
        }
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        AppError::Lifecycle(err)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        let field = rejected_field(&message);
        AppError::Lifecycle(LifecycleError::invalid_field(field, message))
    }
}

/// Best-effort name of the body field a JSON rejection complains about;
/// `body` when the text does not point at one.
fn rejected_field(message: &str) -> String {
    if let Some((_, rest)) = message.split_once("missing field `") {
        if let Some((field, _)) = rest.split_once('`') {
            return field.to_string();
        }
    }
    // Type errors read "...target type: <path>: <reason>".
    message
        .split_once("target type: ")
        .and_then(|(_, detail)| detail.split_once(": "))
        .map(|(path, _)| path)
        .filter(|path| !path.is_empty() && !path.contains(char::is_whitespace))
        .unwrap_or("body")
        .to_string()
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeSlot;
    use chrono::NaiveDate;

    #[test]
    fn test_status_mapping() {
        let slot = AppError::Lifecycle(LifecycleError::SlotConflict {
            date: NaiveDate::from_ymd_opt(2025, 12, 6).unwrap(),
            slot: TimeSlot::TenAm,
        });
        assert_eq!(slot.status(), StatusCode::BAD_REQUEST);

        let missing = AppError::Lifecycle(LifecycleError::not_found("Startup", 9));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let store = AppError::Repository(RepositoryError::storage("disk full"));
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_rejected_field_names() {
        assert_eq!(
            rejected_field(
                "Failed to deserialize the JSON body into the target type: missing field `amount` at line 1 column 19"
            ),
            "amount"
        );
        assert_eq!(
            rejected_field(
                "Failed to deserialize the JSON body into the target type: registeredDate: input contains invalid characters at line 1 column 30"
            ),
            "registeredDate"
        );
        assert_eq!(
            rejected_field("Failed to parse the request body as JSON: expected value at line 1 column 1"),
            "body"
        );
        assert_eq!(
            rejected_field("Expected request with `Content-Type: application/json`"),
            "body"
        );
    }

    #[test]
    fn test_fields_skipped_when_empty() {
        let body = serde_json::to_value(ApiError::new("CONFLICT", "taken").with_fields(vec![]))
            .unwrap();
        assert!(body.get("fields").is_none());
        assert!(body.get("details").is_none());
        assert!(body.get("retryable").is_none());
    }

    async fn body_of(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_transient_store_failure_is_flagged_retryable() {
        let transient = RepositoryError::storage_with_context(
            "rename failed",
            crate::db::repository::ErrorContext::new("persist").retryable(),
        );
        let body = body_of(AppError::Repository(transient)).await;
        assert_eq!(body["code"], "REPOSITORY_ERROR");
        assert_eq!(body["retryable"], true);

        let body = body_of(AppError::Repository(RepositoryError::configuration("bad path"))).await;
        assert!(body.get("retryable").is_none());
    }
}
