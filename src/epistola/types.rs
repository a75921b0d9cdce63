//! Data types for the Epistola generation-job status API.
//!
//! All structs derive `Serialize` and `Deserialize` matching the camelCase
//! JSON the Epistola API produces; status values travel in
//! SCREAMING_SNAKE_CASE.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a document generation job in Epistola.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationJobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl GenerationJobStatus {
    /// Whether no further state transition is expected. Only terminal
    /// statuses are dispatched to waiting executions; everything else is
    /// left for the next poll cycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Wire name of the status, as delivered in process variables.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for GenerationJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of one generation job, fetched fresh each poll cycle and never
/// cached across cycles.
///
/// `document_id` is set iff the job completed; `error_message` iff it
/// failed. A cancelled job carries neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJobDetail {
    pub request_id: String,
    pub status: GenerationJobStatus,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_set_is_completed_failed_cancelled() {
        assert!(!GenerationJobStatus::Pending.is_terminal());
        assert!(!GenerationJobStatus::InProgress.is_terminal());
        assert!(GenerationJobStatus::Completed.is_terminal());
        assert!(GenerationJobStatus::Failed.is_terminal());
        assert!(GenerationJobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn status_serializes_in_screaming_snake_case() {
        let json = serde_json::to_string(&GenerationJobStatus::InProgress).unwrap();
        assert_eq!(json, r#""IN_PROGRESS""#);
        assert_eq!(GenerationJobStatus::InProgress.to_string(), "IN_PROGRESS");
    }

    #[test]
    fn job_detail_deserializes_from_api_format() {
        let api_json = r#"{
            "requestId": "550e8400-e29b-41d4-a716-446655440000",
            "status": "COMPLETED",
            "documentId": "doc-9",
            "errorMessage": null,
            "createdAt": "2025-06-01T10:00:00Z",
            "completedAt": "2025-06-01T10:00:05Z"
        }"#;
        let detail: GenerationJobDetail = serde_json::from_str(api_json).unwrap();
        assert_eq!(detail.status, GenerationJobStatus::Completed);
        assert_eq!(detail.document_id.as_deref(), Some("doc-9"));
        assert_eq!(detail.error_message, None);
        assert!(detail.completed_at.is_some());
    }

    #[test]
    fn job_detail_tolerates_missing_optional_fields() {
        let api_json = r#"{"requestId": "r", "status": "PENDING"}"#;
        let detail: GenerationJobDetail = serde_json::from_str(api_json).unwrap();
        assert_eq!(detail.status, GenerationJobStatus::Pending);
        assert_eq!(detail.document_id, None);
        assert_eq!(detail.error_message, None);
        assert_eq!(detail.created_at, None);
    }

    #[test]
    fn failed_job_carries_error_message() {
        let api_json = r#"{
            "requestId": "r",
            "status": "FAILED",
            "errorMessage": "Template rendering error"
        }"#;
        let detail: GenerationJobDetail = serde_json::from_str(api_json).unwrap();
        assert_eq!(detail.status, GenerationJobStatus::Failed);
        assert_eq!(
            detail.error_message.as_deref(),
            Some("Template rendering error")
        );
    }
}
