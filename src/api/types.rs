//! REST API types for the upload page.
//!
//! The processing endpoint answers with the workbook itself; these types
//! cover the JSON side: inspection results and error bodies.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::transform::pipeline::ProcessSummary;

/// Response sent after a dry-run inspection of an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: always "ready"; failures answer with [`error_response`]
    pub status: String,

    /// When the inspection finished (RFC 3339)
    pub processed_at: String,

    /// Detection results and consolidation counts
    pub summary: ProcessSummary,
}

impl From<ProcessSummary> for InspectResponse {
    fn from(summary: ProcessSummary) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: "ready".to_string(),
            processed_at: Utc::now().to_rfc3339(),
            summary,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}
