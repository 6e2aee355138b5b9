//! Batch report and handler envelope
//!
//! The report lists every discovered resource with an explicit outcome.
//! The envelope mirrors a serverless handler response: a status code and a
//! pretty-printed JSON body string.

use crate::catalog::{CatalogRecord, Relation};
use crate::discovery::{ResourceDescriptor, TagFilter};
use crate::error::SyncError;
use serde::Serialize;
use uuid::Uuid;

/// Component created for a resource, plus how linking it went
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentOutcome {
    #[serde(flatten)]
    pub record: CatalogRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Success { record: ComponentOutcome },
    Error { error: String },
}

/// Result for one discovered resource
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub resource: ResourceDescriptor,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub linked_application: String,
}

impl SyncResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    pub fn has_relation_error(&self) -> bool {
        matches!(
            &self.outcome,
            Outcome::Success { record } if record.relation_error.is_some()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub relation_errors: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn from_results(results: &[SyncResult], skipped: usize) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            relation_errors: results.iter().filter(|r| r.has_relation_error()).count(),
            skipped,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub timestamp: String,
    pub user: String,
    pub filter: TagFilter,
    pub application: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub resources: Vec<ResourceDescriptor>,
    pub results: Vec<SyncResult>,
    pub summary: Summary,
    pub metadata: RunMetadata,
}

#[derive(Debug, Serialize)]
struct FailureBody<'a> {
    error: String,
    metadata: &'a RunMetadata,
}

/// What the entry point returns
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn ok(report: &BatchReport) -> Self {
        Self {
            status_code: 200,
            body: to_body(report),
        }
    }

    pub fn failure(error: &SyncError, metadata: &RunMetadata) -> Self {
        Self {
            status_code: 500,
            body: to_body(&FailureBody {
                error: error.to_string(),
                metadata,
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

fn to_body<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to encode report: {e}\"}}"))
}
