//! Application Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Application-level acceptance state, distinct from workflow position.
///
/// Only accepted applications appear on the workflow board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A creator's application to a campaign (the record behind each board card).
///
/// `workflow_status` references a stage by name; it may be null (never
/// assigned) or hold a name no longer present in the registry (stage renamed
/// or deleted server-side). Both cases are handled downstream by the column
/// resolver, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: i64,
    pub campaign_id: i64,
    pub creator_id: i64,
    pub status: ApplicationStatus,
    pub workflow_status: Option<String>,
    pub creator_workflow_status: Option<String>,
    pub message: Option<String>,
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metrics: Option<ApplicationMetrics>,
}

impl Application {
    pub fn is_accepted(&self) -> bool {
        self.status == ApplicationStatus::Accepted
    }
}

/// Performance counters entered by the company through the detail panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationMetrics {
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub shares: i64,
}

/// Stage move payload for `PATCH .../workflow-status-company`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatusUpdate {
    pub workflow_status: String,
}

impl WorkflowStatusUpdate {
    pub fn new(stage_name: impl Into<String>) -> Self {
        Self {
            workflow_status: stage_name.into(),
        }
    }
}

/// Metrics form payload for `PATCH .../metrics`.
///
/// Absent fields leave the server-side value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MetricsUpdate {
    #[validate(range(min = 0, message = "views must not be negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<i64>,
    #[validate(range(min = 0, message = "likes must not be negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
    #[validate(range(min = 0, message = "comments must not be negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<i64>,
    #[validate(range(min = 0, message = "shares must not be negative"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<i64>,
}
