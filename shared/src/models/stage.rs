//! Workflow Stage Model

use serde::{Deserialize, Serialize};

/// A named pipeline stage defined per company.
///
/// Stages form the board's columns, ordered by `position`. Stage names are
/// unique within a company and are the only valid values for an
/// application's workflow status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStage {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub position: i32,
    pub color: Option<String>,
    pub is_default: bool,
}

impl WorkflowStage {
    /// Sort a fetched registry into authoritative column order.
    ///
    /// The server's `position` field wins; ties break by id so the order is
    /// deterministic regardless of response order.
    pub fn sort_registry(stages: &mut [WorkflowStage]) {
        stages.sort_by_key(|s| (s.position, s.id));
    }
}
