//! Deliverable Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A piece of content a creator owes for an application.
///
/// Fetched only while that application's detail panel is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deliverable {
    pub id: i64,
    pub application_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
}
