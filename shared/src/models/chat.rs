//! Chat Message Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message exchanged between company and creator about an application.
///
/// Fetched only while that application's detail panel is open. `sender` is
/// a free string ("company"/"creator" as of today) because the chat surface
/// owns its vocabulary and the panel only displays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub application_id: i64,
    pub sender: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}
