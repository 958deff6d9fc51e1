//! Campaign Model

use serde::{Deserialize, Serialize};

/// An influencer marketing campaign, read-only from the board's perspective.
///
/// `status` stays a free string: its value set belongs to the campaign
/// management surface and the board only displays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub status: String,
}

impl Campaign {
    /// Stand-in for a campaign the applications reference but the campaigns
    /// collection does not contain (deleted, or not yet loaded).
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            title: "Campanha".to_string(),
            status: String::new(),
        }
    }
}
