use std::collections::HashMap;

use shared::{Application, Campaign, Creator};

/// One board card: an accepted application joined with its campaign and creator.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub application: Application,
    pub campaign: Campaign,
    pub creator: Creator,
}

impl Card {
    pub fn id(&self) -> i64 {
        self.application.id
    }

    pub fn campaign_id(&self) -> i64 {
        self.application.campaign_id
    }

    pub fn workflow_status(&self) -> Option<&str> {
        self.application.workflow_status.as_deref()
    }
}

/// Join accepted applications with their campaign and creator records.
///
/// Applications referencing a campaign or creator that is not (yet) in the
/// cache get a placeholder instead of being dropped, so a half-loaded cache
/// still renders every accepted application. Input order is preserved.
pub fn project_cards(
    applications: &[Application],
    campaigns: &[Campaign],
    creators: &[Creator],
) -> Vec<Card> {
    let campaigns_by_id: HashMap<i64, &Campaign> = campaigns.iter().map(|c| (c.id, c)).collect();
    let creators_by_id: HashMap<i64, &Creator> = creators.iter().map(|c| (c.id, c)).collect();

    applications
        .iter()
        .filter(|app| app.is_accepted())
        .map(|app| Card {
            application: app.clone(),
            campaign: campaigns_by_id
                .get(&app.campaign_id)
                .map(|c| (*c).clone())
                .unwrap_or_else(|| Campaign::placeholder(app.campaign_id)),
            creator: creators_by_id
                .get(&app.creator_id)
                .map(|c| (*c).clone())
                .unwrap_or_else(|| Creator::placeholder(app.creator_id)),
        })
        .collect()
}
