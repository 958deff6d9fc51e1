use std::sync::Arc;

use palco_client::{ClientResult, MarketplaceApi};
use parking_lot::RwLock;
use shared::{Campaign, ChatMessage, Deliverable, MetricsUpdate, WorkflowStage};
use validator::Validate;

use crate::cache::{CollectionKey, ResourceCache};
use crate::committer::{MoveCommitter, MoveOutcome, MoveRequest};
use crate::notify::ToastQueue;
use crate::projection::{Card, project_cards};
use crate::resolver::{BoardColumn, bucket_cards};

pub const DELETE_CAMPAIGN_FAILED_TOAST: &str = "Não foi possível excluir a campanha";
pub const METRICS_SAVED_TOAST: &str = "Métricas atualizadas";
pub const METRICS_FAILED_TOAST: &str = "Não foi possível salvar as métricas";

/// Owned, render-ready view of the board at one instant.
#[derive(Debug, Clone, Default)]
pub struct BoardSnapshot {
    pub stages: Vec<WorkflowStage>,
    pub cards: Vec<Card>,
}

impl BoardSnapshot {
    pub fn columns(&self) -> Vec<BoardColumn<'_>> {
        bucket_cards(&self.stages, &self.cards)
    }
}

/// Orchestrates fetches from the marketplace API into the cache and exposes
/// the board's mutations. The server is the source of truth: every mutation
/// invalidates and refetches instead of patching cached data.
pub struct BoardStore {
    api: Arc<dyn MarketplaceApi>,
    cache: Arc<ResourceCache>,
    toasts: Arc<ToastQueue>,
    committer: MoveCommitter,
    company_id: i64,
    campaign_filter: RwLock<Option<i64>>,
}

impl BoardStore {
    pub fn new(api: Arc<dyn MarketplaceApi>, company_id: i64) -> Self {
        let cache = Arc::new(ResourceCache::new());
        let toasts = Arc::new(ToastQueue::new());
        let committer = MoveCommitter::new(api.clone(), cache.clone(), toasts.clone());
        Self {
            api,
            cache,
            toasts,
            committer,
            company_id,
            campaign_filter: RwLock::new(None),
        }
    }

    pub fn company_id(&self) -> i64 {
        self.company_id
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    /// Fetch every collection the cache marked stale.
    pub async fn revalidate(&self) {
        futures::join!(
            self.refresh_stages(),
            self.refresh_campaigns(),
            self.refresh_applications(),
            self.refresh_creators(),
        );
    }

    /// Manual refresh: drop freshness everywhere and refetch.
    pub async fn refresh(&self) {
        self.cache.invalidate_all();
        self.revalidate().await;
    }

    pub fn needs_revalidation(&self) -> bool {
        self.cache.needs_fetch(CollectionKey::WorkflowStages)
            || self.cache.needs_fetch(CollectionKey::Campaigns)
            || self.cache.needs_fetch(CollectionKey::Applications)
            || self.cache.needs_fetch(CollectionKey::Creators)
    }

    async fn refresh_stages(&self) {
        let Some(token) = self.cache.begin_load(CollectionKey::WorkflowStages) else {
            return;
        };
        match self.api.workflow_stages(self.company_id).await {
            Ok(stages) => self.cache.store_stages(&token, stages),
            Err(error) => {
                tracing::warn!(company_id = self.company_id, %error, "workflow stage fetch failed");
                self.cache.fail_load(&token, error.to_string());
            }
        }
    }

    async fn refresh_campaigns(&self) {
        let Some(token) = self.cache.begin_load(CollectionKey::Campaigns) else {
            return;
        };
        match self.api.campaigns().await {
            Ok(campaigns) => self.cache.store_campaigns(&token, campaigns),
            Err(error) => {
                tracing::warn!(%error, "campaign fetch failed");
                self.cache.fail_load(&token, error.to_string());
            }
        }
    }

    async fn refresh_applications(&self) {
        let Some(token) = self.cache.begin_load(CollectionKey::Applications) else {
            return;
        };
        match self.api.applications().await {
            Ok(applications) => self.cache.store_applications(&token, applications),
            Err(error) => {
                tracing::warn!(%error, "application fetch failed");
                self.cache.fail_load(&token, error.to_string());
            }
        }
    }

    async fn refresh_creators(&self) {
        let Some(token) = self.cache.begin_load(CollectionKey::Creators) else {
            return;
        };
        match self.api.creators().await {
            Ok(creators) => self.cache.store_creators(&token, creators),
            Err(error) => {
                tracing::warn!(%error, "creator fetch failed");
                self.cache.fail_load(&token, error.to_string());
            }
        }
    }

    /// Project the cached collections into cards, honoring the campaign
    /// filter. Pure over the current cache contents.
    pub fn snapshot(&self) -> BoardSnapshot {
        let stages = self.cache.stages();
        let applications = self.cache.applications();
        let campaigns = self.cache.campaigns();
        let creators = self.cache.creators();

        let mut cards = project_cards(&applications, &campaigns, &creators);
        if let Some(campaign_id) = *self.campaign_filter.read() {
            cards.retain(|card| card.campaign_id() == campaign_id);
        }
        BoardSnapshot { stages, cards }
    }

    pub fn campaigns(&self) -> Vec<Campaign> {
        self.cache.campaigns()
    }

    pub fn set_campaign_filter(&self, campaign_id: Option<i64>) {
        *self.campaign_filter.write() = campaign_id;
    }

    pub fn campaign_filter(&self) -> Option<i64> {
        *self.campaign_filter.read()
    }

    pub async fn commit_move(&self, request: MoveRequest) -> MoveOutcome {
        self.committer.commit(request).await
    }

    pub fn is_moving(&self, application_id: i64) -> bool {
        self.committer.is_moving(application_id)
    }

    /// A card accepts a new drag unless its own commit is still in flight.
    pub fn can_drag(&self, application_id: i64) -> bool {
        !self.committer.is_moving(application_id)
    }

    pub async fn delete_campaign(&self, campaign_id: i64) -> bool {
        match self.api.delete_campaign(campaign_id).await {
            Ok(()) => {
                tracing::debug!(campaign_id, "campaign deleted");
                {
                    let mut filter = self.campaign_filter.write();
                    if *filter == Some(campaign_id) {
                        *filter = None;
                    }
                }
                self.cache.invalidate(CollectionKey::Campaigns);
                self.cache.invalidate(CollectionKey::Applications);
                true
            }
            Err(error) => {
                tracing::error!(campaign_id, %error, "campaign deletion failed");
                self.toasts.error(DELETE_CAMPAIGN_FAILED_TOAST);
                false
            }
        }
    }

    pub async fn submit_metrics(&self, application_id: i64, update: MetricsUpdate) -> bool {
        if let Err(error) = update.validate() {
            tracing::warn!(application_id, %error, "metrics payload rejected locally");
            return false;
        }
        match self.api.update_metrics(application_id, update).await {
            Ok(_) => {
                tracing::debug!(application_id, "metrics saved");
                self.toasts.info(METRICS_SAVED_TOAST);
                self.cache.invalidate(CollectionKey::Applications);
                true
            }
            Err(error) => {
                tracing::error!(application_id, %error, "metrics update failed");
                self.toasts.error(METRICS_FAILED_TOAST);
                false
            }
        }
    }

    pub async fn fetch_deliverables(&self, application_id: i64) -> ClientResult<Vec<Deliverable>> {
        self.api.deliverables(application_id).await
    }

    pub async fn fetch_messages(&self, application_id: i64) -> ClientResult<Vec<ChatMessage>> {
        self.api.messages(application_id).await
    }
}

impl std::fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardStore")
            .field("company_id", &self.company_id)
            .field("cache", &self.cache)
            .field("campaign_filter", &*self.campaign_filter.read())
            .finish()
    }
}
