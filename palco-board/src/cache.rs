use parking_lot::RwLock;
use shared::{Application, Campaign, Creator, WorkflowStage};

/// Cached collection identifier, used as the invalidation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    WorkflowStages,
    Campaigns,
    Applications,
    Creators,
}

/// Ticket for an in-flight fetch. Captures the slot epoch at the time the
/// load began so results landing after an invalidation do not clear staleness.
#[derive(Debug, Clone, Copy)]
pub struct LoadToken {
    key: CollectionKey,
    epoch: u64,
}

impl LoadToken {
    pub fn key(&self) -> CollectionKey {
        self.key
    }
}

struct Slot<T> {
    data: Option<T>,
    stale: bool,
    loading: bool,
    epoch: u64,
    last_error: Option<String>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            data: None,
            stale: true,
            loading: false,
            epoch: 0,
            last_error: None,
        }
    }
}

impl<T> Slot<T> {
    fn invalidate(&mut self) {
        self.stale = true;
        self.epoch += 1;
    }

    fn needs_fetch(&self) -> bool {
        self.stale && !self.loading
    }

    fn begin(&mut self) -> u64 {
        self.loading = true;
        self.epoch
    }

    /// Store fetched data. Staleness only clears when no invalidation
    /// arrived while the fetch was in flight.
    fn complete(&mut self, epoch: u64, data: T) {
        self.data = Some(data);
        self.loading = false;
        self.last_error = None;
        if self.epoch == epoch {
            self.stale = false;
        }
    }

    /// Record a failed fetch. The slot settles unless a newer invalidation
    /// arrived mid-flight; failures alone never queue a retry.
    fn fail(&mut self, epoch: u64, error: String) {
        self.loading = false;
        self.last_error = Some(error);
        if self.epoch == epoch {
            self.stale = false;
        }
    }
}

/// Shared read cache for the board collections.
///
/// Readers always get the last stored data, stale or not. Writers are the
/// fetch tasks; they must hold a [`LoadToken`] from [`begin_load`] so that
/// invalidations arriving during a fetch keep the slot marked for refetch.
///
/// [`begin_load`]: ResourceCache::begin_load
#[derive(Default)]
pub struct ResourceCache {
    stages: RwLock<Slot<Vec<WorkflowStage>>>,
    campaigns: RwLock<Slot<Vec<Campaign>>>,
    applications: RwLock<Slot<Vec<Application>>>,
    creators: RwLock<Slot<Vec<Creator>>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a collection stale so the next revalidation pass refetches it.
    pub fn invalidate(&self, key: CollectionKey) {
        match key {
            CollectionKey::WorkflowStages => self.stages.write().invalidate(),
            CollectionKey::Campaigns => self.campaigns.write().invalidate(),
            CollectionKey::Applications => self.applications.write().invalidate(),
            CollectionKey::Creators => self.creators.write().invalidate(),
        }
    }

    pub fn invalidate_all(&self) {
        self.invalidate(CollectionKey::WorkflowStages);
        self.invalidate(CollectionKey::Campaigns);
        self.invalidate(CollectionKey::Applications);
        self.invalidate(CollectionKey::Creators);
    }

    pub fn needs_fetch(&self, key: CollectionKey) -> bool {
        match key {
            CollectionKey::WorkflowStages => self.stages.read().needs_fetch(),
            CollectionKey::Campaigns => self.campaigns.read().needs_fetch(),
            CollectionKey::Applications => self.applications.read().needs_fetch(),
            CollectionKey::Creators => self.creators.read().needs_fetch(),
        }
    }

    /// Claim a collection for fetching. Returns `None` when the slot is
    /// fresh or another fetch already holds it.
    pub fn begin_load(&self, key: CollectionKey) -> Option<LoadToken> {
        let epoch = match key {
            CollectionKey::WorkflowStages => {
                let mut slot = self.stages.write();
                if !slot.needs_fetch() {
                    return None;
                }
                slot.begin()
            }
            CollectionKey::Campaigns => {
                let mut slot = self.campaigns.write();
                if !slot.needs_fetch() {
                    return None;
                }
                slot.begin()
            }
            CollectionKey::Applications => {
                let mut slot = self.applications.write();
                if !slot.needs_fetch() {
                    return None;
                }
                slot.begin()
            }
            CollectionKey::Creators => {
                let mut slot = self.creators.write();
                if !slot.needs_fetch() {
                    return None;
                }
                slot.begin()
            }
        };
        Some(LoadToken { key, epoch })
    }

    pub fn store_stages(&self, token: &LoadToken, mut stages: Vec<WorkflowStage>) {
        WorkflowStage::sort_registry(&mut stages);
        self.stages.write().complete(token.epoch, stages);
    }

    pub fn store_campaigns(&self, token: &LoadToken, campaigns: Vec<Campaign>) {
        self.campaigns.write().complete(token.epoch, campaigns);
    }

    pub fn store_applications(&self, token: &LoadToken, applications: Vec<Application>) {
        self.applications.write().complete(token.epoch, applications);
    }

    pub fn store_creators(&self, token: &LoadToken, creators: Vec<Creator>) {
        self.creators.write().complete(token.epoch, creators);
    }

    pub fn fail_load(&self, token: &LoadToken, error: impl Into<String>) {
        let error = error.into();
        match token.key {
            CollectionKey::WorkflowStages => self.stages.write().fail(token.epoch, error),
            CollectionKey::Campaigns => self.campaigns.write().fail(token.epoch, error),
            CollectionKey::Applications => self.applications.write().fail(token.epoch, error),
            CollectionKey::Creators => self.creators.write().fail(token.epoch, error),
        }
    }

    pub fn stages(&self) -> Vec<WorkflowStage> {
        self.stages.read().data.clone().unwrap_or_default()
    }

    pub fn campaigns(&self) -> Vec<Campaign> {
        self.campaigns.read().data.clone().unwrap_or_default()
    }

    pub fn applications(&self) -> Vec<Application> {
        self.applications.read().data.clone().unwrap_or_default()
    }

    pub fn creators(&self) -> Vec<Creator> {
        self.creators.read().data.clone().unwrap_or_default()
    }

    pub fn is_loading(&self, key: CollectionKey) -> bool {
        match key {
            CollectionKey::WorkflowStages => self.stages.read().loading,
            CollectionKey::Campaigns => self.campaigns.read().loading,
            CollectionKey::Applications => self.applications.read().loading,
            CollectionKey::Creators => self.creators.read().loading,
        }
    }

    pub fn last_error(&self, key: CollectionKey) -> Option<String> {
        match key {
            CollectionKey::WorkflowStages => self.stages.read().last_error.clone(),
            CollectionKey::Campaigns => self.campaigns.read().last_error.clone(),
            CollectionKey::Applications => self.applications.read().last_error.clone(),
            CollectionKey::Creators => self.creators.read().last_error.clone(),
        }
    }
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("stages", &self.stages.read().data.as_ref().map_or(0, Vec::len))
            .field(
                "campaigns",
                &self.campaigns.read().data.as_ref().map_or(0, Vec::len),
            )
            .field(
                "applications",
                &self.applications.read().data.as_ref().map_or(0, Vec::len),
            )
            .field(
                "creators",
                &self.creators.read().data.as_ref().map_or(0, Vec::len),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: i64, position: i32) -> WorkflowStage {
        WorkflowStage {
            id,
            company_id: 1,
            name: format!("Etapa {id}"),
            position,
            color: None,
            is_default: false,
        }
    }

    #[test]
    fn fresh_cache_wants_every_collection() {
        let cache = ResourceCache::new();
        assert!(cache.needs_fetch(CollectionKey::WorkflowStages));
        assert!(cache.needs_fetch(CollectionKey::Applications));
        assert!(cache.stages().is_empty());
    }

    #[test]
    fn begin_load_claims_the_slot_once() {
        let cache = ResourceCache::new();
        let token = cache.begin_load(CollectionKey::Campaigns);
        assert!(token.is_some());
        assert!(cache.begin_load(CollectionKey::Campaigns).is_none());
        assert!(cache.is_loading(CollectionKey::Campaigns));

        cache.store_campaigns(&token.unwrap(), vec![Campaign::placeholder(7)]);
        assert!(!cache.needs_fetch(CollectionKey::Campaigns));
        assert_eq!(cache.campaigns().len(), 1);
    }

    #[test]
    fn invalidation_during_load_keeps_slot_stale() {
        let cache = ResourceCache::new();
        let token = cache.begin_load(CollectionKey::Applications).unwrap();
        cache.invalidate(CollectionKey::Applications);
        cache.store_applications(&token, vec![]);

        // Data is served, but the slot still wants a refetch.
        assert!(cache.needs_fetch(CollectionKey::Applications));

        let token = cache.begin_load(CollectionKey::Applications).unwrap();
        cache.store_applications(&token, vec![]);
        assert!(!cache.needs_fetch(CollectionKey::Applications));
    }

    #[test]
    fn failed_load_settles_without_retry() {
        let cache = ResourceCache::new();
        let token = cache.begin_load(CollectionKey::Creators).unwrap();
        cache.fail_load(&token, "connection refused");

        assert!(!cache.needs_fetch(CollectionKey::Creators));
        assert!(cache.creators().is_empty());
        assert_eq!(
            cache.last_error(CollectionKey::Creators).as_deref(),
            Some("connection refused")
        );
    }

    #[test]
    fn invalidation_survives_a_failed_load() {
        let cache = ResourceCache::new();
        let token = cache.begin_load(CollectionKey::Applications).unwrap();
        cache.invalidate(CollectionKey::Applications);
        cache.fail_load(&token, "timeout");

        assert!(cache.needs_fetch(CollectionKey::Applications));
    }

    #[test]
    fn stage_registry_is_sorted_on_store() {
        let cache = ResourceCache::new();
        let token = cache.begin_load(CollectionKey::WorkflowStages).unwrap();
        cache.store_stages(&token, vec![stage(3, 2), stage(1, 0), stage(2, 1)]);

        let positions: Vec<i32> = cache.stages().iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }
}
