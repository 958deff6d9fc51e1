use std::collections::HashSet;
use std::sync::Arc;

use palco_client::MarketplaceApi;
use parking_lot::Mutex;
use shared::WorkflowStatusUpdate;

use crate::cache::{CollectionKey, ResourceCache};
use crate::notify::ToastQueue;

/// Confirmation toast shown when a stage move persists.
pub const MOVE_SAVED_TOAST: &str = "Status atualizado";
/// Error toast shown when a stage move does not persist.
pub const MOVE_FAILED_TOAST: &str = "Não foi possível atualizar o status";

/// A requested stage move, produced by the drag machine or a stage pill.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRequest {
    pub application_id: i64,
    pub target_stage: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Committed,
    AlreadyInFlight,
    Failed,
}

/// Persists stage moves, one in-flight commit per card.
///
/// There is no optimistic update: a successful PATCH invalidates the
/// applications collection and lets the refetch move the card. The server
/// response is logged, never written into the cache.
pub struct MoveCommitter {
    api: Arc<dyn MarketplaceApi>,
    cache: Arc<ResourceCache>,
    toasts: Arc<ToastQueue>,
    in_flight: Mutex<HashSet<i64>>,
}

impl MoveCommitter {
    pub fn new(api: Arc<dyn MarketplaceApi>, cache: Arc<ResourceCache>, toasts: Arc<ToastQueue>) -> Self {
        Self {
            api,
            cache,
            toasts,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Whether a commit for this card is still in flight.
    pub fn is_moving(&self, application_id: i64) -> bool {
        self.in_flight.lock().contains(&application_id)
    }

    pub async fn commit(&self, request: MoveRequest) -> MoveOutcome {
        let MoveRequest {
            application_id,
            target_stage,
        } = request;

        if !self.in_flight.lock().insert(application_id) {
            tracing::debug!(application_id, "move ignored, commit already in flight");
            return MoveOutcome::AlreadyInFlight;
        }

        let update = WorkflowStatusUpdate::new(target_stage.clone());
        let result = self.api.update_workflow_status(application_id, update).await;
        self.in_flight.lock().remove(&application_id);

        match result {
            Ok(confirmed) => {
                tracing::debug!(
                    application_id,
                    confirmed = ?confirmed.workflow_status,
                    "workflow status committed"
                );
                self.toasts.info(MOVE_SAVED_TOAST);
                self.cache.invalidate(CollectionKey::Applications);
                MoveOutcome::Committed
            }
            Err(error) => {
                tracing::error!(application_id, %target_stage, %error, "workflow status commit failed");
                self.toasts.error(MOVE_FAILED_TOAST);
                MoveOutcome::Failed
            }
        }
    }
}

impl std::fmt::Debug for MoveCommitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveCommitter")
            .field("in_flight", &self.in_flight.lock().len())
            .finish()
    }
}
