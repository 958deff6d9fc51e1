//! Typed marketplace API surface

use async_trait::async_trait;
use shared::models::{
    Application, Campaign, ChatMessage, Creator, Deliverable, MetricsUpdate, WorkflowStage,
    WorkflowStatusUpdate,
};

use crate::ClientResult;
use crate::http::HttpClient;

/// The marketplace operations the workflow board consumes.
///
/// Object-safe on purpose: the board engine holds `Arc<dyn MarketplaceApi>`
/// so tests can substitute fakes without touching HTTP at all.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Ordered stage registry for a company.
    async fn workflow_stages(&self, company_id: i64) -> ClientResult<Vec<WorkflowStage>>;

    /// Campaigns of the current company.
    async fn campaigns(&self) -> ClientResult<Vec<Campaign>>;

    /// All applications visible to the current company.
    async fn applications(&self) -> ClientResult<Vec<Application>>;

    /// Creators referenced by the applications.
    async fn creators(&self) -> ClientResult<Vec<Creator>>;

    /// Commit a stage move; returns the updated application.
    async fn update_workflow_status(
        &self,
        application_id: i64,
        update: WorkflowStatusUpdate,
    ) -> ClientResult<Application>;

    /// Deliverables of one application (detail panel).
    async fn deliverables(&self, application_id: i64) -> ClientResult<Vec<Deliverable>>;

    /// Chat messages of one application (detail panel).
    async fn messages(&self, application_id: i64) -> ClientResult<Vec<ChatMessage>>;

    /// Save the metrics form; returns the updated application.
    async fn update_metrics(
        &self,
        application_id: i64,
        update: MetricsUpdate,
    ) -> ClientResult<Application>;

    /// Delete a campaign.
    async fn delete_campaign(&self, campaign_id: i64) -> ClientResult<()>;
}

/// REST implementation of [`MarketplaceApi`] over any transport.
#[derive(Debug, Clone)]
pub struct RestMarketplace<C> {
    http: C,
}

impl<C: HttpClient> RestMarketplace<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }

    /// Access the underlying transport.
    pub fn transport(&self) -> &C {
        &self.http
    }
}

#[async_trait]
impl<C: HttpClient> MarketplaceApi for RestMarketplace<C> {
    async fn workflow_stages(&self, company_id: i64) -> ClientResult<Vec<WorkflowStage>> {
        self.http
            .get(&format!("/api/companies/{company_id}/workflow-stages"))
            .await
    }

    async fn campaigns(&self) -> ClientResult<Vec<Campaign>> {
        self.http.get("/api/campaigns").await
    }

    async fn applications(&self) -> ClientResult<Vec<Application>> {
        self.http.get("/api/applications").await
    }

    async fn creators(&self) -> ClientResult<Vec<Creator>> {
        self.http.get("/api/creators").await
    }

    async fn update_workflow_status(
        &self,
        application_id: i64,
        update: WorkflowStatusUpdate,
    ) -> ClientResult<Application> {
        tracing::debug!(
            application_id,
            workflow_status = %update.workflow_status,
            "patching workflow status"
        );
        self.http
            .patch(
                &format!("/api/applications/{application_id}/workflow-status-company"),
                &update,
            )
            .await
    }

    async fn deliverables(&self, application_id: i64) -> ClientResult<Vec<Deliverable>> {
        self.http
            .get(&format!("/api/applications/{application_id}/deliverables"))
            .await
    }

    async fn messages(&self, application_id: i64) -> ClientResult<Vec<ChatMessage>> {
        self.http
            .get(&format!("/api/applications/{application_id}/messages"))
            .await
    }

    async fn update_metrics(
        &self,
        application_id: i64,
        update: MetricsUpdate,
    ) -> ClientResult<Application> {
        tracing::debug!(application_id, "patching metrics");
        self.http
            .patch(&format!("/api/applications/{application_id}/metrics"), &update)
            .await
    }

    async fn delete_campaign(&self, campaign_id: i64) -> ClientResult<()> {
        tracing::debug!(campaign_id, "deleting campaign");
        self.http
            .delete(&format!("/api/campaigns/{campaign_id}"))
            .await
    }
}
