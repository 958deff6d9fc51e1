//! Mock marketplace backing the board integration tests.
//!
//! An axum router over in-memory fixture state, driven through the
//! in-process transport so no sockets are involved.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use palco_board::BoardStore;
use palco_client::{ClientResult, MarketplaceApi, OneshotHttpClient, RestMarketplace};
use parking_lot::Mutex;
use serde_json::json;
use shared::{
    Application, ApplicationMetrics, ApplicationStatus, Campaign, ChatMessage, Creator,
    Deliverable, MetricsUpdate, WorkflowStage, WorkflowStatusUpdate,
};
use tokio::sync::Notify;

pub type Shared = Arc<Mutex<MockState>>;

#[derive(Default)]
pub struct MockState {
    pub stages: Vec<WorkflowStage>,
    pub campaigns: Vec<Campaign>,
    pub applications: Vec<Application>,
    pub creators: Vec<Creator>,
    pub deliverables: HashMap<i64, Vec<Deliverable>>,
    pub messages: HashMap<i64, Vec<ChatMessage>>,
    /// Fail the next workflow-status PATCH with a 500, once.
    pub fail_next_status_patch: bool,
    pub fail_delete: bool,
    pub fail_metrics: bool,
    pub fail_stage_list: bool,
    /// Every accepted workflow-status PATCH as (application, stage name).
    pub patch_log: Vec<(i64, String)>,
    pub metrics_log: Vec<i64>,
}

pub fn stage(id: i64, name: &str, position: i32) -> WorkflowStage {
    WorkflowStage {
        id,
        company_id: 1,
        name: name.into(),
        position,
        color: None,
        is_default: position == 0,
    }
}

pub fn application(
    id: i64,
    campaign_id: i64,
    creator_id: i64,
    workflow_status: Option<&str>,
) -> Application {
    Application {
        id,
        campaign_id,
        creator_id,
        status: ApplicationStatus::Accepted,
        workflow_status: workflow_status.map(Into::into),
        creator_workflow_status: None,
        message: None,
        applied_at: None,
        metrics: None,
    }
}

/// Base fixture: three stages, two campaigns, two creators, two cards.
pub fn seed() -> MockState {
    let mut state = MockState {
        stages: vec![
            stage(1, "Aceito", 0),
            stage(2, "Produção", 1),
            stage(3, "Entregue", 2),
        ],
        campaigns: vec![
            Campaign {
                id: 10,
                title: "Lançamento Verão".into(),
                status: "active".into(),
            },
            Campaign {
                id: 11,
                title: "Especial Natal".into(),
                status: "active".into(),
            },
        ],
        creators: vec![
            Creator {
                id: 100,
                name: "Ana Souza".into(),
                email: Some("ana@example.com".into()),
                avatar: None,
                instagram: Some("ana.souza".into()),
            },
            Creator {
                id: 101,
                name: "Bruno Lima".into(),
                email: None,
                avatar: None,
                instagram: None,
            },
        ],
        applications: vec![
            application(1, 10, 100, None),
            application(2, 11, 101, Some("Produção")),
        ],
        ..Default::default()
    };
    state.deliverables.insert(
        1,
        vec![Deliverable {
            id: 50,
            application_id: 1,
            title: "Reels de lançamento".into(),
            description: Some("1 vídeo de 30s".into()),
            status: "pending".into(),
            due_date: None,
        }],
    );
    state.messages.insert(
        1,
        vec![ChatMessage {
            id: 70,
            application_id: 1,
            sender: "company".into(),
            content: "Bem-vinda à campanha!".into(),
            created_at: None,
        }],
    );
    state
}

pub fn router(state: Shared) -> Router {
    Router::new()
        .route(
            "/api/companies/{company_id}/workflow-stages",
            get(list_stages),
        )
        .route("/api/campaigns", get(list_campaigns))
        .route("/api/campaigns/{id}", delete(remove_campaign))
        .route("/api/applications", get(list_applications))
        .route("/api/creators", get(list_creators))
        .route(
            "/api/applications/{id}/workflow-status-company",
            patch(patch_workflow_status),
        )
        .route("/api/applications/{id}/deliverables", get(list_deliverables))
        .route("/api/applications/{id}/messages", get(list_messages))
        .route("/api/applications/{id}/metrics", patch(patch_metrics))
        .with_state(state)
}

/// A store wired to the mock through the in-process transport.
pub fn board(state: MockState) -> (Arc<BoardStore>, Shared) {
    let shared: Shared = Arc::new(Mutex::new(state));
    let transport = OneshotHttpClient::new(router(shared.clone()));
    let api: Arc<dyn MarketplaceApi> = Arc::new(RestMarketplace::new(transport));
    (Arc::new(BoardStore::new(api, 1)), shared)
}

/// Like [`board`], but workflow-status PATCHes block until released, so a
/// test can observe the in-flight window.
pub fn gated_board(state: MockState) -> (Arc<BoardStore>, Shared, Arc<Notify>, Arc<Notify>) {
    let shared: Shared = Arc::new(Mutex::new(state));
    let transport = OneshotHttpClient::new(router(shared.clone()));
    let inner: Arc<dyn MarketplaceApi> = Arc::new(RestMarketplace::new(transport));
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let api: Arc<dyn MarketplaceApi> = Arc::new(GatedApi {
        inner,
        entered: entered.clone(),
        release: release.clone(),
    });
    (Arc::new(BoardStore::new(api, 1)), shared, entered, release)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn list_stages(State(state): State<Shared>, Path(company_id): Path<i64>) -> Response {
    let state = state.lock();
    if state.fail_stage_list {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno");
    }
    let stages: Vec<WorkflowStage> = state
        .stages
        .iter()
        .filter(|s| s.company_id == company_id)
        .cloned()
        .collect();
    Json(stages).into_response()
}

async fn list_campaigns(State(state): State<Shared>) -> Json<Vec<Campaign>> {
    Json(state.lock().campaigns.clone())
}

async fn list_applications(State(state): State<Shared>) -> Json<Vec<Application>> {
    Json(state.lock().applications.clone())
}

async fn list_creators(State(state): State<Shared>) -> Json<Vec<Creator>> {
    Json(state.lock().creators.clone())
}

async fn list_deliverables(State(state): State<Shared>, Path(id): Path<i64>) -> Json<Vec<Deliverable>> {
    Json(state.lock().deliverables.get(&id).cloned().unwrap_or_default())
}

async fn list_messages(State(state): State<Shared>, Path(id): Path<i64>) -> Json<Vec<ChatMessage>> {
    Json(state.lock().messages.get(&id).cloned().unwrap_or_default())
}

async fn patch_workflow_status(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(update): Json<WorkflowStatusUpdate>,
) -> Response {
    let mut state = state.lock();
    if state.fail_next_status_patch {
        state.fail_next_status_patch = false;
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno");
    }
    state.patch_log.push((id, update.workflow_status.clone()));
    match state.applications.iter_mut().find(|a| a.id == id) {
        Some(application) => {
            application.workflow_status = Some(update.workflow_status);
            Json(application.clone()).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "Application not found"),
    }
}

async fn patch_metrics(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(update): Json<MetricsUpdate>,
) -> Response {
    let mut state = state.lock();
    if state.fail_metrics {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno");
    }
    state.metrics_log.push(id);
    match state.applications.iter_mut().find(|a| a.id == id) {
        Some(application) => {
            let metrics = application
                .metrics
                .get_or_insert_with(ApplicationMetrics::default);
            if let Some(views) = update.views {
                metrics.views = views;
            }
            if let Some(likes) = update.likes {
                metrics.likes = likes;
            }
            if let Some(comments) = update.comments {
                metrics.comments = comments;
            }
            if let Some(shares) = update.shares {
                metrics.shares = shares;
            }
            Json(application.clone()).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "Application not found"),
    }
}

async fn remove_campaign(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut state = state.lock();
    if state.fail_delete {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno");
    }
    if !state.campaigns.iter().any(|c| c.id == id) {
        return error_response(StatusCode::NOT_FOUND, "Campaign not found");
    }
    state.campaigns.retain(|c| c.id != id);
    // The marketplace cascades: applications of a deleted campaign go too.
    state.applications.retain(|a| a.campaign_id != id);
    StatusCode::NO_CONTENT.into_response()
}

/// Wrapper that parks workflow-status PATCHes between two notifications:
/// `entered` fires when the call arrives, `release` lets it proceed.
pub struct GatedApi {
    pub inner: Arc<dyn MarketplaceApi>,
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[async_trait]
impl MarketplaceApi for GatedApi {
    async fn workflow_stages(&self, company_id: i64) -> ClientResult<Vec<WorkflowStage>> {
        self.inner.workflow_stages(company_id).await
    }

    async fn campaigns(&self) -> ClientResult<Vec<Campaign>> {
        self.inner.campaigns().await
    }

    async fn applications(&self) -> ClientResult<Vec<Application>> {
        self.inner.applications().await
    }

    async fn creators(&self) -> ClientResult<Vec<Creator>> {
        self.inner.creators().await
    }

    async fn update_workflow_status(
        &self,
        application_id: i64,
        update: WorkflowStatusUpdate,
    ) -> ClientResult<Application> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.update_workflow_status(application_id, update).await
    }

    async fn deliverables(&self, application_id: i64) -> ClientResult<Vec<Deliverable>> {
        self.inner.deliverables(application_id).await
    }

    async fn messages(&self, application_id: i64) -> ClientResult<Vec<ChatMessage>> {
        self.inner.messages(application_id).await
    }

    async fn update_metrics(
        &self,
        application_id: i64,
        update: MetricsUpdate,
    ) -> ClientResult<Application> {
        self.inner.update_metrics(application_id, update).await
    }

    async fn delete_campaign(&self, campaign_id: i64) -> ClientResult<()> {
        self.inner.delete_campaign(campaign_id).await
    }
}
