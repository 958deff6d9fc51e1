use palco_client::ClientResult;
use shared::{ApplicationMetrics, ChatMessage, Deliverable, MetricsUpdate, WorkflowStage};
use tui_input::Input;
use validator::Validate;

use crate::committer::MoveRequest;
use crate::projection::Card;
use crate::resolver::resolve_column;

/// Lifecycle of a panel sub-resource.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Loadable<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed,
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// State of the opened card's detail panel. Deliverables and messages are
/// fetched per card and never cached across cards.
#[derive(Debug, Clone)]
pub struct DetailPanel {
    pub application_id: i64,
    pub deliverables: Loadable<Vec<Deliverable>>,
    pub messages: Loadable<Vec<ChatMessage>>,
}

impl DetailPanel {
    pub fn open(application_id: i64) -> Self {
        Self {
            application_id,
            deliverables: Loadable::Loading,
            messages: Loadable::Loading,
        }
    }

    /// Apply a deliverables response. Responses for a different card are
    /// stale leftovers from before a switch and are dropped.
    pub fn apply_deliverables(&mut self, application_id: i64, result: ClientResult<Vec<Deliverable>>) {
        if application_id != self.application_id {
            return;
        }
        self.deliverables = match result {
            Ok(items) => Loadable::Ready(items),
            Err(error) => {
                tracing::warn!(application_id, %error, "deliverable fetch failed");
                Loadable::Failed
            }
        };
    }

    pub fn apply_messages(&mut self, application_id: i64, result: ClientResult<Vec<ChatMessage>>) {
        if application_id != self.application_id {
            return;
        }
        self.messages = match result {
            Ok(items) => Loadable::Ready(items),
            Err(error) => {
                tracing::warn!(application_id, %error, "message fetch failed");
                Loadable::Failed
            }
        };
    }
}

/// Clicking a stage pill is the same move as a drag-and-drop. Returns
/// `None` when the card already sits in the target stage.
pub fn stage_pill_request(
    card: &Card,
    stages: &[WorkflowStage],
    target: &WorkflowStage,
) -> Option<MoveRequest> {
    let current = resolve_column(card.workflow_status(), stages)?;
    if current.stage().id == target.id {
        return None;
    }
    Some(MoveRequest {
        application_id: card.id(),
        target_stage: target.name.clone(),
    })
}

pub const METRIC_FIELDS: [&str; 4] = ["Views", "Likes", "Comentários", "Compartilhamentos"];

/// Editable metrics form backed by one input per metric. Validation runs
/// locally before any PATCH is issued.
#[derive(Debug, Clone, Default)]
pub struct MetricsForm {
    pub application_id: i64,
    pub inputs: [Input; 4],
    pub focus: usize,
    pub errors: Vec<String>,
}

impl MetricsForm {
    pub fn for_application(application_id: i64, metrics: Option<&ApplicationMetrics>) -> Self {
        let mut form = Self {
            application_id,
            ..Default::default()
        };
        if let Some(metrics) = metrics {
            let values = [metrics.views, metrics.likes, metrics.comments, metrics.shares];
            for (input, value) in form.inputs.iter_mut().zip(values) {
                *input = Input::new(value.to_string());
            }
        }
        form
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.inputs.len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + self.inputs.len() - 1) % self.inputs.len();
    }

    pub fn focused_input_mut(&mut self) -> &mut Input {
        &mut self.inputs[self.focus]
    }

    /// Parse the inputs into an update payload. Empty fields stay untouched
    /// on the server. On any invalid field the errors list is filled and no
    /// payload is produced.
    pub fn parse(&mut self) -> Option<MetricsUpdate> {
        self.errors.clear();
        let mut values: [Option<i64>; 4] = [None; 4];
        for (index, input) in self.inputs.iter().enumerate() {
            let raw = input.value().trim();
            if raw.is_empty() {
                continue;
            }
            match raw.parse::<i64>() {
                Ok(value) => values[index] = Some(value),
                Err(_) => self
                    .errors
                    .push(format!("{}: valor inválido", METRIC_FIELDS[index])),
            }
        }
        if !self.errors.is_empty() {
            return None;
        }

        let update = MetricsUpdate {
            views: values[0],
            likes: values[1],
            comments: values[2],
            shares: values[3],
        };
        if update.validate().is_err() {
            for (index, value) in values.iter().enumerate() {
                if value.is_some_and(|v| v < 0) {
                    self.errors
                        .push(format!("{}: deve ser um número não negativo", METRIC_FIELDS[index]));
                }
            }
            if self.errors.is_empty() {
                self.errors.push("métricas inválidas".to_string());
            }
            return None;
        }
        Some(update)
    }
}
