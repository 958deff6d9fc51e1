use std::sync::Arc;
use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use palco_client::ClientResult;
use ratatui::layout::{Position, Rect};
use shared::{ChatMessage, Deliverable};
use tokio::sync::mpsc;
use tui_input::backend::crossterm::EventHandler;
use tui_logger::{TuiWidgetEvent, TuiWidgetState};

use crate::committer::MoveRequest;
use crate::drag::{DragController, DragEffect, DragIntent, PointerSensor};
use crate::panel::{DetailPanel, MetricsForm, stage_pill_request};
use crate::store::{BoardSnapshot, BoardStore};

// Terminal cells approximated in pixels so the sensor thresholds keep
// their meaning for mouse gestures.
const CELL_WIDTH_PX: f32 = 8.0;
const CELL_HEIGHT_PX: f32 = 16.0;

fn to_pixels(column: u16, row: u16) -> (f32, f32) {
    (column as f32 * CELL_WIDTH_PX, row as f32 * CELL_HEIGHT_PX)
}

/// Which surface owns the keyboard.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Board,
    Panel,
    Metrics,
    Confirm,
}

/// Results of spawned work, delivered back to the UI loop.
enum AppEvent {
    MoveResolved {
        application_id: i64,
    },
    Deliverables {
        application_id: i64,
        result: ClientResult<Vec<Deliverable>>,
    },
    Messages {
        application_id: i64,
        result: ClientResult<Vec<ChatMessage>>,
    },
    MetricsSaved {
        application_id: i64,
        saved: bool,
    },
    CampaignDeleted {
        campaign_id: i64,
        deleted: bool,
    },
}

/// Top-level TUI state: the current snapshot, selection, drag machine and
/// whatever overlay is open.
pub struct App {
    store: Arc<BoardStore>,
    /// Board view rendered this frame
    pub snapshot: BoardSnapshot,
    /// Drag state machine
    pub drag: DragController,
    /// Mouse gesture sensor
    pub pointer: PointerSensor,
    pub mode: Mode,
    pub selected_column: usize,
    pub selected_card: usize,
    /// Stage pill highlighted inside the detail panel
    pub selected_pill: usize,
    pub panel: Option<DetailPanel>,
    pub metrics_form: Option<MetricsForm>,
    /// Campaign waiting for delete confirmation
    pub confirm_delete: Option<i64>,
    pub show_log: bool,
    /// Logger widget state
    pub logger_state: TuiWidgetState,
    /// Column hit zones from the last frame, for mouse targeting
    pub column_areas: Vec<(Rect, String)>,
    /// Card hit zones from the last frame
    pub card_areas: Vec<(Rect, i64, String)>,
    pub should_quit: bool,
    events_tx: mpsc::Sender<AppEvent>,
    events_rx: mpsc::Receiver<AppEvent>,
}

impl App {
    pub fn new(store: Arc<BoardStore>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(32);
        Self {
            store,
            snapshot: BoardSnapshot::default(),
            drag: DragController::new(),
            pointer: PointerSensor::new(),
            mode: Mode::Board,
            selected_column: 0,
            selected_card: 0,
            selected_pill: 0,
            panel: None,
            metrics_form: None,
            confirm_delete: None,
            show_log: false,
            logger_state: TuiWidgetState::new(),
            column_areas: Vec::new(),
            card_areas: Vec::new(),
            should_quit: false,
            events_tx,
            events_rx,
        }
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    /// Drain spawned-task results, expire toasts, refetch stale collections
    /// and rebuild the snapshot. Runs once per UI tick.
    pub fn tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
        self.store.toasts().expire(Instant::now());
        if self.store.needs_revalidation() {
            self.spawn_revalidate();
        }
        self.snapshot = self.store.snapshot();
        self.clamp_selection();
        self.close_panel_if_card_vanished();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::Board => self.handle_board_key(key),
            Mode::Panel => self.handle_panel_key(key),
            Mode::Metrics => self.handle_metrics_key(key),
            Mode::Confirm => self.handle_confirm_key(key),
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.spawn_refresh(),
            KeyCode::Char('f') => self.cycle_filter(),
            KeyCode::Char('l') => self.show_log = !self.show_log,
            KeyCode::Char('x') => self.request_delete(),
            KeyCode::Char('g') | KeyCode::Char(' ') if !self.drag.is_dragging() => {
                self.begin_keyboard_drag()
            }
            KeyCode::Char('o') if !self.drag.is_dragging() => self.open_panel(),
            KeyCode::Enter if self.drag.is_dragging() => self.apply_intent(DragIntent::Drop),
            KeyCode::Enter => self.open_panel(),
            KeyCode::Esc if self.drag.is_dragging() => self.apply_intent(DragIntent::Cancel),
            KeyCode::Left if self.drag.is_dragging() => self.hover_shift(-1),
            KeyCode::Right if self.drag.is_dragging() => self.hover_shift(1),
            KeyCode::Left => self.column_shift(-1),
            KeyCode::Right => self.column_shift(1),
            KeyCode::Up => self.card_shift(-1),
            KeyCode::Down => self.card_shift(1),
            KeyCode::PageUp => self.logger_state.transition(TuiWidgetEvent::PrevPageKey),
            KeyCode::PageDown => self.logger_state.transition(TuiWidgetEvent::NextPageKey),
            _ => {}
        }
    }

    fn handle_panel_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.close_panel(),
            KeyCode::Char('m') => self.open_metrics_form(),
            KeyCode::Left => self.selected_pill = self.selected_pill.saturating_sub(1),
            KeyCode::Right => {
                let last = self.snapshot.stages.len().saturating_sub(1);
                self.selected_pill = (self.selected_pill + 1).min(last);
            }
            KeyCode::Enter => self.commit_pill_move(),
            _ => {}
        }
    }

    fn handle_metrics_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.metrics_form = None;
                self.mode = Mode::Panel;
            }
            KeyCode::Tab | KeyCode::Down => {
                if let Some(form) = self.metrics_form.as_mut() {
                    form.next_field();
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if let Some(form) = self.metrics_form.as_mut() {
                    form.prev_field();
                }
            }
            KeyCode::Enter => self.submit_metrics_form(),
            _ => {
                if let Some(form) = self.metrics_form.as_mut() {
                    form.focused_input_mut().handle_event(&Event::Key(key));
                }
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(campaign_id) = self.confirm_delete.take() {
                    let store = self.store.clone();
                    let tx = self.events_tx.clone();
                    tokio::spawn(async move {
                        let deleted = store.delete_campaign(campaign_id).await;
                        tx.send(AppEvent::CampaignDeleted {
                            campaign_id,
                            deleted,
                        })
                        .await
                        .ok();
                    });
                }
                self.mode = Mode::Board;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.confirm_delete = None;
                self.mode = Mode::Board;
            }
            _ => {}
        }
    }

    /// Mouse gestures only drive the board surface; overlays are keyboard-only.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != Mode::Board {
            return;
        }
        let (x, y) = to_pixels(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((application_id, from_stage)) = self.card_at(mouse.column, mouse.row) {
                    self.select_card(application_id);
                    self.pointer.press(x, y, application_id, from_stage);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(intent) = self.pointer.movement(x, y) {
                    if let DragIntent::BeginDrag { application_id, .. } = &intent {
                        if !self.store.can_drag(*application_id) {
                            tracing::debug!(
                                application_id,
                                "card is mid-commit, drag rejected"
                            );
                            self.pointer.cancel();
                            return;
                        }
                    }
                    self.apply_intent(intent);
                }
                if self.drag.is_dragging() {
                    let stage = self.column_at(mouse.column, mouse.row);
                    self.apply_intent(DragIntent::Hover { stage });
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(intent) = self.pointer.release() {
                    self.apply_intent(intent);
                }
            }
            _ => {}
        }
    }

    fn apply_intent(&mut self, intent: DragIntent) {
        match self.drag.apply(intent) {
            DragEffect::Commit(request) => self.spawn_commit(request),
            DragEffect::None => {}
        }
    }

    fn spawn_commit(&self, request: MoveRequest) {
        let application_id = request.application_id;
        let store = self.store.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            store.commit_move(request).await;
            tx.send(AppEvent::MoveResolved { application_id }).await.ok();
        });
    }

    fn spawn_revalidate(&self) {
        let store = self.store.clone();
        tokio::spawn(async move { store.revalidate().await });
    }

    fn spawn_refresh(&self) {
        let store = self.store.clone();
        tokio::spawn(async move { store.refresh().await });
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::MoveResolved { application_id } => {
                self.drag.commit_resolved(application_id);
            }
            AppEvent::Deliverables {
                application_id,
                result,
            } => {
                if let Some(panel) = self.panel.as_mut() {
                    panel.apply_deliverables(application_id, result);
                }
            }
            AppEvent::Messages {
                application_id,
                result,
            } => {
                if let Some(panel) = self.panel.as_mut() {
                    panel.apply_messages(application_id, result);
                }
            }
            AppEvent::MetricsSaved {
                application_id,
                saved,
            } => {
                let matches_form = self
                    .metrics_form
                    .as_ref()
                    .is_some_and(|form| form.application_id == application_id);
                if saved && matches_form {
                    self.metrics_form = None;
                    if self.mode == Mode::Metrics {
                        self.mode = Mode::Panel;
                    }
                }
            }
            AppEvent::CampaignDeleted {
                campaign_id,
                deleted,
            } => {
                if deleted {
                    tracing::info!(campaign_id, "campaign removed from the board");
                }
            }
        }
    }

    /// Currently selected card's id and column stage name.
    pub fn selected(&self) -> Option<(i64, String)> {
        let columns = self.snapshot.columns();
        let column = columns.get(self.selected_column)?;
        let card = column.cards.get(self.selected_card)?;
        Some((card.id(), column.stage.name.clone()))
    }

    fn begin_keyboard_drag(&mut self) {
        let Some((application_id, from_stage)) = self.selected() else {
            return;
        };
        if !self.store.can_drag(application_id) {
            tracing::debug!(application_id, "card is mid-commit, drag rejected");
            return;
        }
        let hover = from_stage.clone();
        self.apply_intent(DragIntent::BeginDrag {
            application_id,
            from_stage,
        });
        self.apply_intent(DragIntent::Hover { stage: Some(hover) });
    }

    fn hover_shift(&mut self, delta: i64) {
        let stages: Vec<String> = self.snapshot.stages.iter().map(|s| s.name.clone()).collect();
        if stages.is_empty() {
            return;
        }
        let current = self
            .drag
            .hover_stage()
            .and_then(|name| stages.iter().position(|s| s == name));
        let next = match current {
            None => 0,
            Some(index) => (index as i64 + delta).rem_euclid(stages.len() as i64) as usize,
        };
        self.apply_intent(DragIntent::Hover {
            stage: Some(stages[next].clone()),
        });
    }

    fn column_shift(&mut self, delta: i64) {
        let count = self.snapshot.stages.len();
        if count == 0 {
            return;
        }
        self.selected_column =
            (self.selected_column as i64 + delta).rem_euclid(count as i64) as usize;
        self.selected_card = 0;
    }

    fn card_shift(&mut self, delta: i64) {
        let columns = self.snapshot.columns();
        let Some(column) = columns.get(self.selected_column) else {
            return;
        };
        let count = column.cards.len();
        if count == 0 {
            return;
        }
        self.selected_card = (self.selected_card as i64 + delta).rem_euclid(count as i64) as usize;
    }

    fn clamp_selection(&mut self) {
        let columns = self.snapshot.columns();
        if columns.is_empty() {
            self.selected_column = 0;
            self.selected_card = 0;
            return;
        }
        if self.selected_column >= columns.len() {
            self.selected_column = columns.len() - 1;
        }
        let cards = columns[self.selected_column].cards.len();
        if cards == 0 {
            self.selected_card = 0;
        } else if self.selected_card >= cards {
            self.selected_card = cards - 1;
        }
    }

    fn select_card(&mut self, application_id: i64) {
        let columns = self.snapshot.columns();
        for (column_index, column) in columns.iter().enumerate() {
            if let Some(card_index) = column.cards.iter().position(|c| c.id() == application_id) {
                self.selected_column = column_index;
                self.selected_card = card_index;
                return;
            }
        }
    }

    fn card_at(&self, column: u16, row: u16) -> Option<(i64, String)> {
        let position = Position::new(column, row);
        self.card_areas
            .iter()
            .find(|(area, _, _)| area.contains(position))
            .map(|(_, id, stage)| (*id, stage.clone()))
    }

    fn column_at(&self, column: u16, row: u16) -> Option<String> {
        let position = Position::new(column, row);
        self.column_areas
            .iter()
            .find(|(area, _)| area.contains(position))
            .map(|(_, stage)| stage.clone())
    }

    fn cycle_filter(&mut self) {
        let campaigns = self.store.campaigns();
        let next = match self.store.campaign_filter() {
            None => campaigns.first().map(|c| c.id),
            Some(current) => campaigns
                .iter()
                .position(|c| c.id == current)
                .and_then(|index| campaigns.get(index + 1))
                .map(|c| c.id),
        };
        self.store.set_campaign_filter(next);
    }

    fn request_delete(&mut self) {
        match self.store.campaign_filter() {
            Some(campaign_id) => {
                self.confirm_delete = Some(campaign_id);
                self.mode = Mode::Confirm;
            }
            None => self
                .store
                .toasts()
                .info("Filtre uma campanha com 'f' para excluir"),
        }
    }

    fn open_panel(&mut self) {
        let Some(application_id) = self.selected().map(|(id, _)| id) else {
            return;
        };
        self.panel = Some(DetailPanel::open(application_id));
        self.selected_pill = 0;
        self.mode = Mode::Panel;
        self.spawn_panel_fetches(application_id);
    }

    fn spawn_panel_fetches(&self, application_id: i64) {
        let store = self.store.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = store.fetch_deliverables(application_id).await;
            tx.send(AppEvent::Deliverables {
                application_id,
                result,
            })
            .await
            .ok();
        });

        let store = self.store.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = store.fetch_messages(application_id).await;
            tx.send(AppEvent::Messages {
                application_id,
                result,
            })
            .await
            .ok();
        });
    }

    fn close_panel(&mut self) {
        self.panel = None;
        self.metrics_form = None;
        self.mode = Mode::Board;
    }

    fn close_panel_if_card_vanished(&mut self) {
        let Some(panel) = &self.panel else {
            return;
        };
        let still_present = self
            .snapshot
            .cards
            .iter()
            .any(|card| card.id() == panel.application_id);
        if !still_present && matches!(self.mode, Mode::Panel | Mode::Metrics) {
            self.close_panel();
        }
    }

    fn commit_pill_move(&mut self) {
        let Some(panel) = &self.panel else {
            return;
        };
        let Some(card) = self
            .snapshot
            .cards
            .iter()
            .find(|c| c.id() == panel.application_id)
        else {
            return;
        };
        let Some(target) = self.snapshot.stages.get(self.selected_pill) else {
            return;
        };
        if !self.store.can_drag(card.id()) {
            return;
        }
        if let Some(request) = stage_pill_request(card, &self.snapshot.stages, target) {
            self.spawn_commit(request);
        }
    }

    fn open_metrics_form(&mut self) {
        let Some(panel) = &self.panel else {
            return;
        };
        let Some(card) = self
            .snapshot
            .cards
            .iter()
            .find(|c| c.id() == panel.application_id)
        else {
            return;
        };
        self.metrics_form = Some(MetricsForm::for_application(
            card.id(),
            card.application.metrics.as_ref(),
        ));
        self.mode = Mode::Metrics;
    }

    fn submit_metrics_form(&mut self) {
        let Some(form) = self.metrics_form.as_mut() else {
            return;
        };
        let Some(update) = form.parse() else {
            return;
        };
        let application_id = form.application_id;
        let store = self.store.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let saved = store.submit_metrics(application_id, update).await;
            tx.send(AppEvent::MetricsSaved {
                application_id,
                saved,
            })
            .await
            .ok();
        });
    }
}
