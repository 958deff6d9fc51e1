use std::time::{Duration, Instant};

use crate::committer::MoveRequest;

/// Pointer travel, in pixels, before a press becomes a drag.
pub const POINTER_ACTIVATION_DISTANCE: f32 = 8.0;
/// How long a touch must hold still before it becomes a drag.
pub const TOUCH_HOLD_DELAY: Duration = Duration::from_millis(200);
/// Touch slop allowed during the hold delay, in pixels.
pub const TOUCH_HOLD_TOLERANCE: f32 = 5.0;

/// Everything the input layer can ask of the drag machine.
#[derive(Debug, Clone, PartialEq)]
pub enum DragIntent {
    BeginDrag {
        application_id: i64,
        from_stage: String,
    },
    Hover {
        stage: Option<String>,
    },
    Drop,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        application_id: i64,
        from_stage: String,
        hover: Option<String>,
    },
    Committing {
        application_id: i64,
        target_stage: String,
    },
}

/// What a transition asks the caller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEffect {
    None,
    Commit(MoveRequest),
}

/// Explicit state machine for the board's single active drag.
///
/// The controller never talks to the network; a drop onto a new stage
/// surfaces as [`DragEffect::Commit`] and the caller reports completion
/// back through [`commit_resolved`].
///
/// [`commit_resolved`]: DragController::commit_resolved
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragging_card(&self) -> Option<i64> {
        match &self.state {
            DragState::Dragging { application_id, .. } => Some(*application_id),
            _ => None,
        }
    }

    pub fn hover_stage(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { hover, .. } => hover.as_deref(),
            _ => None,
        }
    }

    pub fn committing_card(&self) -> Option<i64> {
        match &self.state {
            DragState::Committing { application_id, .. } => Some(*application_id),
            _ => None,
        }
    }

    pub fn apply(&mut self, intent: DragIntent) -> DragEffect {
        match (&mut self.state, intent) {
            (
                DragState::Idle,
                DragIntent::BeginDrag {
                    application_id,
                    from_stage,
                },
            ) => {
                tracing::debug!(application_id, %from_stage, "drag started");
                self.state = DragState::Dragging {
                    application_id,
                    from_stage,
                    hover: None,
                };
                DragEffect::None
            }
            (DragState::Dragging { hover, .. }, DragIntent::Hover { stage }) => {
                *hover = stage;
                DragEffect::None
            }
            (
                DragState::Dragging {
                    application_id,
                    from_stage,
                    hover,
                },
                DragIntent::Drop,
            ) => {
                let application_id = *application_id;
                let target = hover.take();
                match target {
                    Some(target_stage) if target_stage != *from_stage => {
                        tracing::debug!(application_id, %target_stage, "drop accepted");
                        self.state = DragState::Committing {
                            application_id,
                            target_stage: target_stage.clone(),
                        };
                        DragEffect::Commit(MoveRequest {
                            application_id,
                            target_stage,
                        })
                    }
                    _ => {
                        self.state = DragState::Idle;
                        DragEffect::None
                    }
                }
            }
            (DragState::Dragging { .. }, DragIntent::Cancel) => {
                tracing::debug!("drag cancelled");
                self.state = DragState::Idle;
                DragEffect::None
            }
            (
                DragState::Committing {
                    application_id: committing,
                    ..
                },
                DragIntent::BeginDrag {
                    application_id,
                    from_stage,
                },
            ) => {
                // The card mid-commit stays locked; any other card may start.
                if *committing == application_id {
                    DragEffect::None
                } else {
                    self.state = DragState::Dragging {
                        application_id,
                        from_stage,
                        hover: None,
                    };
                    DragEffect::None
                }
            }
            _ => DragEffect::None,
        }
    }

    /// Called once the commit for `application_id` finished, either way.
    pub fn commit_resolved(&mut self, application_id: i64) {
        if let DragState::Committing {
            application_id: committing,
            ..
        } = &self.state
        {
            if *committing == application_id {
                self.state = DragState::Idle;
            }
        }
    }
}

/// Turns raw mouse presses into drag intents. A press only becomes a drag
/// after the pointer travels [`POINTER_ACTIVATION_DISTANCE`]; shorter
/// gestures stay clicks and never reach the drag machine.
#[derive(Debug, Default)]
pub struct PointerSensor {
    press: Option<PointerPress>,
    activated: bool,
}

#[derive(Debug)]
struct PointerPress {
    x: f32,
    y: f32,
    application_id: i64,
    from_stage: String,
}

impl PointerSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, x: f32, y: f32, application_id: i64, from_stage: impl Into<String>) {
        self.press = Some(PointerPress {
            x,
            y,
            application_id,
            from_stage: from_stage.into(),
        });
        self.activated = false;
    }

    pub fn movement(&mut self, x: f32, y: f32) -> Option<DragIntent> {
        let press = self.press.as_ref()?;
        if self.activated {
            return None;
        }
        let distance = (x - press.x).hypot(y - press.y);
        if distance >= POINTER_ACTIVATION_DISTANCE {
            self.activated = true;
            return Some(DragIntent::BeginDrag {
                application_id: press.application_id,
                from_stage: press.from_stage.clone(),
            });
        }
        None
    }

    /// `Some(Drop)` if a drag was active; `None` means the press was a click.
    pub fn release(&mut self) -> Option<DragIntent> {
        let was_active = self.activated && self.press.is_some();
        self.press = None;
        self.activated = false;
        was_active.then_some(DragIntent::Drop)
    }

    pub fn is_active(&self) -> bool {
        self.activated
    }

    pub fn cancel(&mut self) {
        self.press = None;
        self.activated = false;
    }
}

/// Touch counterpart of [`PointerSensor`]: a drag starts only after the
/// finger holds [`TOUCH_HOLD_DELAY`] within [`TOUCH_HOLD_TOLERANCE`] of the
/// touch origin. Larger movement during the delay reads as a scroll and
/// abandons the hold.
#[derive(Debug, Default)]
pub struct TouchSensor {
    touch: Option<TouchStart>,
    activated: bool,
}

#[derive(Debug)]
struct TouchStart {
    x: f32,
    y: f32,
    application_id: i64,
    from_stage: String,
    at: Instant,
}

impl TouchSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch_start(
        &mut self,
        x: f32,
        y: f32,
        application_id: i64,
        from_stage: impl Into<String>,
        at: Instant,
    ) {
        self.touch = Some(TouchStart {
            x,
            y,
            application_id,
            from_stage: from_stage.into(),
            at,
        });
        self.activated = false;
    }

    pub fn touch_move(&mut self, x: f32, y: f32) {
        if self.activated {
            return;
        }
        let abandoned = match &self.touch {
            Some(touch) => (x - touch.x).hypot(y - touch.y) > TOUCH_HOLD_TOLERANCE,
            None => false,
        };
        if abandoned {
            self.touch = None;
        }
    }

    /// Drive the hold timer. Emits `BeginDrag` exactly once when the delay
    /// elapses with the finger still down and within tolerance.
    pub fn poll_hold(&mut self, now: Instant) -> Option<DragIntent> {
        if self.activated {
            return None;
        }
        let touch = self.touch.as_ref()?;
        if now.duration_since(touch.at) >= TOUCH_HOLD_DELAY {
            self.activated = true;
            return Some(DragIntent::BeginDrag {
                application_id: touch.application_id,
                from_stage: touch.from_stage.clone(),
            });
        }
        None
    }

    /// `Some(Drop)` if the hold had activated; `None` means it was a tap.
    pub fn touch_end(&mut self) -> Option<DragIntent> {
        let was_active = self.activated && self.touch.is_some();
        self.touch = None;
        self.activated = false;
        was_active.then_some(DragIntent::Drop)
    }

    pub fn is_active(&self) -> bool {
        self.activated
    }

    pub fn cancel(&mut self) {
        self.touch = None;
        self.activated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn begin(application_id: i64, from_stage: &str) -> DragIntent {
        DragIntent::BeginDrag {
            application_id,
            from_stage: from_stage.into(),
        }
    }

    fn hover(stage: &str) -> DragIntent {
        DragIntent::Hover {
            stage: Some(stage.into()),
        }
    }

    #[test]
    fn drop_on_new_stage_requests_a_commit() {
        let mut controller = DragController::new();
        assert_eq!(controller.apply(begin(1, "Aceito")), DragEffect::None);
        assert_eq!(controller.apply(hover("Produção")), DragEffect::None);

        let effect = controller.apply(DragIntent::Drop);
        assert_eq!(
            effect,
            DragEffect::Commit(MoveRequest {
                application_id: 1,
                target_stage: "Produção".into(),
            })
        );
        assert_eq!(controller.committing_card(), Some(1));
    }

    #[test]
    fn drop_on_source_stage_does_nothing() {
        let mut controller = DragController::new();
        controller.apply(begin(1, "Aceito"));
        controller.apply(hover("Aceito"));

        assert_eq!(controller.apply(DragIntent::Drop), DragEffect::None);
        assert_eq!(controller.state(), &DragState::Idle);
    }

    #[test]
    fn drop_outside_any_column_does_nothing() {
        let mut controller = DragController::new();
        controller.apply(begin(1, "Aceito"));
        controller.apply(DragIntent::Hover { stage: None });

        assert_eq!(controller.apply(DragIntent::Drop), DragEffect::None);
        assert_eq!(controller.state(), &DragState::Idle);
    }

    #[test]
    fn cancel_abandons_the_drag() {
        let mut controller = DragController::new();
        controller.apply(begin(1, "Aceito"));
        controller.apply(hover("Entregue"));
        controller.apply(DragIntent::Cancel);

        assert_eq!(controller.state(), &DragState::Idle);
    }

    #[test]
    fn only_one_drag_at_a_time() {
        let mut controller = DragController::new();
        controller.apply(begin(1, "Aceito"));
        controller.apply(begin(2, "Aceito"));

        assert_eq!(controller.dragging_card(), Some(1));
    }

    #[test]
    fn committing_card_stays_locked_until_resolved() {
        let mut controller = DragController::new();
        controller.apply(begin(1, "Aceito"));
        controller.apply(hover("Produção"));
        controller.apply(DragIntent::Drop);

        // The card mid-commit cannot restart its drag.
        controller.apply(begin(1, "Aceito"));
        assert_eq!(controller.committing_card(), Some(1));

        controller.commit_resolved(1);
        assert_eq!(controller.state(), &DragState::Idle);
    }

    #[test]
    fn other_cards_stay_interactive_during_a_commit() {
        let mut controller = DragController::new();
        controller.apply(begin(1, "Aceito"));
        controller.apply(hover("Produção"));
        controller.apply(DragIntent::Drop);

        controller.apply(begin(2, "Entregue"));
        assert_eq!(controller.dragging_card(), Some(2));
    }

    #[test]
    fn commit_resolution_for_another_card_is_ignored() {
        let mut controller = DragController::new();
        controller.apply(begin(1, "Aceito"));
        controller.apply(hover("Produção"));
        controller.apply(DragIntent::Drop);

        controller.commit_resolved(99);
        assert_eq!(controller.committing_card(), Some(1));
    }

    #[test]
    fn pointer_press_needs_travel_to_become_a_drag() {
        let mut sensor = PointerSensor::new();
        sensor.press(10.0, 10.0, 1, "Aceito");

        assert_eq!(sensor.movement(14.0, 10.0), None);
        assert!(!sensor.is_active());

        let intent = sensor.movement(18.0, 10.0);
        assert_eq!(intent, Some(begin(1, "Aceito")));
        assert!(sensor.is_active());

        // Activation fires once per press.
        assert_eq!(sensor.movement(30.0, 10.0), None);
        assert_eq!(sensor.release(), Some(DragIntent::Drop));
    }

    #[test]
    fn short_pointer_press_is_a_click() {
        let mut sensor = PointerSensor::new();
        sensor.press(10.0, 10.0, 1, "Aceito");
        sensor.movement(12.0, 11.0);

        assert_eq!(sensor.release(), None);
        assert!(!sensor.is_active());
    }

    #[test]
    fn touch_hold_within_slop_becomes_a_drag() {
        let start = Instant::now();
        let mut sensor = TouchSensor::new();
        sensor.touch_start(10.0, 10.0, 1, "Aceito", start);
        sensor.touch_move(12.0, 10.0);

        assert_eq!(sensor.poll_hold(start + Duration::from_millis(199)), None);
        let intent = sensor.poll_hold(start + Duration::from_millis(200));
        assert_eq!(intent, Some(begin(1, "Aceito")));
        assert_eq!(sensor.poll_hold(start + Duration::from_millis(250)), None);
        assert_eq!(sensor.touch_end(), Some(DragIntent::Drop));
    }

    #[test]
    fn touch_movement_beyond_slop_reads_as_scroll() {
        let start = Instant::now();
        let mut sensor = TouchSensor::new();
        sensor.touch_start(10.0, 10.0, 1, "Aceito", start);
        sensor.touch_move(10.0, 17.0);

        assert_eq!(sensor.poll_hold(start + Duration::from_millis(300)), None);
        assert_eq!(sensor.touch_end(), None);
    }

    #[test]
    fn quick_tap_never_drags() {
        let start = Instant::now();
        let mut sensor = TouchSensor::new();
        sensor.touch_start(10.0, 10.0, 1, "Aceito", start);

        assert_eq!(sensor.poll_hold(start + Duration::from_millis(50)), None);
        assert_eq!(sensor.touch_end(), None);
    }
}
