//! Palco Board - client-side engine for the creator workflow kanban
//!
//! The engine is UI-toolkit independent: resource cache, card projection,
//! column resolution, the drag state machine, and the move committer are
//! plain library code driven through [`store::BoardStore`]. The bundled
//! terminal front-end in `app`/`ui` is one consumer of it.

pub mod app;
pub mod cache;
pub mod committer;
pub mod config;
pub mod drag;
pub mod notify;
pub mod panel;
pub mod projection;
pub mod resolver;
pub mod store;
pub mod ui;

pub use cache::{CollectionKey, ResourceCache};
pub use committer::{MoveCommitter, MoveOutcome, MoveRequest};
pub use config::BoardConfig;
pub use drag::{DragController, DragEffect, DragIntent, DragState, PointerSensor, TouchSensor};
pub use notify::{Toast, ToastQueue};
pub use panel::{DetailPanel, Loadable, MetricsForm};
pub use projection::{Card, project_cards};
pub use resolver::{BoardColumn, ColumnAssignment, bucket_cards, resolve_column};
pub use store::{BoardSnapshot, BoardStore};
