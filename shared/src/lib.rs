//! Shared types for the Palco workspace
//!
//! Wire models and payloads exchanged with the marketplace API, used by
//! the REST client, the board engine, and test fixtures.

pub mod models;
pub mod notify;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    Application, ApplicationMetrics, ApplicationStatus, Campaign, ChatMessage, Creator,
    Deliverable, MetricsUpdate, WorkflowStage, WorkflowStatusUpdate,
};
pub use notify::NotificationLevel;
