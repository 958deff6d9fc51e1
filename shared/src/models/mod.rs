//! Data models
//!
//! Entities owned by the marketplace server, shared between the REST client
//! and the board engine. The client never mutates these in place; it holds
//! revalidated copies and sends the update payloads defined alongside each
//! entity. All IDs are `i64`; field names follow the server's camelCase JSON.

pub mod application;
pub mod campaign;
pub mod chat;
pub mod creator;
pub mod deliverable;
pub mod stage;

// Re-exports
pub use application::*;
pub use campaign::*;
pub use chat::*;
pub use creator::*;
pub use deliverable::*;
pub use stage::*;
