//! Audiogate Database Layer
//!
//! Intent-store abstraction and the PostgreSQL implementation. The store is
//! the single source of truth for upload intents; the orchestrator never
//! caches records across requests.

pub mod postgres;
pub mod store;

pub use postgres::PgUploadIntentStore;
pub use store::{ConditionalUpdate, UploadIntentChanges, UploadIntentStore};
