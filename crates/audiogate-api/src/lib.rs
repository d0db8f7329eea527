//! Audiogate API Library
//!
//! HTTP surface for the upload-intent lifecycle: handlers, error-to-HTTP
//! mapping, application state, and bootstrap.

mod api_doc;
mod constants;
mod handlers;
mod telemetry;

pub mod error;
pub mod setup;
pub mod state;

pub use error::ErrorResponse;
pub use setup::routes::build_router;
pub use state::AppState;
