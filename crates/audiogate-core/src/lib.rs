//! Audiogate core library
//!
//! Domain models, the upload-intent state machine, input validation,
//! configuration, and the error taxonomy. This crate performs no I/O.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

pub use config::Config;
pub use error::{LogLevel, UploadError};
pub use models::{
    CompleteUploadRequest, CreateUploadIntentRequest, CreateUploadIntentResponse,
    ProcessingMessage, UploadIntent, UploadIntentResponse, UploadStatus,
};
