//! Queue-publisher abstraction trait

use async_trait::async_trait;
use thiserror::Error;

use audiogate_core::ProcessingMessage;

/// Queue operation errors
#[derive(Debug, Error)]
pub enum QueueError {
    /// Transient publish failure; the caller may retry.
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Queue-publisher abstraction
///
/// Backends deliver at-least-once and return the broker-generated message
/// id synchronously on success.
#[async_trait]
pub trait QueuePublisher: Send + Sync {
    /// Publish a processing message, returning its message id.
    async fn publish(&self, message: &ProcessingMessage) -> QueueResult<String>;
}
