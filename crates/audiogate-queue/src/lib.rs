//! Audiogate Queue Library
//!
//! Queue-publisher abstraction and the SQS backend. Publishing is
//! at-least-once; the broker message id returned on success is recorded on
//! the intent record.

pub mod sqs;
pub mod traits;

pub use sqs::SqsPublisher;
pub use traits::{QueueError, QueuePublisher, QueueResult};
