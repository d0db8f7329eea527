//! Mock queue publisher for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use audiogate_core::ProcessingMessage;
use audiogate_queue::{QueueError, QueuePublisher, QueueResult};

/// Publisher that records every message and can simulate a broker outage.
#[derive(Default)]
pub struct MockPublisher {
    published: Arc<Mutex<Vec<ProcessingMessage>>>,
    counter: AtomicUsize,
    failing: AtomicBool,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent publish fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<ProcessingMessage> {
        self.published.lock().unwrap().clone()
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl QueuePublisher for MockPublisher {
    async fn publish(&self, message: &ProcessingMessage) -> QueueResult<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(QueueError::PublishFailed(
                "simulated broker outage".to_string(),
            ));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.published.lock().unwrap().push(message.clone());
        Ok(format!("mock-message-{}", n))
    }
}
