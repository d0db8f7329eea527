use crate::traits::{QueueError, QueuePublisher, QueueResult};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::BehaviorVersion;
use aws_sdk_sqs::types::MessageAttributeValue;
use aws_sdk_sqs::Client;

use audiogate_core::models::processing_message::UPLOAD_COMPLETED_EVENT;
use audiogate_core::ProcessingMessage;

/// SQS queue publisher
#[derive(Clone)]
pub struct SqsPublisher {
    client: Client,
    queue_url: String,
}

impl SqsPublisher {
    /// Create a new SqsPublisher for the given queue URL.
    pub async fn new(queue_url: String, region: String) -> QueueResult<Self> {
        let region_provider = RegionProviderChain::first_try(aws_config::Region::new(region));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(5)
            .with_retry_mode(RetryMode::Adaptive);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config)
            .load()
            .await;

        Ok(SqsPublisher {
            client: Client::new(&config),
            queue_url,
        })
    }

    fn string_attribute(value: &str) -> QueueResult<MessageAttributeValue> {
        MessageAttributeValue::builder()
            .data_type("String")
            .string_value(value)
            .build()
            .map_err(|e| QueueError::ConfigError(e.to_string()))
    }
}

#[async_trait]
impl QueuePublisher for SqsPublisher {
    async fn publish(&self, message: &ProcessingMessage) -> QueueResult<String> {
        let body = serde_json::to_string(message)
            .map_err(|e| QueueError::PublishFailed(e.to_string()))?;

        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .message_attributes("eventType", Self::string_attribute(UPLOAD_COMPLETED_EVENT)?)
            .message_attributes(
                "uploadId",
                Self::string_attribute(&message.upload_id.to_string())?,
            )
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    upload_id = %message.upload_id,
                    "SQS publish failed"
                );
                QueueError::PublishFailed(e.to_string())
            })?;

        let message_id = output
            .message_id()
            .map(str::to_string)
            .ok_or_else(|| QueueError::PublishFailed("broker returned no message id".into()))?;

        tracing::info!(
            upload_id = %message.upload_id,
            message_id = %message_id,
            "Processing message published"
        );

        Ok(message_id)
    }
}
