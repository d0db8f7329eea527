use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type attached to every processing message.
pub const UPLOAD_COMPLETED_EVENT: &str = "upload.completed";

/// Message handed to the downstream processing worker once an upload has
/// been verified. The worker owns all further status transitions
/// (`processing_queued → processing → completed`/`failed`).
///
/// Wire shape is camelCase; consumers in other languages depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingMessage {
    pub upload_id: Uuid,
    pub bucket: String,
    pub object_key: String,
    pub content_type: String,
}

impl ProcessingMessage {
    pub fn new(upload_id: Uuid, bucket: &str, object_key: &str, content_type: &str) -> Self {
        ProcessingMessage {
            upload_id,
            bucket: bucket.to_string(),
            object_key: object_key.to_string(),
            content_type: content_type.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_is_camel_case() {
        let message = ProcessingMessage::new(
            Uuid::nil(),
            "audiogate-uploads",
            "uploads/x/song.mp3",
            "audio/mpeg",
        );
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["uploadId"], Uuid::nil().to_string());
        assert_eq!(json["bucket"], "audiogate-uploads");
        assert_eq!(json["objectKey"], "uploads/x/song.mp3");
        assert_eq!(json["contentType"], "audio/mpeg");
    }
}
