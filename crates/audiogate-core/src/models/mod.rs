pub mod processing_message;
pub mod upload_intent;

pub use processing_message::ProcessingMessage;
pub use upload_intent::{
    CompleteUploadRequest, CreateUploadIntentRequest, CreateUploadIntentResponse, UploadIntent,
    UploadIntentResponse, UploadStatus,
};
