//! Audiogate Storage Library
//!
//! Object-storage abstraction and the S3 backend. The service never moves
//! file bytes itself: it issues content-type-pinned presigned PUT URLs and
//! reads back object metadata to verify what the client uploaded.

pub mod s3;
pub mod traits;

pub use s3::S3Storage;
pub use traits::{ObjectMetadata, Storage, StorageError, StorageResult};
