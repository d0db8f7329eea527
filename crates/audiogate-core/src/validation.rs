//! Input validation for upload intents.
//!
//! Content-type allow-listing, file-name sanitization, and object-key
//! derivation. All functions are pure so the rules can be tested without any
//! backend.

use uuid::Uuid;

use crate::error::UploadError;

/// Audio MIME types accepted by `CreateIntent`. Matching is
/// case-insensitive; the stored content type is the lowercased form.
pub const ALLOWED_AUDIO_CONTENT_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/wav",
    "audio/webm",
    "audio/mp4",
    "audio/x-m4a",
    "audio/ogg",
    "audio/flac",
];

/// Check a (lowercased) content type against the audio allow-list.
pub fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_AUDIO_CONTENT_TYPES.contains(&content_type)
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
///
/// The sanitized name is embedded in the object key, so this blocks path
/// separators and any other character that could alter the key structure.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Object key for an intent: `uploads/{id}/{sanitized file name}`.
/// Deterministic per (id, name) and never recomputed after creation.
pub fn object_key_for(id: Uuid, sanitized_file_name: &str) -> String {
    format!("uploads/{}/{}", id, sanitized_file_name)
}

/// Validate and normalize `CreateIntent` inputs.
///
/// Returns `(sanitized_file_name, lowercased_content_type)` or a validation
/// error before any state is created.
pub fn validate_new_upload(
    file_name: &str,
    content_type: &str,
) -> Result<(String, String), UploadError> {
    let file_name = file_name.trim();
    let content_type = content_type.trim().to_lowercase();

    if file_name.is_empty() || content_type.is_empty() {
        return Err(UploadError::InvalidInput(
            "file_name and content_type are required".to_string(),
        ));
    }

    if !is_allowed_content_type(&content_type) {
        return Err(UploadError::InvalidInput(format!(
            "unsupported audio content type: {}",
            content_type
        )));
    }

    Ok((sanitize_file_name(file_name), content_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_file_name("My-song_v2.final.mp3"), "My-song_v2.final.mp3");
    }

    #[test]
    fn test_sanitize_replaces_path_separators() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("a/b\\c d"), "a_b_c_d");
    }

    #[test]
    fn test_sanitize_replaces_unicode() {
        assert_eq!(sanitize_file_name("chanson été.mp3"), "chanson__t_.mp3");
    }

    #[test]
    fn test_object_key_shape() {
        let id = Uuid::nil();
        assert_eq!(
            object_key_for(id, "song.mp3"),
            format!("uploads/{}/song.mp3", id)
        );
    }

    #[test]
    fn test_validate_trims_and_lowercases() {
        let (name, content_type) = validate_new_upload("  song.mp3  ", " AUDIO/MPEG ").unwrap();
        assert_eq!(name, "song.mp3");
        assert_eq!(content_type, "audio/mpeg");
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let err = validate_new_upload("   ", "audio/mpeg").unwrap_err();
        assert!(matches!(err, UploadError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_non_audio_content_type() {
        let err = validate_new_upload("song.mp3", "video/mp4").unwrap_err();
        match err {
            UploadError::InvalidInput(msg) => assert!(msg.contains("video/mp4")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_allow_list_covers_common_audio_types() {
        assert!(is_allowed_content_type("audio/mpeg"));
        assert!(is_allowed_content_type("audio/flac"));
        assert!(!is_allowed_content_type("application/octet-stream"));
    }
}
