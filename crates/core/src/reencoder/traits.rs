//! Trait definition for the reencode capability.

use async_trait::async_trait;
use std::path::Path;

use super::error::ReencodeError;

/// Container extensions that need no reencoding.
const COMPATIBLE_EXTENSIONS: &[&str] = &["mp4", "m4v"];

/// A capability that rewrites a media file in place to a compatible format.
#[async_trait]
pub trait Reencoder: Send + Sync {
    /// Returns the name of this reencoder implementation.
    fn name(&self) -> &str;

    /// Rewrites `path` in place.
    ///
    /// The output is staged in a sibling temp file and only renamed over the
    /// original on success; a failed attempt leaves the original untouched.
    /// When the container changes, the replacement keeps the stem with an
    /// `.mp4` extension and the original file is removed.
    async fn reencode(&self, path: &Path) -> Result<(), ReencodeError>;

    /// Grabs a small preview frame as a `data:image/jpeg` base64 URL.
    ///
    /// Best-effort; implementations without a frame source return `None`.
    async fn thumbnail(&self, _path: &Path) -> Result<Option<String>, ReencodeError> {
        Ok(None)
    }

    /// Validates that the reencoder is properly configured and ready.
    async fn validate(&self) -> Result<(), ReencodeError>;

    /// Whether `path` qualifies for reencoding.
    ///
    /// Default heuristic: anything outside the known-compatible containers,
    /// plus everything fetched into the Instagram subdirectory (those files
    /// are mp4-labelled but routinely carry incompatible streams).
    fn needs_reencode(&self, path: &Path) -> bool {
        let in_insta_subdir = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n == "insta")
            .unwrap_or(false);
        if in_insta_subdir {
            return true;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => !COMPATIBLE_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
            None => false,
        }
    }
}
