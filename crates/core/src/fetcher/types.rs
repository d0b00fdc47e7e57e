//! Types for the fetch capability.

use std::path::PathBuf;

/// Request to fetch one URL.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// URL to fetch.
    pub url: String,
    /// Directory the item is saved under (platform subdirectories are
    /// appended by the fetcher).
    pub dest_dir: PathBuf,
    /// Download the audio track only.
    pub audio_only: bool,
    /// Suppress tool output.
    pub quiet: bool,
}

/// Progress event emitted while fetching one item.
#[derive(Debug, Clone)]
pub enum FetchEvent {
    /// Bytes are arriving for the in-flight item.
    Downloading {
        downloaded_bytes: u64,
        /// Unknown for some sources (live fragments, chunked downloads).
        total_bytes: Option<u64>,
        title: String,
        url: String,
    },
    /// The item finished downloading and post-processing.
    Finished { metadata: ItemMetadata },
}

/// Metadata reported by the fetch tool for a finished item.
///
/// Which fields are populated varies by extractor, so consumers resolve a
/// display name and path through the prioritized probes below rather than
/// relying on any single field.
#[derive(Debug, Clone, Default)]
pub struct ItemMetadata {
    /// Final file name, when reported directly.
    pub filename: Option<String>,
    /// Full path of the saved file.
    pub filepath: Option<PathBuf>,
    /// Item title.
    pub title: Option<String>,
    /// Container extension.
    pub ext: Option<String>,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
}

impl ItemMetadata {
    /// Resolves a display name: explicit filename, then the path's final
    /// component, then `title.ext`, then the bare title.
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.filename.as_deref().filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        if let Some(name) = self
            .filepath
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
        {
            return Some(name);
        }
        match (self.title.as_deref(), self.ext.as_deref()) {
            (Some(title), Some(ext)) if !title.is_empty() => Some(format!("{}.{}", title, ext)),
            (Some(title), None) if !title.is_empty() => Some(title.to_string()),
            _ => None,
        }
    }

    /// Resolves the saved file's path, preferring the explicit path field.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.filepath {
            return Some(path.clone());
        }
        self.filename
            .as_deref()
            .filter(|n| !n.is_empty())
            .map(PathBuf::from)
    }
}
