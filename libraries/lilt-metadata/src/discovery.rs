/// Audio file discovery and loading
use crate::error::{MetadataError, Result};
use lilt_core::SourceFile;
use std::path::{Path, PathBuf};

/// Supported audio file extensions
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "wav", "m4a", "aac"];

/// Check if a file has a supported audio extension
pub fn is_supported_file<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let ext = e.to_lowercase();
            extensions.iter().any(|s| s.as_ref() == ext)
        })
        .unwrap_or(false)
}

/// Discover audio files under a path
///
/// A file path is returned as-is if supported; a directory is walked
/// recursively. Results are sorted so the playlist order is stable.
pub fn discover_files<S: AsRef<str>>(path: &Path, extensions: &[S]) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(MetadataError::FileNotFound(path.display().to_string()));
    }

    let mut files = Vec::new();

    if path.is_file() {
        if is_supported_file(path, extensions) {
            files.push(path.to_path_buf());
        }
        return Ok(files);
    }

    for entry in walkdir::WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && is_supported_file(path, extensions) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Read files from disk into ingestion input
///
/// Unreadable files are skipped with a warning.
pub fn load_sources(paths: &[PathBuf]) -> Vec<SourceFile> {
    paths
        .iter()
        .filter_map(|path| match SourceFile::open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!("Skipping unreadable file {:?}: {}", path, e);
                None
            }
        })
        .collect()
}
