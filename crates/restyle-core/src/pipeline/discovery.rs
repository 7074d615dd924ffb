//! Image discovery in a flat input directory.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Filename suffixes accepted as images (matched case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".webp", ".bmp"];

/// List supported image files directly inside `dir`.
///
/// Does not recurse and does not check that files decode. A missing
/// directory yields an empty list and a warning.
pub fn list_images(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        tracing::warn!("Image directory {:?} not found", dir);
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file() && is_supported(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    // Sort by path for deterministic ordering
    files.sort();
    tracing::debug!("Found {} image(s) in {:?}", files.len(), dir);
    files
}

/// Check whether a filename ends with a supported suffix.
pub fn is_supported(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            let name = name.to_string_lossy().to_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        })
        .unwrap_or(false)
}
