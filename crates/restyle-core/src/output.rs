//! Output directory management and result naming.
//!
//! Every result lands in one flat directory as
//! `{stem}_{tag}_{unix-timestamp}{ext}`. Timestamps have one-second
//! resolution, so a `_{n}` counter is appended when that name is taken.

use crate::error::{ServiceError, ServiceResult};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the unix epoch, or 0 if the clock is before it.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Build an output filename from its parts.
///
/// `ext` includes the leading dot, or is empty for extensionless sources.
pub fn output_file_name(stem: &str, tag: &str, timestamp: u64, ext: &str) -> String {
    format!("{stem}_{tag}_{timestamp}{ext}")
}

/// Writes backend results into the output directory.
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory results are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the output directory (and parents) if missing.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    /// Pick a fresh output path for `source` using the current time.
    ///
    /// `ext_override` replaces the source extension (e.g. `Some(".png")`).
    pub fn target_path(&self, source: &Path, tag: &str, ext_override: Option<&str>) -> PathBuf {
        self.target_path_at(source, tag, ext_override, unix_timestamp())
    }

    pub(crate) fn target_path_at(
        &self,
        source: &Path,
        tag: &str,
        ext_override: Option<&str>,
        timestamp: u64,
    ) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let ext = match ext_override {
            Some(ext) => ext.to_string(),
            None => source
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default(),
        };

        let candidate = self.dir.join(output_file_name(&stem, tag, timestamp, &ext));
        if !candidate.exists() {
            return candidate;
        }

        (1u32..)
            .map(|n| {
                self.dir
                    .join(output_file_name(&stem, tag, timestamp, &format!("_{n}{ext}")))
            })
            .find(|p| !p.exists())
            .unwrap_or(candidate)
    }

    /// Persist a byte-identical copy of `source` (placeholder transformation).
    pub async fn copy_source(&self, source: &Path, tag: &str) -> ServiceResult<PathBuf> {
        let bytes = tokio::fs::read(source)
            .await
            .map_err(|e| ServiceError::Read {
                path: source.to_path_buf(),
                message: e.to_string(),
            })?;
        self.write_bytes(source, tag, None, &bytes).await
    }

    /// Persist raw bytes as the result for `source`.
    pub async fn write_bytes(
        &self,
        source: &Path,
        tag: &str,
        ext_override: Option<&str>,
        bytes: &[u8],
    ) -> ServiceResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ServiceError::Write {
                path: self.dir.clone(),
                message: e.to_string(),
            })?;

        let target = self.target_path(source, tag, ext_override);
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| ServiceError::Write {
                path: target.clone(),
                message: e.to_string(),
            })?;

        tracing::info!("Saved {}", target.display());
        Ok(target)
    }

    /// Encode `image` as PNG and persist it as the result for `source`.
    pub async fn save_png(
        &self,
        source: &Path,
        tag: &str,
        image: &DynamicImage,
    ) -> ServiceResult<PathBuf> {
        let mut buf = Cursor::new(Vec::new());
        image
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| ServiceError::Write {
                path: source.to_path_buf(),
                message: format!("PNG encoding failed: {e}"),
            })?;
        self.write_bytes(source, tag, Some(".png"), buf.get_ref())
            .await
    }
}
