// src/storage/mod.rs
use crate::utils::error::StorageError;
use std::fs;
use std::path::{Path, PathBuf};

/// Persists conversion results (markdown + metadata) under a base
/// output directory.
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Saves the converted markdown as `<source stem>.md`.
    pub fn save_markdown(&self, source_path: &Path, content: &str) -> Result<PathBuf, StorageError> {
        let stem = file_stem(source_path)?;
        let file_path = self.base_dir.join(format!("{}.md", stem));

        fs::write(&file_path, content)?;
        tracing::info!("Saved markdown to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the conversion as `<source stem>_meta.json`.
    pub fn save_metadata(
        &self,
        source_path: &Path,
        md_path: &Path,
        extracted_pages: u32,
    ) -> Result<PathBuf, StorageError> {
        let stem = file_stem(source_path)?;
        let file_path = self.base_dir.join(format!("{}_meta.json", stem));

        let metadata = serde_json::json!({
            "original_path": source_path.display().to_string(),
            "md_path": md_path.display().to_string(),
            "extracted_pages": extracted_pages,
            "conversion_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&file_path, metadata_str)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }
}

fn file_stem(path: &Path) -> Result<String, StorageError> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| StorageError::InvalidPath(path.display().to_string()))
}

/// Request-scoped sliced PDF written beside the source filing. The file
/// is removed when the guard drops, on success and failure alike.
pub struct TempPdf {
    path: PathBuf,
}

impl TempPdf {
    /// Writes `bytes` to `<source stem>_sliced_tmp.pdf` next to the
    /// source file.
    pub fn create(source_path: &Path, bytes: &[u8]) -> Result<Self, StorageError> {
        let stem = file_stem(source_path)?;
        let dir = source_path.parent().unwrap_or_else(|| Path::new("."));
        let path = dir.join(format!("{}_sliced_tmp.pdf", stem));

        fs::write(&path, bytes)?;
        tracing::debug!("Wrote sliced PDF to {}", path.display());

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempPdf {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove temporary sliced PDF"
            );
        }
    }
}
