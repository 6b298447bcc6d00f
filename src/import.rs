//! Folder import: the sorted list of image files a batch import feeds into the engine.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::is_supported_image;
use crate::foundation::error::PhotoBookResult;

/// Image files directly inside `dir`, sorted by file name. Subdirectories and files
/// with unsupported extensions are skipped.
pub fn list_image_files(dir: &Path) -> PhotoBookResult<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read directory '{}'", dir.display()))?;

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("list '{}'", dir.display()))?;
        let path = entry.path();
        if path.is_file() && is_supported_image(&path) {
            out.push(path);
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    tracing::debug!(dir = %dir.display(), count = out.len(), "collected images");
    Ok(out)
}
