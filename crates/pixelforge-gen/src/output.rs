//! Writing generated images to disk

use crate::provider::{ImageFormat, InlineImage};
use pixelforge_core::{ContentHash, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// An image written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct SavedArtifact {
    pub path: PathBuf,
    pub mime_type: String,
    pub hash: ContentHash,
}

/// Final path for an image of `format` requested at `requested`.
///
/// A requested extension that disagrees with the returned format is kept and
/// the real extension is appended (`icon.png` holding JPEG data becomes
/// `icon.png.jpg`). No extension, or a matching one, leaves the path alone.
pub fn resolve_output_path(requested: &Path, format: ImageFormat) -> PathBuf {
    let Some(ext) = requested.extension() else {
        return requested.to_path_buf();
    };

    let requested_ext = format!(".{}", ext.to_string_lossy().to_lowercase());
    if requested_ext == format.extension() {
        return requested.to_path_buf();
    }

    let mut adjusted = OsString::from(requested.as_os_str());
    adjusted.push(format.extension());
    PathBuf::from(adjusted)
}

/// Write `image` at its resolved path, creating parent directories
pub fn commit_artifact(requested: &Path, image: &InlineImage) -> Result<SavedArtifact> {
    let path = resolve_output_path(requested, image.format());
    if path != requested {
        tracing::debug!(
            requested = %requested.display(),
            actual = %path.display(),
            mime = %image.mime_type,
            "extension does not match returned image type"
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, &image.data)?;

    Ok(SavedArtifact {
        path,
        mime_type: image.mime_type.clone(),
        hash: ContentHash::from_bytes(&image.data),
    })
}
