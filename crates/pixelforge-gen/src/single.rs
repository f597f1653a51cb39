//! Single-shot generation from a literal prompt

use crate::output::{commit_artifact, SavedArtifact};
use crate::provider::{ImageProvider, ImageRequest};
use pixelforge_core::Result;
use std::path::{Path, PathBuf};

pub const SINGLE_DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const SINGLE_DEFAULT_ASPECT: &str = "1:1";

/// Result of a single-shot generation
#[derive(Debug, Clone)]
pub struct SingleResult {
    pub saved: SavedArtifact,
    /// Any text the model returned with the image
    pub text: Option<String>,
}

/// Generate one image.
///
/// With no `out`, the image lands in `<root>/images/pixelforge-<millis><ext>`
/// where the extension follows the returned MIME type.
pub fn generate_single(
    provider: &dyn ImageProvider,
    request: &ImageRequest<'_>,
    root: &Path,
    out: Option<&Path>,
) -> Result<SingleResult> {
    let image = provider.generate(request)?;

    let requested = match out {
        Some(path) => root.join(path),
        None => default_output_path(root, image.format().extension()),
    };

    let saved = commit_artifact(&requested, &image)?;
    Ok(SingleResult {
        saved,
        text: image.text.filter(|t| !t.is_empty()),
    })
}

fn default_output_path(root: &Path, extension: &str) -> PathBuf {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    root.join("images")
        .join(format!("pixelforge-{}{}", millis, extension))
}
