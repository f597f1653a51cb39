//! Mock provider for offline runs
//!
//! Returns a 1x1 transparent PNG for every request without any network calls.

use crate::provider::*;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pixelforge_core::{ForgeError, Result};

const PLACEHOLDER_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// A provider that answers every request with a placeholder image
#[derive(Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ImageProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn generate(&self, request: &ImageRequest<'_>) -> Result<InlineImage> {
        let data = STANDARD
            .decode(PLACEHOLDER_PNG)
            .map_err(|e| ForgeError::DataError(format!("Invalid placeholder image: {}", e)))?;

        Ok(InlineImage {
            mime_type: ImageFormat::DEFAULT_MIME.to_string(),
            data,
            text: Some(format!(
                "mock {} image ({}, {})",
                request.model, request.aspect, request.size
            )),
        })
    }
}
