//! Image provider trait and request/response types

use pixelforge_core::Result;
use std::fmt;

/// Image formats the remote service is known to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
    /// Any MIME type outside the table; saved with a `.bin` extension
    Unknown,
}

impl ImageFormat {
    /// MIME type assumed when a response does not declare one
    pub const DEFAULT_MIME: &'static str = "image/png";

    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => ImageFormat::Png,
            "image/jpeg" => ImageFormat::Jpeg,
            "image/webp" => ImageFormat::Webp,
            _ => ImageFormat::Unknown,
        }
    }

    /// File extension including the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => ".png",
            ImageFormat::Jpeg => ".jpg",
            ImageFormat::Webp => ".webp",
            ImageFormat::Unknown => ".bin",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "png"),
            ImageFormat::Jpeg => write!(f, "jpeg"),
            ImageFormat::Webp => write!(f, "webp"),
            ImageFormat::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRequest<'a> {
    pub prompt: &'a str,
    pub model: &'a str,
    /// e.g. "16:9"
    pub aspect: &'a str,
    /// e.g. "1K"
    pub size: &'a str,
}

/// Decoded image payload returned by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
    /// Any text the model returned alongside the image
    pub text: Option<String>,
}

impl InlineImage {
    pub fn format(&self) -> ImageFormat {
        ImageFormat::from_mime(&self.mime_type)
    }
}

/// Trait implemented by each image backend (Gemini, Mock).
///
/// Implementations are shared by every worker of a run, so `generate` takes
/// `&self` and may block.
pub trait ImageProvider: Send + Sync {
    /// Provider name (e.g. "gemini", "mock")
    fn name(&self) -> &str;

    /// Perform one generation call
    fn generate(&self, request: &ImageRequest<'_>) -> Result<InlineImage>;
}
