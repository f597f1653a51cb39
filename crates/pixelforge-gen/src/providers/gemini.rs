//! Gemini image generation provider
//!
//! One blocking `generateContent` call per image. The image comes back
//! inline as base64 in the first content part that carries `inlineData`.

use crate::config::{Credential, ForgeConfig};
use crate::provider::*;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pixelforge_core::{ForgeError, Result};
use serde_json::{json, Value};

const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Upper bound on a response body; 4K images arrive base64-encoded inline
const MAX_RESPONSE_BYTES: u64 = 256 * 1024 * 1024;

/// Gemini provider for image generation
pub struct GeminiProvider {
    credential: Credential,
    api_url: String,
    agent: ureq::Agent,
}

impl GeminiProvider {
    /// Create a provider from config and an already resolved credential
    pub fn from_config(config: &ForgeConfig, credential: Credential) -> Self {
        let api_url = config
            .api_url("gemini")
            .unwrap_or(DEFAULT_GEMINI_URL)
            .trim_end_matches('/')
            .to_string();

        let agent = ureq::Agent::config_builder()
            .timeout_global(config.timeout("gemini"))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            credential,
            api_url,
            agent,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_url,
            encode_path_segment(model)
        )
    }
}

impl ImageProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, request: &ImageRequest<'_>) -> Result<InlineImage> {
        let payload = build_payload(request);
        let url = self.endpoint(request.model);
        tracing::debug!(
            url = %url,
            aspect = request.aspect,
            size = request.size,
            "sending generateContent request"
        );

        let mut response = self
            .agent
            .post(&url)
            .header("x-goog-api-key", self.credential.expose())
            .send_json(&payload)
            .map_err(|e| ForgeError::TransportError(format!("Gemini request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_string()
            .map_err(|e| {
                ForgeError::TransportError(format!("Failed to read Gemini response: {}", e))
            })?;

        parse_gemini_response(status, &body)
    }
}

/// Request body for one generation call
pub fn build_payload(request: &ImageRequest<'_>) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": request.prompt }] }],
        "generationConfig": {
            "responseModalities": ["TEXT", "IMAGE"],
            "imageConfig": {
                "aspectRatio": request.aspect,
                "imageSize": request.size
            }
        }
    })
}

/// Interpret a `generateContent` response
pub fn parse_gemini_response(status: u16, body: &str) -> Result<InlineImage> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = parsed
            .as_ref()
            .and_then(|v| v.pointer("/error/message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| match &parsed {
                Some(v) => v.to_string(),
                None => body.to_string(),
            });
        return Err(ForgeError::ApiError { status, message });
    }

    let response = parsed.ok_or_else(|| {
        ForgeError::DataError("Gemini returned a non-JSON success response".to_string())
    })?;

    let parts = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let text = parts
        .iter()
        .find_map(|p| p.get("text").and_then(Value::as_str))
        .map(str::to_string);

    let inline = parts
        .iter()
        .filter_map(|p| p.get("inlineData"))
        .find(|d| d.get("data").and_then(Value::as_str).is_some_and(|s| !s.is_empty()));

    let Some(inline) = inline else {
        return Err(ForgeError::DataError(format!(
            "No image data returned. Response text: {}",
            text.as_deref().unwrap_or("<none>")
        )));
    };

    let encoded = inline.get("data").and_then(Value::as_str).unwrap_or_default();
    let data = STANDARD
        .decode(encoded)
        .map_err(|e| ForgeError::DataError(format!("Invalid base64 image data: {}", e)))?;

    let mime_type = inline
        .get("mimeType")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(ImageFormat::DEFAULT_MIME)
        .to_string();

    Ok(InlineImage {
        mime_type,
        data,
        text,
    })
}

/// Percent-encode everything outside the RFC 3986 unreserved set
fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
