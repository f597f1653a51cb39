//! Provider registry
//!
//! Maps provider names to concrete implementations.

pub mod gemini;
pub mod mock;

use crate::config::{Credential, ForgeConfig};
use crate::provider::ImageProvider;
use pixelforge_core::{ForgeError, Result};

/// Whether a provider needs an API credential
pub fn requires_credential(name: &str) -> bool {
    name != "mock"
}

/// Create a provider by name with configuration
pub fn create_provider(
    name: &str,
    config: &ForgeConfig,
    credential: Option<Credential>,
) -> Result<Box<dyn ImageProvider>> {
    match name {
        "mock" => Ok(Box::new(mock::MockProvider::new())),
        "gemini" => {
            let credential = credential.ok_or_else(|| {
                ForgeError::CredentialError(
                    "API key not found. Set GEMINI_API_KEY/GOOGLE_API_KEY or add it to .env"
                        .to_string(),
                )
            })?;
            Ok(Box::new(gemini::GeminiProvider::from_config(config, credential)))
        }
        _ => Err(ForgeError::ConfigError(format!(
            "Unknown provider '{}'. Available: {}",
            name,
            available_providers().join(", ")
        ))),
    }
}

/// List all available provider names
pub fn available_providers() -> Vec<&'static str> {
    vec!["gemini", "mock"]
}
