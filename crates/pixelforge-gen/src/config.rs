//! Layered configuration and credential resolution
//!
//! Run defaults are loaded with three layers of precedence (highest wins):
//! 1. Command-line flags (applied by the caller)
//! 2. Project-local: `.pixelforge/config.toml` under the project root
//! 3. Global: `~/.pixelforge/config.toml`
//!
//! The API credential is resolved once per process from the environment or
//! a project `.env` file and passed explicitly to the provider.

use crate::executor::DEFAULT_CONCURRENCY;
use crate::task::{DEFAULT_MODEL, DEFAULT_SIZE};
use pixelforge_core::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MANIFEST: &str = "docs/image-gen/jobs/assets-manifest.json";
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Credential keys, highest priority first
pub const CREDENTIAL_KEYS: [&str; 3] = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "gemini-api-key"];

/// Provider-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    /// Per-request timeout; requests wait indefinitely when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Generation defaults, each replacing the compiled-in fallback when set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub manifest: Option<String>,
}

/// Config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgeConfig {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl ForgeConfig {
    /// Load config with layered precedence: global < project
    pub fn load(root: &Path) -> Result<Self> {
        let mut config = ForgeConfig::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(Self::load_file(&global_path)?);
            }
        }

        let local_path = root.join(".pixelforge").join("config.toml");
        if local_path.exists() {
            config.merge(Self::load_file(&local_path)?);
        }

        Ok(config)
    }

    /// Load a single config file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            ForgeError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    /// Overlay `other` on top of `self`; set values in `other` win
    pub fn merge(&mut self, other: ForgeConfig) {
        for (name, provider) in other.providers {
            let entry = self.providers.entry(name).or_default();
            if provider.api_url.is_some() {
                entry.api_url = provider.api_url;
            }
            if provider.timeout_secs.is_some() {
                entry.timeout_secs = provider.timeout_secs;
            }
        }

        let generation = other.generation;
        if generation.provider.is_some() {
            self.generation.provider = generation.provider;
        }
        if generation.model.is_some() {
            self.generation.model = generation.model;
        }
        if generation.size.is_some() {
            self.generation.size = generation.size;
        }
        if generation.concurrency.is_some() {
            self.generation.concurrency = generation.concurrency;
        }
        if generation.manifest.is_some() {
            self.generation.manifest = generation.manifest;
        }
    }

    pub fn provider_name(&self) -> &str {
        self.generation.provider.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    pub fn default_model(&self) -> &str {
        self.generation.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn default_size(&self) -> &str {
        self.generation.size.as_deref().unwrap_or(DEFAULT_SIZE)
    }

    pub fn concurrency(&self) -> usize {
        self.generation.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    pub fn manifest_path(&self) -> &str {
        self.generation.manifest.as_deref().unwrap_or(DEFAULT_MANIFEST)
    }

    pub fn api_url(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_url.as_deref())
    }

    pub fn timeout(&self, provider_name: &str) -> Option<Duration> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.timeout_secs)
            .map(Duration::from_secs)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".pixelforge").join("config.toml"))
    }
}

/// The API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Resolve the credential from the process environment, then `<root>/.env`
pub fn resolve_credential(root: &Path) -> Option<Credential> {
    let env_file = std::fs::read_to_string(root.join(".env"))
        .map(|content| parse_env_file(&content))
        .unwrap_or_default();
    resolve_credential_from(|key| std::env::var(key).ok(), &env_file)
}

/// First non-empty value among the credential keys: every environment key
/// is tried before any `.env` entry.
pub fn resolve_credential_from<F>(env: F, env_file: &HashMap<String, String>) -> Option<Credential>
where
    F: Fn(&str) -> Option<String>,
{
    CREDENTIAL_KEYS
        .iter()
        .filter_map(|key| env(key))
        .chain(CREDENTIAL_KEYS.iter().filter_map(|key| env_file.get(*key).cloned()))
        .find(|value| !value.is_empty())
        .map(Credential)
}

/// Parse `KEY=value` lines. Blank lines, `#` comments and lines without a
/// key are skipped; one pair of matching outer quotes is stripped.
pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    let mut env = HashMap::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some(eq) = trimmed.find('=') else {
            continue;
        };
        if eq == 0 {
            continue;
        }

        let key = trimmed[..eq].trim();
        let mut value = trimmed[eq + 1..].trim();
        let quoted = (value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\''));
        if quoted {
            // A lone quote is both ends at once and leaves nothing
            value = value.get(1..value.len() - 1).unwrap_or("");
        }
        env.insert(key.to_string(), value.to_string());
    }
    env
}
