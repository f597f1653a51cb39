//! Component spec documents
//!
//! A component spec is a small markdown-ish file describing one UI asset:
//!
//! ```text
//! component_id: hero_icon
//! size_hint: 256x256
//! ## intent
//! A glowing icon.
//! ## must_not
//! No text.
//! ```
//!
//! `key: value` lines before the first `## heading` become metadata; every
//! non-blank line under a heading is folded into that section's text.

use std::collections::HashMap;

/// Parsed component spec
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSpec {
    /// Metadata from lines preceding the first section heading
    pub meta: HashMap<String, String>,
    /// Section text keyed by lower-cased heading, lines joined with spaces
    pub sections: HashMap<String, String>,
}

impl ComponentSpec {
    /// Parse a component spec. Never fails; unrecognized lines are dropped.
    pub fn parse(raw: &str) -> Self {
        let mut meta = HashMap::new();
        let mut buffers: HashMap<String, Vec<String>> = HashMap::new();
        let mut current: Option<String> = None;

        for line in raw.lines() {
            if let Some(heading) = section_heading(line) {
                let id = heading.trim().to_lowercase();
                buffers.entry(id.clone()).or_default();
                current = Some(id);
                continue;
            }

            match &current {
                None => {
                    if let Some((key, value)) = meta_entry(line) {
                        meta.insert(key.to_string(), value.trim().to_string());
                    }
                }
                Some(id) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        if let Some(buffer) = buffers.get_mut(id) {
                            buffer.push(trimmed.to_string());
                        }
                    }
                }
            }
        }

        let sections = buffers
            .into_iter()
            .map(|(id, lines)| (id, lines.join(" ")))
            .collect();

        Self { meta, sections }
    }

    /// Metadata value, if present
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// Section text, or an empty string if the section never appeared
    pub fn section(&self, name: &str) -> &str {
        self.sections.get(name).map(String::as_str).unwrap_or("")
    }
}

/// `## heading` with at least one whitespace char after the hashes
fn section_heading(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("##")?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_whitespace() || chars.as_str().is_empty() {
        return None;
    }
    Some(rest)
}

/// `key: value` where key is `[A-Za-z0-9_]+` and value is non-empty
fn meta_entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    if value.is_empty() {
        return None;
    }
    Some((key, value))
}
