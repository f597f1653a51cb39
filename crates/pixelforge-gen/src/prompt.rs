//! Prompt assembly
//!
//! Builds the full generation prompt from the run's global context documents
//! and one component spec. The output is a fixed template so the same inputs
//! always produce byte-identical text.

use crate::component::ComponentSpec;

const PREAMBLE: &str = "You are generating one production-ready game UI asset.";

const OUTPUT_CONTRACT: [&str; 5] = [
    "- Output exactly one asset centered in frame.",
    "- Keep pixel-perfect edges.",
    "- No text labels, logos, or watermark.",
    "- Prefer transparent background unless component implies a solid base.",
    "- Match the component intent and constraints strictly.",
];

/// Build the prompt for one component
pub fn build_prompt<S: AsRef<str>>(context_texts: &[S], component: &ComponentSpec) -> String {
    let mut lines: Vec<String> = vec![PREAMBLE.to_string(), String::new()];

    lines.push("[GLOBAL_CONTEXT]".to_string());
    lines.extend(context_texts.iter().map(|t| t.as_ref().to_string()));
    lines.push(String::new());

    lines.push("[COMPONENT_SPEC]".to_string());
    lines.push(format!(
        "component_id: {}",
        component.meta("component_id").unwrap_or("unknown")
    ));
    lines.push(format!(
        "target_path: {}",
        component.meta("target_path").unwrap_or("unknown")
    ));
    lines.push(format!(
        "size_hint: {}",
        component.meta("size_hint").unwrap_or("unspecified")
    ));
    for field in ["intent", "shape_rules", "must_not", "acceptance"] {
        lines.push(format!("{}: {}", field, component.section(field)));
    }
    lines.push(String::new());

    lines.push("[OUTPUT_CONTRACT]".to_string());
    lines.extend(OUTPUT_CONTRACT.iter().map(|s| s.to_string()));

    lines.join("\n")
}
