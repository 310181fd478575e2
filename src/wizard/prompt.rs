//! Prompt assembly from topic, outline, and reference text.
//!
//! Pure string construction: the topic line, each outline point with its
//! indented reference text, and a numbered list of revision requirements
//! with the `{topic}` placeholder substituted.

use serde::{Deserialize, Serialize};

/// Placeholder in requirement texts, replaced with the article topic.
const TOPIC_PLACEHOLDER: &str = "{topic}";

/// Default revision requirements offered by the wizard.
pub const DEFAULT_REQUIREMENTS: &[&str] = &[
    "Shorten the text where possible while keeping it readable. Simplify or \
     reduce jargon so a first-year student can follow it, without changing \
     the structure or rigor, and without metaphors or analogies.",
    "Keep the content related to {topic}, since the purpose of this text is \
     to introduce {topic}.",
];

/// One revision requirement with its enabled flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Requirement {
    /// Requirement text; may contain the `{topic}` placeholder.
    pub text: String,
    /// Disabled requirements stay in the draft but are left out of the prompt.
    pub enabled: bool,
}

impl Requirement {
    /// A new enabled requirement.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            enabled: true,
        }
    }
}

/// The default requirement set, all enabled.
pub fn default_requirements() -> Vec<Requirement> {
    DEFAULT_REQUIREMENTS
        .iter()
        .map(|text| Requirement::new(*text))
        .collect()
}

/// Assemble the source text: topic line, then each outline point followed
/// by its indented reference text (empty references are skipped).
pub fn build_source_text(topic: &str, outlines: &[String], references: &[String]) -> String {
    let mut source = format!("{topic}\n");
    for (i, outline) in outlines.iter().enumerate() {
        source.push_str(outline);
        source.push('\n');
        if let Some(reference) = references.get(i).filter(|r| !r.trim().is_empty()) {
            source.push_str("  ");
            source.push_str(reference);
            source.push('\n');
        }
    }
    source
}

/// Render enabled requirements as a numbered list, substituting the topic.
///
/// Numbering runs over enabled requirements only, so disabling one never
/// leaves a gap in the rendered list.
pub fn render_requirements(requirements: &[Requirement], topic: &str) -> Vec<String> {
    requirements
        .iter()
        .filter(|req| req.enabled)
        .enumerate()
        .map(|(i, req)| format!("{}. {}", i + 1, req.text.replace(TOPIC_PLACEHOLDER, topic)))
        .collect()
}

/// Assemble the final prompt from the source text and rendered requirements.
pub fn build_prompt(source: &str, requirements: &[String]) -> String {
    format!(
        "Original text:\n{source}\n\nRevision requirements:\n{}",
        requirements.join("\n")
    )
}
