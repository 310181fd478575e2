//! Draft persistence between wizard runs.
//!
//! The wizard's inputs (topic, outline, references, requirements) and its
//! outputs (assembled prompt, generated article) survive across runs as a
//! pretty-printed JSON file under the user data dir, so an interrupted
//! session resumes where it left off. A corrupt draft file is reported as
//! an error rather than silently replaced.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, WeaveError};
use crate::wizard::prompt::{default_requirements, Requirement};

/// Everything the wizard collects and produces for one article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Draft {
    /// Article topic.
    pub topic: String,
    /// Outline points, one per line as entered.
    pub outline: Vec<String>,
    /// Reference text per outline point (parallel to `outline`).
    pub references: Vec<String>,
    /// Revision requirements with their enabled flags.
    pub requirements: Vec<Requirement>,
    /// The last assembled prompt.
    pub prompt: String,
    /// The last generated article.
    pub article: String,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            topic: String::new(),
            outline: Vec::new(),
            references: Vec::new(),
            requirements: default_requirements(),
            prompt: String::new(),
            article: String::new(),
        }
    }
}

impl Draft {
    /// Default draft location: `<data_dir>/paperweave/draft.json`.
    pub fn default_path() -> PathBuf {
        Config::data_dir().join("draft.json")
    }

    /// Load a draft. A missing file yields the default draft; a file that
    /// exists but does not parse is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&raw).map_err(|err| {
            WeaveError::Config(format!(
                "Draft file {} is corrupt ({}); fix or remove it",
                path.display(),
                err
            ))
        })
    }

    /// Persist the draft as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rendered = serde_json::to_string_pretty(self)?;
        std::fs::write(path, rendered)?;
        Ok(())
    }

    /// Replace the outline from free-form text, one point per non-empty
    /// line, trimming whitespace. References are re-aligned to the new
    /// outline length (extra entries dropped, missing ones blank).
    pub fn set_outline_from_text(&mut self, text: &str) {
        self.outline = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        self.references.resize(self.outline.len(), String::new());
    }

    /// True when topic and outline are filled in enough to generate.
    pub fn is_ready(&self) -> bool {
        !self.topic.trim().is_empty() && !self.outline.is_empty()
    }

    /// Reset everything to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
