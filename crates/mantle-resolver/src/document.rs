//! Template set documents as stored on disk.
//!
//! A document is the serialized form of a set of templates, in YAML or
//! JSON. Records keep their rule lists as raw [`serde_json::Value`]
//! blobs; compilation into [`crate::rules::RuleKind`] happens when a
//! record becomes a [`crate::template::Template`], so a malformed rule
//! degrades that one template instead of rejecting the document.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::template::{PublishState, TemplateKind};

/// One template as stored, before rule compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: String,
    pub kind: TemplateKind,
    #[serde(default)]
    pub state: PublishState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub include: serde_json::Value,
    #[serde(default)]
    pub exclude: serde_json::Value,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A full template set document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateSetDocument {
    #[serde(default)]
    pub templates: Vec<TemplateRecord>,
}

impl TemplateSetDocument {
    /// Load a document from a YAML or JSON file, picking the format by
    /// extension (`.yaml`/`.yml` parse as YAML, everything else as JSON).
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read template set {}", path.display()))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let document: TemplateSetDocument = if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML in {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON in {}", path.display()))?
        };

        document.validate()?;
        Ok(document)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let document: TemplateSetDocument =
            serde_json::from_str(content).context("invalid template set JSON")?;
        document.validate()?;
        Ok(document)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let document: TemplateSetDocument =
            serde_yaml::from_str(content).context("invalid template set YAML")?;
        document.validate()?;
        Ok(document)
    }

    /// Check document-level structure: every record needs a non-empty id
    /// and ids must be unique within the document.
    pub fn validate(&self) -> Result<(), DocumentError> {
        let mut seen = HashSet::new();
        for (index, record) in self.templates.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(DocumentError::EmptyId { index });
            }
            if !seen.insert(record.id.as_str()) {
                return Err(DocumentError::DuplicateId {
                    id: record.id.clone(),
                });
            }
        }
        Ok(())
    }
}
