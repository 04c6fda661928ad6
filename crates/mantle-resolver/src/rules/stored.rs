//! Raw stored form of a targeting rule.

use serde::{Deserialize, Serialize};

/// One rule entry as it sits in a template-set document.
///
/// A bare string is a vocabulary tag (`"global"`, `"404"`,
/// `"product|all|archive"`, ...); the object form carries an explicit target
/// list. Anything else fails to deserialize and the loader drops the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredRule {
    Tag(String),
    Specific { specific: Vec<String> },
}
