//! Authored header/footer templates in their runtime form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::document::TemplateRecord;
use crate::rules::{RoleRule, RuleKind, StoredRule};

/// Which slot a template renders into. Each kind resolves independently,
/// so one page render makes two resolution passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Header,
    Footer,
}

impl TemplateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Header => "header",
            TemplateKind::Footer => "footer",
        }
    }
}

/// Whether a template takes part in resolution at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishState {
    #[default]
    Published,
    Draft,
}

/// An authored template with its targeting rules in compiled form.
///
/// Read-only to the resolver; never mutated during resolution. Rules are
/// compiled once here so evaluation works on structured data instead of
/// re-splitting stored tags on every request.
#[derive(Debug, Clone)]
pub struct Template {
    pub id: String,
    pub kind: TemplateKind,
    pub state: PublishState,
    /// Informational; storage position, not this timestamp, decides ties.
    pub created_at: Option<DateTime<Utc>>,
    /// Ordered inclusion rules. First match wins; empty never matches.
    pub include: Vec<RuleKind>,
    /// Ordered exclusion rules. Any match disqualifies.
    pub exclude: Vec<RuleKind>,
    /// Role gating. Empty admits everyone.
    pub roles: Vec<RoleRule>,
}

impl Template {
    pub fn is_published(&self) -> bool {
        self.state == PublishState::Published
    }
}

impl From<TemplateRecord> for Template {
    fn from(record: TemplateRecord) -> Self {
        let include = compile_rules(&record.id, "include", record.include);
        let exclude = compile_rules(&record.id, "exclude", record.exclude);
        let roles = record.roles.iter().map(|tag| RoleRule::parse(tag)).collect();
        Template {
            id: record.id,
            kind: record.kind,
            state: record.state,
            created_at: record.created_at,
            include,
            exclude,
            roles,
        }
    }
}

/// Decode one stored rule list. A blob that is not a list degrades to an
/// empty list for this template; a malformed entry inside a list is
/// dropped. Both are logged, neither fails the load.
fn compile_rules(template_id: &str, field: &str, value: serde_json::Value) -> Vec<RuleKind> {
    let entries = match value {
        serde_json::Value::Null => return Vec::new(),
        serde_json::Value::Array(entries) => entries,
        _ => {
            warn!("template '{template_id}': {field} rules are not a list, treating as empty");
            return Vec::new();
        }
    };

    let mut rules = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<StoredRule>(entry) {
            Ok(stored) => rules.push(RuleKind::from_stored(&stored)),
            Err(err) => {
                warn!("template '{template_id}': dropping malformed {field} rule [{index}]: {err}");
            }
        }
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::SpecificTarget;
    use serde_json::json;
    use tracing_test::traced_test;

    fn record(id: &str, include: serde_json::Value) -> TemplateRecord {
        TemplateRecord {
            id: id.to_string(),
            kind: TemplateKind::Header,
            state: PublishState::default(),
            created_at: None,
            include,
            exclude: serde_json::Value::Null,
            roles: Vec::new(),
        }
    }

    #[test]
    fn test_record_compiles_ordered_rules() {
        let template = Template::from(record(
            "h1",
            json!(["basic-archives", "404", {"specific": ["post-15"]}]),
        ));
        assert_eq!(
            template.include,
            vec![
                RuleKind::AllArchives,
                RuleKind::NotFound,
                RuleKind::Specific(vec![SpecificTarget::Content(15)]),
            ]
        );
        assert!(template.exclude.is_empty());
        assert!(template.is_published());
    }

    #[traced_test]
    #[test]
    fn test_non_list_blob_degrades_to_empty() {
        let template = Template::from(record("h1", json!("basic-global")));
        assert!(template.include.is_empty());
        assert!(logs_contain("rules are not a list"));
    }

    #[traced_test]
    #[test]
    fn test_malformed_entry_is_dropped_not_fatal() {
        let template = Template::from(record("h1", json!(["global", 42, {"bad": true}])));
        assert_eq!(template.include, vec![RuleKind::Global]);
        assert!(logs_contain("dropping malformed include rule"));
    }

    #[test]
    fn test_roles_are_compiled() {
        let mut raw = record("h1", json!(["global"]));
        raw.roles = vec!["editor".to_string(), "logged-in".to_string()];
        let template = Template::from(raw);
        assert_eq!(
            template.roles,
            vec![RoleRule::Role("editor".to_string()), RoleRule::LoggedIn]
        );
    }

    #[test]
    fn test_draft_state() {
        let mut raw = record("h1", json!(["global"]));
        raw.state = PublishState::Draft;
        assert!(!Template::from(raw).is_published());
    }
}
