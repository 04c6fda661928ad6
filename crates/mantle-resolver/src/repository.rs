//! Template storage behind a trait so resolution can run against any
//! backing store.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::document::TemplateSetDocument;
use crate::error::DocumentError;
use crate::page::{ContentId, TermId};
use crate::prefilter::TokenIndex;
use crate::template::{Template, TemplateKind};

/// Backing store the resolver reads from.
///
/// Implementations must return templates in storage order, because that
/// order is the tie-break between templates that both match a page, and
/// must honor the prefilter contract: given the page's token set, every
/// stored template whose inclusion rules could match the page has to be
/// in the returned slice. Returning extra non-matching templates is
/// fine; the evaluator filters them out.
pub trait TemplateRepository: Send + Sync {
    /// Published templates of the kind whose inclusion rules are indexed
    /// under any of the tokens, in storage order.
    fn templates_for_tokens(&self, kind: TemplateKind, tokens: &[String]) -> Vec<Arc<Template>>;

    /// Term ids attached to a piece of content. Consulted only while
    /// classifying singular pages.
    fn terms_for_content(&self, id: ContentId) -> Vec<TermId>;
}

#[derive(Default)]
struct RepositoryState {
    templates: Vec<Arc<Template>>,
    index: TokenIndex,
    terms: HashMap<ContentId, Vec<TermId>>,
}

/// In-memory repository. Insertion order is the storage order, so it is
/// also the resolution tie-break.
#[derive(Default)]
pub struct InMemoryRepository {
    inner: RwLock<RepositoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_template(&self, template: Template) {
        let mut state = self.inner.write();
        state.templates.push(Arc::new(template));
        state.index = TokenIndex::build(&state.templates);
    }

    /// Load every template from a document, after validating it and
    /// checking its ids against templates already present.
    pub fn load_document(&self, document: TemplateSetDocument) -> Result<(), DocumentError> {
        document.validate()?;

        let mut state = self.inner.write();
        for record in &document.templates {
            if state.templates.iter().any(|t| t.id == record.id) {
                return Err(DocumentError::DuplicateId {
                    id: record.id.clone(),
                });
            }
        }

        let count = document.templates.len();
        for record in document.templates {
            state.templates.push(Arc::new(Template::from(record)));
        }
        state.index = TokenIndex::build(&state.templates);
        debug!("loaded {count} templates, {} total", state.templates.len());
        Ok(())
    }

    pub fn assign_terms(&self, content: ContentId, terms: Vec<TermId>) {
        self.inner.write().terms.insert(content, terms);
    }

    pub fn template_count(&self) -> usize {
        self.inner.read().templates.len()
    }
}

impl TemplateRepository for InMemoryRepository {
    fn templates_for_tokens(&self, kind: TemplateKind, tokens: &[String]) -> Vec<Arc<Template>> {
        let state = self.inner.read();
        state
            .index
            .candidates(tokens)
            .into_iter()
            .filter_map(|position| state.templates.get(position))
            .filter(|template| template.kind == kind && template.is_published())
            .cloned()
            .collect()
    }

    fn terms_for_content(&self, id: ContentId) -> Vec<TermId> {
        self.inner
            .read()
            .terms
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleKind;
    use crate::template::PublishState;

    fn template(id: &str, kind: TemplateKind, state: PublishState) -> Template {
        Template {
            id: id.to_string(),
            kind,
            state,
            created_at: None,
            include: vec![RuleKind::Global],
            exclude: Vec::new(),
            roles: Vec::new(),
        }
    }

    fn global_tokens() -> Vec<String> {
        vec!["global".to_string()]
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let repo = InMemoryRepository::new();
        repo.insert_template(template("h1", TemplateKind::Header, PublishState::Published));
        repo.insert_template(template("h2", TemplateKind::Header, PublishState::Published));
        repo.insert_template(template("h3", TemplateKind::Header, PublishState::Published));

        let found = repo.templates_for_tokens(TemplateKind::Header, &global_tokens());
        let ids: Vec<&str> = found.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["h1", "h2", "h3"]);
    }

    #[test]
    fn test_drafts_are_filtered_out() {
        let repo = InMemoryRepository::new();
        repo.insert_template(template("h1", TemplateKind::Header, PublishState::Draft));
        repo.insert_template(template("h2", TemplateKind::Header, PublishState::Published));

        let found = repo.templates_for_tokens(TemplateKind::Header, &global_tokens());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "h2");
    }

    #[test]
    fn test_kinds_do_not_mix() {
        let repo = InMemoryRepository::new();
        repo.insert_template(template("h1", TemplateKind::Header, PublishState::Published));
        repo.insert_template(template("f1", TemplateKind::Footer, PublishState::Published));

        let footers = repo.templates_for_tokens(TemplateKind::Footer, &global_tokens());
        assert_eq!(footers.len(), 1);
        assert_eq!(footers[0].id, "f1");
    }

    #[test]
    fn test_terms_default_to_empty() {
        let repo = InMemoryRepository::new();
        repo.assign_terms(10, vec![3, 7]);
        assert_eq!(repo.terms_for_content(10), vec![3, 7]);
        assert!(repo.terms_for_content(11).is_empty());
    }

    #[test]
    fn test_load_document_rejects_cross_load_duplicates() {
        let repo = InMemoryRepository::new();
        repo.insert_template(template("h1", TemplateKind::Header, PublishState::Published));

        let document = TemplateSetDocument::from_json(
            r#"{"templates": [{"id": "h1", "kind": "header", "include": ["global"]}]}"#,
        )
        .unwrap();
        let err = repo.load_document(document).unwrap_err();
        assert_eq!(
            err,
            DocumentError::DuplicateId {
                id: "h1".to_string()
            }
        );
        assert_eq!(repo.template_count(), 1);
    }

    #[test]
    fn test_load_document_appends_in_order() {
        let repo = InMemoryRepository::new();
        let document = TemplateSetDocument::from_json(
            r#"{"templates": [
                {"id": "h1", "kind": "header", "include": ["global"]},
                {"id": "h2", "kind": "header", "include": ["global"]}
            ]}"#,
        )
        .unwrap();
        repo.load_document(document).unwrap();

        let found = repo.templates_for_tokens(TemplateKind::Header, &global_tokens());
        let ids: Vec<&str> = found.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["h1", "h2"]);
    }
}
