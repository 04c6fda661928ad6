//! Candidate prefiltering over an inverted token index.
//!
//! Matching runs in two stages. Stage 1 derives a token set from the
//! classified page and looks each token up in an index keyed by the
//! tokens a template's inclusion rules could match through. Stage 2
//! ([`crate::evaluator`]) then evaluates the surfaced candidates
//! exactly. The index only has to be conservative: it may surface a
//! template whose rules end up not matching, but it must never miss
//! one whose rules would. Site-wide rules (`global`, `always`) are
//! covered by tokens emitted for every page.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::page::{ClassifiedPage, PageKind};
use crate::template::Template;

/// Every token under which the page's matching rules could be indexed.
pub fn page_tokens(page: &ClassifiedPage) -> Vec<String> {
    // Site-wide rules match any page, unmatched ones included.
    let mut tokens = vec!["global".to_string(), "always".to_string()];

    match &page.kind {
        PageKind::NotFound => tokens.push("404".to_string()),
        PageKind::Search => tokens.push("search".to_string()),
        PageKind::TaxonomyArchive {
            post_type,
            taxonomy,
            term_id,
        } => {
            tokens.push("all-archives".to_string());
            // The plain archive rule also covers taxonomy archives.
            tokens.push(format!("{post_type}|all|archive"));
            tokens.push(format!("{post_type}|all|taxarchive|{taxonomy}"));
            tokens.push(format!("term-{term_id}"));
        }
        PageKind::DateArchive => {
            tokens.push("all-archives".to_string());
            tokens.push("date-archive".to_string());
        }
        PageKind::AuthorArchive => {
            tokens.push("all-archives".to_string());
            tokens.push("author-archive".to_string());
        }
        PageKind::PostTypeArchive { post_type } => {
            tokens.push("all-archives".to_string());
            tokens.push(format!("{post_type}|all|archive"));
        }
        PageKind::Shop => tokens.push("shop-page".to_string()),
        PageKind::BlogHome => tokens.push("blog-home".to_string()),
        PageKind::FrontPage => tokens.push("front-page".to_string()),
        PageKind::Singular { post_type } => {
            tokens.push("all-singulars".to_string());
            tokens.push(format!("{post_type}|all"));
        }
        PageKind::Unmatched => {}
    }

    if let Some(id) = page.current_id {
        tokens.push(format!("post-{id}"));
    }
    for term_id in &page.term_ids {
        tokens.push(format!("term-{term_id}-singulars"));
    }

    tokens
}

/// Inverted index from inclusion-rule tokens to template positions.
///
/// Positions refer to the storage order of the template list the index
/// was built from, which is also the resolution tie-break order.
#[derive(Debug, Default)]
pub struct TokenIndex {
    by_token: HashMap<String, Vec<usize>>,
}

impl TokenIndex {
    pub fn build(templates: &[Arc<Template>]) -> Self {
        let mut by_token: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, template) in templates.iter().enumerate() {
            for rule in &template.include {
                for token in rule.index_tokens() {
                    let slots = by_token.entry(token).or_default();
                    // A template can index the same token through several
                    // rules; one slot per position is enough.
                    if slots.last() != Some(&position) {
                        slots.push(position);
                    }
                }
            }
        }
        TokenIndex { by_token }
    }

    /// Positions of every template indexed under any of the tokens,
    /// in storage order.
    pub fn candidates(&self, tokens: &[String]) -> Vec<usize> {
        let mut positions = BTreeSet::new();
        for token in tokens {
            if let Some(slots) = self.by_token.get(token) {
                positions.extend(slots.iter().copied());
            }
        }
        positions.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::rule_matches;
    use crate::page::{ClassifiedPage, PageKind};
    use crate::rules::{RuleKind, SpecificTarget};
    use crate::template::{PublishState, TemplateKind};

    fn template(id: &str, include: Vec<RuleKind>) -> Arc<Template> {
        Arc::new(Template {
            id: id.to_string(),
            kind: TemplateKind::Header,
            state: PublishState::Published,
            created_at: None,
            include,
            exclude: Vec::new(),
            roles: Vec::new(),
        })
    }

    fn page(kind: PageKind) -> ClassifiedPage {
        ClassifiedPage {
            kind,
            current_id: None,
            term_ids: Vec::new(),
        }
    }

    fn rule(tag: &str) -> RuleKind {
        RuleKind::parse(tag)
    }

    #[test]
    fn test_every_page_carries_site_wide_tokens() {
        for kind in [
            PageKind::NotFound,
            PageKind::Shop,
            PageKind::Unmatched,
            PageKind::Singular {
                post_type: "post".to_string(),
            },
        ] {
            let tokens = page_tokens(&page(kind));
            assert!(tokens.contains(&"global".to_string()));
            assert!(tokens.contains(&"always".to_string()));
        }
    }

    #[test]
    fn test_taxonomy_archive_tokens() {
        let tokens = page_tokens(&page(PageKind::TaxonomyArchive {
            post_type: "product".to_string(),
            taxonomy: "product_cat".to_string(),
            term_id: 7,
        }));
        assert!(tokens.contains(&"all-archives".to_string()));
        assert!(tokens.contains(&"product|all|archive".to_string()));
        assert!(tokens.contains(&"product|all|taxarchive|product_cat".to_string()));
        assert!(tokens.contains(&"term-7".to_string()));
    }

    #[test]
    fn test_singular_tokens_include_identity_and_terms() {
        let mut product = page(PageKind::Singular {
            post_type: "product".to_string(),
        });
        product.current_id = Some(42);
        product.term_ids = vec![7, 9];
        let tokens = page_tokens(&product);
        assert!(tokens.contains(&"all-singulars".to_string()));
        assert!(tokens.contains(&"product|all".to_string()));
        assert!(tokens.contains(&"post-42".to_string()));
        assert!(tokens.contains(&"term-7-singulars".to_string()));
        assert!(tokens.contains(&"term-9-singulars".to_string()));
    }

    #[test]
    fn test_candidates_come_back_in_storage_order() {
        let templates = vec![
            template("a", vec![rule("404")]),
            template("b", vec![rule("global")]),
            template("c", vec![rule("404")]),
        ];
        let index = TokenIndex::build(&templates);
        let found = index.candidates(&page_tokens(&page(PageKind::NotFound)));
        assert_eq!(found, vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_tokens_index_once() {
        let templates = vec![template("a", vec![rule("404"), rule("404")])];
        let index = TokenIndex::build(&templates);
        assert_eq!(index.candidates(&["404".to_string()]), vec![0]);
    }

    #[test]
    fn test_unknown_rules_are_not_indexed() {
        let templates = vec![template("a", vec![RuleKind::Unknown("mystery".to_string())])];
        let index = TokenIndex::build(&templates);
        assert!(index.is_empty());
        assert!(index
            .candidates(&page_tokens(&page(PageKind::NotFound)))
            .is_empty());
    }

    /// Whatever rule a template carries and whatever page comes in, a
    /// matching template must be surfaced by the prefilter.
    #[test]
    fn test_prefilter_never_drops_a_matching_template() {
        let rules = vec![
            rule("global"),
            rule("always"),
            rule("basic-singulars"),
            rule("basic-archives"),
            rule("404"),
            rule("search"),
            rule("blog-home"),
            rule("front-page"),
            rule("date-archive"),
            rule("author-archive"),
            rule("shop-page"),
            rule("product|all"),
            rule("product|all|archive"),
            rule("product|all|taxarchive|product_cat"),
            RuleKind::Specific(vec![SpecificTarget::Content(42)]),
            RuleKind::Specific(vec![SpecificTarget::TermArchive(7)]),
            RuleKind::Specific(vec![SpecificTarget::TermSingulars(7)]),
        ];
        let templates: Vec<Arc<Template>> = rules
            .iter()
            .enumerate()
            .map(|(i, r)| template(&format!("t{i}"), vec![r.clone()]))
            .collect();
        let index = TokenIndex::build(&templates);

        let mut product_singular = page(PageKind::Singular {
            post_type: "product".to_string(),
        });
        product_singular.current_id = Some(42);
        product_singular.term_ids = vec![7];

        let mut front = page(PageKind::FrontPage);
        front.current_id = Some(42);

        let pages = vec![
            page(PageKind::NotFound),
            page(PageKind::Search),
            page(PageKind::TaxonomyArchive {
                post_type: "product".to_string(),
                taxonomy: "product_cat".to_string(),
                term_id: 7,
            }),
            page(PageKind::DateArchive),
            page(PageKind::AuthorArchive),
            page(PageKind::PostTypeArchive {
                post_type: "product".to_string(),
            }),
            page(PageKind::Shop),
            page(PageKind::BlogHome),
            front,
            product_singular,
            page(PageKind::Unmatched),
        ];

        for current in &pages {
            let surfaced = index.candidates(&page_tokens(current));
            for (position, template) in templates.iter().enumerate() {
                let matches = template
                    .include
                    .iter()
                    .any(|r| rule_matches(r, current));
                if matches {
                    assert!(
                        surfaced.contains(&position),
                        "template {} matches {:?} but was not surfaced",
                        template.id,
                        current.kind
                    );
                }
            }
        }
    }
}
