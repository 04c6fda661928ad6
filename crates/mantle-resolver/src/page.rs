//! Page classification: deciding what kind of page is being rendered.
//!
//! The embedder gathers the host CMS conditionals into a [`PageRequest`];
//! [`classify`] collapses them into a single [`PageKind`] plus the ids that
//! targeting rules compare against. Classification runs once per request,
//! before any rule is evaluated, and the result never changes within the
//! request.

use serde::Serialize;

use crate::repository::TemplateRepository;

/// Identifier of a content item (post, page, product, ...) in the host store.
pub type ContentId = u64;

/// Identifier of a taxonomy term in the host store.
pub type TermId = u64;

/// Observable facts about one render, as reported by the host conditionals.
///
/// Several flags can be true at once (a shop page is also an archive); the
/// classifier applies a fixed precedence to pick one page type.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub is_404: bool,
    pub is_search: bool,
    /// Set when the host reports an archive query.
    pub archive: Option<ArchiveRequest>,
    /// The shop page flag from the commerce plugin, when one is installed.
    pub is_shop: bool,
    /// The blog posts page.
    pub is_blog_home: bool,
    /// The site front page.
    pub is_front_page: bool,
    /// Set when the host reports a singular content item.
    pub singular: Option<SingularRequest>,
    /// The authenticated visitor, if any.
    pub user: Option<RequestUser>,
}

/// An archive query as reported by the host.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    pub post_type: String,
    /// Present on taxonomy archives.
    pub taxonomy: Option<TaxonomyQuery>,
    pub is_date: bool,
    pub is_author: bool,
}

/// The taxonomy term an archive is being rendered for.
#[derive(Debug, Clone)]
pub struct TaxonomyQuery {
    pub taxonomy: String,
    pub term_id: TermId,
}

/// The singular content item being rendered.
#[derive(Debug, Clone)]
pub struct SingularRequest {
    pub post_type: String,
    pub content_id: ContentId,
}

/// The authenticated visitor.
#[derive(Debug, Clone)]
pub struct RequestUser {
    pub id: u64,
    pub roles: Vec<String>,
}

/// The single page type a request classifies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PageKind {
    NotFound,
    Search,
    TaxonomyArchive {
        post_type: String,
        taxonomy: String,
        term_id: TermId,
    },
    DateArchive,
    AuthorArchive,
    PostTypeArchive {
        post_type: String,
    },
    Shop,
    BlogHome,
    FrontPage,
    Singular {
        post_type: String,
    },
    /// Nothing applied and no content id was available. Only site-wide
    /// rules can match here.
    Unmatched,
}

/// Result of classification. Computed once per request, immutable afterward.
#[derive(Debug, Clone)]
pub struct ClassifiedPage {
    pub kind: PageKind,
    /// Content id of the rendered item. Kept for front-page and singular
    /// classifications, where `specific` post targets can apply.
    pub current_id: Option<ContentId>,
    /// Terms attached to the current item. Populated for singular pages
    /// only; that is the only case term-scoped rules consult it.
    pub term_ids: Vec<TermId>,
}

/// Classify a request. Deterministic and side-effect free apart from the
/// one term lookup on singular pages.
///
/// Precedence when several conditionals hold at once, mirroring the host:
/// 404 > search > archive subtypes (taxonomy > date > author > shop >
/// generic post-type archive) > shop > blog home > front page > singular.
pub fn classify(request: &PageRequest, repo: &dyn TemplateRepository) -> ClassifiedPage {
    let kind = if request.is_404 {
        PageKind::NotFound
    } else if request.is_search {
        PageKind::Search
    } else if let Some(archive) = &request.archive {
        classify_archive(archive, request.is_shop)
    } else if request.is_shop {
        PageKind::Shop
    } else if request.is_blog_home {
        PageKind::BlogHome
    } else if request.is_front_page {
        PageKind::FrontPage
    } else if let Some(singular) = &request.singular {
        PageKind::Singular {
            post_type: singular.post_type.clone(),
        }
    } else {
        PageKind::Unmatched
    };

    let current_id = match kind {
        PageKind::FrontPage | PageKind::Singular { .. } => {
            request.singular.as_ref().map(|s| s.content_id)
        }
        _ => None,
    };

    // Term-scoped specific rules only apply to singular items, so the term
    // lookup is skipped everywhere else.
    let term_ids = match (&kind, current_id) {
        (PageKind::Singular { .. }, Some(id)) => repo.terms_for_content(id),
        _ => Vec::new(),
    };

    ClassifiedPage {
        kind,
        current_id,
        term_ids,
    }
}

fn classify_archive(archive: &ArchiveRequest, is_shop: bool) -> PageKind {
    if let Some(tax) = &archive.taxonomy {
        PageKind::TaxonomyArchive {
            post_type: archive.post_type.clone(),
            taxonomy: tax.taxonomy.clone(),
            term_id: tax.term_id,
        }
    } else if archive.is_date {
        PageKind::DateArchive
    } else if archive.is_author {
        PageKind::AuthorArchive
    } else if is_shop {
        // The shop page is the commerce plugin's product archive; the flag
        // overrides the generic archive classification but not the
        // taxonomy/date/author subtypes.
        PageKind::Shop
    } else {
        PageKind::PostTypeArchive {
            post_type: archive.post_type.clone(),
        }
    }
}
