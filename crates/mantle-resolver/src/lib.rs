//! Template targeting resolver for site headers and footers.
//!
//! Sites author header and footer templates with ordered targeting
//! rules ("every archive", "singular products in term 7", "the 404
//! page"), exclusion rules, and visitor role conditions. Given a
//! classified page request, this crate picks the winning template per
//! slot: candidates are surfaced through an inverted token index, then
//! evaluated exactly in storage order, and the first template whose
//! inclusions match, whose exclusions stay silent, and whose role rules
//! admit the visitor wins. Each request carries its own resolution
//! cache so the header and footer passes of one render never repeat
//! work.
//!
//! # Example
//!
//! ```
//! use mantle_resolver::{
//!     InMemoryRepository, PageRequest, PublishState, ResolutionContext, RuleKind, Template,
//!     TemplateKind,
//! };
//!
//! let repo = InMemoryRepository::new();
//! repo.insert_template(Template {
//!     id: "site-header".to_string(),
//!     kind: TemplateKind::Header,
//!     state: PublishState::Published,
//!     created_at: None,
//!     include: vec![RuleKind::parse("global")],
//!     exclude: Vec::new(),
//!     roles: Vec::new(),
//! });
//!
//! let request = PageRequest::default();
//! let mut ctx = ResolutionContext::new(&request, &repo);
//! assert_eq!(ctx.resolve(TemplateKind::Header), Some("site-header".to_string()));
//! ```

pub mod document;
pub mod error;
pub mod evaluator;
pub mod page;
pub mod prefilter;
pub mod repository;
pub mod resolver;
pub mod rules;
pub mod template;

pub use document::{TemplateRecord, TemplateSetDocument};
pub use error::DocumentError;
pub use page::{
    classify, ArchiveRequest, ClassifiedPage, ContentId, PageKind, PageRequest, RequestUser,
    SingularRequest, TaxonomyQuery, TermId,
};
pub use repository::{InMemoryRepository, TemplateRepository};
pub use resolver::{CandidateOutcome, CandidateVerdict, ResolutionContext, ResolutionReport};
pub use rules::{RoleRule, RuleKind, SpecificTarget, StoredRule};
pub use template::{PublishState, Template, TemplateKind};
