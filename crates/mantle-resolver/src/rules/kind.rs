//! Compiled form of targeting rules.
//!
//! Stored tags are parsed once, at template construction, into [`RuleKind`];
//! the evaluator never re-splits strings per request. Parsing is total:
//! anything this version does not understand becomes [`RuleKind::Unknown`],
//! which never matches but never fails resolution either.

use std::fmt;

use tracing::warn;

use crate::page::{ContentId, TermId};
use crate::rules::vocabulary;
use crate::rules::StoredRule;

/// One targeting predicate in compiled form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Matches every page.
    Global,
    /// Matches every page. Kept apart from `global` so reports and the
    /// prefilter preserve the authored tag.
    Always,
    /// Any singular content item.
    AllSingulars,
    /// Any archive: taxonomy, date, author, or post-type archive.
    AllArchives,
    /// The 404 page.
    NotFound,
    /// Search results.
    Search,
    /// The blog posts page.
    BlogHome,
    /// The site front page.
    FrontPage,
    /// Date archives.
    DateArchive,
    /// Author archives.
    AuthorArchive,
    /// The shop page.
    Shop,
    /// `<post_type>|all`: singular items of one post type.
    PostType { post_type: String },
    /// `<post_type>|all|archive`: archives of one post type, taxonomy
    /// archives of that post type included.
    PostTypeArchive { post_type: String },
    /// `<post_type>|all|taxarchive|<taxonomy>`: taxonomy archives of one
    /// taxonomy under one post type.
    TaxonomyArchive { post_type: String, taxonomy: String },
    /// Explicit target list. An empty list never matches.
    Specific(Vec<SpecificTarget>),
    /// A tag from a newer vocabulary. Never matches.
    Unknown(String),
}

/// One entry of a `specific` rule's target list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecificTarget {
    /// Exact content item: `post-<id>`.
    Content(ContentId),
    /// Term archive page: `term-<id>`.
    TermArchive(TermId),
    /// Singular items carrying the term: `term-<id>-singulars`.
    TermSingulars(TermId),
}

impl SpecificTarget {
    /// Parse one stored target reference. `None` for shapes this version
    /// does not understand; callers treat those as never-matching.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(id) = raw.strip_prefix("post-") {
            return id.parse().ok().map(SpecificTarget::Content);
        }
        if let Some(rest) = raw.strip_prefix("term-") {
            if let Some(id) = rest.strip_suffix("-singulars") {
                return id.parse().ok().map(SpecificTarget::TermSingulars);
            }
            return rest.parse().ok().map(SpecificTarget::TermArchive);
        }
        None
    }
}

impl fmt::Display for SpecificTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecificTarget::Content(id) => write!(f, "post-{id}"),
            SpecificTarget::TermArchive(id) => write!(f, "term-{id}"),
            SpecificTarget::TermSingulars(id) => write!(f, "term-{id}-singulars"),
        }
    }
}

impl RuleKind {
    /// Parse a stored tag string. Legacy spellings are canonicalized first;
    /// unrecognized input comes back as [`RuleKind::Unknown`].
    pub fn parse(tag: &str) -> Self {
        let tag = vocabulary::canonical_tag(tag);
        match tag {
            "global" => RuleKind::Global,
            "always" => RuleKind::Always,
            "all-singulars" => RuleKind::AllSingulars,
            "all-archives" => RuleKind::AllArchives,
            "404" => RuleKind::NotFound,
            "search" => RuleKind::Search,
            "blog-home" => RuleKind::BlogHome,
            "front-page" => RuleKind::FrontPage,
            "date-archive" => RuleKind::DateArchive,
            "author-archive" => RuleKind::AuthorArchive,
            "shop-page" => RuleKind::Shop,
            composite if composite.contains('|') => Self::parse_composite(composite),
            other => RuleKind::Unknown(other.to_string()),
        }
    }

    fn parse_composite(tag: &str) -> Self {
        let segments: Vec<&str> = tag.split('|').collect();
        match segments.as_slice() {
            [post_type, "all"] if !post_type.is_empty() => RuleKind::PostType {
                post_type: (*post_type).to_string(),
            },
            [post_type, "all", "archive"] if !post_type.is_empty() => RuleKind::PostTypeArchive {
                post_type: (*post_type).to_string(),
            },
            [post_type, "all", "taxarchive", taxonomy]
                if !post_type.is_empty() && !taxonomy.is_empty() =>
            {
                RuleKind::TaxonomyArchive {
                    post_type: (*post_type).to_string(),
                    taxonomy: (*taxonomy).to_string(),
                }
            }
            _ => RuleKind::Unknown(tag.to_string()),
        }
    }

    /// Compile one stored rule entry. Unparseable targets inside a
    /// `specific` list are dropped with a warning; if every target is
    /// unparseable the rule keeps an empty list and never matches.
    pub fn from_stored(stored: &StoredRule) -> Self {
        match stored {
            StoredRule::Tag(tag) => RuleKind::parse(tag),
            StoredRule::Specific { specific } => {
                let mut targets = Vec::with_capacity(specific.len());
                for raw in specific {
                    match SpecificTarget::parse(raw) {
                        Some(target) => targets.push(target),
                        None => warn!("dropping unparseable specific target '{raw}'"),
                    }
                }
                RuleKind::Specific(targets)
            }
        }
    }

    /// Tokens under which the prefilter indexes this rule. The page token
    /// set derived in the prefilter must overlap these for every page the
    /// rule can match; unknown rules match nothing and need no tokens.
    pub fn index_tokens(&self) -> Vec<String> {
        match self {
            RuleKind::Specific(targets) => targets.iter().map(|t| t.to_string()).collect(),
            RuleKind::Unknown(_) => Vec::new(),
            simple => vec![simple.to_string()],
        }
    }
}

impl fmt::Display for RuleKind {
    /// The canonical stored spelling. `Specific` prints as the bare family
    /// name; its targets are listed separately where they matter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Global => f.write_str("global"),
            RuleKind::Always => f.write_str("always"),
            RuleKind::AllSingulars => f.write_str("all-singulars"),
            RuleKind::AllArchives => f.write_str("all-archives"),
            RuleKind::NotFound => f.write_str("404"),
            RuleKind::Search => f.write_str("search"),
            RuleKind::BlogHome => f.write_str("blog-home"),
            RuleKind::FrontPage => f.write_str("front-page"),
            RuleKind::DateArchive => f.write_str("date-archive"),
            RuleKind::AuthorArchive => f.write_str("author-archive"),
            RuleKind::Shop => f.write_str("shop-page"),
            RuleKind::PostType { post_type } => write!(f, "{post_type}|all"),
            RuleKind::PostTypeArchive { post_type } => write!(f, "{post_type}|all|archive"),
            RuleKind::TaxonomyArchive { post_type, taxonomy } => {
                write!(f, "{post_type}|all|taxarchive|{taxonomy}")
            }
            RuleKind::Specific(_) => f.write_str("specific"),
            RuleKind::Unknown(tag) => f.write_str(tag),
        }
    }
}
