//! Exact rule evaluation against a classified page.
//!
//! This is the second stage of matching: candidates surfaced by the
//! token prefilter are checked rule by rule. Evaluation is total over
//! [`RuleKind`], so an unrecognized stored tag simply never matches.

use crate::page::{ClassifiedPage, PageKind, RequestUser};
use crate::rules::{RoleRule, RuleKind, SpecificTarget};

/// Does a single rule match the page?
pub fn rule_matches(rule: &RuleKind, page: &ClassifiedPage) -> bool {
    match rule {
        RuleKind::Global | RuleKind::Always => true,
        RuleKind::AllSingulars => matches!(page.kind, PageKind::Singular { .. }),
        RuleKind::AllArchives => matches!(
            page.kind,
            PageKind::TaxonomyArchive { .. }
                | PageKind::DateArchive
                | PageKind::AuthorArchive
                | PageKind::PostTypeArchive { .. }
        ),
        RuleKind::NotFound => page.kind == PageKind::NotFound,
        RuleKind::Search => page.kind == PageKind::Search,
        RuleKind::BlogHome => page.kind == PageKind::BlogHome,
        RuleKind::FrontPage => page.kind == PageKind::FrontPage,
        RuleKind::DateArchive => page.kind == PageKind::DateArchive,
        RuleKind::AuthorArchive => page.kind == PageKind::AuthorArchive,
        RuleKind::Shop => page.kind == PageKind::Shop,
        RuleKind::PostType { post_type } => matches!(
            &page.kind,
            PageKind::Singular { post_type: pt } if pt == post_type
        ),
        // A taxonomy archive still lists entries of the post type, so the
        // broad archive rule covers it alongside the plain type archive.
        RuleKind::PostTypeArchive { post_type } => matches!(
            &page.kind,
            PageKind::PostTypeArchive { post_type: pt }
                | PageKind::TaxonomyArchive { post_type: pt, .. }
                if pt == post_type
        ),
        RuleKind::TaxonomyArchive {
            post_type,
            taxonomy,
        } => matches!(
            &page.kind,
            PageKind::TaxonomyArchive { post_type: pt, taxonomy: tax, .. }
                if pt == post_type && tax == taxonomy
        ),
        RuleKind::Specific(targets) => targets.iter().any(|target| target_matches(target, page)),
        RuleKind::Unknown(_) => false,
    }
}

fn target_matches(target: &SpecificTarget, page: &ClassifiedPage) -> bool {
    match target {
        SpecificTarget::Content(id) => page.current_id == Some(*id),
        SpecificTarget::TermArchive(id) => matches!(
            &page.kind,
            PageKind::TaxonomyArchive { term_id, .. } if term_id == id
        ),
        SpecificTarget::TermSingulars(id) => {
            matches!(page.kind, PageKind::Singular { .. }) && page.term_ids.contains(id)
        }
    }
}

/// Scan an ordered inclusion list and return the first matching rule
/// with its position. An empty list matches nothing.
pub fn first_inclusion_match<'a>(
    rules: &'a [RuleKind],
    page: &ClassifiedPage,
) -> Option<(usize, &'a RuleKind)> {
    rules
        .iter()
        .enumerate()
        .find(|(_, rule)| rule_matches(rule, page))
}

/// Return the first exclusion rule that fires, if any. One hit is enough
/// to disqualify a template regardless of its inclusions.
pub fn matching_exclusion<'a>(
    rules: &'a [RuleKind],
    page: &ClassifiedPage,
) -> Option<&'a RuleKind> {
    rules.iter().find(|rule| rule_matches(rule, page))
}

/// Role gating. An empty rule list admits everyone; otherwise any single
/// passing rule admits the visitor.
pub fn roles_allow(roles: &[RoleRule], user: Option<&RequestUser>) -> bool {
    if roles.is_empty() {
        return true;
    }
    roles.iter().any(|rule| role_matches(rule, user))
}

fn role_matches(rule: &RoleRule, user: Option<&RequestUser>) -> bool {
    match rule {
        RoleRule::All => true,
        RoleRule::LoggedIn => user.is_some(),
        RoleRule::LoggedOut => user.is_none(),
        RoleRule::Role(name) => user.is_some_and(|u| u.roles.iter().any(|role| role == name)),
    }
}
