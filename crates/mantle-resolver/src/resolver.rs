//! Request-scoped template resolution.
//!
//! A [`ResolutionContext`] is built once per incoming request. It
//! classifies the page, derives the prefilter token set, and then
//! answers "which template wins?" per [`TemplateKind`], caching each
//! answer so the header and footer passes of one render never repeat
//! work. The context is cheap and short-lived; nothing in it survives
//! the request.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::evaluator::{first_inclusion_match, matching_exclusion, roles_allow};
use crate::page::{classify, ClassifiedPage, PageKind, PageRequest, RequestUser};
use crate::prefilter::page_tokens;
use crate::repository::TemplateRepository;
use crate::template::TemplateKind;

pub struct ResolutionContext<'a> {
    repo: &'a dyn TemplateRepository,
    page: ClassifiedPage,
    tokens: Vec<String>,
    user: Option<RequestUser>,
    resolved: HashMap<TemplateKind, Option<String>>,
}

impl<'a> ResolutionContext<'a> {
    /// Classify the request once and prepare for per-kind resolution.
    pub fn new(request: &PageRequest, repo: &'a dyn TemplateRepository) -> Self {
        let page = classify(request, repo);
        let tokens = page_tokens(&page);
        ResolutionContext {
            repo,
            page,
            tokens,
            user: request.user.clone(),
            resolved: HashMap::new(),
        }
    }

    pub fn page(&self) -> &ClassifiedPage {
        &self.page
    }

    /// Winning template id for the kind, if any. The first call per
    /// kind resolves; repeat calls return the cached answer, including
    /// a cached "no winner".
    pub fn resolve(&mut self, kind: TemplateKind) -> Option<String> {
        if let Some(cached) = self.resolved.get(&kind) {
            trace!("resolution cache hit for {}", kind.as_str());
            return cached.clone();
        }

        let winner = self.resolve_uncached(kind);
        match &winner {
            Some(id) => debug!("resolved {} to '{id}'", kind.as_str()),
            None => debug!("no {} template matched", kind.as_str()),
        }
        self.resolved.insert(kind, winner.clone());
        winner
    }

    fn resolve_uncached(&self, kind: TemplateKind) -> Option<String> {
        let candidates = self.repo.templates_for_tokens(kind, &self.tokens);
        trace!(
            "{} candidates after prefilter for {}",
            candidates.len(),
            kind.as_str()
        );

        // Storage order is the tie-break: the first candidate that passes
        // inclusion, exclusion, and role checks wins.
        for template in &candidates {
            if first_inclusion_match(&template.include, &self.page).is_none() {
                continue;
            }
            if let Some(rule) = matching_exclusion(&template.exclude, &self.page) {
                trace!("template '{}' excluded by {rule}", template.id);
                continue;
            }
            if !roles_allow(&template.roles, self.user.as_ref()) {
                trace!("template '{}' rejected by role rules", template.id);
                continue;
            }
            return Some(template.id.clone());
        }
        None
    }

    /// Drop cached answers, for callers that mutate the repository
    /// mid-request and want the next resolve to see the change.
    pub fn clear_cache(&mut self) {
        self.resolved.clear();
    }

    /// Resolve with a full per-candidate account of why each template
    /// won, lost, or was passed over. Bypasses the cache so the report
    /// always reflects the repository as it stands.
    pub fn resolve_explained(&self, kind: TemplateKind) -> ResolutionReport {
        let candidates = self.repo.templates_for_tokens(kind, &self.tokens);
        let mut winner: Option<String> = None;
        let mut outcomes = Vec::with_capacity(candidates.len());

        for template in &candidates {
            let verdict = match first_inclusion_match(&template.include, &self.page) {
                None => CandidateVerdict::NotIncluded,
                Some((_, rule)) => {
                    if let Some(excluded_by) = matching_exclusion(&template.exclude, &self.page) {
                        CandidateVerdict::Excluded {
                            rule: excluded_by.to_string(),
                        }
                    } else if !roles_allow(&template.roles, self.user.as_ref()) {
                        CandidateVerdict::RolesRejected
                    } else if winner.is_none() {
                        winner = Some(template.id.clone());
                        CandidateVerdict::Selected {
                            rule: rule.to_string(),
                        }
                    } else {
                        CandidateVerdict::Outranked {
                            rule: rule.to_string(),
                        }
                    }
                }
            };
            outcomes.push(CandidateOutcome {
                template_id: template.id.clone(),
                verdict,
            });
        }

        ResolutionReport {
            kind,
            page: self.page.kind.clone(),
            winner,
            candidates: outcomes,
        }
    }
}

/// Everything that went into one resolution pass.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub kind: TemplateKind,
    pub page: PageKind,
    pub winner: Option<String>,
    pub candidates: Vec<CandidateOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateOutcome {
    pub template_id: String,
    #[serde(flatten)]
    pub verdict: CandidateVerdict,
}

/// Why a candidate ended up where it did. `Outranked` marks templates
/// that passed every check but sat behind the winner in storage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum CandidateVerdict {
    Selected { rule: String },
    NotIncluded,
    Excluded { rule: String },
    RolesRejected,
    Outranked { rule: String },
}
