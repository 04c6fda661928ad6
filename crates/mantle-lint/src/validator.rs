//! Core validation logic for template set documents.

use crate::types::{LintIssue, LintOptions, LintResult};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// Simple rule tags the resolver understands.
const KNOWN_TAGS: &[&str] = &[
    "global",
    "always",
    "all-singulars",
    "all-archives",
    "404",
    "search",
    "blog-home",
    "front-page",
    "date-archive",
    "author-archive",
    "shop-page",
];

/// Rule tags that match every page.
const SITE_WIDE_TAGS: &[&str] = &["global", "always"];

/// Reserved role tags; anything else is matched literally.
const ROLE_TAGS: &[&str] = &["all", "logged-in", "logged-out"];

/// Legacy tag spellings and their canonical replacements.
const LEGACY_TAGS: &[(&str, &str)] = &[
    ("basic-global", "global"),
    ("basic-singulars", "all-singulars"),
    ("basic-archives", "all-archives"),
    ("special-404", "404"),
    ("special-search", "search"),
    ("special-blog", "blog-home"),
    ("special-front", "front-page"),
    ("special-date", "date-archive"),
    ("special-author", "author-archive"),
    ("special-woo-shop", "shop-page"),
];

const VALID_KINDS: &[&str] = &["header", "footer"];
const VALID_STATES: &[&str] = &["published", "draft"];

/// Validate a complete template set document.
pub fn validate_document(
    file: &Path,
    document: &Value,
    result: &mut LintResult,
    options: &LintOptions,
) {
    let templates = match document.get("templates") {
        None => {
            result.add_issue(
                LintIssue::error(
                    "E003",
                    "Missing required field: templates",
                    file,
                )
                .with_suggestion("Add a \"templates\" list to the document"),
            );
            return;
        }
        Some(value) => match value.as_array() {
            Some(templates) => templates,
            None => {
                result.add_issue(
                    LintIssue::error(
                        "E003",
                        "Field 'templates' must be an array",
                        file,
                    )
                    .with_location("templates"),
                );
                return;
            }
        },
    };

    let mut seen_ids = HashSet::new();
    let mut any_published = false;

    for (idx, template) in templates.iter().enumerate() {
        validate_template(file, template, idx, result, options);

        if let Some(id) = template.get("id").and_then(|v| v.as_str()) {
            if !seen_ids.insert(id.to_string()) {
                result.add_issue(
                    LintIssue::error(
                        "E102",
                        format!("Duplicate template id '{id}'"),
                        file,
                    )
                    .with_location(format!("templates[{idx}].id"))
                    .with_suggestion("Template ids must be unique across the set"),
                );
            }
        }

        let state = template
            .get("state")
            .and_then(|v| v.as_str())
            .unwrap_or("published");
        if state == "published" {
            any_published = true;
        }
    }

    if !any_published {
        result.add_issue(
            LintIssue::warning(
                "W306",
                "Document defines no published templates",
                file,
            )
            .with_suggestion("Publish at least one template or remove the file"),
        );
    }
}

/// Validate a single template record.
pub fn validate_template(
    file: &Path,
    template: &Value,
    idx: usize,
    result: &mut LintResult,
    options: &LintOptions,
) {
    let location = format!("templates[{idx}]");

    match template.get("id") {
        None => {
            result.add_issue(
                LintIssue::error("E101", "Missing template id", file)
                    .with_location(location.clone()),
            );
        }
        Some(id) => match id.as_str() {
            None => {
                result.add_issue(
                    LintIssue::error("E101", "Template id must be a string", file)
                        .with_location(format!("{location}.id")),
                );
            }
            Some(id) if id.trim().is_empty() => {
                result.add_issue(
                    LintIssue::error("E101", "Template id is empty", file)
                        .with_location(format!("{location}.id")),
                );
            }
            Some(_) => {}
        },
    }

    match template.get("kind").and_then(|v| v.as_str()) {
        None => {
            result.add_issue(
                LintIssue::error("E103", "Missing or invalid template kind", file)
                    .with_location(location.clone())
                    .with_suggestion("Set kind to 'header' or 'footer'"),
            );
        }
        Some(kind) if !VALID_KINDS.contains(&kind) => {
            result.add_issue(
                LintIssue::error(
                    "E103",
                    format!("Invalid template kind: {kind}"),
                    file,
                )
                .with_location(format!("{location}.kind"))
                .with_suggestion("Use 'header' or 'footer'"),
            );
        }
        Some(_) => {}
    }

    if let Some(state) = template.get("state") {
        match state.as_str() {
            None => {
                result.add_issue(
                    LintIssue::error("E104", "Template state must be a string", file)
                        .with_location(format!("{location}.state")),
                );
            }
            Some(state) if !VALID_STATES.contains(&state) => {
                result.add_issue(
                    LintIssue::error(
                        "E104",
                        format!("Invalid template state: {state}"),
                        file,
                    )
                    .with_location(format!("{location}.state"))
                    .with_suggestion("Use 'published' or 'draft'"),
                );
            }
            Some(_) => {}
        }
    }

    if let Some(created_at) = template.get("created_at") {
        match created_at.as_str() {
            None => {
                result.add_issue(
                    LintIssue::error(
                        "E003",
                        "Field 'created_at' must be a string",
                        file,
                    )
                    .with_location(format!("{location}.created_at")),
                );
            }
            Some(raw) => {
                if let Err(e) = chrono::DateTime::parse_from_rfc3339(raw) {
                    result.add_issue(
                        LintIssue::error(
                            "E003",
                            format!("Invalid created_at timestamp: {e}"),
                            file,
                        )
                        .with_location(format!("{location}.created_at"))
                        .with_suggestion("Use RFC 3339, e.g. 2024-01-01T00:00:00Z"),
                    );
                }
            }
        }
    }

    check_rule_list(file, template, &location, "include", result, options);
    check_rule_list(file, template, &location, "exclude", result, options);
    check_roles(file, template, &location, result);
}

/// Validate one rule list field (`include` or `exclude`).
fn check_rule_list(
    file: &Path,
    template: &Value,
    location: &str,
    field: &str,
    result: &mut LintResult,
    options: &LintOptions,
) {
    let entries = match template.get(field) {
        None | Some(Value::Null) => {
            if field == "include" {
                warn_never_matches(file, location, result);
            }
            return;
        }
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            result.add_issue(
                LintIssue::error(
                    "E201",
                    format!("Field '{field}' must be an array of rules"),
                    file,
                )
                .with_location(format!("{location}.{field}"))
                .with_suggestion("The resolver treats a non-list value as an empty rule list"),
            );
            return;
        }
    };

    if entries.is_empty() && field == "include" {
        warn_never_matches(file, location, result);
    }

    for (i, entry) in entries.iter().enumerate() {
        validate_rule_entry(file, entry, &format!("{location}.{field}[{i}]"), result);
    }

    // Inclusion rules run first-match-wins, so nothing after a site-wide
    // tag ever decides the outcome.
    if options.verbose && field == "include" {
        let site_wide = entries.iter().position(|entry| {
            entry
                .as_str()
                .map(canonical_tag)
                .is_some_and(|tag| SITE_WIDE_TAGS.contains(&tag))
        });
        if let Some(pos) = site_wide {
            if pos + 1 < entries.len() {
                result.add_issue(
                    LintIssue::info(
                        "I301",
                        format!("Inclusion rules after position {pos} never decide the match"),
                        file,
                    )
                    .with_location(format!("{location}.include[{pos}]"))
                    .with_suggestion("A site-wide rule matches every page; later rules are unreachable"),
                );
            }
        }
    }
}

fn warn_never_matches(file: &Path, location: &str, result: &mut LintResult) {
    result.add_issue(
        LintIssue::warning(
            "W303",
            "Template has no inclusion rules and can never match",
            file,
        )
        .with_location(format!("{location}.include"))
        .with_suggestion("Add at least one include rule, e.g. \"global\""),
    );
}

/// Validate a single rule entry: a tag string or a `specific` object.
pub fn validate_rule_entry(file: &Path, entry: &Value, location: &str, result: &mut LintResult) {
    match entry {
        Value::String(tag) => validate_tag(file, tag, location, result),
        Value::Object(fields) => match fields.get("specific") {
            None => {
                result.add_issue(
                    LintIssue::error(
                        "E201",
                        "Rule object must carry a 'specific' target list",
                        file,
                    )
                    .with_location(location.to_string())
                    .with_suggestion("Use {\"specific\": [\"post-15\"]}"),
                );
            }
            Some(Value::Array(targets)) => {
                if targets.is_empty() {
                    result.add_issue(
                        LintIssue::warning(
                            "W302",
                            "Empty 'specific' target list never matches",
                            file,
                        )
                        .with_location(location.to_string()),
                    );
                }
                let target_re = Regex::new(r"^(post-\d+|term-\d+(-singulars)?)$").unwrap();
                for (i, target) in targets.iter().enumerate() {
                    match target.as_str() {
                        None => {
                            result.add_issue(
                                LintIssue::error(
                                    "E203",
                                    "Specific targets must be strings",
                                    file,
                                )
                                .with_location(format!("{location}.specific[{i}]")),
                            );
                        }
                        Some(raw) if !target_re.is_match(raw) => {
                            result.add_issue(
                                LintIssue::error(
                                    "E203",
                                    format!("Malformed specific target '{raw}'"),
                                    file,
                                )
                                .with_location(format!("{location}.specific[{i}]"))
                                .with_suggestion(
                                    "Targets look like post-15, term-7, or term-7-singulars",
                                ),
                            );
                        }
                        Some(_) => {}
                    }
                }
            }
            Some(_) => {
                result.add_issue(
                    LintIssue::error(
                        "E201",
                        "Field 'specific' must be an array of targets",
                        file,
                    )
                    .with_location(location.to_string()),
                );
            }
        },
        _ => {
            result.add_issue(
                LintIssue::error(
                    "E201",
                    "Rule entries must be tag strings or specific objects",
                    file,
                )
                .with_location(location.to_string()),
            );
        }
    }
}

/// Validate a rule tag string.
fn validate_tag(file: &Path, tag: &str, location: &str, result: &mut LintResult) {
    if let Some(canonical) = legacy_replacement(tag) {
        result.add_issue(
            LintIssue::warning(
                "W304",
                format!("Legacy rule tag '{tag}'"),
                file,
            )
            .with_location(location.to_string())
            .with_suggestion(format!("Replace with '{canonical}'")),
        );
        return;
    }

    if KNOWN_TAGS.contains(&tag) {
        return;
    }

    if tag.contains('|') {
        validate_composite_tag(file, tag, location, result);
        return;
    }

    if tag == "specific" {
        result.add_issue(
            LintIssue::error(
                "E201",
                "'specific' is not a tag; use an object with a target list",
                file,
            )
            .with_location(location.to_string())
            .with_suggestion("Use {\"specific\": [\"post-15\"]}"),
        );
        return;
    }

    result.add_issue(
        LintIssue::warning(
            "W301",
            format!("Unknown rule tag '{tag}'"),
            file,
        )
        .with_location(location.to_string())
        .with_suggestion("Unknown tags never match any page"),
    );
}

/// Validate a composite tag (`<post_type>|all`, `<post_type>|all|archive`,
/// `<post_type>|all|taxarchive|<taxonomy>`).
fn validate_composite_tag(file: &Path, tag: &str, location: &str, result: &mut LintResult) {
    let slug_re = Regex::new(r"^[a-z0-9_-]+$").unwrap();
    let segments: Vec<&str> = tag.split('|').collect();

    let shape_ok = match segments.as_slice() {
        [post_type, "all"] => slug_re.is_match(post_type),
        [post_type, "all", "archive"] => slug_re.is_match(post_type),
        [post_type, "all", "taxarchive", taxonomy] => {
            slug_re.is_match(post_type) && slug_re.is_match(taxonomy)
        }
        _ => false,
    };

    if !shape_ok {
        result.add_issue(
            LintIssue::error(
                "E202",
                format!("Malformed composite tag '{tag}'"),
                file,
            )
            .with_location(location.to_string())
            .with_suggestion(
                "Composites are <post_type>|all, <post_type>|all|archive, or <post_type>|all|taxarchive|<taxonomy>",
            ),
        );
    }
}

/// Validate the `roles` field.
fn check_roles(file: &Path, template: &Value, location: &str, result: &mut LintResult) {
    let roles = match template.get("roles") {
        None | Some(Value::Null) => return,
        Some(Value::Array(roles)) => roles,
        Some(_) => {
            result.add_issue(
                LintIssue::error(
                    "E003",
                    "Field 'roles' must be an array",
                    file,
                )
                .with_location(format!("{location}.roles")),
            );
            return;
        }
    };

    let slug_re = Regex::new(r"^[a-z0-9_-]+$").unwrap();
    for (i, role) in roles.iter().enumerate() {
        match role.as_str() {
            None => {
                result.add_issue(
                    LintIssue::error("E003", "Roles must be strings", file)
                        .with_location(format!("{location}.roles[{i}]")),
                );
            }
            Some(role) if ROLE_TAGS.contains(&role) => {}
            Some(role) if !slug_re.is_match(role) => {
                result.add_issue(
                    LintIssue::warning(
                        "W305",
                        format!("Suspicious role tag '{role}'"),
                        file,
                    )
                    .with_location(format!("{location}.roles[{i}]"))
                    .with_suggestion(
                        "Roles are lowercase slugs like 'editor', or all/logged-in/logged-out",
                    ),
                );
            }
            Some(_) => {}
        }
    }
}

/// Canonical spelling for a stored tag.
fn canonical_tag(tag: &str) -> &str {
    legacy_replacement(tag).unwrap_or(tag)
}

/// The canonical replacement for `tag`, if it is a legacy spelling.
fn legacy_replacement(tag: &str) -> Option<&'static str> {
    LEGACY_TAGS
        .iter()
        .find(|(legacy, _)| *legacy == tag)
        .map(|(_, canonical)| *canonical)
}
