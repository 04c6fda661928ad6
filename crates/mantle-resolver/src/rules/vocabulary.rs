//! Static catalog of rule tags and role tags.
//!
//! Rule-authoring surfaces read this catalog, the prefilter derives its page
//! tokens from the same names, and the evaluator's parser canonicalizes
//! through it. Composite tags (`<post_type>|all...`) and `specific` targets
//! are grammatical forms, not catalog entries.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A catalog entry: the stored tag and its human label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    pub tag: &'static str,
    pub label: &'static str,
}

/// Simple (non-composite) rule tags.
pub const RULE_TAGS: &[TagInfo] = &[
    TagInfo { tag: "global", label: "Entire Site" },
    TagInfo { tag: "all-singulars", label: "All Singulars" },
    TagInfo { tag: "all-archives", label: "All Archives" },
    TagInfo { tag: "404", label: "404 Page" },
    TagInfo { tag: "search", label: "Search Results" },
    TagInfo { tag: "blog-home", label: "Blog / Posts Page" },
    TagInfo { tag: "front-page", label: "Front Page" },
    TagInfo { tag: "date-archive", label: "Date Archive" },
    TagInfo { tag: "author-archive", label: "Author Archive" },
    TagInfo { tag: "shop-page", label: "Shop Page" },
    TagInfo { tag: "always", label: "Entire Site" },
];

/// Role tags with reserved meaning. Any other role tag is matched literally
/// against the visitor's role set.
pub const ROLE_TAGS: &[TagInfo] = &[
    TagInfo { tag: "all", label: "All Visitors" },
    TagInfo { tag: "logged-in", label: "Logged-In Visitors" },
    TagInfo { tag: "logged-out", label: "Logged-Out Visitors" },
];

/// Legacy spellings written by the ancestor storage format, still accepted
/// on load and mapped to their canonical names.
static LEGACY_TAGS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
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
    ])
});

/// Canonical spelling for a stored tag. Legacy names map to their current
/// form; anything else passes through untouched.
pub fn canonical_tag(tag: &str) -> &str {
    LEGACY_TAGS.get(tag).copied().unwrap_or(tag)
}

/// The canonical replacement for `tag`, if it is a legacy spelling.
pub fn legacy_replacement(tag: &str) -> Option<&'static str> {
    LEGACY_TAGS.get(tag).copied()
}

/// Whether `tag` is a simple catalog tag (canonical spelling).
pub fn is_known_tag(tag: &str) -> bool {
    RULE_TAGS.iter().any(|info| info.tag == tag)
}

/// Whether `tag` is one of the reserved role tags.
pub fn is_reserved_role(tag: &str) -> bool {
    ROLE_TAGS.iter().any(|info| info.tag == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_passthrough() {
        assert_eq!(canonical_tag("global"), "global");
        assert_eq!(canonical_tag("product|all|archive"), "product|all|archive");
        assert_eq!(canonical_tag("no-such-tag"), "no-such-tag");
    }

    #[test]
    fn test_legacy_spellings_map_to_canonical() {
        assert_eq!(canonical_tag("basic-global"), "global");
        assert_eq!(canonical_tag("basic-singulars"), "all-singulars");
        assert_eq!(canonical_tag("basic-archives"), "all-archives");
        assert_eq!(canonical_tag("special-404"), "404");
        assert_eq!(canonical_tag("special-woo-shop"), "shop-page");
    }

    #[test]
    fn test_every_legacy_target_is_a_known_tag() {
        for legacy in [
            "basic-global",
            "basic-singulars",
            "basic-archives",
            "special-404",
            "special-search",
            "special-blog",
            "special-front",
            "special-date",
            "special-author",
            "special-woo-shop",
        ] {
            let canonical = legacy_replacement(legacy).unwrap();
            assert!(is_known_tag(canonical), "{legacy} maps to unknown {canonical}");
        }
    }

    #[test]
    fn test_reserved_roles() {
        assert!(is_reserved_role("all"));
        assert!(is_reserved_role("logged-in"));
        assert!(is_reserved_role("logged-out"));
        assert!(!is_reserved_role("editor"));
    }
}
