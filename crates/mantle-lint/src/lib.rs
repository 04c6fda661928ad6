//! Template set linting library for the Mantle resolver.
//!
//! Validates header/footer template set documents before a repository
//! loads them: document structure, rule tags, specific targets, and role
//! lists. Usable on its own or through the `mantle-lint` binary.
//!
//! # Example
//!
//! ```no_run
//! use mantle_lint::{lint_directory, lint_file, LintOptions};
//! use std::path::Path;
//!
//! let options = LintOptions::default();
//! let mut result = lint_file(Path::new("templates.yaml"), &options);
//! result.merge(lint_directory(Path::new("./template-sets"), &options));
//!
//! if !result.is_valid() {
//!     eprintln!("{} errors across {} files", result.errors, result.files_checked);
//! }
//! ```

mod types;
mod validator;

use std::path::Path;

pub use types::{LintIssue, LintOptions, LintResult, Severity};
pub use validator::{validate_document, validate_rule_entry, validate_template};

/// File extensions recognized as template set documents.
const DOCUMENT_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Whether a path looks like a template set document.
pub fn is_document_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Lint a single template set file.
pub fn lint_file(path: &Path, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();
    result.files_checked = 1;

    match std::fs::read_to_string(path) {
        Ok(content) => lint_content(&content, path, options, &mut result),
        Err(e) => {
            result.add_issue(LintIssue::error(
                "E001",
                format!("Cannot read template set: {e}"),
                path,
            ));
        }
    }
    result
}

/// Lint every template set document directly under `path` (non-recursive).
pub fn lint_directory(path: &Path, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();

    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            result.add_issue(LintIssue::error(
                "E001",
                format!("Cannot scan directory: {e}"),
                path,
            ));
            return result;
        }
    };

    for entry in entries.flatten() {
        let file_path = entry.path();
        if file_path.is_file() && is_document_path(&file_path) {
            result.merge(lint_file(&file_path, options));
        }
    }
    result
}

/// Lint document content held in memory. The format is picked from
/// `source_name`'s extension, JSON by default.
pub fn lint_str(content: &str, source_name: &str, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();
    result.files_checked = 1;
    lint_content(content, Path::new(source_name), options, &mut result);
    result
}

/// Lint an already parsed document value.
pub fn lint_value(value: &serde_json::Value, source_name: &str, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();
    result.files_checked = 1;
    validate_document(Path::new(source_name), value, &mut result, options);
    result
}

fn lint_content(content: &str, path: &Path, options: &LintOptions, result: &mut LintResult) {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let parsed: Result<serde_json::Value, String> = if is_yaml {
        serde_yaml::from_str(content).map_err(|e| format!("Invalid YAML: {e}"))
    } else {
        serde_json::from_str(content).map_err(|e| format!("Invalid JSON: {e}"))
    };

    match parsed {
        Ok(value) => validate_document(path, &value, result, options),
        Err(message) => result.add_issue(LintIssue::error("E002", message, path)),
    }
}
