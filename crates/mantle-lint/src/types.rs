//! Issue and report types shared by the library and the CLI.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// How bad a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The document will be rejected or silently misbehave at load time.
    Error,
    /// The document loads, but a rule or field will not do what the author
    /// most likely intended.
    Warning,
    /// Stylistic or advisory finding.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(name)
    }
}

/// One finding, tied to a file and optionally to a path inside it.
#[derive(Debug, Clone, Serialize)]
pub struct LintIssue {
    pub severity: Severity,
    /// Stable issue code, e.g. "E101" or "W304".
    pub code: String,
    pub message: String,
    #[serde(serialize_with = "path_as_string")]
    pub file: PathBuf,
    /// Dotted path inside the document, e.g. "templates[0].include[1]".
    pub location: Option<String>,
    pub suggestion: Option<String>,
}

fn path_as_string<S: serde::Serializer>(path: &Path, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&path.to_string_lossy())
}

impl LintIssue {
    fn at(severity: Severity, code: impl Into<String>, message: impl Into<String>, file: &Path) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            file: file.to_path_buf(),
            location: None,
            suggestion: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>, file: &Path) -> Self {
        Self::at(Severity::Error, code, message, file)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>, file: &Path) -> Self {
        Self::at(Severity::Warning, code, message, file)
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>, file: &Path) -> Self {
        Self::at(Severity::Info, code, message, file)
    }

    /// Attach the in-document path the finding points at.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attach a concrete fix the author can apply.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Accumulated findings across one or more files.
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    pub issues: Vec<LintIssue>,
    pub files_checked: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl LintResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding and bump the matching counter.
    pub fn add_issue(&mut self, issue: LintIssue) {
        match issue.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => {}
        }
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings > 0
    }

    /// A result with no errors passes; warnings and infos do not fail it.
    pub fn is_valid(&self) -> bool {
        self.errors == 0
    }

    /// Fold the findings and counters of `other` into this result.
    pub fn merge(&mut self, other: LintResult) {
        self.issues.extend(other.issues);
        self.files_checked += other.files_checked;
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}

/// Knobs that change which findings are emitted.
#[derive(Debug, Clone, Default)]
pub struct LintOptions {
    /// Also emit advisory `Info` findings.
    pub verbose: bool,
}
