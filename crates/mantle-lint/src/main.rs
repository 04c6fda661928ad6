//! Command line front end for the template set linter.
//!
//! Checks one file or every document in a directory, reports findings
//! grouped per file, and exits non-zero when the set should not be
//! loaded into a resolver repository.

use clap::Parser;
use mantle_lint::{is_document_path, lint_file, LintIssue, LintOptions, LintResult, Severity};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Mantle Template Set Linter
#[derive(Parser, Debug)]
#[command(name = "mantle-lint")]
#[command(
    author,
    version,
    about = "Validate template set files before the resolver loads them"
)]
struct Args {
    /// A template set file, or a directory scanned for YAML/JSON sets
    #[arg(required = true)]
    path: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Hide warnings and advisory findings
    #[arg(short = 'e', long)]
    errors_only: bool,

    /// Also emit advisory findings
    #[arg(short, long)]
    verbose: bool,

    /// Exit non-zero on warnings too
    #[arg(short, long)]
    strict: bool,
}

fn main() {
    let args = Args::parse();

    println!("{BOLD}{CYAN}Mantle Template Set Linter{RESET}");
    println!("{DIM}{RULE}{RESET}");

    let files = collect_document_files(&args.path);
    if files.is_empty() {
        println!(
            "{YELLOW}Warning:{RESET} no YAML or JSON files under {}",
            args.path.display()
        );
        std::process::exit(0);
    }

    println!("{DIM}Scanning:{RESET} {CYAN}{}{RESET}", args.path.display());
    println!(
        "{DIM}Found:{RESET}    {BOLD}{}{RESET} template set file(s)\n",
        files.len()
    );

    let mut result = LintResult::new();
    result.files_checked = files.len();

    // Ids must be unique across every file that will be loaded together,
    // so collect them up front. Files that do not parse are skipped here
    // and reported by the per-file pass below.
    let mut owners: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for file in &files {
        if let Some(document) = load_document_value(file) {
            for id in template_ids(&document) {
                owners.entry(id).or_default().push(file.clone());
            }
        }
    }
    check_duplicate_ids(&owners, &mut result);

    let options = LintOptions {
        verbose: args.verbose,
    };
    for file in &files {
        let per_file = lint_file(file, &options);
        // files_checked is already set above, merge the rest by hand.
        result.issues.extend(per_file.issues);
        result.errors += per_file.errors;
        result.warnings += per_file.warnings;
    }

    match args.output {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => print_report(&result, &args),
    }

    let failed = result.has_errors() || (args.strict && result.has_warnings());
    std::process::exit(if failed { 1 } else { 0 });
}

/// A single file yields itself; a directory yields its immediate
/// document entries, sorted so report order is stable.
fn collect_document_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return if is_document_path(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let mut found = Vec::new();
    let Ok(entries) = std::fs::read_dir(root) else {
        return found;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && is_document_path(&path) {
            found.push(path);
        }
    }
    found.sort();
    found
}

fn load_document_value(path: &Path) -> Option<Value> {
    let content = std::fs::read_to_string(path).ok()?;
    let yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if yaml {
        serde_yaml::from_str(&content).ok()
    } else {
        serde_json::from_str(&content).ok()
    }
}

fn template_ids(document: &Value) -> Vec<String> {
    let Some(templates) = document.get("templates").and_then(Value::as_array) else {
        return Vec::new();
    };
    templates
        .iter()
        .filter_map(|t| t.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn check_duplicate_ids(owners: &BTreeMap<String, Vec<PathBuf>>, result: &mut LintResult) {
    for (id, files) in owners {
        if files.len() < 2 {
            continue;
        }
        let names: Vec<String> = files.iter().map(|f| short_name(f)).collect();
        result.add_issue(
            LintIssue::error(
                "E102",
                format!(
                    "Template id '{id}' is used by {} files: {}",
                    files.len(),
                    names.join(", ")
                ),
                &files[0],
            )
            .with_location("id")
            .with_suggestion("Template ids must be unique across every loaded set"),
        );
    }
}

fn print_json(result: &LintResult) {
    let output = serde_json::to_string_pretty(&result).unwrap();
    println!("{output}");
}

fn print_report(result: &LintResult, args: &Args) {
    println!();

    let mut by_file: BTreeMap<&PathBuf, Vec<&LintIssue>> = BTreeMap::new();
    for issue in &result.issues {
        if args.errors_only && issue.severity != Severity::Error {
            continue;
        }
        by_file.entry(&issue.file).or_default().push(issue);
    }

    if result.issues.is_empty() {
        println!("{GREEN}{BOLD}No issues found.{RESET}\n");
    }

    for (file, issues) in &by_file {
        let errors = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count();
        let warnings = issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count();

        let status = if errors > 0 {
            format!("{RED}{BOLD}FAIL{RESET}")
        } else if warnings > 0 {
            format!("{YELLOW}{BOLD}WARN{RESET}")
        } else {
            format!("{CYAN}{BOLD}NOTE{RESET}")
        };
        let mut counts = Vec::new();
        if errors > 0 {
            counts.push(format!("{RED}{}{RESET}", plural(errors, "error")));
        }
        if warnings > 0 {
            counts.push(format!("{YELLOW}{}{RESET}", plural(warnings, "warning")));
        }
        let counts = if counts.is_empty() {
            String::new()
        } else {
            format!("  {DIM}{}{RESET}", counts.join(&format!("{DIM}, {RESET}")))
        };

        println!("{status} {BOLD}{CYAN}{}{RESET}{counts}", short_name(file));

        for issue in issues {
            let color = severity_color(issue.severity);
            let heading = match &issue.location {
                Some(location) => format!(
                    "{color}{BOLD}{}{RESET}{DIM}[{}]{RESET} {CYAN}{location}{RESET}:",
                    issue.severity, issue.code
                ),
                None => format!(
                    "{color}{BOLD}{}{RESET}{DIM}[{}]{RESET}:",
                    issue.severity, issue.code
                ),
            };
            println!("  {heading} {}", issue.message);
            if let Some(suggestion) = &issue.suggestion {
                println!("      {GREEN}hint:{RESET} {suggestion}");
            }
        }
        println!();
    }

    println!("{DIM}{RULE}{RESET}");
    println!(
        "{BOLD}Checked {}{RESET}{DIM}: {}, {}{RESET}",
        plural(result.files_checked, "file"),
        plural(result.errors, "error"),
        plural(result.warnings, "warning"),
    );
    if result.has_errors() {
        println!("{RED}{BOLD}Linting failed.{RESET}");
    } else if result.has_warnings() {
        println!("{YELLOW}{BOLD}Passed with warnings.{RESET}");
    } else {
        println!("{GREEN}{BOLD}All checks passed.{RESET}");
    }
}

fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => RED,
        Severity::Warning => YELLOW,
        Severity::Info => CYAN,
    }
}
