//! # reqtrace-scan
//!
//! **Tier 1 (Extraction)**
//!
//! Walks test source trees and extracts requirement-ID reference comments.
//! A reference comment attributes one or more requirement ids to the most
//! recently declared test case in the same file:
//!
//! ```text
//! public async Task LogsErrorsOnFailure()
//! {
//!     // TOR-1.1, TOR-2.3
//! }
//! ```
//!
//! ## What belongs here
//! * Filesystem traversal of scan roots
//! * The test-declaration and reference-comment patterns
//! * Per-file current-test state
//!
//! ## What does NOT belong here
//! * Requirements document parsing (use reqtrace-parse)
//! * Coverage math (use reqtrace-model)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use ignore::WalkBuilder;
use regex::Regex;
use reqtrace_types::TestRef;

/// Map from requirement id to the tests that reference it. Per-id vectors are
/// insertion-ordered and free of duplicate (file, test) pairs.
pub type TestRefMap = BTreeMap<String, Vec<TestRef>>;

static TEST_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"public\s+(?:async\s+)?Task\s+(\w+)\s*\(").expect("valid regex literal")
});

static REFERENCE_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"//\s*([A-Z]+-[\d.]+(?:\s*,\s*[A-Z]+-[\d.]+)*)").expect("valid regex literal")
});

/// Scan every root for requirement references.
///
/// Nonexistent roots produce a stderr warning and are skipped; unreadable
/// files are logged and skipped. Recorded file paths are relative to
/// `project_root` with `/` separators regardless of platform.
pub fn scan_test_roots(
    project_root: &Path,
    roots: &[PathBuf],
    extension: &str,
) -> Result<TestRefMap> {
    let mut refs = TestRefMap::new();

    for root in roots {
        if !root.exists() {
            eprintln!("Warning: test directory not found at {}", root.display());
            continue;
        }

        for file in list_source_files(root, extension)? {
            let content = match std::fs::read_to_string(&file) {
                Ok(c) => c,
                Err(err) => {
                    eprintln!("Error reading test file {}: {err}", file.display());
                    continue;
                }
            };
            let rel = relative_display(&file, project_root);
            collect_file_refs(&content, &rel, &mut refs);
        }
    }

    Ok(refs)
}

/// Enumerate source files under one root, sorted for deterministic scans.
pub fn list_source_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    let mut builder = WalkBuilder::new(root);
    builder.hidden(false);
    builder.git_ignore(true);
    builder.git_exclude(true);
    builder.git_global(true);
    builder.follow_links(false);

    for entry in builder.build() {
        let entry = entry?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path.to_path_buf());
        }
    }

    files.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    Ok(files)
}

/// Extract references from one file's content into `refs`.
///
/// The declaration pattern is checked before the reference pattern, so a
/// reference on a declaration line attributes to that declaration. References
/// seen before any declaration are dropped.
pub fn collect_file_refs(content: &str, file_label: &str, refs: &mut TestRefMap) {
    let mut current_test: Option<String> = None;

    for line in content.lines() {
        if let Some(caps) = TEST_DECLARATION.captures(line) {
            current_test = Some(caps[1].to_string());
        }

        if let Some(caps) = REFERENCE_COMMENT.captures(line)
            && let Some(test) = current_test.as_deref()
        {
            for id in caps[1].split(',') {
                let id = id.trim();
                let entry = refs.entry(id.to_string()).or_default();
                let test_ref = TestRef {
                    file: file_label.to_string(),
                    test: test.to_string(),
                };
                if !entry.contains(&test_ref) {
                    entry.push(test_ref);
                }
            }
        }
    }
}

/// Total number of (requirement, test) mappings across the map.
#[must_use]
pub fn total_mappings(refs: &TestRefMap) -> usize {
    refs.values().map(Vec::len).sum()
}

fn relative_display(file: &Path, project_root: &Path) -> String {
    let rel = file.strip_prefix(project_root).unwrap_or(file);
    normalize_slashes(&rel.to_string_lossy())
}

fn normalize_slashes(path: &str) -> String {
    if path.contains('\\') {
        path.replace('\\', "/")
    } else {
        path.to_string()
    }
}
