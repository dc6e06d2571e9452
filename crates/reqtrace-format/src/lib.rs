//! # reqtrace-format
//!
//! **Tier 3 (Formatting)**
//!
//! Renders the Markdown trace-matrix report and writes artifacts to disk.
//!
//! ## What belongs here
//! * Markdown report assembly (summary, priority breakdown, matrix, footer)
//! * Pipe escaping and requirement-text cleanup
//! * Output file writing
//!
//! ## What does NOT belong here
//! * Coverage math (use reqtrace-model)
//! * HTML conversion (use reqtrace-html)

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use time::OffsetDateTime;
use time::macros::format_description;

use reqtrace_model::{CoverageSummary, SubsetCoverage};
use reqtrace_types::{Requirement, TestRef, ToolInfo};

/// Sentinel rendered in both test columns of a requirement with no
/// references. The HTML badge script matches this text case-insensitively.
pub const NO_COVERAGE: &str = "No test coverage";

/// Inline metadata annotations stripped from requirement text before
/// rendering. They occur when a document puts priority or status on the
/// requirement line itself instead of a nested bullet.
static INLINE_METADATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*-\s*\*\*(Priority|Impl Status|Verification)\*\*:[^-]*")
        .expect("valid regex literal")
});

/// Paths and identity stamped into the report footer.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub requirements_path: String,
    pub test_roots: Vec<String>,
    pub markdown_out: String,
    pub html_out: String,
    pub tool: ToolInfo,
}

/// Current UTC time in the report's timestamp format.
#[must_use]
pub fn timestamp_utc() -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");
    OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_else(|_| "1970-01-01 00:00:00 UTC".to_string())
}

/// Render the full Markdown report.
///
/// Rows are ordered by requirement id (the map's order); a requirement with
/// N distinct references yields N rows, one with zero references yields a
/// single [`NO_COVERAGE`] row. Ids present only in `tests` produce no rows.
#[must_use]
pub fn render_markdown(
    requirements: &BTreeMap<String, Requirement>,
    tests: &BTreeMap<String, Vec<TestRef>>,
    summary: &CoverageSummary,
    meta: &ReportMeta,
    generated_at: &str,
) -> String {
    let mut s = String::new();

    s.push_str("# Requirements Trace Matrix\n\n");
    s.push_str(&format!("**Generated:** {generated_at}\n\n"));

    s.push_str("## Summary\n\n");
    s.push_str("| Overall Project Metrics | Implemented Requirements Metrics |\n");
    s.push_str("|-------------------------|----------------------------------|\n");
    s.push_str(&format!(
        "| **Total Rqmts:** {} | **Total Rqmts:** {} |\n",
        summary.all.overall.total, summary.implemented.overall.total
    ));
    s.push_str(&format!(
        "| **Covered Rqmts:** {} | **Covered Rqmts:** {} |\n",
        summary.all.overall.covered, summary.implemented.overall.covered
    ));
    s.push_str(&format!(
        "| **Coverage:** {:.1}% | **Coverage:** {:.1}% |\n\n",
        summary.all.overall.pct(),
        summary.implemented.overall.pct()
    ));

    s.push_str("### Coverage by Priority\n\n");
    s.push_str("| Overall Project | Implemented Rqmts |\n");
    s.push_str("|-----------------|-------------------|\n");
    s.push_str(&format!(
        "| {} | {} |\n\n",
        priority_cell(&summary.all),
        priority_cell(&summary.implemented)
    ));

    s.push_str("## Requirements Trace Matrix Table\n\n");
    s.push_str(
        "| Requirement ID | Priority | Impl Status | Requirement Text | Test File | Test Case Function |\n",
    );
    s.push_str(
        "|----------------|----------|-------------|------------------|-----------|--------------------|\n",
    );

    for (id, req) in requirements {
        let text = escape_pipes(&clean_requirement_text(&req.text));
        let status = escape_pipes(&req.status);
        match tests.get(id) {
            Some(refs) => {
                for test_ref in refs {
                    s.push_str(&format!(
                        "| {} | {} | {} | {} | {} | {} |\n",
                        id,
                        req.priority,
                        status,
                        text,
                        escape_pipes(&test_ref.file),
                        escape_pipes(&test_ref.test)
                    ));
                }
            }
            None => {
                s.push_str(&format!(
                    "| {} | {} | {} | {} | {NO_COVERAGE} | {NO_COVERAGE} |\n",
                    id, req.priority, status, text
                ));
            }
        }
    }

    s.push_str("\n## Generation Details\n\n");
    s.push_str(&format!(
        "- **Requirements Source:** `{}`\n",
        meta.requirements_path
    ));
    s.push_str(&format!(
        "- **Test Roots:** `{}`\n",
        meta.test_roots.join("`, `")
    ));
    s.push_str(&format!(
        "- **Generator:** {} v{}\n",
        meta.tool.name, meta.tool.version
    ));
    s.push_str(&format!(
        "- **Output:** `{}`, `{}`\n",
        meta.markdown_out, meta.html_out
    ));
    s.push_str(
        "\nThis trace matrix is generated by scanning requirement ID comments in test files.\n\
         To update coverage, add comments like `// TOR-1.1` to test assertions that validate\n\
         specific requirements.\n",
    );

    s
}

/// One summary cell: the subset's non-empty priority buckets as bullet
/// fragments joined with `<br>`, trailing `<br>` included.
fn priority_cell(subset: &SubsetCoverage) -> String {
    let mut cell = String::new();
    for (priority, stat) in &subset.by_priority {
        cell.push_str(&format!(
            "- **{priority}:** {}/{} ({:.1}%)<br>",
            stat.covered,
            stat.total,
            stat.pct()
        ));
    }
    cell
}

/// Strip inline priority/status/verification annotations from requirement
/// text.
#[must_use]
pub fn clean_requirement_text(text: &str) -> String {
    INLINE_METADATA.replace_all(text, "").trim().to_string()
}

/// Escape pipe characters so free text cannot break the table structure.
#[must_use]
pub fn escape_pipes(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Write an artifact, creating parent directories as needed and overwriting
/// any previous file.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
