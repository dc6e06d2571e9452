use anyhow::Error;

pub(crate) fn format(err: &Error) -> String {
    let mut out = format!("Error: {err:#}");
    let hints = suggestions(err);
    if !hints.is_empty() {
        out.push_str("\n\nHints:\n");
        for hint in hints {
            out.push_str("- ");
            out.push_str(&hint);
            out.push('\n');
        }
    }
    out
}

fn suggestions(err: &Error) -> Vec<String> {
    let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
    let haystack = chain.join(" | ").to_ascii_lowercase();
    let mut out: Vec<String> = Vec::new();

    if haystack.contains("no requirements parsed") {
        push_hint(
            &mut out,
            "Verify the requirements document exists at the expected path (default: docs/requirements.md).",
        );
        push_hint(
            &mut out,
            "Requirement bullets must look like `- **TOR-1.1**: description` at the top level.",
        );
        push_hint(
            &mut out,
            "Point at a different document with `--requirements <FILE>` or the [paths] section of reqtrace.toml.",
        );
    }

    if haystack.contains("failed to read requirements file")
        || haystack.contains("no such file or directory")
    {
        push_hint(&mut out, "Verify the input path exists and is readable.");
        push_hint(
            &mut out,
            "Run from inside the project, or pass `--root <DIR>` explicitly.",
        );
    }

    if haystack.contains("below the --fail-under threshold") {
        push_hint(
            &mut out,
            "Tag tests with requirement comments like `// TOR-1.1` to raise coverage.",
        );
        push_hint(
            &mut out,
            "The report artifacts were still written; inspect the trace matrix for uncovered requirements.",
        );
    }

    if haystack.contains("failed to create output directory")
        || haystack.contains("failed to write report")
    {
        push_hint(
            &mut out,
            "Check write permissions on the output location, or redirect with `--markdown-out` / `--html-out`.",
        );
    }

    if haystack.contains("failed to parse") && haystack.contains("reqtrace.toml") {
        push_hint(
            &mut out,
            "Valid sections are [paths] (requirements, markdown_out, html_out) and [scan] (roots, extension).",
        );
        push_hint(
            &mut out,
            "Regenerate a commented template with `reqtrace init --force`.",
        );
    }

    out
}

fn push_hint(hints: &mut Vec<String>, hint: &str) {
    let owned = hint.to_string();
    if !hints.contains(&owned) {
        hints.push(owned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn plain_error_has_no_hint_block() {
        let err = anyhow!("something unexpected");
        let formatted = format(&err);
        assert!(formatted.starts_with("Error: something unexpected"));
        assert!(!formatted.contains("Hints:"));
    }

    #[test]
    fn zero_requirements_error_suggests_document_shape() {
        let err = anyhow!("No requirements parsed from docs/requirements.md");
        let formatted = format(&err);
        assert!(formatted.contains("Hints:"));
        assert!(formatted.contains("- **TOR-1.1**"));
    }

    #[test]
    fn hints_match_through_context_chain() {
        let err = anyhow!("permission denied")
            .context("Failed to write report to reports/trace_matrix.md");
        let formatted = format(&err);
        assert!(formatted.contains("--markdown-out"));
    }

    #[test]
    fn duplicate_hints_collapse() {
        let err = anyhow!("Failed to create output directory reports | Failed to write report");
        let hints = suggestions(&err);
        let unique: std::collections::BTreeSet<&String> = hints.iter().collect();
        assert_eq!(unique.len(), hints.len());
    }
}
