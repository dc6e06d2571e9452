//! # reqtrace-parse
//!
//! **Tier 1 (Extraction)**
//!
//! Line-oriented parser for the operational requirements document. The
//! document nests priority and implementation-status bullets under each
//! requirement bullet:
//!
//! ```text
//! - **TOR-1.1**: Must log errors
//!   - **Priority**: High
//!   - **Impl Status**: Implemented
//! ```
//!
//! Parsing is a single pass with one piece of state: the requirement
//! currently being accumulated. Metadata bullets update that requirement
//! only; a new requirement bullet (or end of input) flushes it. Lines that
//! match none of the three patterns are skipped without comment.
//!
//! ## What belongs here
//! * The three line patterns and the accumulator state machine
//! * Document loading
//!
//! ## What does NOT belong here
//! * Coverage math (use reqtrace-model)
//! * Report rendering (use reqtrace-format)

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use reqtrace_types::{Priority, Requirement};

static REQUIREMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    // Top-level bullet only: no leading whitespace before the dash.
    Regex::new(r"^-\s*\*\*([A-Z]+-[\d.]+)\*\*:\s*(.+)").expect("valid regex literal")
});

static PRIORITY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*\*\*Priority\*\*:\s*(.+)").expect("valid regex literal"));

static STATUS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*-\s*\*\*Impl Status\*\*:\s*(.+)").expect("valid regex literal")
});

/// Requirement currently being accumulated, before its metadata bullets have
/// all been seen.
struct PendingRequirement {
    id: String,
    text: String,
    priority_value: String,
    status: String,
}

impl PendingRequirement {
    fn new(id: &str, text: &str) -> Self {
        PendingRequirement {
            id: id.to_string(),
            text: text.trim().to_string(),
            priority_value: "Unknown".to_string(),
            status: "Unknown".to_string(),
        }
    }

    fn flush(self, requirements: &mut BTreeMap<String, Requirement>) {
        let priority = Priority::classify(&self.priority_value);
        requirements.insert(
            self.id.clone(),
            Requirement {
                id: self.id,
                text: self.text,
                priority,
                status: self.status,
            },
        );
    }
}

/// Parse a requirements document into an id-keyed map.
///
/// A later occurrence of an id overwrites an earlier one. Priority and
/// status default to `Unknown` until the document says otherwise; metadata
/// bullets with no requirement in flight are ignored.
#[must_use]
pub fn parse_requirements(content: &str) -> BTreeMap<String, Requirement> {
    let mut requirements = BTreeMap::new();
    let mut pending: Option<PendingRequirement> = None;

    for line in content.lines() {
        if let Some(caps) = REQUIREMENT_LINE.captures(line) {
            if let Some(prev) = pending.take() {
                prev.flush(&mut requirements);
            }
            pending = Some(PendingRequirement::new(&caps[1], &caps[2]));
        } else if let Some(req) = pending.as_mut() {
            if let Some(caps) = PRIORITY_LINE.captures(line) {
                req.priority_value = caps[1].trim().to_string();
            } else if let Some(caps) = STATUS_LINE.captures(line) {
                req.status = caps[1].trim().to_string();
            }
        }
    }

    if let Some(prev) = pending.take() {
        prev.flush(&mut requirements);
    }

    requirements
}

/// Read and parse a requirements document from disk.
///
/// Existence and degradation policy live with the caller; this function
/// simply fails on unreadable input.
pub fn load_requirements(path: &Path) -> Result<BTreeMap<String, Requirement>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read requirements file {}", path.display()))?;
    Ok(parse_requirements(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "\
# Operational Requirements

## Logging

- **TOR-1.1**: Must log errors
  - **Priority**: High
  - **Impl Status**: Implemented
- **TOR-1.2**: Must rotate log files
  - **Priority**: Low
- **TOR-2.1**: Must validate input boundaries
  - **Impl Status**: Partial
";

    // ---- happy path tests ----

    #[test]
    fn parses_requirement_with_full_metadata() {
        let reqs = parse_requirements(SAMPLE);
        let req = &reqs["TOR-1.1"];
        assert_eq!(req.text, "Must log errors");
        assert_eq!(req.priority, Priority::High);
        assert_eq!(req.status, "Implemented");
    }

    #[test]
    fn missing_metadata_defaults_to_unknown() {
        let reqs = parse_requirements(SAMPLE);
        assert_eq!(reqs["TOR-1.2"].status, "Unknown");
        assert_eq!(reqs["TOR-2.1"].priority, Priority::Unknown);
    }

    #[test]
    fn last_requirement_is_flushed_at_eof() {
        let reqs = parse_requirements(SAMPLE);
        assert_eq!(reqs.len(), 3);
        assert!(reqs.contains_key("TOR-2.1"));
    }

    #[test]
    fn map_iterates_in_id_order() {
        let reqs = parse_requirements(SAMPLE);
        let ids: Vec<&str> = reqs.keys().map(String::as_str).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    // ---- state machine edge cases ----

    #[test]
    fn duplicate_id_last_occurrence_wins() {
        let doc = "\
- **TOR-1.1**: First description
  - **Priority**: Low
- **TOR-1.1**: Second description
  - **Priority**: Critical
";
        let reqs = parse_requirements(doc);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs["TOR-1.1"].text, "Second description");
        assert_eq!(reqs["TOR-1.1"].priority, Priority::Critical);
    }

    #[test]
    fn metadata_before_any_requirement_is_ignored() {
        let doc = "\
  - **Priority**: Critical
  - **Impl Status**: Implemented
- **TOR-3.1**: Actual requirement
";
        let reqs = parse_requirements(doc);
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs["TOR-3.1"].priority, Priority::Unknown);
        assert_eq!(reqs["TOR-3.1"].status, "Unknown");
    }

    #[test]
    fn metadata_attributes_to_current_requirement_only() {
        let doc = "\
- **TOR-1.1**: First
- **TOR-1.2**: Second
  - **Priority**: Critical
";
        let reqs = parse_requirements(doc);
        assert_eq!(reqs["TOR-1.1"].priority, Priority::Unknown);
        assert_eq!(reqs["TOR-1.2"].priority, Priority::Critical);
    }

    #[test]
    fn indented_requirement_bullet_is_not_a_start() {
        let doc = "  - **TOR-9.9**: Indented, not a top-level requirement\n";
        assert!(parse_requirements(doc).is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped_silently() {
        let doc = "\
random prose
- **not-an-id**: lowercase prefix
- **TOR**: no numeric segment
- **TOR-4.2**: Valid one
*** stray markup ***
";
        let reqs = parse_requirements(doc);
        assert_eq!(reqs.len(), 1);
        assert!(reqs.contains_key("TOR-4.2"));
    }

    #[test]
    fn empty_document_yields_empty_map() {
        assert!(parse_requirements("").is_empty());
    }

    #[test]
    fn id_pattern_accepts_dotted_segments() {
        let doc = "- **REQ-10.2.1**: Deeply dotted\n";
        let reqs = parse_requirements(doc);
        assert!(reqs.contains_key("REQ-10.2.1"));
    }

    #[test]
    fn multi_word_priority_classifies_unknown() {
        let doc = "\
- **TOR-5.1**: Something
  - **Priority**: Very High
";
        let reqs = parse_requirements(doc);
        assert_eq!(reqs["TOR-5.1"].priority, Priority::Unknown);
    }

    #[test]
    fn status_with_hyphen_is_kept_whole() {
        let doc = "\
- **TOR-6.1**: Something
  - **Impl Status**: Partial - blocked on review
";
        let reqs = parse_requirements(doc);
        assert_eq!(reqs["TOR-6.1"].status, "Partial - blocked on review");
    }

    // ---- load_requirements tests ----

    #[test]
    fn load_requirements_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requirements.md");
        std::fs::write(&path, SAMPLE).unwrap();
        let reqs = load_requirements(&path).unwrap();
        assert_eq!(reqs.len(), 3);
    }

    #[test]
    fn load_requirements_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_requirements(&dir.path().join("absent.md")).is_err());
    }

    proptest! {
        #[test]
        fn parsing_is_deterministic(doc in "\\PC*") {
            let first = parse_requirements(&doc);
            let second = parse_requirements(&doc);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn parsed_ids_match_the_id_shape(doc in "\\PC*") {
            for id in parse_requirements(&doc).keys() {
                prop_assert!(id.contains('-'));
                let (alpha, num) = id.split_once('-').unwrap();
                prop_assert!(alpha.chars().all(|c| c.is_ascii_uppercase()));
                prop_assert!(num.chars().all(|c| c.is_ascii_digit() || c == '.'));
            }
        }
    }
}
