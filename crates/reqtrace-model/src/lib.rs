//! # reqtrace-model
//!
//! **Tier 2 (Aggregation)**
//!
//! Coverage statistics over parsed requirements and scanned test references.
//! Computed once per run and shared by every renderer, so the numbers in the
//! Markdown and HTML artifacts cannot drift apart.
//!
//! ## What belongs here
//! * Covered/total counting, overall and per priority bucket
//! * The implemented-only subset view
//!
//! ## What does NOT belong here
//! * Parsing or scanning
//! * Rendering

use std::collections::BTreeMap;

use serde::Serialize;

use reqtrace_types::{Priority, Requirement, TestRef};

/// A covered/total pair for one requirement subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoverageStat {
    pub covered: usize,
    pub total: usize,
}

impl CoverageStat {
    /// Coverage percentage; 0 for an empty subset rather than a division
    /// error.
    #[must_use]
    pub fn pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.covered as f64 / self.total as f64 * 100.0
        }
    }
}

/// Coverage for one requirement subset: the overall stat plus per-priority
/// stats in fixed bucket order. Buckets with no requirements are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsetCoverage {
    pub overall: CoverageStat,
    pub by_priority: Vec<(Priority, CoverageStat)>,
}

/// The two coverage views every report carries: all requirements, and the
/// subset whose implementation status is exactly `Implemented`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub all: SubsetCoverage,
    pub implemented: SubsetCoverage,
}

/// Compute both coverage views. A requirement counts as covered when its id
/// appears as a key in the scan output, regardless of how many tests
/// reference it.
#[must_use]
pub fn summarize(
    requirements: &BTreeMap<String, Requirement>,
    tests: &BTreeMap<String, Vec<TestRef>>,
) -> CoverageSummary {
    let all: Vec<&Requirement> = requirements.values().collect();
    let implemented: Vec<&Requirement> = requirements
        .values()
        .filter(|r| r.is_implemented())
        .collect();

    CoverageSummary {
        all: subset_coverage(&all, tests),
        implemented: subset_coverage(&implemented, tests),
    }
}

fn subset_coverage(
    subset: &[&Requirement],
    tests: &BTreeMap<String, Vec<TestRef>>,
) -> SubsetCoverage {
    let total = subset.len();
    let covered = subset.iter().filter(|r| tests.contains_key(&r.id)).count();

    let mut by_priority = Vec::new();
    for bucket in Priority::BUCKETS {
        let in_bucket: Vec<&&Requirement> =
            subset.iter().filter(|r| r.priority == bucket).collect();
        if in_bucket.is_empty() {
            continue;
        }
        by_priority.push((
            bucket,
            CoverageStat {
                covered: in_bucket
                    .iter()
                    .filter(|r| tests.contains_key(&r.id))
                    .count(),
                total: in_bucket.len(),
            },
        ));
    }

    SubsetCoverage {
        overall: CoverageStat { covered, total },
        by_priority,
    }
}
