//! # reqtrace-types
//!
//! **Tier 0 (Core Types)**
//!
//! This crate defines the core data structures shared across `reqtrace`.
//! It contains only data types and Serde definitions.
//!
//! ## What belongs here
//! * Pure data structs (requirements, test references, tool identity)
//! * The fixed priority bucket enumeration
//!
//! ## What does NOT belong here
//! * File I/O
//! * Regex extraction
//! * Coverage math (use reqtrace-model)

use serde::{Deserialize, Serialize};

/// Priority bucket for a requirement.
///
/// Buckets are a closed set: any recorded priority whose leading word-token is
/// not one of the four exact names lands in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

impl Priority {
    /// Fixed reporting order for priority breakdowns.
    pub const BUCKETS: [Priority; 5] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::Unknown,
    ];

    /// Classify a recorded priority value by its first word-token.
    ///
    /// `"Critical (P0)"` classifies as `Critical`; `"Very High"` classifies
    /// as `Unknown` because `Very` is not a bucket name.
    #[must_use]
    pub fn classify(value: &str) -> Priority {
        let token = value
            .trim()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .find(|s| !s.is_empty())
            .unwrap_or("");
        match token {
            "Critical" => Priority::Critical,
            "High" => Priority::High,
            "Medium" => Priority::Medium,
            "Low" => Priority::Low,
            _ => Priority::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single parsed requirement.
///
/// The identifier is the map key wherever requirements are stored; it is kept
/// on the struct as well so rows can be rendered without the surrounding map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub text: String,
    pub priority: Priority,
    /// Free-text implementation status. `"Unknown"` until the document says
    /// otherwise; the implemented-only coverage view matches `"Implemented"`
    /// exactly.
    pub status: String,
}

impl Requirement {
    #[must_use]
    pub fn is_implemented(&self) -> bool {
        self.status == "Implemented"
    }
}

/// One test that references a requirement: a project-root-relative file path
/// (always `/`-separated) and the test case function name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRef {
    pub file: String,
    pub test: String,
}

/// Tool identity stamped into report footers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

impl ToolInfo {
    #[must_use]
    pub fn current() -> Self {
        ToolInfo {
            name: "reqtrace".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
