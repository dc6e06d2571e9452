//! # reqtrace-config
//!
//! **Tier 4 (Configuration)**
//!
//! CLI argument structs and the `reqtrace.toml` file schema, plus the
//! CLI > file > default resolution that produces one settled view of every
//! path the pipeline touches.
//!
//! ## What belongs here
//! * Clap `Parser`, `Args`, `Subcommand` structs
//! * Configuration file struct definitions (Serde)
//! * Built-in defaults and resolution
//!
//! ## What does NOT belong here
//! * Business logic
//! * I/O operations (except config file parsing)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

/// Config file name looked up at the project root.
pub const CONFIG_FILE: &str = "reqtrace.toml";

/// Marker paths whose joint presence identifies the project root.
pub const ROOT_MARKERS: [&str; 2] = ["docs/requirements.md", "tests"];

pub const DEFAULT_REQUIREMENTS: &str = "docs/requirements.md";
pub const DEFAULT_TEST_ROOT: &str = "tests";
pub const DEFAULT_MARKDOWN_OUT: &str = "reports/trace_matrix.md";
pub const DEFAULT_HTML_OUT: &str = "reports/trace_matrix.html";
pub const DEFAULT_EXTENSION: &str = "cs";

/// `reqtrace` — requirements trace-matrix generator.
///
/// Default mode (no subcommand) generates the trace matrix.
#[derive(Parser, Debug)]
#[command(name = "reqtrace", version, about, long_about = None)]
pub struct Cli {
    /// Default options for the implicit `generate` mode.
    #[command(flatten)]
    pub generate: CliGenerateArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate the trace-matrix artifacts (default).
    Generate(CliGenerateArgs),

    /// Write a `reqtrace.toml` template to the target directory.
    Init(InitArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CliGenerateArgs {
    /// Project root. Discovered from the working directory when omitted.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Requirements document, relative to the project root.
    #[arg(long, value_name = "FILE")]
    pub requirements: Option<PathBuf>,

    /// Test directory to scan, relative to the project root. Repeatable.
    #[arg(long = "test-root", value_name = "DIR")]
    pub test_roots: Vec<PathBuf>,

    /// Markdown artifact path, relative to the project root.
    #[arg(long, value_name = "FILE")]
    pub markdown_out: Option<PathBuf>,

    /// HTML artifact path, relative to the project root.
    #[arg(long, value_name = "FILE")]
    pub html_out: Option<PathBuf>,

    /// Source file extension scanned for requirement references.
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Exit non-zero when overall coverage falls below this percentage.
    #[arg(long, value_name = "PCT")]
    pub fail_under: Option<f64>,

    /// Suppress progress output (warnings still go to stderr).
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Directory to write the template into.
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite an existing reqtrace.toml.
    #[arg(long)]
    pub force: bool,
}

/// `reqtrace.toml` schema. Every key is optional; absent keys fall back to
/// built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub paths: PathsConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub requirements: Option<PathBuf>,
    pub markdown_out: Option<PathBuf>,
    pub html_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub roots: Option<Vec<PathBuf>>,
    pub extension: Option<String>,
}

/// Load `reqtrace.toml` from the project root, if present. A malformed file
/// is an error; a missing one is not.
pub fn load_file_config(root: &Path) -> Result<Option<FileConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(config))
}

/// Fully resolved settings for one generate run. All paths are kept
/// root-relative; callers join the project root for filesystem access and use
/// the relative form for display.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub requirements: PathBuf,
    pub test_roots: Vec<PathBuf>,
    pub markdown_out: PathBuf,
    pub html_out: PathBuf,
    pub extension: String,
    pub fail_under: Option<f64>,
    pub quiet: bool,
}

/// Apply CLI > file > default precedence.
#[must_use]
pub fn resolve(cli: &CliGenerateArgs, file: Option<&FileConfig>) -> ResolvedConfig {
    let paths = file.map(|f| &f.paths);
    let scan = file.map(|f| &f.scan);

    ResolvedConfig {
        requirements: cli
            .requirements
            .clone()
            .or_else(|| paths.and_then(|p| p.requirements.clone()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REQUIREMENTS)),
        test_roots: if !cli.test_roots.is_empty() {
            cli.test_roots.clone()
        } else {
            scan.and_then(|s| s.roots.clone())
                .unwrap_or_else(|| vec![PathBuf::from(DEFAULT_TEST_ROOT)])
        },
        markdown_out: cli
            .markdown_out
            .clone()
            .or_else(|| paths.and_then(|p| p.markdown_out.clone()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MARKDOWN_OUT)),
        html_out: cli
            .html_out
            .clone()
            .or_else(|| paths.and_then(|p| p.html_out.clone()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HTML_OUT)),
        extension: cli
            .extension
            .clone()
            .or_else(|| scan.and_then(|s| s.extension.clone()))
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        fail_under: cli.fail_under,
        quiet: cli.quiet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn resolve_defaults_with_no_overrides() {
        let resolved = resolve(&CliGenerateArgs::default(), None);
        assert_eq!(resolved.requirements, PathBuf::from(DEFAULT_REQUIREMENTS));
        assert_eq!(resolved.test_roots, vec![PathBuf::from(DEFAULT_TEST_ROOT)]);
        assert_eq!(resolved.markdown_out, PathBuf::from(DEFAULT_MARKDOWN_OUT));
        assert_eq!(resolved.html_out, PathBuf::from(DEFAULT_HTML_OUT));
        assert_eq!(resolved.extension, DEFAULT_EXTENSION);
        assert_eq!(resolved.fail_under, None);
    }

    #[test]
    fn file_config_overrides_defaults() {
        let file: FileConfig = toml::from_str(
            r#"
[paths]
requirements = "docs/ops.md"

[scan]
roots = ["test/unit", "test/e2e"]
extension = "fs"
"#,
        )
        .unwrap();
        let resolved = resolve(&CliGenerateArgs::default(), Some(&file));
        assert_eq!(resolved.requirements, PathBuf::from("docs/ops.md"));
        assert_eq!(
            resolved.test_roots,
            vec![PathBuf::from("test/unit"), PathBuf::from("test/e2e")]
        );
        assert_eq!(resolved.extension, "fs");
        // Keys absent from the file still fall back.
        assert_eq!(resolved.markdown_out, PathBuf::from(DEFAULT_MARKDOWN_OUT));
    }

    #[test]
    fn cli_overrides_file_config() {
        let file: FileConfig = toml::from_str("[paths]\nrequirements = \"docs/ops.md\"\n").unwrap();
        let cli = CliGenerateArgs {
            requirements: Some(PathBuf::from("docs/other.md")),
            ..Default::default()
        };
        let resolved = resolve(&cli, Some(&file));
        assert_eq!(resolved.requirements, PathBuf::from("docs/other.md"));
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let parsed: Result<FileConfig, _> = toml::from_str("[paths]\ntypo_key = \"x\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn load_file_config_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn load_file_config_reads_and_parses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[scan]\nextension = \"vb\"\n",
        )
        .unwrap();
        let config = load_file_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.scan.extension.as_deref(), Some("vb"));
    }

    #[test]
    fn load_file_config_malformed_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "not [valid toml").unwrap();
        assert!(load_file_config(dir.path()).is_err());
    }
}
