use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use reqtrace_config as cli;
use reqtrace_format as format;
use reqtrace_html as html;
use reqtrace_model as model;
use reqtrace_parse as parse;
use reqtrace_scan as scan;
use reqtrace_types::{Requirement, ToolInfo};

use crate::project_root;

/// Progress output gate. Warnings bypass it and go to stderr unconditionally.
struct Console {
    quiet: bool,
}

impl Console {
    fn say(&self, msg: &str) {
        if !self.quiet {
            println!("{msg}");
        }
    }
}

pub(crate) fn handle(args: &cli::CliGenerateArgs) -> Result<()> {
    let root = resolve_root(args)?;
    let file_config = cli::load_file_config(&root)?;
    let settings = cli::resolve(args, file_config.as_ref());
    let console = Console {
        quiet: settings.quiet,
    };
    console.say(&format!("Project root: {}", root.display()));

    // Parse requirements. A missing or unreadable document degrades to an
    // empty set; ending up with zero requirements overall is fatal.
    let requirements_path = root.join(&settings.requirements);
    let requirements = load_requirements_lenient(&requirements_path);
    console.say(&format!(
        "Parsed {} requirements from {}",
        requirements.len(),
        requirements_path.display()
    ));
    if requirements.is_empty() {
        bail!(
            "No requirements parsed from {}",
            requirements_path.display()
        );
    }

    // Scan test trees for requirement references.
    console.say("Scanning test files...");
    let scan_roots: Vec<PathBuf> = settings.test_roots.iter().map(|r| root.join(r)).collect();
    let tests = scan::scan_test_roots(&root, &scan_roots, &settings.extension)?;
    console.say(&format!(
        "Found {} requirement-to-test mappings across {} requirements",
        scan::total_mappings(&tests),
        tests.len()
    ));
    warn_undocumented_ids(&requirements, &tests);

    // Aggregate once; both renderers consume the same numbers.
    let summary = model::summarize(&requirements, &tests);

    let meta = format::ReportMeta {
        requirements_path: display_rel(&settings.requirements),
        test_roots: settings.test_roots.iter().map(|r| display_rel(r)).collect(),
        markdown_out: display_rel(&settings.markdown_out),
        html_out: display_rel(&settings.html_out),
        tool: ToolInfo::current(),
    };
    let generated_at = format::timestamp_utc();
    let markdown = format::render_markdown(&requirements, &tests, &summary, &meta, &generated_at);

    let markdown_path = root.join(&settings.markdown_out);
    format::write_report(&markdown_path, &markdown)?;
    console.say(&format!(
        "Markdown trace matrix written to {}",
        markdown_path.display()
    ));

    let html_path = root.join(&settings.html_out);
    format::write_report(&html_path, &html::render(&markdown))?;
    console.say(&format!(
        "HTML trace matrix written to {}",
        html_path.display()
    ));

    let overall = summary.all.overall;
    console.say(&format!(
        "Coverage: {}/{} requirements ({:.1}%)",
        overall.covered,
        overall.total,
        overall.pct()
    ));

    if let Some(threshold) = settings.fail_under
        && overall.pct() < threshold
    {
        bail!(
            "Coverage {:.1}% is below the --fail-under threshold {threshold:.1}%",
            overall.pct()
        );
    }

    Ok(())
}

fn resolve_root(args: &cli::CliGenerateArgs) -> Result<PathBuf> {
    if let Some(root) = &args.root {
        return Ok(root.clone());
    }
    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    Ok(project_root::discover(&cwd).unwrap_or_else(|| {
        eprintln!(
            "Warning: no project markers found; using working directory {}",
            cwd.display()
        );
        cwd
    }))
}

/// Missing-input policy for the requirements document: warn and continue
/// with an empty set rather than aborting the run.
fn load_requirements_lenient(path: &Path) -> BTreeMap<String, Requirement> {
    if !path.exists() {
        eprintln!("Warning: requirements file not found at {}", path.display());
        return BTreeMap::new();
    }
    match parse::load_requirements(path) {
        Ok(requirements) => requirements,
        Err(err) => {
            eprintln!("Error parsing requirements file: {err:#}");
            BTreeMap::new()
        }
    }
}

/// Ids referenced from tests but absent from the document get a console
/// warning; they still produce no matrix rows.
fn warn_undocumented_ids(
    requirements: &BTreeMap<String, Requirement>,
    tests: &scan::TestRefMap,
) {
    let unknown: Vec<&str> = tests
        .keys()
        .filter(|id| !requirements.contains_key(*id))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        eprintln!(
            "Warning: {} referenced requirement id(s) not found in the requirements document: {}",
            unknown.len(),
            unknown.join(", ")
        );
    }
}

fn display_rel(path: &Path) -> String {
    let display = path.to_string_lossy();
    if display.contains('\\') {
        display.replace('\\', "/")
    } else {
        display.into_owned()
    }
}
