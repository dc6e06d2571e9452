use std::path::Path;

use anyhow::{Context, Result};
use reqtrace_config as cli;

const TEMPLATE: &str = r#"# reqtrace configuration. Every key is optional; CLI flags win over this file.

[paths]
# requirements = "docs/requirements.md"
# markdown_out = "reports/trace_matrix.md"
# html_out     = "reports/trace_matrix.html"

[scan]
# Test directories scanned for requirement ID comments, relative to the
# project root.
# roots = ["tests"]
# Source file extension to scan.
# extension = "cs"
"#;

pub(crate) fn handle(args: &cli::InitArgs) -> Result<()> {
    write_template(&args.dir, args.force)
}

fn write_template(dir: &Path, force: bool) -> Result<()> {
    let path = dir.join(cli::CONFIG_FILE);
    if path.exists() && !force {
        eprintln!(
            "{} already exists. Use --force to overwrite.",
            cli::CONFIG_FILE
        );
        return Ok(());
    }
    std::fs::write(&path, TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("Created {}", path.display());
    Ok(())
}
