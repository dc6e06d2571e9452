//! # reqtrace-html
//!
//! **Tier 3 (Formatting Adapter)**
//!
//! Converts the Markdown trace-matrix report into a self-contained HTML page:
//! a table-supporting Markdown subset converter plus a fixed dark-theme
//! template with a client-side status-badge script.
//!
//! The converter covers exactly what the Markdown renderer emits: `#`/`##`/
//! `###` headings, paragraphs, bullet lists, and pipe tables. Cell text is
//! HTML-escaped; `\|` escapes and literal `<br>` separators inside cells are
//! honored. Everything else passes through as escaped text.

use std::sync::LazyLock;

use regex::Regex;

static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex literal"));

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex literal"));

/// Render a complete HTML page for a Markdown report.
#[must_use]
pub fn render(markdown: &str) -> String {
    const TEMPLATE: &str = include_str!("templates/report.html");
    TEMPLATE.replace("{{BODY}}", &markdown_to_html(markdown))
}

/// Convert the report's Markdown subset to an HTML body fragment.
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut html = String::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() {
            i += 1;
        } else if let Some(rest) = line.strip_prefix("### ") {
            html.push_str(&format!("<h3>{}</h3>\n", inline_html(rest)));
            i += 1;
        } else if let Some(rest) = line.strip_prefix("## ") {
            html.push_str(&format!("<h2>{}</h2>\n", inline_html(rest)));
            i += 1;
        } else if let Some(rest) = line.strip_prefix("# ") {
            html.push_str(&format!("<h1>{}</h1>\n", inline_html(rest)));
            i += 1;
        } else if line.starts_with('|') {
            let end = table_end(&lines, i);
            html.push_str(&table_html(&lines[i..end]));
            i = end;
        } else if line.starts_with("- ") {
            let end = list_end(&lines, i);
            html.push_str("<ul>\n");
            for item in &lines[i..end] {
                html.push_str(&format!("<li>{}</li>\n", inline_html(&item[2..])));
            }
            html.push_str("</ul>\n");
            i = end;
        } else {
            let end = paragraph_end(&lines, i);
            let text: Vec<String> = lines[i..end].iter().map(|l| inline_html(l)).collect();
            html.push_str(&format!("<p>{}</p>\n", text.join("\n")));
            i = end;
        }
    }

    html
}

fn table_end(lines: &[&str], start: usize) -> usize {
    let mut end = start;
    while end < lines.len() && lines[end].starts_with('|') {
        end += 1;
    }
    end
}

fn list_end(lines: &[&str], start: usize) -> usize {
    let mut end = start;
    while end < lines.len() && lines[end].starts_with("- ") {
        end += 1;
    }
    end
}

fn paragraph_end(lines: &[&str], start: usize) -> usize {
    let mut end = start;
    while end < lines.len() {
        let line = lines[end];
        if line.trim().is_empty()
            || line.starts_with('#')
            || line.starts_with('|')
            || line.starts_with("- ")
        {
            break;
        }
        end += 1;
    }
    end
}

fn table_html(rows: &[&str]) -> String {
    let mut html = String::from("<table>\n");
    let mut body_open = false;

    for (idx, row) in rows.iter().enumerate() {
        let cells = split_cells(row);
        if idx == 1 && is_separator_row(&cells) {
            continue;
        }
        let tag = if idx == 0 { "th" } else { "td" };
        if idx == 0 {
            html.push_str("<thead>\n");
        } else if !body_open {
            html.push_str("<tbody>\n");
            body_open = true;
        }
        html.push_str("<tr>");
        for cell in &cells {
            html.push_str(&format!("<{tag}>{}</{tag}>", inline_html(cell)));
        }
        html.push_str("</tr>\n");
        if idx == 0 {
            html.push_str("</thead>\n");
        }
    }

    if body_open {
        html.push_str("</tbody>\n");
    }
    html.push_str("</table>\n");
    html
}

/// Split a table row on unescaped pipes; `\|` yields a literal `|` inside the
/// cell. Leading and trailing delimiters are consumed.
fn split_cells(row: &str) -> Vec<String> {
    let row = row.trim();
    let inner = row.strip_prefix('|').unwrap_or(row);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                chars.next();
                current.push('|');
            }
            '|' => {
                cells.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

fn is_separator_row(cells: &[String]) -> bool {
    cells
        .iter()
        .all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':'))
}

/// Escape a text span, then apply inline `**bold**` / `` `code` `` rewrites
/// and restore literal `<br>` separators.
fn inline_html(text: &str) -> String {
    let escaped = escape_html(text).replace("&lt;br&gt;", "<br>");
    let bold = BOLD_SPAN.replace_all(&escaped, "<strong>$1</strong>");
    CODE_SPAN.replace_all(&bold, "<code>$1</code>").into_owned()
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- block conversion tests ----

    #[test]
    fn headings_convert_by_level() {
        let html = markdown_to_html("# One\n\n## Two\n\n### Three\n");
        assert!(html.contains("<h1>One</h1>"));
        assert!(html.contains("<h2>Two</h2>"));
        assert!(html.contains("<h3>Three</h3>"));
    }

    #[test]
    fn paragraph_renders_bold_and_code() {
        let html = markdown_to_html("**Generated:** 2026-01-01 with `reqtrace`\n");
        assert!(html.contains("<p><strong>Generated:</strong> 2026-01-01 with <code>reqtrace</code></p>"));
    }

    #[test]
    fn bullet_list_becomes_ul() {
        let html = markdown_to_html("- **First:** a\n- second\n");
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li><strong>First:</strong> a</li>"));
        assert!(html.contains("<li>second</li>"));
        assert!(html.contains("</ul>"));
    }

    #[test]
    fn table_converts_with_thead_and_tbody() {
        let md = "\
| A | B |
|---|---|
| 1 | 2 |
| 3 | 4 |
";
        let html = markdown_to_html(md);
        assert!(html.contains("<thead>\n<tr><th>A</th><th>B</th></tr>\n</thead>"));
        assert!(html.contains("<tbody>"));
        assert!(html.contains("<tr><td>1</td><td>2</td></tr>"));
        assert!(html.contains("<tr><td>3</td><td>4</td></tr>"));
        assert!(!html.contains("---"));
    }

    #[test]
    fn header_only_table_has_no_tbody() {
        let html = markdown_to_html("| A | B |\n|---|---|\n");
        assert!(html.contains("<thead>"));
        assert!(!html.contains("<tbody>"));
    }

    // ---- cell handling tests ----

    #[test]
    fn escaped_pipe_stays_inside_cell() {
        let html = markdown_to_html("| A |\n|---|\n| a\\|b |\n");
        assert!(html.contains("<td>a|b</td>"));
    }

    #[test]
    fn cell_text_is_html_escaped() {
        let html = markdown_to_html("| A |\n|---|\n| <script>alert(1)</script> |\n");
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn br_separators_survive_inside_cells() {
        let html = markdown_to_html("| A |\n|---|\n| one<br>two<br> |\n");
        assert!(html.contains("<td>one<br>two<br></td>"));
    }

    #[test]
    fn bold_renders_inside_cells() {
        let html = markdown_to_html("| A |\n|---|\n| **Total:** 5 |\n");
        assert!(html.contains("<td><strong>Total:</strong> 5</td>"));
    }

    #[test]
    fn split_cells_handles_plain_row() {
        assert_eq!(split_cells("| a | b | c |"), vec!["a", "b", "c"]);
    }

    // ---- page template tests ----

    #[test]
    fn render_wraps_body_in_template() {
        let html = render("# Requirements Trace Matrix\n");
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Requirements Trace Matrix</h1>"));
        assert!(html.contains("status-implemented"));
        assert!(html.contains("no test coverage"));
        assert!(html.contains("DOMContentLoaded"));
    }

    #[test]
    fn template_has_no_unfilled_placeholders() {
        let html = render("text\n");
        assert!(!html.contains("{{"));
    }
}
