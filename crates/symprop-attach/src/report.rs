//! Markdown report rendering for attachment runs.
//!
//! A report is written for every run, successful or not. On failure the stats
//! are absent, the counts render as zero, and the caught error message appears
//! in the error list.

use std::fs;
use std::io;
use std::path::Path;

use chrono::Local;

use crate::attach::AttachStats;

/// Everything the report renderer needs to know about one run.
#[derive(Debug, Default)]
pub struct ReportContext<'a> {
    pub input_path: String,
    pub output_path: String,
    pub stats: Option<&'a AttachStats>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Render the report body. Split out from the writer so it can be tested
/// without touching the filesystem.
pub fn render_markdown_report(ctx: &ReportContext<'_>, timestamp: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("# Attachment Report\n".to_string());
    lines.push(format!("**Input**: `{}`  ", ctx.input_path));
    lines.push(format!("**Output**: `{}`\n", ctx.output_path));
    lines.push(format!("**Timestamp**: `{timestamp}`\n"));

    lines.push("\n## Summary\n".to_string());
    let (processed, added, skipped) = match ctx.stats {
        Some(stats) => (
            stats.symbols_processed,
            stats.properties_added,
            stats.properties_skipped,
        ),
        None => (0, 0, 0),
    };
    lines.push(format!("- Processed: **{processed}**"));
    lines.push(format!("- Added: **{added}**"));
    lines.push(format!("- Skipped: **{skipped}**\n"));

    lines.push("## Errors\n".to_string());
    if ctx.errors.is_empty() {
        lines.push("- None\n".to_string());
    } else {
        for error in &ctx.errors {
            lines.push(format!("- ❌ **ERROR**: {error}"));
        }
    }

    lines.push("## Warnings\n".to_string());
    if ctx.warnings.is_empty() {
        lines.push("- None\n".to_string());
    } else {
        for warning in &ctx.warnings {
            lines.push(format!("- ⚠️ **WARNING**: {warning}"));
        }
    }

    lines.push("## Skipped Symbols (already had property)\n".to_string());
    match ctx.stats {
        Some(stats) if !stats.skipped_symbols.is_empty() => {
            for name in &stats.skipped_symbols {
                lines.push(format!("- `{name}`"));
            }
        }
        _ => lines.push("- None\n".to_string()),
    }

    lines.join("\n")
}

/// Render and write the report, creating parent directories as needed.
pub fn write_markdown_report(path: &Path, ctx: &ReportContext<'_>) -> io::Result<()> {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let body = render_markdown_report(ctx, &timestamp);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    log::debug!("writing report to {}", path.display());
    fs::write(path, body)
}
