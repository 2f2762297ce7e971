//! Output formatting for cursor listings and tail summaries.
//!
//! Supports a table view and JSON for programmatic use.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{CursorStatus, TailSummary};

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// JSON format for programmatic use.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {s}. Use: table, json")),
        }
    }
}

/// Formats stored cursors as JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_cursors_json(cursors: &[CursorStatus]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(cursors)
}

/// Formats a table listing of stored cursors.
#[must_use]
pub fn format_cursors_table(cursors: &[CursorStatus]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["File", "Offset", "Size", "Unread"]);

    for cursor in cursors {
        let size = cursor
            .file_size
            .map_or_else(|| "missing".to_string(), |s| s.to_string());

        let unread = if cursor.is_truncated() {
            "truncated".to_string()
        } else {
            cursor
                .unread_bytes()
                .map_or_else(|| "-".to_string(), |n| n.to_string())
        };

        table.add_row(vec![
            cursor.path.display().to_string(),
            cursor.offset.to_string(),
            size,
            unread,
        ]);
    }

    table.to_string()
}

/// Formats the result of a tail run for stderr.
#[must_use]
pub fn format_tail_summary(summary: &TailSummary) -> String {
    let failed = summary.failures().count();
    let mut out = format!(
        "{}\n  Files: {}\n  Lines: {}\n  Failed: {}",
        "📄 Tail summary".bold(),
        summary.outcomes.len().to_string().cyan(),
        summary.total_lines().to_string().green(),
        if failed == 0 {
            failed.to_string().normal()
        } else {
            failed.to_string().red()
        }
    );

    for outcome in summary.failures() {
        if let Some(err) = &outcome.error {
            out.push_str(&format!("\n  {} {err}", "✗".red()));
        }
    }

    out
}
