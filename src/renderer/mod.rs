//! Markdown renderer module
//!
//! Renders chart listings and run reports as Markdown for the terminal.

use crate::models::{ChartEntry, RunReport};

/// Markdown renderer for listings and reports
pub struct Renderer {
    /// Titles longer than this are cut with an ellipsis in tables
    max_title_chars: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            max_title_chars: 60,
        }
    }
}

impl Renderer {
    #[cfg(test)]
    fn with_max_title_chars(max_title_chars: usize) -> Self {
        Self { max_title_chars }
    }

    /// Render a chart listing as a table
    pub fn render_chart_list(&self, entries: &[ChartEntry]) -> String {
        let mut output = String::new();

        output.push_str("# Charts\n\n");
        output.push_str(&format!("**Total:** {}\n", entries.len()));

        if entries.is_empty() {
            output.push_str("\nNo charts found.");
            return output;
        }

        output.push_str("\n| ID | Title | Type | Folder | Last modified |\n");
        output.push_str("|----|-------|------|--------|---------------|\n");

        for entry in entries {
            let chart = &entry.chart;
            let folder = if entry.folder_path.is_empty() {
                chart.folder_id.map(|id| id.to_string()).unwrap_or_default()
            } else {
                entry.folder_path.clone()
            };
            let modified = chart
                .last_modified
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();

            output.push_str(&format!(
                "| `{}` | {} | {} | {} | {} |\n",
                chart.id,
                escape_cell(&self.truncate(&chart.title)),
                escape_cell(chart.chart_type.as_deref().unwrap_or("")),
                escape_cell(&folder),
                modified
            ));
        }

        output.trim_end().to_string()
    }

    /// Render the outcome of an exporter run
    pub fn render_report(&self, heading: &str, report: &RunReport) -> String {
        let stats = report.stats();
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", heading));
        output.push_str("## Summary\n\n");
        output.push_str("| Category | Count |\n");
        output.push_str("|----------|-------|\n");
        output.push_str(&format!("| Charts | {} |\n", stats.charts_seen));
        if stats.rows > 0 {
            output.push_str(&format!("| Rows | {} |\n", stats.rows));
        }
        output.push_str(&format!("| Files written | {} |\n", stats.files_written));
        output.push_str(&format!("| Skipped | {} |\n", stats.skipped));
        output.push_str(&format!("| Failed | {} |", stats.failed));

        if !report.written.is_empty() {
            output.push_str("\n\n## Written\n\n");
            for path in &report.written {
                output.push_str(&format!("- `{}`\n", path.display()));
            }
        }

        if !report.skipped.is_empty() {
            output.push_str("\n\n## Skipped\n\n");
            for skipped in &report.skipped {
                output.push_str(&format!("- `{}`: {}\n", skipped.chart_id, skipped.reason));
            }
        }

        if !report.failures.is_empty() {
            output.push_str("\n\n## Failures\n\n");
            for failure in &report.failures {
                output.push_str(&format!("- `{}`: {}\n", failure.chart_id, failure.error));
            }
        }

        output.trim_end().to_string()
    }

    fn truncate(&self, text: &str) -> String {
        if text.chars().count() <= self.max_title_chars {
            return text.to_string();
        }
        let cut: String = text.chars().take(self.max_title_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Keep cell text from breaking the table
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
