//! Table output formatting for CLI commands
//!
//! Scan summaries rendered with comfy-table. Colors follow `NO_COLOR` and
//! `TERM=dumb`.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::OutcomeKind;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub const fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// One row per outcome kind with its count.
    pub fn format_outcome_counts(&self, counts: &[(OutcomeKind, u64)]) -> String {
        let mut table = Self::create_base_table();
        table.set_header(vec![
            Cell::new("Outcome").add_attribute(Attribute::Bold),
            Cell::new("Games").add_attribute(Attribute::Bold),
        ]);

        for (kind, count) in counts {
            let label = Cell::new(kind.as_str());
            let label = if self.use_colors {
                label.fg(kind_color(*kind))
            } else {
                label
            };
            table.add_row(vec![
                label,
                Cell::new(count).set_alignment(CellAlignment::Right),
            ]);
        }

        table.to_string()
    }

    /// Two-column key/value table.
    pub fn format_details(&self, rows: &[(&str, String)]) -> String {
        let mut table = Self::create_base_table();
        for (key, value) in rows {
            let key = Cell::new(key);
            let key = if self.use_colors {
                key.add_attribute(Attribute::Bold)
            } else {
                key
            };
            table.add_row(vec![key, Cell::new(value)]);
        }
        table.to_string()
    }

    fn create_base_table() -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM"), Ok(term) if term == "dumb")
}

const fn kind_color(kind: OutcomeKind) -> Color {
    match kind {
        OutcomeKind::Downloaded => Color::Green,
        OutcomeKind::Failed => Color::Red,
        OutcomeKind::Skipped => Color::DarkGrey,
        OutcomeKind::PatchMismatch => Color::Yellow,
    }
}
