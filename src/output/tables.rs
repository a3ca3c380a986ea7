use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use super::styling::heading;

/// Table and cell creation helpers
fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn skip_cell(skip: bool) -> Cell {
    if skip {
        Cell::new("skip").fg(TableColor::DarkGrey)
    } else {
        Cell::new("run").fg(TableColor::Green)
    }
}

fn skip_table(features: &[(String, bool)]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Feature", "Tests"]);
    for (feature, skip) in features {
        table.add_row(vec![Cell::new(feature), skip_cell(*skip)]);
    }
    table
}

/// Prints a feature/skip overview to stderr.
pub fn print_skip_summary(features: &[(String, bool)]) {
    if features.is_empty() {
        return;
    }
    eprintln!("{}", heading("Feature selection"));
    eprintln!("{}", skip_table(features));
}
