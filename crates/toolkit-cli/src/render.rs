//! Text rendering of datasets and depth maps.

use std::fmt::Write as _;
use std::sync::Arc;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use toolkit_model::{DisplayRow, DisplaySection, Module, ModuleId};
use toolkit_view::{DepthMap, ToolAction, actions_for};

/// Shown for rows whose module has no attachment title.
const UNTITLED: &str = "(untitled)";

/// Indented outline of `sections`, one line per row.
///
/// Each row shows its title, icon label, identifier and a `*` when critical.
pub fn render_outline(sections: &[DisplaySection]) -> String {
    let mut out = String::new();
    for (index, section) in sections.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        if let Some(header) = &section.header {
            let _ = writeln!(out, "== {header} ==");
        }
        for row in &section.rows {
            let _ = writeln!(out, "{}", outline_row(row));
        }
        if let Some(footer) = &section.footer {
            let _ = writeln!(out, "-- {footer}");
        }
    }
    out
}

fn outline_row(row: &DisplayRow) -> String {
    let indent = "  ".repeat(row.depth());
    let mut line = format!(
        "{indent}{} [{}]",
        title_or_placeholder(row.title()),
        row.icon().label()
    );
    if let Some(id) = row.identifier() {
        let _ = write!(line, " #{id}");
    }
    if row.is_critical() {
        line.push_str(" *");
    }
    line
}

fn title_or_placeholder(title: &str) -> &str {
    if title.is_empty() { UNTITLED } else { title }
}

/// Tool table for grouped results (critical tools or search matches).
pub fn tools_table(sections: &[DisplaySection]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Group", "Tool", "ID", "File", "Actions"]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);

    for section in sections {
        let group = section.header.as_deref().unwrap_or("-");
        for row in &section.rows {
            let actions: Vec<&str> = actions_for(row).iter().map(ToolAction::title).collect();
            table.add_row(vec![
                Cell::new(group),
                Cell::new(title_or_placeholder(row.title())),
                Cell::new(id_text(row.identifier())),
                Cell::new(row.icon().label()),
                Cell::new(actions.join(", ")),
            ]);
        }
    }
    table
}

/// Every module in pre-order with its depth.
pub fn depth_table(modules: &[Arc<Module>], depths: &DepthMap) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Depth", "Kind", "Title"]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Right);

    let mut stack: Vec<&Arc<Module>> = modules.iter().rev().collect();
    while let Some(module) = stack.pop() {
        let depth = module.identifier.and_then(|id| depths.get(id));
        let kind = depth
            .and_then(|d| DisplayRow::at_depth(d, Arc::clone(module)))
            .map_or("-", |row| row.kind_label());
        table.add_row(vec![
            Cell::new(id_text(module.identifier)),
            Cell::new(depth.map_or_else(|| "-".to_string(), |d| d.to_string())),
            Cell::new(kind),
            Cell::new(title_or_placeholder(module.title())),
        ]);
        stack.extend(module.children.iter().rev());
    }
    table
}

fn id_text(id: Option<ModuleId>) -> String {
    id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
