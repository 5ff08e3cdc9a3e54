//! Flattens the content tree into display sections.
//!
//! One section per top-level module. A module's section always starts with its
//! own row; when the module is expanded its steps follow, each step directly
//! followed by its sub-steps, and each sub-step that is itself expanded by its
//! tools. Expansion is checked at the module level and the sub-step level only.

use std::sync::Arc;

use toolkit_model::{Dataset, DisplayRow, DisplaySection, Module, SelectionAction};
use tracing::debug;

use crate::expansion::ExpansionState;

/// Materialize the standard dataset for `modules` under `expansion`.
pub fn materialize(modules: &[Arc<Module>], expansion: &ExpansionState) -> Dataset {
    let sections: Dataset = modules
        .iter()
        .map(|module| module_section(module, expansion))
        .collect();

    debug!(
        sections = sections.len(),
        expanded = expansion.len(),
        "materialized standard dataset"
    );
    sections
}

fn module_section(module: &Arc<Module>, expansion: &ExpansionState) -> DisplaySection {
    let mut rows = vec![DisplayRow::Module(Arc::clone(module))];

    if expansion.is_expanded(module.identifier) {
        for step in &module.children {
            rows.push(DisplayRow::Step(Arc::clone(step)));
            push_sub_steps(step, expansion, &mut rows);
        }
    }

    DisplaySection::new(rows).with_selection(SelectionAction::ToggleExpansion)
}

fn push_sub_steps(step: &Module, expansion: &ExpansionState, rows: &mut Vec<DisplayRow>) {
    for sub_step in &step.children {
        rows.push(DisplayRow::SubStep(Arc::clone(sub_step)));
        if expansion.is_expanded(sub_step.identifier) {
            rows.extend(
                sub_step
                    .children
                    .iter()
                    .map(|tool| DisplayRow::Tool(Arc::clone(tool))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Vec<Arc<Module>> {
        vec![
            Arc::new(Module::new(1).with_children([
                Module::new(2).with_children([
                    Module::new(3).with_children([Module::new(4), Module::new(5)]),
                ]),
                Module::new(6),
            ])),
            Arc::new(Module::new(7)),
        ]
    }

    fn ids(section: &DisplaySection) -> Vec<(usize, i64)> {
        section
            .rows
            .iter()
            .map(|row| (row.depth(), row.identifier().unwrap_or(-1)))
            .collect()
    }

    #[test]
    fn test_empty_modules() {
        assert!(materialize(&[], &ExpansionState::new()).is_empty());
    }

    #[test]
    fn test_collapsed_shows_module_rows_only() {
        let sections = materialize(&tree(), &ExpansionState::new());
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|s| s.len() == 1));
        assert!(matches!(sections[0].rows[0], DisplayRow::Module(_)));
    }

    #[test]
    fn test_module_expansion_shows_steps_and_sub_steps() {
        let expansion: ExpansionState = [1].into_iter().collect();
        let sections = materialize(&tree(), &expansion);
        assert_eq!(ids(&sections[0]), vec![(0, 1), (1, 2), (2, 3), (1, 6)]);
        assert_eq!(ids(&sections[1]), vec![(0, 7)]);
    }

    #[test]
    fn test_sub_step_expansion_needs_module_expansion() {
        let only_sub_step: ExpansionState = [3].into_iter().collect();
        assert_eq!(ids(&materialize(&tree(), &only_sub_step)[0]), vec![(0, 1)]);

        let both: ExpansionState = [1, 3].into_iter().collect();
        assert_eq!(
            ids(&materialize(&tree(), &both)[0]),
            vec![(0, 1), (1, 2), (2, 3), (3, 4), (3, 5), (1, 6)]
        );
    }

    #[test]
    fn test_expanded_leaf_module() {
        let expansion: ExpansionState = [7].into_iter().collect();
        let sections = materialize(&tree(), &expansion);
        assert_eq!(ids(&sections[1]), vec![(0, 7)]);
    }

    #[test]
    fn test_unknown_identifier_changes_nothing() {
        let baseline = materialize(&tree(), &ExpansionState::new());
        let expansion: ExpansionState = [999].into_iter().collect();
        assert_eq!(materialize(&tree(), &expansion), baseline);
    }
}
