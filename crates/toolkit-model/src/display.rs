//! Display rows and sections.
//!
//! Rows are derived from the tree on every materialization and never mutated
//! in place. The row variant is chosen by tree depth alone.

use std::sync::Arc;

use crate::module::{FileKind, Module, ModuleId};

/// Deepest level that still maps to a row variant (tools).
pub const MAX_ROW_DEPTH: usize = 3;

/// One row of a display dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayRow {
    /// Depth 0.
    Module(Arc<Module>),
    /// Depth 1.
    Step(Arc<Module>),
    /// Depth 2.
    SubStep(Arc<Module>),
    /// Depth 3.
    Tool(Arc<Module>),
}

impl DisplayRow {
    /// Wrap a module in the variant for `depth`. Depths past tools yield `None`.
    #[must_use]
    pub fn at_depth(depth: usize, module: Arc<Module>) -> Option<Self> {
        match depth {
            0 => Some(Self::Module(module)),
            1 => Some(Self::Step(module)),
            2 => Some(Self::SubStep(module)),
            3 => Some(Self::Tool(module)),
            _ => None,
        }
    }

    /// Tree depth this variant stands for.
    #[must_use]
    pub const fn depth(&self) -> usize {
        match self {
            Self::Module(_) => 0,
            Self::Step(_) => 1,
            Self::SubStep(_) => 2,
            Self::Tool(_) => 3,
        }
    }

    pub fn module(&self) -> &Arc<Module> {
        match self {
            Self::Module(m) | Self::Step(m) | Self::SubStep(m) | Self::Tool(m) => m,
        }
    }

    pub fn identifier(&self) -> Option<ModuleId> {
        self.module().identifier
    }

    pub fn title(&self) -> &str {
        self.module().title()
    }

    pub fn icon(&self) -> FileKind {
        self.module().icon()
    }

    pub fn is_critical(&self) -> bool {
        self.module().is_critical()
    }

    #[must_use]
    pub fn is_tool(&self) -> bool {
        matches!(self, Self::Tool(_))
    }

    /// Short label of the variant.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Module(_) => "module",
            Self::Step(_) => "step",
            Self::SubStep(_) => "sub-step",
            Self::Tool(_) => "tool",
        }
    }
}

/// What selecting a row in a section does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAction {
    /// Expand or collapse the selected node.
    ToggleExpansion,
    /// Open the selected tool.
    OpenTool,
}

/// An ordered group of rows with optional header and footer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplaySection {
    pub rows: Vec<DisplayRow>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub selection: Option<SelectionAction>,
}

impl DisplaySection {
    /// Creates a section with rows and no header, footer or selection action.
    #[must_use]
    pub fn new(rows: Vec<DisplayRow>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    #[must_use]
    pub fn with_selection(mut self, action: SelectionAction) -> Self {
        self.selection = Some(action);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A full display dataset.
pub type Dataset = Vec<DisplaySection>;

/// Total number of rows across a dataset.
pub fn row_count(dataset: &[DisplaySection]) -> usize {
    dataset.iter().map(DisplaySection::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_follows_depth() {
        let module = Arc::new(Module::new(7));
        for depth in 0..=MAX_ROW_DEPTH {
            let row = DisplayRow::at_depth(depth, Arc::clone(&module)).expect("row");
            assert_eq!(row.depth(), depth);
            assert_eq!(row.identifier(), Some(7));
        }
        assert!(DisplayRow::at_depth(4, module).is_none());
    }

    #[test]
    fn test_section_builders() {
        let section = DisplaySection::new(vec![DisplayRow::Tool(Arc::new(Module::new(1)))])
            .with_header("Cash transfers")
            .with_selection(SelectionAction::OpenTool);
        assert_eq!(section.len(), 1);
        assert_eq!(section.header.as_deref(), Some("Cash transfers"));
        assert_eq!(section.footer, None);
        assert!(section.rows[0].is_tool());
    }
}
