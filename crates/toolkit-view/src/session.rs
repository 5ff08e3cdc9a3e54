//! Toolkit view session.
//!
//! Owns the content tree, the expansion state and the derived datasets, and
//! publishes whichever dataset the current mode selects. The active dataset is
//! published through a `watch` channel as a whole [`ActiveView`] snapshot, so
//! readers never see a partially replaced dataset or a mode that does not
//! match it.

use std::sync::Arc;

use tokio::sync::watch;
use toolkit_model::{Dataset, Module, ModuleId, SelectionAction};
use tracing::{debug, info};

use crate::depth::{DepthMap, compute_depths};
use crate::expansion::ExpansionState;
use crate::materialize::materialize;

/// Which dataset is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatasetMode {
    /// The expandable tree.
    #[default]
    Standard,
    /// Critical tools grouped by parent.
    CriticalOnly,
    /// Search results grouped by parent.
    SearchResults,
}

/// The dataset on screen together with the mode that selected it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveView {
    pub mode: DatasetMode,
    pub sections: Arc<Dataset>,
}

/// Result of selecting a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The node was expanded (`true`) or collapsed (`false`).
    Toggled { id: ModuleId, expanded: bool },
    /// A leaf or tool was chosen and should be opened.
    Open(Arc<Module>),
}

/// State of one toolkit view session.
#[derive(Debug)]
pub struct ToolkitSession {
    modules: Vec<Arc<Module>>,
    expansion: ExpansionState,
    depths: DepthMap,
    standard: Arc<Dataset>,
    critical: Option<Arc<Dataset>>,
    mode: DatasetMode,
    active: watch::Sender<ActiveView>,
}

impl ToolkitSession {
    /// Start a session showing the standard dataset for `modules`.
    pub fn new(modules: Vec<Arc<Module>>) -> Self {
        let expansion = ExpansionState::new();
        let standard = Arc::new(materialize(&modules, &expansion));
        let depths = compute_depths(&modules);
        let active = watch::Sender::new(ActiveView {
            mode: DatasetMode::Standard,
            sections: Arc::clone(&standard),
        });
        Self {
            modules,
            expansion,
            depths,
            standard,
            critical: None,
            mode: DatasetMode::Standard,
            active,
        }
    }

    pub fn modules(&self) -> &[Arc<Module>] {
        &self.modules
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn depths(&self) -> &DepthMap {
        &self.depths
    }

    pub fn mode(&self) -> DatasetMode {
        self.mode
    }

    /// The dataset currently shown.
    pub fn active(&self) -> Arc<Dataset> {
        Arc::clone(&self.active.borrow().sections)
    }

    /// The standard dataset, whatever is currently shown.
    pub fn standard(&self) -> Arc<Dataset> {
        Arc::clone(&self.standard)
    }

    /// The cached critical dataset, once fetched.
    pub fn critical(&self) -> Option<Arc<Dataset>> {
        self.critical.clone()
    }

    /// Receive every future replacement of the active dataset.
    pub fn subscribe(&self) -> watch::Receiver<ActiveView> {
        self.active.subscribe()
    }

    /// Toggle expansion of `id`, rebuild, and redraw the standard dataset.
    pub fn toggle(&mut self, id: ModuleId) -> bool {
        let expanded = self.expansion.toggle(id);
        debug!(id, expanded, "toggled module");
        self.rebuild_standard();
        self.show_standard();
        expanded
    }

    /// Toggle `module`. Modules without an identifier are ignored.
    pub fn toggle_module(&mut self, module: &Module) -> Option<bool> {
        module.identifier.map(|id| self.toggle(id))
    }

    /// Swap in a new tree. Expansion state carries over by identifier.
    pub fn replace_tree(&mut self, modules: Vec<Arc<Module>>) {
        self.modules = modules;
        self.rebuild_standard();
        if self.mode == DatasetMode::Standard {
            self.publish(Arc::clone(&self.standard));
        }
    }

    pub fn show_standard(&mut self) {
        self.mode = DatasetMode::Standard;
        self.publish(Arc::clone(&self.standard));
    }

    /// Show critical tools. Returns `false` (and changes nothing) until the
    /// critical dataset has been fetched.
    pub fn show_critical(&mut self) -> bool {
        let Some(critical) = self.critical.clone() else {
            debug!("critical dataset not loaded yet");
            return false;
        };
        self.mode = DatasetMode::CriticalOnly;
        self.publish(critical);
        true
    }

    /// Cache a freshly fetched critical dataset.
    pub fn set_critical(&mut self, sections: Dataset) {
        let critical = Arc::new(sections);
        self.critical = Some(Arc::clone(&critical));
        if self.mode == DatasetMode::CriticalOnly {
            self.publish(critical);
        }
    }

    pub fn show_search_results(&mut self, sections: Dataset) {
        self.mode = DatasetMode::SearchResults;
        self.publish(Arc::new(sections));
    }

    /// Select the row at `section`/`row` of the active dataset.
    pub fn select(&mut self, section: usize, row: usize) -> Option<Selection> {
        let active = self.active();
        let section = active.get(section)?;
        let module = Arc::clone(section.rows.get(row)?.module());

        match (section.selection, module.identifier) {
            (Some(SelectionAction::ToggleExpansion), Some(id)) if module.has_children() => {
                let expanded = self.toggle(id);
                Some(Selection::Toggled { id, expanded })
            }
            _ => Some(Selection::Open(module)),
        }
    }

    fn rebuild_standard(&mut self) {
        self.standard = Arc::new(materialize(&self.modules, &self.expansion));
        self.depths = compute_depths(&self.modules);
    }

    fn publish(&self, sections: Arc<Dataset>) {
        info!(mode = ?self.mode, sections = sections.len(), "active dataset replaced");
        self.active.send_replace(ActiveView {
            mode: self.mode,
            sections,
        });
    }
}

#[cfg(test)]
mod tests {
    use toolkit_model::{DisplayRow, DisplaySection, row_count};

    use super::*;

    fn tree() -> Vec<Arc<Module>> {
        vec![Arc::new(Module::new(1).with_children([
            Module::new(2).with_children([Module::new(3).with_children([Module::new(4)])]),
        ]))]
    }

    fn critical_sections() -> Dataset {
        vec![
            DisplaySection::new(vec![DisplayRow::Tool(Arc::new(Module::new(4)))])
                .with_header("Tools"),
        ]
    }

    #[test]
    fn test_new_session_shows_standard() {
        let session = ToolkitSession::new(tree());
        assert_eq!(session.mode(), DatasetMode::Standard);
        assert_eq!(row_count(&session.active()), 1);
        assert_eq!(session.depths().len(), 4);
    }

    #[test]
    fn test_toggle_publishes_rebuilt_standard() {
        let mut session = ToolkitSession::new(tree());
        let mut rx = session.subscribe();

        assert!(session.toggle(1));
        assert!(rx.has_changed().expect("sender alive"));
        let view = rx.borrow_and_update().clone();
        assert_eq!(view.mode, DatasetMode::Standard);
        assert_eq!(row_count(&view.sections), 3);

        assert!(!session.toggle(1));
        assert_eq!(row_count(&session.active()), 1);
    }

    #[test]
    fn test_show_critical_requires_cache() {
        let mut session = ToolkitSession::new(tree());
        assert!(!session.show_critical());
        assert_eq!(session.mode(), DatasetMode::Standard);

        session.set_critical(critical_sections());
        assert!(session.show_critical());
        assert_eq!(session.mode(), DatasetMode::CriticalOnly);
        assert_eq!(session.active()[0].header.as_deref(), Some("Tools"));
    }

    #[test]
    fn test_set_critical_refreshes_visible_critical_dataset() {
        let mut session = ToolkitSession::new(tree());
        session.set_critical(Vec::new());
        session.show_critical();
        assert!(session.active().is_empty());

        session.set_critical(critical_sections());
        assert_eq!(session.active().len(), 1);
    }

    #[test]
    fn test_toggle_returns_to_standard() {
        let mut session = ToolkitSession::new(tree());
        session.show_search_results(critical_sections());
        assert_eq!(session.mode(), DatasetMode::SearchResults);

        session.toggle(1);
        assert_eq!(session.mode(), DatasetMode::Standard);
    }

    #[test]
    fn test_select_toggles_parent_and_opens_leaf() {
        let mut session = ToolkitSession::new(tree());

        assert_eq!(
            session.select(0, 0),
            Some(Selection::Toggled {
                id: 1,
                expanded: true
            })
        );

        session.toggle(3);
        match session.select(0, 3) {
            Some(Selection::Open(module)) => assert_eq!(module.identifier, Some(4)),
            other => panic!("expected tool to open, got {other:?}"),
        }
        assert_eq!(session.select(5, 0), None);
    }

    #[test]
    fn test_replace_tree_keeps_expansion() {
        let mut session = ToolkitSession::new(tree());
        session.toggle(1);
        session.replace_tree(tree());
        assert_eq!(row_count(&session.active()), 3);
    }
}
