//! Expand/collapse state for the current view session.

use std::collections::BTreeSet;

use toolkit_model::ModuleId;

/// Set of module identifiers currently expanded. Lives only as long as the
/// session that owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: BTreeSet<ModuleId>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now expanded.
    pub fn toggle(&mut self, id: ModuleId) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    #[inline]
    pub fn contains(&self, id: ModuleId) -> bool {
        self.expanded.contains(&id)
    }

    /// Whether an optional identifier is expanded. Unidentified nodes never are.
    #[inline]
    pub fn is_expanded(&self, id: Option<ModuleId>) -> bool {
        id.is_some_and(|id| self.contains(id))
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.expanded.iter().copied()
    }
}

impl FromIterator<ModuleId> for ExpansionState {
    fn from_iter<T: IntoIterator<Item = ModuleId>>(iter: T) -> Self {
        Self {
            expanded: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut state = ExpansionState::new();
        assert!(state.toggle(4));
        assert!(state.contains(4));
        assert!(!state.toggle(4));
        assert!(state.is_empty());
    }

    #[test]
    fn test_unidentified_never_expanded() {
        let state: ExpansionState = [1, 2].into_iter().collect();
        assert!(state.is_expanded(Some(1)));
        assert!(!state.is_expanded(None));
    }
}
