//! Depth mapping over the content tree.

use std::collections::HashMap;
use std::sync::Arc;

use toolkit_model::{Module, ModuleId};

/// Nesting depth of every identified module. Top-level modules are at depth 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthMap {
    depths: HashMap<ModuleId, usize>,
}

impl DepthMap {
    pub fn get(&self, id: ModuleId) -> Option<usize> {
        self.depths.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, usize)> + '_ {
        self.depths.iter().map(|(id, depth)| (*id, *depth))
    }
}

/// Compute the depth of every module in `modules`, recursively.
///
/// Modules without an identifier are skipped, but their children are still
/// visited.
pub fn compute_depths(modules: &[Arc<Module>]) -> DepthMap {
    let mut map = DepthMap::default();
    map_tree(modules, 0, &mut map.depths);
    map
}

fn map_tree(modules: &[Arc<Module>], level: usize, depths: &mut HashMap<ModuleId, usize>) {
    for module in modules {
        if let Some(id) = module.identifier {
            depths.insert(id, level);
        }
        if module.has_children() {
            map_tree(&module.children, level + 1, depths);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree() {
        assert!(compute_depths(&[]).is_empty());
    }

    #[test]
    fn test_nested_depths() {
        let modules = vec![Arc::new(Module::new(1).with_children([
            Module::new(2).with_children([Module::new(3).with_children([Module::new(4)])]),
        ]))];

        let depths = compute_depths(&modules);
        assert_eq!(depths.len(), 4);
        assert_eq!(depths.get(1), Some(0));
        assert_eq!(depths.get(2), Some(1));
        assert_eq!(depths.get(3), Some(2));
        assert_eq!(depths.get(4), Some(3));
    }

    #[test]
    fn test_missing_identifier_is_skipped_but_children_mapped() {
        let anonymous = Module {
            identifier: None,
            ..Default::default()
        }
        .with_children([Module::new(5)]);
        let depths = compute_depths(&[Arc::new(anonymous)]);
        assert_eq!(depths.len(), 1);
        assert_eq!(depths.get(5), Some(1));
    }
}
