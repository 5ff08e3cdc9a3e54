//! In-memory tool index built from the content tree.
//!
//! Indexes every tool (depth 3) with the title of its sub-step as the parent
//! label. Matching is case-insensitive; every whitespace-separated term of the
//! query must occur in the tool's title or one of its attachment titles.

use std::sync::Arc;

use toolkit_model::{MAX_ROW_DEPTH, Module, Result, SearchHit};

use crate::search::ContentIndexService;

/// Label used for tools whose parent has no title.
pub const UNTITLED_PARENT: &str = "Untitled";

#[derive(Debug, Clone)]
struct IndexedTool {
    tool: Arc<Module>,
    parent: String,
    text: String,
}

/// A [`ContentIndexService`] answering from a tree held in memory.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    tools: Vec<IndexedTool>,
}

impl TreeIndex {
    /// Index all tools under `modules`.
    pub fn build(modules: &[Arc<Module>]) -> Self {
        let mut tools = Vec::new();
        collect(modules, None, 0, &mut tools);
        Self { tools }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn hits(&self, keep: impl Fn(&IndexedTool) -> bool) -> Vec<SearchHit> {
        self.tools
            .iter()
            .filter(|entry| keep(*entry))
            .map(|entry| SearchHit::new(Arc::clone(&entry.tool), entry.parent.clone()))
            .collect()
    }
}

fn collect(
    modules: &[Arc<Module>],
    parent: Option<&Module>,
    depth: usize,
    tools: &mut Vec<IndexedTool>,
) {
    for module in modules {
        if depth == MAX_ROW_DEPTH {
            let parent = parent
                .map(Module::title)
                .filter(|title| !title.is_empty())
                .unwrap_or(UNTITLED_PARENT);
            tools.push(IndexedTool {
                tool: Arc::clone(module),
                parent: parent.to_string(),
                text: searchable_text(module),
            });
        } else {
            collect(&module.children, Some(module), depth + 1, tools);
        }
    }
}

fn searchable_text(module: &Module) -> String {
    module
        .attachments
        .iter()
        .map(|file| file.title().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

impl ContentIndexService for TreeIndex {
    async fn search_critical(&self) -> Result<Vec<SearchHit>> {
        Ok(self.hits(|entry| entry.tool.is_critical()))
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.hits(move |entry| terms.iter().all(|term| entry.text.contains(term.as_str()))))
    }
}

#[cfg(test)]
mod tests {
    use toolkit_model::{CRITICAL_PATH_KEY, FileDescriptor};

    use super::*;

    fn titled(id: i64, title: &str) -> Module {
        Module::new(id).with_attachment(FileDescriptor::new(title))
    }

    fn tree() -> Vec<Arc<Module>> {
        vec![Arc::new(titled(1, "Preparedness").with_children([
            titled(2, "Assess").with_children([
                titled(3, "Market assessment").with_children([
                    titled(4, "Market checklist").with_metadata(CRITICAL_PATH_KEY, true),
                    titled(5, "Price monitoring form"),
                ]),
                Module::new(6).with_children([titled(7, "Water price survey")]),
            ]),
        ]))]
    }

    #[test]
    fn test_indexes_tools_only() {
        let index = TreeIndex::build(&tree());
        assert_eq!(index.len(), 3);
    }

    #[tokio::test]
    async fn test_critical_tools() {
        let hits = TreeIndex::build(&tree()).search_critical().await.expect("hits");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tool.identifier, Some(4));
        assert_eq!(hits[0].parent, "Market assessment");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_all_terms() {
        let index = TreeIndex::build(&tree());

        let hits = index.search("PRICE").await.expect("hits");
        let ids: Vec<_> = hits.iter().map(|h| h.tool.identifier).collect();
        assert_eq!(ids, vec![Some(5), Some(7)]);

        let hits = index.search("water price").await.expect("hits");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].parent, UNTITLED_PARENT);

        assert!(index.search("   ").await.expect("hits").is_empty());
    }
}
