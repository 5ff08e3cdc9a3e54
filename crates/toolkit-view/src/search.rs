//! Search index adapter and result grouping.
//!
//! The index itself is an external collaborator behind [`ContentIndexService`].
//! [`SearchAdapter`] makes it fail-soft: an index error is logged, reported on
//! the optional error channel and turned into an empty result set, so callers
//! render "no results" instead of an error.

use std::collections::BTreeMap;
use std::future::Future;

use tokio::sync::mpsc;
use toolkit_model::{
    Dataset, DisplayRow, DisplaySection, Result, SearchHit, SelectionAction, ToolkitError,
};
use tracing::{debug, warn};

/// An index answering tool queries.
pub trait ContentIndexService: Send + Sync {
    /// All tools flagged critical, without a text filter.
    fn search_critical(&self) -> impl Future<Output = Result<Vec<SearchHit>>> + Send;

    /// Tools whose indexed text matches `query`.
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<SearchHit>>> + Send;
}

/// Fail-soft wrapper around a [`ContentIndexService`].
#[derive(Debug)]
pub struct SearchAdapter<I> {
    index: I,
    errors: Option<mpsc::UnboundedSender<ToolkitError>>,
}

impl<I: ContentIndexService> SearchAdapter<I> {
    pub fn new(index: I) -> Self {
        Self {
            index,
            errors: None,
        }
    }

    /// Report index failures on `errors` in addition to the log.
    #[must_use]
    pub fn with_error_channel(mut self, errors: mpsc::UnboundedSender<ToolkitError>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// All critical tools; empty on index failure.
    pub async fn search_critical_tools(&self) -> Vec<SearchHit> {
        let result = self.index.search_critical().await;
        self.recover(result, "critical tools")
    }

    /// Tools matching `query`; empty on index failure.
    pub async fn search_tools(&self, query: &str) -> Vec<SearchHit> {
        let result = self.index.search(query).await;
        self.recover(result, query)
    }

    fn recover(&self, result: Result<Vec<SearchHit>>, query: &str) -> Vec<SearchHit> {
        match result {
            Ok(hits) => {
                debug!(query, hits = hits.len(), "index query complete");
                hits
            }
            Err(error) => {
                let error = match error {
                    ToolkitError::IndexUnavailable(_) => error,
                    other => ToolkitError::IndexUnavailable(other.to_string()),
                };
                warn!(query, %error, "index query failed, showing no results");
                if let Some(errors) = &self.errors {
                    // A dropped receiver only means nobody is listening.
                    let _ = errors.send(error);
                }
                Vec::new()
            }
        }
    }
}

/// Group hits by parent label into one section per label.
///
/// Sections are ordered alphabetically by label; hits keep their order within
/// a section.
pub fn group_hits(hits: Vec<SearchHit>) -> Dataset {
    let mut groups: BTreeMap<String, Vec<DisplayRow>> = BTreeMap::new();
    for hit in hits {
        groups
            .entry(hit.parent)
            .or_default()
            .push(DisplayRow::Tool(hit.tool));
    }

    groups
        .into_iter()
        .map(|(parent, rows)| {
            DisplaySection::new(rows)
                .with_header(parent)
                .with_selection(SelectionAction::OpenTool)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use toolkit_model::Module;

    use super::*;

    struct FailingIndex;

    impl ContentIndexService for FailingIndex {
        async fn search_critical(&self) -> Result<Vec<SearchHit>> {
            Err(ToolkitError::IndexUnavailable("offline".to_string()))
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
            Err(ToolkitError::Io("index file missing".to_string()))
        }
    }

    fn hit(id: i64, parent: &str) -> SearchHit {
        SearchHit::new(Arc::new(Module::new(id)), parent)
    }

    #[test]
    fn test_group_hits_by_parent() {
        let sections = group_hits(vec![hit(1, "X"), hit(2, "X"), hit(3, "Y")]);
        assert_eq!(sections.len(), 2);

        assert_eq!(sections[0].header.as_deref(), Some("X"));
        let ids: Vec<_> = sections[0].rows.iter().map(DisplayRow::identifier).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);

        assert_eq!(sections[1].header.as_deref(), Some("Y"));
        assert_eq!(sections[1].rows.len(), 1);
        assert!(sections[1].rows[0].is_tool());
    }

    #[test]
    fn test_group_hits_sorted_by_label() {
        let sections = group_hits(vec![hit(1, "Zeta"), hit(2, "Alpha"), hit(3, "Zeta")]);
        let headers: Vec<_> = sections.iter().map(|s| s.header.as_deref()).collect();
        assert_eq!(headers, vec![Some("Alpha"), Some("Zeta")]);
    }

    #[test]
    fn test_group_no_hits() {
        assert!(group_hits(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_index_failure_degrades_to_empty() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let adapter = SearchAdapter::new(FailingIndex).with_error_channel(tx);

        assert!(adapter.search_critical_tools().await.is_empty());
        assert!(adapter.search_tools("water").await.is_empty());

        assert!(matches!(rx.recv().await, Some(ToolkitError::IndexUnavailable(_))));
        let second = rx.recv().await.expect("second error");
        assert!(
            matches!(second, ToolkitError::IndexUnavailable(ref m) if m.contains("index file missing"))
        );
    }
}
