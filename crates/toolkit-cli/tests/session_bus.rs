//! Index refresh notifications reaching a running session.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::timeout;
use toolkit_cli::commands::{find_module, follow_index};
use toolkit_content::{LocalBus, NotificationBus, Topic};
use toolkit_model::{FileDescriptor, Module, Result, SearchHit, row_count};
use toolkit_view::{
    ContentIndexService, DatasetMode, SearchAdapter, SearchConfig, SessionHandle, ToolkitSession,
    TreeIndex, spawn_session,
};

/// Index whose contents can be rebuilt while a session is running.
#[derive(Debug, Default)]
struct SwappableIndex {
    current: RwLock<TreeIndex>,
}

impl SwappableIndex {
    fn replace(&self, index: TreeIndex) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = index;
    }

    fn snapshot(&self) -> TreeIndex {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ContentIndexService for SwappableIndex {
    async fn search_critical(&self) -> Result<Vec<SearchHit>> {
        self.snapshot().search_critical().await
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.snapshot().search(query).await
    }
}

fn tree(critical: bool) -> Vec<Arc<Module>> {
    let tool = Module::new(4)
        .with_attachment(FileDescriptor::new("Airway card"))
        .with_metadata("critical_path", critical);
    let sub_step = Module::new(3)
        .with_attachment(FileDescriptor::new("Airway"))
        .with_children([tool]);
    vec![Arc::new(
        Module::new(1).with_children([Module::new(2).with_children([sub_step])]),
    )]
}

async fn wait_for_critical_rows(handle: &SessionHandle, rows: usize) {
    let mut views = handle.subscribe();
    let waiting = views.wait_for(|view| {
        view.mode == DatasetMode::CriticalOnly && row_count(&view.sections) == rows
    });
    timeout(Duration::from_secs(5), waiting)
        .await
        .expect("critical view not published")
        .unwrap();
}

#[tokio::test]
async fn test_modules_indexed_refreshes_critical_view() {
    let initial = tree(false);
    let adapter = Arc::new(SearchAdapter::new(SwappableIndex::default()));
    adapter.index().replace(TreeIndex::build(&initial));
    let (handle, _task) = spawn_session(
        ToolkitSession::new(initial),
        Arc::clone(&adapter),
        &SearchConfig::default(),
    );

    let bus = LocalBus::new();
    follow_index(&bus, &handle);
    assert_eq!(bus.subscriber_count(Topic::ModulesIndexed), 1);

    handle.show_critical().unwrap();
    wait_for_critical_rows(&handle, 0).await;

    let updated = tree(true);
    adapter.index().replace(TreeIndex::build(&updated));
    handle.reload_tree(updated).unwrap();
    bus.publish(Topic::ModulesIndexed);

    wait_for_critical_rows(&handle, 1).await;
    let active = handle.active();
    assert_eq!(active[0].header.as_deref(), Some("Airway"));
    assert_eq!(active[0].rows[0].identifier(), Some(4));
}

#[test]
fn test_find_module_searches_depth_first() {
    let modules = tree(false);
    assert_eq!(find_module(&modules, 3).map(|m| m.title()), Some("Airway"));
    assert_eq!(find_module(&modules, 4).map(|m| m.title()), Some("Airway card"));
    assert!(find_module(&modules, 99).is_none());
}
