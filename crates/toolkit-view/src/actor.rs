//! Session actor: drives a [`ToolkitSession`] on a single task.
//!
//! UI events arrive as [`SessionCommand`]s. Index queries run on spawned tasks
//! and report back over an internal channel, tagged with the debouncer's
//! sequence number so late results for superseded queries are dropped. All
//! dataset writes happen on the actor task, one whole snapshot at a time.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use toolkit_model::{Dataset, Module, ModuleId, Result, ToolkitError};
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::debounce::{SearchDebouncer, TextChange};
use crate::search::{ContentIndexService, SearchAdapter, group_hits};
use crate::session::{ActiveView, DatasetMode, ToolkitSession};

/// Commands accepted by the session actor.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Toggle(ModuleId),
    ShowStandard,
    /// Show critical tools, as soon as they are loaded if they are not yet.
    ShowCritical,
    SearchTextChanged(String),
    /// Leave the search context; pending and in-flight queries are dropped.
    CancelSearch,
    ReloadTree(Vec<Arc<Module>>),
    /// The index was rebuilt; refetch critical tools.
    IndexRefreshed,
}

enum QueryResult {
    Search { seq: u64, sections: Dataset },
    Critical { sections: Dataset },
}

/// Handle to a running session actor. Dropping every handle stops the actor.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    active: watch::Receiver<ActiveView>,
}

impl SessionHandle {
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| ToolkitError::SessionClosed)
    }

    pub fn toggle(&self, id: ModuleId) -> Result<()> {
        self.send(SessionCommand::Toggle(id))
    }

    pub fn show_standard(&self) -> Result<()> {
        self.send(SessionCommand::ShowStandard)
    }

    pub fn show_critical(&self) -> Result<()> {
        self.send(SessionCommand::ShowCritical)
    }

    pub fn text_changed(&self, text: impl Into<String>) -> Result<()> {
        self.send(SessionCommand::SearchTextChanged(text.into()))
    }

    pub fn cancel_search(&self) -> Result<()> {
        self.send(SessionCommand::CancelSearch)
    }

    pub fn reload_tree(&self, modules: Vec<Arc<Module>>) -> Result<()> {
        self.send(SessionCommand::ReloadTree(modules))
    }

    pub fn index_refreshed(&self) -> Result<()> {
        self.send(SessionCommand::IndexRefreshed)
    }

    /// The dataset shown right now.
    pub fn active(&self) -> Arc<Dataset> {
        Arc::clone(&self.active.borrow().sections)
    }

    pub fn mode(&self) -> DatasetMode {
        self.active.borrow().mode
    }

    /// Watch replacements of the active dataset.
    pub fn subscribe(&self) -> watch::Receiver<ActiveView> {
        self.active.clone()
    }
}

/// Spawn the actor for `session` on the current tokio runtime.
///
/// The critical dataset is fetched immediately, as on first load.
pub fn spawn_session<I>(
    session: ToolkitSession,
    adapter: Arc<SearchAdapter<I>>,
    config: &SearchConfig,
) -> (SessionHandle, JoinHandle<()>)
where
    I: ContentIndexService + 'static,
{
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (results_tx, results_rx) = mpsc::unbounded_channel();
    let handle = SessionHandle {
        commands: commands_tx,
        active: session.subscribe(),
    };

    let actor = SessionActor {
        session,
        adapter,
        debouncer: SearchDebouncer::new(config.settle_window()),
        critical_requested: false,
        commands: commands_rx,
        results_tx,
        results_rx,
    };
    let task = tokio::spawn(actor.run());
    (handle, task)
}

struct SessionActor<I> {
    session: ToolkitSession,
    adapter: Arc<SearchAdapter<I>>,
    debouncer: SearchDebouncer,
    /// A `ShowCritical` arrived before the critical dataset was cached.
    critical_requested: bool,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    results_tx: mpsc::UnboundedSender<QueryResult>,
    results_rx: mpsc::UnboundedReceiver<QueryResult>,
}

impl<I: ContentIndexService + 'static> SessionActor<I> {
    async fn run(mut self) {
        self.fetch_critical();

        loop {
            let deadline = self.debouncer.deadline();
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(result) = self.results_rx.recv() => self.apply(result),
                () = wait_until(deadline) => self.fire_search(),
            }
        }

        info!("toolkit session closed");
    }

    fn handle(&mut self, command: SessionCommand) {
        if !matches!(command, SessionCommand::IndexRefreshed) {
            self.critical_requested = false;
        }
        match command {
            SessionCommand::Toggle(id) => {
                self.debouncer.cancel();
                self.session.toggle(id);
            }
            SessionCommand::ShowStandard => {
                self.debouncer.cancel();
                self.session.show_standard();
            }
            SessionCommand::ShowCritical => {
                self.debouncer.cancel();
                self.critical_requested = !self.session.show_critical();
            }
            SessionCommand::SearchTextChanged(text) => {
                if self.debouncer.on_text_change(&text, Instant::now()) == TextChange::ShowStandard
                {
                    self.session.show_standard();
                }
            }
            SessionCommand::CancelSearch => self.debouncer.cancel(),
            SessionCommand::ReloadTree(modules) => self.session.replace_tree(modules),
            SessionCommand::IndexRefreshed => self.fetch_critical(),
        }
    }

    fn fire_search(&mut self) {
        let Some(ticket) = self.debouncer.poll(Instant::now()) else {
            return;
        };
        debug!(seq = ticket.seq, query = %ticket.query, "issuing search");

        let adapter = Arc::clone(&self.adapter);
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let sections = group_hits(adapter.search_tools(&ticket.query).await);
            let _ = results.send(QueryResult::Search {
                seq: ticket.seq,
                sections,
            });
        });
    }

    fn fetch_critical(&self) {
        let adapter = Arc::clone(&self.adapter);
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let sections = group_hits(adapter.search_critical_tools().await);
            let _ = results.send(QueryResult::Critical { sections });
        });
    }

    fn apply(&mut self, result: QueryResult) {
        match result {
            QueryResult::Search { seq, sections } => {
                if self.debouncer.is_current(seq) {
                    self.session.show_search_results(sections);
                } else {
                    debug!(seq, "discarding stale search results");
                }
            }
            QueryResult::Critical { sections } => {
                self.session.set_critical(sections);
                if std::mem::take(&mut self.critical_requested) {
                    self.session.show_critical();
                } else if self.session.mode() == DatasetMode::Standard {
                    self.session.show_standard();
                }
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
