//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use toolkit_content::{
    BundleMetadataService, ContentStore, DocumentResolver, DownloadCoordinator, HttpTransfer,
    LocalBus, NotificationBus, Onboarding, ProgressSink, ReadinessGate, StaticBundleSource,
    TomlPreferenceStore, Topic, TransferService, format_bytes,
};
use toolkit_model::{Dataset, Module, ModuleId, ToolkitError, TransferProgress, load_structure};
use toolkit_view::{
    DatasetMode, SearchAdapter, SessionHandle, ToolkitSession, TreeIndex, compute_depths,
    spawn_session,
};
use tracing::{debug, info, warn};

use crate::cli::{DownloadArgs, OpenArgs, SearchArgs, StructureArgs, TreeArgs};
use crate::config::AppConfig;
use crate::render::{depth_table, render_outline, tools_table};

pub fn load_tree(path: &Path) -> Result<Vec<Arc<Module>>> {
    load_structure(path).with_context(|| format!("load structure {}", path.display()))
}

pub fn run_tree(args: &TreeArgs) -> Result<()> {
    let mut session = ToolkitSession::new(load_tree(&args.input.structure)?);
    for &id in &args.expand {
        if !session.expansion().contains(id) {
            session.toggle(id);
        }
    }
    print!("{}", render_outline(&session.active()));
    Ok(())
}

pub fn run_depths(args: &StructureArgs) -> Result<()> {
    let modules = load_tree(&args.structure)?;
    let depths = compute_depths(&modules);
    println!("{}", depth_table(&modules, &depths));
    println!("{} identified modules", depths.len());
    Ok(())
}

pub async fn run_critical(args: &StructureArgs, config: &AppConfig) -> Result<()> {
    let bus = LocalBus::new();
    let (handle, errors) = start_session(&args.structure, config, &bus)?;
    handle.show_critical()?;
    let sections = wait_for_mode(&handle, DatasetMode::CriticalOnly).await?;
    report_index_errors(errors);
    print_tools(&sections);
    Ok(())
}

pub async fn run_search(args: &SearchArgs, config: &AppConfig) -> Result<()> {
    if args.query.is_empty() {
        bail!("search query is empty");
    }
    let bus = LocalBus::new();
    let (handle, errors) = start_session(&args.input.structure, config, &bus)?;
    handle.text_changed(args.query.as_str())?;
    let sections = wait_for_mode(&handle, DatasetMode::SearchResults).await?;
    report_index_errors(errors);
    print_tools(&sections);
    Ok(())
}

pub async fn run_open(args: &OpenArgs, config: &AppConfig) -> Result<()> {
    let modules = load_tree(&args.input.structure)?;
    let module = find_module(&modules, args.id)
        .with_context(|| format!("no module with id {}", args.id))?;
    let store = ContentStore::new(content_dir(args.content_dir.as_deref(), config));

    if let Some(content) = &module.content {
        let text = store
            .read_markdown(content)
            .with_context(|| format!("read content of module {}", args.id))?;
        println!("{text}");
        return Ok(());
    }

    let attachment = module
        .first_attachment()
        .with_context(|| format!("module {} has no attachment", args.id))?;
    let resolver = DocumentResolver::new(store.clone(), HttpTransfer::new(store));
    let bar = progress_bar()?;
    let path = resolver
        .resolve(attachment, progress_sink(&bar))
        .await
        .map_err(|e| failure(&e))
        .with_context(|| format!("fetch \"{}\"", attachment.title()));
    bar.finish_and_clear();
    println!("{}", path?.display());
    Ok(())
}

pub async fn run_download(args: &DownloadArgs, config: &AppConfig) -> Result<()> {
    let bus = Arc::new(LocalBus::new());
    bus.subscribe(
        Topic::ContentUpdated,
        Arc::new(|_| info!("new content available")),
    );

    let bar = progress_bar()?;
    let coordinator = coordinator_for(args, config, bus).with_progress(progress_sink(&bar));
    let bundle_id = bundle_id(args, config);
    let result = download_with_retries(&coordinator, &bundle_id, args.retries).await;
    bar.finish_and_clear();

    let path = result.map_err(|e| failure(&e))?;
    let size = std::fs::metadata(&path)
        .with_context(|| format!("inspect {}", path.display()))?
        .len();
    println!("Downloaded {} to {}", format_bytes(size), path.display());
    Ok(())
}

pub async fn run_onboard(args: &DownloadArgs, config: &AppConfig) -> Result<()> {
    let prefs =
        TomlPreferenceStore::load(&config.preferences_file).context("load preferences")?;
    let onboarding = Onboarding::new(
        ReadinessGate::new(),
        prefs,
        config.onboarding_flag.as_str(),
    );
    if onboarding.is_complete() {
        println!("Onboarding already completed.");
        return Ok(());
    }

    let bus = Arc::new(LocalBus::new());
    onboarding.watch_content(bus.as_ref());

    let bar = progress_bar()?;
    let coordinator = coordinator_for(args, config, bus).with_progress(progress_sink(&bar));
    let bundle_id = bundle_id(args, config);

    // A terminal has no intro to watch, so the user is ready right away.
    let (downloaded, ready) = tokio::join!(
        download_with_retries(&coordinator, &bundle_id, args.retries),
        async { onboarding.skip() }
    );
    bar.finish_and_clear();
    ready.context("save onboarding flag")?;
    let path = downloaded.map_err(|e| failure(&e))?;

    onboarding.gate().wait().await;
    println!("Content ready at {}", path.display());
    Ok(())
}

/// Download `bundle_id`, retrying retryable failures up to `retries` times.
pub async fn download_with_retries<M, T>(
    coordinator: &DownloadCoordinator<M, T>,
    bundle_id: &str,
    retries: u32,
) -> std::result::Result<PathBuf, ToolkitError>
where
    M: BundleMetadataService,
    T: TransferService,
{
    let mut result = coordinator.download(bundle_id).await;
    for attempt in 1..=retries {
        match &result {
            Err(error) if error.is_retryable() => {
                warn!(attempt, retries, %error, "download failed, retrying");
                eprintln!("{} Retrying ({attempt}/{retries})...", error.user_message());
                result = coordinator.retry().await;
            }
            _ => break,
        }
    }
    result
}

/// Depth-first search for the module with `id`.
pub fn find_module(modules: &[Arc<Module>], id: ModuleId) -> Option<&Arc<Module>> {
    modules.iter().find_map(|module| {
        if module.identifier == Some(id) {
            Some(module)
        } else {
            find_module(&module.children, id)
        }
    })
}

/// Refetch critical tools on `handle` whenever `bus` reports a rebuilt index.
pub fn follow_index(bus: &dyn NotificationBus, handle: &SessionHandle) {
    let handle = handle.clone();
    bus.subscribe(
        Topic::ModulesIndexed,
        Arc::new(move |_| {
            if let Err(error) = handle.index_refreshed() {
                debug!(%error, "index refresh not delivered");
            }
        }),
    );
}

type IndexErrors = mpsc::UnboundedReceiver<ToolkitError>;

fn start_session(
    structure: &Path,
    config: &AppConfig,
    bus: &dyn NotificationBus,
) -> Result<(SessionHandle, IndexErrors)> {
    let modules = load_tree(structure)?;
    let (errors_tx, errors_rx) = mpsc::unbounded_channel();
    let index = TreeIndex::build(&modules);
    info!(tools = index.len(), "tool index built");

    let adapter = Arc::new(SearchAdapter::new(index).with_error_channel(errors_tx));
    let (handle, _task) = spawn_session(ToolkitSession::new(modules), adapter, &config.search);
    follow_index(bus, &handle);
    Ok((handle, errors_rx))
}

async fn wait_for_mode(handle: &SessionHandle, mode: DatasetMode) -> Result<Arc<Dataset>> {
    let mut views = handle.subscribe();
    let view = views
        .wait_for(|view| view.mode == mode)
        .await
        .context("toolkit session stopped")?;
    Ok(Arc::clone(&view.sections))
}

fn report_index_errors(mut errors: IndexErrors) {
    while let Ok(error) = errors.try_recv() {
        eprintln!("warning: {} ({error})", error.user_message());
    }
}

fn print_tools(sections: &Dataset) {
    if sections.is_empty() {
        println!("No tools found.");
    } else {
        println!("{}", tools_table(sections));
    }
}

fn coordinator_for(
    args: &DownloadArgs,
    config: &AppConfig,
    bus: Arc<dyn NotificationBus>,
) -> DownloadCoordinator<StaticBundleSource, HttpTransfer> {
    let store = ContentStore::new(content_dir(args.content_dir.as_deref(), config));
    DownloadCoordinator::new(
        StaticBundleSource::from_url(args.url.as_str()),
        HttpTransfer::new(store),
        bus,
    )
}

fn bundle_id(args: &DownloadArgs, config: &AppConfig) -> String {
    args.bundle
        .clone()
        .unwrap_or_else(|| config.download.bundle_id.clone())
}

fn content_dir(requested: Option<&Path>, config: &AppConfig) -> PathBuf {
    requested.map_or_else(|| config.download.content_dir.clone(), Path::to_path_buf)
}

fn failure(error: &ToolkitError) -> anyhow::Error {
    anyhow!("{} ({error})", error.user_message())
}

fn progress_bar() -> Result<ProgressBar> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes} ({percent}%)")?
            .progress_chars("=> "),
    );
    Ok(bar)
}

fn progress_sink(bar: &ProgressBar) -> ProgressSink {
    let bar = bar.clone();
    Arc::new(move |progress: TransferProgress| {
        bar.set_length(progress.total);
        bar.set_position(progress.downloaded);
    })
}
