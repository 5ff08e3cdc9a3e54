//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use toolkit_model::ModuleId;

#[derive(Parser)]
#[command(
    name = "toolkit",
    version,
    about = "Emergency toolkit - browse, search and download toolkit content",
    long_about = "Browse a toolkit content structure, search its tools and download \
                  content bundles and documents."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (TOML). Defaults apply when omitted.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the module tree, optionally with nodes expanded.
    Tree(TreeArgs),

    /// List every module with its depth.
    Depths(StructureArgs),

    /// List the critical tools grouped by parent.
    Critical(StructureArgs),

    /// Search tools and list the matches grouped by parent.
    Search(SearchArgs),

    /// Show a module's markdown content or fetch its attachment.
    Open(OpenArgs),

    /// Download a content bundle.
    Download(DownloadArgs),

    /// Run the first-run flow: download content and wait until ready.
    Onboard(DownloadArgs),
}

#[derive(Args)]
pub struct StructureArgs {
    /// Content structure file (JSON array of modules).
    #[arg(value_name = "STRUCTURE")]
    pub structure: PathBuf,
}

#[derive(Args)]
pub struct TreeArgs {
    #[command(flatten)]
    pub input: StructureArgs,

    /// Expand the node with this identifier. Repeatable.
    #[arg(long = "expand", value_name = "ID")]
    pub expand: Vec<ModuleId>,
}

#[derive(Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub input: StructureArgs,

    /// Text to search for in tool titles.
    #[arg(value_name = "QUERY")]
    pub query: String,
}

#[derive(Args)]
pub struct OpenArgs {
    #[command(flatten)]
    pub input: StructureArgs,

    /// Identifier of the module to open.
    #[arg(value_name = "ID")]
    pub id: ModuleId,

    /// Content directory (default: from settings).
    #[arg(long = "content-dir", value_name = "DIR")]
    pub content_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct DownloadArgs {
    /// URL the bundle is downloaded from.
    #[arg(value_name = "URL")]
    pub url: String,

    /// Bundle identifier (default: from settings).
    #[arg(long = "bundle", value_name = "ID")]
    pub bundle: Option<String>,

    /// Content directory (default: from settings).
    #[arg(long = "content-dir", value_name = "DIR")]
    pub content_dir: Option<PathBuf>,

    /// Retry a failed download up to this many times.
    #[arg(long = "retries", value_name = "N", default_value_t = 0)]
    pub retries: u32,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
