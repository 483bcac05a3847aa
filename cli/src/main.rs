//! # fpick CLI
//!
//! Command-line interface for fpick - a workspace file indexer and
//! fuzzy file picker.
//!
//! ## Usage
//!
//! - `fpick build-index` - Build the search database for every root
//! - `fpick query <PATTERN>` - Search the indexed files
//! - `fpick exclude <DIR>...` - Exclude directories from indexing
//! - `fpick unexclude <DIR>...` - Re-include excluded directories
//! - `fpick opened <FILE>` - Record a file as opened
//! - `fpick recent` - Show recently opened files
//!
//! Roots default to the current directory; pass `--root` once per
//! workspace root to search several at once.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod commands;

use commands::{
    build_command, exclude_command, opened_command, query_command, recent_command,
    unexclude_command,
};
use fpick_core::{FilePicker, JsonSettingsStore, Settings, SettingsStore};

/// fpick - index workspace files and search them incrementally
#[derive(Parser)]
#[command(name = "fpick")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A fast workspace file indexer and fuzzy file picker")]
#[command(long_about = None)]
struct Cli {
    /// Workspace root (repeatable; defaults to the current directory)
    #[arg(short, long = "root")]
    roots: Vec<PathBuf>,

    /// Cache directory override (default: ~/.fpick)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Settings file override (default: <cache-dir>/settings.json)
    #[arg(long)]
    settings_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build or rebuild the search database
    BuildIndex {
        /// Rebuild only this root instead of every configured one
        root: Option<PathBuf>,
    },

    /// Search the indexed files for a pattern
    Query {
        /// Pattern to match against file names and paths
        pattern: String,
    },

    /// Exclude directories from indexing
    Exclude {
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
    },

    /// Re-include previously excluded directories
    Unexclude {
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
    },

    /// Record a file as opened, feeding the recency list
    Opened { path: PathBuf },

    /// Show recently opened files, most recent first
    Recent,
}

/// Expand `~` and make the path absolute against the current directory.
pub(crate) fn absolutize(path: &Path) -> Result<PathBuf> {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(std::env::current_dir()?.join(expanded))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    fpick_core::init_tracing_with_debug(cli.verbose);

    let roots = if cli.roots.is_empty() {
        vec![std::env::current_dir()?]
    } else {
        cli.roots
            .iter()
            .map(|root| absolutize(root))
            .collect::<Result<Vec<_>>>()?
    };

    let settings_file = match (&cli.settings_file, &cli.cache_dir) {
        (Some(path), _) => absolutize(path)?,
        (None, Some(cache_dir)) => absolutize(cache_dir)?.join("settings.json"),
        (None, None) => PathBuf::from(shellexpand::tilde("~/.fpick/settings.json").into_owned()),
    };
    let store: Arc<dyn SettingsStore> = Arc::new(JsonSettingsStore::new(settings_file));

    let settings = Settings::default();
    let picker = match &cli.cache_dir {
        Some(cache_dir) => {
            FilePicker::with_cache_dir(roots, store, settings, absolutize(cache_dir)?).await?
        }
        None => FilePicker::new(roots, store, settings).await?,
    };

    match cli.command {
        Commands::BuildIndex { root } => build_command(&picker, root).await,
        Commands::Query { pattern } => query_command(&picker, &pattern).await,
        Commands::Exclude { dirs } => exclude_command(&picker, dirs).await,
        Commands::Unexclude { dirs } => unexclude_command(&picker, dirs).await,
        Commands::Opened { path } => opened_command(&picker, path).await,
        Commands::Recent => recent_command(&picker).await,
    }
}
