//! acordes - command-line front-end for the local song cache
//!
//! Opens the file-backed durable store under the resolved root folder and
//! runs one cache operation per invocation. Logs go to stderr; command
//! output goes to stdout.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use acordes_cache::{FileStore, SongStore, StorageOrigin};
use acordes_common::config::{load_config_or_default, RootFolderInitializer, RootFolderResolver, TomlConfig};
use acordes_common::Instrument;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Command-line arguments for acordes
#[derive(Parser, Debug)]
#[command(name = "acordes")]
#[command(about = "Inspect and edit the local chord sheet cache")]
#[command(version)]
struct Args {
    /// Root folder holding the cache store
    #[arg(short, long, global = true, env = "ACORDES_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a cached song
    Show {
        id: String,
        /// Print this instrument's variant instead of the current body
        #[arg(short, long)]
        instrument: Option<Instrument>,
        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Merge song records from a JSON file ("-" for stdin)
    Import { file: PathBuf },
    /// Store one instrument variant of a cached song from a file ("-" for stdin)
    SetInstrument {
        id: String,
        instrument: Instrument,
        file: PathBuf,
    },
    /// Print a cached song and record it in history
    View {
        id: String,
        #[arg(short, long)]
        instrument: Option<Instrument>,
    },
    /// Toggle a song's favorite status
    Favorite { id: String },
    /// List favorite songs
    Favorites,
    /// List recently viewed songs
    History,
    /// Add a comment to a song
    Comment { id: String, text: String },
    /// List a song's comments, newest first
    Comments { id: String },
    /// Show durable store usage
    Stats,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config_or_default(args.config.as_deref());

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    debug!("acordes v{}", env!("CARGO_PKG_VERSION"));

    let mut store = open_store(args.root_folder, &config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Show { id, instrument, json } => commands::show(&mut store, &mut out, &id, instrument, json),
        Command::Import { file } => {
            let text = read_input(&file)?;
            commands::import(&mut store, &mut out, &text)
        }
        Command::SetInstrument { id, instrument, file } => {
            let content = read_input(&file)?;
            commands::set_instrument(&mut store, &mut out, &id, instrument, &content)
        }
        Command::View { id, instrument } => commands::view(&mut store, &mut out, &id, instrument),
        Command::Favorite { id } => commands::favorite(&mut store, &mut out, &id),
        Command::Favorites => commands::favorites(&mut store, &mut out),
        Command::History => commands::history(&mut store, &mut out),
        Command::Comment { id, text } => commands::comment(&mut store, &mut out, &id, &text),
        Command::Comments { id } => commands::comments(&mut store, &mut out, &id),
        Command::Stats => commands::stats(&mut store, &mut out),
    }
}

/// Resolve the root folder and open a cache instance on its store directory
fn open_store(cli_root: Option<PathBuf>, config: &TomlConfig) -> Result<SongStore> {
    let root_folder = RootFolderResolver::new(cli_root, config).resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .with_context(|| format!("Failed to create root folder {}", initializer.root().display()))?;

    let store_path = initializer.store_path();
    debug!("Store: {}", store_path.display());

    let durable = FileStore::open(&store_path)
        .with_context(|| format!("Failed to open store at {}", store_path.display()))?
        .with_capacity(config.storage.quota_bytes);

    Ok(StorageOrigin::new(Arc::new(durable))
        .with_consistency(config.storage.consistency)
        .open_instance())
}

/// Read a whole file, or stdin for "-"
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
