use std::io::Write;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use embedfs_core::{Backend, BackendKind, EmbedConfig, FileHandler, FileInfo};

mod assets;

#[derive(Parser, Debug)]
#[command(name = "embedfs")]
#[command(about = "Browse a filesystem baked into the binary, or the host's, through one interface")]
#[command(version)]
struct Cli {
    /// Backend to read from (host or embedded)
    #[arg(long, env = "EMBEDFS_BACKEND", global = true)]
    backend: Option<BackendKind>,

    /// Path to config file
    #[arg(long, env = "EMBEDFS_CONFIG_PATH", global = true)]
    config_path: Option<String>,

    /// Read size in bytes when streaming file content
    #[arg(long, env = "EMBEDFS_CHUNK_SIZE", global = true)]
    chunk_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "EMBEDFS_LOG_LEVEL", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List a directory
    Ls {
        /// Directory path
        #[arg(default_value = "/")]
        path: String,
    },
    /// Write a file's content to stdout
    Cat {
        /// File path
        path: String,
    },
    /// Show metadata for a path
    Stat {
        /// File or directory path
        path: String,
    },
    /// List every path registered in the embedded store
    Paths,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `cat` output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!(
        "embedfs v{} starting (os={}, arch={})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
    );

    let config_path = cli
        .config_path
        .map(PathBuf::from)
        .unwrap_or_else(EmbedConfig::default_path);

    let mut config = if config_path.exists() {
        info!("loading config from {}", config_path.display());
        EmbedConfig::load(&config_path)?
    } else {
        debug!("no config at {}, using defaults", config_path.display());
        EmbedConfig::default()
    };

    // CLI args override config file
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }

    let store = assets::store();
    if let Commands::Paths = cli.command {
        return print_paths(&store.paths());
    }

    let backend = Backend::select(config.backend, store);
    info!("serving from {} backend", backend.kind());
    let handler = FileHandler::new(Box::new(backend)).with_chunk_size(config.chunk_size);

    match cli.command {
        Commands::Ls { path } => run_ls(&handler, &config.resolve_path(&path)),
        Commands::Cat { path } => run_cat(&handler, &config.resolve_path(&path)),
        Commands::Stat { path } => run_stat(&handler, &config.resolve_path(&path)),
        Commands::Paths => Ok(()),
    }
}

fn run_ls(handler: &FileHandler, path: &str) -> Result<()> {
    let entries = handler.list(path)?;
    let mut out = std::io::stdout().lock();
    for entry in &entries {
        writeln!(out, "{}", format_entry(entry))?;
    }
    Ok(())
}

fn run_cat(handler: &FileHandler, path: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    let total = handler.download(path, |chunk| {
        out.write_all(chunk).context("failed to write to stdout")
    })?;
    out.flush()?;
    debug!("wrote {} bytes from {}", total, path);
    Ok(())
}

fn run_stat(handler: &FileHandler, path: &str) -> Result<()> {
    let meta = handler.metadata(path)?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "  Name: {}", meta.name())?;
    writeln!(out, "  Size: {}", meta.size())?;
    writeln!(out, "  Mode: {} ({:o})", meta.mode(), meta.mode().perm())?;
    writeln!(out, "Modify: {}", mtime_secs(&meta))?;
    Ok(())
}

fn print_paths(paths: &[&str]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    for path in paths {
        writeln!(out, "{}", path)?;
    }
    Ok(())
}

fn format_entry(entry: &FileInfo) -> String {
    let name = if entry.is_dir() {
        format!("{}/", entry.name())
    } else {
        entry.name().to_string()
    };
    format!(
        "{} {:>10} {:>12} {}",
        entry.mode(),
        entry.size(),
        mtime_secs(entry),
        name
    )
}

/// Modification time as seconds since the Unix epoch (0 if earlier).
fn mtime_secs(info: &FileInfo) -> u64 {
    info.mod_time()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
