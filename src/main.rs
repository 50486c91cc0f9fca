use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use postimport::ingest::{import_directory, ArchiveWalker, SelectorKind};
use postimport::{from_file, Config};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "postimport")]
#[command(about = "Extract posts from text files, directories and zip archives as JSON")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a single file
    File { path: PathBuf },

    /// Parse every file directly inside a directory
    Dir {
        path: PathBuf,

        /// Only import files whose name matches this regex
        #[arg(short, long)]
        pattern: Option<String>,
    },

    /// Parse a zip archive into a flat list of posts
    Zip {
        path: PathBuf,

        /// Entry selector: all, text or top-level
        #[arg(short, long)]
        selector: Option<SelectorKind>,
    },

    /// Parse a zip archive into posts grouped by directory
    ZipDirs {
        path: PathBuf,

        /// Entry selector: all, text or top-level
        #[arg(short, long)]
        selector: Option<SelectorKind>,
    },
}

#[derive(Serialize)]
struct DirectoryOutput {
    posts: Vec<postimport::PostRecord>,
    errors: Vec<FailureOutput>,
}

#[derive(Serialize)]
struct FailureOutput {
    source: String,
    error: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load()?;

    // Initialize logger; RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.import.log_level.as_str())
    ).init();

    let start = Instant::now();
    match args.command {
        Command::File { path } => {
            let post = from_file(&path)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            print_json(&post, &config)?;
        }
        Command::Dir { path, pattern } => {
            let pattern = pattern.or_else(|| config.import.pattern.clone());
            let import = import_directory(&path, pattern.as_deref())
                .with_context(|| format!("Failed to import directory {}", path.display()))?;

            if import.has_errors() {
                log::warn!("Some files failed to import:\n{}", import.errors);
            }
            let output = DirectoryOutput {
                posts: import.posts,
                errors: import
                    .errors
                    .into_iter()
                    .map(|(source, error)| FailureOutput {
                        source,
                        error: error.to_string(),
                    })
                    .collect(),
            };
            print_json(&output, &config)?;
        }
        Command::Zip { path, selector } => {
            let selector = resolve_selector(selector, &config)?.selector();
            let posts = walker(&config)
                .walk_flat(&path, &*selector)
                .with_context(|| format!("Failed to import archive {}", path.display()))?;
            print_json(&posts, &config)?;
        }
        Command::ZipDirs { path, selector } => {
            let selector = resolve_selector(selector, &config)?.selector();
            let collections = walker(&config)
                .walk_grouped(&path, &*selector)
                .with_context(|| format!("Failed to import archive {}", path.display()))?;
            print_json(&collections, &config)?;
        }
    }

    log::info!("Done in {:?}", start.elapsed());
    Ok(())
}

fn resolve_selector(flag: Option<SelectorKind>, config: &Config) -> Result<SelectorKind> {
    match flag {
        Some(kind) => Ok(kind),
        None => Ok(config.selector_kind()?),
    }
}

fn walker(config: &Config) -> ArchiveWalker {
    ArchiveWalker::new().with_max_entry_bytes(config.import.max_entry_bytes)
}

fn print_json<T: Serialize>(value: &T, config: &Config) -> Result<()> {
    let json = if config.output.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
