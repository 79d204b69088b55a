use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use tracing::info;

use crate::config::{self, ConfigError};
use crate::core_service::{LookupService, ServiceError};
use crate::index_store::{RecordStore, StoreError};
use crate::logging::{self, LogOptions};
use crate::transport::handle_json;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Headless lookup driver: reads JSON requests line by line from stdin and
/// writes one JSON response per line to stdout.
#[derive(Debug, Clone, Parser, PartialEq, Eq)]
#[command(name = "lookup-core", version)]
pub struct RuntimeOptions {
    /// Lookup config (.toml, .json or .json5). A missing file is created with
    /// defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// SQLite record store. In-memory when omitted.
    #[arg(long)]
    pub db: Option<PathBuf>,
    /// JSON array of records to load into the store before serving.
    #[arg(long)]
    pub seed: Option<PathBuf>,
    /// Write logs to this directory instead of stderr.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
    /// Log at debug level unless LOOKUP_LOG overrides it.
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, clap::Error> {
    RuntimeOptions::try_parse_from(std::iter::once("lookup-core".to_string()).chain(args.iter().cloned()))
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    logging::init(&LogOptions {
        log_dir: options.log_dir.clone(),
        default_filter: options.verbose.then(|| "lookup_core=debug".to_string()),
    })?;

    let config = match &options.config {
        Some(path) if !path.exists() => {
            let defaults = config::LookupConfig::default();
            config::save(&defaults, path)?;
            info!(path = %path.display(), "wrote default config");
            defaults
        }
        path => config::load(path.as_deref())?,
    };

    let store = match &options.db {
        Some(path) => RecordStore::open(path)?,
        None => RecordStore::open_memory()?,
    };
    if let Some(seed) = &options.seed {
        let seeded = store.seed_from_file(seed)?;
        info!(seeded, path = %seed.display(), "seeded record store");
    }
    info!(
        object = %config.object_api_name,
        field = %config.field_api_name,
        records = store.count()?,
        "lookup runtime ready"
    );

    let mut service = LookupService::new(config, store)?;
    serve(&mut service, std::io::stdin().lock(), std::io::stdout().lock())
}

/// Answers every non-blank input line with one response line.
pub fn serve<R: BufRead, W: Write>(
    service: &mut LookupService<RecordStore>,
    input: R,
    mut output: W,
) -> Result<(), RuntimeError> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_json(service, &line);
        writeln!(output, "{response}")?;
        output.flush()?;
    }
    Ok(())
}
