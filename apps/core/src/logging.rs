use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "lookup.log";
const LOG_ENV: &str = "LOOKUP_LOG";
const DEFAULT_FILTER: &str = "lookup_core=info";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Write to `<dir>/lookup.log` instead of stderr.
    pub log_dir: Option<PathBuf>,
    /// Filter used when `LOOKUP_LOG` is unset.
    pub default_filter: Option<String>,
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// keep the first subscriber.
pub fn init(options: &LogOptions) -> Result<(), std::io::Error> {
    let fallback = options
        .default_filter
        .clone()
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let installed = match &options.log_dir {
        Some(dir) => {
            let file = open_log_file(dir)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    };

    if installed {
        install_panic_hook();
    }
    Ok(())
}

fn open_log_file(log_dir: &Path) -> Result<File, std::io::Error> {
    fs::create_dir_all(log_dir)?;
    LogRotation::default().apply(log_dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE_NAME))
}

/// Size-triggered rotation of `lookup.log` into timestamped archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LogRotation {
    max_bytes: u64,
    max_archives: usize,
}

impl Default for LogRotation {
    fn default() -> Self {
        Self {
            max_bytes: MAX_LOG_BYTES,
            max_archives: MAX_ARCHIVES,
        }
    }
}

impl LogRotation {
    /// Archives the active log once it reaches `max_bytes`. Returns the
    /// archive path when a rotation happened.
    fn apply(&self, log_dir: &Path) -> Result<Option<PathBuf>, std::io::Error> {
        let active = log_dir.join(LOG_FILE_NAME);
        let size = match fs::metadata(&active) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };
        if size < self.max_bytes {
            return Ok(None);
        }

        let archived = log_dir.join(archive_name(unix_millis()));
        fs::rename(&active, &archived)?;
        self.prune(log_dir)?;
        Ok(Some(archived))
    }

    /// Deletes the oldest archives beyond `max_archives`.
    fn prune(&self, log_dir: &Path) -> Result<usize, std::io::Error> {
        let mut archives: Vec<(u128, PathBuf)> = fs::read_dir(log_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                let stamp = path.file_name().and_then(|n| n.to_str()).and_then(archive_stamp)?;
                Some((stamp, path))
            })
            .collect();
        if archives.len() <= self.max_archives {
            return Ok(0);
        }

        archives.sort_by_key(|(stamp, _)| *stamp);
        let excess = archives.len() - self.max_archives;
        for (_, path) in archives.drain(..excess) {
            let _ = fs::remove_file(path);
        }
        Ok(excess)
    }
}

fn archive_name(stamp: u128) -> String {
    format!("lookup-{stamp}.log")
}

fn archive_stamp(file_name: &str) -> Option<u128> {
    file_name
        .strip_prefix("lookup-")?
        .strip_suffix(".log")?
        .parse()
        .ok()
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn install_panic_hook() {
    let _ = PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload unavailable".to_string());
            tracing::error!(%location, %payload, "panic");
            prior(panic_info);
        }));
    });
}
