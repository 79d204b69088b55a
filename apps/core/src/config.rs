use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ICON: &str = "standard:default";
pub const DEFAULT_PLACEHOLDER: &str = "Search...";
pub const DEFAULT_LIMIT: usize = 5;
pub const DEFAULT_SEARCH_DELAY_MS: u64 = 300;
pub const DEFAULT_BLUR_DELAY_MS: u64 = 300;
pub const MIN_SEARCH_TERM_LENGTH: usize = 1;
const MAX_DELAY_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid toml in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid json5 in {path}: {source}")]
    Json5 {
        path: PathBuf,
        source: json5::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub label: String,
    pub placeholder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_label: Option<String>,
    pub object_api_name: String,
    pub field_api_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_field_api_name: Option<String>,
    pub limit: usize,
    pub icon_name: String,
    pub multi_select: bool,
    pub creatable: bool,
    pub required: bool,
    pub read_only: bool,
    pub search_delay_ms: u64,
    pub blur_delay_ms: u64,
    pub min_search_length: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            label: String::new(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            object_label: None,
            object_api_name: "Account".to_string(),
            field_api_name: "Name".to_string(),
            sub_field_api_name: None,
            limit: DEFAULT_LIMIT,
            icon_name: DEFAULT_ICON.to_string(),
            multi_select: false,
            creatable: false,
            required: false,
            read_only: false,
            search_delay_ms: DEFAULT_SEARCH_DELAY_MS,
            blur_delay_ms: DEFAULT_BLUR_DELAY_MS,
            min_search_length: MIN_SEARCH_TERM_LENGTH,
        }
    }
}

impl LookupConfig {
    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }

    pub fn blur_delay(&self) -> Duration {
        Duration::from_millis(self.blur_delay_ms)
    }

    /// Display name of the target object: the configured label, else the API
    /// name, else `Record`.
    pub fn label_of_object(&self) -> &str {
        self.object_label
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .or_else(|| Some(self.object_api_name.as_str()).filter(|name| !name.trim().is_empty()))
            .unwrap_or("Record")
    }
}

pub fn validate(cfg: &LookupConfig) -> Result<(), ConfigError> {
    if cfg.object_api_name.trim().is_empty() {
        return Err(ConfigError::Invalid("object_api_name is required".into()));
    }

    if cfg.field_api_name.trim().is_empty() {
        return Err(ConfigError::Invalid("field_api_name is required".into()));
    }

    if !(1..=100).contains(&cfg.limit) {
        return Err(ConfigError::Invalid("limit must be between 1 and 100".into()));
    }

    if cfg.search_delay_ms > MAX_DELAY_MS || cfg.blur_delay_ms > MAX_DELAY_MS {
        return Err(ConfigError::Invalid(format!(
            "delays must not exceed {MAX_DELAY_MS} ms"
        )));
    }

    if cfg.min_search_length == 0 {
        return Err(ConfigError::Invalid(
            "min_search_length must be at least 1".into(),
        ));
    }

    Ok(())
}

/// Loads a config file, picking the format from the extension (`.toml`, or
/// `.json`/`.json5`). `None` yields the validated defaults.
pub fn load(path: Option<&Path>) -> Result<LookupConfig, ConfigError> {
    let Some(path) = path else {
        let cfg = LookupConfig::default();
        validate(&cfg)?;
        return Ok(cfg);
    };

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = parse(path, &raw)?;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn parse(path: &Path, raw: &str) -> Result<LookupConfig, ConfigError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false);

    if is_json {
        json5::from_str(raw).map_err(|source| ConfigError::Json5 {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(raw).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

pub fn save(cfg: &LookupConfig, path: &Path) -> Result<(), ConfigError> {
    validate(cfg)?;
    let encoded = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, encoded).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}
