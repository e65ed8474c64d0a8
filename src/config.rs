//! Runtime settings: defaults, then an optional YAML file named by `EXPLORER_CONFIG`,
//! then `EXPLORER_BIND` / `EXPLORER_DATA` overrides.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::data::DEFAULT_DATA_PATH;
use crate::selection::session::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_PAGE_TITLE: &str = "CO2 Capture Materials Explorer";

pub const CONFIG_ENV: &str = "EXPLORER_CONFIG";
pub const BIND_ENV: &str = "EXPLORER_BIND";
pub const DATA_ENV: &str = "EXPLORER_DATA";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_path: PathBuf,
    pub page_title: String,
    /// Upper bound on concurrently tracked browser sessions.
    pub max_sessions: usize,
    pub session_idle_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            page_title: DEFAULT_PAGE_TITLE.to_string(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle_secs: DEFAULT_SESSION_IDLE.as_secs(),
        }
    }
}

/// Shape of the YAML file; every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    bind_addr: Option<String>,
    data_path: Option<PathBuf>,
    page_title: Option<String>,
    max_sessions: Option<usize>,
    session_idle_secs: Option<u64>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read(PathBuf, std::io::Error),
    Parse(PathBuf, serde_yaml::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(path, err) => write!(f, "failed to read config {}: {err}", path.display()),
            Self::Parse(path, err) => write!(f, "invalid config {}: {err}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| env::var(key).ok())
    }

    /// Resolve with an injectable variable lookup.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_ENV).filter(|v| !v.trim().is_empty()) {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        if let Some(bind) = lookup(BIND_ENV).filter(|v| !v.trim().is_empty()) {
            config.bind_addr = bind;
        }
        if let Some(data) = lookup(DATA_ENV).filter(|v| !v.trim().is_empty()) {
            config.data_path = PathBuf::from(data);
        }
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw =
            fs::read_to_string(path).map_err(|err| ConfigError::Read(path.to_path_buf(), err))?;
        Self::from_yaml_str(&raw).map_err(|err| ConfigError::Parse(path.to_path_buf(), err))
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty map.
        let file: ConfigFile = if raw.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(raw)?
        };
        let defaults = Self::default();
        Ok(AppConfig {
            bind_addr: file.bind_addr.unwrap_or(defaults.bind_addr),
            data_path: file.data_path.unwrap_or(defaults.data_path),
            page_title: file.page_title.unwrap_or(defaults.page_title),
            max_sessions: file.max_sessions.unwrap_or(defaults.max_sessions),
            session_idle_secs: file.session_idle_secs.unwrap_or(defaults.session_idle_secs),
        })
    }
}
