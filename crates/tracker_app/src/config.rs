use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracker_core::TrackerPolicy;
use tracker_engine::{BackendSettings, TrackerSettings, DEFAULT_POLL_INTERVAL};

use crate::cli::{CliArgs, LogTarget};

pub const DEFAULT_CONFIG_FILE: &str = "job-tracker.ron";
pub const DEFAULT_LOG_FILE: &str = "job-tracker.log";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Settings for the `job-tracker` binary, read from a RON file.
///
/// Every field is optional in the file; missing ones take the library
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub poll_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub start_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_consecutive_errors: u32,
    pub history_capacity: usize,
    pub log: LogTarget,
    pub log_file: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let backend = BackendSettings::default();
        let policy = TrackerPolicy::default();
        Self {
            base_url: backend.base_url,
            auth_token: backend.auth_token,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            connect_timeout_secs: backend.connect_timeout.as_secs(),
            start_timeout_secs: backend.start_timeout.as_secs(),
            request_timeout_secs: backend.request_timeout.as_secs(),
            max_consecutive_errors: policy.max_consecutive_errors,
            history_capacity: policy.history_capacity,
            log: LogTarget::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl TrackerConfig {
    /// Loads `path`. Returns `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        ron::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Command-line flags win over the file.
    pub fn apply_overrides(&mut self, args: &CliArgs) {
        if let Some(base_url) = &args.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(token) = &args.token {
            self.auth_token = Some(token.clone());
        }
        if let Some(interval) = args.poll_interval_ms {
            self.poll_interval_ms = interval;
        }
        if let Some(log) = args.log {
            self.log = log;
        }
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.base_url.clone(),
            auth_token: self.auth_token.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            start_timeout: Duration::from_secs(self.start_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            policy: TrackerPolicy {
                max_consecutive_errors: self.max_consecutive_errors,
                history_capacity: self.history_capacity,
            },
        }
    }
}
