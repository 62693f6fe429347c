use std::path::PathBuf;
use std::time::Duration;

use clap::ArgMatches;
use thiserror::Error;

use crate::connector::fivetran::{Credentials, DEFAULT_API_BASE};
use crate::poll::{DEFAULT_POLL_INTERVAL, PollOptions};
use crate::store::WatchKey;

/// Subdirectory of the artifacts root owned by this tool.
pub const ARTIFACTS_SUBFOLDER: &str = "fivetran-blueprints";
pub const ARTIFACTS_DIR_ENV: &str = "SYNCWATCH_ARTIFACTS_DIRECTORY";
pub const SHIPYARD_ARTIFACTS_DIR_ENV: &str = "SHIPYARD_ARTIFACTS_DIRECTORY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required option: {0}")]
    Missing(&'static str),
    #[error("Invalid boolean {0:?}, expected TRUE or FALSE")]
    InvalidBoolean(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Root for `responses/` and `variables/`.
    pub artifacts_dir: PathBuf,
    pub correlation_id: Option<String>,
    pub api_base: String,
    pub credentials: Credentials,
    pub poll_interval: Duration,
    pub poll_deadline: Option<Duration>,
    pub blocking: bool,
}

impl Config {
    pub fn new(artifacts_root: impl Into<PathBuf>, credentials: Credentials) -> Self {
        Config {
            artifacts_dir: artifacts_root.into().join(ARTIFACTS_SUBFOLDER),
            correlation_id: None,
            api_base: DEFAULT_API_BASE.to_string(),
            credentials,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_deadline: None,
            blocking: false,
        }
    }

    /// Build from parsed subcommand arguments. Environment lookups go through `lookup`
    /// so callers decide where variables come from.
    pub fn from_matches(
        matches: &ArgMatches,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = matches
            .get_one::<String>("api-key")
            .cloned()
            .ok_or(ConfigError::Missing("api-key"))?;
        let api_secret = matches
            .get_one::<String>("api-secret")
            .cloned()
            .ok_or(ConfigError::Missing("api-secret"))?;

        let artifacts_root = matches
            .get_one::<String>("artifacts-dir")
            .cloned()
            .filter(|dir| !dir.trim().is_empty())
            .or_else(|| lookup(SHIPYARD_ARTIFACTS_DIR_ENV).filter(|dir| !dir.trim().is_empty()))
            .unwrap_or_else(|| {
                format!("{}-artifacts", lookup("USER").unwrap_or_else(|| "syncwatch".to_string()))
            });

        let mut config = Config::new(
            artifacts_root,
            Credentials {
                api_key,
                api_secret,
            },
        );

        config.correlation_id = matches
            .get_one::<String>("correlation-id")
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        if let Some(api_base) = matches.get_one::<String>("api-base") {
            config.api_base = api_base.clone();
        }
        if let Some(secs) = matches.get_one::<u64>("poll-interval-secs") {
            config.poll_interval = Duration::from_secs(*secs);
        }
        config.poll_deadline = matches
            .get_one::<u64>("timeout-secs")
            .map(|secs| Duration::from_secs(*secs));

        Ok(config)
    }

    pub fn responses_dir(&self) -> PathBuf {
        self.artifacts_dir.join("responses")
    }

    pub fn variables_dir(&self) -> PathBuf {
        self.artifacts_dir.join("variables")
    }

    pub fn watch_key(&self) -> WatchKey {
        WatchKey::derive(self.correlation_id.as_deref())
    }

    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            blocking: self.blocking,
            interval: self.poll_interval,
            deadline: self.poll_deadline,
        }
    }
}

/// Accepts `TRUE` / `FALSE` in any case.
pub fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        _ => Err(ConfigError::InvalidBoolean(value.to_string())),
    }
}
