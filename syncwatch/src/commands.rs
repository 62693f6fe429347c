use std::sync::Arc;

use clap::ArgMatches;
use log::{error, info};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::artifacts::FileArtifactRecorder;
use crate::cli::{CHECK_STATUS, EXECUTE_SYNC};
use crate::config::{Config, ConfigError, parse_bool};
use crate::connector::ConnectorError;
use crate::connector::fivetran::FivetranClient;
use crate::env::Env;
use crate::poll::{PollDriver, PollError};
use crate::status::{EXIT_CODE_FAILED, EXIT_CODE_SUCCEEDED, SyncOutcome};
use crate::store::file_store::FileWatchStore;
use crate::store::{SyncWatch, WatchStoreError};
use crate::trigger::{TriggerError, TriggerOrchestrator};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("No sync has been recorded under watch key {key}; trigger a sync first or pass a connector id")]
    MissingWatchState { key: String },
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Trigger(#[from] TriggerError),
    #[error(transparent)]
    Poll(#[from] PollError),
    #[error(transparent)]
    Store(#[from] WatchStoreError),
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

impl CommandError {
    pub fn exit_code(&self) -> i32 {
        EXIT_CODE_FAILED
    }
}

/// How a command finished when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Trigger accepted and the caller did not ask to wait.
    Triggered,
    Resolved(SyncOutcome),
}

impl Completion {
    pub fn exit_code(self) -> i32 {
        match self {
            Completion::Triggered => EXIT_CODE_SUCCEEDED,
            Completion::Resolved(outcome) => outcome.exit_code(),
        }
    }
}

/// Force a sync of `connector_id`; wait for it when `config.blocking` is set.
pub async fn execute_sync(
    config: &Config,
    env: &Env,
    connector_id: &str,
    cancel: CancellationToken,
) -> Result<Completion, CommandError> {
    let orchestrator = TriggerOrchestrator::new(env);
    let correlation_id = config.correlation_id.as_deref();

    if !config.blocking {
        let triggered = orchestrator.trigger(connector_id, correlation_id).await?;
        info!(
            "connector={}; {}",
            connector_id,
            triggered.receipt.message.as_deref().unwrap_or("Sync triggered")
        );
        return Ok(Completion::Triggered);
    }

    let (_, outcome) = orchestrator
        .trigger_and_wait(connector_id, correlation_id, &config.poll_options(), cancel)
        .await?;
    Ok(Completion::Resolved(outcome))
}

/// Report on a connector's sync.
///
/// With an explicit connector id the check has no reference time. Otherwise the watch
/// stored by the last `execute_sync` under the configured key is used.
pub async fn check_status(
    config: &Config,
    env: &Env,
    connector_id: Option<&str>,
    cancel: CancellationToken,
) -> Result<Completion, CommandError> {
    let watch = match connector_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => SyncWatch::new(id, None),
        None => {
            let key = config.watch_key();
            let stored = env.get_store().read().await.get(&key).await?;
            stored.ok_or_else(|| CommandError::MissingWatchState {
                key: key.to_string(),
            })?
        }
    };

    let driver = PollDriver::new(env.get_connector(), cancel);
    let outcome = driver
        .resolve(&watch.connector_id, watch.reference_time, &config.poll_options())
        .await?;
    Ok(Completion::Resolved(outcome))
}

/// Wire up file-backed collaborators for `config`.
pub fn build_env(config: &Config) -> Result<Env, CommandError> {
    let recorder = Arc::new(FileArtifactRecorder::new(config.responses_dir()));
    let client = FivetranClient::new(config.api_base.clone(), config.credentials.clone(), recorder)?;
    let store = FileWatchStore::new(config.variables_dir());
    Ok(Env::new(Box::new(store), Box::new(client)))
}

async fn dispatch(matches: &ArgMatches, cancel: CancellationToken) -> Result<Completion, CommandError> {
    let lookup = |name: &str| std::env::var(name).ok();

    match matches.subcommand() {
        Some((EXECUTE_SYNC, sub)) => {
            let mut config = Config::from_matches(sub, lookup)?;
            config.blocking = match sub.get_one::<String>("check-status") {
                Some(value) => parse_bool(value)?,
                None => true,
            };
            let connector_id = sub
                .get_one::<String>("connector-id")
                .ok_or(ConfigError::Missing("connector-id"))?;
            let env = build_env(&config)?;
            execute_sync(&config, &env, connector_id, cancel).await
        }
        Some((CHECK_STATUS, sub)) => {
            let mut config = Config::from_matches(sub, lookup)?;
            config.blocking = sub.get_flag("wait");
            let env = build_env(&config)?;
            let connector_id = sub.get_one::<String>("connector-id").map(String::as_str);
            check_status(&config, &env, connector_id, cancel).await
        }
        Some((other, _)) => Err(CommandError::UnknownCommand(other.to_string())),
        None => Err(CommandError::UnknownCommand(String::new())),
    }
}

/// Run a parsed command line and return the process exit code.
pub async fn run(matches: &ArgMatches, cancel: CancellationToken) -> i32 {
    match dispatch(matches, cancel).await {
        Ok(completion) => completion.exit_code(),
        Err(e) => {
            error!("{}", e);
            e.exit_code()
        }
    }
}
