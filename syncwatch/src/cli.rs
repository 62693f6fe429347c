use clap::{Arg, ArgAction, Command, value_parser};

use crate::config::ARTIFACTS_DIR_ENV;
use crate::connector::fivetran::DEFAULT_API_BASE;

const POLL_INTERVAL_SECS_DEFAULT: &str = "30";

pub const EXECUTE_SYNC: &str = "execute-sync";
pub const CHECK_STATUS: &str = "check-status";

fn shared_args() -> Vec<Arg> {
    vec![
        Arg::new("api-key")
            .long("api-key")
            .value_name("API_KEY")
            .env("FIVETRAN_API_KEY")
            .hide_env_values(true)
            .required(true),
        Arg::new("api-secret")
            .long("api-secret")
            .value_name("API_SECRET")
            .env("FIVETRAN_API_SECRET")
            .hide_env_values(true)
            .required(true),
        Arg::new("api-base")
            .long("api-base")
            .value_name("URL")
            .env("FIVETRAN_API_BASE")
            .default_value(DEFAULT_API_BASE),
        Arg::new("artifacts-dir")
            .long("artifacts-dir")
            .value_name("DIR")
            .env(ARTIFACTS_DIR_ENV)
            .help("Root directory for responses and watch state"),
        Arg::new("correlation-id")
            .long("correlation-id")
            .value_name("ID")
            .env("SHIPYARD_LOG_ID")
            .help("Groups a trigger with its later status checks"),
        Arg::new("poll-interval-secs")
            .long("poll-interval-secs")
            .value_name("SECONDS")
            .value_parser(value_parser!(u64).range(1..))
            .default_value(POLL_INTERVAL_SECS_DEFAULT),
        Arg::new("timeout-secs")
            .long("timeout-secs")
            .value_name("SECONDS")
            .value_parser(value_parser!(u64).range(1..))
            .help("Give up waiting after this many seconds"),
    ]
}

pub fn syncwatch_cli() -> Command {
    Command::new("syncwatch")
        .about("Trigger connector syncs and check whether they finished")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(EXECUTE_SYNC)
                .about("Force a connector sync and optionally wait for it to finish")
                .args(shared_args())
                .arg(
                    Arg::new("connector-id")
                        .long("connector-id")
                        .value_name("CONNECTOR_ID")
                        .required(true),
                )
                .arg(
                    Arg::new("check-status")
                        .long("check-status")
                        .value_name("TRUE|FALSE")
                        .value_parser(["TRUE", "FALSE"])
                        .ignore_case(true)
                        .default_value("TRUE")
                        .help("Wait until the sync succeeds or fails"),
                ),
        )
        .subcommand(
            Command::new(CHECK_STATUS)
                .about("Check the outcome of the last triggered sync")
                .args(shared_args())
                .arg(
                    Arg::new("connector-id")
                        .long("connector-id")
                        .value_name("CONNECTOR_ID")
                        .help("Check this connector without a reference time"),
                )
                .arg(
                    Arg::new("wait")
                        .long("wait")
                        .action(ArgAction::SetTrue)
                        .help("Poll until the sync succeeds or fails instead of reporting pending"),
                ),
        )
}
