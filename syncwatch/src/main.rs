use log::warn;
use syncwatch::cli::syncwatch_cli;
use syncwatch::commands;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = syncwatch_cli().get_matches();

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping");
            on_signal.cancel();
        }
    });

    let code = commands::run(&matches, cancel).await;
    std::process::exit(code);
}
