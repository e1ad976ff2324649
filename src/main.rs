use std::io::IsTerminal;

use anyhow::anyhow;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use vturls::app::{App, EXIT_INTERRUPTED};
use vturls::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::from_args();
    init_tracing(&cli)?;

    let cancel = CancellationToken::new();
    tokio::spawn(watch_interrupts(cancel.clone()));

    // Exit explicitly: a stdin reader abandoned on Ctrl-C would otherwise
    // keep the runtime from shutting down.
    let code = match App::run(&cli, cancel).await {
        Ok(code) => code,
        Err(e) => {
            error!("vturls failed: {e}");
            1
        }
    };
    std::process::exit(code);
}

/// First Ctrl-C cancels the running work, a second one exits immediately.
async fn watch_interrupts(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    warn!("Interrupt received, cancelling; press Ctrl-C again to exit now");
    cancel.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(EXIT_INTERRUPTED);
    }
}

/// Log to stderr so stdout carries only results. `RUST_LOG` wins over `--verbose`.
fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))
}
