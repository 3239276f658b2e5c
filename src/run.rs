//! Process wiring and lifecycle.
//!
//! Builds every component explicitly (no process-global state), serves the
//! HTTP surface, and on SIGINT/SIGTERM stops the migration source, drains
//! in-flight enrichments for up to five seconds, and exits cleanly.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::apis::ApiManager;
use crate::arguments;
use crate::config::Settings;
use crate::enrichment::EnrichContext;
use crate::logger::{log, LogTag};
use crate::migrations::MigrationSource;
use crate::monitor::TokenMonitor;
use crate::rpc::{ChainRpcClient, TransactionHistoryClient};
use crate::sol_price::SolPriceOracle;
use crate::webserver::{self, AppState};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn start() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("loading configuration")?;
    let port = arguments::get_arg_value("--port")
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(settings.port);

    log(LogTag::System, "INIT", "Starting pumpwatch");

    let sol_price = Arc::new(SolPriceOracle::new());
    let apis = Arc::new(ApiManager::new(&settings.providers));
    let rpc = Arc::new(ChainRpcClient::new(settings.providers.rpc_urls.clone()));
    let history = Arc::new(TransactionHistoryClient::new(
        settings.providers.history_api_key.clone(),
    ));

    let ctx = Arc::new(EnrichContext::new(
        apis,
        rpc,
        history,
        sol_price.clone(),
        settings.scoring.clone(),
    ));

    let source = MigrationSource::new(settings.providers.migration_ws_url.clone(), sol_price);
    let monitor = TokenMonitor::new(ctx, source);

    let state = Arc::new(AppState {
        monitor: monitor.clone(),
    });

    // The monitor starts lazily on the first /tokens or /stream request;
    // the server itself is what this task lives for.
    let shutdown_monitor = monitor.clone();
    let shutdown = async move {
        wait_for_signal().await;
        log(LogTag::System, "SHUTDOWN", "Signal received, stopping");
        shutdown_monitor.stop();
        shutdown_monitor.drain(DRAIN_TIMEOUT).await;
    };

    webserver::start_server(state, port, shutdown)
        .await
        .context("http server")?;

    log(LogTag::System, "SHUTDOWN", "Shutdown complete");
    Ok(())
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
