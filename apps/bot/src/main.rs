use std::sync::Arc;

use anyhow::{Context, Result};
use bot::{
    Data,
    config::{Config, SlackConfig},
    init_tracing,
    slack::SlackClient,
};
use coin::{Lookup, PriceClient, SymbolStore, refresh::refresh};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    let slack_config = SlackConfig::from_env()?;

    let symbol_store =
        SymbolStore::connect(&config.database_url, config.symbol_table.clone(), config.timeout)
            .await
            .context("init symbol store failed")?;
    let price_client = PriceClient::new(config.api_base.clone(), config.timeout)
        .context("init price client failed")?;
    let slack = SlackClient::new(slack_config.token.clone(), config.timeout)
        .context("init slack client failed")?;

    let data = Arc::new(Data {
        lookup: Lookup::new(symbol_store, price_client),
        slack,
        signing_secret: slack_config.signing_secret.clone(),
    });

    if config.refresh_on_start || data.lookup.index().is_empty().await? {
        if let Err(e) = refresh(data.lookup.quotes(), data.lookup.index()).await {
            error!("initial refresh failed: {:?}", e);
        }
    }

    let sched = JobScheduler::new()
        .await
        .context("failed to create job scheduler")?;

    let data_job = Arc::clone(&data);

    sched
        .add(Job::new_async_tz(
            config.refresh_cron.as_str(),
            config.refresh_tz,
            move |_uuid, _l| {
                let data = Arc::clone(&data_job);

                Box::pin(async move {
                    if let Err(e) = refresh(data.lookup.quotes(), data.lookup.index()).await {
                        error!("scheduled refresh failed: {:?}", e);
                    }
                })
            },
        )?)
        .await?;

    sched.shutdown_on_ctrl_c();
    sched.start().await?;

    info!(
        cron = %config.refresh_cron,
        tz = %config.refresh_tz,
        "symbol refresh scheduled"
    );

    let listener = tokio::net::TcpListener::bind(slack_config.bind_addr)
        .await
        .with_context(|| format!("bind {}", slack_config.bind_addr))?;

    info!(
        addr = %slack_config.bind_addr,
        version = %config.version,
        "listening for Slack events"
    );

    axum::serve(listener, bot::slack::router(data))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::{
            select,
            signal::unix::{SignalKind, signal},
        };
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
