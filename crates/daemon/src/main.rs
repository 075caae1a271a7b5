// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fgd: the Fuzzgrid control plane daemon.

use fg_daemon::app::{build_router, AppContext};
use fg_daemon::cloud::DisabledCloud;
use fg_daemon::config::DaemonConfig;
use fg_engine::drivers::spawn_drivers;
use fg_engine::Collaborators;
use fg_storage::{
    MemoryQueues, MemorySecrets, MemoryStore, QueueClient, CUSTOM_METRICS_QUEUE,
    FILE_CHANGES_QUEUE, NODE_HEARTBEAT_QUEUE, PROXY_QUEUE, SIGNALR_EVENTS_QUEUE,
    TASK_HEARTBEAT_QUEUE, WEBHOOKS_QUEUE,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &DaemonConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match &config.log_file {
        Some(path) => {
            let path = PathBuf::from(path);
            let directory = path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "fgd.log".to_string());
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).map(PathBuf::from).or_else(|| {
        std::env::var("FGD_CONFIG").ok().map(PathBuf::from)
    });
    let config = DaemonConfig::load(config_path.as_deref())?;
    let _log_guard = init_tracing(&config);

    tracing::info!(bind = %config.bind_addr, "starting fgd");

    let clock = Arc::new(fg_core::SystemClock);
    let queues = Arc::new(MemoryQueues::new(clock.clone()));
    let ctx = Arc::new(Collaborators::new(
        Arc::new(MemoryStore::new()),
        queues,
        Arc::new(MemorySecrets::new()),
        Arc::new(DisabledCloud),
        clock,
        config.engine_config(),
    ));

    // Reserved queues exist before anything can reference them.
    for queue in [
        NODE_HEARTBEAT_QUEUE,
        TASK_HEARTBEAT_QUEUE,
        FILE_CHANGES_QUEUE,
        WEBHOOKS_QUEUE,
        PROXY_QUEUE,
        SIGNALR_EVENTS_QUEUE,
        CUSTOM_METRICS_QUEUE,
    ] {
        ctx.queues.create_queue(queue).await?;
    }

    let cancel = CancellationToken::new();
    let drivers = spawn_drivers(ctx.clone(), config.driver_intervals(), cancel.clone());

    let bind_addr = config.bind_addr.clone();
    let app = AppContext::new(ctx, config);
    let router = build_router(app);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");

    let shutdown = cancel.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested, draining");
            shutdown.cancel();
        })
        .await?;

    cancel.cancel();
    for driver in drivers {
        let _ = driver.await;
    }
    tracing::info!("fgd stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fgd: {err}");
            ExitCode::FAILURE
        }
    }
}
